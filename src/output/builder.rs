//! RSS 2.0 serialization for the two output profiles.
//!
//! Both builders walk the source entries in document order and run the
//! full per-entry pipeline: extract, sanitize for the profile, derive
//! identity, then emit. Field-level fallbacks are applied here so a single
//! defective entry degrades to placeholders instead of failing the batch.

use anyhow::{Context, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::config::Config;
use crate::feed::SourceEntry;
use crate::html::{
    extract, first_paragraph_text, html_to_plain_text, sanitize, take_chars,
    truncate_with_ellipsis, RESTRICTED, RICH,
};
use crate::output::identity::{derive_guid, pub_date_rfc822};
use crate::output::media::{select_media, MediaAsset};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const YANDEX_NS: &str = "http://news.yandex.ru";
const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

/// Placeholder for entries arriving without a title.
const UNTITLED: &str = "Untitled";
/// Hard cap on the rich profile's short description.
const RICH_DESCRIPTION_MAX: usize = 500;
/// Category terms emitted per item, surplus dropped.
const MAX_CATEGORIES: usize = 10;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serialize the rich-profile document for all entries.
pub fn build_rich_feed(entries: &[SourceEntry], config: &Config) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:content", CONTENT_NS));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    rss.push_attribute(("xmlns:yandex", YANDEX_NS));
    rss.push_attribute(("xmlns:media", MEDIA_NS));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to open rss element")?;

    open_channel(
        &mut writer,
        &config.feed_title,
        &config.feed_link,
        &config.feed_description,
    )?;

    let self_href = format!("{}/zen.xml", config.feed_link.trim_end_matches('/'));
    let mut atom_link = BytesStart::new("atom:link");
    atom_link.push_attribute(("href", self_href.as_str()));
    atom_link.push_attribute(("rel", "self"));
    atom_link.push_attribute(("type", "application/rss+xml"));
    writer
        .write_event(Event::Empty(atom_link))
        .context("Failed to write atom:link element")?;

    for entry in entries {
        write_rich_item(&mut writer, entry, config)?;
    }

    close_document(writer)
}

/// Serialize the restricted-profile document for all entries.
pub fn build_restricted_feed(entries: &[SourceEntry], config: &Config) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to open rss element")?;

    let title = format!("{} — Telegram", config.feed_title);
    open_channel(&mut writer, &title, &config.feed_link, &config.feed_description)?;

    for entry in entries {
        write_restricted_item(&mut writer, entry, config)?;
    }

    close_document(writer)
}

fn open_channel(writer: &mut XmlWriter, title: &str, link: &str, description: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .context("Failed to open channel element")?;
    write_text_element(writer, "title", title)?;
    write_text_element(writer, "link", link)?;
    write_text_element(writer, "description", description)?;
    Ok(())
}

fn close_document(mut writer: XmlWriter) -> Result<Vec<u8>> {
    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .context("Failed to close channel element")?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .context("Failed to close rss element")?;
    Ok(writer.into_inner().into_inner())
}

fn write_rich_item(writer: &mut XmlWriter, entry: &SourceEntry, config: &Config) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("item")))
        .context("Failed to open item element")?;

    write_text_element(writer, "title", entry.title.as_deref().unwrap_or(UNTITLED))?;
    write_text_element(writer, "link", entry.link.as_deref().unwrap_or(&config.site_base))?;
    write_text_element(writer, "guid", &derive_guid(entry))?;
    write_text_element(writer, "pubDate", &pub_date_rfc822(entry))?;

    let extracted = extract(entry, &config.site_base);
    let body = sanitize(&extracted.html, &RICH);

    // Both fields deliberately carry the identical body: generic readers
    // take content:encoded, the target platform reads yandex:full-text.
    write_cdata_element(writer, "content:encoded", &body)?;
    write_cdata_element(writer, "yandex:full-text", &body)?;

    if let Some(asset) = select_media(entry, extracted.first_image.as_deref(), &config.site_base) {
        write_media_element(writer, "enclosure", &asset)?;
        write_media_element(writer, "media:content", &asset)?;
    }

    if let Some(author) = entry.author.as_deref() {
        write_text_element(writer, "author", author)?;
    }
    for term in entry.tags.iter().take(MAX_CATEGORIES) {
        write_text_element(writer, "category", term)?;
    }

    if let Some(lead) = first_paragraph_text(&body) {
        write_text_element(writer, "description", take_chars(&lead, RICH_DESCRIPTION_MAX))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .context("Failed to close item element")?;
    Ok(())
}

fn write_restricted_item(
    writer: &mut XmlWriter,
    entry: &SourceEntry,
    config: &Config,
) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("item")))
        .context("Failed to open item element")?;

    write_text_element(writer, "title", entry.title.as_deref().unwrap_or(UNTITLED))?;
    write_text_element(writer, "link", entry.link.as_deref().unwrap_or(&config.site_base))?;
    write_text_element(writer, "guid", &derive_guid(entry))?;
    write_text_element(writer, "pubDate", &pub_date_rfc822(entry))?;

    let extracted = extract(entry, &config.site_base);
    let safe = sanitize(&extracted.html, &RESTRICTED);
    let plain = html_to_plain_text(&safe);
    write_text_element(
        writer,
        "description",
        &truncate_with_ellipsis(&plain, config.telegram_max),
    )?;

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .context("Failed to close item element")?;
    Ok(())
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to open {name} element"))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write {name} text"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to close {name} element"))?;
    Ok(())
}

fn write_cdata_element(writer: &mut XmlWriter, name: &str, html: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to open {name} element"))?;
    writer
        .write_event(Event::CData(BytesCData::new(html)))
        .with_context(|| format!("Failed to write {name} CDATA"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to close {name} element"))?;
    Ok(())
}

fn write_media_element(writer: &mut XmlWriter, name: &str, asset: &MediaAsset) -> Result<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("url", asset.url.as_str()));
    element.push_attribute(("type", asset.mime_type.as_str()));
    writer
        .write_event(Event::Empty(element))
        .with_context(|| format!("Failed to write {name} element"))?;
    Ok(())
}

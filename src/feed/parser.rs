//! Upstream feed parsing into pipeline-owned source entries.

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes are not recognizable RSS/Atom/JSON-feed XML.
    #[error("Feed could not be parsed: {0}")]
    Syntax(String),
    /// The feed parsed but carries no entries to republish.
    #[error("Feed parsed to zero entries")]
    Empty,
}

/// Structured body block with its declared media type.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    pub media_type: String,
    pub value: String,
}

/// One attached media resource as declared by the upstream feed.
#[derive(Debug, Clone)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: Option<String>,
}

/// One upstream article, normalized from whatever the source feed format
/// provided. Field-level gaps are preserved as `None`; the fallbacks are
/// applied downstream so the policy lives in one place per field.
#[derive(Debug, Clone, Default)]
pub struct SourceEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub content: Option<ContentBlock>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub enclosures: Vec<Enclosure>,
}

/// First candidate that is present and not blank.
///
/// Several entry fields resolve through an ordered fallback chain (body,
/// identifier source); this keeps those chains declarative at the call
/// site instead of nested conditionals.
pub fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Parse raw feed bytes into source entries, in document order.
///
/// Zero recoverable entries is an error, whether the XML was malformed or
/// simply empty: there is nothing to republish either way.
pub fn parse_source_feed(bytes: &[u8]) -> Result<Vec<SourceEntry>, ParseError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| ParseError::Syntax(e.to_string()))?;

    let entries: Vec<SourceEntry> = feed.entries.into_iter().map(convert_entry).collect();
    if entries.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(entries)
}

fn convert_entry(entry: Entry) -> SourceEntry {
    let id = Some(entry.id).filter(|id| !id.trim().is_empty());
    let title = entry.title.map(|t| t.content).filter(|t| !t.is_empty());
    let link = entry.links.first().map(|l| l.href.clone());
    let author = entry
        .authors
        .first()
        .map(|person| person.name.clone())
        .filter(|name| !name.trim().is_empty());

    let content = entry.content.and_then(|content| {
        let media_type = content.content_type.to_string();
        content.body.map(|value| ContentBlock { media_type, value })
    });
    let summary = entry.summary.map(|s| s.content);

    let tags = entry
        .categories
        .into_iter()
        .map(|category| category.term)
        .filter(|term| !term.trim().is_empty())
        .collect();

    // feed-rs maps both RSS <enclosure> and mediaRSS content here, in
    // document order.
    let enclosures = entry
        .media
        .into_iter()
        .flat_map(|object| object.content)
        .filter_map(|content| {
            let url = content.url?.to_string();
            Some(Enclosure {
                url,
                mime_type: content.content_type.map(|mime| mime.to_string()),
            })
        })
        .collect();

    SourceEntry {
        id,
        title,
        link,
        published: entry.published,
        updated: entry.updated,
        content,
        summary,
        author,
        tags,
        enclosures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com/</link>
    <description>Example feed</description>
    <item>
      <guid>post-1</guid>
      <title>First post</title>
      <link>https://example.com/post/1</link>
      <pubDate>Mon, 01 Jan 2024 10:30:00 GMT</pubDate>
      <description>&lt;p&gt;Summary &lt;img src="/img/a.png"&gt;&lt;/p&gt;</description>
      <category>tech</category>
      <category>rust</category>
      <enclosure url="https://example.com/media/cover.jpg" type="image/jpeg" length="1234"/>
    </item>
    <item>
      <title>Bare minimum</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parses_full_item() {
        let entries = parse_source_feed(FULL_RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title.as_deref(), Some("First post"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/post/1"));
        assert!(first.id.is_some());
        assert!(first.published.is_some());
        assert_eq!(first.tags, vec!["tech".to_string(), "rust".to_string()]);
        assert_eq!(first.enclosures.len(), 1);
        assert_eq!(
            first.enclosures[0].mime_type.as_deref(),
            Some("image/jpeg")
        );
        let summary = first.summary.as_deref().unwrap();
        assert!(summary.contains("<img"));
    }

    #[test]
    fn test_sparse_item_keeps_gaps() {
        let entries = parse_source_feed(FULL_RSS.as_bytes()).unwrap();
        let sparse = &entries[1];
        assert_eq!(sparse.title.as_deref(), Some("Bare minimum"));
        assert!(sparse.link.is_none());
        assert!(sparse.published.is_none());
        assert!(sparse.enclosures.is_empty());
    }

    #[test]
    fn test_atom_content_block_mapped() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom example</title>
  <id>urn:feed</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>urn:entry-1</id>
    <title>Entry</title>
    <updated>2024-01-02T00:00:00Z</updated>
    <content type="html">&lt;p&gt;Body&lt;/p&gt;</content>
  </entry>
</feed>"#;
        let entries = parse_source_feed(atom.as_bytes()).unwrap();
        let content = entries[0].content.as_ref().unwrap();
        assert!(content.media_type.starts_with("text/html"));
        assert!(content.value.contains("Body"));
        assert!(entries[0].updated.is_some());
    }

    #[test]
    fn test_garbage_is_syntax_error() {
        let result = parse_source_feed(b"<not valid xml");
        assert!(matches!(result, Err(ParseError::Syntax(_))));
    }

    #[test]
    fn test_empty_channel_is_empty_error() {
        let empty = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title><link>https://e.com</link><description>d</description></channel></rss>"#;
        let result = parse_source_feed(empty.as_bytes());
        assert!(matches!(result, Err(ParseError::Empty)));
    }

    #[test]
    fn test_first_present_skips_blank() {
        assert_eq!(
            first_present([None, Some(""), Some("   "), Some("value"), Some("later")]),
            Some("value")
        );
        assert_eq!(first_present([None, Some("  ")]), None);
    }
}

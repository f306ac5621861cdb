//! Canonical body extraction from heterogeneous entry representations.

use std::borrow::Cow;

use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::{absolutize, is_void, push_escaped_attr, push_escaped_text};
use crate::feed::{first_present, SourceEntry};

/// Entry body after source resolution and link absolutization.
///
/// Every `href`/`src` in `html` is already absolute (or left verbatim when
/// it cannot be resolved); no URL rewriting happens downstream of this.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub html: String,
    /// Absolutized `src` of the body's first `<img>`, when it has one.
    pub first_image: Option<String>,
}

/// Pick the entry's body HTML and rewrite its links to absolute form.
///
/// Body source order: the structured content block when its declared type
/// is an HTML media type, then the summary (feed-rs folds RSS
/// `<description>` into the summary), then empty. URLs resolve against the
/// entry link, falling back to the configured site base for linkless
/// entries.
pub fn extract(entry: &SourceEntry, site_base: &str) -> ExtractedContent {
    let body = first_present([
        entry
            .content
            .as_ref()
            .filter(|c| c.media_type.starts_with("text/html"))
            .map(|c| c.value.as_str()),
        entry.summary.as_deref(),
    ])
    .unwrap_or("");

    let base = entry.link.as_deref().unwrap_or(site_base);

    let doc = Html::parse_fragment(body);
    let mut rewriter = Rewriter {
        base,
        out: String::with_capacity(body.len()),
        first_image: None,
        saw_image: false,
    };
    for child in doc.root_element().children() {
        rewriter.walk(child);
    }

    ExtractedContent {
        html: rewriter.out,
        first_image: rewriter.first_image,
    }
}

struct Rewriter<'a> {
    base: &'a str,
    out: String,
    first_image: Option<String>,
    saw_image: bool,
}

impl Rewriter<'_> {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => push_escaped_text(&mut self.out, &text.text),
            Node::Element(_) => self.element(node),
            _ => {}
        }
    }

    fn element(&mut self, node: NodeRef<'_, Node>) {
        let Some(element) = node.value().as_element() else {
            return;
        };
        let tag = element.name();

        if tag == "img" && !self.saw_image {
            // Only the first image is representative; a later one with a
            // usable src does not get promoted.
            self.saw_image = true;
            if let Some(src) = element.attr("src").filter(|s| !s.is_empty()) {
                self.first_image = Some(absolutize(src, self.base));
            }
        }

        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in element.attrs() {
            let value: Cow<'_, str> =
                if (tag == "a" && name == "href") || (tag == "img" && name == "src") {
                    Cow::Owned(absolutize(value, self.base))
                } else {
                    Cow::Borrowed(value)
                };
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            push_escaped_attr(&mut self.out, &value);
            self.out.push('"');
        }
        self.out.push('>');

        if is_void(tag) {
            return;
        }
        for child in node.children() {
            self.walk(child);
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

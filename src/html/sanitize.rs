//! Allow-list HTML sanitizer driven by per-target profiles.
//!
//! A [`Profile`] is pure data: the tags and per-tag attributes a downstream
//! platform accepts, plus a few normalization switches. One generic
//! serializer consumes whichever profile it is handed, so adding a third
//! target is a new constant, not new code paths.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::{is_void, push_escaped_attr, push_escaped_char, push_escaped_text};

/// Sanitization policy for one downstream target.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub name: &'static str,
    allowed_tags: &'static [&'static str],
    /// Attributes permitted per tag. A tag absent here keeps no attributes.
    allowed_attrs: &'static [(&'static str, &'static [&'static str])],
    /// Remove `<img>` elements whose src is a data: URI. Inline binary
    /// payloads are rejected outright rather than passed downstream.
    drop_data_images: bool,
    /// Collapse whitespace runs in text content to single spaces.
    collapse_whitespace: bool,
    /// Cap on consecutive `<br>` tags; 0 leaves runs untouched.
    max_break_run: usize,
}

impl Profile {
    fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag)
    }

    fn allows_attr(&self, tag: &str, attr: &str) -> bool {
        self.allowed_attrs
            .iter()
            .any(|(t, attrs)| *t == tag && attrs.contains(&attr))
    }
}

/// Broad subset for content platforms that render article bodies.
pub static RICH: Profile = Profile {
    name: "rich",
    allowed_tags: &[
        "p",
        "br",
        "ul",
        "ol",
        "li",
        "blockquote",
        "b",
        "strong",
        "i",
        "em",
        "u",
        "s",
        "del",
        "code",
        "pre",
        "h2",
        "h3",
        "h4",
        "img",
        "a",
        "figure",
        "figcaption",
    ],
    allowed_attrs: &[
        ("a", &["href", "title"]),
        ("img", &["src", "alt", "title", "width", "height"]),
    ],
    drop_data_images: true,
    collapse_whitespace: false,
    max_break_run: 0,
};

/// Inline-only subset accepted by messaging-bot HTML parse modes.
pub static RESTRICTED: Profile = Profile {
    name: "restricted",
    allowed_tags: &[
        "b", "strong", "i", "em", "u", "s", "del", "code", "pre", "a", "br",
    ],
    allowed_attrs: &[("a", &["href"])],
    drop_data_images: false,
    collapse_whitespace: true,
    max_break_run: 2,
};

/// Strip `html` down to the profile's allow-list.
///
/// Disallowed tags are removed but their text content is kept; disallowed
/// attributes are dropped from elements that survive. Malformed input is
/// handled by the html5ever-based parser and degrades to whatever text it
/// can recover. Sanitizing already-sanitized output is a no-op.
pub fn sanitize(html: &str, profile: &Profile) -> String {
    let doc = Html::parse_fragment(html);
    let mut serializer = Serializer {
        profile,
        out: String::with_capacity(html.len()),
        break_run: 0,
        pending_space: false,
    };
    for child in doc.root_element().children() {
        serializer.walk(child);
    }
    serializer.out
}

struct Serializer<'a> {
    profile: &'a Profile,
    out: String,
    /// Consecutive `<br>` tags emitted, ignoring whitespace between them.
    break_run: usize,
    /// A collapsed whitespace run waiting to be flushed before real content.
    pending_space: bool,
}

impl Serializer<'_> {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.text(&text.text),
            Node::Element(_) => self.element(node),
            // Comments, doctypes and processing instructions never survive.
            _ => {}
        }
    }

    fn text(&mut self, s: &str) {
        if self.profile.collapse_whitespace {
            for c in s.chars() {
                if c.is_whitespace() {
                    self.pending_space = true;
                } else {
                    self.flush_space();
                    self.break_run = 0;
                    push_escaped_char(&mut self.out, c);
                }
            }
        } else {
            if s.chars().any(|c| !c.is_whitespace()) {
                self.break_run = 0;
            }
            push_escaped_text(&mut self.out, s);
        }
    }

    fn element(&mut self, node: NodeRef<'_, Node>) {
        let Some(element) = node.value().as_element() else {
            return;
        };
        let tag = element.name();

        if !self.profile.allows_tag(tag) {
            // Drop the tag itself but keep walking: inline text inside a
            // disallowed wrapper must not be lost.
            for child in node.children() {
                self.walk(child);
            }
            return;
        }

        if tag == "br" {
            let cap = self.profile.max_break_run;
            if cap > 0 && self.break_run >= cap {
                // Whitespace around a dropped break goes with it.
                self.pending_space = false;
                return;
            }
            self.flush_space();
            self.break_run += 1;
            self.out.push_str("<br>");
            return;
        }

        if tag == "img"
            && self.profile.drop_data_images
            && element
                .attr("src")
                .is_some_and(|src| src.trim_start().starts_with("data:"))
        {
            return;
        }

        self.flush_space();
        self.break_run = 0;

        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in element.attrs() {
            if self.profile.allows_attr(tag, name) {
                self.out.push(' ');
                self.out.push_str(name);
                self.out.push_str("=\"");
                push_escaped_attr(&mut self.out, value);
                self.out.push('"');
            }
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

    fn flush_space(&mut self) {
        if self.pending_space {
            if !self.out.is_empty() {
                self.out.push(' ');
            }
            self.pending_space = false;
        }
    }
}

//! HTML tree transforms for feed entry bodies.
//!
//! Every transform here follows the same shape: parse the fragment with
//! `scraper`, walk the node tree, emit a fresh string. Attribute values are
//! never patched with in-place text substitution, so a rewrite cannot
//! corrupt attribute boundaries.

mod extract;
mod sanitize;
mod text;

pub use extract::{extract, ExtractedContent};
pub use sanitize::{sanitize, Profile, RESTRICTED, RICH};
pub use text::{first_paragraph_text, html_to_plain_text, take_chars, truncate_with_ellipsis};

/// Tags serialized without a closing counterpart.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Escape text content for re-serialized HTML.
pub(crate) fn push_escaped_text(out: &mut String, s: &str) {
    for c in s.chars() {
        push_escaped_char(out, c);
    }
}

pub(crate) fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(c),
    }
}

/// Escape an attribute value; values are always emitted double-quoted.
pub(crate) fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Resolve `candidate` against `base`, keeping the original string when
/// either side is malformed. A broken link must never abort the pipeline.
pub(crate) fn absolutize(candidate: &str, base: &str) -> String {
    match url::Url::parse(base).and_then(|b| b.join(candidate)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => candidate.to_string(),
    }
}

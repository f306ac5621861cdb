//! Plain-text projections of sanitized HTML and character-budget helpers.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// Single-character ellipsis appended to truncated bot descriptions.
const ELLIPSIS: char = '…';

/// Flatten HTML to plain text: markup removed, `<br>` becomes a newline.
///
/// Intended for sanitized restricted-profile bodies, where the only
/// structure left is inline formatting plus line breaks.
pub fn html_to_plain_text(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let mut out = String::new();
    for child in doc.root_element().children() {
        collect_text(child, &mut out);
    }
    out.trim().to_string()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text.text),
        Node::Element(element) if element.name() == "br" => {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push('\n');
        }
        Node::Element(_) => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

/// Text content of the first `<p>` in `html`, fragments joined by single
/// spaces. `None` when the document has no paragraph at all.
pub fn first_paragraph_text(html: &str) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let doc = Html::parse_fragment(html);
    let paragraph = doc.select(&selector).next()?;
    let joined = paragraph
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined)
}

/// Longest prefix of `s` holding at most `max` characters. A hard cut with
/// no ellipsis, counted in chars, not bytes.
pub fn take_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate `s` to at most `max` characters for the bot description.
///
/// When the text exceeds the budget: cut at `max - 1`, walk back to the
/// nearest whitespace boundary so no word is split, then append a single
/// ellipsis. Callers guarantee `max >= 2`.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }

    let cut = take_chars(s, max.saturating_sub(1));
    let kept = match cut.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        Some((idx, _)) => cut[..idx].trim_end(),
        // A single unbroken word longer than the budget has no boundary to
        // respect; cutting it is the only option.
        None => cut,
    };

    let mut out = String::with_capacity(kept.len() + ELLIPSIS.len_utf8());
    out.push_str(kept);
    out.push(ELLIPSIS);
    out
}

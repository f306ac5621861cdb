//! Stable identity and publish-time derivation for output items.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::feed::{first_present, SourceEntry};

/// Derive the opaque identifier for an entry.
///
/// Sha256 hex of the first present of: upstream id (which carries the RSS
/// guid), link, then title + published timestamp. The same logical article
/// keeps its identifier across refreshes even when the upstream reformats
/// unrelated fields.
pub fn derive_guid(entry: &SourceEntry) -> String {
    let source = match first_present([entry.id.as_deref(), entry.link.as_deref()]) {
        Some(found) => found.to_string(),
        None => format!(
            "{}{}",
            entry.title.as_deref().unwrap_or(""),
            entry
                .published
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default()
        ),
    };
    let digest = Sha256::digest(source.as_bytes());
    format!("{digest:x}")
}

/// RFC-822 publish date for an entry, in UTC.
///
/// Published wins over updated; an entry with neither gets the current
/// time. The field is always emitted, never an error.
pub fn pub_date_rfc822(entry: &SourceEntry) -> String {
    let instant = entry.published.or(entry.updated).unwrap_or_else(Utc::now);
    format_rfc822(instant)
}

fn format_rfc822(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

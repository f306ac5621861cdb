//! Upstream feed access: HTTP fetch plus parsing into source entries.
//!
//! This is the inbound half of the pipeline. [`fetch_feed`] pulls raw bytes
//! from the configured origin; [`parse_source_feed`] turns them into
//! [`SourceEntry`] values the build side consumes.

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FetchError};
pub use parser::{
    first_present, parse_source_feed, ContentBlock, Enclosure, ParseError, SourceEntry,
};

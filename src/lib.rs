//! refeed republishes one upstream syndication feed as two normalized
//! RSS 2.0 variants: a rich document for content platforms that render
//! article bodies, and a restricted one for messaging-bot auto-posting.
//!
//! The pipeline per entry: extract the canonical body and absolutize its
//! links ([`html::extract`]), sanitize against a per-target allow-list
//! ([`html::sanitize`]), pick a representative media asset
//! ([`output::select_media`]), derive a stable identifier and RFC-822
//! timestamp ([`output::derive_guid`]), then serialize both documents
//! ([`output`]). [`cache::FeedCache`] runs that pipeline at most once per
//! TTL window and serves the results to the HTTP layer ([`server`]).

pub mod cache;
pub mod config;
pub mod feed;
pub mod html;
pub mod output;
pub mod server;

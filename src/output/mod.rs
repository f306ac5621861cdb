//! The build side of the pipeline: identity, media selection and
//! per-profile RSS serialization.

mod builder;
mod identity;
mod media;

pub use builder::{build_restricted_feed, build_rich_feed};
pub use identity::{derive_guid, pub_date_rfc822};
pub use media::{select_media, MediaAsset};

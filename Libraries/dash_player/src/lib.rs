//! Fetching and resolving DASH manifests down to a single media segment.
//!
//! - `mpd`: XML tree, manifest model and segment URL resolution.
//! - `segment`: HTTP transport used to download manifests and segments.

pub mod error;
pub mod mpd;
pub mod segment;

pub use error::DashError;
pub use mpd::resolver::{resolve_segment, ResolvedSegment, TemplateBinding};
pub use segment::fetcher::{HttpFetcher, SegmentSource};

//! Reads the event message (`emsg`) boxes of a DASH stream.
//!
//! The manifest is resolved to the first segment of its lowest-width video representation,
//! that segment is downloaded and every top-level `emsg` box is decoded and reduced to the
//! reported metadata keys.

pub mod args;
pub mod error;
pub mod metadata;
pub mod pipeline;

pub use error::InspectorError;
pub use metadata::{filter_message_data, FilteredMetadata, REPORTED_KEYS};
pub use pipeline::{inspect_file, inspect_segment, EmsgEvent, Inspector, SegmentReport};

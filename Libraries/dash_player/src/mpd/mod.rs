//! DASH manifest data structures (MPD and related types).
//! These hold the subset of an MPEG-DASH manifest needed to address a media segment.

pub mod parser;
pub mod resolver;
pub mod xml;

/// MIME type of the adaptation sets considered for segment resolution.
pub const VIDEO_MP4: &str = "video/mp4";

/// One `S` element of a SegmentTimeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Start time (`t`) as written in the manifest, absent when it follows the previous entry.
    pub start_time: Option<String>,
}

/// A SegmentTemplate, defined on an adaptation set or a representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentTemplate {
    /// URL template for the media segments (may contain $Time$, $RepresentationID$, etc.).
    pub media: Option<String>,
    /// Value of `$Number$` for the first segment, 1 when absent.
    pub start_number: Option<u64>,
    /// Entries of the nested SegmentTimeline, empty if there is none.
    pub timeline: Vec<TimelineEntry>,
}

impl SegmentTemplate {
    /// Fills the attributes missing here from the template of the enclosing element.
    pub fn inherit_from(&self, parent: &SegmentTemplate) -> SegmentTemplate {
        SegmentTemplate {
            media: self.media.clone().or_else(|| parent.media.clone()),
            start_number: self.start_number.or(parent.start_number),
            timeline: if self.timeline.is_empty() {
                parent.timeline.clone()
            } else {
                self.timeline.clone()
            },
        }
    }
}

/// A single video/audio representation within an adaptation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    /// Unique identifier for the representation.
    pub id: String,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Average bandwidth in bits per second (bps).
    pub bandwidth: Option<u64>,
    /// Template overriding the one of the parent adaptation set.
    pub segment_template: Option<SegmentTemplate>,
}

/// An adaptation set groups interchangeable representations of the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptationSet {
    pub id: Option<String>,
    /// MIME type of the media (e.g., "video/mp4").
    pub mime_type: Option<String>,
    /// All representations available in this adaptation set, in document order.
    pub representations: Vec<Representation>,
    pub segment_template: Option<SegmentTemplate>,
}

impl AdaptationSet {
    pub fn is_video_mp4(&self) -> bool {
        self.mime_type.as_deref() == Some(VIDEO_MP4)
    }

    /// Human readable label used in error messages.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => format!("AdaptationSet id={}", id),
            None => format!("AdaptationSet #{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub id: Option<String>,
    pub adaptation_sets: Vec<AdaptationSet>,
}

/// Top-level manifest, always holding at least one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mpd {
    pub periods: Vec<Period>,
}

/// Errors raised while fetching a manifest or resolving it to a segment URL.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    /// The server answered with a non-2xx status.
    #[error("Invalid status code for {url}: {status} - {reason}")]
    Transport { url: String, status: u16, reason: String },

    /// The request could not be sent or the body could not be read.
    #[error("Connection error for {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Malformed XML or a manifest without the expected structure.
    #[error("Manifest parse error: {0}")]
    ManifestParse(String),

    #[error("No video representations found in the manifest")]
    NoVideoRepresentation,

    #[error("No SegmentTemplate found: {0}")]
    NoSegmentTemplate(String),

    #[error("SegmentTimeline has no entries: {0}")]
    NoTimelineEntry(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl DashError {
    pub fn manifest<S: Into<String>>(msg: S) -> Self {
        Self::ManifestParse(msg.into())
    }
}

use dash_player::DashError;
use mp4_box::Mp4Error;

#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    #[error(transparent)]
    Dash(#[from] DashError),

    #[error("Failed to read boxes of segment {location}: {source}")]
    Segment {
        location: String,
        #[source]
        source: Mp4Error,
    },

    #[error("No argument provided for manifest URL")]
    MissingInput,

    #[error("Invalid manifest URL '{url}': {reason}")]
    InvalidManifestUrl { url: String, reason: String },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

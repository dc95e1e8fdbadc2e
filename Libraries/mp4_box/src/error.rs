/// Errors produced while walking or decoding ISO BMFF boxes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mp4Error {
    /// Box framing does not fit the buffer (size smaller than the header, or past the end).
    #[error("Malformed container at byte offset {offset}: {reason}")]
    MalformedContainer { offset: usize, reason: String },

    /// A full box carries a version this library cannot decode.
    #[error("Unsupported {box_type} version: {version}")]
    UnsupportedVersion { box_type: String, version: u8 },

    /// The payload ended before a fixed-width field or string terminator.
    #[error("Truncated payload while reading `{field}` at payload offset {offset}")]
    TruncatedPayload { field: &'static str, offset: usize },
}

impl Mp4Error {
    pub fn malformed<S: Into<String>>(offset: usize, reason: S) -> Self {
        Self::MalformedContainer { offset, reason: reason.into() }
    }
}

use crate::{
    format_capped_bytes, format_fourcc,
    reader::read_box_header,
    write_version_and_flags, ByteReader, Mp4Error,
};

use super::generic::Mp4Box;

/// `event_duration` value meaning the duration of the event is not known.
pub const EMSG_UNKNOWN_DURATION: u32 = 0xFFFF_FFFF;

/// Timing of an event. The variant decides which `emsg` version is used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmsgTiming {
    /// Version 0: offset from the earliest presentation time of the segment.
    PresentationTimeDelta(u32),
    /// Version 1: absolute presentation time on the timescale.
    PresentationTime(u64),
}

// The `EmsgBox` struct represents an Event Message Box (ISO/IEC 23009-1, 5.10.3.3).
// It carries a single timed metadata event attached to a media segment.
//
// Version 0 layout (after version/flags):
//   scheme_id_uri (cstring), value (cstring), timescale (u32),
//   presentation_time_delta (u32), event_duration (u32), id (u32), message_data
// Version 1 layout (after version/flags):
//   timescale (u32), presentation_time (u64), event_duration (u32), id (u32),
//   scheme_id_uri (cstring), value (cstring), message_data
#[derive(Clone, PartialEq, Eq)]
pub struct EmsgBox {
    pub flags: u32,
    pub scheme_id_uri: String,
    pub value: String,
    pub timescale: u32,
    pub timing: EmsgTiming,
    /// In `timescale` units, [`EMSG_UNKNOWN_DURATION`] is kept as is.
    pub event_duration: u32,
    pub id: u32,
    /// Opaque trailing bytes, not necessarily text.
    pub message_data: Vec<u8>,
}

impl EmsgBox {
    pub fn version(&self) -> u8 {
        match self.timing {
            EmsgTiming::PresentationTimeDelta(_) => 0,
            EmsgTiming::PresentationTime(_) => 1,
        }
    }

    /// Only set for version 1 boxes.
    pub fn presentation_time(&self) -> Option<u64> {
        match self.timing {
            EmsgTiming::PresentationTime(time) => Some(time),
            EmsgTiming::PresentationTimeDelta(_) => None,
        }
    }

    /// Only set for version 0 boxes.
    pub fn presentation_time_delta(&self) -> Option<u32> {
        match self.timing {
            EmsgTiming::PresentationTimeDelta(delta) => Some(delta),
            EmsgTiming::PresentationTime(_) => None,
        }
    }

    pub fn is_duration_unknown(&self) -> bool {
        self.event_duration == EMSG_UNKNOWN_DURATION
    }

    /// Decodes the payload of an `emsg` box, i.e. everything after the box header.
    pub fn parse_payload(payload: &[u8]) -> Result<Self, Mp4Error> {
        let mut reader = ByteReader::new(payload);
        let (version, flags) = reader.read_version_and_flags()?;

        match version {
            0 => {
                let scheme_id_uri = reader.read_null_terminated("scheme_id_uri")?;
                let value = reader.read_null_terminated("value")?;
                let timescale = reader.read_u32("timescale")?;
                let delta = reader.read_u32("presentation_time_delta")?;
                let event_duration = reader.read_u32("event_duration")?;
                let id = reader.read_u32("id")?;
                Ok(EmsgBox {
                    flags,
                    scheme_id_uri,
                    value,
                    timescale,
                    timing: EmsgTiming::PresentationTimeDelta(delta),
                    event_duration,
                    id,
                    message_data: reader.read_rest().to_vec(),
                })
            }
            1 => {
                let timescale = reader.read_u32("timescale")?;
                let time = reader.read_u64("presentation_time")?;
                let event_duration = reader.read_u32("event_duration")?;
                let id = reader.read_u32("id")?;
                let scheme_id_uri = reader.read_null_terminated("scheme_id_uri")?;
                let value = reader.read_null_terminated("value")?;
                Ok(EmsgBox {
                    flags,
                    scheme_id_uri,
                    value,
                    timescale,
                    timing: EmsgTiming::PresentationTime(time),
                    event_duration,
                    id,
                    message_data: reader.read_rest().to_vec(),
                })
            }
            version => Err(Mp4Error::UnsupportedVersion {
                box_type: "emsg".into(),
                version,
            }),
        }
    }

    fn strings_size(&self) -> u32 {
        (self.scheme_id_uri.len() + 1 + self.value.len() + 1) as u32
    }
}

impl std::fmt::Debug for EmsgBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmsgBox")
            .field("box_size", &self.box_size())
            .field("box_type", &format_fourcc(&self.box_type()))
            .field("version", &self.version())
            .field("flags", &format!("0x{:06X}", self.flags))
            .field("scheme_id_uri", &self.scheme_id_uri)
            .field("value", &self.value)
            .field("timescale", &self.timescale)
            .field("timing", &self.timing)
            .field("event_duration", &self.event_duration)
            .field("id", &self.id)
            .field("message_data", &format_capped_bytes(&self.message_data))
            .finish()
    }
}

// Implementation of the `Mp4Box` trait for the `EmsgBox` struct.
impl Mp4Box for EmsgBox {
    fn box_type(&self) -> [u8; 4] { *b"emsg" }

    // Header + version/flags + fixed fields + both strings with terminators + message data.
    // Version 1 stores a 64-bit presentation time, so it is 4 bytes longer.
    fn box_size(&self) -> u32 {
        let fixed = match self.timing {
            EmsgTiming::PresentationTimeDelta(_) => 4 * 4,
            EmsgTiming::PresentationTime(_) => 4 + 8 + 4 + 4,
        };
        8 + 4 + fixed + self.strings_size() + self.message_data.len() as u32
    }

    fn write_box(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.box_size().to_be_bytes());
        buffer.extend_from_slice(&self.box_type());
        write_version_and_flags(buffer, self.version(), self.flags);

        match self.timing {
            EmsgTiming::PresentationTimeDelta(delta) => {
                write_cstring(buffer, &self.scheme_id_uri);
                write_cstring(buffer, &self.value);
                buffer.extend_from_slice(&self.timescale.to_be_bytes());
                buffer.extend_from_slice(&delta.to_be_bytes());
                buffer.extend_from_slice(&self.event_duration.to_be_bytes());
                buffer.extend_from_slice(&self.id.to_be_bytes());
            }
            EmsgTiming::PresentationTime(time) => {
                buffer.extend_from_slice(&self.timescale.to_be_bytes());
                buffer.extend_from_slice(&time.to_be_bytes());
                buffer.extend_from_slice(&self.event_duration.to_be_bytes());
                buffer.extend_from_slice(&self.id.to_be_bytes());
                write_cstring(buffer, &self.scheme_id_uri);
                write_cstring(buffer, &self.value);
            }
        }

        buffer.extend_from_slice(&self.message_data);
    }

    fn read_box(data: &[u8]) -> Result<(Self, usize), Mp4Error> {
        let header = read_box_header(data, 0)?;
        if !header.is(b"emsg") {
            return Err(Mp4Error::malformed(
                0,
                format!("expected an emsg box, found '{}'", format_fourcc(&header.box_type)),
            ));
        }

        let emsg = EmsgBox::parse_payload(header.payload)?;
        Ok((emsg, header.size as usize))
    }
}

fn write_cstring(buffer: &mut Vec<u8>, text: &str) {
    buffer.extend_from_slice(text.as_bytes());
    buffer.push(0);
}

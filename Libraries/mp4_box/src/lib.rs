//! # ISO BMFF Box Reading
//!
//! Fragmented MP4 segments, as delivered by DASH and CMAF packagers, are a flat sequence of
//! **boxes** (also called atoms). Every box starts with a header that declares its size and a
//! 4-character type code, followed by a payload that is either raw data or more boxes.
//!
//! ## Box Header
//! - **size** (4 bytes, big-endian): total length of the box including the header.
//!   - `0` means the box extends to the end of the buffer.
//!   - `1` means a 64-bit `largesize` follows the type code (16 byte header).
//! - **type** (4 bytes): a 4-character code such as `styp`, `emsg`, `moof` or `mdat`.
//!
//! ## Boxes of Interest in a Media Segment
//! 1. **Segment Type Box (`styp`)**: brand information for the segment.
//! 2. **Event Message Box (`emsg`)**: timed metadata events (SCTE-35 splices, ID3, custom
//!    `key=value` payloads) that the packager attaches to the segment.
//! 3. **Movie Fragment Box (`moof`)** and **Media Data Box (`mdat`)**: the media itself.
//!
//! ## Implementation in This Library
//! - The `reader` module walks a buffer and yields borrowed [`reader::BoxRef`] views without
//!   copying or interpreting payloads.
//! - The `boxes` module decodes (and encodes) the box types we care about, currently `emsg`.
//!

pub mod boxes;
pub mod error;
pub mod reader;

pub use error::Mp4Error;

pub fn format_fourcc(fourcc: &[u8; 4]) -> String {
    std::str::from_utf8(fourcc).unwrap_or("????").to_string()
}

pub fn format_capped_bytes(data: &[u8]) -> String {
    let capped = &data[..data.len().min(8)];
    if data.len() > 8 {
        format!("{:?} ...", capped)
    } else {
        format!("{:?}", capped)
    }
}

pub fn write_version_and_flags(buffer: &mut Vec<u8>, version: u8, flags: u32) {
    buffer.push(version);
    buffer.push(((flags >> 16) & 0xFF) as u8);
    buffer.push(((flags >> 8) & 0xFF) as u8);
    buffer.push((flags & 0xFF) as u8);
}

/// Big-endian cursor over a box payload.
///
/// Every read names the field it is decoding so that a short buffer surfaces as
/// [`Mp4Error::TruncatedPayload`] pointing at the exact field and offset.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], Mp4Error> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.offset..end];
                self.offset = end;
                Ok(bytes)
            }
            None => Err(Mp4Error::TruncatedPayload { field, offset: self.offset }),
        }
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, Mp4Error> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, Mp4Error> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, Mp4Error> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8, field)?);
        Ok(u64::from_be_bytes(buf))
    }

    /// Reads the 1 byte version and 3 byte flags of a full box.
    pub fn read_version_and_flags(&mut self) -> Result<(u8, u32), Mp4Error> {
        let version = self.read_u8("version")?;
        let flags = self.take(3, "flags")?;
        let flags = ((flags[0] as u32) << 16) | ((flags[1] as u32) << 8) | flags[2] as u32;
        Ok((version, flags))
    }

    /// Reads a NUL terminated string and consumes the terminator.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_null_terminated(&mut self, field: &'static str) -> Result<String, Mp4Error> {
        let rest = &self.data[self.offset..];
        let Some(nul) = rest.iter().position(|b| *b == 0) else {
            return Err(Mp4Error::TruncatedPayload { field, offset: self.data.len() });
        };
        let text = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.offset += nul + 1;
        Ok(text)
    }

    /// Consumes everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.offset..];
        self.offset = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_fields_in_order() {
        let data = [0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x03, 0xE8, 0xAA];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_version_and_flags().unwrap(), (1, 2));
        assert_eq!(reader.read_u32("timescale").unwrap(), 1000);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_rest(), &[0xAA]);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_read_names_the_field() {
        let data = [0x00, 0x00, 0x01];
        let mut reader = ByteReader::new(&data);
        match reader.read_u32("timescale") {
            Err(Mp4Error::TruncatedPayload { field, offset }) => {
                assert_eq!(field, "timescale");
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn null_terminated_requires_terminator() {
        let mut reader = ByteReader::new(b"urn:a\0urn:b");
        assert_eq!(reader.read_null_terminated("scheme_id_uri").unwrap(), "urn:a");
        assert_eq!(reader.offset(), 6);
        assert!(matches!(
            reader.read_null_terminated("value"),
            Err(Mp4Error::TruncatedPayload { field: "value", .. })
        ));
    }

    #[test]
    fn fourcc_formatting() {
        assert_eq!(format_fourcc(b"emsg"), "emsg");
        assert_eq!(format_fourcc(&[0xFF, 0xFE, 0x00, 0x01]), "????");
        assert_eq!(format_capped_bytes(&[1, 2]), "[1, 2]");
        assert_eq!(format_capped_bytes(&[0; 9]), "[0, 0, 0, 0, 0, 0, 0, 0] ...");
    }
}

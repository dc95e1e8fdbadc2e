use crate::{boxes::emsg::EmsgBox, format_capped_bytes, format_fourcc, Mp4Error};

/// Length of a compact box header: 32-bit size + type code.
pub const BOX_HEADER_LEN: usize = 8;
/// Length of a box header that carries a 64-bit `largesize`.
pub const LARGE_BOX_HEADER_LEN: usize = 16;

/// A top-level box found in a buffer.
///
/// The payload borrows from the buffer handed to the walker, nothing is copied.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoxRef<'a> {
    pub box_type: [u8; 4],
    /// Declared size including the header.
    pub size: u64,
    /// Position of the box header in the source buffer.
    pub offset: usize,
    pub header_len: usize,
    pub payload: &'a [u8],
}

impl BoxRef<'_> {
    pub fn is(&self, box_type: &[u8; 4]) -> bool {
        &self.box_type == box_type
    }
}

impl std::fmt::Debug for BoxRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxRef")
            .field("box_type", &format_fourcc(&self.box_type))
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("header_len", &self.header_len)
            .field("payload", &format_capped_bytes(self.payload))
            .finish()
    }
}

/// Reads the box starting at `offset` of `data`.
pub fn read_box_header(data: &[u8], offset: usize) -> Result<BoxRef<'_>, Mp4Error> {
    let remaining = data.len().saturating_sub(offset);
    if remaining < BOX_HEADER_LEN {
        return Err(Mp4Error::malformed(
            offset,
            format!("{} trailing bytes are too small for a box header", remaining),
        ));
    }

    let header = &data[offset..];
    let compact_size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let box_type = [header[4], header[5], header[6], header[7]];

    let (size, header_len) = match compact_size {
        // Box runs until the end of the buffer
        0 => (remaining as u64, BOX_HEADER_LEN),
        1 => {
            if remaining < LARGE_BOX_HEADER_LEN {
                return Err(Mp4Error::malformed(
                    offset,
                    format!("box '{}' declares a largesize but only {} bytes remain", format_fourcc(&box_type), remaining),
                ));
            }
            let mut large = [0u8; 8];
            large.copy_from_slice(&header[8..16]);
            (u64::from_be_bytes(large), LARGE_BOX_HEADER_LEN)
        }
        size => (size as u64, BOX_HEADER_LEN),
    };

    if size < header_len as u64 {
        return Err(Mp4Error::malformed(
            offset,
            format!("box '{}' declares size {} which is smaller than its {} byte header", format_fourcc(&box_type), size, header_len),
        ));
    }
    if size > remaining as u64 {
        return Err(Mp4Error::malformed(
            offset,
            format!("box '{}' declares size {} but only {} bytes remain", format_fourcc(&box_type), size, remaining),
        ));
    }

    // `size <= remaining` so it fits in usize
    let end = offset + size as usize;
    Ok(BoxRef {
        box_type,
        size,
        offset,
        header_len,
        payload: &data[offset + header_len..end],
    })
}

/// Walks the top-level boxes of a buffer.
///
/// Yields every box in order and stops after the first framing error.
pub struct BoxIter<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> BoxIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0, failed: false }
    }
}

impl<'a> Iterator for BoxIter<'a> {
    type Item = Result<BoxRef<'a>, Mp4Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        match read_box_header(self.data, self.offset) {
            Ok(mp4_box) => {
                self.offset += mp4_box.size as usize;
                Some(Ok(mp4_box))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Splits a buffer into its top-level boxes. The declared sizes of the result always add up
/// to the buffer length.
pub fn parse_mp4_boxes(data: &[u8]) -> Result<Vec<BoxRef<'_>>, Mp4Error> {
    BoxIter::new(data).collect()
}

/// The `emsg` boxes of a segment together with the number of top-level boxes walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmsgScan {
    pub box_count: usize,
    /// Decoded boxes, in file order.
    pub emsg_boxes: Vec<EmsgBox>,
}

/// Decodes every top-level `emsg` box of a segment.
///
/// Fails on the first framing error or undecodable `emsg` box.
pub fn extract_emsg_boxes(data: &[u8]) -> Result<EmsgScan, Mp4Error> {
    let mut scan = EmsgScan::default();

    for mp4_box in BoxIter::new(data) {
        let mp4_box = mp4_box?;
        scan.box_count += 1;
        if mp4_box.is(b"emsg") {
            scan.emsg_boxes.push(EmsgBox::parse_payload(mp4_box.payload)?);
        }
    }

    Ok(scan)
}

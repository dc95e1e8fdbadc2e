use crate::Mp4Error;

// The `Mp4Box` trait defines a generic interface for MP4 boxes.
// Each box has a specific type, size, and content, and this trait provides
// methods to read and write these properties.
//
// Required Methods:
// - `box_type`: Returns the 4-byte type identifier of the box.
// - `box_size`: Calculates the total size of the box in bytes, including the header.
// - `write_box`: Serializes the box into a buffer for writing to a file or stream.
// - `read_box`: Parses the box, header included, from the start of a byte slice.
pub trait Mp4Box {
    // Returns the 4-byte type identifier of the box.
    fn box_type(&self) -> [u8; 4];

    // Calculates the total size of the box in bytes.
    // The size includes the header (8 bytes: 4 bytes for size and 4 bytes for type)
    // and the size of the box's content.
    fn box_size(&self) -> u32;

    // Serializes the box into the provided buffer.
    fn write_box(&self, buffer: &mut Vec<u8>);

    /// Reads a box from the given byte slice.
    /// Returns a tuple of (BoxInstance, bytes_consumed).
    fn read_box(data: &[u8]) -> Result<(Self, usize), Mp4Error> where Self: Sized;
}

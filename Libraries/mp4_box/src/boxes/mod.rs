// This module contains the MP4 box types this library decodes.
//
// The following submodules are included:
//
// - `emsg`: Defines the Event Message Box, which carries timed metadata events (version 0 and 1).
// - `generic`: Contains the `Mp4Box` trait, which provides a common interface for all MP4 boxes.

pub mod emsg;
pub mod generic;

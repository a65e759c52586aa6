//! Reads a single DICOM P10 object from an in-memory byte buffer and extracts
//! the subset of data elements needed to reconstruct a volumetric study,
//! producing a [`RawSlice`].
//!
//! The reader validates the P10 preamble and `DICM` prefix, parses the File
//! Meta Information group to determine the transfer syntax, then walks the
//! main element stream. Implicit VR Little Endian, Explicit VR Little Endian,
//! and JPEG Baseline (Process 1) are supported; anything else is rejected
//! before the main data set is touched.

mod internal;
mod jpeg;
mod raw_slice;
mod read_error;
mod reader;

pub use raw_slice::{PixelPayload, RawSlice};
pub use read_error::ReadError;
pub use reader::read_slice;

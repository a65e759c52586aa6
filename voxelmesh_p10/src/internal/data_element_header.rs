use voxelmesh_core::{DataElementTag, ValueRepresentation};

/// The length value that marks a data element as having undefined length,
/// with its contents delimited by items instead.
///
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

/// The decoded header of one data element: tag, VR, and value length. The VR
/// is absent for item and sequence delimiters and in implicit VR
/// serialization, where it comes from the dictionary instead.
///
pub struct DataElementHeader {
  pub tag: DataElementTag,
  pub vr: Option<ValueRepresentation>,
  pub length: u32,
}

impl DataElementHeader {
  /// Returns whether the element's value length is undefined.
  ///
  pub fn has_undefined_length(&self) -> bool {
    self.length == UNDEFINED_LENGTH
  }
}

//! Defines the type used to describe errors that can occur when reading a
//! DICOM P10 object into a raw slice.

use voxelmesh_core::{dictionary, DataElementTag, VoxelmeshError};

/// An error that occurred when reading DICOM P10 data. Error strings never
/// embed file paths or patient identifiers.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ReadError {
  /// The data is not a well-formed DICOM P10 object: the `DICM` prefix is
  /// missing, the element stream is structurally invalid, or the data ended
  /// unexpectedly.
  MalformedHeader { when: String, details: String },

  /// A data element required to interpret the pixel data, i.e. rows, columns,
  /// or bits allocated, is not present.
  MissingRequiredTag { tag: DataElementTag },

  /// The bits allocated value is not 8 or 16.
  UnsupportedBitsAllocated { bits_allocated: u16 },

  /// The object's transfer syntax is not one of Implicit VR Little Endian,
  /// Explicit VR Little Endian, or JPEG Baseline (Process 1).
  UnsupportedTransferSyntax { transfer_syntax_uid: String },

  /// The object carries no pixel data element, or its encapsulated pixel data
  /// holds no fragments.
  PixelDataAbsent,
}

impl std::fmt::Display for ReadError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM read error: {}", self.name())
  }
}

impl VoxelmeshError for ReadError {
  fn name(&self) -> &'static str {
    match self {
      ReadError::MalformedHeader { .. } => "Malformed header",
      ReadError::MissingRequiredTag { .. } => "Missing required tag",
      ReadError::UnsupportedBitsAllocated { .. } => {
        "Unsupported bits allocated"
      }
      ReadError::UnsupportedTransferSyntax { .. } => {
        "Unsupported transfer syntax"
      }
      ReadError::PixelDataAbsent => "Pixel data absent",
    }
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    match self {
      ReadError::MalformedHeader { when, details } => {
        vec![("when", when.clone()), ("details", details.clone())]
      }

      ReadError::MissingRequiredTag { tag } => vec![
        ("tag", tag.to_string()),
        ("name", dictionary::tag_name(*tag).to_string()),
      ],

      ReadError::UnsupportedBitsAllocated { bits_allocated } => {
        vec![("bits allocated", bits_allocated.to_string())]
      }

      ReadError::UnsupportedTransferSyntax {
        transfer_syntax_uid,
      } => {
        vec![("transfer syntax UID", transfer_syntax_uid.clone())]
      }

      ReadError::PixelDataAbsent => vec![],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn to_report_test() {
    assert_eq!(
      ReadError::MissingRequiredTag {
        tag: DataElementTag::new(0x0028, 0x0010)
      }
      .to_report("reading slice"),
      "error: Missing required tag (while reading slice)\n\
      \x20 tag: (0028,0010)\n\
      \x20 name: Rows"
    );

    assert_eq!(
      ReadError::UnsupportedTransferSyntax {
        transfer_syntax_uid: "1.2.840.10008.1.2.2".to_string()
      }
      .to_report("reading slice"),
      "error: Unsupported transfer syntax (while reading slice)\n\
      \x20 transfer syntax UID: 1.2.840.10008.1.2.2"
    );

    assert_eq!(
      ReadError::PixelDataAbsent.to_report("reading slice"),
      "error: Pixel data absent (while reading slice)"
    );
  }
}

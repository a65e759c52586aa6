//! Defines the type used to describe errors that can occur in the annotation
//! codecs.

use voxelmesh_core::VoxelmeshError;

/// An error that occurred when exporting or importing annotations. Codec
/// failures are non-destructive: import never replaces existing annotations
/// unless a complete set was parsed.
///
#[derive(Clone, Debug, PartialEq)]
pub enum SrError {
  /// No volume with usable geometry is loaded, so patient coordinates can't
  /// be converted to normalized coordinates.
  NoVolumeLoaded,

  /// The report or document is structurally invalid.
  MalformedReport { details: String },

  /// The report contains no geometric annotation items.
  NoAnnotationsFound,
}

impl std::fmt::Display for SrError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Annotation codec error: {}", self.name())
  }
}

impl VoxelmeshError for SrError {
  fn name(&self) -> &'static str {
    match self {
      SrError::NoVolumeLoaded => "No volume loaded",
      SrError::MalformedReport { .. } => "Malformed report",
      SrError::NoAnnotationsFound => "No annotations found",
    }
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    match self {
      SrError::MalformedReport { details } => {
        vec![("details", details.clone())]
      }
      SrError::NoVolumeLoaded | SrError::NoAnnotationsFound => vec![],
    }
  }
}

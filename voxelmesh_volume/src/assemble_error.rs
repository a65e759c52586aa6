//! Defines the type used to describe errors that can occur when assembling a
//! series from raw slices.

use voxelmesh_core::VoxelmeshError;

/// An error that occurred when assembling raw slices into a series.
///
#[derive(Clone, Debug, PartialEq)]
pub enum AssembleError {
  /// No slices were provided.
  EmptySeries,

  /// The slices do not agree on shape, sample format, or orientation.
  InconsistentSeries { details: String },
}

impl std::fmt::Display for AssembleError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Series assembly error: {}", self.name())
  }
}

impl VoxelmeshError for AssembleError {
  fn name(&self) -> &'static str {
    match self {
      AssembleError::EmptySeries => "Empty series",
      AssembleError::InconsistentSeries { .. } => "Inconsistent series",
    }
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    match self {
      AssembleError::EmptySeries => vec![],
      AssembleError::InconsistentSeries { details } => {
        vec![("details", details.clone())]
      }
    }
  }
}

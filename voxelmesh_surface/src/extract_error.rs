//! Defines the type used to describe errors that can occur during mesh
//! extraction.

use voxelmesh_core::VoxelmeshError;

/// An error that occurred during iso-surface extraction. Extraction failures
/// are fatal for the current attempt, but the caller may retry with a
/// different iso-value.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ExtractError {
  /// Marching cubes requires at least two voxels along every axis.
  DimensionTooSmall {
    width: usize,
    height: usize,
    depth: usize,
  },

  /// The iso-value is NaN or infinite.
  NonFiniteIso,

  /// The iso-value lies outside the volume's observed scalar range.
  IsoOutOfRange { iso: f32, min: f32, max: f32 },

  /// A single chunk exceeded the hard vertex budget.
  ChunkBudgetExceeded {
    chunk_index: usize,
    vertex_count: usize,
  },

  /// A cancellation request was observed at a chunk boundary.
  Cancelled,
}

impl std::fmt::Display for ExtractError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Mesh extraction error: {}", self.name())
  }
}

impl VoxelmeshError for ExtractError {
  fn name(&self) -> &'static str {
    match self {
      ExtractError::DimensionTooSmall { .. } => "Dimension too small",
      ExtractError::NonFiniteIso => "Non-finite iso-value",
      ExtractError::IsoOutOfRange { .. } => "Iso-value out of range",
      ExtractError::ChunkBudgetExceeded { .. } => "Chunk budget exceeded",
      ExtractError::Cancelled => "Cancelled",
    }
  }

  fn details(&self) -> Vec<(&'static str, String)> {
    match self {
      ExtractError::DimensionTooSmall {
        width,
        height,
        depth,
      } => {
        vec![("dimensions", format!("{}x{}x{}", width, height, depth))]
      }

      ExtractError::IsoOutOfRange { iso, min, max } => vec![
        ("iso-value", iso.to_string()),
        ("observed range", format!("[{}, {}]", min, max)),
      ],

      ExtractError::ChunkBudgetExceeded {
        chunk_index,
        vertex_count,
      } => vec![
        ("chunk", chunk_index.to_string()),
        ("vertices", vertex_count.to_string()),
      ],

      ExtractError::NonFiniteIso | ExtractError::Cancelled => vec![],
    }
  }
}

//! Voxelmesh reconstructs a volumetric DICOM study into a calibrated scalar
//! volume, extracts a triangle mesh of a chosen iso-surface with chunked
//! marching cubes, post-processes the mesh, and round-trips annotations
//! through structured report and JSON codecs.

/// Core DICOM concepts: data element tags, value representations, element
/// values, and transfer syntaxes.
///
pub mod core {
  pub use voxelmesh_core::*;
}

/// Reads single-frame DICOM P10 objects into raw slices.
///
pub mod p10 {
  pub use voxelmesh_p10::*;
}

/// Assembles slices into an ordered series, builds the calibrated volume,
/// and maps between normalized, voxel, and patient coordinates.
///
pub mod volume {
  pub use voxelmesh_volume::*;
}

/// Extracts and post-processes iso-surface meshes.
///
pub mod surface {
  pub use voxelmesh_surface::*;
}

/// Annotations and their structured report and JSON codecs.
///
pub mod sr {
  pub use voxelmesh_sr::*;
}

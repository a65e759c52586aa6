//! Turns parsed DICOM slices into an ordered [`Series`], a calibrated
//! [`Volume`] with an 8-bit display stack and an automatic iso-value, and a
//! [`GeometryMap`] that converts between normalized, voxel, and patient
//! coordinates.

mod assemble_error;
mod geometry;
mod otsu;
mod series;
mod volume;

pub use assemble_error::AssembleError;
pub use geometry::{GeometryError, GeometryMap};
pub use series::{assemble, Series, StudyMetadata};
pub use volume::{Dimensions, Volume, VolumeMetadata};

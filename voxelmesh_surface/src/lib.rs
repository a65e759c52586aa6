//! Extracts a triangle mesh of an iso-surface from a scalar volume using
//! chunked marching cubes, then post-processes it with Taubin smoothing and
//! area-weighted normal recomputation.
//!
//! The extractor partitions the volume into overlapping cubic chunks so that
//! per-chunk state stays bounded, deduplicates vertices within each chunk,
//! publishes monotone progress at chunk boundaries, and observes cancellation
//! between chunks. The long-running extraction can be moved off the caller's
//! thread with [`worker::spawn_extraction`], which transfers the volume in
//! and the finished mesh out by ownership.

mod extract_error;
mod extractor;
mod mesh;
mod smooth;
mod stl;
mod tables;
pub mod worker;

pub use extract_error::ExtractError;
pub use extractor::{
  extract_mesh, CancellationFlag, ExtractionOptions, MeshOutcome,
};
pub use mesh::{Aabb, Mesh};
pub use smooth::{recompute_normals, taubin_smooth, taubin_smooth_with};
pub use stl::{write_stl, write_stl_file};

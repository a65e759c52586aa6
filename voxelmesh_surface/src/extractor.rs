//! Chunked marching cubes over a scalar volume.
//!
//! The volume is partitioned into overlapping cubic chunks so that the
//! per-chunk vertex map stays small and cache-local. Vertices are
//! deduplicated within a chunk by quantized grid coordinate; cross-chunk
//! deduplication is intentionally not performed, as the chunk overlap plus
//! later normal recomputation yields visually continuous geometry while
//! keeping per-chunk state bounded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voxelmesh_volume::{GeometryMap, Volume};

use crate::mesh::{Aabb, Mesh};
use crate::smooth::recompute_normals;
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::ExtractError;

/// The default chunk side length in voxels.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Adjacent chunks overlap by this many voxels so boundary cells are
/// processed on both sides.
const CHUNK_OVERLAP: usize = 2;

/// The hard cap on vertices a single chunk may emit.
const CHUNK_VERTEX_BUDGET: usize = 4_000_000;

/// Scale applied to grid coordinates before rounding to build the vertex
/// deduplication key.
const DEDUP_QUANTIZATION_SCALE: f64 = 1e5;

/// Tolerance used to compare patient-space positions when two vertices land
/// in the same quantized bin.
const DEDUP_POSITION_TOLERANCE: f32 = 1e-4;

/// When the scalars at an edge's endpoints differ by less than this, the
/// midpoint is used instead of interpolating.
const INTERPOLATION_EPSILON: f32 = 1e-6;

/// Options for one extraction attempt.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionOptions {
  /// The scalar threshold at which the surface lies. Must be finite and
  /// within the volume's observed range.
  pub iso_value: f32,

  /// Chunk side length in voxels. Values below 4 are treated as 4.
  pub chunk_size: usize,
}

impl ExtractionOptions {
  /// Creates options with the given iso-value and the default chunk size.
  ///
  pub fn new(iso_value: f32) -> Self {
    Self {
      iso_value,
      chunk_size: DEFAULT_CHUNK_SIZE,
    }
  }
}

/// A cancellation flag shared between the caller and the extractor. The
/// extractor observes it at chunk boundaries only.
///
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
  /// Creates a new flag in the not-cancelled state.
  ///
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation. The extractor returns `Cancelled` at the next
  /// chunk boundary.
  ///
  pub fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  /// Returns whether cancellation has been requested.
  ///
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

/// The successful result of an extraction: either a mesh, or a marker that
/// the iso-surface intersects no cell.
///
#[derive(Clone, Debug, PartialEq)]
pub enum MeshOutcome {
  Surface(Mesh),
  Empty,
}

impl MeshOutcome {
  /// Returns the mesh, if the surface is non-empty.
  ///
  pub fn mesh(self) -> Option<Mesh> {
    match self {
      MeshOutcome::Surface(mesh) => Some(mesh),
      MeshOutcome::Empty => None,
    }
  }
}

/// One cubic chunk of the volume, given by its voxel origin and extents.
///
struct Chunk {
  x0: usize,
  y0: usize,
  z0: usize,
  extent_x: usize,
  extent_y: usize,
  extent_z: usize,
}

/// Extracts the iso-surface of a volume as a triangle mesh.
///
/// Progress is published through `progress` after each chunk as a monotone
/// value in [0, 1] that reaches 1.0 on success. Cancellation is observed
/// between chunks.
///
pub fn extract_mesh(
  volume: &Volume,
  options: &ExtractionOptions,
  progress: &mut dyn FnMut(f32),
  cancellation: &CancellationFlag,
) -> Result<MeshOutcome, ExtractError> {
  let dims = volume.dimensions;

  if dims.width < 2 || dims.height < 2 || dims.depth < 2 {
    return Err(ExtractError::DimensionTooSmall {
      width: dims.width,
      height: dims.height,
      depth: dims.depth,
    });
  }

  let iso = options.iso_value;

  if !iso.is_finite() {
    return Err(ExtractError::NonFiniteIso);
  }

  if iso < volume.min || iso > volume.max {
    return Err(ExtractError::IsoOutOfRange {
      iso,
      min: volume.min,
      max: volume.max,
    });
  }

  let geometry = GeometryMap::from_volume(volume);
  let chunks = partition(volume, options.chunk_size.max(4));
  let total_chunks = chunks.len();

  log::debug!(
    "Extracting iso-surface at {} over {} chunks",
    iso,
    total_chunks
  );

  let mut positions: Vec<f32> = vec![];
  let mut indices: Vec<u32> = vec![];
  let mut bounding_box = Aabb::empty();

  for (chunk_index, chunk) in chunks.iter().enumerate() {
    if cancellation.is_cancelled() {
      log::info!("Extraction cancelled after {} chunks", chunk_index);
      return Err(ExtractError::Cancelled);
    }

    let output = process_chunk(volume, &geometry, iso, chunk, chunk_index)?;

    // Rebase the chunk's indices onto the running vertex offset
    let vertex_offset = (positions.len() / 3) as u32;

    for vertex in output.positions.chunks_exact(3) {
      bounding_box.include([vertex[0], vertex[1], vertex[2]]);
    }

    positions.extend_from_slice(&output.positions);
    indices.extend(output.indices.iter().map(|index| index + vertex_offset));

    progress((chunk_index + 1) as f32 / total_chunks as f32);
  }

  if positions.is_empty() {
    return Ok(MeshOutcome::Empty);
  }

  let mut mesh = Mesh {
    normals: vec![0.0; positions.len()],
    positions,
    indices,
    bounding_box,
  };

  recompute_normals(&mut mesh);

  log::info!(
    "Extracted mesh with {} vertices and {} triangles",
    mesh.vertex_count(),
    mesh.triangle_count()
  );

  Ok(MeshOutcome::Surface(mesh))
}

/// Partitions the volume into overlapping chunks. Chunks cover every cell at
/// least once; cells in the overlap are processed by both neighbors.
///
fn partition(volume: &Volume, chunk_size: usize) -> Vec<Chunk> {
  let dims = volume.dimensions;
  let step = chunk_size - CHUNK_OVERLAP;

  let starts = |dimension: usize| {
    let mut values = vec![];
    let mut start = 0;

    while start + 1 < dimension {
      values.push(start);

      if start + chunk_size >= dimension {
        break;
      }

      start += step;
    }

    values
  };

  let mut chunks = vec![];

  for z0 in starts(dims.depth) {
    for y0 in starts(dims.height) {
      for x0 in starts(dims.width) {
        let chunk = Chunk {
          x0,
          y0,
          z0,
          extent_x: chunk_size.min(dims.width - x0),
          extent_y: chunk_size.min(dims.height - y0),
          extent_z: chunk_size.min(dims.depth - z0),
        };

        // Chunks narrower than one cell in any dimension are skipped
        if chunk.extent_x >= 2 && chunk.extent_y >= 2 && chunk.extent_z >= 2
        {
          chunks.push(chunk);
        }
      }
    }
  }

  chunks
}

struct ChunkOutput {
  positions: Vec<f32>,
  indices: Vec<u32>,
}

/// State for one chunk: emitted vertices and the deduplication map keyed by
/// quantized grid coordinate. Collisions within a bin are resolved by
/// comparing patient-space positions.
///
struct ChunkVertices<'a> {
  geometry: &'a GeometryMap,
  chunk_index: usize,
  positions: Vec<f32>,
  dedup: HashMap<(i64, i64, i64), Vec<u32>>,
}

impl ChunkVertices<'_> {
  /// Returns the index of the vertex at the given grid-space point, emitting
  /// it if an equivalent vertex hasn't been seen in this chunk.
  ///
  fn vertex_at(&mut self, grid: [f64; 3]) -> Result<u32, ExtractError> {
    let quantize =
      |value: f64| (value * DEDUP_QUANTIZATION_SCALE).round() as i64;
    let key = (quantize(grid[0]), quantize(grid[1]), quantize(grid[2]));

    let patient = self.geometry.voxel_to_patient(grid);
    let patient = [patient[0] as f32, patient[1] as f32, patient[2] as f32];

    if let Some(candidates) = self.dedup.get(&key) {
      for &index in candidates {
        let offset = index as usize * 3;
        let close = (self.positions[offset] - patient[0]).abs()
          <= DEDUP_POSITION_TOLERANCE
          && (self.positions[offset + 1] - patient[1]).abs()
            <= DEDUP_POSITION_TOLERANCE
          && (self.positions[offset + 2] - patient[2]).abs()
            <= DEDUP_POSITION_TOLERANCE;

        if close {
          return Ok(index);
        }
      }
    }

    let vertex_count = self.positions.len() / 3 + 1;
    if vertex_count > CHUNK_VERTEX_BUDGET {
      return Err(ExtractError::ChunkBudgetExceeded {
        chunk_index: self.chunk_index,
        vertex_count,
      });
    }

    let index = (self.positions.len() / 3) as u32;
    self.positions.extend_from_slice(&patient);
    self.dedup.entry(key).or_default().push(index);

    Ok(index)
  }
}

/// Runs marching cubes over every cell of one chunk.
///
fn process_chunk(
  volume: &Volume,
  geometry: &GeometryMap,
  iso: f32,
  chunk: &Chunk,
  chunk_index: usize,
) -> Result<ChunkOutput, ExtractError> {
  let dims = volume.dimensions;
  let field = &volume.field;

  let mut vertices = ChunkVertices {
    geometry,
    chunk_index,
    positions: vec![],
    dedup: HashMap::new(),
  };
  let mut indices: Vec<u32> = vec![];

  let scalar = |x: usize, y: usize, z: usize| {
    field[(z * dims.height + y) * dims.width + x]
  };

  for z in chunk.z0..chunk.z0 + chunk.extent_z - 1 {
    for y in chunk.y0..chunk.y0 + chunk.extent_y - 1 {
      for x in chunk.x0..chunk.x0 + chunk.extent_x - 1 {
        let mut corner_scalars = [0.0f32; 8];
        let mut cube_index = 0usize;

        for (corner, (dx, dy, dz)) in CORNER_OFFSETS.iter().enumerate() {
          let value = scalar(x + dx, y + dy, z + dz);
          corner_scalars[corner] = value;

          if value < iso {
            cube_index |= 1 << corner;
          }
        }

        let edge_mask = EDGE_TABLE[cube_index];
        if edge_mask == 0 {
          continue;
        }

        // Emit (or reuse) one vertex per crossed edge
        let mut edge_vertices = [0u32; 12];

        for (edge, (corner_a, corner_b)) in EDGE_CORNERS.iter().enumerate() {
          if edge_mask & (1 << edge) == 0 {
            continue;
          }

          let a = corner_scalars[*corner_a];
          let b = corner_scalars[*corner_b];

          let t = if (b - a).abs() < INTERPOLATION_EPSILON {
            0.5
          } else {
            (iso - a) / (b - a)
          };

          let (ax, ay, az) = CORNER_OFFSETS[*corner_a];
          let (bx, by, bz) = CORNER_OFFSETS[*corner_b];

          let grid = [
            (x + ax) as f64
              + f64::from(t) * ((x + bx) as f64 - (x + ax) as f64),
            (y + ay) as f64
              + f64::from(t) * ((y + by) as f64 - (y + ay) as f64),
            (z + az) as f64
              + f64::from(t) * ((z + bz) as f64 - (z + az) as f64),
          ];

          edge_vertices[edge] = vertices.vertex_at(grid)?;
        }

        for triangle in TRI_TABLE[cube_index].chunks_exact(3) {
          let a = edge_vertices[usize::from(triangle[0])];
          let b = edge_vertices[usize::from(triangle[1])];
          let c = edge_vertices[usize::from(triangle[2])];

          // Deduplication can collapse a sliver triangle onto itself
          if a == b || b == c || a == c {
            continue;
          }

          indices.extend_from_slice(&[a, b, c]);
        }
      }
    }
  }

  Ok(ChunkOutput {
    positions: vertices.positions,
    indices,
  })
}

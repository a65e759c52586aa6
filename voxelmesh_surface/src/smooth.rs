//! Mesh post-processing: Taubin λ/μ smoothing and area-weighted normal
//! recomputation.

use crate::mesh::{Aabb, Mesh};

/// Number of λ/μ iterations applied by [`taubin_smooth`].
pub const TAUBIN_ITERATIONS: usize = 2;

/// The inward (shrinking) smoothing weight.
pub const TAUBIN_LAMBDA: f32 = 0.4;

/// The outward (inflating) smoothing weight. Paired with λ it removes
/// per-cube staircasing while approximately preserving volume.
pub const TAUBIN_MU: f32 = -0.34;

/// Normals shorter than this after accumulation default to (0, 0, 1).
const DEGENERATE_NORMAL_EPSILON: f32 = 1e-12;

/// Applies Taubin smoothing to the mesh in place with the standard number of
/// iterations.
///
pub fn taubin_smooth(mesh: &mut Mesh) {
  taubin_smooth_with(mesh, TAUBIN_ITERATIONS);
}

/// Applies Taubin smoothing with an explicit iteration count: each iteration
/// runs a positive inward pass followed by a negative outward pass.
/// Neighbors are weighted by edge-occurrence count, vertices without
/// neighbors are left untouched, and the bounding box is refreshed
/// afterwards.
///
pub fn taubin_smooth_with(mesh: &mut Mesh, iterations: usize) {
  for _ in 0..iterations {
    smoothing_pass(mesh, TAUBIN_LAMBDA);
    smoothing_pass(mesh, TAUBIN_MU);
  }

  let mut bounding_box = Aabb::empty();
  for vertex in mesh.positions.chunks_exact(3) {
    bounding_box.include([vertex[0], vertex[1], vertex[2]]);
  }
  mesh.bounding_box = bounding_box;
}

/// Moves every vertex toward (or away from, for negative weights) the
/// average position of the vertices it shares a triangle with. A neighbor
/// that shares several triangles is counted once per shared triangle.
///
fn smoothing_pass(mesh: &mut Mesh, weight: f32) {
  let vertex_count = mesh.vertex_count();

  let mut neighbor_sums = vec![0.0f32; vertex_count * 3];
  let mut neighbor_counts = vec![0u32; vertex_count];

  let positions = &mesh.positions;

  let mut accumulate = |vertex: usize, neighbor: usize| {
    neighbor_sums[vertex * 3] += positions[neighbor * 3];
    neighbor_sums[vertex * 3 + 1] += positions[neighbor * 3 + 1];
    neighbor_sums[vertex * 3 + 2] += positions[neighbor * 3 + 2];
    neighbor_counts[vertex] += 1;
  };

  for triangle in mesh.indices.chunks_exact(3) {
    let a = triangle[0] as usize;
    let b = triangle[1] as usize;
    let c = triangle[2] as usize;

    if a >= vertex_count || b >= vertex_count || c >= vertex_count {
      continue;
    }

    accumulate(a, b);
    accumulate(a, c);
    accumulate(b, a);
    accumulate(b, c);
    accumulate(c, a);
    accumulate(c, b);
  }

  for vertex in 0..vertex_count {
    let count = neighbor_counts[vertex];
    if count == 0 {
      continue;
    }

    for axis in 0..3 {
      let average = neighbor_sums[vertex * 3 + axis] / count as f32;
      let position = &mut mesh.positions[vertex * 3 + axis];
      *position += weight * (average - *position);
    }
  }
}

/// Recomputes vertex normals from scratch: every triangle's unnormalized
/// face normal (b − a) × (c − a) is added to its three vertex normals, so
/// larger triangles weigh more, then each vertex normal is normalized.
/// Near-zero accumulations default to (0, 0, 1).
///
pub fn recompute_normals(mesh: &mut Mesh) {
  let vertex_count = mesh.vertex_count();

  mesh.normals.clear();
  mesh.normals.resize(vertex_count * 3, 0.0);

  for triangle in mesh.indices.chunks_exact(3) {
    let a = triangle[0] as usize;
    let b = triangle[1] as usize;
    let c = triangle[2] as usize;

    if a >= vertex_count || b >= vertex_count || c >= vertex_count {
      continue;
    }

    let pa = mesh.position(a);
    let pb = mesh.position(b);
    let pc = mesh.position(c);

    let edge_ab = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
    let edge_ac = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];

    let face_normal = [
      edge_ab[1] * edge_ac[2] - edge_ab[2] * edge_ac[1],
      edge_ab[2] * edge_ac[0] - edge_ab[0] * edge_ac[2],
      edge_ab[0] * edge_ac[1] - edge_ab[1] * edge_ac[0],
    ];

    for vertex in [a, b, c] {
      mesh.normals[vertex * 3] += face_normal[0];
      mesh.normals[vertex * 3 + 1] += face_normal[1];
      mesh.normals[vertex * 3 + 2] += face_normal[2];
    }
  }

  for normal in mesh.normals.chunks_exact_mut(3) {
    let length = (normal[0] * normal[0]
      + normal[1] * normal[1]
      + normal[2] * normal[2])
      .sqrt();

    if length < DEGENERATE_NORMAL_EPSILON {
      normal.copy_from_slice(&[0.0, 0.0, 1.0]);
    } else {
      normal[0] /= length;
      normal[1] /= length;
      normal[2] /= length;
    }
  }
}

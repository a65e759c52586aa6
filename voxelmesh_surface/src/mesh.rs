//! The triangle mesh produced by iso-surface extraction.

/// An axis-aligned bounding box in patient coordinates.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl Aabb {
  /// An empty box that any point will expand.
  ///
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Expands the box to contain the given point.
  ///
  pub fn include(&mut self, point: [f32; 3]) {
    for axis in 0..3 {
      self.min[axis] = self.min[axis].min(point[axis]);
      self.max[axis] = self.max[axis].max(point[axis]);
    }
  }
}

/// A watertight-by-construction triangle mesh: packed vertex positions and
/// unit normals, triangle indices, and the bounding box of all vertices in
/// patient coordinates. Read-only once published.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
  /// Packed x, y, z positions, length 3 · vertex count.
  pub positions: Vec<f32>,

  /// Packed unit normals, length 3 · vertex count.
  pub normals: Vec<f32>,

  /// Triangle indices, length 3 · triangle count, each below the vertex
  /// count.
  pub indices: Vec<u32>,

  pub bounding_box: Aabb,
}

impl Mesh {
  /// Returns the number of vertices in the mesh.
  ///
  pub fn vertex_count(&self) -> usize {
    self.positions.len() / 3
  }

  /// Returns the number of triangles in the mesh.
  ///
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Returns the position of one vertex.
  ///
  pub fn position(&self, vertex: usize) -> [f32; 3] {
    [
      self.positions[vertex * 3],
      self.positions[vertex * 3 + 1],
      self.positions[vertex * 3 + 2],
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aabb_include_test() {
    let mut aabb = Aabb::empty();

    aabb.include([1.0, -2.0, 3.0]);
    aabb.include([-1.0, 5.0, 0.0]);

    assert_eq!(aabb.min, [-1.0, -2.0, 0.0]);
    assert_eq!(aabb.max, [1.0, 5.0, 3.0]);
  }
}

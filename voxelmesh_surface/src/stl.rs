//! Writes an extracted mesh as a binary STL file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mesh::Mesh;

/// Writes the mesh's triangles to the given writer in binary STL format.
/// STL stores one flat normal per facet, so face normals are derived from
/// the triangle corners rather than the mesh's per-vertex normals.
///
pub fn write_stl(
  mesh: &Mesh,
  writer: &mut impl Write,
) -> std::io::Result<()> {
  let triangles = mesh.indices.chunks_exact(3).map(|triangle| {
    let a = mesh.position(triangle[0] as usize);
    let b = mesh.position(triangle[1] as usize);
    let c = mesh.position(triangle[2] as usize);

    let edge_ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let edge_ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];

    let mut normal = [
      edge_ab[1] * edge_ac[2] - edge_ab[2] * edge_ac[1],
      edge_ab[2] * edge_ac[0] - edge_ab[0] * edge_ac[2],
      edge_ab[0] * edge_ac[1] - edge_ab[1] * edge_ac[0],
    ];

    let length = (normal[0] * normal[0]
      + normal[1] * normal[1]
      + normal[2] * normal[2])
      .sqrt();

    if length > 0.0 {
      normal = [normal[0] / length, normal[1] / length, normal[2] / length];
    } else {
      normal = [0.0, 0.0, 1.0];
    }

    stl_io::Triangle {
      normal: stl_io::Normal::new(normal),
      vertices: [
        stl_io::Vertex::new(a),
        stl_io::Vertex::new(b),
        stl_io::Vertex::new(c),
      ],
    }
  });

  stl_io::write_stl(writer, triangles)
}

/// Writes the mesh to a binary STL file at the given path.
///
pub fn write_stl_file(mesh: &Mesh, path: &Path) -> std::io::Result<()> {
  let mut writer = BufWriter::new(File::create(path)?);

  write_stl(mesh, &mut writer)?;

  writer.flush()
}

#[cfg(test)]
mod tests {
  use crate::mesh::Aabb;

  use super::*;

  #[test]
  fn write_stl_test() {
    let mesh = Mesh {
      positions: vec![
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
      ],
      normals: vec![0.0; 9],
      indices: vec![0, 1, 2],
      bounding_box: Aabb {
        min: [0.0, 0.0, 0.0],
        max: [1.0, 1.0, 0.0],
      },
    };

    let mut bytes = vec![];
    write_stl(&mesh, &mut bytes).unwrap();

    // 80-byte header, 4-byte triangle count, 50 bytes per triangle
    assert_eq!(bytes.len(), 84 + 50);
    assert_eq!(bytes[80..84], 1u32.to_le_bytes());
  }
}

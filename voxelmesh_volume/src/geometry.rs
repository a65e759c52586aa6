//! Bidirectional mapping between normalized [0,1]³, voxel, and patient
//! coordinates. This is the single source of truth for coordinate
//! interchange; the mesh extractor and the annotation codec both consume it.

use voxelmesh_core::VoxelmeshError;

use crate::volume::{Dimensions, Volume};

/// An error that occurred when converting between coordinate spaces.
///
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryError {
  /// The orientation matrix is singular and patient coordinates can't be
  /// mapped back to voxel coordinates.
  SingularOrientation,
}

impl std::fmt::Display for GeometryError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Geometry error: {}", self.name())
  }
}

impl VoxelmeshError for GeometryError {
  fn name(&self) -> &'static str {
    match self {
      GeometryError::SingularOrientation => "Singular orientation",
    }
  }
}

/// The determinant magnitude below which the orientation matrix is treated
/// as singular.
const DETERMINANT_EPSILON: f64 = 1e-8;

/// Maps between normalized, voxel, and patient coordinates for one volume.
/// The orientation matrix columns are the row direction, column direction,
/// and slice normal.
///
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryMap {
  dimensions: Dimensions,
  spacing: [f64; 3],
  origin: [f64; 3],
  matrix: [[f64; 3]; 3],
  inverse: Option<[[f64; 3]; 3]>,
}

impl GeometryMap {
  /// Creates a geometry map from a volume's dimensions, spacing, origin, and
  /// 9-entry orientation.
  ///
  pub fn new(
    dimensions: Dimensions,
    spacing: [f64; 3],
    origin: [f64; 3],
    orientation: &[f64; 9],
  ) -> Self {
    // Columns are the row direction, column direction, and slice normal
    let matrix = [
      [orientation[0], orientation[3], orientation[6]],
      [orientation[1], orientation[4], orientation[7]],
      [orientation[2], orientation[5], orientation[8]],
    ];

    Self {
      dimensions,
      spacing,
      origin,
      matrix,
      inverse: invert(&matrix),
    }
  }

  /// Creates a geometry map for a volume.
  ///
  pub fn from_volume(volume: &Volume) -> Self {
    Self::new(
      volume.dimensions,
      volume.spacing,
      volume.origin,
      &volume.orientation,
    )
  }

  /// Converts a normalized [0,1]³ coordinate to a voxel coordinate by
  /// scaling each component by (dimension − 1).
  ///
  pub fn normalized_to_voxel(&self, normalized: [f64; 3]) -> [f64; 3] {
    let dims = self.dimension_extents();

    [
      normalized[0] * dims[0],
      normalized[1] * dims[1],
      normalized[2] * dims[2],
    ]
  }

  /// Converts a voxel coordinate to normalized [0,1]³ space. Axes with a
  /// single voxel map to 0.
  ///
  pub fn voxel_to_normalized(&self, voxel: [f64; 3]) -> [f64; 3] {
    let dims = self.dimension_extents();

    let component = |value: f64, extent: f64| {
      if extent > 0.0 {
        value / extent
      } else {
        0.0
      }
    };

    [
      component(voxel[0], dims[0]),
      component(voxel[1], dims[1]),
      component(voxel[2], dims[2]),
    ]
  }

  /// Converts a voxel coordinate to patient space: scale by spacing, apply
  /// the orientation matrix, add the origin.
  ///
  pub fn voxel_to_patient(&self, voxel: [f64; 3]) -> [f64; 3] {
    let scaled = [
      voxel[0] * self.spacing[0],
      voxel[1] * self.spacing[1],
      voxel[2] * self.spacing[2],
    ];

    let rotated = multiply(&self.matrix, &scaled);

    [
      rotated[0] + self.origin[0],
      rotated[1] + self.origin[1],
      rotated[2] + self.origin[2],
    ]
  }

  /// Converts a patient-space coordinate to a voxel coordinate: subtract the
  /// origin, apply the matrix inverse, divide by spacing. Fails when the
  /// orientation matrix is singular.
  ///
  pub fn patient_to_voxel(
    &self,
    patient: [f64; 3],
  ) -> Result<[f64; 3], GeometryError> {
    let inverse =
      self.inverse.as_ref().ok_or(GeometryError::SingularOrientation)?;

    let translated = [
      patient[0] - self.origin[0],
      patient[1] - self.origin[1],
      patient[2] - self.origin[2],
    ];

    let rotated = multiply(inverse, &translated);

    Ok([
      rotated[0] / self.spacing[0],
      rotated[1] / self.spacing[1],
      rotated[2] / self.spacing[2],
    ])
  }

  /// Converts a normalized coordinate straight to patient space.
  ///
  pub fn normalized_to_patient(&self, normalized: [f64; 3]) -> [f64; 3] {
    self.voxel_to_patient(self.normalized_to_voxel(normalized))
  }

  /// Converts a patient-space coordinate straight to normalized space.
  ///
  pub fn patient_to_normalized(
    &self,
    patient: [f64; 3],
  ) -> Result<[f64; 3], GeometryError> {
    Ok(self.voxel_to_normalized(self.patient_to_voxel(patient)?))
  }

  fn dimension_extents(&self) -> [f64; 3] {
    [
      (self.dimensions.width.saturating_sub(1)) as f64,
      (self.dimensions.height.saturating_sub(1)) as f64,
      (self.dimensions.depth.saturating_sub(1)) as f64,
    ]
  }
}

fn multiply(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
  [
    matrix[0][0] * vector[0]
      + matrix[0][1] * vector[1]
      + matrix[0][2] * vector[2],
    matrix[1][0] * vector[0]
      + matrix[1][1] * vector[1]
      + matrix[1][2] * vector[2],
    matrix[2][0] * vector[0]
      + matrix[2][1] * vector[1]
      + matrix[2][2] * vector[2],
  ]
}

/// Inverts a 3×3 matrix via cofactors. Returns `None` when the determinant's
/// magnitude is below the singularity threshold.
///
fn invert(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
  let cofactor_00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
  let cofactor_01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
  let cofactor_02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

  let determinant =
    m[0][0] * cofactor_00 + m[0][1] * cofactor_01 + m[0][2] * cofactor_02;

  if determinant.abs() < DETERMINANT_EPSILON {
    return None;
  }

  let cofactor_10 = m[0][2] * m[2][1] - m[0][1] * m[2][2];
  let cofactor_11 = m[0][0] * m[2][2] - m[0][2] * m[2][0];
  let cofactor_12 = m[0][1] * m[2][0] - m[0][0] * m[2][1];

  let cofactor_20 = m[0][1] * m[1][2] - m[0][2] * m[1][1];
  let cofactor_21 = m[0][2] * m[1][0] - m[0][0] * m[1][2];
  let cofactor_22 = m[0][0] * m[1][1] - m[0][1] * m[1][0];

  Some([
    [
      cofactor_00 / determinant,
      cofactor_10 / determinant,
      cofactor_20 / determinant,
    ],
    [
      cofactor_01 / determinant,
      cofactor_11 / determinant,
      cofactor_21 / determinant,
    ],
    [
      cofactor_02 / determinant,
      cofactor_12 / determinant,
      cofactor_22 / determinant,
    ],
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn axis_aligned_map() -> GeometryMap {
    GeometryMap::new(
      Dimensions {
        width: 16,
        height: 16,
        depth: 16,
      },
      [0.5, 0.75, 2.0],
      [10.0, 20.0, 30.0],
      &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    )
  }

  #[test]
  fn voxel_to_patient_test() {
    let map = axis_aligned_map();

    assert_eq!(
      map.voxel_to_patient([2.0, 4.0, 8.0]),
      [11.0, 23.0, 46.0]
    );
  }

  #[test]
  fn patient_round_trip_test() {
    let map = axis_aligned_map();

    let voxel = [2.0, 4.0, 8.0];
    let round_tripped =
      map.patient_to_voxel(map.voxel_to_patient(voxel)).unwrap();

    assert_eq!(round_tripped, voxel);
  }

  #[test]
  fn rotated_round_trip_test() {
    // Row direction along y, column direction along z
    let map = GeometryMap::new(
      Dimensions {
        width: 8,
        height: 8,
        depth: 8,
      },
      [1.0, 1.5, 3.0],
      [-5.0, 2.0, 9.0],
      &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
    );

    let voxel = [3.0, 5.0, 1.0];
    let patient = map.voxel_to_patient(voxel);
    let round_tripped = map.patient_to_voxel(patient).unwrap();

    for (a, b) in round_tripped.iter().zip(voxel.iter()) {
      assert!((a - b).abs() < 1e-6);
    }
  }

  #[test]
  fn normalized_conversions_test() {
    let map = axis_aligned_map();

    assert_eq!(
      map.normalized_to_voxel([0.0, 0.5, 1.0]),
      [0.0, 7.5, 15.0]
    );

    assert_eq!(
      map.voxel_to_normalized([0.0, 7.5, 15.0]),
      [0.0, 0.5, 1.0]
    );
  }

  #[test]
  fn single_voxel_axis_normalizes_to_zero_test() {
    let map = GeometryMap::new(
      Dimensions {
        width: 4,
        height: 4,
        depth: 1,
      },
      [1.0, 1.0, 1.0],
      [0.0, 0.0, 0.0],
      &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    );

    assert_eq!(map.voxel_to_normalized([3.0, 3.0, 0.0]), [1.0, 1.0, 0.0]);
  }

  #[test]
  fn singular_orientation_test() {
    // Row and column directions are parallel, so the matrix has no inverse
    let map = GeometryMap::new(
      Dimensions {
        width: 4,
        height: 4,
        depth: 4,
      },
      [1.0, 1.0, 1.0],
      [0.0, 0.0, 0.0],
      &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    );

    assert_eq!(
      map.patient_to_voxel([1.0, 2.0, 3.0]),
      Err(GeometryError::SingularOrientation)
    );

    // The forward direction still works
    assert_eq!(map.voxel_to_patient([1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
  }
}

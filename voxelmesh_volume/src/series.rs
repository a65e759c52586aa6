//! Orders raw slices into a series, verifies their geometric consistency,
//! and derives voxel spacing and study-level metadata.

use voxelmesh_p10::RawSlice;

use crate::volume::Dimensions;
use crate::AssembleError;

/// The tolerance used when comparing orientation direction cosines across
/// slices.
const ORIENTATION_TOLERANCE: f64 = 1e-6;

/// Study-level identifiers, taken from the first slice in which each is
/// present, plus the per-slice SOP instance UIDs in series order.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudyMetadata {
  pub patient_id: Option<String>,
  pub study_instance_uid: Option<String>,
  pub series_instance_uid: Option<String>,
  pub frame_of_reference_uid: Option<String>,
  pub modality: Option<String>,
  pub study_date: Option<String>,

  /// SOP instance UID of each slice, ordered the same way as the series.
  pub sop_instance_uids: Vec<Option<String>>,
}

/// An ordered sequence of raw slices plus the geometry derived from them.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
  pub slices: Vec<RawSlice>,

  /// Width (columns), height (rows), and depth (slice count).
  pub dimensions: Dimensions,

  /// Image position of the first slice, or the patient-space origin when no
  /// slice carries a position.
  pub origin: [f64; 3],

  /// Row direction then column direction cosines. Identity when no slice
  /// carries an orientation, in which case `has_orientation` is false and
  /// exported patient coordinates are approximate.
  pub orientation: [f64; 6],
  pub has_orientation: bool,

  /// Voxel spacing (sx, sy, sz) in millimeters, all strictly positive.
  pub spacing: [f64; 3],

  pub metadata: StudyMetadata,
}

/// Assembles raw slices into an ordered, consistent series.
///
pub fn assemble(mut slices: Vec<RawSlice>) -> Result<Series, AssembleError> {
  if slices.is_empty() {
    return Err(AssembleError::EmptySeries);
  }

  sort_slices(&mut slices);

  check_consistency(&slices)?;

  let (orientation, has_orientation) =
    match slices.iter().find_map(|slice| slice.orientation) {
      Some(orientation) => (orientation, true),
      None => ([1.0, 0.0, 0.0, 0.0, 1.0, 0.0], false),
    };

  if !has_orientation {
    log::warn!(
      "No slice carries an orientation, patient coordinates are approximate"
    );
  }

  let origin = slices[0].position.unwrap_or([0.0, 0.0, 0.0]);
  let spacing = derive_spacing(&slices, &orientation);

  let metadata = StudyMetadata {
    patient_id: first_present(&slices, |slice| slice.patient_id.clone()),
    study_instance_uid: first_present(&slices, |slice| {
      slice.study_instance_uid.clone()
    }),
    series_instance_uid: first_present(&slices, |slice| {
      slice.series_instance_uid.clone()
    }),
    frame_of_reference_uid: first_present(&slices, |slice| {
      slice.frame_of_reference_uid.clone()
    }),
    modality: first_present(&slices, |slice| slice.modality.clone()),
    study_date: first_present(&slices, |slice| slice.study_date.clone()),
    sop_instance_uids: slices
      .iter()
      .map(|slice| slice.sop_instance_uid.clone())
      .collect(),
  };

  let dimensions = Dimensions {
    width: usize::from(slices[0].columns),
    height: usize::from(slices[0].rows),
    depth: slices.len(),
  };

  log::info!(
    "Assembled series of {} slices, {}x{} samples, spacing ({:.3}, {:.3}, \
     {:.3}) mm",
    dimensions.depth,
    dimensions.width,
    dimensions.height,
    spacing[0],
    spacing[1],
    spacing[2],
  );

  Ok(Series {
    slices,
    dimensions,
    origin,
    orientation,
    has_orientation,
    spacing,
    metadata,
  })
}

/// Sorts slices ascending by the z component of their image position, with
/// ties broken by instance number. Slices missing both signals keep their
/// insertion order because the sort is stable.
///
fn sort_slices(slices: &mut [RawSlice]) {
  slices.sort_by(|a, b| {
    match (a.position, b.position) {
      (Some(pa), Some(pb)) => {
        match pa[2].partial_cmp(&pb[2]) {
          Some(std::cmp::Ordering::Equal) | None => (),
          Some(ordering) => return ordering,
        }
      }
      _ => (),
    }

    match (a.instance_number, b.instance_number) {
      (Some(ia), Some(ib)) => ia.cmp(&ib),
      _ => std::cmp::Ordering::Equal,
    }
  });
}

fn check_consistency(slices: &[RawSlice]) -> Result<(), AssembleError> {
  let first = &slices[0];

  for slice in slices.iter().skip(1) {
    if slice.rows != first.rows || slice.columns != first.columns {
      return Err(AssembleError::InconsistentSeries {
        details: format!(
          "Slice shape {}x{} does not match {}x{}",
          slice.columns, slice.rows, first.columns, first.rows
        ),
      });
    }

    if slice.bits_allocated != first.bits_allocated {
      return Err(AssembleError::InconsistentSeries {
        details: format!(
          "Bits allocated {} does not match {}",
          slice.bits_allocated, first.bits_allocated
        ),
      });
    }

    if slice.is_signed != first.is_signed {
      return Err(AssembleError::InconsistentSeries {
        details: "Pixel representation differs between slices".to_string(),
      });
    }
  }

  // All slices that carry an orientation must agree with the first one that
  // does
  let mut orientations = slices.iter().filter_map(|slice| slice.orientation);

  if let Some(first_orientation) = orientations.next() {
    for orientation in orientations {
      let matches = orientation
        .iter()
        .zip(first_orientation.iter())
        .all(|(a, b)| (a - b).abs() <= ORIENTATION_TOLERANCE);

      if !matches {
        return Err(AssembleError::InconsistentSeries {
          details: "Image orientation differs between slices".to_string(),
        });
      }
    }
  }

  Ok(())
}

/// Derives voxel spacing. In-plane spacing comes from the first slice with a
/// pixel spacing value (column spacing is sx, row spacing is sy). The
/// inter-slice spacing sz is the magnitude of the first inter-slice position
/// delta projected onto the slice normal, falling back to the delta's
/// magnitude and then to 1 mm.
///
fn derive_spacing(slices: &[RawSlice], orientation: &[f64; 6]) -> [f64; 3] {
  let pixel_spacing =
    slices.iter().find_map(|slice| slice.pixel_spacing);

  // Pixel spacing is stored as (row spacing, column spacing)
  let sx = pixel_spacing.map(|spacing| spacing[1]).unwrap_or(1.0);
  let sy = pixel_spacing.map(|spacing| spacing[0]).unwrap_or(1.0);

  let mut sz = 1.0;

  if slices.len() >= 2 {
    if let (Some(p0), Some(p1)) = (slices[0].position, slices[1].position) {
      let delta = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];

      let row = [orientation[0], orientation[1], orientation[2]];
      let col = [orientation[3], orientation[4], orientation[5]];
      let normal = [
        row[1] * col[2] - row[2] * col[1],
        row[2] * col[0] - row[0] * col[2],
        row[0] * col[1] - row[1] * col[0],
      ];

      let normal_length = (normal[0] * normal[0]
        + normal[1] * normal[1]
        + normal[2] * normal[2])
        .sqrt();

      let projected = if normal_length > 0.0 {
        ((delta[0] * normal[0] + delta[1] * normal[1] + delta[2] * normal[2])
          / normal_length)
          .abs()
      } else {
        0.0
      };

      let magnitude =
        (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2])
          .sqrt();

      if projected > 1e-6 {
        sz = projected;
      } else if magnitude > 1e-6 {
        sz = magnitude;
      }
    }
  }

  [positive_or_one(sx), positive_or_one(sy), positive_or_one(sz)]
}

/// Spacing components must be strictly positive; non-positive stored values
/// fall back to 1 mm.
///
fn positive_or_one(value: f64) -> f64 {
  if value > 0.0 {
    value
  } else {
    1.0
  }
}

fn first_present<T>(
  slices: &[RawSlice],
  get: impl Fn(&RawSlice) -> Option<T>,
) -> Option<T> {
  slices.iter().find_map(get)
}

#[cfg(test)]
mod tests {
  use voxelmesh_core::transfer_syntax;
  use voxelmesh_p10::PixelPayload;

  use super::*;

  fn test_slice(z: f64, instance_number: i64) -> RawSlice {
    RawSlice {
      rows: 8,
      columns: 8,
      bits_allocated: 8,
      is_signed: false,
      transfer_syntax: &transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN,
      payload: PixelPayload::Uncompressed(vec![0; 64]),
      rescale_slope: 1.0,
      rescale_intercept: 0.0,
      window_center: None,
      window_width: None,
      position: Some([0.0, 0.0, z]),
      orientation: Some([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
      pixel_spacing: Some([0.5, 0.6]),
      instance_number: Some(instance_number),
      slice_location: Some(z),
      sop_instance_uid: Some(format!("1.2.3.{}", instance_number)),
      patient_id: None,
      study_instance_uid: Some("1.2.3".to_string()),
      series_instance_uid: Some("1.2.3.4".to_string()),
      frame_of_reference_uid: None,
      modality: Some("CT".to_string()),
      study_date: None,
    }
  }

  #[test]
  fn sorts_by_position_test() {
    let series = assemble(vec![
      test_slice(5.0, 1),
      test_slice(1.0, 2),
      test_slice(3.0, 3),
    ])
    .unwrap();

    assert_eq!(
      series.dimensions,
      Dimensions {
        width: 8,
        height: 8,
        depth: 3
      }
    );

    let z_values: Vec<f64> = series
      .slices
      .iter()
      .map(|slice| slice.position.unwrap()[2])
      .collect();
    assert_eq!(z_values, vec![1.0, 3.0, 5.0]);

    assert_eq!(series.spacing, [0.6, 0.5, 2.0]);

    assert_eq!(
      series.metadata.sop_instance_uids,
      vec![
        Some("1.2.3.2".to_string()),
        Some("1.2.3.3".to_string()),
        Some("1.2.3.1".to_string()),
      ]
    );
  }

  #[test]
  fn sorts_by_instance_number_when_positions_missing_test() {
    let mut a = test_slice(0.0, 3);
    let mut b = test_slice(0.0, 1);
    a.position = None;
    b.position = None;

    let series = assemble(vec![a, b]).unwrap();

    let instance_numbers: Vec<i64> = series
      .slices
      .iter()
      .map(|slice| slice.instance_number.unwrap())
      .collect();
    assert_eq!(instance_numbers, vec![1, 3]);
  }

  #[test]
  fn empty_series_test() {
    assert_eq!(assemble(vec![]), Err(AssembleError::EmptySeries));
  }

  #[test]
  fn inconsistent_shape_test() {
    let mut b = test_slice(1.0, 2);
    b.rows = 16;

    assert_eq!(
      assemble(vec![test_slice(0.0, 1), b]),
      Err(AssembleError::InconsistentSeries {
        details: "Slice shape 8x16 does not match 8x8".to_string(),
      })
    );
  }

  #[test]
  fn inconsistent_orientation_test() {
    let mut b = test_slice(1.0, 2);
    b.orientation = Some([0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);

    assert_eq!(
      assemble(vec![test_slice(0.0, 1), b]),
      Err(AssembleError::InconsistentSeries {
        details: "Image orientation differs between slices".to_string(),
      })
    );
  }

  #[test]
  fn missing_orientation_yields_identity_test() {
    let mut a = test_slice(0.0, 1);
    let mut b = test_slice(1.0, 2);
    a.orientation = None;
    b.orientation = None;

    let series = assemble(vec![a, b]).unwrap();

    assert!(!series.has_orientation);
    assert_eq!(series.orientation, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
  }

  #[test]
  fn single_slice_spacing_test() {
    let series = assemble(vec![test_slice(10.0, 1)]).unwrap();

    assert_eq!(series.spacing, [0.6, 0.5, 1.0]);
  }

  #[test]
  fn oblique_spacing_uses_normal_projection_test() {
    // Slices stacked along z but positions also drift in x. The projection
    // onto the slice normal ignores the in-plane drift.
    let mut a = test_slice(0.0, 1);
    let mut b = test_slice(0.0, 2);
    a.position = Some([0.0, 0.0, 0.0]);
    b.position = Some([3.0, 0.0, 4.0]);

    let series = assemble(vec![a, b]).unwrap();

    assert_eq!(series.spacing[2], 4.0);
  }
}

//! Builds the calibrated scalar field, the 8-bit display stack, and the
//! automatic iso-value for a series.

use voxelmesh_p10::{PixelPayload, RawSlice};

use crate::otsu;
use crate::series::Series;

/// Integer dimensions of a volume: width (columns), height (rows), and depth
/// (slices).
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Dimensions {
  pub width: usize,
  pub height: usize,
  pub depth: usize,
}

impl Dimensions {
  /// Returns the total number of voxels.
  ///
  pub fn voxel_count(&self) -> usize {
    self.width * self.height * self.depth
  }
}

/// Approximations recorded while building a volume instead of erring.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct VolumeMetadata {
  /// No slice carried an orientation, so patient coordinates assume the
  /// identity orientation.
  pub approximate: bool,

  /// At least one slice was JPEG-decoded and bypassed rescale calibration.
  pub uncalibrated: bool,
}

/// The calibrated scalar field of a series plus its display stack. Built once
/// per series and immutable thereafter. The scalar at voxel (x, y, z) is
/// `field[z·w·h + y·w + x]`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
  pub dimensions: Dimensions,
  pub spacing: [f64; 3],
  pub origin: [f64; 3],

  /// Row direction, column direction, and slice normal, in that order.
  pub orientation: [f64; 9],

  /// Scalar field in modality units, length `dimensions.voxel_count()`.
  pub field: Vec<f32>,

  pub min: f32,
  pub max: f32,

  /// Otsu threshold over the scalar field, in modality units.
  pub auto_iso: f32,

  /// One 8-bit grayscale frame per slice, row-major with top-left origin.
  pub display_stack: Vec<Vec<u8>>,

  pub metadata: VolumeMetadata,
}

impl Volume {
  /// Consumes a series and builds its volume. Construction never fails for
  /// numerically valid inputs; missing data is recorded in the metadata
  /// flags.
  ///
  pub fn from_series(series: Series) -> Volume {
    let dimensions = series.dimensions;
    let frame_length = dimensions.width * dimensions.height;

    let mut field = vec![0.0f32; dimensions.voxel_count()];
    let mut display_stack = Vec::with_capacity(dimensions.depth);
    let mut uncalibrated = false;

    for (z, slice) in series.slices.iter().enumerate() {
      let frame = &mut field[z * frame_length..(z + 1) * frame_length];

      calibrate_slice(slice, frame);

      if matches!(slice.payload, PixelPayload::JpegBaseline(_)) {
        uncalibrated = true;
      }

      display_stack.push(display_frame(slice, frame));
    }

    let (min, max) = field_range(&field);
    let auto_iso = otsu::auto_iso(&field, min, max);

    let orientation = orientation_matrix(&series.orientation);

    log::info!(
      "Built volume {}x{}x{}, scalar range [{:.2}, {:.2}], auto-iso {:.2}",
      dimensions.width,
      dimensions.height,
      dimensions.depth,
      min,
      max,
      auto_iso,
    );

    Volume {
      dimensions,
      spacing: series.spacing,
      origin: series.origin,
      orientation,
      field,
      min,
      max,
      auto_iso,
      display_stack,
      metadata: VolumeMetadata {
        approximate: !series.has_orientation,
        uncalibrated,
      },
    }
  }

  /// Returns the scalar at the given voxel coordinate.
  ///
  pub fn scalar_at(&self, x: usize, y: usize, z: usize) -> f32 {
    self.field[(z * self.dimensions.height + y) * self.dimensions.width + x]
  }
}

/// Expands row/column direction cosines into the 9-entry orientation matrix:
/// row direction, column direction, then their normalized cross product as
/// the slice normal.
///
fn orientation_matrix(orientation: &[f64; 6]) -> [f64; 9] {
  let row = [orientation[0], orientation[1], orientation[2]];
  let col = [orientation[3], orientation[4], orientation[5]];

  let mut normal = [
    row[1] * col[2] - row[2] * col[1],
    row[2] * col[0] - row[0] * col[2],
    row[0] * col[1] - row[1] * col[0],
  ];

  let length =
    (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2])
      .sqrt();

  if length > 0.0 {
    normal = [normal[0] / length, normal[1] / length, normal[2] / length];
  }

  [
    row[0], row[1], row[2], col[0], col[1], col[2], normal[0], normal[1],
    normal[2],
  ]
}

/// Writes one slice's calibrated scalars into its frame of the field. Raw
/// samples are interpreted per the slice's bit depth and signedness, then
/// mapped through `s · slope + intercept`. JPEG-decoded samples carry no
/// calibration and are copied verbatim.
///
fn calibrate_slice(slice: &RawSlice, frame: &mut [f32]) {
  match &slice.payload {
    PixelPayload::JpegBaseline(samples) => {
      for (scalar, sample) in frame.iter_mut().zip(samples.iter()) {
        *scalar = f32::from(*sample);
      }
    }

    PixelPayload::Uncompressed(bytes) => {
      let slope = slice.rescale_slope;
      let intercept = slice.rescale_intercept;

      match (slice.bits_allocated, slice.is_signed) {
        (8, false) => {
          for (scalar, byte) in frame.iter_mut().zip(bytes.iter()) {
            *scalar = f32::from(*byte) * slope + intercept;
          }
        }

        (8, true) => {
          for (scalar, byte) in frame.iter_mut().zip(bytes.iter()) {
            *scalar = f32::from(*byte as i8) * slope + intercept;
          }
        }

        (16, false) => {
          for (scalar, sample) in frame.iter_mut().zip(bytes.chunks_exact(2))
          {
            *scalar =
              f32::from(u16::from_le_bytes([sample[0], sample[1]])) * slope
                + intercept;
          }
        }

        _ => {
          for (scalar, sample) in frame.iter_mut().zip(bytes.chunks_exact(2))
          {
            *scalar = f32::from(i16::from_le_bytes([sample[0], sample[1]]))
              * slope
              + intercept;
          }
        }
      }
    }
  }
}

/// Produces the 8-bit display frame for one slice. 16-bit inputs are mapped
/// through a linear window over the calibrated scalars; 8-bit signed samples
/// are shifted into the unsigned byte range; 8-bit unsigned and JPEG-decoded
/// frames pass through.
///
fn display_frame(slice: &RawSlice, frame: &[f32]) -> Vec<u8> {
  match &slice.payload {
    PixelPayload::JpegBaseline(samples) => samples.clone(),

    PixelPayload::Uncompressed(bytes) => match (
      slice.bits_allocated,
      slice.is_signed,
    ) {
      (8, false) => bytes.clone(),

      (8, true) => bytes
        .iter()
        .map(|byte| (i16::from(*byte as i8) + 128) as u8)
        .collect(),

      _ => {
        let (center, width) = match (slice.window_center, slice.window_width)
        {
          (Some(center), Some(width)) if width > 0.0 => (center, width),
          _ => {
            let (min, max) = field_range(frame);
            ((min + max) / 2.0, (max - min).max(1e-6))
          }
        };

        let low = center - width / 2.0;

        frame
          .iter()
          .map(|scalar| {
            (((scalar - low) / width) * 255.0).clamp(0.0, 255.0).round()
              as u8
          })
          .collect()
      }
    },
  }
}

fn field_range(field: &[f32]) -> (f32, f32) {
  let mut min = f32::INFINITY;
  let mut max = f32::NEG_INFINITY;

  for scalar in field {
    min = min.min(*scalar);
    max = max.max(*scalar);
  }

  if min > max {
    (0.0, 0.0)
  } else {
    (min, max)
  }
}

#[cfg(test)]
mod tests {
  use voxelmesh_core::transfer_syntax;

  use super::*;
  use crate::series::assemble;

  fn slice_16bit(samples: &[u16], rows: u16, columns: u16) -> RawSlice {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
      bytes.extend_from_slice(&sample.to_le_bytes());
    }

    RawSlice {
      rows,
      columns,
      bits_allocated: 16,
      is_signed: false,
      transfer_syntax: &transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN,
      payload: PixelPayload::Uncompressed(bytes),
      rescale_slope: 1.0,
      rescale_intercept: 0.0,
      window_center: None,
      window_width: None,
      position: None,
      orientation: None,
      pixel_spacing: None,
      instance_number: None,
      slice_location: None,
      sop_instance_uid: None,
      patient_id: None,
      study_instance_uid: None,
      series_instance_uid: None,
      frame_of_reference_uid: None,
      modality: None,
      study_date: None,
    }
  }

  #[test]
  fn rescale_and_window_test() {
    // 4x4 samples spanning 0..1000, slope 1, intercept -500, window center 0
    // width 200
    let samples: Vec<u16> = (0..16).map(|i| (i * 1000 / 15) as u16).collect();

    let mut slice = slice_16bit(&samples, 4, 4);
    slice.rescale_intercept = -500.0;
    slice.window_center = Some(0.0);
    slice.window_width = Some(200.0);

    let volume = Volume::from_series(assemble(vec![slice]).unwrap());

    assert_eq!(volume.min, -500.0);
    assert_eq!(volume.max, 500.0);
    assert!(volume.field.iter().all(|v| (-500.0..=500.0).contains(v)));

    let frame = &volume.display_stack[0];

    for (scalar, display) in volume.field.iter().zip(frame.iter()) {
      if *scalar <= -100.0 {
        assert_eq!(*display, 0);
      } else if *scalar >= 100.0 {
        assert_eq!(*display, 255);
      } else {
        let expected = (((scalar + 100.0) / 200.0) * 255.0).round() as u8;
        assert_eq!(*display, expected);
      }
    }
  }

  #[test]
  fn window_falls_back_to_slice_range_test() {
    let volume = Volume::from_series(
      assemble(vec![slice_16bit(&[0, 100, 200, 400], 2, 2)]).unwrap(),
    );

    // Window center 200, width 400: 0 maps to 0, 400 maps to 255
    let frame = &volume.display_stack[0];
    assert_eq!(frame[0], 0);
    assert_eq!(frame[3], 255);
  }

  #[test]
  fn signed_8bit_display_shift_test() {
    let mut slice = slice_16bit(&[], 2, 2);
    slice.bits_allocated = 8;
    slice.is_signed = true;
    slice.payload =
      PixelPayload::Uncompressed(vec![0x80, 0xFF, 0x00, 0x7F]);

    let volume = Volume::from_series(assemble(vec![slice]).unwrap());

    // -128 -> 0, -1 -> 127, 0 -> 128, 127 -> 255
    assert_eq!(volume.display_stack[0], vec![0, 127, 128, 255]);
    assert_eq!(volume.field, vec![-128.0, -1.0, 0.0, 127.0]);
  }

  #[test]
  fn jpeg_frames_pass_through_test() {
    let mut slice = slice_16bit(&[], 2, 2);
    slice.bits_allocated = 8;
    slice.rescale_slope = 2.0;
    slice.rescale_intercept = -100.0;
    slice.payload = PixelPayload::JpegBaseline(vec![10, 20, 30, 40]);

    let volume = Volume::from_series(assemble(vec![slice]).unwrap());

    // No calibration is applied to JPEG-decoded samples
    assert_eq!(volume.field, vec![10.0, 20.0, 30.0, 40.0]);
    assert_eq!(volume.display_stack[0], vec![10, 20, 30, 40]);
    assert!(volume.metadata.uncalibrated);
  }

  #[test]
  fn field_index_order_test() {
    let slices = vec![
      slice_16bit(&[0, 1, 2, 3, 4, 5], 2, 3),
      slice_16bit(&[10, 11, 12, 13, 14, 15], 2, 3),
    ];

    let volume = Volume::from_series(assemble(slices).unwrap());

    assert_eq!(
      volume.dimensions,
      Dimensions {
        width: 3,
        height: 2,
        depth: 2
      }
    );

    // index(x, y, z) = z·w·h + y·w + x
    assert_eq!(volume.scalar_at(0, 0, 0), 0.0);
    assert_eq!(volume.scalar_at(2, 0, 0), 2.0);
    assert_eq!(volume.scalar_at(0, 1, 0), 3.0);
    assert_eq!(volume.scalar_at(1, 1, 1), 14.0);
  }

  #[test]
  fn degenerate_range_test() {
    let volume =
      Volume::from_series(assemble(vec![slice_16bit(&[7; 4], 2, 2)]).unwrap());

    assert_eq!(volume.min, 7.0);
    assert_eq!(volume.max, 7.0);
    assert_eq!(volume.auto_iso, 7.0);
  }
}

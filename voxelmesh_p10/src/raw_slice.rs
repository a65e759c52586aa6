//! A single parsed 2D frame plus the subset of DICOM data elements needed by
//! the volume pipeline.

use voxelmesh_core::TransferSyntax;

/// The pixel payload of a raw slice. Exactly one variant is present by
/// construction.
///
#[derive(Clone, Debug, PartialEq)]
pub enum PixelPayload {
  /// A contiguous owned copy of uncompressed little-endian sample data of
  /// length rows · columns · bytes-per-sample.
  Uncompressed(Vec<u8>),

  /// 8-bit grayscale samples decoded from the first fragment of a JPEG
  /// Baseline (Process 1) bitstream, of length rows · columns. These samples
  /// carry no rescale calibration.
  JpegBaseline(Vec<u8>),
}

/// One decoded DICOM slice: geometry, calibration, identifiers, and pixel
/// payload. Produced by [`crate::read_slice`], consumed by series assembly,
/// then discarded.
///
#[derive(Clone, Debug, PartialEq)]
pub struct RawSlice {
  pub rows: u16,
  pub columns: u16,
  pub bits_allocated: u16,
  pub is_signed: bool,
  pub transfer_syntax: &'static TransferSyntax,
  pub payload: PixelPayload,

  /// Rescale slope, defaulting to 1 when absent.
  pub rescale_slope: f32,

  /// Rescale intercept, defaulting to 0 when absent.
  pub rescale_intercept: f32,

  pub window_center: Option<f32>,
  pub window_width: Option<f32>,

  /// Image Position (Patient): the x, y, z coordinates of the first
  /// transmitted voxel, in millimeters.
  pub position: Option<[f64; 3]>,

  /// Image Orientation (Patient): row direction then column direction
  /// cosines.
  pub orientation: Option<[f64; 6]>,

  /// Pixel Spacing as stored: row spacing then column spacing, in
  /// millimeters.
  pub pixel_spacing: Option<[f64; 2]>,

  pub instance_number: Option<i64>,
  pub slice_location: Option<f64>,

  pub sop_instance_uid: Option<String>,
  pub patient_id: Option<String>,
  pub study_instance_uid: Option<String>,
  pub series_instance_uid: Option<String>,
  pub frame_of_reference_uid: Option<String>,
  pub modality: Option<String>,
  pub study_date: Option<String>,
}

impl RawSlice {
  /// Returns the number of bytes each stored sample occupies.
  ///
  pub fn bytes_per_sample(&self) -> usize {
    usize::from(self.bits_allocated) / 8
  }

  /// Returns the number of samples in the slice's frame.
  ///
  pub fn sample_count(&self) -> usize {
    usize::from(self.rows) * usize::from(self.columns)
  }
}

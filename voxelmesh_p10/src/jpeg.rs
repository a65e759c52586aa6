//! Decodes JPEG Baseline (Process 1) pixel data fragments into 8-bit
//! grayscale samples.

use crate::ReadError;

/// Decodes a JPEG Baseline bitstream into exactly rows · columns grayscale
/// samples. RGB output is reduced to luminance with the Rec. 601 weights
/// 0.299/0.587/0.114, rounded to the nearest integer (half away from zero).
///
pub fn decode_baseline(
  bitstream: &[u8],
  rows: u16,
  columns: u16,
) -> Result<Vec<u8>, ReadError> {
  let when = "Decoding JPEG baseline pixel data";

  let image =
    image::load_from_memory_with_format(bitstream, image::ImageFormat::Jpeg)
      .map_err(|e| ReadError::MalformedHeader {
        when: when.to_string(),
        details: e.to_string(),
      })?;

  let samples = match image {
    image::DynamicImage::ImageLuma8(buffer) => buffer.into_raw(),

    other => other
      .into_rgb8()
      .pixels()
      .map(|pixel| {
        let luma = 0.299 * f32::from(pixel[0])
          + 0.587 * f32::from(pixel[1])
          + 0.114 * f32::from(pixel[2]);

        luma.round() as u8
      })
      .collect(),
  };

  let expected = usize::from(rows) * usize::from(columns);
  if samples.len() != expected {
    return Err(ReadError::MalformedHeader {
      when: when.to_string(),
      details: format!(
        "JPEG decoded to {} samples but {} were expected",
        samples.len(),
        expected
      ),
    });
  }

  Ok(samples)
}

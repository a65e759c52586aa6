//! Automatic iso-value selection using Otsu's method over the scalar field.

/// Number of equal-width histogram bins.
const BIN_COUNT: usize = 512;

/// Computes the Otsu threshold of the scalar field over [min, max], mapped
/// back to modality units at the winning bin's center. Ties keep the lowest
/// bin, so the result is bit-for-bit reproducible for identical inputs.
/// Degenerate ranges yield the midpoint of [min, max].
///
pub fn auto_iso(field: &[f32], min: f32, max: f32) -> f32 {
  if field.is_empty() || min >= max {
    return (min + max) / 2.0;
  }

  let range = f64::from(max) - f64::from(min);
  let bin_width = range / BIN_COUNT as f64;

  let mut histogram = [0u64; BIN_COUNT];

  for scalar in field {
    let bin = ((f64::from(*scalar) - f64::from(min)) / bin_width) as usize;
    histogram[bin.min(BIN_COUNT - 1)] += 1;
  }

  let total_count = field.len() as f64;
  let total_sum: f64 = histogram
    .iter()
    .enumerate()
    .map(|(bin, count)| bin as f64 * *count as f64)
    .sum();

  let mut best_bin = 0usize;
  let mut best_variance = -1.0f64;

  let mut background_count = 0.0f64;
  let mut background_sum = 0.0f64;

  for (bin, count) in histogram.iter().enumerate() {
    background_count += *count as f64;
    background_sum += bin as f64 * *count as f64;

    let foreground_count = total_count - background_count;
    if background_count == 0.0 {
      continue;
    }
    if foreground_count == 0.0 {
      break;
    }

    let background_mean = background_sum / background_count;
    let foreground_mean = (total_sum - background_sum) / foreground_count;
    let mean_difference = background_mean - foreground_mean;

    let variance =
      background_count * foreground_count * mean_difference * mean_difference;

    // Strictly greater keeps the lowest bin on ties
    if variance > best_variance {
      best_variance = variance;
      best_bin = bin;
    }
  }

  (f64::from(min) + (best_bin as f64 + 0.5) * bin_width) as f32
}

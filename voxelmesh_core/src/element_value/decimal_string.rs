//! Work with the DICOM `DecimalString` value representation.

/// Converts a `DecimalString` value to a list of floats. Returns `None` when
/// the bytes are not valid UTF-8 or any entry fails to parse.
///
pub fn from_bytes(bytes: &[u8]) -> Option<Vec<f64>> {
  let decimal_string = std::str::from_utf8(bytes).ok()?;

  let decimal_string = decimal_string.trim_matches('\0');

  decimal_string
    .split('\\')
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(|s| s.parse::<f64>().ok())
    .collect()
}

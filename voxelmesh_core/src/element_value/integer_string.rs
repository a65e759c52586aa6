//! Work with the DICOM `IntegerString` value representation.

/// Converts an `IntegerString` value to a list of ints. Returns `None` when
/// the bytes are not valid UTF-8 or any entry fails to parse.
///
pub fn from_bytes(bytes: &[u8]) -> Option<Vec<i64>> {
  let integer_string = std::str::from_utf8(bytes).ok()?;

  let integer_string = integer_string.trim_matches('\0');

  integer_string
    .split('\\')
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(|s| s.parse::<i64>().ok())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_bytes_test() {
    assert_eq!(from_bytes(&[]), Some(vec![]));

    assert_eq!(from_bytes(b" "), Some(vec![]));

    assert_eq!(from_bytes(b" 1"), Some(vec![1]));

    assert_eq!(from_bytes(b" 1\\2 "), Some(vec![1, 2]));

    assert_eq!(from_bytes(&[0xD0]), None);

    assert_eq!(from_bytes(b"A"), None);
  }
}

use byteorder::ByteOrder;

/// A bounded cursor over a fully in-memory DICOM P10 byte buffer. All reads
/// are little endian, which is the only endianness of the supported transfer
/// syntaxes.
///
pub struct ByteCursor<'a> {
  data: &'a [u8],
  position: usize,
}

/// The error returned when a read would go past the end of the buffer.
///
#[derive(Debug, PartialEq)]
pub struct DataEnd;

impl<'a> ByteCursor<'a> {
  /// Creates a new cursor positioned at the start of the given buffer.
  ///
  pub fn new(data: &'a [u8]) -> Self {
    Self { data, position: 0 }
  }

  /// Returns the current byte offset into the buffer.
  ///
  pub fn position(&self) -> usize {
    self.position
  }

  /// Returns whether every byte of the buffer has been consumed.
  ///
  pub fn is_exhausted(&self) -> bool {
    self.position >= self.data.len()
  }

  /// Returns the number of unread bytes.
  ///
  pub fn remaining(&self) -> usize {
    self.data.len() - self.position
  }

  /// Reads `count` bytes, advancing the cursor.
  ///
  pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DataEnd> {
    if count > self.remaining() {
      return Err(DataEnd);
    }

    let bytes = &self.data[self.position..self.position + count];
    self.position += count;

    Ok(bytes)
  }

  /// Skips `count` bytes.
  ///
  pub fn skip(&mut self, count: usize) -> Result<(), DataEnd> {
    self.read_bytes(count).map(|_| ())
  }

  /// Reads a little-endian `u16`, advancing the cursor.
  ///
  pub fn read_u16(&mut self) -> Result<u16, DataEnd> {
    Ok(byteorder::LittleEndian::read_u16(self.read_bytes(2)?))
  }

  /// Reads a little-endian `u32`, advancing the cursor.
  ///
  pub fn read_u32(&mut self) -> Result<u32, DataEnd> {
    Ok(byteorder::LittleEndian::read_u32(self.read_bytes(4)?))
  }

  /// Peeks at the next little-endian `u16` without advancing the cursor.
  ///
  pub fn peek_u16(&self) -> Result<u16, DataEnd> {
    if self.remaining() < 2 {
      return Err(DataEnd);
    }

    Ok(byteorder::LittleEndian::read_u16(
      &self.data[self.position..self.position + 2],
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn read_test() {
    let mut cursor = ByteCursor::new(&[0x10, 0x00, 0x20, 0x00, 0xFF]);

    assert_eq!(cursor.peek_u16(), Ok(0x0010));
    assert_eq!(cursor.read_u16(), Ok(0x0010));
    assert_eq!(cursor.read_u16(), Ok(0x0020));
    assert_eq!(cursor.remaining(), 1);
    assert_eq!(cursor.read_bytes(1), Ok([0xFF].as_slice()));
    assert!(cursor.is_exhausted());
    assert_eq!(cursor.read_u16(), Err(DataEnd));
  }

  #[test]
  fn skip_past_end_test() {
    let mut cursor = ByteCursor::new(&[0, 0]);

    assert_eq!(cursor.skip(3), Err(DataEnd));
    assert_eq!(cursor.position(), 0);
  }
}

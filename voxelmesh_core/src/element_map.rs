//! An ordered map from data element tags to decoded element values, with
//! typed accessors that return absent rather than failing.

use std::collections::BTreeMap;

use crate::{DataElementTag, ElementValue};

/// The decoded data elements of a single DICOM object, keyed by tag.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementMap {
  elements: BTreeMap<DataElementTag, ElementValue>,
}

impl ElementMap {
  /// Creates a new empty element map.
  ///
  pub fn new() -> Self {
    Self {
      elements: BTreeMap::new(),
    }
  }

  /// Inserts a value for a tag, replacing any existing value.
  ///
  pub fn insert(&mut self, tag: DataElementTag, value: ElementValue) {
    self.elements.insert(tag, value);
  }

  /// Returns the value for a tag, if present.
  ///
  pub fn get(&self, tag: DataElementTag) -> Option<&ElementValue> {
    self.elements.get(&tag)
  }

  /// Returns the number of elements in the map.
  ///
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  /// Returns whether the map holds no elements.
  ///
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Returns the first unsigned short stored under a tag.
  ///
  pub fn ushort(&self, tag: DataElementTag) -> Option<u16> {
    self.get(tag)?.ushort()
  }

  /// Returns the first integer stored under a tag.
  ///
  pub fn int(&self, tag: DataElementTag) -> Option<i64> {
    self.get(tag)?.int()
  }

  /// Returns the first decimal stored under a tag.
  ///
  pub fn decimal(&self, tag: DataElementTag) -> Option<f64> {
    self.get(tag)?.decimal()
  }

  /// Returns all decimals stored under a tag.
  ///
  pub fn decimals(&self, tag: DataElementTag) -> Option<&[f64]> {
    self.get(tag)?.decimals()
  }

  /// Returns the text stored under a tag.
  ///
  pub fn text(&self, tag: DataElementTag) -> Option<&str> {
    self.get(tag)?.text()
  }

  /// Returns the UID stored under a tag.
  ///
  pub fn uid(&self, tag: DataElementTag) -> Option<&str> {
    self.get(tag)?.uid()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typed_accessors_test() {
    let mut map = ElementMap::new();

    map.insert(
      DataElementTag::new(0x0028, 0x0010),
      ElementValue::UnsignedShorts(vec![16]),
    );
    map.insert(
      DataElementTag::new(0x0028, 0x0030),
      ElementValue::DecimalString(vec![0.5, 0.6]),
    );
    map.insert(
      DataElementTag::new(0x0008, 0x0060),
      ElementValue::Text("CT".to_string()),
    );

    assert_eq!(map.ushort(DataElementTag::new(0x0028, 0x0010)), Some(16));
    assert_eq!(
      map.decimals(DataElementTag::new(0x0028, 0x0030)),
      Some([0.5, 0.6].as_slice())
    );
    assert_eq!(map.text(DataElementTag::new(0x0008, 0x0060)), Some("CT"));

    // A value of the wrong type reads as absent
    assert_eq!(map.int(DataElementTag::new(0x0028, 0x0010)), None);

    // A missing tag reads as absent
    assert_eq!(map.decimal(DataElementTag::new(0x0028, 0x1050)), None);
  }
}

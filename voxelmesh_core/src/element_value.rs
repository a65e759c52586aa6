//! A tagged data element value with one variant per class of value
//! representation the pipeline consumes. Values are decoded eagerly when an
//! element is read; decoders for optional numeric fields yield absent rather
//! than surfacing failures.

use byteorder::ByteOrder;

use crate::ValueRepresentation;

pub mod decimal_string;
pub mod integer_string;

/// A decoded data element value. Each variant holds one class of data:
///
/// 1. `UnsignedShorts` for the `US` VR, e.g. rows, columns, bits allocated.
///
/// 2. `IntegerString` for the `IS` VR, e.g. instance number.
///
/// 3. `DecimalString` for the `DS` VR, e.g. pixel spacing, rescale slope,
///    image position and orientation.
///
/// 4. `Text` for string VRs such as `CS`, `DA`, `LO`, `SH`, `ST`.
///
/// 5. `UniqueIdentifier` for the `UI` VR.
///
/// 6. `Bytes` for raw binary data, most notably non-encapsulated pixel data.
///
/// 7. `EncapsulatedFragments` for encapsulated pixel data, one entry per
///    fragment, with the basic offset table item excluded.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ElementValue {
  UnsignedShorts(Vec<u16>),
  IntegerString(Vec<i64>),
  DecimalString(Vec<f64>),
  Text(String),
  UniqueIdentifier(String),
  Bytes(Vec<u8>),
  EncapsulatedFragments(Vec<Vec<u8>>),
}

/// Removes trailing whitespace and padding from a DICOM string value.
/// Whitespace is the codepoints U+0000, U+0009, U+000A, U+000D, and U+0020.
///
fn trim_end_whitespace(s: &str) -> &str {
  s.trim_end_matches([
    '\u{0000}', '\u{0009}', '\u{000A}', '\u{000D}', '\u{0020}',
  ])
}

impl ElementValue {
  /// Decodes raw little-endian element bytes into a value appropriate for the
  /// given VR. Returns `None` when the bytes can't be decoded, which callers
  /// treat as the element being absent.
  ///
  pub fn decode(vr: ValueRepresentation, bytes: &[u8]) -> Option<Self> {
    match vr {
      ValueRepresentation::UnsignedShort => {
        if bytes.len() % 2 != 0 {
          return None;
        }

        let mut values = vec![0u16; bytes.len() / 2];
        byteorder::LittleEndian::read_u16_into(bytes, values.as_mut_slice());

        Some(ElementValue::UnsignedShorts(values))
      }

      ValueRepresentation::IntegerString => {
        integer_string::from_bytes(bytes).map(ElementValue::IntegerString)
      }

      ValueRepresentation::DecimalString => {
        decimal_string::from_bytes(bytes).map(ElementValue::DecimalString)
      }

      ValueRepresentation::UniqueIdentifier => {
        let uid = std::str::from_utf8(bytes).ok()?;

        Some(ElementValue::UniqueIdentifier(
          trim_end_whitespace(uid).to_string(),
        ))
      }

      vr if vr.is_string() => {
        let text = std::str::from_utf8(bytes).ok()?;

        Some(ElementValue::Text(trim_end_whitespace(text).to_string()))
      }

      _ => Some(ElementValue::Bytes(bytes.to_vec())),
    }
  }

  /// Returns the first unsigned short value, if this is a `US` value with at
  /// least one entry.
  ///
  pub fn ushort(&self) -> Option<u16> {
    match self {
      ElementValue::UnsignedShorts(values) => values.first().copied(),
      _ => None,
    }
  }

  /// Returns the first integer value of an `IS` value.
  ///
  pub fn int(&self) -> Option<i64> {
    match self {
      ElementValue::IntegerString(values) => values.first().copied(),
      _ => None,
    }
  }

  /// Returns the first decimal value of a `DS` value.
  ///
  pub fn decimal(&self) -> Option<f64> {
    match self {
      ElementValue::DecimalString(values) => values.first().copied(),
      _ => None,
    }
  }

  /// Returns all decimal values of a `DS` value.
  ///
  pub fn decimals(&self) -> Option<&[f64]> {
    match self {
      ElementValue::DecimalString(values) => Some(values.as_slice()),
      _ => None,
    }
  }

  /// Returns the text of a string value.
  ///
  pub fn text(&self) -> Option<&str> {
    match self {
      ElementValue::Text(text) => Some(text.as_str()),
      _ => None,
    }
  }

  /// Returns the UID of a `UI` value.
  ///
  pub fn uid(&self) -> Option<&str> {
    match self {
      ElementValue::UniqueIdentifier(uid) => Some(uid.as_str()),
      _ => None,
    }
  }

  /// Returns the raw bytes of a binary value.
  ///
  pub fn bytes(&self) -> Option<&[u8]> {
    match self {
      ElementValue::Bytes(bytes) => Some(bytes.as_slice()),
      _ => None,
    }
  }

  /// Returns the fragments of an encapsulated pixel data value.
  ///
  pub fn fragments(&self) -> Option<&[Vec<u8>]> {
    match self {
      ElementValue::EncapsulatedFragments(fragments) => {
        Some(fragments.as_slice())
      }
      _ => None,
    }
  }
}

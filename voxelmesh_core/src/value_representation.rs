//! DICOM value representations (VRs).
//!
//! See [section 6.2](https://dicom.nema.org/medical/dicom/current/output/chtml/part05/sect_6.2.html)
//! of the DICOM specification for VR definitions.

/// All DICOM value representations (VRs).
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueRepresentation {
  AgeString,
  ApplicationEntity,
  AttributeTag,
  CodeString,
  Date,
  DateTime,
  DecimalString,
  FloatingPointDouble,
  FloatingPointSingle,
  IntegerString,
  LongString,
  LongText,
  OtherByteString,
  OtherDoubleString,
  OtherFloatString,
  OtherLongString,
  OtherVeryLongString,
  OtherWordString,
  PersonName,
  Sequence,
  ShortString,
  ShortText,
  SignedLong,
  SignedShort,
  SignedVeryLong,
  Time,
  UniqueIdentifier,
  UniversalResourceIdentifier,
  Unknown,
  UnlimitedCharacters,
  UnlimitedText,
  UnsignedLong,
  UnsignedShort,
  UnsignedVeryLong,
}

/// Every value representation, ordered by its two-letter code. The code is
/// the single source of truth for parsing and formatting VRs.
///
pub const ALL: [ValueRepresentation; 34] = [
  ValueRepresentation::ApplicationEntity,
  ValueRepresentation::AgeString,
  ValueRepresentation::AttributeTag,
  ValueRepresentation::CodeString,
  ValueRepresentation::Date,
  ValueRepresentation::DecimalString,
  ValueRepresentation::DateTime,
  ValueRepresentation::FloatingPointDouble,
  ValueRepresentation::FloatingPointSingle,
  ValueRepresentation::IntegerString,
  ValueRepresentation::LongString,
  ValueRepresentation::LongText,
  ValueRepresentation::OtherByteString,
  ValueRepresentation::OtherDoubleString,
  ValueRepresentation::OtherFloatString,
  ValueRepresentation::OtherLongString,
  ValueRepresentation::OtherVeryLongString,
  ValueRepresentation::OtherWordString,
  ValueRepresentation::PersonName,
  ValueRepresentation::ShortString,
  ValueRepresentation::SignedLong,
  ValueRepresentation::Sequence,
  ValueRepresentation::SignedShort,
  ValueRepresentation::ShortText,
  ValueRepresentation::SignedVeryLong,
  ValueRepresentation::Time,
  ValueRepresentation::UnlimitedCharacters,
  ValueRepresentation::UniqueIdentifier,
  ValueRepresentation::UnsignedLong,
  ValueRepresentation::Unknown,
  ValueRepresentation::UniversalResourceIdentifier,
  ValueRepresentation::UnsignedShort,
  ValueRepresentation::UnlimitedText,
  ValueRepresentation::UnsignedVeryLong,
];

/// The two-letter codes of the VRs that store an extended 32-bit value
/// length in explicit VR serialization. Everything else uses the original
/// 16-bit length field. Ref: PS3.5 7.1.2.
///
const EXTENDED_LENGTH_CODES: &[&str] = &[
  "OB", "OD", "OF", "OL", "OV", "OW", "SQ", "SV", "UC", "UN", "UR", "UT",
  "UV",
];

impl std::fmt::Display for ValueRepresentation {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(self.code())
  }
}

impl ValueRepresentation {
  /// Returns the two-letter code of this VR, e.g. `"DS"`.
  ///
  pub fn code(&self) -> &'static str {
    match self {
      ValueRepresentation::AgeString => "AS",
      ValueRepresentation::ApplicationEntity => "AE",
      ValueRepresentation::AttributeTag => "AT",
      ValueRepresentation::CodeString => "CS",
      ValueRepresentation::Date => "DA",
      ValueRepresentation::DateTime => "DT",
      ValueRepresentation::DecimalString => "DS",
      ValueRepresentation::FloatingPointDouble => "FD",
      ValueRepresentation::FloatingPointSingle => "FL",
      ValueRepresentation::IntegerString => "IS",
      ValueRepresentation::LongString => "LO",
      ValueRepresentation::LongText => "LT",
      ValueRepresentation::OtherByteString => "OB",
      ValueRepresentation::OtherDoubleString => "OD",
      ValueRepresentation::OtherFloatString => "OF",
      ValueRepresentation::OtherLongString => "OL",
      ValueRepresentation::OtherVeryLongString => "OV",
      ValueRepresentation::OtherWordString => "OW",
      ValueRepresentation::PersonName => "PN",
      ValueRepresentation::Sequence => "SQ",
      ValueRepresentation::ShortString => "SH",
      ValueRepresentation::ShortText => "ST",
      ValueRepresentation::SignedLong => "SL",
      ValueRepresentation::SignedShort => "SS",
      ValueRepresentation::SignedVeryLong => "SV",
      ValueRepresentation::Time => "TM",
      ValueRepresentation::UniqueIdentifier => "UI",
      ValueRepresentation::UniversalResourceIdentifier => "UR",
      ValueRepresentation::Unknown => "UN",
      ValueRepresentation::UnlimitedCharacters => "UC",
      ValueRepresentation::UnlimitedText => "UT",
      ValueRepresentation::UnsignedLong => "UL",
      ValueRepresentation::UnsignedShort => "US",
      ValueRepresentation::UnsignedVeryLong => "UV",
    }
  }

  /// Converts a two-letter code, e.g. `b"DA"`, into a value representation.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, ()> {
    ALL
      .iter()
      .find(|vr| vr.code().as_bytes() == bytes)
      .copied()
      .ok_or(())
  }

  /// Returns whether values of this VR are serialized with a 32-bit length
  /// preceded by two reserved bytes in explicit VR transfer syntaxes.
  ///
  pub fn has_extended_length(&self) -> bool {
    EXTENDED_LENGTH_CODES.contains(&self.code())
  }

  /// Returns whether values of this VR hold string data.
  ///
  pub fn is_string(&self) -> bool {
    matches!(
      self,
      ValueRepresentation::AgeString
        | ValueRepresentation::ApplicationEntity
        | ValueRepresentation::CodeString
        | ValueRepresentation::Date
        | ValueRepresentation::DateTime
        | ValueRepresentation::DecimalString
        | ValueRepresentation::IntegerString
        | ValueRepresentation::LongString
        | ValueRepresentation::LongText
        | ValueRepresentation::PersonName
        | ValueRepresentation::ShortString
        | ValueRepresentation::ShortText
        | ValueRepresentation::Time
        | ValueRepresentation::UniqueIdentifier
        | ValueRepresentation::UniversalResourceIdentifier
        | ValueRepresentation::UnlimitedCharacters
        | ValueRepresentation::UnlimitedText
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn code_round_trip_test() {
    for vr in ALL {
      assert_eq!(
        ValueRepresentation::from_bytes(vr.code().as_bytes()),
        Ok(vr)
      );
    }
  }

  #[test]
  fn from_bytes_test() {
    assert_eq!(
      ValueRepresentation::from_bytes(b"US"),
      Ok(ValueRepresentation::UnsignedShort)
    );

    assert_eq!(
      ValueRepresentation::from_bytes(b"SQ"),
      Ok(ValueRepresentation::Sequence)
    );

    assert_eq!(ValueRepresentation::from_bytes(b"XX"), Err(()));

    assert_eq!(ValueRepresentation::from_bytes(b"U"), Err(()));
  }

  #[test]
  fn to_string_test() {
    assert_eq!(ValueRepresentation::DecimalString.to_string(), "DS");

    assert_eq!(ValueRepresentation::OtherByteString.to_string(), "OB");
  }

  #[test]
  fn has_extended_length_test() {
    assert!(ValueRepresentation::OtherWordString.has_extended_length());
    assert!(ValueRepresentation::Sequence.has_extended_length());
    assert!(ValueRepresentation::Unknown.has_extended_length());
    assert!(ValueRepresentation::UnlimitedText.has_extended_length());

    assert!(!ValueRepresentation::UnsignedShort.has_extended_length());
    assert!(!ValueRepresentation::DecimalString.has_extended_length());
    assert!(!ValueRepresentation::UniqueIdentifier.has_extended_length());
  }

  #[test]
  fn is_string_test() {
    assert!(ValueRepresentation::UniqueIdentifier.is_string());

    assert!(!ValueRepresentation::OtherWordString.is_string());
  }
}

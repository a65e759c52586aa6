//! The DICOM transfer syntaxes the pipeline can decode.

/// The value representation (VR) serialization mode of a transfer syntax. This
/// is either implicit or explicit.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VrSerialization {
  VrImplicit,
  VrExplicit,
}

/// Describes a single DICOM transfer syntax, with its name, UID, how it
/// serializes value representations (implicit vs explicit), and whether it
/// stores its pixel data as encapsulated fragments.
///
#[derive(Debug, PartialEq)]
pub struct TransferSyntax {
  pub name: &'static str,
  pub uid: &'static str,
  pub vr_serialization: VrSerialization,
  pub is_encapsulated: bool,
}

/// The 'Implicit VR Little Endian' transfer syntax.
///
pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
  name: "Implicit VR Little Endian",
  uid: "1.2.840.10008.1.2",
  vr_serialization: VrSerialization::VrImplicit,
  is_encapsulated: false,
};

/// The 'Explicit VR Little Endian' transfer syntax.
///
pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
  name: "Explicit VR Little Endian",
  uid: "1.2.840.10008.1.2.1",
  vr_serialization: VrSerialization::VrExplicit,
  is_encapsulated: false,
};

/// The 'JPEG Baseline (Process 1)' transfer syntax.
///
pub const JPEG_BASELINE_8BIT: TransferSyntax = TransferSyntax {
  name: "JPEG Baseline (Process 1)",
  uid: "1.2.840.10008.1.2.4.50",
  vr_serialization: VrSerialization::VrExplicit,
  is_encapsulated: true,
};

/// All transfer syntaxes supported by the pipeline.
///
pub const ALL: &[&TransferSyntax] = &[
  &IMPLICIT_VR_LITTLE_ENDIAN,
  &EXPLICIT_VR_LITTLE_ENDIAN,
  &JPEG_BASELINE_8BIT,
];

impl TransferSyntax {
  /// Returns the transfer syntax with the given UID, or an error if the UID
  /// is not supported.
  ///
  pub fn from_uid(uid: &str) -> Result<&'static TransferSyntax, ()> {
    ALL
      .iter()
      .find(|transfer_syntax| transfer_syntax.uid == uid)
      .copied()
      .ok_or(())
  }
}

//! Dictionary of the data elements the volume pipeline reads. This is a
//! deliberately small subset of DICOM Part 6 covering slice geometry,
//! calibration, identifiers, and pixel data.

use crate::{DataElementTag, ValueRepresentation};

/// Describes a single data element: its tag, VR, and name.
///
pub struct TagDescriptor {
  pub tag: DataElementTag,
  pub vr: ValueRepresentation,
  pub name: &'static str,
}

const fn descriptor(
  group: u16,
  element: u16,
  vr: ValueRepresentation,
  name: &'static str,
) -> TagDescriptor {
  TagDescriptor {
    tag: DataElementTag::new(group, element),
    vr,
    name,
  }
}

pub const TRANSFER_SYNTAX_UID: TagDescriptor = descriptor(
  0x0002,
  0x0010,
  ValueRepresentation::UniqueIdentifier,
  "Transfer Syntax UID",
);

pub const SOP_INSTANCE_UID: TagDescriptor = descriptor(
  0x0008,
  0x0018,
  ValueRepresentation::UniqueIdentifier,
  "SOP Instance UID",
);

pub const STUDY_DATE: TagDescriptor =
  descriptor(0x0008, 0x0020, ValueRepresentation::Date, "Study Date");

pub const MODALITY: TagDescriptor =
  descriptor(0x0008, 0x0060, ValueRepresentation::CodeString, "Modality");

pub const PATIENT_ID: TagDescriptor =
  descriptor(0x0010, 0x0020, ValueRepresentation::LongString, "Patient ID");

pub const STUDY_INSTANCE_UID: TagDescriptor = descriptor(
  0x0020,
  0x000D,
  ValueRepresentation::UniqueIdentifier,
  "Study Instance UID",
);

pub const SERIES_INSTANCE_UID: TagDescriptor = descriptor(
  0x0020,
  0x000E,
  ValueRepresentation::UniqueIdentifier,
  "Series Instance UID",
);

pub const INSTANCE_NUMBER: TagDescriptor = descriptor(
  0x0020,
  0x0013,
  ValueRepresentation::IntegerString,
  "Instance Number",
);

pub const IMAGE_POSITION_PATIENT: TagDescriptor = descriptor(
  0x0020,
  0x0032,
  ValueRepresentation::DecimalString,
  "Image Position (Patient)",
);

pub const IMAGE_ORIENTATION_PATIENT: TagDescriptor = descriptor(
  0x0020,
  0x0037,
  ValueRepresentation::DecimalString,
  "Image Orientation (Patient)",
);

pub const FRAME_OF_REFERENCE_UID: TagDescriptor = descriptor(
  0x0020,
  0x0052,
  ValueRepresentation::UniqueIdentifier,
  "Frame of Reference UID",
);

pub const SLICE_LOCATION: TagDescriptor = descriptor(
  0x0020,
  0x1041,
  ValueRepresentation::DecimalString,
  "Slice Location",
);

pub const ROWS: TagDescriptor =
  descriptor(0x0028, 0x0010, ValueRepresentation::UnsignedShort, "Rows");

pub const COLUMNS: TagDescriptor =
  descriptor(0x0028, 0x0011, ValueRepresentation::UnsignedShort, "Columns");

pub const PIXEL_SPACING: TagDescriptor = descriptor(
  0x0028,
  0x0030,
  ValueRepresentation::DecimalString,
  "Pixel Spacing",
);

pub const BITS_ALLOCATED: TagDescriptor = descriptor(
  0x0028,
  0x0100,
  ValueRepresentation::UnsignedShort,
  "Bits Allocated",
);

pub const PIXEL_REPRESENTATION: TagDescriptor = descriptor(
  0x0028,
  0x0103,
  ValueRepresentation::UnsignedShort,
  "Pixel Representation",
);

pub const WINDOW_CENTER: TagDescriptor = descriptor(
  0x0028,
  0x1050,
  ValueRepresentation::DecimalString,
  "Window Center",
);

pub const WINDOW_WIDTH: TagDescriptor = descriptor(
  0x0028,
  0x1051,
  ValueRepresentation::DecimalString,
  "Window Width",
);

pub const RESCALE_INTERCEPT: TagDescriptor = descriptor(
  0x0028,
  0x1052,
  ValueRepresentation::DecimalString,
  "Rescale Intercept",
);

pub const RESCALE_SLOPE: TagDescriptor = descriptor(
  0x0028,
  0x1053,
  ValueRepresentation::DecimalString,
  "Rescale Slope",
);

pub const PIXEL_DATA: TagDescriptor = descriptor(
  0x7FE0,
  0x0010,
  ValueRepresentation::OtherWordString,
  "Pixel Data",
);

/// All descriptors known to this dictionary, ordered by tag.
///
pub const ALL: &[&TagDescriptor] = &[
  &TRANSFER_SYNTAX_UID,
  &SOP_INSTANCE_UID,
  &STUDY_DATE,
  &MODALITY,
  &PATIENT_ID,
  &STUDY_INSTANCE_UID,
  &SERIES_INSTANCE_UID,
  &INSTANCE_NUMBER,
  &IMAGE_POSITION_PATIENT,
  &IMAGE_ORIENTATION_PATIENT,
  &FRAME_OF_REFERENCE_UID,
  &SLICE_LOCATION,
  &ROWS,
  &COLUMNS,
  &PIXEL_SPACING,
  &BITS_ALLOCATED,
  &PIXEL_REPRESENTATION,
  &WINDOW_CENTER,
  &WINDOW_WIDTH,
  &RESCALE_INTERCEPT,
  &RESCALE_SLOPE,
  &PIXEL_DATA,
];

/// Looks up the descriptor for a tag, if the dictionary knows it.
///
pub fn find(tag: DataElementTag) -> Option<&'static TagDescriptor> {
  ALL.iter().find(|descriptor| descriptor.tag == tag).copied()
}

/// Returns the display name for a tag, falling back to `"unknown_tag"`.
///
pub fn tag_name(tag: DataElementTag) -> &'static str {
  match find(tag) {
    Some(descriptor) => descriptor.name,
    None => "unknown_tag",
  }
}

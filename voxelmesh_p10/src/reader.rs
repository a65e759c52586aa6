//! Walks the element stream of a single DICOM P10 object and extracts a
//! [`RawSlice`].

use voxelmesh_core::transfer_syntax::{self, VrSerialization};
use voxelmesh_core::{
  dictionary, DataElementTag, ElementMap, ElementValue, TransferSyntax,
  ValueRepresentation,
};

use crate::internal::byte_cursor::{ByteCursor, DataEnd};
use crate::internal::data_element_header::{
  DataElementHeader, UNDEFINED_LENGTH,
};
use crate::{jpeg, PixelPayload, RawSlice, ReadError};

/// The size of the File Preamble and `DICM` prefix that starts DICOM P10
/// data.
///
const PREAMBLE_AND_PREFIX_LENGTH: usize = 132;

/// The maximum sequence nesting depth the reader will skip through before
/// declaring the data malformed.
///
const MAX_SEQUENCE_DEPTH: usize = 64;

const ITEM: DataElementTag = DataElementTag::new(0xFFFE, 0xE000);
const ITEM_DELIMITATION: DataElementTag = DataElementTag::new(0xFFFE, 0xE00D);
const SEQUENCE_DELIMITATION: DataElementTag =
  DataElementTag::new(0xFFFE, 0xE0DD);

/// Reads a single DICOM P10 object from an in-memory byte buffer and returns
/// the [`RawSlice`] it describes.
///
pub fn read_slice(data: &[u8]) -> Result<RawSlice, ReadError> {
  let mut cursor = ByteCursor::new(data);

  read_preamble_and_prefix(&mut cursor)?;

  let transfer_syntax = read_file_meta_information(&mut cursor)?;

  let mut elements = ElementMap::new();
  read_data_set(&mut cursor, transfer_syntax, &mut elements)?;

  let slice = build_raw_slice(&elements, transfer_syntax)?;

  log::debug!(
    "Read {}x{} slice, {} bits, transfer syntax '{}'",
    slice.columns,
    slice.rows,
    slice.bits_allocated,
    transfer_syntax.name,
  );

  Ok(slice)
}

fn ended(when: &str) -> ReadError {
  ReadError::MalformedHeader {
    when: when.to_string(),
    details: "Data ended unexpectedly".to_string(),
  }
}

/// Checks the 128-byte File Preamble followed by the `DICM` prefix.
///
fn read_preamble_and_prefix(cursor: &mut ByteCursor) -> Result<(), ReadError> {
  let when = "Reading file preamble";

  let preamble = cursor
    .read_bytes(PREAMBLE_AND_PREFIX_LENGTH)
    .map_err(|DataEnd| ended(when))?;

  if &preamble[128..132] != b"DICM" {
    return Err(ReadError::MalformedHeader {
      when: when.to_string(),
      details: "'DICM' prefix not found".to_string(),
    });
  }

  Ok(())
}

/// Reads the File Meta Information group, which is always serialized in
/// Explicit VR Little Endian, and resolves the transfer syntax of the main
/// data set. A missing Transfer Syntax UID falls back to Implicit VR Little
/// Endian.
///
fn read_file_meta_information(
  cursor: &mut ByteCursor,
) -> Result<&'static TransferSyntax, ReadError> {
  let when = "Reading File Meta Information";

  let mut transfer_syntax_uid: Option<String> = None;

  while cursor.peek_u16() == Ok(0x0002) {
    let header =
      read_data_element_header(cursor, VrSerialization::VrExplicit)?;

    if header.has_undefined_length() {
      return Err(ReadError::MalformedHeader {
        when: when.to_string(),
        details: format!(
          "File Meta Information element {} has undefined length",
          header.tag
        ),
      });
    }

    let value_bytes = cursor
      .read_bytes(header.length as usize)
      .map_err(|DataEnd| ended(when))?;

    if header.tag == dictionary::TRANSFER_SYNTAX_UID.tag {
      if let Some(value) = ElementValue::decode(
        ValueRepresentation::UniqueIdentifier,
        value_bytes,
      ) {
        transfer_syntax_uid = value.uid().map(str::to_string);
      }
    }
  }

  match transfer_syntax_uid {
    None => Ok(&transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN),
    Some(uid) => TransferSyntax::from_uid(&uid).map_err(|_| {
      ReadError::UnsupportedTransferSyntax {
        transfer_syntax_uid: uid,
      }
    }),
  }
}

/// Walks the main data set's elements, decoding the tags the pipeline reads
/// and structurally skipping everything else.
///
fn read_data_set(
  cursor: &mut ByteCursor,
  transfer_syntax: &'static TransferSyntax,
  elements: &mut ElementMap,
) -> Result<(), ReadError> {
  let when = "Reading data set";
  let vr_serialization = transfer_syntax.vr_serialization;

  while !cursor.is_exhausted() {
    let header = read_data_element_header(cursor, vr_serialization)?;

    if header.tag == dictionary::PIXEL_DATA.tag {
      read_pixel_data(cursor, transfer_syntax, &header, elements)?;
      continue;
    }

    if header.tag.is_delimiter() {
      return Err(ReadError::MalformedHeader {
        when: when.to_string(),
        details: format!("Unexpected delimiter {}", header.tag),
      });
    }

    if header.has_undefined_length() {
      // Only sequences may have undefined length outside of pixel data
      skip_sequence_with_undefined_length(cursor, vr_serialization, 0)?;
      continue;
    }

    let value_bytes = cursor
      .read_bytes(header.length as usize)
      .map_err(|DataEnd| ended(when))?;

    if let Some(descriptor) = dictionary::find(header.tag) {
      // In implicit VR serialization the VR comes from the dictionary
      let vr = header.vr.unwrap_or(descriptor.vr);

      if let Some(value) = ElementValue::decode(vr, value_bytes) {
        elements.insert(header.tag, value);
      }
    }
  }

  Ok(())
}

/// Reads the header of the next data element: tag, VR (for explicit VR
/// serialization and non-delimiter tags), and value length.
///
fn read_data_element_header(
  cursor: &mut ByteCursor,
  vr_serialization: VrSerialization,
) -> Result<DataElementHeader, ReadError> {
  let when = "Reading data element header";

  let group = cursor.read_u16().map_err(|DataEnd| ended(when))?;
  let element = cursor.read_u16().map_err(|DataEnd| ended(when))?;
  let tag = DataElementTag::new(group, element);

  // Item and sequence delimiters have no VR, just a 32-bit length
  if tag.is_delimiter() {
    let length = cursor.read_u32().map_err(|DataEnd| ended(when))?;

    return Ok(DataElementHeader {
      tag,
      vr: None,
      length,
    });
  }

  match vr_serialization {
    VrSerialization::VrImplicit => {
      let length = cursor.read_u32().map_err(|DataEnd| ended(when))?;

      Ok(DataElementHeader {
        tag,
        vr: None,
        length,
      })
    }

    VrSerialization::VrExplicit => {
      let vr_bytes = cursor.read_bytes(2).map_err(|DataEnd| ended(when))?;

      let vr = ValueRepresentation::from_bytes(vr_bytes).map_err(|_| {
        ReadError::MalformedHeader {
          when: when.to_string(),
          details: format!("Invalid VR for tag {}", tag),
        }
      })?;

      let length = if vr.has_extended_length() {
        cursor.skip(2).map_err(|DataEnd| ended(when))?;
        cursor.read_u32().map_err(|DataEnd| ended(when))?
      } else {
        u32::from(cursor.read_u16().map_err(|DataEnd| ended(when))?)
      };

      Ok(DataElementHeader {
        tag,
        vr: Some(vr),
        length,
      })
    }
  }
}

/// Reads the pixel data element. Encapsulated transfer syntaxes store items
/// whose first entry is the basic offset table and whose remaining entries
/// are fragments; uncompressed transfer syntaxes store the samples directly.
///
fn read_pixel_data(
  cursor: &mut ByteCursor,
  transfer_syntax: &'static TransferSyntax,
  header: &DataElementHeader,
  elements: &mut ElementMap,
) -> Result<(), ReadError> {
  let when = "Reading pixel data";

  if header.has_undefined_length() {
    if !transfer_syntax.is_encapsulated {
      return Err(ReadError::MalformedHeader {
        when: when.to_string(),
        details:
          "Pixel data has undefined length in an unencapsulated transfer \
           syntax"
            .to_string(),
      });
    }

    let mut items: Vec<Vec<u8>> = vec![];

    loop {
      let group = cursor.read_u16().map_err(|DataEnd| ended(when))?;
      let element = cursor.read_u16().map_err(|DataEnd| ended(when))?;
      let tag = DataElementTag::new(group, element);
      let length = cursor.read_u32().map_err(|DataEnd| ended(when))?;

      if tag == SEQUENCE_DELIMITATION {
        break;
      }

      if tag != ITEM || length == UNDEFINED_LENGTH {
        return Err(ReadError::MalformedHeader {
          when: when.to_string(),
          details: format!("Expected pixel data item, found {}", tag),
        });
      }

      let item_bytes = cursor
        .read_bytes(length as usize)
        .map_err(|DataEnd| ended(when))?;

      items.push(item_bytes.to_vec());
    }

    // The first item is the basic offset table, which is not a fragment
    let fragments = if items.is_empty() {
      vec![]
    } else {
      items.split_off(1)
    };

    elements.insert(
      dictionary::PIXEL_DATA.tag,
      ElementValue::EncapsulatedFragments(fragments),
    );
  } else {
    let value_bytes = cursor
      .read_bytes(header.length as usize)
      .map_err(|DataEnd| ended(when))?;

    elements.insert(
      dictionary::PIXEL_DATA.tag,
      ElementValue::Bytes(value_bytes.to_vec()),
    );
  }

  Ok(())
}

/// Skips over a sequence with undefined length by scanning its items until
/// the sequence delimitation item is reached.
///
fn skip_sequence_with_undefined_length(
  cursor: &mut ByteCursor,
  vr_serialization: VrSerialization,
  depth: usize,
) -> Result<(), ReadError> {
  let when = "Skipping sequence";

  if depth > MAX_SEQUENCE_DEPTH {
    return Err(ReadError::MalformedHeader {
      when: when.to_string(),
      details: "Maximum sequence depth exceeded".to_string(),
    });
  }

  loop {
    let group = cursor.read_u16().map_err(|DataEnd| ended(when))?;
    let element = cursor.read_u16().map_err(|DataEnd| ended(when))?;
    let tag = DataElementTag::new(group, element);
    let length = cursor.read_u32().map_err(|DataEnd| ended(when))?;

    if tag == SEQUENCE_DELIMITATION {
      return Ok(());
    }

    if tag != ITEM {
      return Err(ReadError::MalformedHeader {
        when: when.to_string(),
        details: format!("Expected item in sequence, found {}", tag),
      });
    }

    if length == UNDEFINED_LENGTH {
      skip_item_with_undefined_length(cursor, vr_serialization, depth + 1)?;
    } else {
      cursor
        .skip(length as usize)
        .map_err(|DataEnd| ended(when))?;
    }
  }
}

/// Skips over a sequence item with undefined length by walking its elements
/// until the item delimitation item is reached.
///
fn skip_item_with_undefined_length(
  cursor: &mut ByteCursor,
  vr_serialization: VrSerialization,
  depth: usize,
) -> Result<(), ReadError> {
  let when = "Skipping sequence item";

  if depth > MAX_SEQUENCE_DEPTH {
    return Err(ReadError::MalformedHeader {
      when: when.to_string(),
      details: "Maximum sequence depth exceeded".to_string(),
    });
  }

  loop {
    let header = read_data_element_header(cursor, vr_serialization)?;

    if header.tag == ITEM_DELIMITATION {
      return Ok(());
    }

    if header.has_undefined_length() {
      skip_sequence_with_undefined_length(cursor, vr_serialization, depth + 1)?;
    } else {
      cursor
        .skip(header.length as usize)
        .map_err(|DataEnd| ended(when))?;
    }
  }
}

/// Assembles a [`RawSlice`] from the decoded elements, validating the
/// required tags and the pixel payload.
///
fn build_raw_slice(
  elements: &ElementMap,
  transfer_syntax: &'static TransferSyntax,
) -> Result<RawSlice, ReadError> {
  let rows = elements.ushort(dictionary::ROWS.tag).ok_or(
    ReadError::MissingRequiredTag {
      tag: dictionary::ROWS.tag,
    },
  )?;

  let columns = elements.ushort(dictionary::COLUMNS.tag).ok_or(
    ReadError::MissingRequiredTag {
      tag: dictionary::COLUMNS.tag,
    },
  )?;

  let bits_allocated = elements.ushort(dictionary::BITS_ALLOCATED.tag).ok_or(
    ReadError::MissingRequiredTag {
      tag: dictionary::BITS_ALLOCATED.tag,
    },
  )?;

  if bits_allocated != 8 && bits_allocated != 16 {
    return Err(ReadError::UnsupportedBitsAllocated { bits_allocated });
  }

  let is_signed =
    elements.ushort(dictionary::PIXEL_REPRESENTATION.tag) == Some(1);

  let payload = match elements.get(dictionary::PIXEL_DATA.tag) {
    Some(ElementValue::EncapsulatedFragments(fragments)) => {
      let fragment = fragments.first().ok_or(ReadError::PixelDataAbsent)?;

      PixelPayload::JpegBaseline(jpeg::decode_baseline(
        fragment, rows, columns,
      )?)
    }

    Some(ElementValue::Bytes(bytes)) => {
      let expected = usize::from(rows)
        * usize::from(columns)
        * usize::from(bits_allocated / 8);

      if bytes.len() < expected {
        return Err(ReadError::MalformedHeader {
          when: "Reading pixel data".to_string(),
          details: format!(
            "Pixel data has {} bytes but {} are required",
            bytes.len(),
            expected
          ),
        });
      }

      PixelPayload::Uncompressed(bytes[..expected].to_vec())
    }

    _ => return Err(ReadError::PixelDataAbsent),
  };

  let vector = |tag: DataElementTag, n: usize| {
    elements.decimals(tag).filter(|values| values.len() >= n)
  };

  Ok(RawSlice {
    rows,
    columns,
    bits_allocated,
    is_signed,
    transfer_syntax,
    payload,

    rescale_slope: elements
      .decimal(dictionary::RESCALE_SLOPE.tag)
      .unwrap_or(1.0) as f32,
    rescale_intercept: elements
      .decimal(dictionary::RESCALE_INTERCEPT.tag)
      .unwrap_or(0.0) as f32,

    window_center: elements
      .decimal(dictionary::WINDOW_CENTER.tag)
      .map(|value| value as f32),
    window_width: elements
      .decimal(dictionary::WINDOW_WIDTH.tag)
      .map(|value| value as f32),

    position: vector(dictionary::IMAGE_POSITION_PATIENT.tag, 3)
      .map(|values| [values[0], values[1], values[2]]),
    orientation: vector(dictionary::IMAGE_ORIENTATION_PATIENT.tag, 6).map(
      |values| {
        [
          values[0], values[1], values[2], values[3], values[4], values[5],
        ]
      },
    ),
    pixel_spacing: vector(dictionary::PIXEL_SPACING.tag, 2)
      .map(|values| [values[0], values[1]]),

    instance_number: elements.int(dictionary::INSTANCE_NUMBER.tag),
    slice_location: elements.decimal(dictionary::SLICE_LOCATION.tag),

    sop_instance_uid: elements
      .uid(dictionary::SOP_INSTANCE_UID.tag)
      .map(str::to_string),
    patient_id: elements
      .text(dictionary::PATIENT_ID.tag)
      .map(str::to_string),
    study_instance_uid: elements
      .uid(dictionary::STUDY_INSTANCE_UID.tag)
      .map(str::to_string),
    series_instance_uid: elements
      .uid(dictionary::SERIES_INSTANCE_UID.tag)
      .map(str::to_string),
    frame_of_reference_uid: elements
      .uid(dictionary::FRAME_OF_REFERENCE_UID.tag)
      .map(str::to_string),
    modality: elements.text(dictionary::MODALITY.tag).map(str::to_string),
    study_date: elements
      .text(dictionary::STUDY_DATE.tag)
      .map(str::to_string),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const EXPLICIT_VR_LITTLE_ENDIAN_UID: &str = "1.2.840.10008.1.2.1";

  /// Serializes one explicit VR data element with a 16-bit value length.
  ///
  fn element_short(
    group: u16,
    element: u16,
    vr: &[u8; 2],
    value: &[u8],
  ) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(&group.to_le_bytes());
    bytes.extend_from_slice(&element.to_le_bytes());
    bytes.extend_from_slice(vr);
    bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
    bytes.extend_from_slice(value);
    bytes
  }

  /// Serializes one explicit VR data element with a 32-bit value length.
  ///
  fn element_long(
    group: u16,
    element: u16,
    vr: &[u8; 2],
    value: &[u8],
  ) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(&group.to_le_bytes());
    bytes.extend_from_slice(&element.to_le_bytes());
    bytes.extend_from_slice(vr);
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
    bytes.extend_from_slice(value);
    bytes
  }

  fn file_with_transfer_syntax(
    transfer_syntax_uid: &str,
    data_set: &[u8],
  ) -> Vec<u8> {
    let mut uid = transfer_syntax_uid.as_bytes().to_vec();
    if uid.len() % 2 == 1 {
      uid.push(0);
    }

    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes.extend(element_short(0x0002, 0x0010, b"UI", &uid));
    bytes.extend_from_slice(data_set);
    bytes
  }

  fn minimal_data_set() -> Vec<u8> {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0010, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0011, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &8u16.to_le_bytes()));
    data_set.extend(element_long(0x7FE0, 0x0010, b"OB", &[1, 2, 3, 4]));
    data_set
  }

  #[test]
  fn read_slice_test() {
    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &{
        let mut data_set = vec![];
        data_set.extend(element_short(0x0008, 0x0060, b"CS", b"CT"));
        data_set.extend(element_short(
          0x0020,
          0x0032,
          b"DS",
          b"-100.5\\20\\5.25 ",
        ));
        data_set.extend(element_short(
          0x0020,
          0x0037,
          b"DS",
          b"1\\0\\0\\0\\1\\0",
        ));
        data_set.extend(element_short(0x0028, 0x0030, b"DS", b"0.5\\0.6 "));
        data_set.extend(element_short(0x0028, 0x1052, b"DS", b"-1024 "));
        data_set.extend(element_short(0x0028, 0x1053, b"DS", b"2 "));
        data_set.extend(minimal_data_set());
        data_set
      });

    let slice = read_slice(&file).unwrap();

    assert_eq!(slice.rows, 2);
    assert_eq!(slice.columns, 2);
    assert_eq!(slice.bits_allocated, 8);
    assert!(!slice.is_signed);
    assert_eq!(slice.payload, PixelPayload::Uncompressed(vec![1, 2, 3, 4]));
    assert_eq!(slice.modality.as_deref(), Some("CT"));
    assert_eq!(slice.position, Some([-100.5, 20.0, 5.25]));
    assert_eq!(slice.orientation, Some([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]));
    assert_eq!(slice.pixel_spacing, Some([0.5, 0.6]));
    assert_eq!(slice.rescale_slope, 2.0);
    assert_eq!(slice.rescale_intercept, -1024.0);
  }

  #[test]
  fn read_slice_implicit_vr_test() {
    let mut data_set = vec![];

    let mut implicit_element = |group: u16, element: u16, value: &[u8]| {
      data_set.extend_from_slice(&group.to_le_bytes());
      data_set.extend_from_slice(&element.to_le_bytes());
      data_set.extend_from_slice(&(value.len() as u32).to_le_bytes());
      data_set.extend_from_slice(value);
    };

    implicit_element(0x0028, 0x0010, &1u16.to_le_bytes());
    implicit_element(0x0028, 0x0011, &2u16.to_le_bytes());
    implicit_element(0x0028, 0x0100, &16u16.to_le_bytes());
    implicit_element(0x0028, 0x0103, &1u16.to_le_bytes());
    implicit_element(0x7FE0, 0x0010, &[0, 1, 2, 3]);

    let file = file_with_transfer_syntax("1.2.840.10008.1.2", &data_set);

    let slice = read_slice(&file).unwrap();

    assert_eq!(slice.rows, 1);
    assert_eq!(slice.columns, 2);
    assert_eq!(slice.bits_allocated, 16);
    assert!(slice.is_signed);
    assert_eq!(slice.payload, PixelPayload::Uncompressed(vec![0, 1, 2, 3]));
  }

  #[test]
  fn missing_dicm_prefix_test() {
    let mut file = vec![0u8; 128];
    file.extend_from_slice(b"NOPE");

    assert_eq!(
      read_slice(&file),
      Err(ReadError::MalformedHeader {
        when: "Reading file preamble".to_string(),
        details: "'DICM' prefix not found".to_string(),
      })
    );
  }

  #[test]
  fn unsupported_transfer_syntax_test() {
    let file =
      file_with_transfer_syntax("1.2.840.10008.1.2.2", &minimal_data_set());

    assert_eq!(
      read_slice(&file),
      Err(ReadError::UnsupportedTransferSyntax {
        transfer_syntax_uid: "1.2.840.10008.1.2.2".to_string(),
      })
    );
  }

  #[test]
  fn missing_required_tag_test() {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0011, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &8u16.to_le_bytes()));
    data_set.extend(element_long(0x7FE0, 0x0010, b"OB", &[0; 4]));

    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &data_set);

    assert_eq!(
      read_slice(&file),
      Err(ReadError::MissingRequiredTag {
        tag: dictionary::ROWS.tag,
      })
    );
  }

  #[test]
  fn unsupported_bits_allocated_test() {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0010, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0011, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &32u16.to_le_bytes()));
    data_set.extend(element_long(0x7FE0, 0x0010, b"OB", &[0; 16]));

    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &data_set);

    assert_eq!(
      read_slice(&file),
      Err(ReadError::UnsupportedBitsAllocated { bits_allocated: 32 })
    );
  }

  #[test]
  fn pixel_data_absent_test() {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0010, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0011, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &8u16.to_le_bytes()));

    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &data_set);

    assert_eq!(read_slice(&file), Err(ReadError::PixelDataAbsent));
  }

  #[test]
  fn truncated_pixel_data_test() {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0010, b"US", &4u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0011, b"US", &4u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &8u16.to_le_bytes()));
    data_set.extend(element_long(0x7FE0, 0x0010, b"OB", &[0; 4]));

    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &data_set);

    assert_eq!(
      read_slice(&file),
      Err(ReadError::MalformedHeader {
        when: "Reading pixel data".to_string(),
        details: "Pixel data has 4 bytes but 16 are required".to_string(),
      })
    );
  }

  #[test]
  fn skips_sequences_test() {
    // A sequence with undefined length containing one item with a nested
    // element is skipped without affecting the rest of the read
    let mut sequence = vec![];
    sequence.extend_from_slice(&0x0008u16.to_le_bytes());
    sequence.extend_from_slice(&0x1140u16.to_le_bytes());
    sequence.extend_from_slice(b"SQ");
    sequence.extend_from_slice(&[0, 0]);
    sequence.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    // Item with undefined length holding one short element
    sequence.extend_from_slice(&0xFFFEu16.to_le_bytes());
    sequence.extend_from_slice(&0xE000u16.to_le_bytes());
    sequence.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    sequence.extend(element_short(0x0008, 0x0060, b"CS", b"MR"));
    sequence.extend_from_slice(&0xFFFEu16.to_le_bytes());
    sequence.extend_from_slice(&0xE00Du16.to_le_bytes());
    sequence.extend_from_slice(&0u32.to_le_bytes());

    // Sequence delimitation
    sequence.extend_from_slice(&0xFFFEu16.to_le_bytes());
    sequence.extend_from_slice(&0xE0DDu16.to_le_bytes());
    sequence.extend_from_slice(&0u32.to_le_bytes());

    let mut data_set = sequence;
    data_set.extend(element_short(0x0008, 0x0060, b"CS", b"CT"));
    data_set.extend(minimal_data_set());

    let file =
      file_with_transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN_UID, &data_set);

    let slice = read_slice(&file).unwrap();

    // The modality inside the skipped sequence must not leak out
    assert_eq!(slice.modality.as_deref(), Some("CT"));
  }

  #[test]
  fn invalid_jpeg_fragment_test() {
    let mut data_set = vec![];
    data_set.extend(element_short(0x0028, 0x0010, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0011, b"US", &2u16.to_le_bytes()));
    data_set.extend(element_short(0x0028, 0x0100, b"US", &8u16.to_le_bytes()));

    // Encapsulated pixel data: empty basic offset table plus one fragment of
    // bytes that are not a JPEG bitstream
    data_set.extend_from_slice(&0x7FE0u16.to_le_bytes());
    data_set.extend_from_slice(&0x0010u16.to_le_bytes());
    data_set.extend_from_slice(b"OB");
    data_set.extend_from_slice(&[0, 0]);
    data_set.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    data_set.extend_from_slice(&0xFFFEu16.to_le_bytes());
    data_set.extend_from_slice(&0xE000u16.to_le_bytes());
    data_set.extend_from_slice(&0u32.to_le_bytes());

    data_set.extend_from_slice(&0xFFFEu16.to_le_bytes());
    data_set.extend_from_slice(&0xE000u16.to_le_bytes());
    data_set.extend_from_slice(&4u32.to_le_bytes());
    data_set.extend_from_slice(&[1, 2, 3, 4]);

    data_set.extend_from_slice(&0xFFFEu16.to_le_bytes());
    data_set.extend_from_slice(&0xE0DDu16.to_le_bytes());
    data_set.extend_from_slice(&0u32.to_le_bytes());

    let file = file_with_transfer_syntax("1.2.840.10008.1.2.4.50", &data_set);

    assert!(matches!(
      read_slice(&file),
      Err(ReadError::MalformedHeader { .. })
    ));
  }
}

//! Loads the DICOM slices of a study from an input directory.

use std::path::Path;

use voxelmesh::p10::{read_slice, RawSlice, ReadError};

/// Scans a directory recursively and reads every DICOM file into a raw
/// slice. Files without the `DICM` prefix are skipped with a logged warning;
/// parse failures on actual DICOM files abort the load.
///
pub fn load_slices(directory: &Path) -> Result<Vec<RawSlice>, LoadError> {
  let mut slices = vec![];
  let mut skipped = 0usize;

  for entry in walkdir::WalkDir::new(directory).sort_by_file_name() {
    let entry = entry.map_err(|e| LoadError::Io(e.to_string()))?;

    if !entry.file_type().is_file() {
      continue;
    }

    let bytes = std::fs::read(entry.path())
      .map_err(|e| LoadError::Io(e.to_string()))?;

    if !has_dicm_prefix(&bytes) {
      skipped += 1;
      continue;
    }

    slices.push(read_slice(&bytes).map_err(LoadError::Read)?);
  }

  if skipped > 0 {
    log::warn!("Skipped {} non-DICOM files", skipped);
  }

  log::info!("Loaded {} DICOM slices", slices.len());

  Ok(slices)
}

fn has_dicm_prefix(bytes: &[u8]) -> bool {
  bytes.len() >= 132 && &bytes[128..132] == b"DICM"
}

/// An error that occurred while loading slices from disk.
///
pub enum LoadError {
  /// A file or directory could not be read.
  Io(String),

  /// A DICOM file failed to parse.
  Read(ReadError),
}

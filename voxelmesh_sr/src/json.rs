//! The annotation JSON surface: a simpler, lossless document over the same
//! data as the structured report, intended for storage and interchange.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use voxelmesh_volume::{StudyMetadata, Volume};

use crate::{Annotation, AnnotationKind, SrError};

/// The document version emitted by [`export_json`].
pub const DOCUMENT_VERSION: &str = "1.0";

/// The study section of an annotation document.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySection {
  pub patient_id: Option<String>,

  #[serde(rename = "studyInstanceUID")]
  pub study_instance_uid: Option<String>,

  #[serde(rename = "seriesInstanceUID")]
  pub series_instance_uid: Option<String>,

  pub modality: Option<String>,
  pub study_date: Option<String>,
}

/// The volume geometry section of an annotation document.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSection {
  pub dimensions: [usize; 3],
  pub spacing: [f64; 3],
  pub origin: [f64; 3],
  pub orientation: [f64; 9],
}

/// One annotation record of an annotation document.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
  pub id: String,

  #[serde(rename = "type")]
  pub kind: String,

  pub position: [f64; 3],

  #[serde(skip_serializing_if = "Option::is_none")]
  pub arrow_to: Option<[f64; 3]>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub slice_index: Option<usize>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub label_text: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub linked_to_id: Option<String>,

  pub created_at: String,
}

/// A complete annotation document.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDocument {
  pub version: String,
  pub study: StudySection,
  pub volume: VolumeSection,
  pub annotations: Vec<AnnotationRecord>,
  pub exported_at: String,
}

/// Exports annotations, study identifiers, and volume geometry as a JSON
/// document string.
///
pub fn export_json(
  annotations: &[Annotation],
  volume: &Volume,
  study: &StudyMetadata,
) -> Result<String, SrError> {
  let exported_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

  let records = annotations
    .iter()
    .map(|annotation| AnnotationRecord {
      id: annotation.id.clone(),
      kind: kind_to_str(annotation.kind).to_string(),
      position: annotation.position,
      arrow_to: annotation.arrow_to,
      slice_index: annotation.slice_index,
      label_text: annotation.label_text.clone(),
      linked_to_id: annotation.linked_to.clone(),
      created_at: annotation
        .created_at
        .clone()
        .unwrap_or_else(|| exported_at.clone()),
    })
    .collect();

  let document = AnnotationDocument {
    version: DOCUMENT_VERSION.to_string(),
    study: StudySection {
      patient_id: study.patient_id.clone(),
      study_instance_uid: study.study_instance_uid.clone(),
      series_instance_uid: study.series_instance_uid.clone(),
      modality: study.modality.clone(),
      study_date: study.study_date.clone(),
    },
    volume: VolumeSection {
      dimensions: [
        volume.dimensions.width,
        volume.dimensions.height,
        volume.dimensions.depth,
      ],
      spacing: volume.spacing,
      origin: volume.origin,
      orientation: volume.orientation,
    },
    annotations: records,
    exported_at,
  };

  serde_json::to_string_pretty(&document).map_err(|e| {
    SrError::MalformedReport {
      details: e.to_string(),
    }
  })
}

/// Parses an annotation document back into annotations. Records with an
/// unknown type or violated invariants are skipped; unknown fields are
/// ignored. The parsed set is complete on return, so the caller can swap it
/// in atomically.
///
pub fn import_json(text: &str) -> Result<Vec<Annotation>, SrError> {
  let document: AnnotationDocument =
    serde_json::from_str(text).map_err(|e| SrError::MalformedReport {
      details: e.to_string(),
    })?;

  let depth = document.volume.dimensions[2];

  let mut annotations = vec![];

  for record in &document.annotations {
    let kind = match kind_from_str(&record.kind) {
      Some(kind) => kind,
      None => {
        log::warn!("Skipping annotation with unknown type '{}'", record.kind);
        continue;
      }
    };

    let annotation = Annotation {
      id: record.id.clone(),
      kind,
      position: record.position,
      arrow_to: record.arrow_to,
      slice_index: record.slice_index,
      label_text: record.label_text.clone(),
      linked_to: record.linked_to_id.clone(),
      created_at: Some(record.created_at.clone()),
    };

    if !annotation.is_valid(depth) {
      log::warn!("Skipping invalid annotation '{}'", annotation.id);
      continue;
    }

    annotations.push(annotation);
  }

  if annotations.is_empty() {
    return Err(SrError::NoAnnotationsFound);
  }

  Ok(annotations)
}

fn kind_to_str(kind: AnnotationKind) -> &'static str {
  match kind {
    AnnotationKind::Marker => "marker",
    AnnotationKind::Arrow => "arrow",
    AnnotationKind::Label => "label",
  }
}

fn kind_from_str(kind: &str) -> Option<AnnotationKind> {
  match kind {
    "marker" => Some(AnnotationKind::Marker),
    "arrow" => Some(AnnotationKind::Arrow),
    "label" => Some(AnnotationKind::Label),
    _ => None,
  }
}

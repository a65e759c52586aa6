//! The Comprehensive 3D SR document model and the annotation codec over it.
//!
//! Export maps each annotation's normalized position into patient
//! coordinates and emits SCOORD3D content items (POINT for markers and
//! labels, POLYLINE for arrows), with label text carried by a TEXT item that
//! follows its geometric item. Import walks the content sequence in order
//! and inverts the mapping against the currently loaded volume.

use serde::{Deserialize, Serialize};

use voxelmesh_volume::{GeometryMap, StudyMetadata, Volume};

use crate::{
  generate_sop_instance_uid, Annotation, AnnotationKind, SrError,
  COMPREHENSIVE_3D_SR_SOP_CLASS_UID,
};

/// Concept name of a marker's geometric item.
pub const POINT_ANNOTATION_CONCEPT: &str = "point annotation";

/// Concept name of an arrow's geometric item.
pub const ARROW_ANNOTATION_CONCEPT: &str = "arrow annotation";

/// Concept name of a label's text item.
pub const ANNOTATION_LABEL_CONCEPT: &str = "annotation label";

/// Content template identifier for measurement reports.
pub const CONTENT_TEMPLATE_ID: &str = "1500";

/// The graphic type of a SCOORD3D content item.
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GraphicType {
  #[serde(rename = "POINT")]
  Point,

  #[serde(rename = "POLYLINE")]
  Polyline,
}

/// One item of the report's content sequence. Unrecognized value types
/// deserialize to `Other` and are ignored on import.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "valueType")]
pub enum ContentItem {
  #[serde(rename = "SCOORD3D", rename_all = "camelCase")]
  Scoord3d {
    concept: String,
    graphic_type: GraphicType,

    /// Patient-space coordinates, three per point.
    graphic_data: Vec<f64>,

    /// SOP instance UID of the slice the annotation belongs to.
    referenced_sop_instance_uid: Option<String>,
  },

  #[serde(rename = "TEXT", rename_all = "camelCase")]
  Text { concept: String, text: String },

  #[serde(other)]
  Other,
}

/// A Comprehensive 3D SR document: the envelope identifiers plus the content
/// sequence. The document serializes losslessly through serde for transport.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
  pub sop_class_uid: String,
  pub sop_instance_uid: String,
  pub modality: String,
  pub coordinate_system: String,
  pub content_template_id: String,
  pub completion_flag: String,
  pub verification_flag: String,

  pub patient_id: Option<String>,
  pub study_instance_uid: Option<String>,
  pub series_instance_uid: Option<String>,
  pub frame_of_reference_uid: Option<String>,
  pub study_date: Option<String>,

  pub content: Vec<ContentItem>,
}

/// Exports annotations as a structured report against the given volume and
/// study. Fails with `NoAnnotationsFound` when there is nothing to export.
///
pub fn export_report(
  annotations: &[Annotation],
  volume: &Volume,
  study: &StudyMetadata,
) -> Result<StructuredReport, SrError> {
  if annotations.is_empty() {
    return Err(SrError::NoAnnotationsFound);
  }

  let geometry = GeometryMap::from_volume(volume);
  let depth = volume.dimensions.depth;

  let mut content = vec![];

  for annotation in annotations {
    let position = geometry.normalized_to_patient(annotation.position);

    let referenced_sop_instance_uid =
      referenced_sop_instance(annotation, study, depth);

    match annotation.kind {
      AnnotationKind::Marker | AnnotationKind::Label => {
        content.push(ContentItem::Scoord3d {
          concept: POINT_ANNOTATION_CONCEPT.to_string(),
          graphic_type: GraphicType::Point,
          graphic_data: position.to_vec(),
          referenced_sop_instance_uid,
        });
      }

      AnnotationKind::Arrow => {
        let arrow_to = annotation.arrow_to.ok_or_else(|| {
          SrError::MalformedReport {
            details: "Arrow annotation has no endpoint".to_string(),
          }
        })?;

        let endpoint = geometry.normalized_to_patient(arrow_to);

        content.push(ContentItem::Scoord3d {
          concept: ARROW_ANNOTATION_CONCEPT.to_string(),
          graphic_type: GraphicType::Polyline,
          graphic_data: vec![
            position[0],
            position[1],
            position[2],
            endpoint[0],
            endpoint[1],
            endpoint[2],
          ],
          referenced_sop_instance_uid,
        });
      }
    }

    if let Some(text) = &annotation.label_text {
      if !text.is_empty() {
        content.push(ContentItem::Text {
          concept: ANNOTATION_LABEL_CONCEPT.to_string(),
          text: text.clone(),
        });
      }
    }
  }

  Ok(StructuredReport {
    sop_class_uid: COMPREHENSIVE_3D_SR_SOP_CLASS_UID.to_string(),
    sop_instance_uid: generate_sop_instance_uid(),
    modality: "SR".to_string(),
    coordinate_system: "PATIENT".to_string(),
    content_template_id: CONTENT_TEMPLATE_ID.to_string(),
    completion_flag: "COMPLETE".to_string(),
    verification_flag: "UNVERIFIED".to_string(),
    patient_id: study.patient_id.clone(),
    study_instance_uid: study.study_instance_uid.clone(),
    series_instance_uid: study.series_instance_uid.clone(),
    frame_of_reference_uid: study.frame_of_reference_uid.clone(),
    study_date: study.study_date.clone(),
    content,
  })
}

/// Selects the referenced SOP instance for an annotation: its slice index
/// when present, otherwise the depth bin nearest to its normalized z
/// component.
///
fn referenced_sop_instance(
  annotation: &Annotation,
  study: &StudyMetadata,
  depth: usize,
) -> Option<String> {
  let slice_index = match annotation.slice_index {
    Some(slice_index) => slice_index,
    None => {
      let extent = depth.saturating_sub(1) as f64;
      (annotation.position[2].clamp(0.0, 1.0) * extent).round() as usize
    }
  };

  study
    .sop_instance_uids
    .get(slice_index.min(depth.saturating_sub(1)))
    .cloned()
    .flatten()
}

/// Parses a structured report's content sequence back into annotations
/// against the currently loaded volume. A TEXT item attaches its text to the
/// most recently parsed geometric annotation, upgrading a marker to a label;
/// unrecognized value types are skipped. The parsed set is complete on
/// return, so the caller can swap it in atomically.
///
pub fn import_annotations(
  report: &StructuredReport,
  volume: Option<&Volume>,
) -> Result<Vec<Annotation>, SrError> {
  let volume = volume.ok_or(SrError::NoVolumeLoaded)?;
  let geometry = GeometryMap::from_volume(volume);

  let mut annotations: Vec<Annotation> = vec![];

  let to_normalized = |point: &[f64]| -> Result<[f64; 3], SrError> {
    let normalized = geometry
      .patient_to_normalized([point[0], point[1], point[2]])
      .map_err(|_| SrError::NoVolumeLoaded)?;

    Ok([
      normalized[0].clamp(0.0, 1.0),
      normalized[1].clamp(0.0, 1.0),
      normalized[2].clamp(0.0, 1.0),
    ])
  };

  for item in &report.content {
    match item {
      ContentItem::Scoord3d {
        graphic_type: GraphicType::Point,
        graphic_data,
        ..
      } => {
        if graphic_data.len() < 3 {
          return Err(SrError::MalformedReport {
            details: format!(
              "POINT item has {} coordinates but 3 are required",
              graphic_data.len()
            ),
          });
        }

        let id = format!("sr-{}", annotations.len() + 1);
        annotations.push(Annotation::marker(id, to_normalized(graphic_data)?));
      }

      ContentItem::Scoord3d {
        graphic_type: GraphicType::Polyline,
        graphic_data,
        ..
      } => {
        if graphic_data.len() < 6 {
          return Err(SrError::MalformedReport {
            details: format!(
              "POLYLINE item has {} coordinates but 6 are required",
              graphic_data.len()
            ),
          });
        }

        let id = format!("sr-{}", annotations.len() + 1);
        annotations.push(Annotation::arrow(
          id,
          to_normalized(&graphic_data[0..3])?,
          to_normalized(&graphic_data[3..6])?,
        ));
      }

      ContentItem::Text { text, .. } => match annotations.last_mut() {
        Some(annotation) => {
          annotation.label_text = Some(text.clone());

          if annotation.kind == AnnotationKind::Marker {
            annotation.kind = AnnotationKind::Label;
          }
        }
        None => {
          log::warn!("Ignoring TEXT item with no preceding geometric item");
        }
      },

      ContentItem::Other => (),
    }
  }

  if annotations.is_empty() {
    return Err(SrError::NoAnnotationsFound);
  }

  Ok(annotations)
}

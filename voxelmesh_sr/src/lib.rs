//! Annotations over a reconstructed volume and the codecs that carry them
//! across process boundaries: a DICOM Comprehensive 3D SR document model and
//! a simpler lossless JSON surface. Both round-trip through the same
//! [`voxelmesh_volume::GeometryMap`] so positions survive export and import.

mod annotation;
mod json;
mod report;
mod sr_error;
mod uids;

pub use annotation::{Annotation, AnnotationKind};
pub use json::{
  export_json, import_json, AnnotationDocument, AnnotationRecord,
  StudySection, VolumeSection,
};
pub use report::{
  export_report, import_annotations, ContentItem, GraphicType,
  StructuredReport,
};
pub use sr_error::SrError;
pub use uids::{generate_sop_instance_uid, COMPREHENSIVE_3D_SR_SOP_CLASS_UID};

//! The annotation data model: a flat list of records with stable string ids.
//! Links between annotations are expressed as id references and resolved by
//! lookup, mirroring the export formats and ruling out reference cycles.

/// The kind of an annotation.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationKind {
  /// A single point of interest.
  Marker,

  /// A directed line from `position` to `arrow_to`.
  Arrow,

  /// A point of interest with attached text.
  Label,
}

/// One annotation in normalized volume coordinates ([0,1]³, independent of
/// voxel count). Arrows carry an endpoint in the same space; labels carry
/// non-empty text.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
  pub id: String,
  pub kind: AnnotationKind,
  pub position: [f64; 3],
  pub arrow_to: Option<[f64; 3]>,
  pub slice_index: Option<usize>,
  pub label_text: Option<String>,

  /// Id of a marker this annotation refers to, resolved by lookup.
  pub linked_to: Option<String>,

  /// ISO-8601 creation timestamp, preserved verbatim through round trips.
  pub created_at: Option<String>,
}

impl Annotation {
  /// Creates a marker annotation.
  ///
  pub fn marker(id: impl Into<String>, position: [f64; 3]) -> Self {
    Self {
      id: id.into(),
      kind: AnnotationKind::Marker,
      position,
      arrow_to: None,
      slice_index: None,
      label_text: None,
      linked_to: None,
      created_at: None,
    }
  }

  /// Creates an arrow annotation from `position` to `arrow_to`.
  ///
  pub fn arrow(
    id: impl Into<String>,
    position: [f64; 3],
    arrow_to: [f64; 3],
  ) -> Self {
    Self {
      id: id.into(),
      kind: AnnotationKind::Arrow,
      position,
      arrow_to: Some(arrow_to),
      slice_index: None,
      label_text: None,
      linked_to: None,
      created_at: None,
    }
  }

  /// Creates a label annotation with the given text.
  ///
  pub fn label(
    id: impl Into<String>,
    position: [f64; 3],
    text: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      kind: AnnotationKind::Label,
      position,
      arrow_to: None,
      slice_index: None,
      label_text: Some(text.into()),
      linked_to: None,
      created_at: None,
    }
  }

  /// Checks the kind-specific invariants: an arrow has an endpoint, a label
  /// has non-empty text, and a slice index lies within the given depth.
  ///
  pub fn is_valid(&self, depth: usize) -> bool {
    let kind_valid = match self.kind {
      AnnotationKind::Marker => true,
      AnnotationKind::Arrow => self.arrow_to.is_some(),
      AnnotationKind::Label => {
        self.label_text.as_ref().is_some_and(|text| !text.is_empty())
      }
    };

    let slice_valid = match self.slice_index {
      Some(slice_index) => slice_index < depth,
      None => true,
    };

    kind_valid && slice_valid
  }

  /// Resolves this annotation's `linked_to` reference against a flat list.
  ///
  pub fn resolve_link<'a>(
    &self,
    annotations: &'a [Annotation],
  ) -> Option<&'a Annotation> {
    let linked_to = self.linked_to.as_ref()?;

    annotations
      .iter()
      .find(|annotation| &annotation.id == linked_to)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_valid_test() {
    assert!(Annotation::marker("m1", [0.5, 0.5, 0.5]).is_valid(16));

    assert!(
      Annotation::arrow("a1", [0.1, 0.1, 0.5], [0.4, 0.2, 0.5]).is_valid(16)
    );

    let mut arrow_without_endpoint = Annotation::marker("a2", [0.0; 3]);
    arrow_without_endpoint.kind = AnnotationKind::Arrow;
    assert!(!arrow_without_endpoint.is_valid(16));

    assert!(Annotation::label("l1", [0.0; 3], "lesion").is_valid(16));
    assert!(!Annotation::label("l2", [0.0; 3], "").is_valid(16));

    let mut out_of_range = Annotation::marker("m2", [0.0; 3]);
    out_of_range.slice_index = Some(16);
    assert!(!out_of_range.is_valid(16));
    out_of_range.slice_index = Some(15);
    assert!(out_of_range.is_valid(16));
  }

  #[test]
  fn resolve_link_test() {
    let marker = Annotation::marker("m1", [0.5, 0.5, 0.5]);

    let mut arrow = Annotation::arrow("a1", [0.1; 3], [0.2; 3]);
    arrow.linked_to = Some("m1".to_string());

    let annotations = vec![marker, arrow];

    assert_eq!(
      annotations[1].resolve_link(&annotations).map(|a| a.id.as_str()),
      Some("m1")
    );

    assert!(annotations[0].resolve_link(&annotations).is_none());
  }
}

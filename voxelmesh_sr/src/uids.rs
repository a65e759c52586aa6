//! UID constants and generation for structured report envelopes.

use rand::Rng;

/// The SOP class UID of the Comprehensive 3D SR storage class.
///
pub const COMPREHENSIVE_3D_SR_SOP_CLASS_UID: &str =
  "1.2.840.10008.5.1.4.1.1.88.34";

/// Generates a SOP instance UID under the UUID-derived `2.25` root defined
/// by the DICOM standard.
///
pub fn generate_sop_instance_uid() -> String {
  let value: u128 = rand::thread_rng().gen();

  format!("2.25.{}", value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generate_sop_instance_uid_test() {
    let uid = generate_sop_instance_uid();

    assert!(uid.starts_with("2.25."));
    assert!(uid.len() <= 64);
    assert_ne!(uid, generate_sop_instance_uid());
  }
}

//! Enrollment of a student in one module of one academic offer.
//!
//! # Responsibility
//! - Hold the submitted documents and their staff verification flags.
//! - Expose the flag set to the verification reconciler.
//!
//! # Invariants
//! - `status` always equals `derive_status` over the three flags.
//! - `*_audit_id` fields are derived and only written by the reconciler.
//! - A new enrollment starts with every flag false and `NotReviewed`.

use crate::model::audit::AuditEntryId;
use crate::model::entity::RecordId;
use crate::model::validation::{require_range, ValidationResult};
use crate::model::verification::{FlagSpec, VerificationStatus, VerificationView};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verification flags of an enrollment, in reconciliation order.
pub const ENROLLMENT_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("payment_receipt_verified", "payment_receipt_audit_id"),
    FlagSpec::new("certificate_verified", "certificate_audit_id"),
    FlagSpec::new("id_document_verified", "id_document_audit_id"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: RecordId,
    pub student_id: RecordId,
    pub module_id: RecordId,
    pub offer_id: RecordId,
    /// Epoch milliseconds.
    pub enrolled_at: i64,
    pub payment_receipt_file: Option<String>,
    /// School enrollment certificate.
    pub certificate_file: Option<String>,
    pub payment_receipt_verified: bool,
    pub certificate_verified: bool,
    pub id_document_verified: bool,
    pub status: VerificationStatus,
    pub payment_receipt_audit_id: Option<AuditEntryId>,
    pub certificate_audit_id: Option<AuditEntryId>,
    pub id_document_audit_id: Option<AuditEntryId>,
}

impl Enrollment {
    pub fn new(
        student_id: RecordId,
        module_id: RecordId,
        offer_id: RecordId,
        enrolled_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            module_id,
            offer_id,
            enrolled_at,
            payment_receipt_file: None,
            certificate_file: None,
            payment_receipt_verified: false,
            certificate_verified: false,
            id_document_verified: false,
            status: VerificationStatus::NotReviewed,
            payment_receipt_audit_id: None,
            certificate_audit_id: None,
            id_document_audit_id: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_range("enrolled_at", self.enrolled_at, 0, i64::MAX)
    }

    pub fn verification(&self) -> VerificationView {
        VerificationView {
            flags: ENROLLMENT_FLAGS,
            values: vec![
                self.payment_receipt_verified,
                self.certificate_verified,
                self.id_document_verified,
            ],
            audit_refs: vec![
                self.payment_receipt_audit_id,
                self.certificate_audit_id,
                self.id_document_audit_id,
            ],
            status: self.status,
        }
    }

    /// Puts the record back into its creation state.
    pub fn reset_verification(&mut self) {
        self.payment_receipt_verified = false;
        self.certificate_verified = false;
        self.id_document_verified = false;
        self.status = VerificationStatus::NotReviewed;
        self.payment_receipt_audit_id = None;
        self.certificate_audit_id = None;
        self.id_document_audit_id = None;
    }

    /// Copies derived state from the stored row (full replacement updates).
    pub fn keep_derived_from(&mut self, stored: &Self) {
        self.status = stored.status;
        self.payment_receipt_audit_id = stored.payment_receipt_audit_id;
        self.certificate_audit_id = stored.certificate_audit_id;
        self.id_document_audit_id = stored.id_document_audit_id;
    }
}

/// Partial update accepted from staff and students.
///
/// Flags are the only verification input; status and audit references are
/// not part of the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrollmentPatch {
    pub module_id: Option<RecordId>,
    pub offer_id: Option<RecordId>,
    #[serde(deserialize_with = "double_option")]
    pub payment_receipt_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub certificate_file: Option<Option<String>>,
    pub payment_receipt_verified: Option<bool>,
    pub certificate_verified: Option<bool>,
    pub id_document_verified: Option<bool>,
}

impl Patch<Enrollment> for EnrollmentPatch {
    fn apply_to(&self, target: &mut Enrollment) {
        set_if(&mut target.module_id, &self.module_id);
        set_if(&mut target.offer_id, &self.offer_id);
        set_if(&mut target.payment_receipt_file, &self.payment_receipt_file);
        set_if(&mut target.certificate_file, &self.certificate_file);
        set_if(
            &mut target.payment_receipt_verified,
            &self.payment_receipt_verified,
        );
        set_if(&mut target.certificate_verified, &self.certificate_verified);
        set_if(&mut target.id_document_verified, &self.id_document_verified);
    }
}

#[cfg(test)]
mod tests {
    use super::{Enrollment, EnrollmentPatch, ENROLLMENT_FLAGS};
    use crate::model::verification::VerificationStatus;
    use crate::model::Patch;
    use uuid::Uuid;

    fn enrollment() -> Enrollment {
        Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1_700_000_000_000)
    }

    #[test]
    fn view_orders_values_like_flag_specs() {
        let mut record = enrollment();
        record.certificate_verified = true;
        let view = record.verification();
        assert_eq!(view.flags, ENROLLMENT_FLAGS);
        assert_eq!(view.values, vec![false, true, false]);
    }

    #[test]
    fn reset_clears_flags_status_and_refs() {
        let mut record = enrollment();
        record.payment_receipt_verified = true;
        record.status = VerificationStatus::Pending;
        record.payment_receipt_audit_id = Some(4);
        record.reset_verification();
        assert_eq!(record.verification().values, vec![false, false, false]);
        assert_eq!(record.status, VerificationStatus::NotReviewed);
        assert_eq!(record.payment_receipt_audit_id, None);
    }

    #[test]
    fn status_is_not_accepted_in_patch_payload() {
        let result: Result<EnrollmentPatch, _> =
            serde_json::from_str(r#"{"status":"reviewed"}"#);
        assert!(result.is_err());
        let result: Result<EnrollmentPatch, _> =
            serde_json::from_str(r#"{"certificate_audit_id":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_flips_only_named_flags() {
        let mut record = enrollment();
        let patch = EnrollmentPatch {
            id_document_verified: Some(true),
            ..EnrollmentPatch::default()
        };
        patch.apply_to(&mut record);
        assert_eq!(record.verification().values, vec![false, false, true]);
    }
}

mod common;

use common::{actor, enrollment_fixture, MemoryFileStore};
use semillero_core::auth::Role;
use semillero_core::model::audit::AuditAction;
use semillero_core::model::enrollment::{Enrollment, EnrollmentPatch};
use semillero_core::model::verification::VerificationStatus;
use semillero_core::repo::audit_repo::{AuditLog, SqliteAuditLog};
use semillero_core::{open_db_in_memory, EntityType, ResourceController, ServiceError};
use serde_json::json;

#[test]
fn create_starts_unreviewed_even_when_payload_claims_otherwise() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let base = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    // Free the student/module/offer triple for the forged copy.
    controller.destroy(&admin, base.id).unwrap();

    let mut forged = Enrollment::new(base.student_id, base.module_id, base.offer_id, 1);
    forged.payment_receipt_verified = true;
    forged.status = VerificationStatus::Reviewed;
    forged.certificate_audit_id = Some(1);
    let created = controller.create(&admin, forged).unwrap();

    assert_eq!(created.status, VerificationStatus::NotReviewed);
    assert_eq!(created.verification().values, vec![false, false, false]);
    assert_eq!(created.certificate_audit_id, None);
    assert_eq!(created.payment_receipt_audit_id, None);
    assert_eq!(created.id_document_audit_id, None);

    let history = controller.history(&admin, created.id, None).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::Create);
    assert_eq!(history[0].actor_id, Some(admin.user_id));
}

#[test]
fn first_verified_document_moves_enrollment_to_pending() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let patch = EnrollmentPatch {
        payment_receipt_verified: Some(true),
        ..EnrollmentPatch::default()
    };
    let updated = controller
        .partial_update(&admin, enrollment.id, &patch)
        .unwrap();

    let latest = SqliteAuditLog::try_new(&conn)
        .unwrap()
        .latest_entry(EntityType::Enrollment, enrollment.id)
        .unwrap()
        .unwrap();
    assert_eq!(latest.action, AuditAction::Update);
    assert!(latest.touches("payment_receipt_verified"));
    assert_eq!(latest.actor_id, Some(admin.user_id));

    assert_eq!(updated.status, VerificationStatus::Pending);
    assert_eq!(updated.payment_receipt_audit_id, Some(latest.id));
    assert_eq!(updated.certificate_audit_id, None);
    assert_eq!(updated.id_document_audit_id, None);
}

#[test]
fn completing_every_document_marks_enrollment_reviewed() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let staff = actor(&conn, Role::AdministrativeMonitor);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let first = controller
        .partial_update_json(
            &staff,
            enrollment.id,
            json!({"payment_receipt_verified": true, "certificate_verified": true}),
        )
        .unwrap();
    assert_eq!(first.status, VerificationStatus::Pending);
    let first_ref = first.payment_receipt_audit_id;
    assert!(first_ref.is_some());
    assert_eq!(first.certificate_audit_id, first_ref);

    let second = controller
        .partial_update_json(&staff, enrollment.id, json!({"id_document_verified": true}))
        .unwrap();

    assert_eq!(second.status, VerificationStatus::Reviewed);
    assert_eq!(second.payment_receipt_audit_id, first_ref);
    assert_eq!(second.certificate_audit_id, first_ref);
    assert!(second.id_document_audit_id > first_ref);
}

#[test]
fn revoking_a_verified_document_points_to_the_revoking_entry() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let reviewed = controller
        .partial_update_json(
            &admin,
            enrollment.id,
            json!({
                "payment_receipt_verified": true,
                "certificate_verified": true,
                "id_document_verified": true
            }),
        )
        .unwrap();
    assert_eq!(reviewed.status, VerificationStatus::Reviewed);

    let revoked = controller
        .partial_update_json(&admin, enrollment.id, json!({"payment_receipt_verified": false}))
        .unwrap();

    assert_eq!(revoked.status, VerificationStatus::Pending);
    assert!(revoked.payment_receipt_audit_id > reviewed.payment_receipt_audit_id);
    assert_eq!(revoked.certificate_audit_id, reviewed.certificate_audit_id);
    assert_eq!(revoked.id_document_audit_id, reviewed.id_document_audit_id);
}

#[test]
fn saves_without_flag_changes_leave_verification_untouched() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let pending = controller
        .partial_update_json(&admin, enrollment.id, json!({"certificate_verified": true}))
        .unwrap();

    let certificate = format!("enrollment/{}/certificate_file_1.pdf", enrollment.id);
    let moved = controller
        .partial_update_json(&admin, enrollment.id, json!({"certificate_file": certificate}))
        .unwrap();
    assert_eq!(moved.status, pending.status);
    assert_eq!(moved.certificate_audit_id, pending.certificate_audit_id);
    assert_eq!(moved.payment_receipt_audit_id, None);

    let history_before = controller.history(&admin, enrollment.id, None).unwrap().len();
    let unchanged = controller
        .partial_update(&admin, enrollment.id, &EnrollmentPatch::default())
        .unwrap();
    let history_after = controller.history(&admin, enrollment.id, None).unwrap().len();

    assert_eq!(unchanged, moved);
    assert_eq!(history_before, history_after);
}

#[test]
fn derived_fields_cannot_be_written_through_payloads() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    for payload in [
        json!({"status": "reviewed"}),
        json!({"payment_receipt_audit_id": 1}),
        json!({"unknown_field": true}),
    ] {
        let err = controller
            .partial_update_json(&admin, enrollment.id, payload)
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
    }

    let stored = controller.retrieve(&admin, enrollment.id).unwrap();
    assert_eq!(stored.status, VerificationStatus::NotReviewed);
    assert_eq!(controller.history(&admin, enrollment.id, None).unwrap().len(), 1);
}

#[test]
fn full_update_keeps_stored_derived_state() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let pending = controller
        .partial_update_json(&admin, enrollment.id, json!({"id_document_verified": true}))
        .unwrap();

    let mut replacement = pending.clone();
    replacement.status = VerificationStatus::Reviewed;
    replacement.id_document_audit_id = None;
    replacement.payment_receipt_audit_id = Some(9_999);
    replacement.certificate_verified = true;

    let updated = controller.update(&admin, replacement).unwrap();

    assert_eq!(updated.status, VerificationStatus::Pending);
    assert_eq!(updated.id_document_audit_id, pending.id_document_audit_id);
    assert_eq!(updated.payment_receipt_audit_id, None);
    assert!(updated.certificate_audit_id.is_some());
    assert!(updated.verification().is_consistent());
}

#[test]
fn roles_without_update_rights_cannot_verify_documents() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let professor = actor(&conn, Role::Professor);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let err = controller
        .partial_update_json(&professor, enrollment.id, json!({"certificate_verified": true}))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let stored = controller.retrieve(&admin, enrollment.id).unwrap();
    assert!(!stored.certificate_verified);
    assert_eq!(controller.history(&admin, enrollment.id, None).unwrap().len(), 1);
}

#[test]
fn invalid_record_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let controller = ResourceController::<Enrollment, _>::new(&conn, &files).unwrap();

    let mut broken = enrollment.clone();
    broken.enrolled_at = -5;
    broken.payment_receipt_verified = true;
    let err = controller.update(&admin, broken).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref inner) if inner.field() == "enrolled_at"));

    let stored = controller.retrieve(&admin, enrollment.id).unwrap();
    assert_eq!(stored, enrollment);
}

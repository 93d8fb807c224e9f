mod common;

use common::{actor, enrollment_fixture, module, offer, student, MemoryFileStore};
use semillero_core::auth::Role;
use semillero_core::model::attendance::Attendance;
use semillero_core::model::guardian::Guardian;
use semillero_core::model::module::{Module, ModulePatch};
use semillero_core::model::payment::{Payment, PaymentMethod};
use semillero_core::model::student::Student;
use semillero_core::repo::record_repo::LIST_LIMIT_MAX;
use semillero_core::{
    open_db_in_memory, AuditAction, EntityType, ListQuery, RepoError, ResourceController,
    ServiceError,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn create_retrieve_and_list_modules() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let controller = ResourceController::<Module, _>::new(&conn, &files).unwrap();

    let created = controller.create(&admin, module("Geometría")).unwrap();
    controller.create(&admin, module("Física")).unwrap();

    assert_eq!(controller.retrieve(&admin, created.id).unwrap(), created);
    assert_eq!(controller.list(&admin, &ListQuery::default()).unwrap().len(), 2);
}

#[test]
fn validation_errors_name_the_rejected_field() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let controller = ResourceController::<Student, _>::new(&conn, &files).unwrap();

    let mut bad_grade = student("1002003004");
    bad_grade.grade = 3;
    let err = controller.create(&admin, bad_grade).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref inner) if inner.field() == "grade"));

    let mut bad_email = student("1002003005");
    bad_email.email = "not-an-email".to_string();
    let err = controller.create(&admin, bad_email).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref inner) if inner.field() == "email"));

    assert!(controller
        .list(&admin, &ListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn partial_update_writes_only_changed_columns() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let controller = ResourceController::<Module, _>::new(&conn, &files).unwrap();
    let created = controller.create(&admin, module("Química")).unwrap();

    let patch = ModulePatch {
        capacity: Some(45),
        name: Some("Química".to_string()),
        ..ModulePatch::default()
    };
    let updated = controller.partial_update(&admin, created.id, &patch).unwrap();
    assert_eq!(updated.capacity, 45);

    let history = controller.history(&admin, created.id, None).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, AuditAction::Update);
    assert_eq!(history[0].changes.len(), 1);
    assert_eq!(history[0].changes[0].field, "capacity");
    assert_eq!(history[0].changes[0].old, json!(30));
    assert_eq!(history[0].changes[0].new, json!(45));
}

#[test]
fn list_paginates_and_caps_limit() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let controller = ResourceController::<Module, _>::new(&conn, &files).unwrap();
    for index in 0..5 {
        controller
            .create(&admin, module(&format!("Módulo {index}")))
            .unwrap();
    }

    let first_page = controller
        .list(
            &admin,
            &ListQuery {
                limit: Some(2),
                ..ListQuery::default()
            },
        )
        .unwrap();
    let second_page = controller
        .list(
            &admin,
            &ListQuery {
                limit: Some(2),
                offset: 2,
                ..ListQuery::default()
            },
        )
        .unwrap();
    let everything = controller
        .list(
            &admin,
            &ListQuery {
                limit: Some(LIST_LIMIT_MAX + 1_000),
                ..ListQuery::default()
            },
        )
        .unwrap();

    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 2);
    assert!(first_page.iter().all(|item| !second_page.contains(item)));
    assert_eq!(everything.len(), 5);
}

#[test]
fn child_lists_filter_by_parent() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let students = ResourceController::<Student, _>::new(&conn, &files).unwrap();
    let other = students.create(&admin, student("55667788")).unwrap();

    let guardians = ResourceController::<Guardian, _>::new(&conn, &files).unwrap();
    for (student_id, name) in [
        (enrollment.student_id, "María Pérez"),
        (enrollment.student_id, "Jorge Pérez"),
        (other.id, "Rosa Díaz"),
    ] {
        let mut guardian = Guardian::new(student_id, name);
        guardian.relationship = "madre".to_string();
        guardian.document_number = "43123456".to_string();
        guardian.email = "familia@example.org".to_string();
        guardian.phone = "3005556677".to_string();
        guardians.create(&admin, guardian).unwrap();
    }

    let filtered = guardians
        .list(
            &admin,
            &ListQuery {
                parent_id: Some(enrollment.student_id),
                ..ListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered
        .iter()
        .all(|guardian| guardian.student_id == enrollment.student_id));
}

#[test]
fn attendance_and_payments_hang_off_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let professor = actor(&conn, Role::Professor);
    let enrollment = enrollment_fixture(&conn, &files, &admin);

    let attendance = ResourceController::<Attendance, _>::new(&conn, &files).unwrap();
    let present = attendance
        .create(&professor, Attendance::new(enrollment.id, "2024-02-05", true))
        .unwrap();
    assert!(present.present);
    let duplicate = attendance
        .create(&professor, Attendance::new(enrollment.id, "2024-02-05", false))
        .unwrap_err();
    assert!(matches!(duplicate, ServiceError::Repo(RepoError::Constraint(_))));

    let payments = ResourceController::<Payment, _>::new(&conn, &files).unwrap();
    let mut payment = Payment::new(enrollment.id, 150_000_00, PaymentMethod::Transfer);
    payment.paid_on = "2024-02-02".to_string();
    assert!(matches!(
        payments.create(&professor, payment.clone()),
        Err(ServiceError::Forbidden(_))
    ));
    let stored = payments.create(&admin, payment).unwrap();
    assert_eq!(stored.method, PaymentMethod::Transfer);
}

#[test]
fn permission_denial_happens_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let student_actor = actor(&conn, Role::Student);
    let controller = ResourceController::<Student, _>::new(&conn, &files).unwrap();

    let err = controller.retrieve(&student_actor, Uuid::new_v4()).unwrap_err();
    match err {
        ServiceError::Forbidden(denied) => {
            assert_eq!(denied.entity, EntityType::Student);
            assert_eq!(denied.role, Role::Student);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn students_browse_catalog_but_not_rosters() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let student_actor = actor(&conn, Role::Student);
    ResourceController::<Module, _>::new(&conn, &files)
        .unwrap()
        .create(&admin, module("Biología"))
        .unwrap();

    let modules = ResourceController::<Module, _>::new(&conn, &files).unwrap();
    assert_eq!(modules.list(&student_actor, &ListQuery::default()).unwrap().len(), 1);

    let students = ResourceController::<Student, _>::new(&conn, &files).unwrap();
    assert!(matches!(
        students.list(&student_actor, &ListQuery::default()),
        Err(ServiceError::Forbidden(_))
    ));
}

#[test]
fn missing_records_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let controller = ResourceController::<Module, _>::new(&conn, &files).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        controller.retrieve(&admin, missing),
        Err(ServiceError::NotFound(target)) if target.id == missing
    ));
    assert!(matches!(
        controller.partial_update(&admin, missing, &ModulePatch::default()),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        controller.destroy(&admin, missing),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn referenced_modules_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let admin = actor(&conn, Role::Admin);
    let enrollment = enrollment_fixture(&conn, &files, &admin);
    let modules = ResourceController::<Module, _>::new(&conn, &files).unwrap();

    let err = modules.destroy(&admin, enrollment.module_id).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Constraint(_))));
    assert!(modules.retrieve(&admin, enrollment.module_id).is_ok());

    let offers = ResourceController::<semillero_core::model::academic_offer::AcademicOffer, _>::new(
        &conn, &files,
    )
    .unwrap();
    let second = offers.create(&admin, offer()).unwrap();
    offers.destroy(&admin, second.id).unwrap();
}

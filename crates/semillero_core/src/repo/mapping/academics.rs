use super::{
    files, flag, int, opt_int, opt_text, read_flag, read_small, read_status, read_uuid, status,
    text, uuid_value,
};
use crate::model::academic_offer::{AcademicOffer, AcademicOfferPatch};
use crate::model::attendance::{Attendance, AttendancePatch};
use crate::model::diagnostic_test::{DiagnosticTest, DiagnosticTestPatch};
use crate::model::enrollment::{Enrollment, EnrollmentPatch};
use crate::model::entity::{EntityType, RecordId};
use crate::model::module::{Module, ModulePatch};
use crate::model::payment::{Payment, PaymentMethod, PaymentPatch};
use crate::model::validation::ValidationError;
use crate::model::verification::VerificationView;
use crate::repo::record_repo::Record;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;

impl Record for Module {
    const ENTITY: EntityType = EntityType::Module;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "area",
        "min_grade",
        "max_grade",
        "capacity",
    ];

    type Patch = ModulePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Module::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.description),
            text(&self.area),
            int(self.min_grade),
            int(self.max_grade),
            int(self.capacity),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            area: row.get("area")?,
            min_grade: read_small(row, "min_grade")?,
            max_grade: read_small(row, "max_grade")?,
            capacity: read_small(row, "capacity")?,
        })
    }
}

impl Record for AcademicOffer {
    const ENTITY: EntityType = EntityType::AcademicOffer;
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "year",
        "semester",
        "start_date",
        "end_date",
        "is_active",
    ];

    type Patch = AcademicOfferPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        AcademicOffer::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            int(self.year),
            int(self.semester),
            text(&self.start_date),
            text(&self.end_date),
            flag(self.is_active),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            name: row.get("name")?,
            year: read_small(row, "year")?,
            semester: read_small(row, "semester")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            is_active: read_flag(row, "is_active")?,
        })
    }
}

impl Record for Enrollment {
    const ENTITY: EntityType = EntityType::Enrollment;
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "module_id",
        "offer_id",
        "enrolled_at",
        "payment_receipt_file",
        "certificate_file",
        "payment_receipt_verified",
        "certificate_verified",
        "id_document_verified",
        "status",
        "payment_receipt_audit_id",
        "certificate_audit_id",
        "id_document_audit_id",
    ];
    const PARENT_COLUMN: Option<&'static str> = Some("student_id");

    type Patch = EnrollmentPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Enrollment::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            uuid_value(self.student_id),
            uuid_value(self.module_id),
            uuid_value(self.offer_id),
            int(self.enrolled_at),
            opt_text(self.payment_receipt_file.as_deref()),
            opt_text(self.certificate_file.as_deref()),
            flag(self.payment_receipt_verified),
            flag(self.certificate_verified),
            flag(self.id_document_verified),
            status(self.status),
            opt_int(self.payment_receipt_audit_id),
            opt_int(self.certificate_audit_id),
            opt_int(self.id_document_audit_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            student_id: read_uuid(row, "student_id")?,
            module_id: read_uuid(row, "module_id")?,
            offer_id: read_uuid(row, "offer_id")?,
            enrolled_at: row.get("enrolled_at")?,
            payment_receipt_file: row.get("payment_receipt_file")?,
            certificate_file: row.get("certificate_file")?,
            payment_receipt_verified: read_flag(row, "payment_receipt_verified")?,
            certificate_verified: read_flag(row, "certificate_verified")?,
            id_document_verified: read_flag(row, "id_document_verified")?,
            status: read_status(row)?,
            payment_receipt_audit_id: row.get("payment_receipt_audit_id")?,
            certificate_audit_id: row.get("certificate_audit_id")?,
            id_document_audit_id: row.get("id_document_audit_id")?,
        })
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.payment_receipt_file, &self.certificate_file])
    }

    fn verification(&self) -> Option<VerificationView> {
        Some(Enrollment::verification(self))
    }

    fn reset_derived(&mut self) {
        self.reset_verification();
    }

    fn keep_derived_from(&mut self, stored: &Self) {
        Enrollment::keep_derived_from(self, stored);
    }
}

impl Record for DiagnosticTest {
    const ENTITY: EntityType = EntityType::DiagnosticTest;
    const COLUMNS: &'static [&'static str] =
        &["student_id", "module_id", "score", "taken_on", "answers_file"];
    const PARENT_COLUMN: Option<&'static str> = Some("student_id");

    type Patch = DiagnosticTestPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        DiagnosticTest::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            uuid_value(self.student_id),
            uuid_value(self.module_id),
            int(self.score),
            text(&self.taken_on),
            opt_text(self.answers_file.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            student_id: read_uuid(row, "student_id")?,
            module_id: read_uuid(row, "module_id")?,
            score: read_small(row, "score")?,
            taken_on: row.get("taken_on")?,
            answers_file: row.get("answers_file")?,
        })
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.answers_file])
    }
}

impl Record for Attendance {
    const ENTITY: EntityType = EntityType::Attendance;
    const COLUMNS: &'static [&'static str] =
        &["enrollment_id", "session_date", "present", "notes"];
    const PARENT_COLUMN: Option<&'static str> = Some("enrollment_id");

    type Patch = AttendancePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Attendance::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            uuid_value(self.enrollment_id),
            text(&self.session_date),
            flag(self.present),
            text(&self.notes),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            enrollment_id: read_uuid(row, "enrollment_id")?,
            session_date: row.get("session_date")?,
            present: read_flag(row, "present")?,
            notes: row.get("notes")?,
        })
    }
}

impl Record for Payment {
    const ENTITY: EntityType = EntityType::Payment;
    const COLUMNS: &'static [&'static str] = &[
        "enrollment_id",
        "amount_cents",
        "paid_on",
        "method",
        "receipt_file",
    ];
    const PARENT_COLUMN: Option<&'static str> = Some("enrollment_id");

    type Patch = PaymentPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Payment::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            uuid_value(self.enrollment_id),
            int(self.amount_cents),
            text(&self.paid_on),
            text(self.method.as_str()),
            opt_text(self.receipt_file.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let method_text: String = row.get("method")?;
        let method = PaymentMethod::parse(&method_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid payment method `{method_text}` in payments.method"))
        })?;

        Ok(Self {
            id: read_uuid(row, "id")?,
            enrollment_id: read_uuid(row, "enrollment_id")?,
            amount_cents: row.get("amount_cents")?,
            paid_on: row.get("paid_on")?,
            method,
            receipt_file: row.get("receipt_file")?,
        })
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.receipt_file])
    }
}

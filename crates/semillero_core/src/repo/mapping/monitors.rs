use super::{
    files, flag, opt_int, opt_text, opt_uuid, read_flag, read_opt_uuid, read_status, read_uuid,
    status, text,
};
use crate::auth::Role;
use crate::model::entity::{EntityType, RecordId, UserId};
use crate::model::monitor::{
    AcademicMonitor, AcademicMonitorPatch, AdministrativeMonitor, AdministrativeMonitorPatch,
};
use crate::model::validation::ValidationError;
use crate::model::verification::VerificationView;
use crate::repo::record_repo::Record;
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

impl Record for AcademicMonitor {
    const ENTITY: EntityType = EntityType::AcademicMonitor;
    const PRINCIPAL_ROLE: Option<Role> = Some(Role::AcademicMonitor);
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "first_name",
        "last_name",
        "document_number",
        "email",
        "phone",
        "module_id",
        "id_document_file",
        "rut_file",
        "certificate_file",
        "id_document_verified",
        "rut_verified",
        "certificate_verified",
        "status",
        "id_document_audit_id",
        "rut_audit_id",
        "certificate_audit_id",
    ];

    type Patch = AcademicMonitorPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        AcademicMonitor::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            opt_uuid(self.user_id),
            text(&self.first_name),
            text(&self.last_name),
            text(&self.document_number),
            text(&self.email),
            text(&self.phone),
            opt_uuid(self.module_id),
            opt_text(self.id_document_file.as_deref()),
            opt_text(self.rut_file.as_deref()),
            opt_text(self.certificate_file.as_deref()),
            flag(self.id_document_verified),
            flag(self.rut_verified),
            flag(self.certificate_verified),
            status(self.status),
            opt_int(self.id_document_audit_id),
            opt_int(self.rut_audit_id),
            opt_int(self.certificate_audit_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            user_id: read_opt_uuid(row, "user_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            document_number: row.get("document_number")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            module_id: read_opt_uuid(row, "module_id")?,
            id_document_file: row.get("id_document_file")?,
            rut_file: row.get("rut_file")?,
            certificate_file: row.get("certificate_file")?,
            id_document_verified: read_flag(row, "id_document_verified")?,
            rut_verified: read_flag(row, "rut_verified")?,
            certificate_verified: read_flag(row, "certificate_verified")?,
            status: read_status(row)?,
            id_document_audit_id: row.get("id_document_audit_id")?,
            rut_audit_id: row.get("rut_audit_id")?,
            certificate_audit_id: row.get("certificate_audit_id")?,
        })
    }

    fn principal(&self) -> Option<UserId> {
        self.user_id
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.id_document_file, &self.rut_file, &self.certificate_file])
    }

    fn verification(&self) -> Option<VerificationView> {
        Some(AcademicMonitor::verification(self))
    }

    fn reset_derived(&mut self) {
        self.reset_verification();
    }

    fn keep_derived_from(&mut self, stored: &Self) {
        AcademicMonitor::keep_derived_from(self, stored);
    }
}

impl Record for AdministrativeMonitor {
    const ENTITY: EntityType = EntityType::AdministrativeMonitor;
    const PRINCIPAL_ROLE: Option<Role> = Some(Role::AdministrativeMonitor);
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "first_name",
        "last_name",
        "document_number",
        "email",
        "phone",
        "id_document_file",
        "rut_file",
        "bank_certificate_file",
        "id_document_verified",
        "rut_verified",
        "bank_certificate_verified",
        "status",
        "id_document_audit_id",
        "rut_audit_id",
        "bank_certificate_audit_id",
    ];

    type Patch = AdministrativeMonitorPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        AdministrativeMonitor::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            opt_uuid(self.user_id),
            text(&self.first_name),
            text(&self.last_name),
            text(&self.document_number),
            text(&self.email),
            text(&self.phone),
            opt_text(self.id_document_file.as_deref()),
            opt_text(self.rut_file.as_deref()),
            opt_text(self.bank_certificate_file.as_deref()),
            flag(self.id_document_verified),
            flag(self.rut_verified),
            flag(self.bank_certificate_verified),
            status(self.status),
            opt_int(self.id_document_audit_id),
            opt_int(self.rut_audit_id),
            opt_int(self.bank_certificate_audit_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            user_id: read_opt_uuid(row, "user_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            document_number: row.get("document_number")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            id_document_file: row.get("id_document_file")?,
            rut_file: row.get("rut_file")?,
            bank_certificate_file: row.get("bank_certificate_file")?,
            id_document_verified: read_flag(row, "id_document_verified")?,
            rut_verified: read_flag(row, "rut_verified")?,
            bank_certificate_verified: read_flag(row, "bank_certificate_verified")?,
            status: read_status(row)?,
            id_document_audit_id: row.get("id_document_audit_id")?,
            rut_audit_id: row.get("rut_audit_id")?,
            bank_certificate_audit_id: row.get("bank_certificate_audit_id")?,
        })
    }

    fn principal(&self) -> Option<UserId> {
        self.user_id
    }

    fn stored_files(&self) -> Vec<String> {
        files([
            &self.id_document_file,
            &self.rut_file,
            &self.bank_certificate_file,
        ])
    }

    fn verification(&self) -> Option<VerificationView> {
        Some(AdministrativeMonitor::verification(self))
    }

    fn reset_derived(&mut self) {
        self.reset_verification();
    }

    fn keep_derived_from(&mut self, stored: &Self) {
        AdministrativeMonitor::keep_derived_from(self, stored);
    }
}

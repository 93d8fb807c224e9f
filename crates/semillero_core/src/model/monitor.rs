//! Monitor profiles (academic and administrative staff assistants).
//!
//! Both profiles carry document verification flags reconciled exactly like
//! enrollments; only the flag sets differ.

use crate::model::audit::AuditEntryId;
use crate::model::entity::{RecordId, UserId};
use crate::model::validation::{
    require_document_number, require_email, require_phone, require_text, ValidationResult,
};
use crate::model::verification::{FlagSpec, VerificationStatus, VerificationView};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACADEMIC_MONITOR_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("id_document_verified", "id_document_audit_id"),
    FlagSpec::new("rut_verified", "rut_audit_id"),
    FlagSpec::new("certificate_verified", "certificate_audit_id"),
];

pub const ADMINISTRATIVE_MONITOR_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("id_document_verified", "id_document_audit_id"),
    FlagSpec::new("rut_verified", "rut_audit_id"),
    FlagSpec::new("bank_certificate_verified", "bank_certificate_audit_id"),
];

/// Student-facing tutor assigned to a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicMonitor {
    pub id: RecordId,
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
    pub module_id: Option<RecordId>,
    pub id_document_file: Option<String>,
    /// Colombian tax registry (RUT) document.
    pub rut_file: Option<String>,
    /// University enrollment certificate.
    pub certificate_file: Option<String>,
    pub id_document_verified: bool,
    pub rut_verified: bool,
    pub certificate_verified: bool,
    pub status: VerificationStatus,
    pub id_document_audit_id: Option<AuditEntryId>,
    pub rut_audit_id: Option<AuditEntryId>,
    pub certificate_audit_id: Option<AuditEntryId>,
}

impl AcademicMonitor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        document_number: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            document_number: document_number.into(),
            email: String::new(),
            phone: String::new(),
            module_id: None,
            id_document_file: None,
            rut_file: None,
            certificate_file: None,
            id_document_verified: false,
            rut_verified: false,
            certificate_verified: false,
            status: VerificationStatus::NotReviewed,
            id_document_audit_id: None,
            rut_audit_id: None,
            certificate_audit_id: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validate_contact(
            &self.first_name,
            &self.last_name,
            &self.document_number,
            &self.email,
            &self.phone,
        )
    }

    pub fn verification(&self) -> VerificationView {
        VerificationView {
            flags: ACADEMIC_MONITOR_FLAGS,
            values: vec![
                self.id_document_verified,
                self.rut_verified,
                self.certificate_verified,
            ],
            audit_refs: vec![
                self.id_document_audit_id,
                self.rut_audit_id,
                self.certificate_audit_id,
            ],
            status: self.status,
        }
    }

    pub fn reset_verification(&mut self) {
        self.id_document_verified = false;
        self.rut_verified = false;
        self.certificate_verified = false;
        self.status = VerificationStatus::NotReviewed;
        self.id_document_audit_id = None;
        self.rut_audit_id = None;
        self.certificate_audit_id = None;
    }

    pub fn keep_derived_from(&mut self, stored: &Self) {
        self.status = stored.status;
        self.id_document_audit_id = stored.id_document_audit_id;
        self.rut_audit_id = stored.rut_audit_id;
        self.certificate_audit_id = stored.certificate_audit_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcademicMonitorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub module_id: Option<Option<RecordId>>,
    #[serde(deserialize_with = "double_option")]
    pub id_document_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub rut_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub certificate_file: Option<Option<String>>,
    pub id_document_verified: Option<bool>,
    pub rut_verified: Option<bool>,
    pub certificate_verified: Option<bool>,
}

impl Patch<AcademicMonitor> for AcademicMonitorPatch {
    fn apply_to(&self, target: &mut AcademicMonitor) {
        set_if(&mut target.first_name, &self.first_name);
        set_if(&mut target.last_name, &self.last_name);
        set_if(&mut target.document_number, &self.document_number);
        set_if(&mut target.email, &self.email);
        set_if(&mut target.phone, &self.phone);
        set_if(&mut target.module_id, &self.module_id);
        set_if(&mut target.id_document_file, &self.id_document_file);
        set_if(&mut target.rut_file, &self.rut_file);
        set_if(&mut target.certificate_file, &self.certificate_file);
        set_if(&mut target.id_document_verified, &self.id_document_verified);
        set_if(&mut target.rut_verified, &self.rut_verified);
        set_if(&mut target.certificate_verified, &self.certificate_verified);
    }
}

/// Back-office assistant paid through bank transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeMonitor {
    pub id: RecordId,
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
    pub id_document_file: Option<String>,
    pub rut_file: Option<String>,
    pub bank_certificate_file: Option<String>,
    pub id_document_verified: bool,
    pub rut_verified: bool,
    pub bank_certificate_verified: bool,
    pub status: VerificationStatus,
    pub id_document_audit_id: Option<AuditEntryId>,
    pub rut_audit_id: Option<AuditEntryId>,
    pub bank_certificate_audit_id: Option<AuditEntryId>,
}

impl AdministrativeMonitor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        document_number: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            document_number: document_number.into(),
            email: String::new(),
            phone: String::new(),
            id_document_file: None,
            rut_file: None,
            bank_certificate_file: None,
            id_document_verified: false,
            rut_verified: false,
            bank_certificate_verified: false,
            status: VerificationStatus::NotReviewed,
            id_document_audit_id: None,
            rut_audit_id: None,
            bank_certificate_audit_id: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validate_contact(
            &self.first_name,
            &self.last_name,
            &self.document_number,
            &self.email,
            &self.phone,
        )
    }

    pub fn verification(&self) -> VerificationView {
        VerificationView {
            flags: ADMINISTRATIVE_MONITOR_FLAGS,
            values: vec![
                self.id_document_verified,
                self.rut_verified,
                self.bank_certificate_verified,
            ],
            audit_refs: vec![
                self.id_document_audit_id,
                self.rut_audit_id,
                self.bank_certificate_audit_id,
            ],
            status: self.status,
        }
    }

    pub fn reset_verification(&mut self) {
        self.id_document_verified = false;
        self.rut_verified = false;
        self.bank_certificate_verified = false;
        self.status = VerificationStatus::NotReviewed;
        self.id_document_audit_id = None;
        self.rut_audit_id = None;
        self.bank_certificate_audit_id = None;
    }

    pub fn keep_derived_from(&mut self, stored: &Self) {
        self.status = stored.status;
        self.id_document_audit_id = stored.id_document_audit_id;
        self.rut_audit_id = stored.rut_audit_id;
        self.bank_certificate_audit_id = stored.bank_certificate_audit_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdministrativeMonitorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub id_document_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub rut_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub bank_certificate_file: Option<Option<String>>,
    pub id_document_verified: Option<bool>,
    pub rut_verified: Option<bool>,
    pub bank_certificate_verified: Option<bool>,
}

impl Patch<AdministrativeMonitor> for AdministrativeMonitorPatch {
    fn apply_to(&self, target: &mut AdministrativeMonitor) {
        set_if(&mut target.first_name, &self.first_name);
        set_if(&mut target.last_name, &self.last_name);
        set_if(&mut target.document_number, &self.document_number);
        set_if(&mut target.email, &self.email);
        set_if(&mut target.phone, &self.phone);
        set_if(&mut target.id_document_file, &self.id_document_file);
        set_if(&mut target.rut_file, &self.rut_file);
        set_if(&mut target.bank_certificate_file, &self.bank_certificate_file);
        set_if(&mut target.id_document_verified, &self.id_document_verified);
        set_if(&mut target.rut_verified, &self.rut_verified);
        set_if(
            &mut target.bank_certificate_verified,
            &self.bank_certificate_verified,
        );
    }
}

fn validate_contact(
    first_name: &str,
    last_name: &str,
    document_number: &str,
    email: &str,
    phone: &str,
) -> ValidationResult {
    require_text("first_name", first_name)?;
    require_text("last_name", last_name)?;
    require_document_number("document_number", document_number)?;
    require_email("email", email)?;
    require_phone("phone", phone)
}

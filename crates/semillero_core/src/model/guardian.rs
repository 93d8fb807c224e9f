//! Guardian (acudiente) attached to one student.

use crate::model::entity::RecordId;
use crate::model::validation::{
    require_document_number, require_email, require_phone, require_text, ValidationResult,
};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: RecordId,
    pub student_id: RecordId,
    pub full_name: String,
    /// Free text, e.g. `madre`, `abuelo`.
    pub relationship: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
    pub id_document_file: Option<String>,
}

impl Guardian {
    pub fn new(student_id: RecordId, full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            full_name: full_name.into(),
            relationship: String::new(),
            document_number: String::new(),
            email: String::new(),
            phone: String::new(),
            id_document_file: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("full_name", &self.full_name)?;
        require_text("relationship", &self.relationship)?;
        require_document_number("document_number", &self.document_number)?;
        require_email("email", &self.email)?;
        require_phone("phone", &self.phone)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardianPatch {
    pub full_name: Option<String>,
    pub relationship: Option<String>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub id_document_file: Option<Option<String>>,
}

impl Patch<Guardian> for GuardianPatch {
    fn apply_to(&self, target: &mut Guardian) {
        set_if(&mut target.full_name, &self.full_name);
        set_if(&mut target.relationship, &self.relationship);
        set_if(&mut target.document_number, &self.document_number);
        set_if(&mut target.email, &self.email);
        set_if(&mut target.phone, &self.phone);
        set_if(&mut target.id_document_file, &self.id_document_file);
    }
}

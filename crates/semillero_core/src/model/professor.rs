//! Professor profile.

use crate::model::entity::{RecordId, UserId};
use crate::model::validation::{
    require_document_number, require_email, require_phone, require_text, ValidationResult,
};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: RecordId,
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub document_number: String,
    pub email: String,
    pub phone: String,
    /// Knowledge area taught, e.g. `matemáticas`.
    pub area: String,
    pub cv_file: Option<String>,
}

impl Professor {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            document_number: String::new(),
            email: String::new(),
            phone: String::new(),
            area: String::new(),
            cv_file: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_document_number("document_number", &self.document_number)?;
        require_email("email", &self.email)?;
        require_phone("phone", &self.phone)?;
        require_text("area", &self.area)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfessorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub area: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub cv_file: Option<Option<String>>,
}

impl Patch<Professor> for ProfessorPatch {
    fn apply_to(&self, target: &mut Professor) {
        set_if(&mut target.first_name, &self.first_name);
        set_if(&mut target.last_name, &self.last_name);
        set_if(&mut target.document_number, &self.document_number);
        set_if(&mut target.email, &self.email);
        set_if(&mut target.phone, &self.phone);
        set_if(&mut target.area, &self.area);
        set_if(&mut target.cv_file, &self.cv_file);
    }
}

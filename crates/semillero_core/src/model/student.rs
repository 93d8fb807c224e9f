//! Student record.

use crate::model::entity::{RecordId, UserId};
use crate::model::validation::{
    require_document_number, require_email, require_iso_date, require_phone, require_range,
    require_text, ValidationResult,
};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Accepted grades for program participants.
pub const MIN_GRADE: u8 = 6;
pub const MAX_GRADE: u8 = 11;

/// Colombian identity document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Tarjeta de identidad.
    Ti,
    /// Cédula de ciudadanía.
    Cc,
    /// Cédula de extranjería.
    Ce,
    /// Passport.
    Pa,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ti => "ti",
            Self::Cc => "cc",
            Self::Ce => "ce",
            Self::Pa => "pa",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ti" => Some(Self::Ti),
            "cc" => Some(Self::Cc),
            "ce" => Some(Self::Ce),
            "pa" => Some(Self::Pa),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    /// Paired login principal, removed together with the student.
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    pub email: String,
    pub phone: String,
    pub school: String,
    pub grade: u8,
    pub id_document_file: Option<String>,
    pub photo_file: Option<String>,
}

impl Student {
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
            document_type: DocumentType::Ti,
            document_number: document_number.into(),
            birth_date: String::new(),
            email: String::new(),
            phone: String::new(),
            school: String::new(),
            grade: MIN_GRADE,
            id_document_file: None,
            photo_file: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_document_number("document_number", &self.document_number)?;
        require_iso_date("birth_date", &self.birth_date)?;
        require_email("email", &self.email)?;
        require_phone("phone", &self.phone)?;
        require_text("school", &self.school)?;
        require_range(
            "grade",
            i64::from(self.grade),
            i64::from(MIN_GRADE),
            i64::from(MAX_GRADE),
        )
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub school: Option<String>,
    pub grade: Option<u8>,
    #[serde(deserialize_with = "double_option")]
    pub id_document_file: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub photo_file: Option<Option<String>>,
}

impl Patch<Student> for StudentPatch {
    fn apply_to(&self, target: &mut Student) {
        set_if(&mut target.first_name, &self.first_name);
        set_if(&mut target.last_name, &self.last_name);
        set_if(&mut target.document_type, &self.document_type);
        set_if(&mut target.document_number, &self.document_number);
        set_if(&mut target.birth_date, &self.birth_date);
        set_if(&mut target.email, &self.email);
        set_if(&mut target.phone, &self.phone);
        set_if(&mut target.school, &self.school);
        set_if(&mut target.grade, &self.grade);
        set_if(&mut target.id_document_file, &self.id_document_file);
        set_if(&mut target.photo_file, &self.photo_file);
    }
}

#[cfg(test)]
mod tests {
    use super::{Student, StudentPatch};
    use crate::model::Patch;

    fn valid_student() -> Student {
        let mut student = Student::new("Ana", "Gómez", "1002003004");
        student.birth_date = "2009-04-12".to_string();
        student.email = "ana@example.edu.co".to_string();
        student.phone = "3001234567".to_string();
        student.school = "IE Santa Librada".to_string();
        student.grade = 9;
        student
    }

    #[test]
    fn valid_student_passes() {
        assert!(valid_student().validate().is_ok());
    }

    #[test]
    fn grade_outside_program_is_rejected() {
        let mut student = valid_student();
        student.grade = 5;
        assert_eq!(student.validate().unwrap_err().field(), "grade");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut student = valid_student();
        let patch = StudentPatch {
            school: Some("IE INEM".to_string()),
            photo_file: Some(None),
            ..StudentPatch::default()
        };
        patch.apply_to(&mut student);
        assert_eq!(student.school, "IE INEM");
        assert_eq!(student.first_name, "Ana");
        assert_eq!(student.photo_file, None);
    }

    #[test]
    fn explicit_null_clears_a_file_field() {
        let patch: StudentPatch = serde_json::from_str(r#"{"photo_file":null}"#).unwrap();
        assert_eq!(patch.photo_file, Some(None));
        let patch: StudentPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.photo_file, None);
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result: Result<StudentPatch, _> = serde_json::from_str(r#"{"status":"reviewed"}"#);
        assert!(result.is_err());
    }
}

use super::{
    files, int, opt_text, opt_uuid, read_opt_uuid, read_small, read_uuid, text,
    uuid_value,
};
use crate::auth::Role;
use crate::model::entity::{EntityType, RecordId, UserId};
use crate::model::guardian::{Guardian, GuardianPatch};
use crate::model::professor::{Professor, ProfessorPatch};
use crate::model::student::{DocumentType, Student, StudentPatch};
use crate::model::validation::ValidationError;
use crate::repo::record_repo::Record;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Row;

impl Record for Student {
    const ENTITY: EntityType = EntityType::Student;
    const PRINCIPAL_ROLE: Option<Role> = Some(Role::Student);
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "first_name",
        "last_name",
        "document_type",
        "document_number",
        "birth_date",
        "email",
        "phone",
        "school",
        "grade",
        "id_document_file",
        "photo_file",
    ];

    type Patch = StudentPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Student::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            opt_uuid(self.user_id),
            text(&self.first_name),
            text(&self.last_name),
            text(self.document_type.as_str()),
            text(&self.document_number),
            text(&self.birth_date),
            text(&self.email),
            text(&self.phone),
            text(&self.school),
            int(self.grade),
            opt_text(self.id_document_file.as_deref()),
            opt_text(self.photo_file.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let document_type_text: String = row.get("document_type")?;
        let document_type = DocumentType::parse(&document_type_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid document type `{document_type_text}` in students.document_type"
            ))
        })?;

        Ok(Self {
            id: read_uuid(row, "id")?,
            user_id: read_opt_uuid(row, "user_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            document_type,
            document_number: row.get("document_number")?,
            birth_date: row.get("birth_date")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            school: row.get("school")?,
            grade: read_small(row, "grade")?,
            id_document_file: row.get("id_document_file")?,
            photo_file: row.get("photo_file")?,
        })
    }

    fn principal(&self) -> Option<UserId> {
        self.user_id
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.id_document_file, &self.photo_file])
    }
}

impl Record for Guardian {
    const ENTITY: EntityType = EntityType::Guardian;
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "full_name",
        "relationship",
        "document_number",
        "email",
        "phone",
        "id_document_file",
    ];
    const PARENT_COLUMN: Option<&'static str> = Some("student_id");

    type Patch = GuardianPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Guardian::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            uuid_value(self.student_id),
            text(&self.full_name),
            text(&self.relationship),
            text(&self.document_number),
            text(&self.email),
            text(&self.phone),
            opt_text(self.id_document_file.as_deref()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: read_uuid(row, "id")?,
            student_id: read_uuid(row, "student_id")?,
            full_name: row.get("full_name")?,
            relationship: row.get("relationship")?,
            document_number: row.get("document_number")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            id_document_file: row.get("id_document_file")?,
        })
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.id_document_file])
    }
}

impl Record for Professor {
    const ENTITY: EntityType = EntityType::Professor;
    const PRINCIPAL_ROLE: Option<Role> = Some(Role::Professor);
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "first_name",
        "last_name",
        "document_number",
        "email",
        "phone",
        "area",
        "cv_file",
    ];

    type Patch = ProfessorPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Professor::validate(self)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            opt_uuid(self.user_id),
            text(&self.first_name),
            text(&self.last_name),
            text(&self.document_number),
            text(&self.email),
            text(&self.phone),
            text(&self.area),
            opt_text(self.cv_file.as_deref()),
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
            area: row.get("area")?,
            cv_file: row.get("cv_file")?,
        })
    }

    fn principal(&self) -> Option<UserId> {
        self.user_id
    }

    fn stored_files(&self) -> Vec<String> {
        files([&self.cv_file])
    }
}

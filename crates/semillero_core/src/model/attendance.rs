//! Attendance mark for one enrollment on one session date.

use crate::model::entity::RecordId;
use crate::model::validation::{require_iso_date, ValidationResult};
use crate::model::{set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: RecordId,
    pub enrollment_id: RecordId,
    pub session_date: String,
    pub present: bool,
    pub notes: String,
}

impl Attendance {
    pub fn new(enrollment_id: RecordId, session_date: impl Into<String>, present: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            enrollment_id,
            session_date: session_date.into(),
            present,
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_iso_date("session_date", &self.session_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttendancePatch {
    pub session_date: Option<String>,
    pub present: Option<bool>,
    pub notes: Option<String>,
}

impl Patch<Attendance> for AttendancePatch {
    fn apply_to(&self, target: &mut Attendance) {
        set_if(&mut target.session_date, &self.session_date);
        set_if(&mut target.present, &self.present);
        set_if(&mut target.notes, &self.notes);
    }
}

//! Academic offer: one semester window in which modules are taught.

use crate::model::entity::RecordId;
use crate::model::validation::{
    require_date_order, require_iso_date, require_range, require_text, ValidationResult,
};
use crate::model::{set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicOffer {
    pub id: RecordId,
    pub name: String,
    pub year: u16,
    /// `1` or `2`.
    pub semester: u8,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl AcademicOffer {
    pub fn new(name: impl Into<String>, year: u16, semester: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            year,
            semester,
            start_date: String::new(),
            end_date: String::new(),
            is_active: true,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("name", &self.name)?;
        require_range("year", i64::from(self.year), 2000, 2100)?;
        require_range("semester", i64::from(self.semester), 1, 2)?;
        require_iso_date("start_date", &self.start_date)?;
        require_iso_date("end_date", &self.end_date)?;
        require_date_order("end_date", &self.start_date, &self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcademicOfferPatch {
    pub name: Option<String>,
    pub year: Option<u16>,
    pub semester: Option<u8>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_active: Option<bool>,
}

impl Patch<AcademicOffer> for AcademicOfferPatch {
    fn apply_to(&self, target: &mut AcademicOffer) {
        set_if(&mut target.name, &self.name);
        set_if(&mut target.year, &self.year);
        set_if(&mut target.semester, &self.semester);
        set_if(&mut target.start_date, &self.start_date);
        set_if(&mut target.end_date, &self.end_date);
        set_if(&mut target.is_active, &self.is_active);
    }
}

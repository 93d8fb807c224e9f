//! Course module offered by the program.
//!
//! # Invariants
//! - `min_grade <= max_grade`, both within the student grade range.
//! - `capacity` is strictly positive.

use crate::model::entity::RecordId;
use crate::model::student::{MAX_GRADE, MIN_GRADE};
use crate::model::validation::{require_range, require_text, ValidationError, ValidationResult};
use crate::model::{set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on seats per module.
pub const MAX_CAPACITY: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub area: String,
    pub min_grade: u8,
    pub max_grade: u8,
    pub capacity: u32,
}

impl Module {
    pub fn new(name: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            area: area.into(),
            min_grade: MIN_GRADE,
            max_grade: MAX_GRADE,
            capacity: 30,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_text("name", &self.name)?;
        require_text("area", &self.area)?;
        let (min, max) = (i64::from(MIN_GRADE), i64::from(MAX_GRADE));
        require_range("min_grade", i64::from(self.min_grade), min, max)?;
        require_range("max_grade", i64::from(self.max_grade), min, max)?;
        if self.min_grade > self.max_grade {
            return Err(ValidationError::Inconsistent {
                field: "max_grade",
                reason: "must not be lower than min_grade",
            });
        }
        require_range("capacity", i64::from(self.capacity), 1, i64::from(MAX_CAPACITY))
    }

    /// Whether a student in `grade` may enroll.
    pub fn admits_grade(&self, grade: u8) -> bool {
        (self.min_grade..=self.max_grade).contains(&grade)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub area: Option<String>,
    pub min_grade: Option<u8>,
    pub max_grade: Option<u8>,
    pub capacity: Option<u32>,
}

impl Patch<Module> for ModulePatch {
    fn apply_to(&self, target: &mut Module) {
        set_if(&mut target.name, &self.name);
        set_if(&mut target.description, &self.description);
        set_if(&mut target.area, &self.area);
        set_if(&mut target.min_grade, &self.min_grade);
        set_if(&mut target.max_grade, &self.max_grade);
        set_if(&mut target.capacity, &self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::Module;

    #[test]
    fn inverted_grade_range_is_rejected() {
        let mut module = Module::new("Robótica", "tecnología");
        module.min_grade = 10;
        module.max_grade = 8;
        assert_eq!(module.validate().unwrap_err().field(), "max_grade");
    }

    #[test]
    fn admits_grade_is_inclusive() {
        let mut module = Module::new("Álgebra", "matemáticas");
        module.min_grade = 8;
        module.max_grade = 9;
        assert!(module.admits_grade(8));
        assert!(module.admits_grade(9));
        assert!(!module.admits_grade(10));
    }
}

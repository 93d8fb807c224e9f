//! Resource identity shared by persistence, audit and authorization.
//!
//! # Invariants
//! - Every resource row is keyed by a UUID v4 `RecordId`.
//! - `EntityType` tags are stable: they are persisted in `audit_log.entity_type`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one resource row.
pub type RecordId = Uuid;

/// Stable identifier of one authentication principal.
pub type UserId = Uuid;

/// Closed set of resource kinds managed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Student,
    Guardian,
    Professor,
    Module,
    AcademicOffer,
    Enrollment,
    AcademicMonitor,
    AdministrativeMonitor,
    DiagnosticTest,
    Attendance,
    Payment,
}

impl EntityType {
    pub const ALL: [EntityType; 11] = [
        Self::Student,
        Self::Guardian,
        Self::Professor,
        Self::Module,
        Self::AcademicOffer,
        Self::Enrollment,
        Self::AcademicMonitor,
        Self::AdministrativeMonitor,
        Self::DiagnosticTest,
        Self::Attendance,
        Self::Payment,
    ];

    /// Stable tag stored in the audit log and used in file paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Guardian => "guardian",
            Self::Professor => "professor",
            Self::Module => "module",
            Self::AcademicOffer => "academic_offer",
            Self::Enrollment => "enrollment",
            Self::AcademicMonitor => "academic_monitor",
            Self::AdministrativeMonitor => "administrative_monitor",
            Self::DiagnosticTest => "diagnostic_test",
            Self::Attendance => "attendance",
            Self::Payment => "payment",
        }
    }

    /// Backing SQLite table.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Student => "students",
            Self::Guardian => "guardians",
            Self::Professor => "professors",
            Self::Module => "modules",
            Self::AcademicOffer => "academic_offers",
            Self::Enrollment => "enrollments",
            Self::AcademicMonitor => "academic_monitors",
            Self::AdministrativeMonitor => "administrative_monitors",
            Self::DiagnosticTest => "diagnostic_tests",
            Self::Attendance => "attendance",
            Self::Payment => "payments",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == value)
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to one concrete resource row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub id: RecordId,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, id: RecordId) -> Self {
        Self { entity_type, id }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

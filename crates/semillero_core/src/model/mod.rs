//! Domain model for the Semillero enrollment program.
//!
//! # Responsibility
//! - Define canonical resource records and their typed partial updates.
//! - Keep field validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Verification status and audit references are derived; patches never
//!   carry them.

pub mod academic_offer;
pub mod attendance;
pub mod audit;
pub mod enrollment;
pub mod entity;
pub mod guardian;
pub mod module;
pub mod monitor;
pub mod payment;
pub mod professor;
pub mod student;
pub mod validation;
pub mod verification;

/// Typed partial update for one record type.
///
/// Absent fields (`None`) leave the target untouched.
pub trait Patch<T> {
    fn apply_to(&self, target: &mut T);
}

pub(crate) fn set_if<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

/// Distinguishes an explicit `null` (clear the field) from an absent key.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

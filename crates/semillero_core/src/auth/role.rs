//! Role tags, actions and the capability table.

use crate::model::entity::{EntityType, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Role claim attached to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Admin,
    AdministrativeMonitor,
    AcademicMonitor,
    Professor,
    Student,
}

/// Role tag for program administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Role tag for administrative monitors.
pub const ROLE_ADMINISTRATIVE_MONITOR: &str = "administrative_monitor";
/// Role tag for academic monitors.
pub const ROLE_ACADEMIC_MONITOR: &str = "academic_monitor";
/// Role tag for professors.
pub const ROLE_PROFESSOR: &str = "professor";
/// Role tag for students.
pub const ROLE_STUDENT: &str = "student";

const SUPPORTED_ROLE_STRINGS: &[&str] = &[
    ROLE_ADMIN,
    ROLE_ADMINISTRATIVE_MONITOR,
    ROLE_ACADEMIC_MONITOR,
    ROLE_PROFESSOR,
    ROLE_STUDENT,
];

impl Role {
    /// Stable tag stored in `users.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::AdministrativeMonitor => ROLE_ADMINISTRATIVE_MONITOR,
            Self::AcademicMonitor => ROLE_ACADEMIC_MONITOR,
            Self::Professor => ROLE_PROFESSOR,
            Self::Student => ROLE_STUDENT,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns supported role tag strings.
pub fn supported_role_strings() -> &'static [&'static str] {
    SUPPORTED_ROLE_STRINGS
}

/// Parses one role tag. Tags are lowercase; surrounding whitespace is ignored.
pub fn parse_role(value: &str) -> Result<Role, RoleParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RoleParseError::EmptyRole);
    }

    match normalized {
        ROLE_ADMIN => Ok(Role::Admin),
        ROLE_ADMINISTRATIVE_MONITOR => Ok(Role::AdministrativeMonitor),
        ROLE_ACADEMIC_MONITOR => Ok(Role::AcademicMonitor),
        ROLE_PROFESSOR => Ok(Role::Professor),
        ROLE_STUDENT => Ok(Role::Student),
        other => Err(RoleParseError::UnsupportedRole(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    EmptyRole,
    UnsupportedRole(String),
}

impl Display for RoleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role value must not be empty"),
            Self::UnsupportedRole(value) => write!(f, "role is unsupported: {value}"),
        }
    }
}

impl Error for RoleParseError {}

/// Resource operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// Capability table for every role.
pub fn role_allows(role: Role, entity: EntityType, action: Action) -> bool {
    use EntityType as E;

    match role {
        Role::Admin => true,
        Role::AdministrativeMonitor => match action {
            Action::List | Action::Retrieve => true,
            Action::Create | Action::Update => matches!(
                entity,
                E::Student | E::Guardian | E::Enrollment | E::Payment | E::AcademicOffer
            ),
            Action::Destroy => matches!(entity, E::Guardian | E::Payment),
        },
        Role::AcademicMonitor | Role::Professor => {
            if action.is_read() {
                matches!(
                    entity,
                    E::Student
                        | E::Guardian
                        | E::Module
                        | E::AcademicOffer
                        | E::Enrollment
                        | E::DiagnosticTest
                        | E::Attendance
                )
            } else {
                matches!(action, Action::Create | Action::Update)
                    && matches!(entity, E::Attendance | E::DiagnosticTest)
            }
        }
        Role::Student => match action {
            Action::List | Action::Retrieve => matches!(entity, E::Module | E::AcademicOffer),
            Action::Create => matches!(entity, E::Guardian | E::Enrollment),
            Action::Update | Action::Destroy => false,
        },
    }
}

/// Acting identity supplied by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Fails with `AccessDenied` unless the role may perform `action`.
    pub fn authorize(&self, entity: EntityType, action: Action) -> Result<(), AccessDenied> {
        if role_allows(self.role, entity, action) {
            return Ok(());
        }
        Err(AccessDenied {
            role: self.role,
            entity,
            action,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub role: Role,
    pub entity: EntityType,
    pub action: Action,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "role `{}` may not {} {}",
            self.role,
            self.action.as_str(),
            self.entity
        )
    }
}

impl Error for AccessDenied {}

#[cfg(test)]
mod tests {
    use super::{parse_role, role_allows, supported_role_strings, Action, Actor, Role, RoleParseError};
    use crate::model::entity::EntityType;
    use uuid::Uuid;

    #[test]
    fn parses_all_supported_roles() {
        for value in supported_role_strings() {
            let role = parse_role(value).expect("supported role parse");
            assert_eq!(role.as_str(), *value);
        }
    }

    #[test]
    fn rejects_empty_and_unknown_roles() {
        assert_eq!(parse_role("  "), Err(RoleParseError::EmptyRole));
        assert_eq!(
            parse_role("Admin"),
            Err(RoleParseError::UnsupportedRole("Admin".to_string()))
        );
        assert_eq!(
            parse_role("superuser"),
            Err(RoleParseError::UnsupportedRole("superuser".to_string()))
        );
    }

    #[test]
    fn admin_may_do_everything() {
        for entity in EntityType::ALL {
            for action in [
                Action::List,
                Action::Retrieve,
                Action::Create,
                Action::Update,
                Action::Destroy,
            ] {
                assert!(role_allows(Role::Admin, entity, action));
            }
        }
    }

    #[test]
    fn only_admin_and_administrative_monitor_verify_enrollments() {
        assert!(role_allows(
            Role::AdministrativeMonitor,
            EntityType::Enrollment,
            Action::Update
        ));
        assert!(!role_allows(
            Role::AcademicMonitor,
            EntityType::Enrollment,
            Action::Update
        ));
        assert!(!role_allows(Role::Professor, EntityType::Enrollment, Action::Update));
        assert!(!role_allows(Role::Student, EntityType::Enrollment, Action::Update));
    }

    #[test]
    fn monitors_profiles_are_admin_only_writes() {
        for role in [
            Role::AdministrativeMonitor,
            Role::AcademicMonitor,
            Role::Professor,
            Role::Student,
        ] {
            assert!(!role_allows(role, EntityType::AcademicMonitor, Action::Update));
            assert!(!role_allows(
                role,
                EntityType::AdministrativeMonitor,
                Action::Destroy
            ));
        }
    }

    #[test]
    fn professors_record_attendance_but_never_payments() {
        assert!(role_allows(Role::Professor, EntityType::Attendance, Action::Create));
        assert!(!role_allows(Role::Professor, EntityType::Payment, Action::List));
        assert!(!role_allows(Role::Professor, EntityType::Attendance, Action::Destroy));
    }

    #[test]
    fn students_only_browse_the_catalog() {
        assert!(role_allows(Role::Student, EntityType::Module, Action::List));
        assert!(role_allows(Role::Student, EntityType::Enrollment, Action::Create));
        assert!(!role_allows(Role::Student, EntityType::Student, Action::List));
    }

    #[test]
    fn authorize_reports_denied_triplet() {
        let actor = Actor::new(Uuid::new_v4(), Role::Student);
        let denied = actor
            .authorize(EntityType::Payment, Action::Destroy)
            .expect_err("students cannot destroy payments");
        assert_eq!(denied.entity, EntityType::Payment);
        assert_eq!(denied.action, Action::Destroy);
        assert!(denied.to_string().contains("student"));
    }
}

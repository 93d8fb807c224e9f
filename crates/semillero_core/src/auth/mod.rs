//! Role-based access control.
//!
//! # Responsibility
//! - Define the closed set of role tags carried by access tokens.
//! - Decide, in one place, which role may perform which action on which
//!   resource.
//!
//! # Invariants
//! - Role strings are parsed once at the boundary; core code only sees `Role`.

pub mod role;

pub use role::{
    parse_role, role_allows, supported_role_strings, AccessDenied, Action, Actor, Role,
    RoleParseError,
};

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate authorization, repositories, the audit log and the
//!   verification reconciler into request-level operations.
//! - Keep an HTTP or CLI surface decoupled from storage details.

pub mod resource_service;

pub use resource_service::{DestroyOutcome, ResourceController};

use crate::auth::AccessDenied;
use crate::model::entity::EntityRef;
use crate::model::validation::ValidationError;
use crate::reconciler::ReconcileError;
use crate::repo::RepoError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request-level failure, mapped one-to-one onto client-facing outcomes.
#[derive(Debug)]
pub enum ServiceError {
    /// Role may not perform the operation; nothing was read or written.
    Forbidden(AccessDenied),
    /// Payload failed field validation.
    Validation(ValidationError),
    /// Payload is not a valid patch (unknown or derived field, wrong type).
    InvalidPayload(String),
    NotFound(EntityRef),
    Storage(StorageError),
    Reconcile(ReconcileError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(err) => write!(f, "forbidden: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidPayload(message) => write!(f, "invalid payload: {message}"),
            Self::NotFound(target) => write!(f, "not found: {target}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Reconcile(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidPayload(_) => None,
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
            Self::Reconcile(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(target) => Self::NotFound(target),
            other => Self::Repo(other),
        }
    }
}

impl From<ReconcileError> for ServiceError {
    fn from(value: ReconcileError) -> Self {
        match value {
            ReconcileError::Store(err) => Self::from(err),
            other => Self::Reconcile(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(RepoError::from(value))
    }
}

//! Uniform success/failure outcome returned by every manager operation.

use serde::Serialize;

use crate::errors::AdminError;

/// Broad category of a failed outcome, used by the HTTP layer to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSubject,
    Validation,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResult<T> {
    Success { result: T },
    Failure { kind: FailureKind, errors: Vec<String> },
}

impl<T> AdminResult<T> {
    pub fn success(result: T) -> Self {
        AdminResult::Success { result }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AdminResult::Success { .. })
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            AdminResult::Success { result } => Some(result),
            AdminResult::Failure { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<T> {
        match self {
            AdminResult::Success { result } => Some(result),
            AdminResult::Failure { .. } => None,
        }
    }

    /// Error messages of a failed outcome, empty on success
    pub fn errors(&self) -> &[String] {
        match self {
            AdminResult::Success { .. } => &[],
            AdminResult::Failure { errors, .. } => errors,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AdminResult::Success { .. } => None,
            AdminResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl AdminResult<()> {
    pub fn ok() -> Self {
        AdminResult::Success { result: () }
    }
}

impl<T> From<AdminError> for AdminResult<T> {
    fn from(error: AdminError) -> Self {
        let (kind, errors) = match error {
            AdminError::InvalidSubject => (FailureKind::InvalidSubject, vec![error.to_string()]),
            AdminError::InvalidChildId(_) | AdminError::UnknownProperty(_) => {
                (FailureKind::Validation, vec![error.to_string()])
            }
            AdminError::Validation(errors) => (FailureKind::Validation, errors),
            AdminError::Storage(ref storage) => {
                (FailureKind::Persistence, vec![storage.to_string()])
            }
        };
        AdminResult::Failure { kind, errors }
    }
}

impl<T> From<Result<T, AdminError>> for AdminResult<T> {
    fn from(result: Result<T, AdminError>) -> Self {
        match result {
            Ok(value) => AdminResult::success(value),
            Err(error) => error.into(),
        }
    }
}

//! Translation of admin outcomes into HTTP responses.

use axum::{http::StatusCode, response::Json as ResponseJson};
use serde_json::{Value, json};

use crate::admin::{AdminResult, FailureKind};

/// Error half of every admin handler: a status and `{"errors": [..]}`
pub type Rejection = (StatusCode, ResponseJson<Value>);

pub fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidSubject => StatusCode::NOT_FOUND,
        FailureKind::Validation => StatusCode::BAD_REQUEST,
        FailureKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(kind: FailureKind, errors: Vec<String>) -> Rejection {
    (
        failure_status(kind),
        ResponseJson(json!({ "errors": errors })),
    )
}

/// 200 with the payload
pub fn respond<T>(outcome: AdminResult<T>) -> Result<ResponseJson<T>, Rejection> {
    match outcome {
        AdminResult::Success { result } => Ok(ResponseJson(result)),
        AdminResult::Failure { kind, errors } => Err(reject(kind, errors)),
    }
}

/// 201 with the payload
pub fn respond_created<T>(
    outcome: AdminResult<T>,
) -> Result<(StatusCode, ResponseJson<T>), Rejection> {
    respond(outcome).map(|body| (StatusCode::CREATED, body))
}

/// 204 for operations without a payload
pub fn respond_empty(outcome: AdminResult<()>) -> Result<StatusCode, Rejection> {
    match outcome {
        AdminResult::Success { .. } => Ok(StatusCode::NO_CONTENT),
        AdminResult::Failure { kind, errors } => Err(reject(kind, errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds_map_to_statuses() {
        let outcome: AdminResult<()> = AdminResult::Failure {
            kind: FailureKind::InvalidSubject,
            errors: vec!["Invalid subject".to_string()],
        };
        let (status, body) = respond_empty(outcome).unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0, json!({ "errors": ["Invalid subject"] }));

        assert_eq!(failure_status(FailureKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(
            failure_status(FailureKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_empty_success_is_no_content() {
        assert_eq!(respond_empty(AdminResult::ok()).unwrap(), StatusCode::NO_CONTENT);
        let (status, body) = respond_created(AdminResult::success(7)).unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.0, 7);
    }
}

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::error;

use crate::admin::AdminAction;
use crate::guard::{DenialReason, Requirement};

/// Failures the domain layer reports to callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("permission denied: requires {required}")]
    PermissionDenied {
        required: Requirement,
        reason: DenialReason,
    },
    #[error("cannot {action} on your own account")]
    SelfModificationForbidden { action: AdminAction },
    #[error("resource belongs to another business")]
    TenantMismatch,
    #[error("validation failed with {} error(s)", .errors.len())]
    ValidationFailed { errors: Vec<String> },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("missing or malformed identity headers")]
    Unauthenticated,
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::PermissionDenied { .. } => "permission_denied",
            DomainError::SelfModificationForbidden { .. } => "self_modification_forbidden",
            DomainError::TenantMismatch => "tenant_mismatch",
            DomainError::ValidationFailed { .. } => "validation_failed",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Unauthenticated => "unauthenticated",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::PermissionDenied { .. }
            | DomainError::SelfModificationForbidden { .. }
            | DomainError::TenantMismatch => StatusCode::FORBIDDEN,
            DomainError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }

    /// Structured fields merged into the response body next to `error` and `kind`.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            DomainError::PermissionDenied { required, reason } => {
                json!({ "required": required, "reason": reason })
            }
            DomainError::SelfModificationForbidden { action } => json!({ "action": action }),
            DomainError::ValidationFailed { errors } => json!({ "errors": errors }),
            DomainError::NotFound { entity, id } => json!({ "entity": entity, "id": id }),
            DomainError::TenantMismatch | DomainError::Unauthenticated => json!({}),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn domain(&self) -> Option<&DomainError> {
        self.error.downcast_ref::<DomainError>()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = ?self.error, "request failed");
            let body = Json(json!({
                "error": "internal server error",
                "kind": "internal",
            }));
            return (self.status, body).into_response();
        }

        let mut body = Map::new();
        body.insert("error".into(), Value::String(self.error.to_string()));
        match self.domain() {
            Some(domain) => {
                body.insert("kind".into(), Value::String(domain.kind().into()));
                body.extend(domain.details());
            }
            None => {
                body.insert("kind".into(), Value::String("request".into()));
            }
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error: Error = err.into();
        let status = error
            .downcast_ref::<DomainError>()
            .map(DomainError::status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        AppError { status, error }
    }
}

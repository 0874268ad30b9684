//! REST error type
//!
//! Service failures are translated into [`ApiError`], which knows its HTTP
//! status and renders the JSON error body.
//!
//! ```rust
//! use verein_service::handlers::{ApiError, ApiErrorKind, ApiOperation};
//! use verein_service::service::ServiceError;
//!
//! let error = ApiError::from_service(ApiOperation::Update, ServiceError::PreconditionRequired);
//! assert_eq!(error.kind, ApiErrorKind::PreconditionRequired);
//! assert_eq!(error.kind.status_code().as_u16(), 428);
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::RepositoryErrorKind;
use crate::service::ServiceError;
use crate::validation::Violation;

/// REST operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of REST error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    NotFound,
    /// Club name taken
    AlreadyExists,
    ValidationFailed,
    Unauthorized,
    Forbidden,
    /// Write without `If-Match`
    PreconditionRequired,
    /// Invalid or outdated `If-Match`
    PreconditionFailed,
    /// `Accept` admits no representation we produce
    NotAcceptable,
    Conflict,
    InternalError,
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::PreconditionRequired => write!(f, "precondition_required"),
            Self::PreconditionFailed => write!(f, "precondition_failed"),
            Self::NotAcceptable => write!(f, "not_acceptable"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::Conflict => StatusCode::CONFLICT,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::PreconditionRequired => StatusCode::PRECONDITION_REQUIRED,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Upper-case code sent in the body, e.g. `PRECONDITION_FAILED`
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured REST error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub operation: ApiOperation,
    pub kind: ApiErrorKind,
    pub message: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Individual field violations for validation failures
    pub violations: Vec<Violation>,
}

impl ApiError {
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            violations: Vec::new(),
        }
    }

    pub fn not_acceptable(operation: ApiOperation) -> Self {
        Self::new(
            operation,
            ApiErrorKind::NotAcceptable,
            "Only application/json and text/html are available",
        )
    }

    /// Malformed request body
    pub fn invalid_body(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::ValidationFailed, message)
    }

    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Translate a service failure
    pub fn from_service(operation: ApiOperation, error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound { id } => {
                Self::new(operation, ApiErrorKind::NotFound, error.to_string())
                    .with_entity("Club", id.to_string())
            }
            ServiceError::NoResults { .. } => {
                Self::new(operation, ApiErrorKind::NotFound, error.to_string())
            }
            ServiceError::ValidationFailed(ref errors) => {
                let mut api = Self::new(operation, ApiErrorKind::ValidationFailed, errors.to_string());
                api.violations = errors.violations().to_vec();
                api
            }
            ServiceError::NameExists { ref name } => {
                Self::new(operation, ApiErrorKind::AlreadyExists, error.to_string())
                    .with_entity("Club", name.clone())
            }
            ServiceError::PreconditionRequired => Self::new(
                operation,
                ApiErrorKind::PreconditionRequired,
                error.to_string(),
            ),
            ServiceError::VersionInvalid { .. } | ServiceError::VersionOutdated { .. } => {
                Self::new(operation, ApiErrorKind::PreconditionFailed, error.to_string())
            }
            ServiceError::Unauthorized { .. } => {
                Self::new(operation, ApiErrorKind::Unauthorized, error.to_string())
            }
            ServiceError::Forbidden { .. } => {
                Self::new(operation, ApiErrorKind::Forbidden, error.to_string())
            }
            ServiceError::Repository(err) => {
                let (kind, message) = match err.kind {
                    RepositoryErrorKind::AlreadyExists => (ApiErrorKind::AlreadyExists, err.message),
                    RepositoryErrorKind::ConstraintViolation => (ApiErrorKind::Conflict, err.message),
                    RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => (
                        ApiErrorKind::ServiceUnavailable,
                        "Service temporarily unavailable".to_string(),
                    ),
                    // don't expose internal details
                    RepositoryErrorKind::DatabaseError | RepositoryErrorKind::SerializationError => (
                        ApiErrorKind::InternalError,
                        "An internal error occurred".to_string(),
                    ),
                };
                Self {
                    operation,
                    kind,
                    message,
                    entity_type: err.entity_type,
                    entity_id: err.entity_id,
                    violations: Vec::new(),
                }
            }
        }
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for REST errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    pub status: u16,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViolationBody {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                retriable = self.is_retriable(),
                "API error: {}", self.message
            );
        } else {
            tracing::warn!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "Request rejected: {}", self.message
            );
        }

        let response = ApiErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: self.operation.to_string(),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            violations: self
                .violations
                .into_iter()
                .map(|v| ViolationBody {
                    field: v.field,
                    message: v.message,
                })
                .collect(),
        };

        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepositoryError, RepositoryOperation};
    use crate::validation::ValidationErrors;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiErrorKind::PreconditionRequired.status_code().as_u16(), 428);
        assert_eq!(ApiErrorKind::PreconditionFailed.status_code().as_u16(), 412);
        assert_eq!(ApiErrorKind::NotAcceptable.status_code().as_u16(), 406);
        assert_eq!(ApiErrorKind::ValidationFailed.status_code().as_u16(), 422);
        assert_eq!(ApiErrorKind::AlreadyExists.status_code().as_u16(), 409);
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            ApiErrorKind::PreconditionFailed.error_code(),
            "PRECONDITION_FAILED"
        );
    }

    #[test]
    fn test_version_errors_are_precondition_failed() {
        let error = ApiError::from_service(
            ApiOperation::Update,
            ServiceError::VersionOutdated {
                version: "\"1\"".to_string(),
            },
        );
        assert_eq!(error.kind, ApiErrorKind::PreconditionFailed);
        assert_eq!(error.message, "Version \"1\" is outdated");
    }

    #[test]
    fn test_validation_keeps_violations() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "is required");
        errors.push("players[0].age", "must be at least 16");
        let error = ApiError::from_service(ApiOperation::Create, ServiceError::ValidationFailed(errors));
        assert_eq!(error.violations.len(), 2);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = ApiError::from_service(
            ApiOperation::List,
            ServiceError::Repository(RepositoryError::database_error(
                RepositoryOperation::FindMany,
                "relation \"club\" does not exist",
            )),
        );
        assert_eq!(error.kind, ApiErrorKind::InternalError);
        assert_eq!(error.message, "An internal error occurred");
    }

    #[test]
    fn test_display_with_entity() {
        let error = ApiError::from_service(ApiOperation::Get, ServiceError::NotFound { id: 7 });
        assert_eq!(
            error.to_string(),
            "API not_found error during get: No club found with id 7 [Club: 7]"
        );
    }
}

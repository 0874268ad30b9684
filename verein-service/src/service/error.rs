//! Failure taxonomy of the access service

use thiserror::Error;

use crate::model::ClubId;
use crate::repository::RepositoryError;
use crate::search::SearchFilter;
use crate::validation::ValidationErrors;

/// Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Every way a service call can fail
///
/// Variants carry the context the caller needs for diagnostics: the id,
/// the filter and page, the offending version token.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// No club with this id
    #[error("No club found with id {id}")]
    NotFound { id: ClubId },

    /// A valid search produced nothing on this page
    #[error("No clubs found for filter {filter:?} on page {page}")]
    NoResults { filter: SearchFilter, page: u32 },

    /// Input or search parameters violate the schema
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("A club named \"{name}\" already exists")]
    NameExists { name: String },

    /// Update without a version token
    #[error("Header \"If-Match\" is missing")]
    PreconditionRequired,

    #[error("Invalid version token {token}")]
    VersionInvalid { token: String },

    /// Version token does not match the persisted version
    #[error("Version {version} is outdated")]
    VersionOutdated { version: String },

    /// Caller is known but lacks the role for this action
    #[error("Insufficient permissions for {action}")]
    Forbidden { action: &'static str },

    /// No roles were supplied for a protected action
    #[error("Authentication required for {action}")]
    Unauthorized { action: &'static str },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

impl ServiceError {
    /// Stable machine-readable code shared by REST and GraphQL
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::NoResults { .. } => "NOT_FOUND",
            Self::ValidationFailed(_) => "BAD_USER_INPUT",
            Self::NameExists { .. } => "NAME_EXISTS",
            Self::PreconditionRequired => "PRECONDITION_REQUIRED",
            Self::VersionInvalid { .. } => "VERSION_INVALID",
            Self::VersionOutdated { .. } => "VERSION_OUTDATED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Unauthorized { .. } => "UNAUTHENTICATED",
            Self::Repository(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        assert_eq!(
            ServiceError::NotFound { id: 42 }.to_string(),
            "No club found with id 42"
        );
        assert_eq!(
            ServiceError::PreconditionRequired.to_string(),
            "Header \"If-Match\" is missing"
        );
        assert_eq!(
            ServiceError::VersionOutdated {
                version: "\"1\"".to_string()
            }
            .to_string(),
            "Version \"1\" is outdated"
        );
        let mut filter = SearchFilter::new();
        filter.insert("name".to_string(), "xyz".to_string());
        assert_eq!(
            ServiceError::NoResults { filter, page: 3 }.to_string(),
            "No clubs found for filter {\"name\": \"xyz\"} on page 3"
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(ServiceError::NotFound { id: 1 }.code(), "NOT_FOUND");
        assert_eq!(
            ServiceError::ValidationFailed(ValidationErrors::single("name", "is required")).code(),
            "BAD_USER_INPUT"
        );
        assert_eq!(
            ServiceError::Forbidden { action: "delete" }.code(),
            "FORBIDDEN"
        );
    }
}

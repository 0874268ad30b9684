//! Store error types
//!
//! Every store failure carries the operation that was running, a coarse
//! kind, and optionally the club it concerned.
//!
//! ```rust
//! use verein_service::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::already_exists("FC Bayern München");
//! assert!(matches!(error.kind, RepositoryErrorKind::AlreadyExists));
//! assert!(!error.is_retriable());
//! ```

use std::fmt;

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    FindById,
    FindMany,
    Count,
    NameExists,
    Create,
    Update,
    Delete,
    /// Loading stadiums or players for a set of clubs
    BatchLoad,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindMany => write!(f, "find_many"),
            Self::Count => write!(f, "count"),
            Self::NameExists => write!(f, "name_exists"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::BatchLoad => write!(f, "batch_load"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Unique key violated (club name)
    AlreadyExists,
    /// Other constraint violated
    ConstraintViolation,
    ConnectionFailed,
    Timeout,
    DatabaseError,
    /// A stored row could not be mapped onto the model
    SerializationError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    pub operation: RepositoryOperation,
    pub kind: RepositoryErrorKind,
    pub message: String,
    /// Entity type, always `Club` for this service
    pub entity_type: Option<String>,
    /// Club id or name involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// A club with this name is already stored
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Create,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity("Club", name)
    }

    /// The version counter of a club cannot be advanced any further
    pub fn version_exhausted(id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Update,
            RepositoryErrorKind::ConstraintViolation,
            "Version counter exhausted",
        )
        .with_entity("Club", id)
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    pub fn serialization_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::SerializationError, message)
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

    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Transient errors that may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }

    /// Classify a driver error
    #[cfg(feature = "database")]
    pub fn from_sqlx(operation: RepositoryOperation, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Self::new(
                operation,
                RepositoryErrorKind::AlreadyExists,
                db_err.message().to_string(),
            ),
            sqlx::Error::Database(db_err)
                if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
            {
                Self::new(
                    operation,
                    RepositoryErrorKind::ConstraintViolation,
                    db_err.message().to_string(),
                )
            }
            sqlx::Error::PoolTimedOut => Self::timeout(operation, error.to_string()),
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                Self::connection_failed(error.to_string()).with_operation(operation)
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                Self::serialization_error(operation, error.to_string())
            }
            _ => Self::database_error(operation, error.to_string()),
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(RepositoryOperation::FindById.to_string(), "find_by_id");
        assert_eq!(RepositoryOperation::FindMany.to_string(), "find_many");
        assert_eq!(RepositoryOperation::NameExists.to_string(), "name_exists");
        assert_eq!(RepositoryOperation::BatchLoad.to_string(), "batch_load");
    }

    #[test]
    fn test_already_exists_carries_name() {
        let error = RepositoryError::already_exists("VfB Stuttgart");
        assert_eq!(error.kind, RepositoryErrorKind::AlreadyExists);
        assert_eq!(error.entity_id.as_deref(), Some("VfB Stuttgart"));
    }

    #[test]
    fn test_is_retriable() {
        assert!(RepositoryError::connection_failed("refused").is_retriable());
        assert!(RepositoryError::timeout(RepositoryOperation::Count, "slow").is_retriable());
        assert!(!RepositoryError::already_exists("x").is_retriable());
        assert!(!RepositoryError::database_error(RepositoryOperation::Create, "syntax").is_retriable());
    }

    #[test]
    fn test_display_with_entity() {
        let error = RepositoryError::already_exists("VfB Stuttgart")
            .with_operation(RepositoryOperation::Update);
        assert_eq!(
            error.to_string(),
            "Repository already_exists error during update: Entity already exists [Club: VfB Stuttgart]"
        );
    }

    #[test]
    fn test_display_without_entity() {
        let error = RepositoryError::database_error(RepositoryOperation::Count, "boom");
        assert_eq!(
            error.to_string(),
            "Repository database_error error during count: boom"
        );
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_from_sqlx_pool_timeout() {
        let error = RepositoryError::from_sqlx(RepositoryOperation::FindMany, sqlx::Error::PoolTimedOut);
        assert_eq!(error.kind, RepositoryErrorKind::Timeout);
        assert_eq!(error.operation, RepositoryOperation::FindMany);
    }
}

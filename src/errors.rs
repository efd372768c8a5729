use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationErrors;

/// Coarse classification used by presentation layers to decide how to
/// surface a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input or a violated business rule; the user corrects the form.
    Validation,
    /// A referenced entity does not exist.
    Lookup,
    /// Anything the user cannot fix from the form.
    Internal,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Insufficient stock: requested {requested}, on hand {on_hand}")]
    InsufficientStock { requested: Decimal, on_hand: Decimal },

    #[error("Limit exceeded: requested {requested}, limit {limit}")]
    LimitExceeded { requested: Decimal, limit: Decimal },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for ServiceError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Serialization(inner) => inner.into(),
            other => ServiceError::PersistenceError(other.to_string()),
        }
    }
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Single source of truth for error classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_)
            | Self::InsufficientBalance { .. }
            | Self::InsufficientStock { .. }
            | Self::LimitExceeded { .. }
            | Self::InvalidOperation(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::Lookup,
            Self::SerializationError(_) | Self::PersistenceError(_) => ErrorCategory::Internal,
        }
    }

    /// Field-level messages when this is a form validation failure.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for a blocking dialog. Internal failures return a
    /// generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::SerializationError(_) | Self::PersistenceError(_) => {
                "Internal error, the record was not saved".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Errors raised by a key/value backend. These never escape
/// [`crate::persistence::Persistence::load`] or `save`.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Quota exceeded for key {key}: {size} bytes exceeds {quota}")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use validator::ValidationError;

    #[test]
    fn category_mapping() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", ValidationError::new("required"));
        assert_eq!(
            ServiceError::Validation(errors).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ServiceError::InsufficientBalance {
                requested: dec!(6000),
                available: dec!(5000),
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ServiceError::not_found("Member", "M-1").category(),
            ErrorCategory::Lookup
        );
        assert_eq!(
            ServiceError::PersistenceError("disk".into()).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn user_message_hides_internal_details() {
        assert_eq!(
            ServiceError::SerializationError("bad float".into()).user_message(),
            "Internal error, the record was not saved"
        );
        assert_eq!(
            ServiceError::not_found("Branch", 7).user_message(),
            "Not found: Branch 7 not found"
        );
    }
}

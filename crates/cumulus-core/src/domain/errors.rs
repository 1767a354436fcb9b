//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures of newtypes and malformed changes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid logical path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// A change whose node references violate its invariants
    #[error("Invalid change: {0}")]
    InvalidChange(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidPath("bad//path".to_string());
        assert_eq!(err.to_string(), "Invalid path: bad//path");

        let err = DomainError::InvalidRemoteId(String::new());
        assert_eq!(err.to_string(), "Invalid remote ID: ");

        let err = DomainError::InvalidChange("src missing".to_string());
        assert_eq!(err.to_string(), "Invalid change: src missing");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidPath("a".to_string());
        let err2 = DomainError::InvalidPath("a".to_string());
        let err3 = DomainError::InvalidPath("b".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}

//! Domain entities and business rules
//!
//! This module contains the core domain types for cumulus:
//! - Newtypes for type-safe identifiers and validated logical paths
//! - The `Node` metadata snapshot for one filesystem entry
//! - The `Change` sum type describing one required mutation
//! - Domain-specific error types

pub mod change;
pub mod errors;
pub mod newtypes;
pub mod node;

// Re-export commonly used types
pub use change::{Change, ChangeOp};
pub use errors::DomainError;
pub use newtypes::{NodePath, RemoteId};
pub use node::Node;

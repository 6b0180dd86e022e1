//! # Pooling Error Types
//!
//! All errors that can occur in the pooling engine.
//!
//! Every variant is a programming error to fix, not a runtime condition to
//! recover from. The one normal "nothing here" path (`get` finding no
//! available object) is expressed with `Option`, never with an error.

use thiserror::Error;

/// Errors that can occur in the pooling engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A required parameter was empty, negative, non-finite or otherwise invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown pool, or unknown object identity on an identity-keyed operation.
    #[error("not found: {0}")]
    NotFound(String),

    /// A pool with the same key is already registered.
    #[error("pool already exists: '{0}'")]
    DuplicatePool(String),

    /// A strict-mode contract check failed (for example a double release).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The operation is illegal in the current state (usage-count underflow,
    /// stale node handle, removal from an empty list).
    #[error("invalid state: {0}")]
    StateError(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pooling operations.
pub type PoolResult<T> = Result<T, PoolError>;

//! Type universe errors

use thiserror::Error;

/// Errors that can occur during type universe operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Handle was not handed out by this universe
    #[error("Unknown type handle: {handle}")]
    UnknownHandle {
        /// Raw handle number
        handle: u32,
    },

    /// A named type was used before its body was defined
    #[error("Underlying type of {name} is not set")]
    UnderlyingNotSet {
        /// Type name
        name: String,
    },

    /// Invalid type argument count
    #[error("Invalid type argument count for {name}: expected {expected}, got {actual}")]
    InvalidTypeArgCount {
        /// Generic type name
        name: String,
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// Instantiation of a type that declares no type parameters
    #[error("Not a generic type: {name}")]
    NotGeneric {
        /// Type name
        name: String,
    },

    /// Operation needs a named type
    #[error("Not a named type: {display}")]
    NotNamed {
        /// Rendered type
        display: String,
    },
}

//! Error types for analysis
//!
//! Fatal input inconsistencies abort the analyzer run. Selector conflicts
//! are source-language violations surfaced late; they are recorded on the
//! offending type and analysis continues.

use crate::type_info::TypeIdx;
use thiserror::Error;
use tyscope_types::{Span, TypeError};

/// Errors that abort an analysis run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// A type expression has no resolved type
    #[error("No type recorded for expression in {package} at line {}", .span.line)]
    MissingExprType {
        /// Package import path
        package: String,
        /// Location of the expression
        span: Span,
    },

    /// An identifier has no resolved object
    #[error("No object recorded for '{name}' in {package}")]
    MissingObject {
        /// Identifier
        name: String,
        /// Package import path
        package: String,
        /// Location of the identifier
        span: Span,
    },

    /// A declared type name is not in the global name table
    #[error("Unknown type name '{name}' in {package}")]
    UnknownTypeName {
        /// Type name
        name: String,
        /// Package import path
        package: String,
    },

    /// Method receiver base is not a declared named type
    #[error("Receiver of method '{method}' in {package} is not a named type")]
    ReceiverNotNamed {
        /// Method name
        method: String,
        /// Package import path
        package: String,
    },

    /// Two fields of one struct literal share a name
    #[error("Duplicate field '{name}' in struct {display}")]
    DuplicateField {
        /// Field name
        name: String,
        /// Rendered struct type
        display: String,
    },

    /// Package depends on a package that was not loaded
    #[error("Package {package} depends on unknown package {dependency}")]
    UnknownDependency {
        /// Importing package
        package: String,
        /// Missing import path
        dependency: String,
    },

    /// Import graph is not acyclic
    #[error("Import cycle detected: {cycle}")]
    ImportCycle {
        /// Cycle rendered as `a -> b -> a`
        cycle: String,
    },

    /// A type was registered while registration was forbidden
    #[error("Type {display} registered during implementation search")]
    RegistrationForbidden {
        /// Rendered type
        display: String,
    },

    /// Raw type universe failure
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Kinds of selector conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Two interface methods share an id but not a signature
    MethodSignature,
    /// A field and a method share a name at depth 0
    FieldAndMethod,
}

/// A non-fatal source-language violation bound to a type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Conflicting selector '{selector}' on {display}")]
pub struct SelectorConflict {
    /// Type the conflict was found on
    pub ty: TypeIdx,
    /// Rendered type
    pub display: String,
    /// Selector id
    pub selector: String,
    /// What collided
    pub kind: ConflictKind,
}

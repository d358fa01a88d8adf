//! Tyscope analyzer
//!
//! Whole-program analysis over packages that were already parsed and type
//! checked:
//!
//! - a registry giving every distinct type a dense index,
//! - declarations collected per package, in dependency order,
//! - every field and method reachable through `x.sel`, with promotion
//!   through embedded fields,
//! - which concrete types implement which interfaces,
//! - program statistics.
//!
//! Input comes from [`tyscope_types::Program`]; [`Analyzer`] runs the phases
//! and answers queries.

#![warn(missing_debug_implementations)]

pub mod analyzer;
pub mod check;
pub mod collector;
pub mod config;
pub mod declarations;
pub mod error;
pub mod generics;
pub mod implementations;
#[cfg(feature = "logging")]
pub mod logging;
pub mod packages;
pub mod progress;
pub mod registry;
pub mod selector;
pub mod selectors;
pub mod stats;
pub mod type_info;

pub use analyzer::Analyzer;
pub use check::CheckFailure;
pub use config::{AnalyzerConfig, ConfigError, CONFIG_FILE_NAME};
pub use declarations::{
    Constant, ConstantId, DeclPos, Declarations, Function, FunctionId, Import, ImportId, Receiver,
    TypeName, TypeNameId, TypeNameKind, TypeSource, Variable, VariableId,
};
pub use error::{AnalysisError, ConflictKind, SelectorConflict};
pub use implementations::MethodSignature;
pub use packages::{PackageGraph, PackageIdx, PackageInfo, RuntimeFunction, SourceFile};
pub use progress::{SubTask, SubTaskCallback};
pub use registry::TypeRegistry;
pub use selector::{
    ChainArena, ChainId, EmbedMode, Field, Method, Selector, SelectorCond, SelectorId, SelectorKind,
};
pub use stats::{FieldTotals, Stats, TopList, TopLists};
pub use type_info::{Implementation, TypeAttributes, TypeIdx, TypeInfo, TypeKind};

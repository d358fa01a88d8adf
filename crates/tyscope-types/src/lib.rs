//! Tyscope input model
//!
//! Everything the analyzer consumes from its external collaborators: the
//! raw type universe built by a type checker, the syntax trees of package
//! files, package records with their resolver tables, and the toolchain
//! description.
//!
//! # Example
//!
//! ```ignore
//! use tyscope_types::{BasicKind, FieldDef, ProgramBuilder};
//!
//! let mut b = ProgramBuilder::new();
//! let p = b.package("example.com/p");
//! let int = b.basic(BasicKind::Int);
//! let a = b.declare_type(p, "A");
//! b.define_struct(a, vec![FieldDef::named("X", int)])?;
//! let program = b.build();
//! ```

#![warn(missing_debug_implementations)]

pub mod ast;
pub mod builder;
pub mod error;
pub mod package;
pub mod toolchain;
pub mod ty;
pub mod universe;

pub use ast::{AstFile, Decl, DeclToken, Expr, ExprKind, FieldDecl, FuncDecl, Ident, NodeId, Span, Spec};
pub use builder::{FieldDef, MethodDef, PkgRef, ProgramBuilder, BUILTIN_PACKAGE, UNSAFE_PACKAGE};
pub use error::TypeError;
pub use package::{Object, ObjectResolver, ObjectTable, Package, Program, TypeInfoResolver, TypeInfoTable};
pub use toolchain::ToolchainInfo;
pub use ty::{
    is_exported, BasicKind, ChanDir, InterfaceType, NamedType, RawField, RawKind, RawMethod,
    RawType, Signature, StructType, TypeParamType,
};
pub use universe::TypeUniverse;

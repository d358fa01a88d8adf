//! Raw type handles and the kinds they denote
//!
//! A [`RawType`] is the opaque, canonical handle the type checker hands out.
//! Two handles are equal iff they denote the same type, so the analyzer uses
//! them as plain map keys. The structure behind a handle is a [`RawKind`],
//! stored in a [`TypeUniverse`](crate::universe::TypeUniverse).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical handle for a type in the type universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawType(pub(crate) u32);

impl RawType {
    /// Build a handle from its raw number.
    ///
    /// Only meaningful for numbers handed out by the same universe.
    pub fn from_u32(value: u32) -> Self {
        RawType(value)
    }

    /// The raw number behind this handle.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawType({})", self.0)
    }
}

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    /// Placeholder for types the checker failed to resolve
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    /// `unsafe.Pointer`
    UnsafePointer,
}

impl BasicKind {
    /// Every basic kind, in pre-interning order.
    pub const ALL: [BasicKind; 19] = [
        BasicKind::Invalid,
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
        BasicKind::UnsafePointer,
    ];

    /// Source-level spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Invalid => "invalid type",
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::UnsafePointer => "Pointer",
        }
    }

    /// Integer family, including `uintptr`.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
        )
    }

    /// Integer, float and complex kinds.
    pub fn is_numeric(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                BasicKind::Float32 | BasicKind::Float64 | BasicKind::Complex64 | BasicKind::Complex128
            )
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicKind::UnsafePointer => write!(f, "unsafe.Pointer"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

impl fmt::Display for ChanDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChanDir::Both => write!(f, "chan"),
            ChanDir::Send => write!(f, "chan<-"),
            ChanDir::Recv => write!(f, "<-chan"),
        }
    }
}

/// A declared or instantiated named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    /// Type name
    pub name: String,
    /// Import path of the declaring package, `None` for predeclared names
    pub package: Option<String>,
    /// Declaration number; distinguishes same-named declarations
    pub decl: u32,
    /// Declared type parameters (empty for instantiations)
    pub type_params: Vec<RawType>,
    /// Type arguments of an instantiation
    pub type_args: Vec<RawType>,
    /// Generic origin of an instantiation
    pub origin: Option<RawType>,
}

/// A struct field as seen by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawField {
    /// Field name (the type name for embedded fields)
    pub name: String,
    /// Declaring package path; only set for unexported names
    pub package: Option<String>,
    /// Field type
    pub ty: RawType,
    /// Whether the field is embedded
    pub embedded: bool,
    /// Struct tag
    pub tag: Option<String>,
}

/// Struct type: `struct { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StructType {
    /// Fields in declaration order
    pub fields: Vec<RawField>,
}

/// An explicitly declared interface method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawMethod {
    /// Method name
    pub name: String,
    /// Declaring package path; only set for unexported names
    pub package: Option<String>,
    /// Method signature (a [`RawKind::Signature`])
    pub sig: RawType,
}

/// Interface type: `interface { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InterfaceType {
    /// Explicit methods in declaration order
    pub methods: Vec<RawMethod>,
    /// Embedded types in declaration order
    pub embeddeds: Vec<RawType>,
}

/// Function signature. Receivers are not part of a signature's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Signature {
    /// Parameter types; a variadic last parameter is stored as a slice
    pub params: Vec<RawType>,
    /// Result types
    pub results: Vec<RawType>,
    /// Whether the last parameter is variadic
    pub variadic: bool,
}

/// Type parameter of a generic declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParamType {
    /// Parameter name
    pub name: String,
    /// Position in the parameter list
    pub index: u32,
    /// Declaration number of the owning declaration
    pub owner: u32,
    /// Constraint type (an interface)
    pub constraint: RawType,
}

/// The structure behind a [`RawType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawKind {
    /// Predeclared basic type
    Basic(BasicKind),
    /// Named (defined) type or instantiation
    Named(NamedType),
    /// `*T`
    Pointer(RawType),
    /// `[]T`
    Slice(RawType),
    /// `[N]T`
    Array {
        /// Array length
        len: u64,
        /// Element type
        elem: RawType,
    },
    /// `map[K]V`
    Map {
        /// Key type
        key: RawType,
        /// Value type
        value: RawType,
    },
    /// Channel type
    Chan {
        /// Direction
        dir: ChanDir,
        /// Element type
        elem: RawType,
    },
    /// Struct literal type
    Struct(StructType),
    /// Interface literal type
    Interface(InterfaceType),
    /// Function signature
    Signature(Signature),
    /// Type parameter
    TypeParam(TypeParamType),
}

impl RawKind {
    /// Short name of the kind, used in diagnostics and statistics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawKind::Basic(_) => "basic",
            RawKind::Named(_) => "named",
            RawKind::Pointer(_) => "pointer",
            RawKind::Slice(_) => "slice",
            RawKind::Array { .. } => "array",
            RawKind::Map { .. } => "map",
            RawKind::Chan { .. } => "chan",
            RawKind::Struct(_) => "struct",
            RawKind::Interface(_) => "interface",
            RawKind::Signature(_) => "func",
            RawKind::TypeParam(_) => "type parameter",
        }
    }
}

/// Whether an identifier is exported (starts with an upper-case letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

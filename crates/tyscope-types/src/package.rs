//! Packages, resolved objects and the resolver seams

use crate::ast::{AstFile, Expr, Ident, NodeId};
use crate::toolchain::ToolchainInfo;
use crate::ty::RawType;
use crate::universe::TypeUniverse;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Declaration an identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Object {
    /// Type name; `ty` is the declared named type, or the aliased type for aliases
    TypeName { ty: RawType, alias: bool },
    /// Function or method
    Func { sig: RawType },
    /// Variable, parameter or struct field
    Var { ty: RawType },
    /// Constant with its literal value
    Const { ty: RawType, value: String },
    /// Imported package name
    PkgName { path: String },
    /// Type parameter
    TypeParam { ty: RawType },
    /// Predeclared function such as `len`
    Builtin,
    /// The predeclared `nil`
    Nil,
}

impl Object {
    /// Type denoted by or attached to the object.
    pub fn ty(&self) -> Option<RawType> {
        match self {
            Object::TypeName { ty, .. }
            | Object::Var { ty }
            | Object::Const { ty, .. }
            | Object::TypeParam { ty } => Some(*ty),
            Object::Func { sig } => Some(*sig),
            Object::PkgName { .. } | Object::Builtin | Object::Nil => None,
        }
    }
}

/// Maps type expressions to the raw types the checker resolved them to.
pub trait TypeInfoResolver {
    fn type_of(&self, expr: &Expr) -> Option<RawType>;
}

/// Maps identifiers to the declarations they denote.
pub trait ObjectResolver {
    fn object_of(&self, ident: &Ident) -> Option<&Object>;
}

/// Default [`TypeInfoResolver`]: expression node to raw type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfoTable {
    types: FxHashMap<NodeId, RawType>,
}

impl TypeInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeId, ty: RawType) {
        self.types.insert(node, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeInfoResolver for TypeInfoTable {
    fn type_of(&self, expr: &Expr) -> Option<RawType> {
        self.types.get(&expr.id).copied()
    }
}

/// Default [`ObjectResolver`]: identifier node to object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectTable {
    objects: FxHashMap<NodeId, Object>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: NodeId, object: Object) {
        self.objects.insert(node, object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectResolver for ObjectTable {
    fn object_of(&self, ident: &Ident) -> Option<&Object> {
        self.objects.get(&ident.id)
    }
}

/// A parsed and type-checked package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Import path
    pub path: String,
    /// Package clause name
    pub name: String,
    pub files: Vec<AstFile>,
    /// Import paths this package depends on
    pub deps: Vec<String>,
    pub types: TypeInfoTable,
    pub objects: ObjectTable,
}

impl Package {
    pub fn new(path: &str, name: &str) -> Self {
        Package {
            path: path.to_string(),
            name: name.to_string(),
            files: Vec::new(),
            deps: Vec::new(),
            types: TypeInfoTable::new(),
            objects: ObjectTable::new(),
        }
    }
}

/// Whole-program input: the type universe plus every package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub universe: TypeUniverse,
    pub packages: Vec<Package>,
    #[serde(default)]
    pub toolchain: ToolchainInfo,
}

impl Program {
    /// Load a program dumped by a front end.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }
}

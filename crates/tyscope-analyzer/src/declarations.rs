//! Package-level declaration records
//!
//! Records live in one arena per kind and are addressed by dense ids.

use crate::packages::PackageIdx;
use crate::type_info::TypeIdx;
use tyscope_types::{RawType, Span};

macro_rules! decl_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub(crate) u32);

            impl $name {
                pub fn as_u32(self) -> u32 {
                    self.0
                }
            }
        )*
    };
}

decl_id! {
    /// Index of a [`TypeName`]
    TypeNameId,
    /// Index of a [`Function`]
    FunctionId,
    /// Index of a [`Variable`]
    VariableId,
    /// Index of a [`Constant`]
    ConstantId,
    /// Index of an [`Import`]
    ImportId,
}

/// Declaration position: package, file index within it, and span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclPos {
    pub package: PackageIdx,
    pub file: u32,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameKind {
    /// `type A = B`
    Alias,
    /// `type A B`
    Named,
}

/// What the right-hand side of a type declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    /// A type literal such as `struct{...}`
    Literal(TypeIdx),
    /// Another named type
    Reference(TypeIdx),
    /// An instantiation `G[A]`
    Instantiation { instance: TypeIdx, origin: TypeIdx },
}

#[derive(Debug, Clone)]
pub struct TypeName {
    pub name: String,
    pub package: PackageIdx,
    pub kind: TypeNameKind,
    /// The named type declared, or the type an alias denotes
    pub denoting: TypeIdx,
    pub type_params: Vec<RawType>,
    pub source: TypeSource,
    pub doc: Option<String>,
    pub position: DeclPos,
    pub exported: bool,
}

impl TypeName {
    pub fn is_alias(&self) -> bool {
        self.kind == TypeNameKind::Alias
    }
}

/// Receiver of a method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// Named base type
    pub base: TypeIdx,
    pub pointer: bool,
    /// Receiver type parameters, in declaration order
    pub type_params: Vec<RawType>,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub package: PackageIdx,
    pub receiver: Option<Receiver>,
    /// Signature type, receiver excluded
    pub sig: TypeIdx,
    pub param_count: usize,
    pub result_count: usize,
    pub variadic: bool,
    pub doc: Option<String>,
    pub position: DeclPos,
    pub exported: bool,
}

impl Function {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub package: PackageIdx,
    pub ty: TypeIdx,
    pub doc: Option<String>,
    pub position: DeclPos,
    pub exported: bool,
}

#[derive(Debug, Clone)]
pub struct Constant {
    pub name: String,
    pub package: PackageIdx,
    pub ty: TypeIdx,
    pub value: String,
    pub doc: Option<String>,
    pub position: DeclPos,
    pub exported: bool,
}

#[derive(Debug, Clone)]
pub struct Import {
    /// Importing package
    pub package: PackageIdx,
    pub path: String,
    /// Explicit local name, `_` or `.`
    pub local_name: Option<String>,
    pub position: DeclPos,
}

/// Arena of every collected declaration.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    type_names: Vec<TypeName>,
    functions: Vec<Function>,
    variables: Vec<Variable>,
    constants: Vec<Constant>,
    imports: Vec<Import>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type_name(&mut self, type_name: TypeName) -> TypeNameId {
        self.type_names.push(type_name);
        TypeNameId(self.type_names.len() as u32 - 1)
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        self.functions.push(function);
        FunctionId(self.functions.len() as u32 - 1)
    }

    pub fn add_variable(&mut self, variable: Variable) -> VariableId {
        self.variables.push(variable);
        VariableId(self.variables.len() as u32 - 1)
    }

    pub fn add_constant(&mut self, constant: Constant) -> ConstantId {
        self.constants.push(constant);
        ConstantId(self.constants.len() as u32 - 1)
    }

    pub fn add_import(&mut self, import: Import) -> ImportId {
        self.imports.push(import);
        ImportId(self.imports.len() as u32 - 1)
    }

    pub fn type_name(&self, id: TypeNameId) -> Option<&TypeName> {
        self.type_names.get(id.0 as usize)
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.0 as usize)
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0 as usize)
    }

    pub fn constant(&self, id: ConstantId) -> Option<&Constant> {
        self.constants.get(id.0 as usize)
    }

    pub fn import(&self, id: ImportId) -> Option<&Import> {
        self.imports.get(id.0 as usize)
    }

    pub fn type_names(&self) -> &[TypeName] {
        &self.type_names
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

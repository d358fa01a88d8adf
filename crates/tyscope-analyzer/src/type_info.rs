//! Canonical per-type records

use crate::declarations::TypeNameId;
use crate::selector::{Selector, SelectorId};
use rustc_hash::FxHashMap;
use std::fmt;
use tyscope_types::{RawKind, RawType};

/// Dense index of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdx(pub(crate) u32);

impl TypeIdx {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape of a registered type, mirrored from its raw kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic,
    Named,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Struct,
    Interface,
    Signature,
    TypeParam,
}

impl TypeKind {
    pub fn of(kind: &RawKind) -> Self {
        match kind {
            RawKind::Basic(_) => TypeKind::Basic,
            RawKind::Named(_) => TypeKind::Named,
            RawKind::Pointer(_) => TypeKind::Pointer,
            RawKind::Slice(_) => TypeKind::Slice,
            RawKind::Array { .. } => TypeKind::Array,
            RawKind::Map { .. } => TypeKind::Map,
            RawKind::Chan { .. } => TypeKind::Chan,
            RawKind::Struct(_) => TypeKind::Struct,
            RawKind::Interface(_) => TypeKind::Interface,
            RawKind::Signature(_) => TypeKind::Signature,
            RawKind::TypeParam(_) => TypeKind::TypeParam,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Basic => "basic",
            TypeKind::Named => "named",
            TypeKind::Pointer => "pointer",
            TypeKind::Slice => "slice",
            TypeKind::Array => "array",
            TypeKind::Map => "map",
            TypeKind::Chan => "chan",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Signature => "func",
            TypeKind::TypeParam => "type parameter",
        }
    }
}

/// Attribute bits of a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeAttributes(u32);

impl TypeAttributes {
    /// `direct_selectors` is frozen.
    pub const DIRECT_SELECTORS_COLLECTED: TypeAttributes = TypeAttributes(1 << 0);
    /// `all_methods`/`all_fields` are final.
    pub const PROMOTED_SELECTORS_COLLECTED: TypeAttributes = TypeAttributes(1 << 1);
    /// Predeclared type.
    pub const BUILTIN: TypeAttributes = TypeAttributes(1 << 2);
    /// Declared with a type definition.
    pub const DEFINED: TypeAttributes = TypeAttributes(1 << 3);
    pub const COMPARABLE: TypeAttributes = TypeAttributes(1 << 4);
    /// Variadic signature.
    pub const VARIADIC: TypeAttributes = TypeAttributes(1 << 5);
    /// Instantiation of a generic named type.
    pub const INSTANTIATED: TypeAttributes = TypeAttributes(1 << 6);
    /// Direct selectors came from a source literal rather than the raw kind.
    pub const SOURCE_SELECTORS: TypeAttributes = TypeAttributes(1 << 7);

    pub fn empty() -> Self {
        TypeAttributes(0)
    }

    pub fn contains(self, other: TypeAttributes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: TypeAttributes) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TypeAttributes) {
        self.0 &= !other.0;
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for TypeAttributes {
    type Output = TypeAttributes;

    fn bitor(self, rhs: TypeAttributes) -> TypeAttributes {
        TypeAttributes(self.0 | rhs.0)
    }
}

/// An `(implementer, interface)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Implementation {
    pub impler: TypeIdx,
    pub interface: TypeIdx,
}

/// Canonical record of one distinct type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub raw: RawType,
    pub index: TypeIdx,
    pub kind: TypeKind,
    /// Self for unnamed types
    pub underlying: TypeIdx,
    /// Element of a pointer type
    pub pointee: Option<TypeIdx>,
    /// Declaration that introduced this type
    pub type_name: Option<TypeNameId>,
    pub aliases: Vec<TypeNameId>,
    /// Struct fields, explicit interface methods and embeddeds, or declared methods
    pub direct_selectors: Vec<Selector>,
    pub all_methods: Vec<Selector>,
    pub all_fields: Vec<Selector>,
    pub implements: Vec<Implementation>,
    pub implemented_by: Vec<TypeIdx>,
    pub attributes: TypeAttributes,
    /// Scratch tag; only meaningful inside the pass that wrote it
    pub(crate) counter: u32,
    /// Ids of selectors found conflicting on this type
    pub conflicts: Vec<SelectorId>,
    /// Method id to the interfaces that method helps implement
    pub interface_methods: FxHashMap<SelectorId, Vec<TypeIdx>>,
}

impl TypeInfo {
    pub(crate) fn new(raw: RawType, index: TypeIdx, kind: TypeKind) -> Self {
        TypeInfo {
            raw,
            index,
            kind,
            underlying: index,
            pointee: None,
            type_name: None,
            aliases: Vec::new(),
            direct_selectors: Vec::new(),
            all_methods: Vec::new(),
            all_fields: Vec::new(),
            implements: Vec::new(),
            implemented_by: Vec::new(),
            attributes: TypeAttributes::empty(),
            counter: 0,
            conflicts: Vec::new(),
            interface_methods: FxHashMap::default(),
        }
    }

    pub fn has(&self, attr: TypeAttributes) -> bool {
        self.attributes.contains(attr)
    }

    pub fn is_named(&self) -> bool {
        self.kind == TypeKind::Named
    }

    pub fn is_pointer(&self) -> bool {
        self.kind == TypeKind::Pointer
    }

    /// Whether this is an unnamed type, i.e. its own underlying.
    pub fn is_underlying(&self) -> bool {
        self.underlying == self.index
    }

    pub fn direct_selectors_collected(&self) -> bool {
        self.has(TypeAttributes::DIRECT_SELECTORS_COLLECTED)
    }

    pub fn promoted_selectors_collected(&self) -> bool {
        self.has(TypeAttributes::PROMOTED_SELECTORS_COLLECTED)
    }

    /// Direct method selectors.
    pub fn direct_methods(&self) -> impl Iterator<Item = &Selector> + '_ {
        self.direct_selectors.iter().filter(|s| s.is_method())
    }

    /// Find a selector by name among all fields and methods.
    pub fn selector(&self, name: &str) -> Option<&Selector> {
        self.all_fields
            .iter()
            .chain(self.all_methods.iter())
            .find(|s| s.name() == name)
    }
}

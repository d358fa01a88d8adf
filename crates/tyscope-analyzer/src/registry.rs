//! Type registry
//!
//! Canonicalizes raw type handles into [`TypeInfo`] records with dense
//! indices. The registry owns the raw type universe, since registering a
//! named type may need to intern its pointer type.

use crate::type_info::{TypeAttributes, TypeIdx, TypeInfo, TypeKind};
use rustc_hash::FxHashMap;
use tyscope_types::{BasicKind, RawKind, RawType, TypeUniverse};

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    universe: TypeUniverse,

    /// Storage for all records, indexed by [`TypeIdx`]
    types: Vec<TypeInfo>,

    /// Raw handle to record
    lookup: FxHashMap<RawType, TypeIdx>,

    /// Registration is a bug while set
    forbid_register_types: bool,

    /// Types registered while forbidden
    forbidden: Vec<RawType>,
}

impl TypeRegistry {
    pub fn new(universe: TypeUniverse) -> Self {
        TypeRegistry {
            universe,
            types: Vec::new(),
            lookup: FxHashMap::default(),
            forbid_register_types: false,
            forbidden: Vec::new(),
        }
    }

    pub fn universe(&self) -> &TypeUniverse {
        &self.universe
    }

    pub fn universe_mut(&mut self) -> &mut TypeUniverse {
        &mut self.universe
    }

    /// Register a raw type, returning its record index.
    ///
    /// Idempotent. On first registration the underlying type is registered
    /// too, as are the element of a pointer, the components of a signature,
    /// and `*T` for a named type `T` that is neither an interface nor a
    /// pointer at heart.
    pub fn register(&mut self, raw: RawType) -> TypeIdx {
        if let Some(&idx) = self.lookup.get(&raw) {
            return idx;
        }

        if self.forbid_register_types {
            tracing::error!(ty = %self.universe.display(raw), "type registered during implementation search");
            self.forbidden.push(raw);
        }

        let kind = match self.universe.get(raw) {
            Some(kind) => kind.clone(),
            None => RawKind::Basic(BasicKind::Invalid),
        };
        let idx = TypeIdx(self.types.len() as u32);
        self.types.push(TypeInfo::new(raw, idx, TypeKind::of(&kind)));
        // inserted before recursing so cyclic references terminate
        self.lookup.insert(raw, idx);

        let underlying_raw = self.universe.underlying(raw);
        if underlying_raw != raw {
            let underlying = self.register(underlying_raw);
            self.types[idx.index()].underlying = underlying;
        }

        let mut attributes = TypeAttributes::empty();
        match &kind {
            RawKind::Basic(_) => attributes.insert(TypeAttributes::BUILTIN),
            RawKind::Named(named) => {
                attributes.insert(TypeAttributes::DEFINED);
                if named.package.is_none() {
                    attributes.insert(TypeAttributes::BUILTIN);
                }
                if named.origin.is_some() {
                    attributes.insert(TypeAttributes::INSTANTIATED);
                }
            }
            RawKind::Signature(sig) if sig.variadic => attributes.insert(TypeAttributes::VARIADIC),
            _ => {}
        }
        if self.universe.comparable(raw) {
            attributes.insert(TypeAttributes::COMPARABLE);
        }
        self.types[idx.index()].attributes.insert(attributes);

        match kind {
            RawKind::Pointer(elem) => {
                let pointee = self.register(elem);
                self.types[idx.index()].pointee = Some(pointee);
            }
            RawKind::Signature(sig) => {
                for ty in sig.params.iter().chain(sig.results.iter()) {
                    self.register(*ty);
                }
            }
            RawKind::Named(_) => {
                let underlying_kind = self.universe.get(underlying_raw).map(TypeKind::of);
                if !matches!(
                    underlying_kind,
                    Some(TypeKind::Interface) | Some(TypeKind::Pointer)
                ) {
                    let ptr = self.universe.pointer_to(raw);
                    self.register(ptr);
                }
            }
            _ => {}
        }

        idx
    }

    /// Look up a raw type without registering it.
    pub fn lookup(&self, raw: RawType) -> Option<TypeIdx> {
        self.lookup.get(&raw).copied()
    }

    pub fn get(&self, idx: TypeIdx) -> Option<&TypeInfo> {
        self.types.get(idx.index())
    }

    pub fn get_mut(&mut self, idx: TypeIdx) -> Option<&mut TypeInfo> {
        self.types.get_mut(idx.index())
    }

    /// Record by index; indices are only handed out by this registry.
    pub(crate) fn info(&self, idx: TypeIdx) -> &TypeInfo {
        &self.types[idx.index()]
    }

    pub(crate) fn info_mut(&mut self, idx: TypeIdx) -> &mut TypeInfo {
        &mut self.types[idx.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> + '_ {
        self.types.iter()
    }

    pub fn indices(&self) -> impl Iterator<Item = TypeIdx> {
        (0..self.types.len() as u32).map(TypeIdx)
    }

    /// Record of `*t`, if registered.
    pub fn pointer_of(&self, idx: TypeIdx) -> Option<TypeIdx> {
        let raw = self.get(idx)?.raw;
        let ptr = self.universe.lookup(&RawKind::Pointer(raw))?;
        self.lookup(ptr)
    }

    /// Whether the type's underlying is an interface.
    pub fn is_interface(&self, idx: TypeIdx) -> bool {
        self.get(idx)
            .and_then(|t| self.get(t.underlying))
            .map_or(false, |u| u.kind == TypeKind::Interface)
    }

    /// Whether the type is an instantiation of a generic named type.
    pub fn is_instantiated(&self, idx: TypeIdx) -> bool {
        self.get(idx)
            .map_or(false, |t| t.has(TypeAttributes::INSTANTIATED))
    }

    /// Generic origin of an instantiation, if registered.
    pub fn origin_of(&self, idx: TypeIdx) -> Option<TypeIdx> {
        let raw = self.get(idx)?.raw;
        self.universe.origin_of(raw).and_then(|o| self.lookup(o))
    }

    pub fn display(&self, idx: TypeIdx) -> String {
        match self.get(idx) {
            Some(info) => self.universe.display(info.raw),
            None => idx.to_string(),
        }
    }

    pub fn set_forbid_register_types(&mut self, forbid: bool) {
        self.forbid_register_types = forbid;
    }

    /// Types registered while registration was forbidden.
    pub fn forbidden_registrations(&self) -> &[RawType] {
        &self.forbidden
    }

    /// Drop every record, keeping the universe.
    pub fn reset(&mut self) {
        self.types.clear();
        self.lookup.clear();
        self.forbid_register_types = false;
        self.forbidden.clear();
    }
}

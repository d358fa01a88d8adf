//! Type universe for interning raw types
//!
//! Plays the role of the external type checker's type store. Unnamed types
//! are hash-consed, so structurally identical literals share one handle; named
//! types carry a declaration number so same-named declarations stay distinct.

use crate::error::TypeError;
use crate::ty::{
    BasicKind, ChanDir, InterfaceType, NamedType, RawField, RawKind, RawMethod, RawType,
    Signature, StructType, TypeParamType,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Store of every raw type in a program.
///
/// This uses type interning to ensure that identical types have the same
/// [`RawType`], which makes handles usable as plain map keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "UniverseRepr", into = "UniverseRepr")]
pub struct TypeUniverse {
    /// Storage for all kinds, indexed by handle
    types: Vec<RawKind>,

    /// Reverse mapping from kind to handle for interning
    type_to_id: FxHashMap<RawKind, RawType>,

    /// Declared underlying of named types, indexed by handle
    underlyings: Vec<Option<RawType>>,

    /// Next declaration number
    next_decl: u32,

    /// Instances created before their origin had a body: `(origin, instance)`
    pending: Vec<(RawType, RawType)>,
}

/// Serialized form; the reverse index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct UniverseRepr {
    types: Vec<RawKind>,
    underlyings: Vec<Option<RawType>>,
    next_decl: u32,
    #[serde(default)]
    pending: Vec<(RawType, RawType)>,
}

impl From<UniverseRepr> for TypeUniverse {
    fn from(repr: UniverseRepr) -> Self {
        let type_to_id = repr
            .types
            .iter()
            .enumerate()
            .map(|(i, kind)| (kind.clone(), RawType(i as u32)))
            .collect();
        let mut underlyings = repr.underlyings;
        underlyings.resize(repr.types.len(), None);
        TypeUniverse {
            types: repr.types,
            type_to_id,
            underlyings,
            next_decl: repr.next_decl,
            pending: repr.pending,
        }
    }
}

impl From<TypeUniverse> for UniverseRepr {
    fn from(universe: TypeUniverse) -> Self {
        UniverseRepr {
            types: universe.types,
            underlyings: universe.underlyings,
            next_decl: universe.next_decl,
            pending: universe.pending,
        }
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    /// Create a universe with every basic type pre-interned.
    pub fn new() -> Self {
        let mut universe = TypeUniverse {
            types: Vec::new(),
            type_to_id: FxHashMap::default(),
            underlyings: Vec::new(),
            next_decl: 0,
            pending: Vec::new(),
        };
        for kind in BasicKind::ALL {
            universe.intern(RawKind::Basic(kind));
        }
        universe
    }

    /// Intern a kind, returning its handle.
    ///
    /// If the kind already exists, returns the existing handle.
    pub fn intern(&mut self, kind: RawKind) -> RawType {
        if let Some(&id) = self.type_to_id.get(&kind) {
            return id;
        }

        let id = RawType(self.types.len() as u32);
        self.types.push(kind.clone());
        self.underlyings.push(None);
        self.type_to_id.insert(kind, id);
        id
    }

    /// Get a kind by its handle.
    pub fn get(&self, ty: RawType) -> Option<&RawKind> {
        self.types.get(ty.index())
    }

    /// Get a kind by its handle, failing on foreign handles.
    pub fn kind(&self, ty: RawType) -> Result<&RawKind, TypeError> {
        self.get(ty)
            .ok_or(TypeError::UnknownHandle { handle: ty.as_u32() })
    }

    /// Look up a kind's handle without interning.
    pub fn lookup(&self, kind: &RawKind) -> Option<RawType> {
        self.type_to_id.get(kind).copied()
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all handles in interning order.
    pub fn handles(&self) -> impl Iterator<Item = RawType> + '_ {
        (0..self.types.len() as u32).map(RawType)
    }

    // ============================================================================
    // Constructors
    // ============================================================================

    /// Handle of a basic type.
    pub fn basic(&self, kind: BasicKind) -> RawType {
        // pre-interned in declaration order
        RawType(kind as u32)
    }

    /// Allocate a fresh declaration number.
    pub fn fresh_decl(&mut self) -> u32 {
        let decl = self.next_decl;
        self.next_decl += 1;
        decl
    }

    /// Declare a named type whose body is set later with [`set_underlying`](Self::set_underlying).
    pub fn declare_named(&mut self, name: &str, package: Option<&str>) -> RawType {
        let decl = self.fresh_decl();
        self.intern(RawKind::Named(NamedType {
            name: name.to_string(),
            package: package.map(str::to_string),
            decl,
            type_params: Vec::new(),
            type_args: Vec::new(),
            origin: None,
        }))
    }

    /// Declare a generic named type.
    ///
    /// `params` lists `(name, constraint)` pairs. The returned parameter
    /// handles are the ones the body should refer to.
    pub fn declare_generic(
        &mut self,
        name: &str,
        package: Option<&str>,
        params: &[(&str, RawType)],
    ) -> (RawType, Vec<RawType>) {
        let decl = self.fresh_decl();
        let type_params: Vec<RawType> = params
            .iter()
            .enumerate()
            .map(|(i, (pname, constraint))| self.type_param(decl, pname, i as u32, *constraint))
            .collect();
        let named = self.intern(RawKind::Named(NamedType {
            name: name.to_string(),
            package: package.map(str::to_string),
            decl,
            type_params: type_params.clone(),
            type_args: Vec::new(),
            origin: None,
        }));
        (named, type_params)
    }

    /// Intern a type parameter owned by declaration `owner`.
    pub fn type_param(&mut self, owner: u32, name: &str, index: u32, constraint: RawType) -> RawType {
        self.intern(RawKind::TypeParam(TypeParamType {
            name: name.to_string(),
            index,
            owner,
            constraint,
        }))
    }

    /// Set the body of a named type.
    ///
    /// Instances of a generic type that were created before its body was
    /// known get their substituted bodies here.
    pub fn set_underlying(&mut self, named: RawType, underlying: RawType) -> Result<(), TypeError> {
        if !self.is_named(named) {
            return Err(TypeError::NotNamed {
                display: self.display(named),
            });
        }
        self.kind(underlying)?;
        self.underlyings[named.index()] = Some(underlying);

        let (ready, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(origin, _)| *origin == named);
        self.pending = waiting;
        for (origin, instance) in ready {
            self.fill_instance(origin, instance)?;
        }
        Ok(())
    }

    /// `*elem`.
    pub fn pointer_to(&mut self, elem: RawType) -> RawType {
        self.intern(RawKind::Pointer(elem))
    }

    /// `[]elem`.
    pub fn slice_of(&mut self, elem: RawType) -> RawType {
        self.intern(RawKind::Slice(elem))
    }

    /// `[len]elem`.
    pub fn array_of(&mut self, len: u64, elem: RawType) -> RawType {
        self.intern(RawKind::Array { len, elem })
    }

    /// `map[key]value`.
    pub fn map_of(&mut self, key: RawType, value: RawType) -> RawType {
        self.intern(RawKind::Map { key, value })
    }

    /// Channel of `elem`.
    pub fn chan_of(&mut self, dir: ChanDir, elem: RawType) -> RawType {
        self.intern(RawKind::Chan { dir, elem })
    }

    /// Struct literal type.
    pub fn struct_of(&mut self, fields: Vec<RawField>) -> RawType {
        self.intern(RawKind::Struct(StructType { fields }))
    }

    /// Interface literal type.
    pub fn interface_of(&mut self, methods: Vec<RawMethod>, embeddeds: Vec<RawType>) -> RawType {
        self.intern(RawKind::Interface(InterfaceType { methods, embeddeds }))
    }

    /// `interface{}`.
    pub fn empty_interface(&mut self) -> RawType {
        self.interface_of(Vec::new(), Vec::new())
    }

    /// Function signature; a variadic last parameter must already be a slice.
    pub fn signature(&mut self, params: Vec<RawType>, results: Vec<RawType>, variadic: bool) -> RawType {
        self.intern(RawKind::Signature(Signature {
            params,
            results,
            variadic,
        }))
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Named type record, if `ty` is named.
    pub fn named(&self, ty: RawType) -> Option<&NamedType> {
        match self.get(ty) {
            Some(RawKind::Named(named)) => Some(named),
            _ => None,
        }
    }

    /// Underlying type: the structural form with every named layer stripped.
    ///
    /// Unnamed types are their own underlying. A named type whose body is
    /// not set yet is returned unchanged.
    pub fn underlying(&self, ty: RawType) -> RawType {
        self.try_underlying(ty).unwrap_or(ty)
    }

    /// Underlying type, failing when a named body is missing.
    pub fn try_underlying(&self, ty: RawType) -> Result<RawType, TypeError> {
        let mut current = ty;
        // named-to-named chains are finite in a well-formed universe
        for _ in 0..=self.types.len() {
            match self.kind(current)? {
                RawKind::Named(named) => match self.underlyings[current.index()] {
                    Some(next) => current = next,
                    None => {
                        return Err(TypeError::UnderlyingNotSet {
                            name: named.name.clone(),
                        })
                    }
                },
                _ => return Ok(current),
            }
        }
        Err(TypeError::UnderlyingNotSet {
            name: self.display(ty),
        })
    }

    /// Whether the underlying type is an interface.
    pub fn is_interface(&self, ty: RawType) -> bool {
        matches!(self.get(self.underlying(ty)), Some(RawKind::Interface(_)))
    }

    /// Whether `ty` is a pointer type literal.
    pub fn is_pointer(&self, ty: RawType) -> bool {
        matches!(self.get(ty), Some(RawKind::Pointer(_)))
    }

    /// Whether `ty` is a named type (declared or instantiated).
    pub fn is_named(&self, ty: RawType) -> bool {
        matches!(self.get(ty), Some(RawKind::Named(_)))
    }

    /// Whether `ty` is an instantiation of a generic named type.
    pub fn is_instantiated(&self, ty: RawType) -> bool {
        self.origin_of(ty).is_some()
    }

    /// Generic origin of an instantiation.
    pub fn origin_of(&self, ty: RawType) -> Option<RawType> {
        self.named(ty).and_then(|named| named.origin)
    }

    /// Element of a pointer type.
    pub fn pointee(&self, ty: RawType) -> Option<RawType> {
        match self.get(ty) {
            Some(RawKind::Pointer(elem)) => Some(*elem),
            _ => None,
        }
    }

    /// Whether values of the type can be compared with `==`.
    pub fn comparable(&self, ty: RawType) -> bool {
        match self.get(self.underlying(ty)) {
            Some(RawKind::Basic(kind)) => *kind != BasicKind::Invalid,
            Some(RawKind::Pointer(_))
            | Some(RawKind::Chan { .. })
            | Some(RawKind::Interface(_))
            | Some(RawKind::TypeParam(_)) => true,
            Some(RawKind::Array { elem, .. }) => self.comparable(*elem),
            Some(RawKind::Struct(st)) => st.fields.iter().all(|f| self.comparable(f.ty)),
            Some(RawKind::Slice(_))
            | Some(RawKind::Map { .. })
            | Some(RawKind::Signature(_))
            | Some(RawKind::Named(_))
            | None => false,
        }
    }

    // ============================================================================
    // Generics
    // ============================================================================

    /// Instantiate a generic named type with type arguments.
    ///
    /// Instantiating an origin with its own type parameters yields the origin.
    pub fn instantiate(&mut self, origin: RawType, args: Vec<RawType>) -> Result<RawType, TypeError> {
        let named = match self.kind(origin)? {
            RawKind::Named(named) if named.origin.is_none() => named.clone(),
            _ => {
                return Err(TypeError::NotGeneric {
                    name: self.display(origin),
                })
            }
        };
        if named.type_params.is_empty() {
            return Err(TypeError::NotGeneric { name: named.name });
        }
        if named.type_params.len() != args.len() {
            return Err(TypeError::InvalidTypeArgCount {
                name: named.name,
                expected: named.type_params.len(),
                actual: args.len(),
            });
        }
        if named.type_params == args {
            return Ok(origin);
        }

        let before = self.types.len();
        let instance = self.intern(RawKind::Named(NamedType {
            name: named.name,
            package: named.package,
            decl: named.decl,
            type_params: Vec::new(),
            type_args: args,
            origin: Some(origin),
        }));
        if self.types.len() > before {
            // interned before substituting so recursive references terminate
            if self.underlyings[origin.index()].is_some() {
                self.fill_instance(origin, instance)?;
            } else {
                self.pending.push((origin, instance));
            }
        }
        Ok(instance)
    }

    fn fill_instance(&mut self, origin: RawType, instance: RawType) -> Result<(), TypeError> {
        let params = match self.kind(origin)? {
            RawKind::Named(named) => named.type_params.clone(),
            _ => return Ok(()),
        };
        let args = match self.kind(instance)? {
            RawKind::Named(named) => named.type_args.clone(),
            _ => return Ok(()),
        };
        let map: FxHashMap<RawType, RawType> = params.into_iter().zip(args).collect();
        let body = self.try_underlying(origin)?;
        let substituted = self.substitute(body, &map)?;
        self.underlyings[instance.index()] = Some(substituted);
        Ok(())
    }

    /// Replace type parameters according to `map`.
    ///
    /// Named types are not expanded; only their type arguments are rewritten.
    pub fn substitute(
        &mut self,
        ty: RawType,
        map: &FxHashMap<RawType, RawType>,
    ) -> Result<RawType, TypeError> {
        if let Some(&to) = map.get(&ty) {
            return Ok(to);
        }
        if map.is_empty() {
            return Ok(ty);
        }
        let kind = self.kind(ty)?.clone();
        let result = match kind {
            RawKind::Basic(_) | RawKind::TypeParam(_) => ty,
            RawKind::Named(named) => match named.origin {
                Some(origin) => {
                    let args = self.substitute_all(&named.type_args, map)?;
                    if args == named.type_args {
                        ty
                    } else {
                        self.instantiate(origin, args)?
                    }
                }
                // a generic origin named inside its own body stands for Origin[params]
                None if !named.type_params.is_empty()
                    && named.type_params.iter().any(|p| map.contains_key(p)) =>
                {
                    let args = self.substitute_all(&named.type_params, map)?;
                    self.instantiate(ty, args)?
                }
                None => ty,
            },
            RawKind::Pointer(elem) => {
                let elem = self.substitute(elem, map)?;
                self.pointer_to(elem)
            }
            RawKind::Slice(elem) => {
                let elem = self.substitute(elem, map)?;
                self.slice_of(elem)
            }
            RawKind::Array { len, elem } => {
                let elem = self.substitute(elem, map)?;
                self.array_of(len, elem)
            }
            RawKind::Map { key, value } => {
                let key = self.substitute(key, map)?;
                let value = self.substitute(value, map)?;
                self.map_of(key, value)
            }
            RawKind::Chan { dir, elem } => {
                let elem = self.substitute(elem, map)?;
                self.chan_of(dir, elem)
            }
            RawKind::Struct(st) => {
                let mut fields = Vec::with_capacity(st.fields.len());
                for field in st.fields {
                    let ty = self.substitute(field.ty, map)?;
                    fields.push(RawField { ty, ..field });
                }
                self.struct_of(fields)
            }
            RawKind::Interface(it) => {
                let mut methods = Vec::with_capacity(it.methods.len());
                for method in it.methods {
                    let sig = self.substitute(method.sig, map)?;
                    methods.push(RawMethod { sig, ..method });
                }
                let embeddeds = self.substitute_all(&it.embeddeds, map)?;
                self.interface_of(methods, embeddeds)
            }
            RawKind::Signature(sig) => {
                let params = self.substitute_all(&sig.params, map)?;
                let results = self.substitute_all(&sig.results, map)?;
                self.signature(params, results, sig.variadic)
            }
        };
        Ok(result)
    }

    fn substitute_all(
        &mut self,
        types: &[RawType],
        map: &FxHashMap<RawType, RawType>,
    ) -> Result<Vec<RawType>, TypeError> {
        types.iter().map(|&ty| self.substitute(ty, map)).collect()
    }

    // ============================================================================
    // Display
    // ============================================================================

    /// Render a type the way it is spelled in source.
    pub fn display(&self, ty: RawType) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: RawType) {
        let Some(kind) = self.get(ty) else {
            out.push_str(&ty.to_string());
            return;
        };
        match kind {
            RawKind::Basic(kind) => out.push_str(&kind.to_string()),
            RawKind::Named(named) => {
                if let Some(pkg) = &named.package {
                    out.push_str(pkg.rsplit('/').next().unwrap_or(pkg));
                    out.push('.');
                }
                out.push_str(&named.name);
                if !named.type_args.is_empty() {
                    self.write_list(out, '[', &named.type_args, ']');
                }
            }
            RawKind::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem);
            }
            RawKind::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem);
            }
            RawKind::Array { len, elem } => {
                out.push_str(&format!("[{}]", len));
                self.write_type(out, *elem);
            }
            RawKind::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key);
                out.push(']');
                self.write_type(out, *value);
            }
            RawKind::Chan { dir, elem } => {
                out.push_str(&dir.to_string());
                out.push(' ');
                self.write_type(out, *elem);
            }
            RawKind::Struct(st) => {
                out.push_str("struct{");
                for (i, field) in st.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    self.write_type(out, field.ty);
                }
                out.push('}');
            }
            RawKind::Interface(it) => {
                out.push_str("interface{");
                let mut first = true;
                for method in &it.methods {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    out.push_str(&method.name);
                    self.write_signature(out, method.sig);
                }
                for embedded in &it.embeddeds {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    self.write_type(out, *embedded);
                }
                out.push('}');
            }
            RawKind::Signature(_) => {
                out.push_str("func");
                self.write_signature(out, ty);
            }
            RawKind::TypeParam(param) => out.push_str(&param.name),
        }
    }

    fn write_signature(&self, out: &mut String, sig: RawType) {
        let Some(RawKind::Signature(sig)) = self.get(sig) else {
            out.push_str("()");
            return;
        };
        out.push('(');
        for (i, &param) in sig.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let last = i + 1 == sig.params.len();
            match self.get(param) {
                Some(RawKind::Slice(elem)) if sig.variadic && last => {
                    out.push_str("...");
                    self.write_type(out, *elem);
                }
                _ => self.write_type(out, param),
            }
        }
        out.push(')');
        match sig.results.len() {
            0 => {}
            1 => {
                out.push(' ');
                self.write_type(out, sig.results[0]);
            }
            _ => {
                out.push(' ');
                self.write_list(out, '(', &sig.results, ')');
            }
        }
    }

    fn write_list(&self, out: &mut String, open: char, types: &[RawType], close: char) {
        out.push(open);
        for (i, &ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, ty);
        }
        out.push(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: RawType) -> RawField {
        RawField {
            name: name.to_string(),
            package: None,
            ty,
            embedded: false,
            tag: None,
        }
    }

    #[test]
    fn test_basic_types_are_preinterned() {
        let universe = TypeUniverse::new();
        assert_eq!(universe.len(), BasicKind::ALL.len());
        for kind in BasicKind::ALL {
            let ty = universe.basic(kind);
            assert_eq!(universe.get(ty), Some(&RawKind::Basic(kind)));
        }
    }

    #[test]
    fn test_unnamed_types_are_hash_consed() {
        let mut universe = TypeUniverse::new();
        let int = universe.basic(BasicKind::Int);
        let a = universe.slice_of(int);
        let b = universe.slice_of(int);
        assert_eq!(a, b);

        let s1 = universe.struct_of(vec![field("x", int)]);
        let s2 = universe.struct_of(vec![field("x", int)]);
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_same_named_declarations_stay_distinct() {
        let mut universe = TypeUniverse::new();
        let a = universe.declare_named("T", Some("p"));
        let b = universe.declare_named("T", Some("p"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_underlying_follows_named_chain() {
        let mut universe = TypeUniverse::new();
        let a = universe.declare_named("A", Some("p"));
        let b = universe.declare_named("B", Some("p"));
        let int = universe.basic(BasicKind::Int);
        // type A B; type B int
        universe.set_underlying(a, b).unwrap();
        assert!(universe.try_underlying(a).is_err());
        universe.set_underlying(b, int).unwrap();
        assert_eq!(universe.underlying(a), int);
        assert_eq!(universe.underlying(int), int);
    }

    #[test]
    fn test_instantiate_substitutes_body() {
        let mut universe = TypeUniverse::new();
        let any = universe.empty_interface();
        let (list, params) = universe.declare_generic("List", Some("p"), &[("T", any)]);
        let t = params[0];
        let self_ref = universe.instantiate(list, vec![t]).unwrap();
        assert_eq!(self_ref, list);
        let next = universe.pointer_to(list);
        let body = universe.struct_of(vec![field("v", t), field("next", next)]);
        universe.set_underlying(list, body).unwrap();

        let int = universe.basic(BasicKind::Int);
        let list_int = universe.instantiate(list, vec![int]).unwrap();
        assert!(universe.is_instantiated(list_int));
        assert_eq!(universe.origin_of(list_int), Some(list));
        assert_eq!(universe.instantiate(list, vec![int]).unwrap(), list_int);

        let RawKind::Struct(st) = universe.get(universe.underlying(list_int)).unwrap().clone() else {
            panic!("expected struct body");
        };
        assert_eq!(st.fields[0].ty, int);
        let next_int = universe.pointer_to(list_int);
        assert_eq!(st.fields[1].ty, next_int);
    }

    #[test]
    fn test_pending_instance_filled_when_body_arrives() {
        let mut universe = TypeUniverse::new();
        let any = universe.empty_interface();
        let (boxed, _) = universe.declare_generic("Box", Some("p"), &[("T", any)]);
        let string = universe.basic(BasicKind::String);
        let inst = universe.instantiate(boxed, vec![string]).unwrap();
        assert!(universe.try_underlying(inst).is_err());

        let param = universe.named(boxed).unwrap().type_params[0];
        let body = universe.struct_of(vec![field("v", param)]);
        universe.set_underlying(boxed, body).unwrap();
        let expected = universe.struct_of(vec![field("v", string)]);
        assert_eq!(universe.underlying(inst), expected);
    }

    #[test]
    fn test_instantiate_errors() {
        let mut universe = TypeUniverse::new();
        let plain = universe.declare_named("P", None);
        let int = universe.basic(BasicKind::Int);
        assert!(matches!(
            universe.instantiate(plain, vec![int]),
            Err(TypeError::NotGeneric { .. })
        ));
        let any = universe.empty_interface();
        let (generic, _) = universe.declare_generic("G", None, &[("A", any), ("B", any)]);
        assert!(matches!(
            universe.instantiate(generic, vec![int]),
            Err(TypeError::InvalidTypeArgCount { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_comparable() {
        let mut universe = TypeUniverse::new();
        let int = universe.basic(BasicKind::Int);
        let slice = universe.slice_of(int);
        let with_slice = universe.struct_of(vec![field("s", slice)]);
        let with_int = universe.struct_of(vec![field("i", int)]);
        assert!(universe.comparable(int));
        assert!(!universe.comparable(slice));
        assert!(!universe.comparable(with_slice));
        assert!(universe.comparable(with_int));
    }

    #[test]
    fn test_display() {
        let mut universe = TypeUniverse::new();
        let int = universe.basic(BasicKind::Int);
        let string = universe.basic(BasicKind::String);
        let named = universe.declare_named("Reader", Some("example.com/io"));
        let ptr = universe.pointer_to(named);
        let variadic = universe.slice_of(string);
        let sig = universe.signature(vec![int, variadic], vec![int, string], true);
        let map = universe.map_of(string, ptr);
        assert_eq!(universe.display(ptr), "*io.Reader");
        assert_eq!(universe.display(sig), "func(int, ...string) (int, string)");
        assert_eq!(universe.display(map), "map[string]*io.Reader");
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let mut universe = TypeUniverse::new();
        let int = universe.basic(BasicKind::Int);
        let slice = universe.slice_of(int);
        let json = serde_json::to_string(&universe).unwrap();
        let mut loaded: TypeUniverse = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), universe.len());
        assert_eq!(loaded.slice_of(int), slice);
    }
}

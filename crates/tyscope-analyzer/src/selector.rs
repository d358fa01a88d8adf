//! Selectors: fields and methods reachable through `x.sel`

use crate::declarations::{DeclPos, FunctionId};
use crate::packages::PackageIdx;
use crate::type_info::TypeIdx;
use std::fmt;
use tyscope_types::is_exported;

/// How a field is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedMode {
    /// Regular named field
    None,
    /// Embedded as `T`
    Direct,
    /// Embedded as `*T`
    Indirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorCond {
    Normal,
    /// Shadowed or colliding; not accessible
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declaring package, recorded for unexported names
    pub package: Option<PackageIdx>,
    pub name: String,
    pub ty: TypeIdx,
    pub tag: Option<String>,
    pub mode: EmbedMode,
    pub position: Option<DeclPos>,
    pub doc: Option<String>,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.mode != EmbedMode::None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Declaring package, recorded for unexported names
    pub package: Option<PackageIdx>,
    pub name: String,
    /// Signature type
    pub ty: TypeIdx,
    pub pointer_recv: bool,
    /// Declaration, absent for interface methods
    pub function: Option<FunctionId>,
    pub position: Option<DeclPos>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorKind {
    Field(Field),
    Method(Method),
}

/// Stable selector identity.
///
/// Exported names are their own id; unexported names are qualified with
/// the declaring package path, so `p.x` and `q.x` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(String);

impl SelectorId {
    pub fn new(name: &str, package_path: Option<&str>) -> Self {
        match package_path {
            Some(path) if !is_exported(name) => SelectorId(format!("{}.{}", path, name)),
            _ => SelectorId(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle into a [`ChainArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(u32);

/// A reachable member `x.sel`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub id: SelectorId,
    pub kind: SelectorKind,
    /// Embedded fields crossed, innermost first; `None` at depth 0
    pub chain: Option<ChainId>,
    pub depth: u16,
    /// The chain crossed a pointer embedding
    pub indirect: bool,
    pub cond: SelectorCond,
}

impl Selector {
    pub fn field(id: SelectorId, field: Field) -> Self {
        Selector {
            id,
            kind: SelectorKind::Field(field),
            chain: None,
            depth: 0,
            indirect: false,
            cond: SelectorCond::Normal,
        }
    }

    pub fn method(id: SelectorId, method: Method) -> Self {
        Selector {
            id,
            kind: SelectorKind::Method(method),
            chain: None,
            depth: 0,
            indirect: false,
            cond: SelectorCond::Normal,
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, SelectorKind::Field(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SelectorKind::Method(_))
    }

    pub fn as_field(&self) -> Option<&Field> {
        match &self.kind {
            SelectorKind::Field(field) => Some(field),
            SelectorKind::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match &self.kind {
            SelectorKind::Method(method) => Some(method),
            SelectorKind::Field(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            SelectorKind::Field(field) => &field.name,
            SelectorKind::Method(method) => &method.name,
        }
    }

    pub fn is_exported(&self) -> bool {
        is_exported(self.name())
    }

    /// Type of the field, or signature of the method.
    pub fn ty(&self) -> TypeIdx {
        match &self.kind {
            SelectorKind::Field(field) => field.ty,
            SelectorKind::Method(method) => method.ty,
        }
    }

    pub fn position(&self) -> Option<&DeclPos> {
        match &self.kind {
            SelectorKind::Field(field) => field.position.as_ref(),
            SelectorKind::Method(method) => method.position.as_ref(),
        }
    }

    /// Embedded field this selector can be expanded through.
    pub fn embedded_field(&self) -> Option<&Field> {
        self.as_field().filter(|f| f.is_embedded())
    }

    pub fn is_hidden(&self) -> bool {
        self.cond == SelectorCond::Hidden
    }

    /// A pointer-receiver method reached without crossing a pointer.
    ///
    /// Such methods belong to the method set of `*T` only.
    pub fn pointer_receiver_only(&self) -> bool {
        match &self.kind {
            SelectorKind::Method(method) => method.pointer_recv && !self.indirect,
            SelectorKind::Field(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
struct ChainNode {
    field: Field,
    next: Option<ChainId>,
}

/// Arena of embedding chains.
///
/// Chains are persistent cons lists, so promoted selectors sharing a
/// prefix share its nodes.
#[derive(Debug, Clone, Default)]
pub struct ChainArena {
    nodes: Vec<ChainNode>,
}

impl ChainArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `field` to `next`.
    pub fn cons(&mut self, field: Field, next: Option<ChainId>) -> ChainId {
        let id = ChainId(self.nodes.len() as u32);
        self.nodes.push(ChainNode { field, next });
        id
    }

    /// Number of fields in the chain.
    pub fn len(&self, chain: Option<ChainId>) -> usize {
        self.iter(chain).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes across all chains.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Fields innermost first.
    pub fn iter(&self, chain: Option<ChainId>) -> impl Iterator<Item = &Field> + '_ {
        let mut current = chain;
        std::iter::from_fn(move || {
            let node = self.nodes.get(current?.0 as usize)?;
            current = node.next;
            Some(&node.field)
        })
    }

    /// Fields outermost first, the order a selector expression spells them.
    pub fn fields_forward(&self, chain: Option<ChainId>) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.iter(chain).collect();
        fields.reverse();
        fields
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, mode: EmbedMode) -> Field {
        Field {
            package: None,
            name: name.to_string(),
            ty: TypeIdx(0),
            tag: None,
            mode,
            position: None,
            doc: None,
        }
    }

    #[test]
    fn test_selector_ids() {
        assert_eq!(SelectorId::new("Read", Some("io")).as_str(), "Read");
        assert_eq!(SelectorId::new("read", Some("io")).as_str(), "io.read");
        assert_ne!(SelectorId::new("x", Some("p")), SelectorId::new("x", Some("q")));
    }

    #[test]
    fn test_chain_order() {
        let mut arena = ChainArena::new();
        let outer = arena.cons(field("A", EmbedMode::Direct), None);
        let inner = arena.cons(field("B", EmbedMode::Indirect), Some(outer));
        assert_eq!(arena.len(Some(inner)), 2);
        assert_eq!(arena.len(None), 0);
        let names: Vec<_> = arena.fields_forward(Some(inner)).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_pointer_receiver_only() {
        let method = Method {
            package: None,
            name: "Set".to_string(),
            ty: TypeIdx(1),
            pointer_recv: true,
            function: None,
            position: None,
            doc: None,
        };
        let mut sel = Selector::method(SelectorId::new("Set", None), method);
        assert!(sel.pointer_receiver_only());
        sel.indirect = true;
        assert!(!sel.pointer_receiver_only());
    }
}

//! Selector resolution
//!
//! Computes `all_methods` and `all_fields` for every registered type.
//! Interfaces go first: their method sets are the union of explicit and
//! embedded methods, which struct promotion then reads. Everything else is
//! promoted breadth-first over embedding chains, applying the shadowing and
//! collision rules.

use crate::error::{ConflictKind, SelectorConflict};
use crate::registry::TypeRegistry;
use crate::selector::{ChainArena, Selector, SelectorCond, SelectorId};
use crate::type_info::{TypeAttributes, TypeIdx, TypeKind};
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct SelectorResolver<'a> {
    registry: &'a mut TypeRegistry,
    chains: &'a mut ChainArena,
    conflicts: Vec<SelectorConflict>,

    /// Visit tag for the interface pass; a type whose counter equals the
    /// current round is on the stack or was already seen this round
    round: u32,
}

impl<'a> SelectorResolver<'a> {
    pub fn new(registry: &'a mut TypeRegistry, chains: &'a mut ChainArena) -> Self {
        SelectorResolver {
            registry,
            chains,
            conflicts: Vec::new(),
            round: 0,
        }
    }

    /// Resolve every type, returning the conflicts found on the way.
    pub fn run(mut self) -> Vec<SelectorConflict> {
        self.resolve_interfaces();
        self.resolve_others();
        tracing::debug!(
            chains = self.chains.node_count(),
            conflicts = self.conflicts.len(),
            "selectors collected"
        );
        self.conflicts
    }

    fn resolve_interfaces(&mut self) {
        let literals: Vec<TypeIdx> = self
            .registry
            .indices()
            .filter(|&i| self.registry.info(i).kind == TypeKind::Interface)
            .collect();

        let mut cyclic = Vec::new();
        for &u in &literals {
            self.round += 1;
            self.promote_interface(u, &mut cyclic);
        }

        if !cyclic.is_empty() {
            self.settle_cycles(&cyclic);
        }

        // named interfaces share the selectors of their underlying
        for idx in self.registry.indices().collect::<Vec<_>>() {
            let info = self.registry.info(idx);
            if info.kind != TypeKind::Named || !self.registry.is_interface(idx) {
                continue;
            }
            let underlying = self.registry.info(info.underlying);
            let direct = underlying.direct_selectors.clone();
            let methods = underlying.all_methods.clone();
            let conflicts = underlying.conflicts.clone();
            let info = self.registry.info_mut(idx);
            info.direct_selectors = direct;
            info.all_methods = methods;
            info.conflicts = conflicts;
            info.attributes.insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
        }
    }

    /// Promote one interface literal, embedded ones first.
    ///
    /// Returns true if a cycle was hit below `u`; the result is then partial
    /// and gets settled by [`Self::settle_cycles`].
    fn promote_interface(&mut self, u: TypeIdx, cyclic: &mut Vec<TypeIdx>) -> bool {
        let info = self.registry.info(u);
        if info.promoted_selectors_collected() {
            return false;
        }
        if info.counter == self.round {
            return true;
        }
        self.registry.info_mut(u).counter = self.round;

        let mut hit_cycle = false;
        for embedded in self.embedded_interfaces(u) {
            hit_cycle |= self.promote_interface(embedded, cyclic);
        }

        let (methods, conflicts) = self.merge_interface(u);
        let info = self.registry.info_mut(u);
        info.all_methods = methods;
        if hit_cycle {
            if !cyclic.contains(&u) {
                cyclic.push(u);
            }
        } else {
            info.attributes.insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
            self.record_conflicts(u, conflicts);
        }
        hit_cycle
    }

    /// Iterate the interfaces caught in embedding cycles to a fixed point.
    fn settle_cycles(&mut self, cyclic: &[TypeIdx]) {
        let mut pending = Vec::new();
        loop {
            let mut changed = false;
            pending.clear();
            for &u in cyclic {
                let (methods, conflicts) = self.merge_interface(u);
                let info = self.registry.info_mut(u);
                if methods.len() != info.all_methods.len() {
                    changed = true;
                }
                info.all_methods = methods;
                pending.push((u, conflicts));
            }
            if !changed {
                break;
            }
        }
        for (u, conflicts) in pending.drain(..) {
            self.registry
                .info_mut(u)
                .attributes
                .insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
            self.record_conflicts(u, conflicts);
        }
        tracing::debug!(interfaces = cyclic.len(), "settled interface embedding cycles");
    }

    /// Underlying interfaces embedded by `u`.
    ///
    /// Non-interface embeddeds only occur in constraints and are skipped.
    fn embedded_interfaces(&self, u: TypeIdx) -> Vec<TypeIdx> {
        self.registry
            .info(u)
            .direct_selectors
            .iter()
            .filter_map(Selector::embedded_field)
            .map(|field| self.registry.info(field.ty).underlying)
            .filter(|&e| self.registry.info(e).kind == TypeKind::Interface)
            .collect()
    }

    /// Explicit methods, then the current method sets of embedded interfaces.
    fn merge_interface(&self, u: TypeIdx) -> (Vec<Selector>, Vec<SelectorId>) {
        let info = self.registry.info(u);
        let mut methods: Vec<Selector> = Vec::with_capacity(info.direct_selectors.len());
        let mut index: FxHashMap<SelectorId, usize> = FxHashMap::default();
        let mut conflicts = Vec::new();

        let mut add = |selector: &Selector| match index.get(&selector.id) {
            Some(&i) => {
                if methods[i].ty() != selector.ty() && !conflicts.contains(&selector.id) {
                    conflicts.push(selector.id.clone());
                }
            }
            None => {
                index.insert(selector.id.clone(), methods.len());
                let mut method = selector.clone();
                method.chain = None;
                method.depth = 0;
                method.cond = SelectorCond::Normal;
                methods.push(method);
            }
        };

        for selector in info.direct_methods() {
            add(selector);
        }
        for embedded in self.embedded_interfaces(u) {
            for selector in &self.registry.info(embedded).all_methods {
                add(selector);
            }
        }
        (methods, conflicts)
    }

    fn record_conflicts(&mut self, ty: TypeIdx, ids: Vec<SelectorId>) {
        for id in ids {
            self.conflict(ty, id, ConflictKind::MethodSignature);
        }
    }

    fn conflict(&mut self, ty: TypeIdx, id: SelectorId, kind: ConflictKind) {
        let shown = self.registry.display(ty);
        tracing::warn!(ty = %shown, selector = %id, ?kind, "selector conflict");
        self.conflicts.push(SelectorConflict {
            ty,
            display: shown,
            selector: id.to_string(),
            kind,
        });
        self.registry.info_mut(ty).conflicts.push(id);
    }

    fn resolve_others(&mut self) {
        for idx in self.registry.indices().collect::<Vec<_>>() {
            let info = self.registry.info(idx);
            if info.promoted_selectors_collected() {
                continue;
            }
            let underlying = self.registry.info(info.underlying).kind;
            let root = match info.kind {
                TypeKind::Named => !matches!(underlying, TypeKind::Interface | TypeKind::Pointer),
                TypeKind::Struct => true,
                _ => false,
            };
            if root {
                self.promote(idx);
            }
        }

        // pointers not covered by their pointee, and everything else
        for idx in self.registry.indices().collect::<Vec<_>>() {
            self.registry
                .info_mut(idx)
                .attributes
                .insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
        }
    }

    /// Members a type contributes when embedded, all at depth 0.
    fn members(&self, ty: TypeIdx) -> Vec<Selector> {
        let info = self.registry.info(ty);
        let underlying = self.registry.info(info.underlying);
        match (info.kind, underlying.kind) {
            (_, TypeKind::Interface) => underlying.all_methods.clone(),
            (TypeKind::Named, TypeKind::Struct) => underlying
                .direct_selectors
                .iter()
                .chain(info.direct_methods())
                .cloned()
                .collect(),
            (TypeKind::Named, _) => info.direct_methods().cloned().collect(),
            (TypeKind::Struct, _) => info.direct_selectors.clone(),
            _ => Vec::new(),
        }
    }

    /// Breadth-first promotion rooted at a non-interface type.
    fn promote(&mut self, root: TypeIdx) {
        let mut list: Vec<Selector> = Vec::new();
        let mut best: FxHashMap<SelectorId, usize> = FxHashMap::default();
        let mut checked: FxHashMap<TypeIdx, u16> = FxHashMap::default();
        checked.insert(root, 0);

        for selector in self.members(root) {
            if let Some(&i) = best.get(&selector.id) {
                // methods come after fields, so a clash is a method
                if list[i].is_field() && selector.is_method() {
                    self.conflict(root, selector.id.clone(), ConflictKind::FieldAndMethod);
                }
                continue;
            }
            best.insert(selector.id.clone(), list.len());
            list.push(selector);
        }

        let mut start = 0;
        let mut depth = 0u16;
        loop {
            let end = list.len();
            let mut next = Vec::new();
            for i in start..end {
                let Some(field) = list[i].embedded_field() else {
                    continue;
                };
                let embedded = self.registry.info(field.ty);
                let (base, through_pointer) = match embedded.pointee {
                    Some(pointee) if embedded.is_pointer() => (pointee, true),
                    _ => (field.ty, false),
                };

                let member_depth = depth + 1;
                match checked.get(&base) {
                    Some(&d) if d < member_depth => continue,
                    _ => {
                        checked.insert(base, member_depth);
                    }
                }

                let chain = self.chains.cons(field.clone(), list[i].chain);
                let indirect = list[i].indirect || through_pointer;
                for mut member in self.members(base) {
                    member.chain = Some(chain);
                    member.depth = member_depth;
                    member.indirect = indirect;
                    member.cond = SelectorCond::Normal;
                    next.push(member);
                }
            }
            if next.is_empty() {
                break;
            }
            for candidate in next {
                insert_candidate(&mut list, &mut best, candidate);
            }
            start = end;
            depth += 1;
        }

        let (fields, methods): (Vec<Selector>, Vec<Selector>) = list
            .into_iter()
            .filter(|s| !s.is_hidden())
            .partition(Selector::is_field);

        if let Some(ptr) = self.registry.pointer_of(root) {
            let info = self.registry.info_mut(ptr);
            info.all_fields = fields.clone();
            info.all_methods = methods.clone();
            info.attributes.insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
        }
        let info = self.registry.info_mut(root);
        info.all_fields = fields;
        info.all_methods = methods
            .into_iter()
            .filter(|m| !m.pointer_receiver_only())
            .collect();
        info.attributes.insert(TypeAttributes::PROMOTED_SELECTORS_COLLECTED);
    }
}

/// Add a promoted candidate, applying shadowing and collision.
///
/// Candidates arrive in ascending depth, so an existing entry is either at
/// the same depth (both hidden) or shallower (the candidate is hidden).
fn insert_candidate(list: &mut Vec<Selector>, best: &mut FxHashMap<SelectorId, usize>, mut candidate: Selector) {
    match best.get(&candidate.id) {
        Some(&i) => {
            if list[i].depth == candidate.depth {
                list[i].cond = SelectorCond::Hidden;
            }
            candidate.cond = SelectorCond::Hidden;
        }
        None => {
            best.insert(candidate.id.clone(), list.len());
        }
    }
    list.push(candidate);
}

//! Interface implementation search
//!
//! Every method an interface demands is keyed by a [`MethodSignature`].
//! Each key maps to the list of types owning a method with that key, and
//! the implementers of an interface are the intersection of the lists of
//! its methods. The intersection is done with the per-type `counter`,
//! bumped once per method in a round, so no set is ever cleared.

use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::packages::PackageIdx;
use crate::registry::TypeRegistry;
use crate::selector::Selector;
use crate::type_info::{Implementation, TypeIdx, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tyscope_types::RawKind;

/// Matching key of a method: name plus exact parameter and result types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    /// Declaring package of an unexported name
    pub package: Option<PackageIdx>,
    /// Parameter then result type indices, big-endian `u32` each
    pub in_out: Vec<u8>,
    /// `(params << 16) | results`, negated for variadic signatures
    pub counts: i32,
}

impl MethodSignature {
    /// Key of a method selector, or `None` for fields.
    ///
    /// Parameter and result types are registered on the way; they normally
    /// are already.
    pub fn of(registry: &mut TypeRegistry, selector: &Selector) -> Option<Self> {
        let method = selector.as_method()?;
        let sig_raw = registry.info(method.ty).raw;
        let sig = match registry.universe().get(sig_raw) {
            Some(RawKind::Signature(sig)) => sig.clone(),
            _ => return None,
        };

        let mut in_out = Vec::with_capacity((sig.params.len() + sig.results.len()) * 4);
        for raw in sig.params.iter().chain(&sig.results) {
            let idx = registry.register(*raw);
            in_out.extend_from_slice(&idx.as_u32().to_be_bytes());
        }
        let mut counts = ((sig.params.len() as i32) << 16) | sig.results.len() as i32;
        if sig.variadic {
            counts = -counts;
        }

        Some(MethodSignature {
            name: method.name.clone(),
            package: if selector.is_exported() {
                None
            } else {
                method.package
            },
            in_out,
            counts,
        })
    }
}

#[derive(Debug)]
pub struct ImplementationFinder<'a> {
    registry: &'a mut TypeRegistry,
    config: &'a AnalyzerConfig,
    sig_table: FxHashMap<MethodSignature, u32>,
    /// Types owning a method with the signature at each index
    method_to_types: Vec<Vec<TypeIdx>>,
    search_round: u32,
}

impl<'a> ImplementationFinder<'a> {
    pub fn new(registry: &'a mut TypeRegistry, config: &'a AnalyzerConfig) -> Self {
        ImplementationFinder {
            registry,
            config,
            sig_table: FxHashMap::default(),
            method_to_types: Vec::new(),
            search_round: 0,
        }
    }

    /// Find all implementations, returning how many pairs were recorded.
    pub fn run(mut self) -> Result<usize, AnalysisError> {
        if self.config.forbid_registration_during_search {
            self.registry.set_forbid_register_types(true);
        }
        let found = self.search();
        self.registry.set_forbid_register_types(false);

        if let Some(&raw) = self.registry.forbidden_registrations().first() {
            return Err(AnalysisError::RegistrationForbidden {
                display: self.registry.universe().display(raw),
            });
        }
        tracing::debug!(
            signatures = self.sig_table.len(),
            implementations = found,
            "implementations found"
        );
        Ok(found)
    }

    fn search(&mut self) -> usize {
        for idx in self.registry.indices().collect::<Vec<_>>() {
            self.registry.info_mut(idx).counter = 0;
        }

        let interfaces = self.index_interfaces();
        self.index_concrete_methods();

        // named interfaces sharing each underlying
        let mut faces: FxHashMap<TypeIdx, Vec<TypeIdx>> = FxHashMap::default();
        for info in self.registry.iter() {
            if info.kind == TypeKind::Named && self.registry.is_interface(info.index) {
                faces.entry(info.underlying).or_default().push(info.index);
            }
        }

        let mut found = 0;
        for (u, methods) in interfaces {
            let survivors = self.intersect(u, &methods);
            if survivors.is_empty() {
                continue;
            }
            found += self.materialize(u, &survivors, faces.get(&u).map(Vec::as_slice));
        }

        // named interfaces implement what their underlying implements
        for (u, named) in &faces {
            let implements = self.registry.info(*u).implements.clone();
            if implements.is_empty() {
                continue;
            }
            for &face in named {
                self.registry.info_mut(face).implements = implements
                    .iter()
                    .map(|imp| Implementation {
                        impler: face,
                        interface: imp.interface,
                    })
                    .collect();
            }
        }
        found
    }

    fn signature_index(&mut self, sig: MethodSignature) -> u32 {
        if let Some(&i) = self.sig_table.get(&sig) {
            return i;
        }
        let i = self.method_to_types.len() as u32;
        self.sig_table.insert(sig, i);
        self.method_to_types.push(Vec::new());
        i
    }

    /// Index the methods of every non-empty unnamed interface.
    fn index_interfaces(&mut self) -> Vec<(TypeIdx, Vec<u32>)> {
        let mut interfaces = Vec::new();
        for u in self.registry.indices().collect::<Vec<_>>() {
            let info = self.registry.info(u);
            if info.kind != TypeKind::Interface || info.all_methods.is_empty() {
                continue;
            }
            let methods = info.all_methods.clone();
            let mut indices = Vec::with_capacity(methods.len());
            for method in &methods {
                let Some(sig) = MethodSignature::of(self.registry, method) else {
                    continue;
                };
                let i = self.signature_index(sig);
                self.method_to_types[i as usize].push(u);
                indices.push(i);
            }
            interfaces.push((u, indices));
        }
        interfaces
    }

    /// Add every concrete type to the lists of the signatures it has.
    fn index_concrete_methods(&mut self) {
        for t in self.registry.indices().collect::<Vec<_>>() {
            let info = self.registry.info(t);
            if info.kind == TypeKind::Pointer || self.registry.is_interface(t) {
                continue;
            }
            let ptr = self.registry.pointer_of(t);
            // the pointer form holds the full method list
            let methods = match ptr {
                Some(p) => self.registry.info(p).all_methods.clone(),
                None => info.all_methods.clone(),
            };
            for method in &methods {
                let Some(sig) = MethodSignature::of(self.registry, method) else {
                    continue;
                };
                let Some(&i) = self.sig_table.get(&sig) else {
                    continue;
                };
                let owners = &mut self.method_to_types[i as usize];
                if let Some(p) = ptr {
                    owners.push(p);
                }
                if ptr.is_none() || !method.pointer_receiver_only() {
                    owners.push(t);
                }
            }
        }
    }

    /// Types present in the lists of all of `methods`.
    fn intersect(&mut self, u: TypeIdx, methods: &[u32]) -> Vec<TypeIdx> {
        let Some((&first, rest)) = methods.split_first() else {
            return Vec::new();
        };

        let base = self.search_round;
        for &t in &self.method_to_types[first as usize] {
            self.registry.info_mut(t).counter = base + 1;
        }
        for (k, &i) in rest.iter().enumerate() {
            let round = base + 1 + k as u32;
            for &t in &self.method_to_types[i as usize] {
                let info = self.registry.info_mut(t);
                if info.counter == round {
                    info.counter = round + 1;
                }
            }
        }
        let last = base + methods.len() as u32;
        self.search_round = last;

        let mut seen = FxHashSet::default();
        self.method_to_types[first as usize]
            .iter()
            .copied()
            .filter(|&t| t != u && self.registry.info(t).counter == last)
            .filter(|&t| seen.insert(t))
            .collect()
    }

    /// Record the survivors of `u`'s search.
    ///
    /// Interface survivors are other interface literals whose method sets
    /// include `u`'s; they get `implements` entries but never appear in
    /// `implemented_by`.
    fn materialize(&mut self, u: TypeIdx, survivors: &[TypeIdx], named: Option<&[TypeIdx]>) -> usize {
        let concrete: Vec<TypeIdx> = survivors
            .iter()
            .copied()
            .filter(|&t| !self.registry.is_interface(t))
            .collect();
        let present: FxHashSet<TypeIdx> = concrete.iter().copied().collect();
        let implementers: Vec<TypeIdx> = concrete
            .iter()
            .copied()
            .filter(|&t| {
                let info = self.registry.info(t);
                !(info.is_pointer() && info.pointee.map_or(false, |p| present.contains(&p)))
            })
            .collect();

        self.registry.info_mut(u).implemented_by = implementers.clone();
        let faces: Vec<TypeIdx> = match named {
            Some(named) if !named.is_empty() => {
                for &face in named {
                    self.registry.info_mut(face).implemented_by = implementers.clone();
                }
                named.to_vec()
            }
            _ if self.config.record_unnamed_interface_implementations => vec![u],
            _ => return 0,
        };

        for &t in survivors {
            let info = self.registry.info_mut(t);
            for &interface in &faces {
                info.implements.push(Implementation {
                    impler: t,
                    interface,
                });
            }
        }
        survivors.len() * faces.len()
    }
}

/// Link each implementer method to the interfaces it helps implement.
pub fn register_interface_methods(registry: &mut TypeRegistry) -> usize {
    let mut links = 0;
    for t in registry.indices().collect::<Vec<_>>() {
        let info = registry.info(t);
        if info.implements.is_empty() || registry.is_interface(t) {
            continue;
        }
        let mut additions = Vec::new();
        for implementation in &info.implements {
            for method in &registry.info(implementation.interface).all_methods {
                if info.all_methods.iter().any(|m| m.id == method.id) {
                    additions.push((method.id.clone(), implementation.interface));
                }
            }
        }
        links += additions.len();
        let info = registry.info_mut(t);
        for (id, interface) in additions {
            let interfaces = info.interface_methods.entry(id).or_default();
            if !interfaces.contains(&interface) {
                interfaces.push(interface);
            }
        }
    }
    tracing::debug!(links, "interface methods registered");
    links
}

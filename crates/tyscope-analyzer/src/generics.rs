//! Direct selectors for types that never appear as source literals
//!
//! Instantiations of generic named types get their origin's methods with
//! substituted signatures. Struct and interface types that were only
//! produced by the type checker (the bodies of instantiations, mostly) get
//! selectors read off their raw kind, with positions and tags borrowed from
//! the literal the origin was declared with.

use crate::declarations::{Declarations, TypeSource};
use crate::error::AnalysisError;
use crate::packages::PackageIdx;
use crate::registry::TypeRegistry;
use crate::selector::{EmbedMode, Field, Method, Selector, SelectorId};
use crate::type_info::{TypeAttributes, TypeIdx, TypeKind};
use rustc_hash::FxHashMap;
use tyscope_types::{RawKind, RawType};

#[derive(Debug)]
pub struct TypeSourceFinder<'a> {
    registry: &'a mut TypeRegistry,
    decls: &'a Declarations,
    packages: &'a FxHashMap<String, PackageIdx>,
    derived: usize,
}

impl<'a> TypeSourceFinder<'a> {
    pub fn new(
        registry: &'a mut TypeRegistry,
        decls: &'a Declarations,
        packages: &'a FxHashMap<String, PackageIdx>,
    ) -> Self {
        TypeSourceFinder {
            registry,
            decls,
            packages,
            derived: 0,
        }
    }

    /// Confirm every uncollected type, including ones registered on the way.
    ///
    /// Returns the number of types whose selectors were derived. With
    /// `generics` off the types are only marked as collected.
    pub fn run(mut self, generics: bool) -> Result<usize, AnalysisError> {
        let mut cursor = 0;
        while cursor < self.registry.len() {
            let idx = TypeIdx(cursor as u32);
            cursor += 1;

            let info = self.registry.info(idx);
            if info.direct_selectors_collected() {
                continue;
            }
            if !generics {
                self.mark(idx);
                continue;
            }
            match info.kind {
                TypeKind::Named if info.has(TypeAttributes::INSTANTIATED) => self.confirm_instance(idx)?,
                TypeKind::Struct | TypeKind::Interface => self.derive_from_raw(idx, None)?,
                _ => self.mark(idx),
            }
        }
        tracing::debug!(derived = self.derived, types = self.registry.len(), "type sources found");
        Ok(self.derived)
    }

    fn mark(&mut self, idx: TypeIdx) {
        self.registry
            .info_mut(idx)
            .attributes
            .insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED);
    }

    fn confirm_instance(&mut self, idx: TypeIdx) -> Result<(), AnalysisError> {
        let raw = self.registry.info(idx).raw;
        let universe = self.registry.universe();
        let instance = universe
            .named(raw)
            .and_then(|named| Some((named.origin?, named.type_args.clone())));
        let Some((origin_raw, args)) = instance else {
            self.mark(idx);
            return Ok(());
        };
        let declared_params = self
            .registry
            .universe()
            .named(origin_raw)
            .map(|n| n.type_params.clone())
            .unwrap_or_default();
        let origin = self.registry.register(origin_raw);

        let methods: Vec<Selector> = self.registry.info(origin).direct_methods().cloned().collect();
        let mut selectors = Vec::with_capacity(methods.len());
        for selector in methods {
            let Some(method) = selector.as_method() else {
                continue;
            };
            let receiver_params = method
                .function
                .and_then(|f| self.decls.function(f))
                .and_then(|f| f.receiver.as_ref())
                .map(|r| r.type_params.clone())
                .filter(|params| params.len() == args.len())
                .unwrap_or_else(|| declared_params.clone());
            let map: FxHashMap<RawType, RawType> =
                receiver_params.into_iter().zip(args.iter().copied()).collect();

            let sig_raw = self.registry.info(method.ty).raw;
            let sig_raw = self.registry.universe_mut().substitute(sig_raw, &map)?;
            let ty = self.registry.register(sig_raw);
            selectors.push(Selector::method(
                selector.id.clone(),
                Method {
                    ty,
                    ..method.clone()
                },
            ));
        }

        let info = self.registry.info_mut(idx);
        info.direct_selectors = selectors;
        info.attributes.insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED);
        self.derived += 1;

        let underlying = self.registry.info(idx).underlying;
        let body = self.registry.info(underlying);
        if !body.direct_selectors_collected()
            && matches!(body.kind, TypeKind::Struct | TypeKind::Interface)
        {
            let template = self.source_literal(origin);
            self.derive_from_raw(underlying, template)?;
        }
        Ok(())
    }

    /// Literal a named type was ultimately declared with.
    fn source_literal(&self, named: TypeIdx) -> Option<TypeIdx> {
        let mut current = named;
        for _ in 0..self.decls.type_names().len() + 1 {
            let type_name = self.decls.type_name(self.registry.info(current).type_name?)?;
            current = match type_name.source {
                TypeSource::Literal(literal) => return Some(literal),
                TypeSource::Reference(next) => next,
                TypeSource::Instantiation { origin, .. } => origin,
            };
        }
        None
    }

    fn derive_from_raw(&mut self, idx: TypeIdx, template: Option<TypeIdx>) -> Result<(), AnalysisError> {
        let raw = self.registry.info(idx).raw;
        let template: Vec<Selector> = template
            .map(|t| self.registry.info(t))
            .filter(|t| t.has(TypeAttributes::SOURCE_SELECTORS))
            .map(|t| t.direct_selectors.clone())
            .unwrap_or_default();

        let selectors = match self.registry.universe().get(raw).cloned() {
            Some(RawKind::Struct(st)) => {
                let mut selectors = Vec::with_capacity(st.fields.len());
                for (i, field) in st.fields.into_iter().enumerate() {
                    let mode = if !field.embedded {
                        EmbedMode::None
                    } else if self.registry.universe().is_pointer(field.ty) {
                        EmbedMode::Indirect
                    } else {
                        EmbedMode::Direct
                    };
                    let ty = self.registry.register(field.ty);
                    let source = template
                        .get(i)
                        .filter(|s| s.name() == field.name)
                        .or_else(|| template.iter().find(|s| s.name() == field.name))
                        .and_then(Selector::as_field);
                    selectors.push(Selector::field(
                        SelectorId::new(&field.name, field.package.as_deref()),
                        Field {
                            package: self.package_of(field.package.as_deref()),
                            name: field.name,
                            ty,
                            tag: field.tag.or_else(|| source.and_then(|s| s.tag.clone())),
                            mode,
                            position: source.and_then(|s| s.position),
                            doc: source.and_then(|s| s.doc.clone()),
                        },
                    ));
                }
                selectors
            }
            Some(RawKind::Interface(it)) => {
                let mut selectors = Vec::with_capacity(it.methods.len() + it.embeddeds.len());
                for method in it.methods {
                    let ty = self.registry.register(method.sig);
                    let source = template
                        .iter()
                        .filter(|s| s.is_method())
                        .find(|s| s.name() == method.name)
                        .and_then(Selector::as_method);
                    selectors.push(Selector::method(
                        SelectorId::new(&method.name, method.package.as_deref()),
                        Method {
                            package: self.package_of(method.package.as_deref()),
                            name: method.name,
                            ty,
                            pointer_recv: false,
                            function: None,
                            position: source.and_then(|s| s.position),
                            doc: source.and_then(|s| s.doc.clone()),
                        },
                    ));
                }
                for embedded in it.embeddeds {
                    let name = match self.registry.universe().named(embedded) {
                        Some(named) => named.name.clone(),
                        None => self.registry.universe().display(embedded),
                    };
                    let ty = self.registry.register(embedded);
                    selectors.push(Selector::field(
                        SelectorId::new(&name, None),
                        Field {
                            package: None,
                            name,
                            ty,
                            tag: None,
                            mode: EmbedMode::Direct,
                            position: None,
                            doc: None,
                        },
                    ));
                }
                selectors
            }
            _ => Vec::new(),
        };

        let info = self.registry.info_mut(idx);
        info.direct_selectors = selectors;
        info.attributes.insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED);
        self.derived += 1;
        Ok(())
    }

    fn package_of(&self, path: Option<&str>) -> Option<PackageIdx> {
        path.and_then(|p| self.packages.get(p).copied())
    }
}

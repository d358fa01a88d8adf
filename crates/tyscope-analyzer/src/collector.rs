//! Declaration collection
//!
//! Walks the syntax trees of each package (in dependency order) and
//! materializes type names, functions, variables, constants and imports.
//! Struct and interface literals get their direct selectors attached, and
//! methods are appended to the direct selectors of their receiver type.

use crate::declarations::{
    Constant, DeclPos, Declarations, Function, Import, Receiver, TypeName, TypeNameId,
    TypeNameKind, TypeSource, Variable,
};
use crate::error::AnalysisError;
use crate::packages::{PackageIdx, PackageInfo};
use crate::registry::TypeRegistry;
use crate::selector::{EmbedMode, Field, Method, Selector, SelectorId};
use crate::type_info::{TypeAttributes, TypeIdx, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tyscope_types::ast::{
    DeclToken, Expr, ExprKind, FieldDecl, FuncDecl, FuncType, Ident, ImportSpec, InterfaceExpr,
    Spec, StructExpr, TypeSpec, ValueSpec,
};
use tyscope_types::{
    is_exported, Object, ObjectResolver, Package, Span, TypeInfoResolver, UNSAFE_PACKAGE,
};

/// Where in the input the collector currently is.
#[derive(Clone, Copy)]
struct Cx<'p> {
    idx: PackageIdx,
    package: &'p Package,
    file: u32,
}

impl<'p> Cx<'p> {
    fn pos(&self, span: Span) -> DeclPos {
        DeclPos {
            package: self.idx,
            file: self.file,
            span,
        }
    }

    /// Package to qualify an unexported name with.
    fn owner(&self, name: &str) -> Option<PackageIdx> {
        if is_exported(name) {
            None
        } else {
            Some(self.idx)
        }
    }

    fn selector_id(&self, name: &str) -> SelectorId {
        SelectorId::new(name, Some(&self.package.path))
    }
}

/// Collector over all packages of one analyzer run.
#[derive(Debug)]
pub struct DeclarationCollector<'a> {
    registry: &'a mut TypeRegistry,
    decls: &'a mut Declarations,
    infos: &'a mut [PackageInfo],

    /// Package-level type names, entered before any use is resolved
    name_table: FxHashMap<(PackageIdx, String), TypeNameId>,
}

impl<'a> DeclarationCollector<'a> {
    pub fn new(
        registry: &'a mut TypeRegistry,
        decls: &'a mut Declarations,
        infos: &'a mut [PackageInfo],
    ) -> Self {
        DeclarationCollector {
            registry,
            decls,
            infos,
            name_table: FxHashMap::default(),
        }
    }

    /// Collect one package; its dependencies must have been collected already.
    pub fn collect_package(&mut self, idx: PackageIdx, package: &Package) -> Result<(), AnalysisError> {
        let _span = tracing::debug_span!("collect_package", package = %package.path).entered();

        // type names first, so receivers and references resolve
        for (file_idx, file) in package.files.iter().enumerate() {
            let cx = Cx {
                idx,
                package,
                file: file_idx as u32,
            };
            for spec in file.specs(DeclToken::Import) {
                if let Spec::Import(import) = spec {
                    self.collect_import(&cx, import);
                }
            }
            for spec in file.specs(DeclToken::Type) {
                if let Spec::Type(type_spec) = spec {
                    self.collect_type_spec(&cx, type_spec)?;
                }
            }
        }

        for (file_idx, file) in package.files.iter().enumerate() {
            let cx = Cx {
                idx,
                package,
                file: file_idx as u32,
            };
            for func in file.funcs() {
                self.collect_func(&cx, func)?;
            }
            for token in [DeclToken::Const, DeclToken::Var] {
                for spec in file.specs(token) {
                    if let Spec::Value(value) = spec {
                        self.collect_value_spec(&cx, value)?;
                    }
                }
            }
        }

        let info = &self.infos[idx.index()];
        tracing::debug!(
            type_names = info.type_names.len(),
            functions = info.functions.len(),
            variables = info.variables.len(),
            constants = info.constants.len(),
            "collected declarations"
        );
        Ok(())
    }

    /// Freeze the method lists of every declared named type.
    pub fn finish(self) {
        for idx in self.registry.indices().collect::<Vec<_>>() {
            let info = self.registry.info_mut(idx);
            if info.kind == TypeKind::Named && !info.has(TypeAttributes::INSTANTIATED) {
                info.attributes.insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED);
            }
        }
    }

    fn object<'p>(&self, cx: &Cx<'p>, ident: &Ident) -> Result<&'p Object, AnalysisError> {
        cx.package
            .objects
            .object_of(ident)
            .ok_or_else(|| AnalysisError::MissingObject {
                name: ident.name.clone(),
                package: cx.package.path.clone(),
                span: ident.span,
            })
    }

    fn collect_import(&mut self, cx: &Cx<'_>, spec: &ImportSpec) {
        let id = self.decls.add_import(Import {
            package: cx.idx,
            path: spec.path.clone(),
            local_name: spec.name.as_ref().map(|n| n.name.clone()),
            position: cx.pos(spec.span),
        });
        self.infos[cx.idx.index()].imports.push(id);
    }

    fn collect_type_spec(&mut self, cx: &Cx<'_>, spec: &TypeSpec) -> Result<(), AnalysisError> {
        let (ty, alias) = match self.object(cx, &spec.name)? {
            Object::TypeName { ty, alias } => (*ty, *alias),
            _ => {
                return Err(AnalysisError::UnknownTypeName {
                    name: spec.name.name.clone(),
                    package: cx.package.path.clone(),
                })
            }
        };

        let mut type_params = Vec::with_capacity(spec.type_params.len());
        for param in &spec.type_params {
            for name in &param.names {
                if let Ok(Object::TypeParam { ty }) = self.object(cx, name) {
                    type_params.push(*ty);
                }
            }
            // constraints: unions inside them are not modelled
            self.collect_type_expr(cx, &param.ty)?;
        }

        let denoting = self.registry.register(ty);
        let body = self
            .collect_type_expr(cx, &spec.ty)?
            .unwrap_or(self.registry.info(denoting).underlying);
        let source = if self.registry.info(body).kind == TypeKind::Named {
            match self.registry.origin_of(body) {
                Some(origin) => TypeSource::Instantiation {
                    instance: body,
                    origin,
                },
                None => TypeSource::Reference(body),
            }
        } else {
            TypeSource::Literal(body)
        };

        let id = self.decls.add_type_name(TypeName {
            name: spec.name.name.clone(),
            package: cx.idx,
            kind: if alias {
                TypeNameKind::Alias
            } else {
                TypeNameKind::Named
            },
            denoting,
            type_params,
            source,
            doc: spec.doc.clone(),
            position: cx.pos(spec.name.span),
            exported: is_exported(&spec.name.name),
        });

        let info = self.registry.info_mut(denoting);
        if alias {
            info.aliases.push(id);
        } else {
            info.type_name = Some(id);
        }
        self.name_table.insert((cx.idx, spec.name.name.clone()), id);
        self.infos[cx.idx.index()].type_names.push(id);
        Ok(())
    }

    fn collect_func(&mut self, cx: &Cx<'_>, func: &FuncDecl) -> Result<(), AnalysisError> {
        let sig_raw = match self.object(cx, &func.name)? {
            Object::Func { sig } => *sig,
            _ => {
                return Err(AnalysisError::MissingObject {
                    name: func.name.name.clone(),
                    package: cx.package.path.clone(),
                    span: func.name.span,
                })
            }
        };
        let sig = self.registry.register(sig_raw);
        self.collect_func_type(cx, &func.ty)?;

        let receiver = match (&func.recv, func.receiver_base()) {
            (None, _) => None,
            (Some(_), Some(base)) => Some(self.resolve_receiver(cx, func, base)?),
            (Some(_), None) => {
                return Err(AnalysisError::ReceiverNotNamed {
                    method: func.name.name.clone(),
                    package: cx.package.path.clone(),
                })
            }
        };

        let name = func.name.name.clone();
        let position = cx.pos(func.name.span);
        let method_of = receiver.as_ref().map(|r| (r.base, r.pointer));
        let id = self.decls.add_function(Function {
            name: name.clone(),
            package: cx.idx,
            receiver,
            sig,
            param_count: func.ty.param_count(),
            result_count: func.ty.result_count(),
            variadic: func.ty.is_variadic(),
            doc: func.doc.clone(),
            position,
            exported: is_exported(&name),
        });
        self.infos[cx.idx.index()].functions.push(id);

        if let Some((base, pointer_recv)) = method_of {
            if func.name.is_blank() {
                return Ok(());
            }
            let selector = Selector::method(
                cx.selector_id(&name),
                Method {
                    package: cx.owner(&name),
                    name,
                    ty: sig,
                    pointer_recv,
                    function: Some(id),
                    position: Some(position),
                    doc: func.doc.clone(),
                },
            );
            let info = self.registry.info_mut(base);
            if info.direct_selectors_collected() {
                tracing::warn!(method = %selector.id, "method declared after its type was frozen");
            }
            info.direct_selectors.push(selector);
        }
        Ok(())
    }

    fn resolve_receiver(
        &mut self,
        cx: &Cx<'_>,
        func: &FuncDecl,
        base: tyscope_types::ast::ReceiverBase<'_>,
    ) -> Result<Receiver, AnalysisError> {
        let key = (cx.idx, base.name.name.clone());
        let base_idx = match self.name_table.get(&key) {
            Some(&id) => self.decls.type_name(id).map(|tn| tn.denoting),
            None => None,
        };
        let base_idx = match base_idx {
            Some(idx) => idx,
            None => match cx.package.objects.object_of(base.name) {
                Some(Object::TypeName { ty, .. }) => self.registry.register(*ty),
                _ => {
                    return Err(AnalysisError::UnknownTypeName {
                        name: base.name.name.clone(),
                        package: cx.package.path.clone(),
                    })
                }
            },
        };
        if self.registry.info(base_idx).kind != TypeKind::Named {
            return Err(AnalysisError::ReceiverNotNamed {
                method: func.name.name.clone(),
                package: cx.package.path.clone(),
            });
        }

        let type_params = base
            .type_params
            .iter()
            .filter_map(|expr| match &expr.kind {
                ExprKind::Ident(ident) => match cx.package.objects.object_of(ident) {
                    Some(Object::TypeParam { ty }) => Some(*ty),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        Ok(Receiver {
            base: base_idx,
            pointer: base.pointer,
            type_params,
        })
    }

    fn collect_value_spec(&mut self, cx: &Cx<'_>, spec: &ValueSpec) -> Result<(), AnalysisError> {
        if let Some(ty) = &spec.ty {
            self.collect_type_expr(cx, ty)?;
        }
        for name in &spec.names {
            if name.is_blank() {
                continue;
            }
            let position = cx.pos(name.span);
            let exported = is_exported(&name.name);
            match self.object(cx, name)? {
                Object::Var { ty } => {
                    let ty = self.registry.register(*ty);
                    let id = self.decls.add_variable(Variable {
                        name: name.name.clone(),
                        package: cx.idx,
                        ty,
                        doc: spec.doc.clone(),
                        position,
                        exported,
                    });
                    self.infos[cx.idx.index()].variables.push(id);
                }
                Object::Const { ty, value } => {
                    let ty = self.registry.register(*ty);
                    let id = self.decls.add_constant(Constant {
                        name: name.name.clone(),
                        package: cx.idx,
                        ty,
                        value: value.clone(),
                        doc: spec.doc.clone(),
                        position,
                        exported,
                    });
                    self.infos[cx.idx.index()].constants.push(id);
                }
                _ => {
                    return Err(AnalysisError::MissingObject {
                        name: name.name.clone(),
                        package: cx.package.path.clone(),
                        span: name.span,
                    })
                }
            }
        }
        Ok(())
    }

    fn collect_func_type(&mut self, cx: &Cx<'_>, ty: &FuncType) -> Result<(), AnalysisError> {
        for field in ty.type_params.iter().chain(&ty.params).chain(&ty.results) {
            self.collect_type_expr(cx, &field.ty)?;
        }
        Ok(())
    }

    /// Register the type of a type expression and everything inside it.
    ///
    /// Returns `None` only for names in the `unsafe` package the checker
    /// did not resolve.
    fn collect_type_expr(&mut self, cx: &Cx<'_>, expr: &Expr) -> Result<Option<TypeIdx>, AnalysisError> {
        let raw = match cx.package.types.type_of(expr) {
            Some(raw) => raw,
            None if refers_to_unsafe(cx.package, expr) => return Ok(None),
            None => {
                return Err(AnalysisError::MissingExprType {
                    package: cx.package.path.clone(),
                    span: expr.span,
                })
            }
        };
        let idx = self.registry.register(raw);

        match &expr.kind {
            ExprKind::Paren(inner) | ExprKind::Star(inner) | ExprKind::Ellipsis(inner) => {
                self.collect_type_expr(cx, inner)?;
            }
            ExprKind::Array { elem, .. } | ExprKind::Chan { elem, .. } => {
                self.collect_type_expr(cx, elem)?;
            }
            ExprKind::Map { key, value } => {
                self.collect_type_expr(cx, key)?;
                self.collect_type_expr(cx, value)?;
            }
            ExprKind::Index { base, indices } => {
                self.collect_type_expr(cx, base)?;
                for index in indices {
                    self.collect_type_expr(cx, index)?;
                }
            }
            ExprKind::Func(func) => self.collect_func_type(cx, func)?,
            ExprKind::Struct(st) => self.collect_struct(cx, idx, st)?,
            ExprKind::Interface(it) => self.collect_interface(cx, idx, it)?,
            ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::Value(_) => {}
        }
        Ok(Some(idx))
    }

    fn collect_struct(&mut self, cx: &Cx<'_>, idx: TypeIdx, st: &StructExpr) -> Result<(), AnalysisError> {
        if self.registry.info(idx).direct_selectors_collected() {
            return Ok(());
        }

        let mut selectors = Vec::with_capacity(st.fields.len());
        let mut seen = FxHashSet::default();
        for field in &st.fields {
            let Some(ty) = self.collect_type_expr(cx, &field.ty)? else {
                continue;
            };
            if field.is_embedded() {
                let Some(ident) = field.ty.embedded_ident() else {
                    continue;
                };
                let mode = if field.ty.is_star() {
                    EmbedMode::Indirect
                } else {
                    EmbedMode::Direct
                };
                let selector = self.field_selector(cx, field, ident, ty, mode);
                self.push_unique(&mut selectors, &mut seen, selector, idx)?;
            } else {
                for name in &field.names {
                    if name.is_blank() {
                        continue;
                    }
                    let selector = self.field_selector(cx, field, name, ty, EmbedMode::None);
                    self.push_unique(&mut selectors, &mut seen, selector, idx)?;
                }
            }
        }

        let info = self.registry.info_mut(idx);
        info.direct_selectors = selectors;
        info.attributes
            .insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED | TypeAttributes::SOURCE_SELECTORS);
        Ok(())
    }

    fn push_unique(
        &self,
        selectors: &mut Vec<Selector>,
        seen: &mut FxHashSet<SelectorId>,
        selector: Selector,
        owner: TypeIdx,
    ) -> Result<(), AnalysisError> {
        if !seen.insert(selector.id.clone()) {
            return Err(AnalysisError::DuplicateField {
                name: selector.name().to_string(),
                display: self.registry.display(owner),
            });
        }
        selectors.push(selector);
        Ok(())
    }

    fn field_selector(&self, cx: &Cx<'_>, field: &FieldDecl, name: &Ident, ty: TypeIdx, mode: EmbedMode) -> Selector {
        Selector::field(
            cx.selector_id(&name.name),
            Field {
                package: cx.owner(&name.name),
                name: name.name.clone(),
                ty,
                tag: field.tag.clone(),
                mode,
                position: Some(cx.pos(name.span)),
                doc: field.doc.clone(),
            },
        )
    }

    fn collect_interface(&mut self, cx: &Cx<'_>, idx: TypeIdx, it: &InterfaceExpr) -> Result<(), AnalysisError> {
        if self.registry.info(idx).direct_selectors_collected() {
            return Ok(());
        }

        let mut selectors = Vec::with_capacity(it.elems.len());
        for elem in &it.elems {
            let Some(ty) = self.collect_type_expr(cx, &elem.ty)? else {
                continue;
            };
            if elem.is_embedded() {
                // embedded interfaces are encoded as fields
                let name = match elem.ty.embedded_ident() {
                    Some(ident) => ident.clone(),
                    None => Ident {
                        id: elem.ty.id,
                        name: self.registry.display(ty),
                        span: elem.span,
                    },
                };
                selectors.push(self.field_selector(cx, elem, &name, ty, EmbedMode::Direct));
            } else {
                for name in &elem.names {
                    selectors.push(Selector::method(
                        cx.selector_id(&name.name),
                        Method {
                            package: cx.owner(&name.name),
                            name: name.name.clone(),
                            ty,
                            pointer_recv: false,
                            function: None,
                            position: Some(cx.pos(name.span)),
                            doc: elem.doc.clone(),
                        },
                    ));
                }
            }
        }

        let info = self.registry.info_mut(idx);
        info.direct_selectors = selectors;
        info.attributes
            .insert(TypeAttributes::DIRECT_SELECTORS_COLLECTED | TypeAttributes::SOURCE_SELECTORS);
        Ok(())
    }
}

/// Whether an expression names something inside the `unsafe` package.
fn refers_to_unsafe(package: &Package, expr: &Expr) -> bool {
    match expr.qualifier() {
        Some(qualifier) => match package.objects.object_of(qualifier) {
            Some(Object::PkgName { path }) => path == UNSAFE_PACKAGE,
            Some(_) => false,
            None => qualifier.name == UNSAFE_PACKAGE,
        },
        None => false,
    }
}

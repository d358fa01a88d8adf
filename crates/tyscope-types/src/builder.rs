//! Program fixture builder
//!
//! Builds a consistent [`Program`] from type-level descriptions: the raw
//! types go into the universe, and for every declaration the builder
//! synthesizes the syntax a source file would contain, recording the
//! node-to-type and node-to-object mappings a type checker would produce.
//!
//! ```ignore
//! let mut b = ProgramBuilder::new();
//! let p = b.package("example.com/shapes");
//! let int = b.basic(BasicKind::Int);
//! let point = b.declare_type(p, "Point");
//! b.define_struct(point, vec![FieldDef::named("X", int), FieldDef::named("Y", int)])?;
//! let program = b.build();
//! ```

use crate::ast::{
    AstFile, Decl, DeclToken, Expr, ExprKind, FieldDecl, FuncDecl, FuncType, GenDecl, Ident,
    ImportSpec, InterfaceExpr, NodeId, Span, Spec, StructExpr, TypeSpec, ValueSpec,
};
use crate::error::TypeError;
use crate::package::{Object, Package, Program};
use crate::toolchain::ToolchainInfo;
use crate::ty::{is_exported, BasicKind, RawField, RawKind, RawMethod, RawType};
use crate::universe::TypeUniverse;
use rustc_hash::FxHashMap;

/// Import path of the predeclared-identifier pseudo-package.
pub const BUILTIN_PACKAGE: &str = "builtin";

/// Import path of the `unsafe` pseudo-package.
pub const UNSAFE_PACKAGE: &str = "unsafe";

/// Handle of a package being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PkgRef(usize);

// ============================================================================
// Declaration Descriptions
// ============================================================================

/// Struct field description.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// `None` for embedded fields
    pub name: Option<String>,
    pub ty: RawType,
    pub tag: Option<String>,
}

impl FieldDef {
    pub fn named(name: &str, ty: RawType) -> Self {
        FieldDef {
            name: Some(name.to_string()),
            ty,
            tag: None,
        }
    }

    /// Embedded field; `ty` may be `T` or `*T`.
    pub fn embedded(ty: RawType) -> Self {
        FieldDef {
            name: None,
            ty,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

/// Interface method description.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub sig: RawType,
}

impl MethodDef {
    pub fn new(name: &str, sig: RawType) -> Self {
        MethodDef {
            name: name.to_string(),
            sig,
        }
    }
}

#[derive(Debug)]
enum Planned {
    Type {
        named: RawType,
        name: String,
        type_params: Vec<RawType>,
    },
    Alias {
        name: String,
        target: RawType,
    },
    Method {
        recv: RawType,
        pointer: bool,
        name: String,
        sig: RawType,
    },
    Func {
        name: String,
        sig: RawType,
    },
    Var {
        name: String,
        ty: RawType,
    },
    Const {
        name: String,
        ty: RawType,
        value: String,
    },
}

#[derive(Debug)]
struct PlannedDecl {
    file: usize,
    span: Span,
    doc: Option<String>,
    item: Planned,
}

#[derive(Debug)]
struct FileState {
    path: String,
    generated_from: Option<String>,
    next_line: u32,
}

#[derive(Debug)]
struct PackageState {
    package: Package,
    files: Vec<FileState>,
    current: usize,
    plan: Vec<PlannedDecl>,
}

// ============================================================================
// Program Builder
// ============================================================================

/// Builder for whole-program fixtures.
#[derive(Debug)]
pub struct ProgramBuilder {
    universe: TypeUniverse,
    packages: Vec<PackageState>,
    paths: FxHashMap<String, usize>,
    /// Body each declared named type was given
    bodies: FxHashMap<RawType, RawType>,
    /// Declaring package of each named type
    owners: FxHashMap<RawType, usize>,
    next_node: u32,
    pending_doc: Option<String>,
    toolchain: ToolchainInfo,
    error_type: RawType,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    /// Create a builder with the `builtin` and `unsafe` pseudo-packages in place.
    pub fn new() -> Self {
        let mut universe = TypeUniverse::new();
        let error_type = universe.declare_named("error", None);
        let mut builder = ProgramBuilder {
            universe,
            packages: Vec::new(),
            paths: FxHashMap::default(),
            bodies: FxHashMap::default(),
            owners: FxHashMap::default(),
            next_node: 0,
            pending_doc: None,
            toolchain: ToolchainInfo::new("go1.21"),
            error_type,
        };

        let builtin = builder.package(BUILTIN_PACKAGE);
        builder.owners.insert(error_type, builtin.0);
        builder.plan(
            builtin,
            1,
            Planned::Type {
                named: error_type,
                name: "error".to_string(),
                type_params: Vec::new(),
            },
        );
        let string = builder.basic(BasicKind::String);
        let error_sig = builder.universe.signature(Vec::new(), vec![string], false);
        let error_body = builder.universe.interface_of(
            vec![RawMethod {
                name: "Error".to_string(),
                package: None,
                sig: error_sig,
            }],
            Vec::new(),
        );
        builder.bodies.insert(error_type, error_body);
        // error is declared just above, so this cannot fail
        let _ = builder.universe.set_underlying(error_type, error_body);
        let any = builder.universe.empty_interface();
        builder.alias(builtin, "any", any);

        let unsafe_pkg = Package::new(UNSAFE_PACKAGE, UNSAFE_PACKAGE);
        builder.paths.insert(UNSAFE_PACKAGE.to_string(), builder.packages.len());
        builder.packages.push(PackageState {
            package: unsafe_pkg,
            files: Vec::new(),
            current: 0,
            plan: Vec::new(),
        });
        builder
    }

    /// Add a package; its first file is `<name>.go`.
    pub fn package(&mut self, path: &str) -> PkgRef {
        if let Some(&idx) = self.paths.get(path) {
            return PkgRef(idx);
        }
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let idx = self.packages.len();
        self.packages.push(PackageState {
            package: Package::new(path, &name),
            files: vec![FileState {
                path: format!("{}/{}.go", path, name),
                generated_from: None,
                next_line: 1,
            }],
            current: 0,
            plan: Vec::new(),
        });
        self.paths.insert(path.to_string(), idx);
        PkgRef(idx)
    }

    /// Start a new file in `pkg`; later declarations land in it.
    pub fn file(&mut self, pkg: PkgRef, name: &str) {
        self.add_file(pkg, name, None);
    }

    /// Start a generated file that maps back to `from`.
    pub fn generated_file(&mut self, pkg: PkgRef, name: &str, from: &str) {
        self.add_file(pkg, name, Some(from.to_string()));
    }

    fn add_file(&mut self, pkg: PkgRef, name: &str, generated_from: Option<String>) {
        let state = &mut self.packages[pkg.0];
        state.files.push(FileState {
            path: format!("{}/{}", state.package.path, name),
            generated_from,
            next_line: 1,
        });
        state.current = state.files.len() - 1;
    }

    /// Record that `pkg` imports `dep`.
    pub fn depend(&mut self, pkg: PkgRef, dep: &str) {
        let deps = &mut self.packages[pkg.0].package.deps;
        if !deps.iter().any(|d| d == dep) {
            deps.push(dep.to_string());
        }
    }

    pub fn set_toolchain(&mut self, toolchain: ToolchainInfo) {
        self.toolchain = toolchain;
    }

    /// Attach a doc comment to the next declaration.
    pub fn doc(&mut self, text: &str) {
        self.pending_doc = Some(text.to_string());
    }

    pub fn universe(&mut self) -> &mut TypeUniverse {
        &mut self.universe
    }

    pub fn basic(&self, kind: BasicKind) -> RawType {
        self.universe.basic(kind)
    }

    /// The predeclared `error` interface.
    pub fn error_type(&self) -> RawType {
        self.error_type
    }

    pub fn pointer_to(&mut self, ty: RawType) -> RawType {
        self.universe.pointer_to(ty)
    }

    pub fn slice_of(&mut self, ty: RawType) -> RawType {
        self.universe.slice_of(ty)
    }

    /// Signature; for variadic ones pass the last parameter as its slice type.
    pub fn signature(&mut self, params: Vec<RawType>, results: Vec<RawType>, variadic: bool) -> RawType {
        self.universe.signature(params, results, variadic)
    }

    /// Declare a named type; give it a body with one of the `define_*` calls.
    ///
    /// Types still without a body at [`build`](Self::build) get `struct{}`.
    pub fn declare_type(&mut self, pkg: PkgRef, name: &str) -> RawType {
        let path = self.packages[pkg.0].package.path.clone();
        let named = self.universe.declare_named(name, Some(&path));
        self.owners.insert(named, pkg.0);
        self.plan(
            pkg,
            3,
            Planned::Type {
                named,
                name: name.to_string(),
                type_params: Vec::new(),
            },
        );
        named
    }

    /// Declare a generic named type with `(name, constraint)` parameters.
    pub fn declare_generic_type(
        &mut self,
        pkg: PkgRef,
        name: &str,
        params: &[(&str, RawType)],
    ) -> (RawType, Vec<RawType>) {
        let path = self.packages[pkg.0].package.path.clone();
        let (named, type_params) = self.universe.declare_generic(name, Some(&path), params);
        self.owners.insert(named, pkg.0);
        self.plan(
            pkg,
            3,
            Planned::Type {
                named,
                name: name.to_string(),
                type_params: type_params.clone(),
            },
        );
        (named, type_params)
    }

    /// Give a declared named type its body (`type T <body>`).
    pub fn define_type(&mut self, named: RawType, body: RawType) -> Result<(), TypeError> {
        self.universe.set_underlying(named, body)?;
        self.bodies.insert(named, body);
        Ok(())
    }

    /// `type T struct { ... }`; returns the struct literal type.
    pub fn define_struct(&mut self, named: RawType, fields: Vec<FieldDef>) -> Result<RawType, TypeError> {
        let pkg = self.owner_path(named);
        let body = self.struct_literal(pkg.as_deref(), fields);
        self.define_type(named, body)?;
        Ok(body)
    }

    /// `type T interface { ... }`; returns the interface literal type.
    pub fn define_interface(
        &mut self,
        named: RawType,
        methods: Vec<MethodDef>,
        embeds: Vec<RawType>,
    ) -> Result<RawType, TypeError> {
        let pkg = self.owner_path(named);
        let body = self.interface_literal(pkg.as_deref(), methods, embeds);
        self.define_type(named, body)?;
        Ok(body)
    }

    /// Unnamed struct literal type declared in `pkg`.
    pub fn struct_type(&mut self, pkg: PkgRef, fields: Vec<FieldDef>) -> RawType {
        let path = self.packages[pkg.0].package.path.clone();
        self.struct_literal(Some(&path), fields)
    }

    /// Unnamed interface literal type declared in `pkg`.
    pub fn interface_type(&mut self, pkg: PkgRef, methods: Vec<MethodDef>, embeds: Vec<RawType>) -> RawType {
        let path = self.packages[pkg.0].package.path.clone();
        self.interface_literal(Some(&path), methods, embeds)
    }

    fn struct_literal(&mut self, pkg: Option<&str>, fields: Vec<FieldDef>) -> RawType {
        let fields = fields
            .into_iter()
            .map(|def| {
                let embedded = def.name.is_none();
                let name = match def.name {
                    Some(name) => name,
                    None => self.embedded_name(def.ty),
                };
                RawField {
                    package: qualify(pkg, &name),
                    name,
                    ty: def.ty,
                    embedded,
                    tag: def.tag,
                }
            })
            .collect();
        self.universe.struct_of(fields)
    }

    fn interface_literal(&mut self, pkg: Option<&str>, methods: Vec<MethodDef>, embeds: Vec<RawType>) -> RawType {
        let methods = methods
            .into_iter()
            .map(|def| RawMethod {
                package: qualify(pkg, &def.name),
                name: def.name,
                sig: def.sig,
            })
            .collect();
        self.universe.interface_of(methods, embeds)
    }

    fn embedded_name(&self, ty: RawType) -> String {
        let base = self.universe.pointee(ty).unwrap_or(ty);
        match self.universe.get(base) {
            Some(RawKind::Named(named)) => named.name.clone(),
            Some(RawKind::Basic(kind)) => kind.name().to_string(),
            Some(RawKind::TypeParam(param)) => param.name.clone(),
            _ => self.universe.display(base),
        }
    }

    fn owner_path(&self, named: RawType) -> Option<String> {
        self.universe.named(named).and_then(|n| n.package.clone())
    }

    /// `type name = target`.
    pub fn alias(&mut self, pkg: PkgRef, name: &str, target: RawType) {
        self.plan(
            pkg,
            1,
            Planned::Alias {
                name: name.to_string(),
                target,
            },
        );
    }

    /// `func (r T) name...` or `func (r *T) name...` on a declared named type.
    pub fn method(&mut self, recv: RawType, pointer: bool, name: &str, sig: RawType) {
        let Some(&pkg) = self.owners.get(&recv) else {
            return;
        };
        self.plan(
            PkgRef(pkg),
            3,
            Planned::Method {
                recv,
                pointer,
                name: name.to_string(),
                sig,
            },
        );
    }

    pub fn func(&mut self, pkg: PkgRef, name: &str, sig: RawType) {
        self.plan(
            pkg,
            3,
            Planned::Func {
                name: name.to_string(),
                sig,
            },
        );
    }

    pub fn var(&mut self, pkg: PkgRef, name: &str, ty: RawType) {
        self.plan(
            pkg,
            1,
            Planned::Var {
                name: name.to_string(),
                ty,
            },
        );
    }

    pub fn constant(&mut self, pkg: PkgRef, name: &str, ty: RawType, value: &str) {
        self.plan(
            pkg,
            1,
            Planned::Const {
                name: name.to_string(),
                ty,
                value: value.to_string(),
            },
        );
    }

    /// Instantiate a generic type.
    pub fn instantiate(&mut self, origin: RawType, args: Vec<RawType>) -> Result<RawType, TypeError> {
        self.universe.instantiate(origin, args)
    }

    fn plan(&mut self, pkg: PkgRef, lines: u32, item: Planned) {
        let doc = self.pending_doc.take();
        let state = &mut self.packages[pkg.0];
        let file = state.current;
        let Some(file_state) = state.files.get_mut(file) else {
            return;
        };
        let line = file_state.next_line;
        file_state.next_line += lines + doc.as_ref().map_or(0, |_| 1);
        let start = (line as usize - 1) * 40;
        state.plan.push(PlannedDecl {
            file,
            span: Span::new(start, start + 40 * lines as usize, line, 1),
            doc,
            item,
        });
    }

    /// Synthesize the syntax trees and hand out the finished program.
    pub fn build(mut self) -> Program {
        let pending: Vec<RawType> = self
            .owners
            .keys()
            .copied()
            .filter(|named| !self.bodies.contains_key(named))
            .collect();
        for named in pending {
            let empty = self.universe.struct_of(Vec::new());
            if self.define_type(named, empty).is_err() {
                continue;
            }
        }

        let states = std::mem::take(&mut self.packages);
        let mut packages = Vec::with_capacity(states.len());
        for (idx, state) in states.into_iter().enumerate() {
            let mut package = state.package;
            let mut files: Vec<AstFile> = state
                .files
                .iter()
                .map(|f| AstFile {
                    path: f.path.clone(),
                    package_name: package.name.clone(),
                    decls: Vec::new(),
                    line_count: f.next_line.saturating_sub(1),
                    generated_from: f.generated_from.clone(),
                })
                .collect();

            let mut synth = Synth {
                builder: &mut self,
                package: &mut package,
                pkg_idx: idx,
            };
            let mut planned_decls = Vec::with_capacity(state.plan.len());
            for planned in state.plan {
                let decl = synth.decl(&planned);
                planned_decls.push((planned.file, decl));
            }
            for (file, decl) in planned_decls {
                files[file].decls.push(decl);
            }

            if let Some(first) = files.first_mut() {
                if !package.deps.is_empty() {
                    let specs = package
                        .deps
                        .iter()
                        .map(|path| {
                            Spec::Import(ImportSpec {
                                name: None,
                                path: path.clone(),
                                span: Span::default(),
                            })
                        })
                        .collect();
                    first.decls.insert(
                        0,
                        Decl::Gen(GenDecl {
                            token: DeclToken::Import,
                            specs,
                            doc: None,
                            span: Span::default(),
                        }),
                    );
                }
            }
            package.files = files;
            packages.push(package);
        }

        Program {
            universe: self.universe,
            packages,
            toolchain: self.toolchain,
        }
    }
}

fn qualify(pkg: Option<&str>, name: &str) -> Option<String> {
    if is_exported(name) {
        None
    } else {
        pkg.map(str::to_string)
    }
}

// ============================================================================
// Syntax Synthesis
// ============================================================================

/// Syntax synthesis for one package.
struct Synth<'a> {
    builder: &'a mut ProgramBuilder,
    package: &'a mut Package,
    pkg_idx: usize,
}

impl<'a> Synth<'a> {
    fn node(&mut self) -> NodeId {
        let id = NodeId(self.builder.next_node);
        self.builder.next_node += 1;
        id
    }

    fn ident(&mut self, name: &str, span: Span) -> Ident {
        Ident {
            id: self.node(),
            name: name.to_string(),
            span,
        }
    }

    fn ident_with(&mut self, name: &str, span: Span, object: Object) -> Ident {
        let ident = self.ident(name, span);
        self.package.objects.record(ident.id, object);
        ident
    }

    fn expr(&mut self, kind: ExprKind, span: Span, ty: Option<RawType>) -> Expr {
        let id = self.node();
        if let Some(ty) = ty {
            self.package.types.record(id, ty);
        }
        Expr { id, kind, span }
    }

    fn decl(&mut self, planned: &PlannedDecl) -> Decl {
        let span = planned.span;
        let doc = planned.doc.clone();
        match &planned.item {
            Planned::Type {
                named,
                name,
                type_params,
            } => {
                let name = self.ident_with(
                    name,
                    span,
                    Object::TypeName {
                        ty: *named,
                        alias: false,
                    },
                );
                let type_params = self.type_params(type_params, span);
                let body = self.builder.bodies.get(named).copied();
                let ty = match body {
                    Some(body) => self.type_expr(body, span),
                    None => self.expr(ExprKind::Struct(StructExpr::default()), span, None),
                };
                self.type_decl(name, type_params, false, ty, doc, span)
            }
            Planned::Alias { name, target } => {
                let name = self.ident_with(
                    name,
                    span,
                    Object::TypeName {
                        ty: *target,
                        alias: true,
                    },
                );
                let ty = self.type_expr(*target, span);
                self.type_decl(name, Vec::new(), true, ty, doc, span)
            }
            Planned::Method {
                recv,
                pointer,
                name,
                sig,
            } => {
                let recv_ty = if *pointer {
                    self.builder.universe.pointer_to(*recv)
                } else {
                    *recv
                };
                let recv_name = self.ident_with("r", span, Object::Var { ty: recv_ty });
                let base = self.receiver_expr(*recv, span);
                let recv_expr = if *pointer {
                    self.expr(ExprKind::Star(Box::new(base)), span, Some(recv_ty))
                } else {
                    base
                };
                let name = self.ident_with(name, span, Object::Func { sig: *sig });
                let ty = self.func_type(*sig, span);
                Decl::Func(FuncDecl {
                    recv: Some(FieldDecl {
                        names: vec![recv_name],
                        ty: recv_expr,
                        tag: None,
                        doc: None,
                        span,
                    }),
                    name,
                    ty,
                    doc,
                    span,
                })
            }
            Planned::Func { name, sig } => {
                let name = self.ident_with(name, span, Object::Func { sig: *sig });
                let ty = self.func_type(*sig, span);
                Decl::Func(FuncDecl {
                    recv: None,
                    name,
                    ty,
                    doc,
                    span,
                })
            }
            Planned::Var { name, ty } => {
                let name = self.ident_with(name, span, Object::Var { ty: *ty });
                let ty_expr = self.type_expr(*ty, span);
                self.value_decl(DeclToken::Var, name, ty_expr, Vec::new(), doc, span)
            }
            Planned::Const { name, ty, value } => {
                let name = self.ident_with(
                    name,
                    span,
                    Object::Const {
                        ty: *ty,
                        value: value.clone(),
                    },
                );
                let ty_expr = self.type_expr(*ty, span);
                let value = self.expr(ExprKind::Value(value.clone()), span, Some(*ty));
                self.value_decl(DeclToken::Const, name, ty_expr, vec![value], doc, span)
            }
        }
    }

    fn type_decl(
        &mut self,
        name: Ident,
        type_params: Vec<FieldDecl>,
        assign: bool,
        ty: Expr,
        doc: Option<String>,
        span: Span,
    ) -> Decl {
        Decl::Gen(GenDecl {
            token: DeclToken::Type,
            specs: vec![Spec::Type(TypeSpec {
                name,
                type_params,
                assign,
                ty,
                doc: doc.clone(),
                span,
            })],
            doc,
            span,
        })
    }

    fn value_decl(
        &mut self,
        token: DeclToken,
        name: Ident,
        ty: Expr,
        values: Vec<Expr>,
        doc: Option<String>,
        span: Span,
    ) -> Decl {
        Decl::Gen(GenDecl {
            token,
            specs: vec![Spec::Value(ValueSpec {
                names: vec![name],
                ty: Some(ty),
                values,
                doc: doc.clone(),
                span,
            })],
            doc,
            span,
        })
    }

    fn type_params(&mut self, params: &[RawType], span: Span) -> Vec<FieldDecl> {
        params
            .iter()
            .filter_map(|&param| {
                let RawKind::TypeParam(tp) = self.builder.universe.get(param)?.clone() else {
                    return None;
                };
                let name = self.ident_with(&tp.name, span, Object::TypeParam { ty: param });
                let constraint = self.type_expr(tp.constraint, span);
                Some(FieldDecl {
                    names: vec![name],
                    ty: constraint,
                    tag: None,
                    doc: None,
                    span,
                })
            })
            .collect()
    }

    /// Receiver base: `T`, or `T[P...]` for generic types.
    fn receiver_expr(&mut self, recv: RawType, span: Span) -> Expr {
        let Some(named) = self.builder.universe.named(recv).cloned() else {
            return self.type_expr(recv, span);
        };
        let base_ident = self.ident_with(
            &named.name,
            span,
            Object::TypeName {
                ty: recv,
                alias: false,
            },
        );
        let base = self.expr(ExprKind::Ident(base_ident), span, Some(recv));
        if named.type_params.is_empty() {
            return base;
        }
        let mut indices = Vec::with_capacity(named.type_params.len());
        for param in named.type_params {
            let pname = match self.builder.universe.get(param) {
                Some(RawKind::TypeParam(tp)) => tp.name.clone(),
                _ => continue,
            };
            let ident = self.ident_with(&pname, span, Object::TypeParam { ty: param });
            indices.push(self.expr(ExprKind::Ident(ident), span, Some(param)));
        }
        self.expr(
            ExprKind::Index {
                base: Box::new(base),
                indices,
            },
            span,
            Some(recv),
        )
    }

    fn func_type(&mut self, sig: RawType, span: Span) -> FuncType {
        let Some(RawKind::Signature(sig)) = self.builder.universe.get(sig).cloned() else {
            return FuncType::default();
        };
        let count = sig.params.len();
        let mut params = Vec::with_capacity(count);
        for (i, &param) in sig.params.iter().enumerate() {
            let variadic_elem = match self.builder.universe.get(param) {
                Some(RawKind::Slice(elem)) if sig.variadic && i + 1 == count => Some(*elem),
                _ => None,
            };
            let ty = match variadic_elem {
                Some(elem) => {
                    let inner = self.type_expr(elem, span);
                    self.expr(ExprKind::Ellipsis(Box::new(inner)), span, Some(param))
                }
                None => self.type_expr(param, span),
            };
            params.push(FieldDecl {
                names: Vec::new(),
                ty,
                tag: None,
                doc: None,
                span,
            });
        }
        let mut results = Vec::with_capacity(sig.results.len());
        for &result in &sig.results {
            let ty = self.type_expr(result, span);
            results.push(FieldDecl {
                names: Vec::new(),
                ty,
                tag: None,
                doc: None,
                span,
            });
        }
        FuncType {
            type_params: Vec::new(),
            params,
            results,
        }
    }

    fn qualified(&mut self, path: &str, name: &str, span: Span, object: Object, ty: RawType) -> Expr {
        if !self.package.deps.iter().any(|d| d == path) {
            self.package.deps.push(path.to_string());
        }
        let local = path.rsplit('/').next().unwrap_or(path).to_string();
        let pkg_ident = self.ident_with(
            &local,
            span,
            Object::PkgName {
                path: path.to_string(),
            },
        );
        let x = self.expr(ExprKind::Ident(pkg_ident), span, None);
        let sel = self.ident_with(name, span, object);
        self.expr(
            ExprKind::Selector {
                x: Box::new(x),
                sel,
            },
            span,
            Some(ty),
        )
    }

    /// The expression a source file would spell `ty` with.
    fn type_expr(&mut self, ty: RawType, span: Span) -> Expr {
        let Some(kind) = self.builder.universe.get(ty).cloned() else {
            return self.expr(ExprKind::Value(ty.to_string()), span, None);
        };
        let type_name = Object::TypeName { ty, alias: false };
        match kind {
            RawKind::Basic(BasicKind::UnsafePointer) => {
                self.qualified(UNSAFE_PACKAGE, "Pointer", span, type_name, ty)
            }
            RawKind::Basic(basic) => {
                let ident = self.ident_with(basic.name(), span, type_name);
                self.expr(ExprKind::Ident(ident), span, Some(ty))
            }
            RawKind::Named(named) => {
                let (base_ty, base_name) = match named.origin {
                    Some(origin) => (origin, Object::TypeName { ty: origin, alias: false }),
                    None => (ty, type_name),
                };
                let local = match &named.package {
                    None => true,
                    Some(path) => self.builder.paths.get(path) == Some(&self.pkg_idx),
                };
                let base = match (&named.package, local) {
                    (Some(path), false) => self.qualified(path, &named.name, span, base_name, base_ty),
                    _ => {
                        let ident = self.ident_with(&named.name, span, base_name);
                        self.expr(ExprKind::Ident(ident), span, Some(base_ty))
                    }
                };
                if named.type_args.is_empty() {
                    return base;
                }
                let indices = named
                    .type_args
                    .iter()
                    .map(|&arg| self.type_expr(arg, span))
                    .collect();
                self.expr(
                    ExprKind::Index {
                        base: Box::new(base),
                        indices,
                    },
                    span,
                    Some(ty),
                )
            }
            RawKind::TypeParam(param) => {
                let ident = self.ident_with(&param.name, span, Object::TypeParam { ty });
                self.expr(ExprKind::Ident(ident), span, Some(ty))
            }
            RawKind::Pointer(elem) => {
                let elem = self.type_expr(elem, span);
                self.expr(ExprKind::Star(Box::new(elem)), span, Some(ty))
            }
            RawKind::Slice(elem) => {
                let elem = self.type_expr(elem, span);
                self.expr(
                    ExprKind::Array {
                        len: None,
                        elem: Box::new(elem),
                    },
                    span,
                    Some(ty),
                )
            }
            RawKind::Array { len, elem } => {
                let len = self.expr(ExprKind::Value(len.to_string()), span, None);
                let elem = self.type_expr(elem, span);
                self.expr(
                    ExprKind::Array {
                        len: Some(Box::new(len)),
                        elem: Box::new(elem),
                    },
                    span,
                    Some(ty),
                )
            }
            RawKind::Map { key, value } => {
                let key = self.type_expr(key, span);
                let value = self.type_expr(value, span);
                self.expr(
                    ExprKind::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                    span,
                    Some(ty),
                )
            }
            RawKind::Chan { dir, elem } => {
                let elem = self.type_expr(elem, span);
                self.expr(
                    ExprKind::Chan {
                        dir,
                        elem: Box::new(elem),
                    },
                    span,
                    Some(ty),
                )
            }
            RawKind::Signature(_) => {
                let func = self.func_type(ty, span);
                self.expr(ExprKind::Func(func), span, Some(ty))
            }
            RawKind::Struct(st) => {
                let mut fields = Vec::with_capacity(st.fields.len());
                for (i, field) in st.fields.iter().enumerate() {
                    let field_span = Span::new(span.start, span.end, span.line + 1 + i as u32, 2);
                    let names = if field.embedded {
                        Vec::new()
                    } else {
                        vec![self.ident_with(&field.name, field_span, Object::Var { ty: field.ty })]
                    };
                    let ty = self.type_expr(field.ty, field_span);
                    fields.push(FieldDecl {
                        names,
                        ty,
                        tag: field.tag.clone(),
                        doc: None,
                        span: field_span,
                    });
                }
                self.expr(ExprKind::Struct(StructExpr { fields }), span, Some(ty))
            }
            RawKind::Interface(it) => {
                let mut elems = Vec::with_capacity(it.methods.len() + it.embeddeds.len());
                for (i, method) in it.methods.iter().enumerate() {
                    let elem_span = Span::new(span.start, span.end, span.line + 1 + i as u32, 2);
                    let name = self.ident_with(&method.name, elem_span, Object::Func { sig: method.sig });
                    let func = self.func_type(method.sig, elem_span);
                    let func = self.expr(ExprKind::Func(func), elem_span, Some(method.sig));
                    elems.push(FieldDecl {
                        names: vec![name],
                        ty: func,
                        tag: None,
                        doc: None,
                        span: elem_span,
                    });
                }
                for &embedded in &it.embeddeds {
                    let ty = self.type_expr(embedded, span);
                    elems.push(FieldDecl {
                        names: Vec::new(),
                        ty,
                        tag: None,
                        doc: None,
                        span,
                    });
                }
                self.expr(ExprKind::Interface(InterfaceExpr { elems }), span, Some(ty))
            }
        }
    }
}

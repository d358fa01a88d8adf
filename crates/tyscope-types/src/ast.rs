//! Syntax tree of parsed source files
//!
//! Only the shapes the analyzer inspects are modelled in detail: declarations
//! and type expressions. Value expressions collapse into [`ExprKind::Value`].

use crate::ty::ChanDir;
use serde::{Deserialize, Serialize};

/// Identity of a syntax node, unique within a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

impl Ident {
    /// Whether this is the blank identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    /// `T`
    Ident(Ident),
    /// `x.Sel`, including qualified type names `pkg.T`
    Selector { x: Box<Expr>, sel: Ident },
    /// `*T`
    Star(Box<Expr>),
    /// `(T)`
    Paren(Box<Expr>),
    /// `[N]T`, or `[]T` when `len` is absent
    Array {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    /// `map[K]V`
    Map { key: Box<Expr>, value: Box<Expr> },
    /// Channel type
    Chan { dir: ChanDir, elem: Box<Expr> },
    /// `func(...) ...`
    Func(FuncType),
    /// `struct { ... }`
    Struct(StructExpr),
    /// `interface { ... }`
    Interface(InterfaceExpr),
    /// `T[A, B]`
    Index { base: Box<Expr>, indices: Vec<Expr> },
    /// `...T` in a parameter list
    Ellipsis(Box<Expr>),
    /// Any value expression; the text is kept for diagnostics only
    Value(String),
}

impl Expr {
    /// Strip enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    /// Whether the expression is `*T` (possibly parenthesized).
    pub fn is_star(&self) -> bool {
        matches!(self.unparen().kind, ExprKind::Star(_))
    }

    /// Name an embedded field gets from its type expression.
    ///
    /// `T`, `*T`, `pkg.T` and `T[A]` all yield the identifier `T`.
    pub fn embedded_ident(&self) -> Option<&Ident> {
        match &self.unparen().kind {
            ExprKind::Ident(ident) => Some(ident),
            ExprKind::Selector { sel, .. } => Some(sel),
            ExprKind::Star(inner) => inner.embedded_ident(),
            ExprKind::Index { base, .. } => base.embedded_ident(),
            _ => None,
        }
    }

    /// Package qualifier of a qualified type name `pkg.T`.
    pub fn qualifier(&self) -> Option<&Ident> {
        match &self.unparen().kind {
            ExprKind::Selector { x, .. } => match &x.kind {
                ExprKind::Ident(ident) => Some(ident),
                _ => None,
            },
            ExprKind::Star(inner) | ExprKind::Index { base: inner, .. } => inner.qualifier(),
            _ => None,
        }
    }
}

/// One entry of a field list: `a, b T "tag"`, or an embedded `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Declared names; empty for embedded fields and unnamed parameters
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<String>,
    pub doc: Option<String>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of values declared by this entry.
    pub fn count(&self) -> usize {
        self.names.len().max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructExpr {
    pub fields: Vec<FieldDecl>,
}

/// Interface body: methods carry one name and a `Func` type, embeddeds none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceExpr {
    pub elems: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuncType {
    pub type_params: Vec<FieldDecl>,
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
}

impl FuncType {
    pub fn param_count(&self) -> usize {
        self.params.iter().map(FieldDecl::count).sum()
    }

    pub fn result_count(&self) -> usize {
        self.results.iter().map(FieldDecl::count).sum()
    }

    pub fn is_variadic(&self) -> bool {
        self.params
            .last()
            .map_or(false, |p| matches!(p.ty.kind, ExprKind::Ellipsis(_)))
    }
}

/// Function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub recv: Option<FieldDecl>,
    pub name: Ident,
    pub ty: FuncType,
    pub doc: Option<String>,
    pub span: Span,
}

/// Receiver base type of a method declaration.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverBase<'a> {
    /// Base type name
    pub name: &'a Ident,
    /// Declared as `*T`
    pub pointer: bool,
    /// Receiver type parameter names, for `T[K, V]`
    pub type_params: &'a [Expr],
}

impl FuncDecl {
    /// Decompose the receiver type into its base name.
    pub fn receiver_base(&self) -> Option<ReceiverBase<'_>> {
        let recv = self.recv.as_ref()?;
        let mut expr = recv.ty.unparen();
        let pointer = match &expr.kind {
            ExprKind::Star(inner) => {
                expr = inner.unparen();
                true
            }
            _ => false,
        };
        let (expr, type_params) = match &expr.kind {
            ExprKind::Index { base, indices } => (base.unparen(), indices.as_slice()),
            _ => (expr, &[][..]),
        };
        match &expr.kind {
            ExprKind::Ident(name) => Some(ReceiverBase {
                name,
                pointer,
                type_params,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclToken {
    Import,
    Const,
    Type,
    Var,
}

/// `import`, `const`, `type` or `var` declaration group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenDecl {
    pub token: DeclToken,
    pub specs: Vec<Spec>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Local name, `_` or `.`
    pub name: Option<Ident>,
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Vec<FieldDecl>,
    /// `type A = B`
    pub assign: bool,
    pub ty: Expr,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstFile {
    pub path: String,
    pub package_name: String,
    pub decls: Vec<Decl>,
    pub line_count: u32,
    /// Original file this one was generated from (cgo and friends)
    pub generated_from: Option<String>,
}

impl AstFile {
    /// Iterate over the specs of all declaration groups with the given token.
    pub fn specs(&self, token: DeclToken) -> impl Iterator<Item = &Spec> + '_ {
        self.decls
            .iter()
            .filter_map(move |decl| match decl {
                Decl::Gen(gen) if gen.token == token => Some(gen.specs.iter()),
                _ => None,
            })
            .flatten()
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> + '_ {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(id: u32, name: &str) -> Ident {
        Ident {
            id: NodeId(id),
            name: name.to_string(),
            span: Span::default(),
        }
    }

    fn expr(id: u32, kind: ExprKind) -> Expr {
        Expr {
            id: NodeId(id),
            kind,
            span: Span::default(),
        }
    }

    #[test]
    fn test_embedded_ident() {
        let qualified = expr(
            1,
            ExprKind::Selector {
                x: Box::new(expr(2, ExprKind::Ident(ident(3, "io")))),
                sel: ident(4, "Reader"),
            },
        );
        let star = expr(5, ExprKind::Star(Box::new(qualified)));
        assert!(star.is_star());
        assert_eq!(star.embedded_ident().map(|i| i.name.as_str()), Some("Reader"));
        assert_eq!(star.qualifier().map(|i| i.name.as_str()), Some("io"));
    }

    #[test]
    fn test_receiver_base() {
        let generic = expr(
            1,
            ExprKind::Index {
                base: Box::new(expr(2, ExprKind::Ident(ident(3, "List")))),
                indices: vec![expr(4, ExprKind::Ident(ident(5, "T")))],
            },
        );
        let func = FuncDecl {
            recv: Some(FieldDecl {
                names: vec![ident(6, "l")],
                ty: expr(7, ExprKind::Star(Box::new(generic))),
                tag: None,
                doc: None,
                span: Span::default(),
            }),
            name: ident(8, "Len"),
            ty: FuncType::default(),
            doc: None,
            span: Span::default(),
        };
        let base = func.receiver_base().unwrap();
        assert_eq!(base.name.name, "List");
        assert!(base.pointer);
        assert_eq!(base.type_params.len(), 1);
    }

    #[test]
    fn test_func_type_counts() {
        let int = expr(1, ExprKind::Ident(ident(2, "int")));
        let rest = expr(3, ExprKind::Ellipsis(Box::new(int.clone())));
        let ty = FuncType {
            type_params: Vec::new(),
            params: vec![
                FieldDecl {
                    names: vec![ident(4, "a"), ident(5, "b")],
                    ty: int.clone(),
                    tag: None,
                    doc: None,
                    span: Span::default(),
                },
                FieldDecl {
                    names: vec![ident(6, "rest")],
                    ty: rest,
                    tag: None,
                    doc: None,
                    span: Span::default(),
                },
            ],
            results: vec![FieldDecl {
                names: Vec::new(),
                ty: int,
                tag: None,
                doc: None,
                span: Span::default(),
            }],
        };
        assert_eq!(ty.param_count(), 3);
        assert_eq!(ty.result_count(), 1);
        assert!(ty.is_variadic());
    }
}

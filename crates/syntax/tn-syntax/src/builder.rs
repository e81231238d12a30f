//! Programmatic construction of syntax trees
//!
//! Hosts that drive the binder without the parser (tests, tools generating
//! code) build files through [`SourceBuilder`]. Each token receives a fresh,
//! non-overlapping span, in creation order, so diagnostics stay comparable.

use crate::{
    Argument, BasicLiteral, Block, CaseClause, ConstSpec, Decl, Expr, ExprId, FuncDecl,
    ImportSpec, LiteralKind, PackageClause, ParameterDecl, Parameters, RangeClause, Signature,
    SourceFile, Stmt, SwitchCase, Token, TypeExpr, TypeId, VarSpec,
};
use la_arena::Arena;
use tn_intern::Interner;
use tn_span::{FileId, FileSpan, Span};

/// Builds one [`SourceFile`]
pub struct SourceBuilder {
    file: FileId,
    interner: Interner,
    cursor: u32,
    exprs: Arena<Expr>,
    types: Arena<TypeExpr>,
}

impl SourceBuilder {
    /// Starts a file; symbols are interned in `interner`
    pub fn new(file: FileId, interner: &Interner) -> Self {
        Self {
            file,
            interner: interner.clone(),
            cursor: 0,
            exprs: Arena::default(),
            types: Arena::default(),
        }
    }

    fn next_span(&mut self, len: usize) -> FileSpan {
        let start = self.cursor;
        let end = start + len as u32;
        self.cursor = end + 1;
        FileSpan::new(self.file, Span::new(start, end))
    }

    fn expr_span(&self, expr: ExprId) -> FileSpan {
        self.exprs[expr].span()
    }

    fn type_span(&self, ty: TypeId) -> FileSpan {
        self.types[ty].span()
    }

    /// Identifier token
    pub fn token(&mut self, text: &str) -> Token {
        let span = self.next_span(text.len());
        Token::new(self.interner.intern(text), text, span)
    }

    /// Allocates an arbitrary expression
    pub fn expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Allocates an arbitrary type expression
    pub fn ty(&mut self, ty: TypeExpr) -> TypeId {
        self.types.alloc(ty)
    }

    /// `name`
    pub fn ident(&mut self, name: &str) -> ExprId {
        let token = self.token(name);
        self.expr(Expr::Ident {
            token,
            generic_args: None,
        })
    }

    /// `name[args]`
    pub fn generic_ident(&mut self, name: &str, args: Vec<TypeId>) -> ExprId {
        let token = self.token(name);
        self.expr(Expr::Ident {
            token,
            generic_args: Some(args),
        })
    }

    /// Literal of any kind; only string literals carry a decoded value
    pub fn literal(&mut self, kind: LiteralKind, raw: &str) -> BasicLiteral {
        let span = self.next_span(raw.len());
        let value = (kind == LiteralKind::String).then(|| raw.trim_matches('"').to_owned());
        BasicLiteral {
            kind,
            raw: raw.to_owned(),
            value,
            span,
        }
    }

    /// `"value"`
    pub fn string_lit(&mut self, value: &str) -> BasicLiteral {
        self.literal(LiteralKind::String, &format!("\"{value}\""))
    }

    /// Integer literal expression
    pub fn int_lit(&mut self, raw: &str) -> ExprId {
        let literal = self.literal(LiteralKind::Int, raw);
        self.expr(Expr::Literal(literal))
    }

    /// `(inner)`
    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        let span = self.expr_span(inner);
        self.expr(Expr::Paren { inner, span })
    }

    /// `base.field`
    pub fn selector(&mut self, base: ExprId, field: &str) -> ExprId {
        let field = self.token(field);
        let span = self.expr_span(base).to(field.span);
        self.expr(Expr::Selector { base, field, span })
    }

    /// `callee(args)`
    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        let close = self.next_span(2);
        let span = self.expr_span(callee).to(close);
        self.expr(Expr::Call { callee, args, span })
    }

    /// `name`
    pub fn named_type(&mut self, name: &str) -> TypeId {
        let name = self.token(name);
        let span = name.span;
        self.ty(TypeExpr::Named {
            package: None,
            name,
            generic_args: None,
            span,
        })
    }

    /// `package.name`
    pub fn qualified_type(&mut self, package: &str, name: &str) -> TypeId {
        let package = self.token(package);
        let name = self.token(name);
        let span = package.span.to(name.span);
        self.ty(TypeExpr::Named {
            package: Some(package),
            name,
            generic_args: None,
            span,
        })
    }

    /// `name[args]`
    pub fn generic_type(&mut self, name: &str, args: Vec<TypeId>) -> TypeId {
        let name = self.token(name);
        let span = name.span;
        self.ty(TypeExpr::Named {
            package: None,
            name,
            generic_args: Some(args),
            span,
        })
    }

    /// `[]elem`
    pub fn slice_type(&mut self, elem: TypeId) -> TypeId {
        let span = self.type_span(elem);
        self.ty(TypeExpr::Slice { elem, span })
    }

    /// `*elem`
    pub fn pointer_type(&mut self, elem: TypeId) -> TypeId {
        let span = self.type_span(elem);
        self.ty(TypeExpr::Pointer { elem, span })
    }

    /// Unnamed entry of the given type
    pub fn param_of(&mut self, ty: TypeId) -> ParameterDecl {
        let span = self.type_span(ty);
        ParameterDecl::Type { ty, span }
    }

    /// Unnamed entry whose type is the identifier `ty`
    pub fn param_type(&mut self, ty: &str) -> ParameterDecl {
        let ty = self.named_type(ty);
        self.param_of(ty)
    }

    /// `name ty`
    pub fn param_named(&mut self, name: &str, ty: &str) -> ParameterDecl {
        let name = self.token(name);
        let ty = self.named_type(ty);
        let span = name.span.to(self.type_span(ty));
        ParameterDecl::Named { name, ty, span }
    }

    /// `name ty` for an already built type
    pub fn param_named_of(&mut self, name: &str, ty: TypeId) -> ParameterDecl {
        let name = self.token(name);
        let span = self.type_span(ty).to(name.span);
        ParameterDecl::Named { name, ty, span }
    }

    /// `...ty`
    pub fn param_variadic(&mut self, ty: &str) -> ParameterDecl {
        let ty = self.named_type(ty);
        let span = self.type_span(ty);
        ParameterDecl::Variadic { ty, span }
    }

    /// `name ...ty`
    pub fn param_named_variadic(&mut self, name: &str, ty: &str) -> ParameterDecl {
        let name = self.token(name);
        let ty = self.named_type(ty);
        let span = name.span.to(self.type_span(ty));
        ParameterDecl::NamedVariadic { name, ty, span }
    }

    /// `(list)`
    pub fn parameters(&mut self, list: Vec<ParameterDecl>) -> Parameters {
        let span = list
            .iter()
            .map(|param| match param {
                ParameterDecl::Variadic { span, .. }
                | ParameterDecl::NamedVariadic { span, .. }
                | ParameterDecl::Named { span, .. }
                | ParameterDecl::Type { span, .. } => *span,
            })
            .reduce(FileSpan::to)
            .unwrap_or_else(|| self.next_span(2));
        Parameters { list, span }
    }

    /// `package name`
    pub fn package_clause(&mut self, name: &str) -> PackageClause {
        let name = self.token(name);
        let span = name.span;
        PackageClause { name, span }
    }

    /// `import name "path"`
    pub fn import(&mut self, name: Option<&str>, path: &str) -> ImportSpec {
        let literal = self.string_lit(path);
        self.import_literal(name, literal)
    }

    /// `import name <literal>`
    pub fn import_literal(&mut self, name: Option<&str>, path: BasicLiteral) -> ImportSpec {
        let name = name.map(|name| self.token(name));
        let span = name
            .as_ref()
            .map_or(path.span, |name| name.span.to(path.span));
        ImportSpec { name, path, span }
    }

    /// `names = values` inside `const`
    pub fn const_spec(&mut self, names: &[&str], values: Vec<ExprId>) -> ConstSpec {
        let names: Vec<Token> = names.iter().map(|name| self.token(name)).collect();
        let span = self.spec_span(&names, &values);
        ConstSpec {
            names,
            ty: None,
            values,
            span,
        }
    }

    /// `names = values` inside `var`
    pub fn var_spec(&mut self, names: &[&str], values: Vec<ExprId>) -> VarSpec {
        let names: Vec<Token> = names.iter().map(|name| self.token(name)).collect();
        let span = self.spec_span(&names, &values);
        VarSpec {
            names,
            ty: None,
            values,
            span,
        }
    }

    fn spec_span(&mut self, names: &[Token], values: &[ExprId]) -> FileSpan {
        names
            .iter()
            .map(|name| name.span)
            .chain(values.iter().map(|value| self.expr_span(*value)))
            .reduce(FileSpan::to)
            .unwrap_or_else(|| self.next_span(1))
    }

    /// `{ stmts }`
    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        let span = self.next_span(2);
        Block { stmts, span }
    }

    /// `lhs := range expr`
    pub fn range_define(&mut self, lhs: Vec<ExprId>, expr: ExprId) -> RangeClause {
        let end = self.expr_span(expr);
        let span = lhs.first().map_or(end, |first| self.expr_span(*first).to(end));
        RangeClause::Define { lhs, expr, span }
    }

    /// `for range { body }`
    pub fn for_range(&mut self, range: RangeClause, body: Block) -> Stmt {
        let span = body.span;
        Stmt::For {
            range: Some(range),
            body,
            span,
        }
    }

    /// `case args := expr: body`
    pub fn case_define(&mut self, args: Vec<Argument>, expr: ExprId, body: Vec<Stmt>) -> CaseClause {
        let span = self.expr_span(expr);
        CaseClause {
            case: SwitchCase::Define { args, expr, span },
            body,
            span,
        }
    }

    /// `switch tag { clauses }`
    pub fn switch(&mut self, tag: Option<ExprId>, clauses: Vec<CaseClause>) -> Stmt {
        let span = self.next_span(6);
        Stmt::Switch { tag, clauses, span }
    }

    /// `func name(params) results { body }`
    pub fn func(
        &mut self,
        name: &str,
        params: Parameters,
        results: Option<Parameters>,
        body: Option<Block>,
    ) -> FuncDecl {
        let name = self.token(name);
        let span = name.span.to(params.span);
        FuncDecl {
            receiver: None,
            name,
            signature: Signature { params, results },
            body,
            span,
        }
    }

    /// Completes the file
    pub fn finish(
        self,
        package: PackageClause,
        imports: Vec<ImportSpec>,
        decls: Vec<Decl>,
    ) -> SourceFile {
        SourceFile {
            file: self.file,
            package,
            imports,
            decls,
            exprs: self.exprs,
            types: self.types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_get_distinct_spans() {
        let interner = Interner::new();
        let mut builder = SourceBuilder::new(FileId::new(0), &interner);
        let first = builder.token("alpha");
        let second = builder.token("alpha");
        assert_eq!(first.symbol, second.symbol);
        assert_eq!(first.span.span, Span::new(0, 5));
        assert_eq!(second.span.span, Span::new(6, 11));
    }

    #[test]
    fn test_string_literal_value() {
        let interner = Interner::new();
        let mut builder = SourceBuilder::new(FileId::new(0), &interner);
        let literal = builder.string_lit("fmt");
        assert_eq!(literal.raw, "\"fmt\"");
        assert_eq!(literal.value.as_deref(), Some("fmt"));

        let number = builder.literal(LiteralKind::Int, "42");
        assert_eq!(number.value, None);
    }

    #[test]
    fn test_composite_spans_cover_children() {
        let interner = Interner::new();
        let mut builder = SourceBuilder::new(FileId::new(0), &interner);
        let base = builder.ident("pkg");
        let selector = builder.selector(base, "Name");
        let file = builder.finish(
            PackageClause {
                name: Token::new(interner.intern("main"), "main", FileSpan::new(FileId::new(0), Span::default())),
                span: FileSpan::new(FileId::new(0), Span::default()),
            },
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(file.exprs[selector].span().span, Span::new(0, 8));
    }
}

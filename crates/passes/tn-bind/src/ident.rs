//! Extraction of plain identifiers from expression-shaped slots

use la_arena::Arena;
use tn_syntax::{Argument, Expr, ExprId, Token, TypeExpr, TypeId};

/// The identifier `expr` consists of, if it is nothing but an identifier
///
/// Instantiations (`List[int]`), selectors, calls, literals, parenthesized
/// and compound expressions all yield `None`.
pub fn expr_ident(exprs: &Arena<Expr>, expr: ExprId) -> Option<&Token> {
    match &exprs[expr] {
        Expr::Ident {
            token,
            generic_args: None,
        } => Some(token),
        _ => None,
    }
}

/// The identifier a case-clause argument consists of
///
/// Type-literal arguments never denote a name.
pub fn argument_ident(exprs: &Arena<Expr>, argument: Argument) -> Option<&Token> {
    match argument {
        Argument::Expr(expr) => expr_ident(exprs, expr),
        Argument::Type(_) => None,
    }
}

/// The name of an unqualified, uninstantiated named type
pub fn bare_type_name(types: &Arena<TypeExpr>, ty: TypeId) -> Option<&Token> {
    match &types[ty] {
        TypeExpr::Named {
            package: None,
            name,
            generic_args: None,
            ..
        } => Some(name),
        _ => None,
    }
}

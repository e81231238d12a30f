//! Short variable declarations in range and type-switch case clauses

use crate::binder::FileBinder;
use crate::decl::Declaration;
use crate::error::{BindError, DeclSite, ShortDeclClause};
use crate::ident::{argument_ident, expr_ident};
use tn_span::FileSpan;
use tn_syntax::{Argument, RangeClause, SwitchCase, Token};

/// Most names a range or case clause may declare
pub const MAX_SHORT_DECL_TARGETS: usize = 2;

impl FileBinder<'_> {
    /// Declares the targets of `k, v := range x` in the current scope
    ///
    /// Assigning and bare range clauses declare nothing.
    pub fn bind_range_clause(&mut self, clause: &RangeClause) {
        let RangeClause::Define { lhs, span, .. } = clause else {
            return;
        };
        let source = self.source;
        let targets = lhs
            .iter()
            .map(move |&expr| (expr_ident(&source.exprs, expr), source.exprs[expr].span()));
        self.bind_short_targets(targets, ShortDeclClause::Range, span.end_point());
    }

    /// Declares the targets of `case v, ok := x:` in the current scope
    ///
    /// Other case forms declare nothing.
    pub fn bind_switch_case(&mut self, case: &SwitchCase) {
        let SwitchCase::Define { args, span, .. } = case else {
            return;
        };
        let source = self.source;
        let targets = args.iter().map(move |&argument| {
            let at = match argument {
                Argument::Expr(expr) => source.exprs[expr].span(),
                Argument::Type(ty) => source.types[ty].span(),
            };
            (argument_ident(&source.exprs, argument), at)
        });
        self.bind_short_targets(targets, ShortDeclClause::Case, span.end_point());
    }

    /// Declares up to [`MAX_SHORT_DECL_TARGETS`] identifier targets
    ///
    /// Non-identifier targets are skipped but still count. The first excess
    /// target is reported and ends the clause; earlier targets stay declared.
    fn bind_short_targets<'t>(
        &mut self,
        targets: impl IntoIterator<Item = (Option<&'t Token>, FileSpan)>,
        clause: ShortDeclClause,
        position: FileSpan,
    ) {
        for (index, (token, at)) in targets.into_iter().enumerate() {
            if index == MAX_SHORT_DECL_TARGETS {
                self.diagnostics
                    .report(at, BindError::TooManyShortDeclTargets { clause });
                return;
            }
            if let Some(token) = token {
                self.declare(
                    Declaration::variable(token.clone(), position),
                    DeclSite::ShortVarDecl,
                );
            }
        }
    }
}

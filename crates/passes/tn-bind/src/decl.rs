//! Declaration records
//!
//! A declaration is created once, when the binder accepts its declaring
//! construct, and then lives in the [`ScopeTree`](crate::ScopeTree) arena.

use crate::package::Package;
use la_arena::Idx;
use std::sync::Arc;
use tn_intern::Symbol;
use tn_span::FileSpan;
use tn_syntax::Token;

/// Declaration ID
pub type DeclId = Idx<Declaration>;

/// What a declaration binds
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Named constant
    Const,
    /// Variable, including short variable declarations
    Var,
    /// Function parameter, receiver, or named result
    Param {
        /// Declared with `...`
        variadic: bool,
    },
    /// Imported package
    Import {
        /// Normalized import path
        path: String,
        /// The loaded package
        package: Arc<Package>,
    },
}

/// A bound name
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Binding occurrence
    pub token: Token,
    /// Where the name becomes visible
    pub position: FileSpan,
    /// Kind-specific payload
    pub kind: DeclKind,
}

impl Declaration {
    /// Constant visible from `position`
    pub fn constant(token: Token, position: FileSpan) -> Self {
        Self {
            token,
            position,
            kind: DeclKind::Const,
        }
    }

    /// Variable visible from `position`
    pub fn variable(token: Token, position: FileSpan) -> Self {
        Self {
            token,
            position,
            kind: DeclKind::Var,
        }
    }

    /// Parameter; visible from its own occurrence
    pub fn parameter(token: Token, variadic: bool) -> Self {
        let position = token.span;
        Self {
            token,
            position,
            kind: DeclKind::Param { variadic },
        }
    }

    /// Import binding of `package` under the name in `token`
    pub fn import(token: Token, position: FileSpan, path: String, package: Arc<Package>) -> Self {
        Self {
            token,
            position,
            kind: DeclKind::Import { path, package },
        }
    }

    /// Interned name
    pub fn symbol(&self) -> Symbol {
        self.token.symbol
    }

    /// Spelling of the name
    pub fn name(&self) -> &str {
        &self.token.text
    }

    /// Whether other packages may refer to this declaration
    pub fn is_exported(&self) -> bool {
        self.token.is_exported()
    }

    /// Imported package, for import declarations
    pub fn package(&self) -> Option<&Arc<Package>> {
        match &self.kind {
            DeclKind::Import { package, .. } => Some(package),
            DeclKind::Const | DeclKind::Var | DeclKind::Param { .. } => None,
        }
    }

    /// Short description of the kind, for logs
    pub fn describe(&self) -> &'static str {
        match self.kind {
            DeclKind::Const => "constant",
            DeclKind::Var => "variable",
            DeclKind::Param { .. } => "parameter",
            DeclKind::Import { .. } => "import",
        }
    }
}

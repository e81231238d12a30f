//! Scope tree for declaration binding

use crate::decl::{DeclId, Declaration};
use indexmap::IndexMap;
use la_arena::Arena;
use tn_intern::Symbol;

/// Unique identifier for a scope
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ScopeId(pub u32);

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Package-level scope, shared by every file of the package
    Package,
    /// File scope holding that file's imports
    File,
    /// Function scope holding receiver, parameters, and results
    Function,
    /// Block scope (inside { }, a range loop, or a case clause)
    Block,
}

/// A single scope in the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    /// Enclosing scope (None for the package scope)
    pub parent: Option<ScopeId>,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Bindings in declaration order
    bindings: IndexMap<Symbol, DeclId>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            bindings: IndexMap::new(),
        }
    }

    /// Bindings in declaration order
    pub fn bindings(&self) -> impl Iterator<Item = (Symbol, DeclId)> + '_ {
        self.bindings.iter().map(|(&symbol, &decl)| (symbol, decl))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the scope binds nothing
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Rejected attempt to bind a name twice in one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeclaration {
    /// The binding that was kept
    pub existing: DeclId,
}

/// Scope tree for one package
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    decls: Arena<Declaration>,
    /// Package-level (root) scope
    pub package_scope: ScopeId,
}

impl ScopeTree {
    /// Create a new scope tree with a package scope
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, ScopeKind::Package)],
            decls: Arena::default(),
            package_scope: ScopeId(0),
        }
    }

    /// Create a child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let scope_id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(Some(parent), kind));
        scope_id
    }

    /// Bind a declaration in a scope
    ///
    /// # Errors
    ///
    /// Returns [`Redeclaration`] if the name is already bound in this scope;
    /// the existing binding is left untouched and `decl` is dropped.
    pub fn declare(&mut self, scope: ScopeId, decl: Declaration) -> Result<DeclId, Redeclaration> {
        let symbol = decl.symbol();
        if let Some(&existing) = self.scopes[scope.0 as usize].bindings.get(&symbol) {
            return Err(Redeclaration { existing });
        }

        tracing::trace!(name = decl.name(), kind = decl.describe(), ?scope, "declare");
        let decl_id = self.decls.alloc(decl);
        self.scopes[scope.0 as usize].bindings.insert(symbol, decl_id);
        Ok(decl_id)
    }

    /// Look a name up in `scope` only
    pub fn lookup_local(&self, scope: ScopeId, name: Symbol) -> Option<DeclId> {
        self.scopes[scope.0 as usize].bindings.get(&name).copied()
    }

    /// Look a name up, walking from `scope` outwards
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<DeclId> {
        let mut current_scope = Some(scope);
        while let Some(scope_id) = current_scope {
            let scope_data = &self.scopes[scope_id.0 as usize];
            if let Some(&decl) = scope_data.bindings.get(&name) {
                return Some(decl);
            }
            current_scope = scope_data.parent;
        }
        None
    }

    /// Get a declaration by ID
    #[must_use]
    pub fn declaration(&self, decl: DeclId) -> &Declaration {
        &self.decls[decl]
    }

    /// Get a scope by ID
    #[must_use]
    pub fn get_scope(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope.0 as usize]
    }

    /// All scopes with their IDs, in creation order
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    /// Number of declarations ever accepted
    pub fn declaration_count(&self) -> usize {
        self.decls.len()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

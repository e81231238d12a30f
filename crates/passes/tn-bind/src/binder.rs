//! Traversal driver
//!
//! A [`BindSession`] holds what every package of a compilation shares: the
//! interner, the file table, the configuration, and the package loader.
//! A [`PackageBinder`] binds the files of one package, one [`FileBinder`] per
//! file, in the fixed order package clause, import clauses, import
//! resolution, top-level declarations.

use crate::config::BinderConfig;
use crate::decl::{DeclId, Declaration};
use crate::error::{BindError, DeclSite, Diagnostics};
use crate::import::{FileImports, ImportDeclaration};
use crate::loader::{PackageLoader, PackageSource};
use crate::package::{Package, PackageState};
use crate::scope::{Redeclaration, ScopeId, ScopeKind, ScopeTree};
use std::path::PathBuf;
use std::sync::Arc;
use tn_intern::{Interner, Symbol};
use tn_span::{FileId, FileSpan, FileTable};
use tn_syntax::{
    Block, CaseClause, ConstSpec, Decl, FuncDecl, PackageClause, SourceFile, Stmt, VarSpec,
};

/// State shared by every package bound in one compilation
#[derive(Debug)]
pub struct BindSession {
    interner: Interner,
    files: FileTable,
    config: BinderConfig,
    loader: PackageLoader,
}

impl BindSession {
    /// Creates a session loading imported packages from `source`
    pub fn new(
        interner: Interner,
        files: FileTable,
        config: BinderConfig,
        source: Arc<dyn PackageSource>,
    ) -> Self {
        let loader = PackageLoader::new(source, config.eager_loading);
        Self {
            interner,
            files,
            config,
            loader,
        }
    }

    /// Identifier interner
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Files taking part in the compilation
    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// Binder settings
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Session-wide package loader
    pub fn loader(&self) -> &PackageLoader {
        &self.loader
    }
}

/// Per-file result of binding
#[derive(Debug, Clone)]
pub struct FileBindings {
    /// The bound file
    pub file: FileId,
    /// The file's scope, holding its imports
    pub scope: ScopeId,
    /// Resolved imports and their side lists
    pub imports: FileImports,
}

/// Binds the files of one package
#[derive(Debug)]
pub struct PackageBinder<'s> {
    session: &'s BindSession,
    package: PackageState,
    tree: ScopeTree,
    files: Vec<FileBindings>,
    diagnostics: Diagnostics,
}

impl<'s> PackageBinder<'s> {
    /// Starts binding the package at `import_path`, stored in `directory`
    pub fn new(
        session: &'s BindSession,
        import_path: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            session,
            package: PackageState::new(import_path, directory),
            tree: ScopeTree::new(),
            files: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Binds every declaration of one file
    #[tracing::instrument(level = "debug", skip_all, fields(file = %source.file, package = %self.package.import_path))]
    pub fn bind_file(&mut self, source: &SourceFile) -> &FileBindings {
        let mut binder = self.begin_file(source);
        binder.bind_file();
        let bindings = binder.finish();
        self.add_file(bindings)
    }

    /// Starts a file without traversing it, for hosts driving the per-node
    /// binding functions themselves
    pub fn begin_file<'a>(&'a mut self, source: &'a SourceFile) -> FileBinder<'a> {
        FileBinder::new(
            self.session,
            source,
            &mut self.tree,
            &mut self.package,
            &mut self.diagnostics,
        )
    }

    /// Records the result of a file started with [`begin_file`](Self::begin_file)
    pub fn add_file(&mut self, bindings: FileBindings) -> &FileBindings {
        self.files.push(bindings);
        &self.files[self.files.len() - 1]
    }

    /// Scope tree built so far
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// Diagnostics reported so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Completes the package
    ///
    /// Names bound in a file scope must not also be declared at package
    /// level; each collision is reported at the file-scope binding.
    pub fn finish(mut self) -> PackageBindings {
        let package_scope = self.tree.package_scope;
        for file in &self.files {
            for (symbol, decl) in self.tree.get_scope(file.scope).bindings() {
                let Some(existing) = self.tree.lookup_local(package_scope, symbol) else {
                    continue;
                };
                let local = self.tree.declaration(decl);
                let previous = self.tree.declaration(existing);
                self.diagnostics.report(
                    local.position,
                    BindError::DuplicateDeclaration {
                        name: local.name().to_owned(),
                        site: DeclSite::Block,
                        previous: previous.token.span,
                    },
                );
            }
        }

        tracing::debug!(
            package = %self.package.import_path,
            files = self.files.len(),
            declarations = self.tree.declaration_count(),
            diagnostics = self.diagnostics.len(),
            "package bound"
        );
        PackageBindings {
            package: self.package,
            tree: self.tree,
            files: self.files,
            diagnostics: self.diagnostics,
        }
    }
}

/// Result of binding one package
#[derive(Debug, Clone)]
pub struct PackageBindings {
    /// Package name state
    pub package: PackageState,
    /// All scopes and declarations of the package
    pub tree: ScopeTree,
    /// Per-file results in binding order
    pub files: Vec<FileBindings>,
    /// Everything reported while binding
    pub diagnostics: Diagnostics,
}

impl PackageBindings {
    /// Package-level declaration of `name`
    pub fn package_binding(&self, name: Symbol) -> Option<&Declaration> {
        self.tree
            .lookup_local(self.tree.package_scope, name)
            .map(|decl| self.tree.declaration(decl))
    }

    /// Result for one file
    pub fn file(&self, file: FileId) -> Option<&FileBindings> {
        self.files.iter().find(|bindings| bindings.file == file)
    }

    /// Diagnostics rendered with file names, in report order
    pub fn render_diagnostics(&self, files: &FileTable) -> Vec<String> {
        self.diagnostics
            .items()
            .iter()
            .map(|diagnostic| diagnostic.render(files))
            .collect()
    }

    /// The package as importers see it
    pub fn export(&self, files: &FileTable) -> Package {
        let scope = self.tree.get_scope(self.tree.package_scope);
        self.package.to_package(
            files,
            scope.bindings().map(|(_, decl)| self.tree.declaration(decl)),
        )
    }
}

/// Binds the declarations of one file into its package's scope tree
pub struct FileBinder<'a> {
    pub(crate) session: &'a BindSession,
    pub(crate) source: &'a SourceFile,
    pub(crate) tree: &'a mut ScopeTree,
    pub(crate) package: &'a mut PackageState,
    pub(crate) diagnostics: &'a mut Diagnostics,
    pub(crate) file_scope: ScopeId,
    pub(crate) scope: ScopeId,
    pub(crate) pending: Vec<ImportDeclaration>,
    pub(crate) imports: FileImports,
}

impl<'a> FileBinder<'a> {
    fn new(
        session: &'a BindSession,
        source: &'a SourceFile,
        tree: &'a mut ScopeTree,
        package: &'a mut PackageState,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        let file_scope = tree.create_child(tree.package_scope, ScopeKind::File);
        Self {
            session,
            source,
            tree,
            package,
            diagnostics,
            file_scope,
            scope: file_scope,
            pending: Vec::new(),
            imports: FileImports::default(),
        }
    }

    /// Walks the whole file
    pub fn bind_file(&mut self) {
        let source = self.source;
        self.bind_package_clause(&source.package);
        for spec in &source.imports {
            self.bind_import_spec(spec);
        }
        self.resolve_imports();
        for decl in &source.decls {
            self.bind_decl(decl);
        }
    }

    /// Checks the file's package clause against the package name
    pub fn bind_package_clause(&mut self, clause: &PackageClause) -> bool {
        self.package.bind_package_clause(
            clause,
            self.source.file,
            self.session.files(),
            self.diagnostics,
        )
    }

    /// Scope new declarations go into
    pub fn current_scope(&self) -> ScopeId {
        self.scope
    }

    /// Opens a scope nested in the current one
    pub fn open_scope(&mut self, kind: ScopeKind) -> ScopeId {
        self.scope = self.tree.create_child(self.scope, kind);
        self.scope
    }

    /// Returns to the enclosing scope; the file scope is never left
    pub fn close_scope(&mut self) {
        if self.scope == self.file_scope {
            return;
        }
        if let Some(parent) = self.tree.get_scope(self.scope).parent {
            self.scope = parent;
        }
    }

    /// Declares into the current scope, reporting a redeclaration at the
    /// binding token
    ///
    /// The blank identifier is never bound.
    pub fn declare(&mut self, decl: Declaration, site: DeclSite) -> Option<DeclId> {
        let at = decl.token.span;
        self.declare_in(self.scope, decl, site, at)
    }

    pub(crate) fn declare_in(
        &mut self,
        scope: ScopeId,
        decl: Declaration,
        site: DeclSite,
        at: FileSpan,
    ) -> Option<DeclId> {
        if decl.symbol() == self.session.interner().well_known().underscore {
            return None;
        }

        match self.tree.declare(scope, decl) {
            Ok(decl) => Some(decl),
            Err(Redeclaration { existing }) => {
                let previous = self.tree.declaration(existing);
                self.diagnostics.report(
                    at,
                    BindError::DuplicateDeclaration {
                        name: previous.name().to_owned(),
                        site,
                        previous: previous.token.span,
                    },
                );
                None
            }
        }
    }

    /// Declares the names of a `const` specification
    pub fn bind_const_spec(&mut self, spec: &ConstSpec) {
        let position = spec.span.end_point();
        for name in &spec.names {
            self.declare(Declaration::constant(name.clone(), position), DeclSite::Block);
        }
    }

    /// Declares the names of a `var` specification
    pub fn bind_var_spec(&mut self, spec: &VarSpec) {
        let position = spec.span.end_point();
        for name in &spec.names {
            self.declare(Declaration::variable(name.clone(), position), DeclSite::Block);
        }
    }

    fn bind_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Const(specs) => {
                let file_scope = std::mem::replace(&mut self.scope, self.tree.package_scope);
                for spec in specs {
                    self.bind_const_spec(spec);
                }
                self.scope = file_scope;
            }
            Decl::Var(specs) => {
                let file_scope = std::mem::replace(&mut self.scope, self.tree.package_scope);
                for spec in specs {
                    self.bind_var_spec(spec);
                }
                self.scope = file_scope;
            }
            Decl::Func(func) => self.bind_func(func),
        }
    }

    fn bind_func(&mut self, func: &FuncDecl) {
        tracing::trace!(name = %func.name.text, "function");
        self.open_scope(ScopeKind::Function);
        if let Some(receiver) = &func.receiver {
            self.bind_parameters(receiver);
        }
        self.bind_parameters(&func.signature.params);
        if let Some(results) = &func.signature.results {
            self.bind_parameters(results);
        }
        // The body's outermost block shares the function scope.
        if let Some(body) = &func.body {
            self.bind_stmts(&body.stmts);
        }
        self.close_scope();
    }

    fn bind_block(&mut self, block: &Block) {
        self.open_scope(ScopeKind::Block);
        self.bind_stmts(&block.stmts);
        self.close_scope();
    }

    fn bind_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.bind_stmt(stmt);
        }
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Const(specs) => {
                for spec in specs {
                    self.bind_const_spec(spec);
                }
            }
            Stmt::Var(specs) => {
                for spec in specs {
                    self.bind_var_spec(spec);
                }
            }
            Stmt::Block(block) => self.bind_block(block),
            Stmt::For { range, body, .. } => {
                self.open_scope(ScopeKind::Block);
                if let Some(range) = range {
                    self.bind_range_clause(range);
                }
                self.bind_block(body);
                self.close_scope();
            }
            Stmt::Switch { clauses, .. } => {
                for clause in clauses {
                    self.bind_case_clause(clause);
                }
            }
            Stmt::Expr(_) | Stmt::Return { .. } => {}
        }
    }

    fn bind_case_clause(&mut self, clause: &CaseClause) {
        self.open_scope(ScopeKind::Block);
        self.bind_switch_case(&clause.case);
        self.bind_stmts(&clause.body);
        self.close_scope();
    }

    /// Completes the file
    pub fn finish(self) -> FileBindings {
        tracing::debug!(
            file = %self.source.file,
            imports = self.imports.imports.len(),
            "file bound"
        );
        FileBindings {
            file: self.source.file,
            scope: self.file_scope,
            imports: self.imports,
        }
    }
}

impl std::fmt::Debug for FileBinder<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FileBinder")
            .field("file", &self.source.file)
            .field("scope", &self.scope)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

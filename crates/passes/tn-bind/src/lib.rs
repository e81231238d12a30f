//! Declaration and scope binding
//!
//! Resolves every declaring occurrence of an identifier to a scope entry,
//! binds imported packages into file scopes, reports conflicting
//! declarations, and settles which entries of a parameter list are names.
//!
//! ```text
//! PackageBinder::bind_file
//!   package clause   -> PackageState::bind_package_clause
//!   import clauses   -> FileBinder::bind_import_spec   (starts package loads)
//!   resolution pass  -> FileBinder::resolve_imports    (waits, binds file scope)
//!   declarations     -> const/var specs, functions, range and case clauses
//! ```

pub mod binder;
pub mod config;
pub mod decl;
pub mod error;
pub mod ident;
pub mod import;
pub mod loader;
pub mod package;
pub mod params;
pub mod scope;
pub mod short_decl;

pub use binder::{BindSession, FileBinder, FileBindings, PackageBinder, PackageBindings};
pub use config::BinderConfig;
pub use decl::{DeclId, DeclKind, Declaration};
pub use error::{BindError, DeclSite, Diagnostic, Diagnostics, ShortDeclClause};
pub use import::{FileImports, ImportDeclaration, ImportName, ResolvedImport};
pub use loader::{LoadError, LoadHandle, MemorySource, PackageLoader, PackageSource};
pub use package::{Package, PackageState};
pub use params::{ParamEntry, ParamList, ParamShape};
pub use scope::{Redeclaration, Scope, ScopeId, ScopeKind, ScopeTree};
pub use short_decl::MAX_SHORT_DECL_TARGETS;

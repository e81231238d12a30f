//! Packages: the loaded form shared by importers, and the state of the
//! package currently being bound

use crate::decl::Declaration;
use crate::error::{BindError, Diagnostics};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tn_intern::Symbol;
use tn_span::{FileId, FileTable};
use tn_syntax::{PackageClause, Token};

/// A loaded package, as importers see it
///
/// Shared read-only between every file importing it.
#[derive(Debug, Clone)]
pub struct Package {
    /// Declared package name
    pub name: String,
    /// Canonical import path
    pub import_path: String,
    /// Directory holding the package's files
    pub directory: PathBuf,
    /// File that first declared the package name
    pub named_by: Option<PathBuf>,
    /// Set when the package's files disagree on its name
    pub inconsistent: bool,
    bindings: IndexMap<Symbol, Declaration>,
}

impl Package {
    /// Creates an empty package
    pub fn new(
        name: impl Into<String>,
        import_path: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            import_path: import_path.into(),
            directory: directory.into(),
            named_by: None,
            inconsistent: false,
            bindings: IndexMap::new(),
        }
    }

    /// Adds a package-level binding; a name already present keeps its first
    /// declaration
    #[must_use]
    pub fn with_binding(mut self, decl: Declaration) -> Self {
        self.bindings.entry(decl.symbol()).or_insert(decl);
        self
    }

    /// All package-level bindings in declaration order
    pub fn bindings(&self) -> impl Iterator<Item = &Declaration> {
        self.bindings.values()
    }

    /// Bindings visible to importers, in declaration order
    pub fn exports(&self) -> impl Iterator<Item = &Declaration> {
        self.bindings.values().filter(|decl| decl.is_exported())
    }
}

/// Name state of the package whose files are being bound
#[derive(Debug, Clone)]
pub struct PackageState {
    /// Import path of the package
    pub import_path: String,
    /// Directory holding its files
    pub directory: PathBuf,
    name: Option<Token>,
    named_by: Option<FileId>,
    inconsistent: bool,
}

impl PackageState {
    /// Creates the state for a package that no file has named yet
    pub fn new(import_path: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            import_path: import_path.into(),
            directory: directory.into(),
            name: None,
            named_by: None,
            inconsistent: false,
        }
    }

    /// Name fixed by the first package clause
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|token| token.text.as_str())
    }

    /// File whose package clause fixed the name
    pub fn named_by(&self) -> Option<FileId> {
        self.named_by
    }

    /// Whether two files disagreed on the package name
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// Checks a file's package clause against the package name
    ///
    /// The first clause fixes the name. A later clause naming a different
    /// package is reported as [`BindError::PackageNameConflict`] and marks the
    /// package inconsistent. Returns whether the clause agreed.
    pub fn bind_package_clause(
        &mut self,
        clause: &PackageClause,
        file: FileId,
        files: &FileTable,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let Some(existing) = &self.name else {
            self.name = Some(clause.name.clone());
            self.named_by = Some(file);
            return true;
        };
        if existing.symbol == clause.name.symbol {
            return true;
        }

        let first_file = self
            .named_by
            .map_or_else(String::new, |named_by| files.base_name(named_by));
        diagnostics.report(
            clause.name.span,
            BindError::PackageNameConflict {
                import_path: self.import_path.clone(),
                first_name: existing.text.clone(),
                first_file,
                second_name: clause.name.text.clone(),
                second_file: files.base_name(file),
                directory: self.directory.display().to_string(),
            },
        );
        self.inconsistent = true;
        false
    }

    /// Builds the importer-facing package from this state and its bindings
    pub fn to_package<'a>(
        &self,
        files: &FileTable,
        bindings: impl IntoIterator<Item = &'a Declaration>,
    ) -> Package {
        let mut package = Package::new(
            self.name().unwrap_or_default(),
            self.import_path.clone(),
            self.directory.clone(),
        );
        package.named_by = self
            .named_by
            .and_then(|file| files.path(file))
            .map(Path::to_path_buf);
        package.inconsistent = self.inconsistent;
        bindings
            .into_iter()
            .cloned()
            .fold(package, Package::with_binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_intern::Interner;
    use tn_span::{FileSpan, Span};

    fn clause(interner: &Interner, file: FileId, name: &str) -> PackageClause {
        let span = FileSpan::new(file, Span::new(8, 8 + name.len() as u32));
        PackageClause {
            name: Token::new(interner.intern(name), name, span),
            span,
        }
    }

    #[test]
    fn test_first_clause_names_package() {
        let interner = Interner::new();
        let mut files = FileTable::new();
        let file = files.register("src/foo/a.go");
        let mut diagnostics = Diagnostics::new();
        let mut state = PackageState::new("example.com/foo", "src/foo");

        assert!(state.bind_package_clause(&clause(&interner, file, "foo"), file, &files, &mut diagnostics));
        assert_eq!(state.name(), Some("foo"));
        assert_eq!(state.named_by(), Some(file));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_conflicting_clause_names_both_files() {
        let interner = Interner::new();
        let mut files = FileTable::new();
        let first = files.register("src/foo/a.go");
        let second = files.register("src/foo/b.go");
        let third = files.register("src/foo/c.go");
        let mut diagnostics = Diagnostics::new();
        let mut state = PackageState::new("example.com/foo", "src/foo");

        assert!(state.bind_package_clause(&clause(&interner, first, "foo"), first, &files, &mut diagnostics));
        assert!(state.bind_package_clause(&clause(&interner, second, "foo"), second, &files, &mut diagnostics));
        assert!(!state.bind_package_clause(&clause(&interner, third, "bar"), third, &files, &mut diagnostics));

        assert!(state.is_inconsistent());
        assert_eq!(state.name(), Some("foo"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.items()[0].error.to_string(),
            "package example.com/foo: found packages foo (a.go) and bar (c.go) in src/foo"
        );
    }

    #[test]
    fn test_exports_filter_unexported_names() {
        let interner = Interner::new();
        let at = FileSpan::new(FileId::new(0), Span::point(0));
        let package = Package::new("shapes", "example.com/shapes", "src/shapes")
            .with_binding(Declaration::constant(Token::new(interner.intern("Pi"), "Pi", at), at))
            .with_binding(Declaration::variable(Token::new(interner.intern("cache"), "cache", at), at))
            .with_binding(Declaration::variable(Token::new(interner.intern("Area"), "Area", at), at));

        let exported: Vec<&str> = package.exports().map(Declaration::name).collect();
        assert_eq!(exported, ["Pi", "Area"]);
        assert_eq!(package.bindings().count(), 3);
    }
}

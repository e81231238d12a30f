//! Fixtures for binding scenario tests
//!
//! A [`Fixture`] collects source files and library packages, then turns into
//! a [`TestSession`] that binds packages and renders the results as text for
//! snapshot comparison.

use std::sync::Arc;
use tn_bind::{
    BindSession, BinderConfig, DeclKind, Declaration, MemorySource, Package, PackageBinder,
    PackageBindings,
};
use tn_intern::Interner;
use tn_span::{FileSpan, FileTable, Span};
use tn_syntax::{SourceBuilder, SourceFile, Token};

/// Installs a test-writer subscriber; later calls are no-ops
pub fn init_tracing() {
    // Fails with "subscriber already set" after the first test in a binary.
    if tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init()
        .is_ok()
    {
        tracing::debug!("test subscriber installed");
    }
}

/// Files and packages of one test scenario
#[derive(Debug, Default)]
pub struct Fixture {
    /// Identifier interner shared with the session
    pub interner: Interner,
    files: FileTable,
    packages: Vec<Package>,
    config: BinderConfig,
}

impl Fixture {
    /// Creates an empty fixture with background loading disabled, so loads
    /// happen in a predictable order
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            config: BinderConfig::default().with_eager_loading(false),
            ..Self::default()
        }
    }

    /// Replaces the binder configuration
    #[must_use]
    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a source file and starts building it
    pub fn file(&mut self, path: &str) -> SourceBuilder {
        let file = self.files.register(path);
        SourceBuilder::new(file, &self.interner)
    }

    /// Adds a loadable package declaring `names` as constants in
    /// `<directory>/<name>.go`
    pub fn library(&mut self, name: &str, import_path: &str, directory: &str, names: &[&str]) {
        let file = self.files.register(format!("{directory}/{name}.go"));
        let mut offset = 0;
        let mut package = Package::new(name, import_path, directory);
        for text in names {
            let end = offset + text.len() as u32;
            let span = FileSpan::new(file, Span::new(offset, end));
            let token = Token::new(self.interner.intern(text), *text, span);
            package = package.with_binding(Declaration::constant(token, span.end_point()));
            offset = end + 1;
        }
        self.packages.push(package);
    }

    /// Finishes setup
    #[must_use]
    pub fn session(self) -> TestSession {
        let source = Arc::new(
            self.packages
                .into_iter()
                .fold(MemorySource::new(), MemorySource::with_package),
        );
        let session = BindSession::new(
            self.interner,
            self.files,
            self.config,
            Arc::clone(&source) as Arc<dyn tn_bind::PackageSource>,
        );
        TestSession { session, source }
    }
}

/// A binding session plus the package source behind it
#[derive(Debug)]
pub struct TestSession {
    /// The session
    pub session: BindSession,
    /// Packages available for import
    pub source: Arc<MemorySource>,
}

impl TestSession {
    /// Binds `files` as the package at `import_path`
    pub fn bind(&self, import_path: &str, directory: &str, files: &[&SourceFile]) -> PackageBindings {
        let mut binder = PackageBinder::new(&self.session, import_path, directory);
        for file in files {
            binder.bind_file(file);
        }
        binder.finish()
    }

    /// Diagnostics, one per line, with continuation lines indented
    pub fn diagnostics(&self, bindings: &PackageBindings) -> String {
        bindings
            .render_diagnostics(self.session.files())
            .into_iter()
            .map(|rendered| format!("{}\n", rendered.replace('\t', "  ")))
            .collect()
    }

    /// Every scope with its bindings, one scope per line
    pub fn scopes(&self, bindings: &PackageBindings) -> String {
        let mut out = String::new();
        for (id, scope) in bindings.tree.scopes() {
            out.push_str(&format!("{:?} {}", scope.kind, id.0));
            if let Some(file) = bindings.files.iter().find(|file| file.scope == id) {
                out.push(' ');
                out.push_str(&self.session.files().base_name(file.file));
            }
            out.push(':');
            for (_, decl) in scope.bindings() {
                out.push(' ');
                out.push_str(&describe(bindings.tree.declaration(decl)));
            }
            out.push('\n');
        }
        out
    }
}

fn describe(decl: &Declaration) -> String {
    match &decl.kind {
        DeclKind::Const => format!("const {}", decl.name()),
        DeclKind::Var => format!("var {}", decl.name()),
        DeclKind::Param { variadic: true } => format!("param ...{}", decl.name()),
        DeclKind::Param { variadic: false } => format!("param {}", decl.name()),
        DeclKind::Import { path, .. } => format!("import {}={path:?}", decl.name()),
    }
}

//! Import clauses
//!
//! Each import clause is validated and submitted to the package loader as
//! soon as it is seen; nothing is bound yet. Once every import clause of a
//! file has been seen, [`FileBinder::resolve_imports`] waits for the loads
//! and binds the packages into the file scope.

use crate::binder::FileBinder;
use crate::decl::{DeclId, Declaration};
use crate::error::{BindError, DeclSite};
use crate::loader::LoadHandle;
use crate::package::Package;
use std::sync::Arc;
use tn_intern::WellKnown;
use tn_span::FileSpan;
use tn_syntax::{BasicLiteral, ImportSpec, LiteralKind, Token};
use unicode_general_category::{GeneralCategory, get_general_category};

/// Characters never allowed in an import path
const DISALLOWED_PATH_CHARS: &str = "!\"#$%&'()*,:;<=>?[\\]^`{|}";

/// Local name an import clause asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// No name written; the package's own name is used
    Implicit,
    /// `import . "path"`
    Dot,
    /// `import _ "path"`
    Blank,
    /// `import name "path"`
    Explicit(Token),
}

impl ImportName {
    /// Classifies the optional name of an import clause
    pub fn classify(name: Option<&Token>, well_known: WellKnown) -> Self {
        match name {
            None => Self::Implicit,
            Some(token) if token.symbol == well_known.dot => Self::Dot,
            Some(token) if token.symbol == well_known.underscore => Self::Blank,
            Some(token) => Self::Explicit(token.clone()),
        }
    }
}

/// An import whose package is still loading
#[derive(Debug, Clone)]
pub struct ImportDeclaration {
    /// Requested local name
    pub name: ImportName,
    /// Position of the import: its name if written, else its path literal
    pub position: FileSpan,
    /// Normalized import path
    pub path: String,
    /// The package load
    pub handle: LoadHandle,
}

/// An import whose package has been loaded
#[derive(Debug, Clone)]
pub struct ResolvedImport {
    /// Requested local name
    pub name: ImportName,
    /// Normalized import path
    pub path: String,
    /// The loaded package
    pub package: Arc<Package>,
    /// File-scope binding, for named and implicit imports that were bound
    pub decl: Option<DeclId>,
    /// Position of the import
    pub position: FileSpan,
}

/// Imports of one file
#[derive(Debug, Clone, Default)]
pub struct FileImports {
    /// Successfully loaded imports in source order
    pub imports: Vec<ResolvedImport>,
    /// Indices into `imports` of dot-imports
    pub dot_imports: Vec<usize>,
    /// Indices into `imports` of blank imports
    pub blank_imports: Vec<usize>,
}

impl FileImports {
    /// Dot-imports in source order
    pub fn dot(&self) -> impl Iterator<Item = &ResolvedImport> {
        self.dot_imports.iter().map(|&index| &self.imports[index])
    }

    /// Blank imports in source order
    pub fn blank(&self) -> impl Iterator<Item = &ResolvedImport> {
        self.blank_imports.iter().map(|&index| &self.imports[index])
    }
}

/// Checks the path literal of an import clause
///
/// Returns `Ok(None)` for a string literal the lexer could not decode; it has
/// been reported already.
///
/// # Errors
///
/// Returns the first rule the path breaks.
pub fn validate_import_path(literal: &BasicLiteral) -> Result<Option<String>, BindError> {
    if literal.kind != LiteralKind::String {
        return Err(BindError::InvalidImportLiteral { kind: literal.kind });
    }
    let Some(path) = &literal.value else {
        return Ok(None);
    };

    if path.is_empty() {
        return Err(BindError::EmptyImportPath);
    }
    if path.starts_with('/') {
        return Err(BindError::AbsoluteImportPath { path: path.clone() });
    }
    if let Some(character) = path.chars().find(|&c| !is_allowed_path_char(c)) {
        return Err(BindError::InvalidImportPathCharacter {
            path: path.clone(),
            character,
        });
    }
    Ok(Some(path.clone()))
}

/// Whether `c` may appear in an import path
///
/// Graphic characters (letters, marks, numbers, punctuation, and symbols) are
/// allowed, except for a fixed set of punctuation and the replacement
/// character.
pub fn is_allowed_path_char(c: char) -> bool {
    if DISALLOWED_PATH_CHARS.contains(c) || c == char::REPLACEMENT_CHARACTER {
        return false;
    }
    is_graphic(get_general_category(c))
}

fn is_graphic(category: GeneralCategory) -> bool {
    use GeneralCategory as Gc;
    matches!(
        category,
        Gc::UppercaseLetter
            | Gc::LowercaseLetter
            | Gc::TitlecaseLetter
            | Gc::ModifierLetter
            | Gc::OtherLetter
            | Gc::NonspacingMark
            | Gc::SpacingMark
            | Gc::EnclosingMark
            | Gc::DecimalNumber
            | Gc::LetterNumber
            | Gc::OtherNumber
            | Gc::ConnectorPunctuation
            | Gc::DashPunctuation
            | Gc::OpenPunctuation
            | Gc::ClosePunctuation
            | Gc::InitialPunctuation
            | Gc::FinalPunctuation
            | Gc::OtherPunctuation
            | Gc::MathSymbol
            | Gc::CurrencySymbol
            | Gc::ModifierSymbol
            | Gc::OtherSymbol
    )
}

/// Whether an import path is relative to the importing package
pub fn is_relative_import_path(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../")
}

/// Joins a relative import path onto `base`, the importing package's path
/// or its redirect
pub fn join_relative(base: &str, path: &str) -> String {
    if base.is_empty() {
        clean_path(path)
    } else {
        clean_path(&format!("{base}/{path}"))
    }
}

/// Lexically normalizes a slash-separated path
///
/// Removes empty and `.` elements and resolves `..` against the preceding
/// element where there is one.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_owned(),
        (false, false) => joined,
    }
}

impl FileBinder<'_> {
    /// Validates an import clause and starts loading its package
    ///
    /// An invalid path abandons the import.
    pub fn bind_import_spec(&mut self, spec: &ImportSpec) {
        let path = match validate_import_path(&spec.path) {
            Ok(Some(path)) => path,
            Ok(None) => return,
            Err(error) => {
                self.diagnostics.report(spec.path.span, error);
                return;
            }
        };

        let path = if is_relative_import_path(&path) {
            let base = self.session.config().relative_base(&self.package.import_path);
            join_relative(base, &path)
        } else {
            path
        };

        let position = spec.name.as_ref().map_or(spec.path.span, |name| name.span);
        let name = ImportName::classify(spec.name.as_ref(), self.session.interner().well_known());
        tracing::debug!(%path, "import requested");
        let handle = self.session.loader().load(&path);
        self.pending.push(ImportDeclaration {
            name,
            position,
            path,
            handle,
        });
    }

    /// Waits for every pending import and binds it into the file scope
    ///
    /// A failed load is reported at the import and binds nothing. A
    /// dot-import copies the package's exported bindings into the file scope;
    /// a blank import binds nothing. Both are recorded on their side lists.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.source.file))]
    pub fn resolve_imports(&mut self) {
        for pending in std::mem::take(&mut self.pending) {
            let package = match pending.handle.value() {
                Ok(package) => package,
                Err(source) => {
                    self.diagnostics.report(
                        pending.position,
                        BindError::PackageLoadFailure {
                            path: pending.path,
                            source,
                        },
                    );
                    continue;
                }
            };
            tracing::debug!(path = %pending.path, package = %package.name, "import resolved");

            let index = self.imports.imports.len();
            let decl = match &pending.name {
                ImportName::Dot => {
                    self.bind_dot_import(&package, pending.position);
                    self.imports.dot_imports.push(index);
                    None
                }
                ImportName::Blank => {
                    self.imports.blank_imports.push(index);
                    None
                }
                ImportName::Implicit => {
                    let config = self.session.config();
                    let name = if pending.path == config.foreign_package_path {
                        config.foreign_package_name.as_str()
                    } else {
                        package.name.as_str()
                    };
                    let token = Token::new(
                        self.session.interner().intern(name),
                        name,
                        pending.position,
                    );
                    self.bind_import(token, &pending, &package)
                }
                ImportName::Explicit(token) => self.bind_import(token.clone(), &pending, &package),
            };

            self.imports.imports.push(ResolvedImport {
                name: pending.name,
                path: pending.path,
                package,
                decl,
                position: pending.position,
            });
        }
    }

    fn bind_import(
        &mut self,
        token: Token,
        pending: &ImportDeclaration,
        package: &Arc<Package>,
    ) -> Option<DeclId> {
        let decl = Declaration::import(
            token,
            pending.position,
            pending.path.clone(),
            Arc::clone(package),
        );
        self.declare_in(self.file_scope, decl, DeclSite::Block, pending.position)
    }

    fn bind_dot_import(&mut self, package: &Package, position: FileSpan) {
        for export in package.exports() {
            let mut decl = export.clone();
            decl.position = position;
            self.declare_in(self.file_scope, decl, DeclSite::Block, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_intern::Interner;
    use tn_span::{FileId, Span};

    fn literal(kind: LiteralKind, value: Option<&str>) -> BasicLiteral {
        BasicLiteral {
            kind,
            raw: value.map_or_else(|| "\"\\z\"".to_owned(), |value| format!("\"{value}\"")),
            value: value.map(str::to_owned),
            span: FileSpan::new(FileId::new(0), Span::new(7, 20)),
        }
    }

    fn validate(path: &str) -> Result<Option<String>, BindError> {
        validate_import_path(&literal(LiteralKind::String, Some(path)))
    }

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("fmt"), Ok(Some("fmt".to_owned())));
        assert_eq!(validate("example.com/x/net~v2"), Ok(Some("example.com/x/net~v2".to_owned())));
        assert_eq!(validate("./sub"), Ok(Some("./sub".to_owned())));
        assert_eq!(validate("unicodé/пакет"), Ok(Some("unicodé/пакет".to_owned())));
    }

    #[test]
    fn test_invalid_paths() {
        assert_eq!(validate(""), Err(BindError::EmptyImportPath));
        assert_eq!(
            validate("/abs/pkg"),
            Err(BindError::AbsoluteImportPath {
                path: "/abs/pkg".to_owned()
            })
        );
        assert_eq!(
            validate("a#b"),
            Err(BindError::InvalidImportPathCharacter {
                path: "a#b".to_owned(),
                character: '#'
            })
        );
        for path in [
            "a b",
            "tab\there",
            "zero\u{200B}width",
            "bad\u{FFFD}",
            "private\u{E000}",
            "unassigned\u{0378}",
            "format\u{0890}",
            "tag\u{E0080}",
            "nonchar\u{FFFF}",
        ] {
            assert!(
                matches!(validate(path), Err(BindError::InvalidImportPathCharacter { .. })),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_path_chars_follow_general_category() {
        for c in ['a', 'Я', '\u{0301}', '7', '\u{2167}', '-', '.', '~', '+', '\u{20AC}'] {
            assert!(is_allowed_path_char(c), "{c:?} should be allowed");
        }
        for c in ['\u{0378}', '\u{0890}', '\u{0891}', '\u{E0080}', '\u{D7FF}', '\u{2028}', '\u{00A0}'] {
            assert!(!is_allowed_path_char(c), "U+{:04X} should be rejected", u32::from(c));
        }
    }

    #[test]
    fn test_non_string_literal() {
        assert_eq!(
            validate_import_path(&literal(LiteralKind::Int, None)),
            Err(BindError::InvalidImportLiteral {
                kind: LiteralKind::Int
            })
        );
        assert_eq!(
            BindError::InvalidImportLiteral {
                kind: LiteralKind::Float
            }
            .to_string(),
            "import statement requires a string, found floating-point literal"
        );
    }

    #[test]
    fn test_undecodable_literal_is_dropped() {
        assert_eq!(validate_import_path(&literal(LiteralKind::String, None)), Ok(None));
    }

    #[test]
    fn test_relative_paths() {
        assert!(is_relative_import_path("."));
        assert!(is_relative_import_path(".."));
        assert!(is_relative_import_path("./sub"));
        assert!(is_relative_import_path("../sibling"));
        assert!(!is_relative_import_path("relpkg"));
        assert!(!is_relative_import_path(".hidden"));
        assert!(!is_relative_import_path("...x"));
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("example.com/app", "./sub"), "example.com/app/sub");
        assert_eq!(join_relative("example.com/app", "../lib"), "example.com/lib");
        assert_eq!(join_relative("example.com/app", "."), "example.com/app");
        assert_eq!(join_relative("app", "../../up"), "../up");
        assert_eq!(join_relative("", "./sub"), "sub");
        assert_eq!(join_relative(".", "./util"), "util");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("a//b/./c/"), "a/b/c");
        assert_eq!(clean_path("a/b/../../.."), "..");
        assert_eq!(clean_path("/../x"), "/x");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_classify_names() {
        let interner = Interner::new();
        let well_known = interner.well_known();
        let at = FileSpan::new(FileId::new(0), Span::new(0, 1));
        let dot = Token::new(well_known.dot, ".", at);
        let blank = Token::new(well_known.underscore, "_", at);
        let named = Token::new(interner.intern("str"), "str", at);

        assert_eq!(ImportName::classify(None, well_known), ImportName::Implicit);
        assert_eq!(ImportName::classify(Some(&dot), well_known), ImportName::Dot);
        assert_eq!(ImportName::classify(Some(&blank), well_known), ImportName::Blank);
        assert_eq!(
            ImportName::classify(Some(&named), well_known),
            ImportName::Explicit(named.clone())
        );
    }
}

//! Error types for declaration binding

use crate::loader::LoadError;
use std::fmt;
use tn_span::{FileSpan, FileTable};
use tn_syntax::LiteralKind;

/// Context in which a name was declared twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclSite {
    /// Ordinary declaration, import, or dot-imported member
    Block,
    /// Function parameter, receiver, or named result
    Parameter,
    /// Target of a `:=` in a range or case clause
    ShortVarDecl,
}

impl fmt::Display for DeclSite {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Block => "redeclared in this block",
            Self::Parameter => "redeclared in parameter list",
            Self::ShortVarDecl => "repeated on left side of :=",
        })
    }
}

/// Clause whose short variable declaration declared too many names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortDeclClause {
    /// `k, v := range x`
    Range,
    /// `case v, ok := x:`
    Case,
}

impl fmt::Display for ShortDeclClause {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Range => "range",
            Self::Case => "case",
        })
    }
}

/// Errors reported while binding declarations
///
/// None of these stop the pass: each is reported where it is detected and
/// binding continues with whatever state could be salvaged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// Import path written as a non-string literal
    #[error("import statement requires a string, found {kind} literal")]
    InvalidImportLiteral {
        /// Kind of the offending literal
        kind: LiteralKind,
    },

    /// `import ""`
    #[error("import path is empty")]
    EmptyImportPath,

    /// `import "/abs/pkg"`
    #[error("import path cannot be absolute path: {path:?}")]
    AbsoluteImportPath {
        /// The offending path
        path: String,
    },

    /// Import path with a character outside the allowed set
    #[error("import path {path:?} contains invalid character {character:?}")]
    InvalidImportPathCharacter {
        /// The offending path
        path: String,
        /// First rejected character
        character: char,
    },

    /// Two files of one package disagree on the package name
    #[error(
        "package {import_path}: found packages {first_name} ({first_file}) and {second_name} ({second_file}) in {directory}"
    )]
    PackageNameConflict {
        /// Import path of the package
        import_path: String,
        /// Name fixed by the first file
        first_name: String,
        /// File that fixed the name
        first_file: String,
        /// Conflicting name
        second_name: String,
        /// File declaring the conflicting name
        second_file: String,
        /// Directory holding both files
        directory: String,
    },

    /// Name already bound in the same scope
    #[error("{name} {site}")]
    DuplicateDeclaration {
        /// The name
        name: String,
        /// Kind of declaration that collided
        site: DeclSite,
        /// Location of the binding that was kept
        previous: FileSpan,
    },

    /// More than two targets on the left of a range or case `:=`
    #[error("too many variables declared by the {clause} clause")]
    TooManyShortDeclTargets {
        /// Clause kind
        clause: ShortDeclClause,
    },

    /// Parameter list mixing named and unnamed entries
    #[error("mixed named and unnamed parameters")]
    MixedNamedUnnamedParameters,

    /// `...` on an entry other than the last
    #[error("can only use ... as final argument in list")]
    MisplacedEllipsisParameter,

    /// Imported package could not be loaded
    #[error("could not import {path}: {source}")]
    PackageLoadFailure {
        /// Normalized import path
        path: String,
        /// Failure shared by every importer of the path
        source: LoadError,
    },
}

/// A reported error and where it was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Position the error is reported at
    pub span: FileSpan,
    /// The error
    pub error: BindError,
}

impl Diagnostic {
    /// Creates a diagnostic
    pub fn new(span: FileSpan, error: BindError) -> Self {
        Self { span, error }
    }

    /// Renders the diagnostic with file names, plus a note for redeclarations
    pub fn render(&self, files: &FileTable) -> String {
        let mut rendered = format!("{}: {}", files.display(self.span), self.error);
        if let BindError::DuplicateDeclaration { previous, .. } = &self.error {
            rendered.push_str("\n\tprevious declaration at ");
            rendered.push_str(&files.display(*previous));
        }
        rendered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.span, self.error)
    }
}

/// Diagnostic sink accumulating everything reported during binding
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `error` at `span`
    pub fn report(&mut self, span: FileSpan, error: BindError) {
        tracing::debug!(at = %span, %error, "diagnostic");
        self.items.push(Diagnostic::new(span, error));
    }

    /// Reported diagnostics in report order
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of reported diagnostics
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

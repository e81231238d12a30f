//! Syntax tree consumed by the declaration binding pass
//!
//! The tree is produced by the parser; every grammar alternative the binder
//! cares about is its own variant, so binding code matches on shape instead
//! of checking production numbers. Expressions and types live in per-file
//! arenas and are referenced by [`ExprId`] and [`TypeId`].

pub mod builder;

pub use builder::SourceBuilder;

use la_arena::{Arena, Idx};
use tn_intern::Symbol;
use tn_span::{FileId, FileSpan};

/// Expression node ID
pub type ExprId = Idx<Expr>;
/// Type expression node ID
pub type TypeId = Idx<TypeExpr>;

/// An identifier occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Interned spelling
    pub symbol: Symbol,
    /// Spelling, for diagnostics
    pub text: String,
    /// Source location
    pub span: FileSpan,
}

impl Token {
    /// Creates a token
    pub fn new(symbol: Symbol, text: impl Into<String>, span: FileSpan) -> Self {
        Self {
            symbol,
            text: text.into(),
            span,
        }
    }

    /// Whether the name is visible outside its package
    pub fn is_exported(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Kind of a basic literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `'x'`
    Char,
    /// `1.5`
    Float,
    /// `2i`
    Imaginary,
    /// `42`
    Int,
    /// `"text"` or a raw string
    String,
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Char => "rune",
            Self::Float => "floating-point",
            Self::Imaginary => "imaginary",
            Self::Int => "integer",
            Self::String => "string",
        };
        formatter.write_str(name)
    }
}

/// A literal token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLiteral {
    /// Literal kind
    pub kind: LiteralKind,
    /// Source text, quotes included
    pub raw: String,
    /// Decoded contents of a string literal; `None` when the lexer could not
    /// decode it (it has reported that already) or for other kinds
    pub value: Option<String>,
    /// Source location
    pub span: FileSpan,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `*x`
    Deref,
    /// `&x`
    Addr,
    /// `<-x`
    Recv,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Eq,
    /// `<`
    Lt,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Identifier operand, possibly instantiated: `x` or `List[int]`
    Ident {
        /// The identifier
        token: Token,
        /// Generic argument list, if written
        generic_args: Option<Vec<TypeId>>,
    },
    /// Literal operand
    Literal(BasicLiteral),
    /// `(inner)`
    Paren {
        /// Parenthesized expression
        inner: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// `base.field`
    Selector {
        /// Operand
        base: ExprId,
        /// Selected name
        field: Token,
        /// Source location
        span: FileSpan,
    },
    /// `callee(args)`
    Call {
        /// Called expression
        callee: ExprId,
        /// Arguments
        args: Vec<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// `base[index]`
    Index {
        /// Indexed expression
        base: ExprId,
        /// Index
        index: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// `x.(T)`
    TypeAssert {
        /// Operand
        operand: ExprId,
        /// Asserted type, `None` for `x.(type)`
        ty: Option<TypeId>,
        /// Source location
        span: FileSpan,
    },
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: ExprId,
        /// Right operand
        right: ExprId,
        /// Source location
        span: FileSpan,
    },
}

impl Expr {
    /// Source location of the expression
    pub fn span(&self) -> FileSpan {
        match self {
            Self::Ident { token, .. } => token.span,
            Self::Literal(literal) => literal.span,
            Self::Paren { span, .. }
            | Self::Selector { span, .. }
            | Self::Call { span, .. }
            | Self::Index { span, .. }
            | Self::TypeAssert { span, .. }
            | Self::Unary { span, .. }
            | Self::Binary { span, .. } => *span,
        }
    }
}

/// Type expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`, `pkg.T`, `T[int]`
    Named {
        /// Package qualifier
        package: Option<Token>,
        /// Type name
        name: Token,
        /// Generic argument list, if written
        generic_args: Option<Vec<TypeId>>,
        /// Source location
        span: FileSpan,
    },
    /// `*T`
    Pointer {
        /// Pointee
        elem: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `[]T`
    Slice {
        /// Element type
        elem: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `[N]T`
    Array {
        /// Length expression
        len: ExprId,
        /// Element type
        elem: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `map[K]V`
    Map {
        /// Key type
        key: TypeId,
        /// Value type
        value: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `(T)`
    Paren {
        /// Parenthesized type
        inner: TypeId,
        /// Source location
        span: FileSpan,
    },
}

impl TypeExpr {
    /// Source location of the type
    pub fn span(&self) -> FileSpan {
        match self {
            Self::Named { span, .. }
            | Self::Pointer { span, .. }
            | Self::Slice { span, .. }
            | Self::Array { span, .. }
            | Self::Map { span, .. }
            | Self::Paren { span, .. } => *span,
        }
    }
}

/// Entry of a case clause's argument list: an expression or a type literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    /// Expression argument
    Expr(ExprId),
    /// Type literal argument
    Type(TypeId),
}

/// One entry of a parameter list, as the grammar recognised it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterDecl {
    /// `...T`
    Variadic {
        /// Element type
        ty: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `name ...T`
    NamedVariadic {
        /// Parameter name
        name: Token,
        /// Element type
        ty: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `name T`
    Named {
        /// Parameter name
        name: Token,
        /// Parameter type
        ty: TypeId,
        /// Source location
        span: FileSpan,
    },
    /// `T`, which may turn out to be a parameter name with an elided type
    Type {
        /// Type, or name
        ty: TypeId,
        /// Source location
        span: FileSpan,
    },
}

/// Parenthesized parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    /// Entries in source order
    pub list: Vec<ParameterDecl>,
    /// Source location
    pub span: FileSpan,
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Parameters
    pub params: Parameters,
    /// Results; a single unparenthesized result is a one-entry list
    pub results: Option<Parameters>,
}

/// `name1, name2 T = v1, v2` inside a `const` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstSpec {
    /// Declared names
    pub names: Vec<Token>,
    /// Optional type
    pub ty: Option<TypeId>,
    /// Values
    pub values: Vec<ExprId>,
    /// Source location
    pub span: FileSpan,
}

/// `name1, name2 T = v1, v2` inside a `var` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    /// Declared names
    pub names: Vec<Token>,
    /// Optional type
    pub ty: Option<TypeId>,
    /// Initializers
    pub values: Vec<ExprId>,
    /// Source location
    pub span: FileSpan,
}

/// `import name "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name: an identifier, `.`, or `_`
    pub name: Option<Token>,
    /// Import path literal
    pub path: BasicLiteral,
    /// Source location
    pub span: FileSpan,
}

/// `package name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageClause {
    /// Package name
    pub name: Token,
    /// Source location
    pub span: FileSpan,
}

/// Range clause of a `for` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeClause {
    /// `k, v := range expr`
    Define {
        /// Declared targets
        lhs: Vec<ExprId>,
        /// Ranged expression
        expr: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// `k, v = range expr`
    Assign {
        /// Assigned targets
        lhs: Vec<ExprId>,
        /// Ranged expression
        expr: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// `range expr`
    Bare {
        /// Ranged expression
        expr: ExprId,
        /// Source location
        span: FileSpan,
    },
}

/// Head of a switch case clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchCase {
    /// `case a, b:`
    Case {
        /// Matched values or types
        args: Vec<Argument>,
        /// Source location
        span: FileSpan,
    },
    /// `case v, ok := expr:`
    Define {
        /// Declared targets
        args: Vec<Argument>,
        /// Guard expression
        expr: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// `default:`
    Default {
        /// Source location
        span: FileSpan,
    },
}

/// One clause of a switch statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// Clause head
    pub case: SwitchCase,
    /// Clause body
    pub body: Vec<Stmt>,
    /// Source location
    pub span: FileSpan,
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Statements
    pub stmts: Vec<Stmt>,
    /// Source location
    pub span: FileSpan,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Local constant declaration
    Const(Vec<ConstSpec>),
    /// Local variable declaration
    Var(Vec<VarSpec>),
    /// Expression statement
    Expr(ExprId),
    /// Nested block
    Block(Block),
    /// `for` loop, with an optional range clause
    For {
        /// Range clause
        range: Option<RangeClause>,
        /// Loop body
        body: Block,
        /// Source location
        span: FileSpan,
    },
    /// `switch` statement
    Switch {
        /// Switch tag
        tag: Option<ExprId>,
        /// Clauses
        clauses: Vec<CaseClause>,
        /// Source location
        span: FileSpan,
    },
    /// `return`
    Return {
        /// Returned values
        values: Vec<ExprId>,
        /// Source location
        span: FileSpan,
    },
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Method receiver
    pub receiver: Option<Parameters>,
    /// Function name
    pub name: Token,
    /// Signature
    pub signature: Signature,
    /// Body; absent for external functions
    pub body: Option<Block>,
    /// Source location
    pub span: FileSpan,
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// `const (...)`
    Const(Vec<ConstSpec>),
    /// `var (...)`
    Var(Vec<VarSpec>),
    /// `func ...`
    Func(FuncDecl),
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File identity
    pub file: FileId,
    /// Package clause
    pub package: PackageClause,
    /// Import specs in source order
    pub imports: Vec<ImportSpec>,
    /// Top-level declarations in source order
    pub decls: Vec<Decl>,
    /// Expression arena
    pub exprs: Arena<Expr>,
    /// Type expression arena
    pub types: Arena<TypeExpr>,
}

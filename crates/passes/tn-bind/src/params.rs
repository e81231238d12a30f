//! Parameter list disambiguation
//!
//! `func(a, b int)` and `func(a, b)` start the same way: whether `a` names a
//! parameter or is its type is only known once a later entry shows whether
//! the list has names at all. The list is scanned once, left to right; a
//! named entry back-patches the unnamed entries immediately before it into
//! parameter names.

use crate::binder::FileBinder;
use crate::decl::Declaration;
use crate::error::{BindError, DeclSite, Diagnostics};
use crate::ident::bare_type_name;
use la_arena::Arena;
use tn_span::FileSpan;
use tn_syntax::{ParameterDecl, Parameters, Token, TypeExpr, TypeId};

/// Grammatical shape of a parameter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// `...T`
    Variadic,
    /// `name ...T`
    NamedVariadic,
    /// `name T`
    Named,
    /// `T`
    Type,
}

/// A parameter entry after disambiguation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    /// Shape as parsed
    pub shape: ParamShape,
    /// Written name, or for a `T` entry the identifier `T` consists of
    pub name: Option<Token>,
    /// Declared type
    pub ty: TypeId,
    /// Source location
    pub span: FileSpan,
    /// A `T` entry that turned out to be a parameter name
    pub is_param_name: bool,
}

impl ParamEntry {
    fn new(shape: ParamShape, name: Option<Token>, ty: TypeId, span: FileSpan) -> Self {
        Self {
            shape,
            name,
            ty,
            span,
            is_param_name: false,
        }
    }

    /// Whether the entry was written with `...`
    pub fn is_variadic(&self) -> bool {
        matches!(self.shape, ParamShape::Variadic | ParamShape::NamedVariadic)
    }

    /// Name the entry declares, if any
    pub fn declared_name(&self) -> Option<&Token> {
        match self.shape {
            ParamShape::NamedVariadic | ParamShape::Named => self.name.as_ref(),
            ParamShape::Type if self.is_param_name => self.name.as_ref(),
            ParamShape::Type | ParamShape::Variadic => None,
        }
    }
}

/// A classified parameter list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamList {
    /// Entries in source order
    pub entries: Vec<ParamEntry>,
    /// Whether any entry was written with a name
    pub named: bool,
}

impl ParamList {
    /// Names the list declares, in source order
    pub fn names(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter().filter_map(ParamEntry::declared_name)
    }
}

/// Scans a parameter list, reporting misplaced `...` and unnamed variadics
/// after named entries
pub fn classify_parameters(
    params: &Parameters,
    types: &Arena<TypeExpr>,
    diagnostics: &mut Diagnostics,
) -> ParamList {
    let mut list = ParamList {
        entries: Vec::with_capacity(params.list.len()),
        named: false,
    };
    let last = params.list.len().saturating_sub(1);

    for (index, decl) in params.list.iter().enumerate() {
        let is_last = index == last;
        let entry = match decl {
            ParameterDecl::Variadic { ty, span } => {
                if !is_last {
                    diagnostics.report(*span, BindError::MisplacedEllipsisParameter);
                }
                if list.named {
                    diagnostics.report(*span, BindError::MixedNamedUnnamedParameters);
                }
                ParamEntry::new(ParamShape::Variadic, None, *ty, *span)
            }
            ParameterDecl::NamedVariadic { name, ty, span } => {
                list.named = true;
                if !is_last {
                    diagnostics.report(*span, BindError::MisplacedEllipsisParameter);
                }
                back_patch(&mut list.entries);
                ParamEntry::new(ParamShape::NamedVariadic, Some(name.clone()), *ty, *span)
            }
            ParameterDecl::Named { name, ty, span } => {
                list.named = true;
                back_patch(&mut list.entries);
                ParamEntry::new(ParamShape::Named, Some(name.clone()), *ty, *span)
            }
            ParameterDecl::Type { ty, span } => {
                let name = bare_type_name(types, *ty).cloned();
                ParamEntry::new(ParamShape::Type, name, *ty, *span)
            }
        };
        list.entries.push(entry);
    }
    list
}

/// Marks the run of bare-identifier `T` entries ending the list as names
fn back_patch(entries: &mut [ParamEntry]) {
    for entry in entries.iter_mut().rev() {
        if entry.shape != ParamShape::Type || entry.name.is_none() {
            break;
        }
        entry.is_param_name = true;
    }
}

impl FileBinder<'_> {
    /// Disambiguates a parameter, receiver, or result list and declares its
    /// names into the current scope
    ///
    /// An unnamed list declares nothing. In a named list every entry needs a
    /// name; a `T` entry that was not back-patched is reported as mixing
    /// named and unnamed parameters.
    pub fn bind_parameters(&mut self, params: &Parameters) -> ParamList {
        let list = classify_parameters(params, &self.source.types, self.diagnostics);
        if !list.named {
            return list;
        }

        for entry in &list.entries {
            match entry.declared_name() {
                Some(name) => {
                    let decl = Declaration::parameter(name.clone(), entry.is_variadic());
                    self.declare(decl, DeclSite::Parameter);
                }
                None if entry.shape == ParamShape::Type => {
                    self.diagnostics
                        .report(entry.span, BindError::MixedNamedUnnamedParameters);
                }
                None => {}
            }
        }
        list
    }
}

//! # Abstract Syntax Tree (AST)
//!
//! Data structures representing parsed Jack source code.
//!
//! ## Structure
//!
//! A tree is either a terminal leaf (one of the five token kinds) or an
//! inner node tagged with a [`NodeKind`] holding an ordered child list. The
//! full token sequence of the source is preserved in the tree: punctuation
//! appears as `Symbol` leaves alongside the structured children.
//!
//! Identifier leaves additionally carry an optional [`ScopeInfo`] assigned by
//! the scope annotator; the code generator reads segments and indices from
//! there instead of re-resolving names.

use std::fmt;

use crate::symbols::Kind;
use crate::tokenizer::token::Keyword;

/// Non-terminal node types of the Jack grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        use NodeKind::*;
        match self {
            Class => "CLASS",
            ClassVarDec => "CLASS_VAR_DEC",
            SubroutineDec => "SUBROUTINE_DEC",
            ParameterList => "PARAMETER_LIST",
            SubroutineBody => "SUBROUTINE_BODY",
            VarDec => "VAR_DEC",
            Statements => "STATEMENTS",
            LetStatement => "LET_STATEMENT",
            IfStatement => "IF_STATEMENT",
            WhileStatement => "WHILE_STATEMENT",
            DoStatement => "DO_STATEMENT",
            ReturnStatement => "RETURN_STATEMENT",
            Expression => "EXPRESSION",
            Term => "TERM",
            ExpressionList => "EXPRESSION_LIST",
        }
    }
}

/// Whether an annotated identifier introduces the name or refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Declaration,
    Usage,
}

/// Resolution result attached to identifier leaves by the scope annotator.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeInfo {
    /// The class name in its declaration.
    Class { mode: Mode },
    /// A subroutine name in its declaration.
    Subroutine { mode: Mode },
    /// A variable resolved through the symbol table.
    Var {
        kind: Kind,
        index: u16,
        typ: String,
        mode: Mode,
    },
}

/// A node of the Jack syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum JackAst {
    Keyword(Keyword),
    Symbol(char),
    IntConst(u16),
    StrConst(String),
    Identifier {
        name: String,
        scope: Option<ScopeInfo>,
    },
    Node {
        kind: NodeKind,
        children: Vec<JackAst>,
    },
}

impl JackAst {
    pub fn identifier(name: impl Into<String>) -> Self {
        JackAst::Identifier {
            name: name.into(),
            scope: None,
        }
    }

    pub fn node(kind: NodeKind, children: Vec<JackAst>) -> Self {
        JackAst::Node { kind, children }
    }

    /// Children of an inner node of the given kind, if this is one.
    pub fn children_of(&self, kind: NodeKind) -> Option<&[JackAst]> {
        match self {
            JackAst::Node { kind: k, children } if *k == kind => Some(children),
            _ => None,
        }
    }

    pub fn is_node(&self, kind: NodeKind) -> bool {
        matches!(self, JackAst::Node { kind: k, .. } if *k == kind)
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            JackAst::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<char> {
        match self {
            JackAst::Symbol(sym) => Some(*sym),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self {
            JackAst::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    pub fn scope_info(&self) -> Option<&ScopeInfo> {
        match self {
            JackAst::Identifier { scope, .. } => scope.as_ref(),
            _ => None,
        }
    }

    fn fmt_rec(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(4 * indent);
        match self {
            JackAst::Keyword(kw) => write!(f, "{pad}KEYWORD: {kw}"),
            JackAst::Symbol(sym) => write!(f, "{pad}SYMBOL: {sym}"),
            JackAst::IntConst(value) => write!(f, "{pad}INTEGER_CONSTANT: {value}"),
            JackAst::StrConst(value) => write!(f, "{pad}STRING_CONSTANT: {value}"),
            JackAst::Identifier { name, .. } => write!(f, "{pad}IDENTIFIER: {name}"),
            JackAst::Node { kind, children } => {
                write!(f, "{pad}{}", kind.as_str())?;
                for child in children {
                    writeln!(f)?;
                    child.fmt_rec(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Renders the tree with 4-space indentation per nesting level.
impl fmt::Display for JackAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_rec(f, 0)
    }
}

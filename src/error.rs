use thiserror::Error;

/// Location of a lexeme in its source file.
///
/// `start`/`end` are byte offsets; `line`/`col` are 1-indexed. Line-oriented
/// inputs (`.vm`, `.asm`) use column 1 for the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    /// Span covering a whole source line.
    pub fn line(line: usize) -> Self {
        Span {
            start: 0,
            end: 0,
            line,
            col: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("ERROR (line {}:{}): {message}", .span.line, .span.col)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexing .jack source
    UnexpectedCharacter,
    IntegerOutOfRange,
    UnterminatedString,
    UnterminatedComment,

    // Parsing .jack token streams
    MalformedClass,
    TrailingTokens,

    // Scope annotation
    DuplicateSymbol,

    // VM code generation (structurally impossible AST)
    MalformedAst,

    // Parsing .vm programs
    UnknownCommand,
    UnknownSegment,
    MissingArgument,
    InvalidIndex,
    ConstantPop,

    // Assembling .asm programs
    DuplicateLabel,
    UnknownComp,
    UnknownDest,
    UnknownJump,
    InvalidSymbol,
    AddressOutOfRange,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        CompileError {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn duplicate_symbol(name: &str, span: Span) -> Self {
        CompileError::new(
            ErrorKind::DuplicateSymbol,
            format!("'{name}' is already defined in this scope"),
            span,
        )
    }

    pub fn duplicate_label(label: &str, first: u16, span: Span) -> Self {
        CompileError::new(
            ErrorKind::DuplicateLabel,
            format!("Label '{label}' is already bound to ROM address {first}"),
            span,
        )
    }

    pub fn malformed_ast(context: &str) -> Self {
        CompileError::new(
            ErrorKind::MalformedAst,
            format!("Malformed syntax tree: {context}"),
            Span::line(0),
        )
    }
}

//! # VM Translator
//!
//! Translates stack-VM programs into Hack assembly.
//!
//! ## Pipeline
//!
//! 1. [`parse_commands`] turns one `.vm` source into typed [`VmCommand`]s,
//!    accumulating errors with line numbers
//! 2. [`CodeWriter`] emits Hack assembly per command, carrying the per-file
//!    static prefix and the per-program label counters
//!
//! Translating a whole program directory means parsing each file, calling
//! `set_filename`, and streaming every file's commands through one writer,
//! with the bootstrap prologue (`SP=256; call Sys.init 0`) emitted first.

pub mod code_writer;
pub mod command;


use crate::error::{CompileError, ErrorKind, Span};
pub use code_writer::CodeWriter;
pub use command::{ArithOp, Segment, VmCommand};

/// A parsed command and the 1-indexed source line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: VmCommand,
    pub line: usize,
}

pub struct ParseResult {
    pub commands: Vec<Command>,
    pub errors: Vec<CompileError>,
}

/// Parse a `.vm` source. Blank lines and `//` comments (full-line or inline)
/// are skipped; parsing continues past bad lines so every error is reported.
#[must_use]
pub fn parse_commands(source: &str) -> ParseResult {
    let mut commands = Vec::new();
    let mut errors = Vec::new();

    for (i, raw_line) in source.lines().enumerate() {
        let line_number = i + 1;
        let code = raw_line.split("//").next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        match parse_line(code, line_number) {
            Ok(kind) => commands.push(Command {
                kind,
                line: line_number,
            }),
            Err(err) => errors.push(err),
        }
    }

    ParseResult { commands, errors }
}

fn parse_line(code: &str, line_number: usize) -> Result<VmCommand, CompileError> {
    let span = Span::line(line_number);
    let mut words = code.split_whitespace();
    let head = words.next().unwrap_or("");

    let command = match head {
        "push" | "pop" => {
            let segment_word = words.next().ok_or_else(|| {
                CompileError::new(
                    ErrorKind::MissingArgument,
                    format!("'{head}' requires a segment and an index"),
                    span,
                )
            })?;
            let segment = Segment::from_word(segment_word).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::UnknownSegment,
                    format!("Unknown segment '{segment_word}'"),
                    span,
                )
            })?;
            let index = parse_index(words.next(), head, span)?;
            if let Some(max) = segment.max_index() {
                if index > max {
                    return Err(CompileError::new(
                        ErrorKind::InvalidIndex,
                        format!("Index {index} out of range for segment {segment} (0-{max})"),
                        span,
                    ));
                }
            }
            if head == "push" {
                VmCommand::Push { segment, index }
            } else {
                if segment == Segment::Constant {
                    return Err(CompileError::new(
                        ErrorKind::ConstantPop,
                        "Cannot pop to the constant segment",
                        span,
                    ));
                }
                VmCommand::Pop { segment, index }
            }
        }
        "label" => VmCommand::Label(parse_label(words.next(), head, span)?),
        "goto" => VmCommand::Goto(parse_label(words.next(), head, span)?),
        "if-goto" => VmCommand::IfGoto(parse_label(words.next(), head, span)?),
        "function" => {
            let name = parse_label(words.next(), head, span)?;
            let locals = parse_index(words.next(), head, span)?;
            VmCommand::Function { name, locals }
        }
        "call" => {
            let name = parse_label(words.next(), head, span)?;
            let args = parse_index(words.next(), head, span)?;
            VmCommand::Call { name, args }
        }
        "return" => VmCommand::Return,
        word => match ArithOp::from_word(word) {
            Some(op) => VmCommand::Arithmetic(op),
            None => {
                return Err(CompileError::new(
                    ErrorKind::UnknownCommand,
                    format!("Unknown command '{word}'"),
                    span,
                ));
            }
        },
    };

    if let Some(extra) = words.next() {
        return Err(CompileError::new(
            ErrorKind::UnknownCommand,
            format!("Unexpected operand '{extra}' after '{head}' command"),
            span,
        ));
    }
    Ok(command)
}

fn parse_index(word: Option<&str>, command: &str, span: Span) -> Result<u16, CompileError> {
    let word = word.ok_or_else(|| {
        CompileError::new(
            ErrorKind::MissingArgument,
            format!("'{command}' requires a numeric operand"),
            span,
        )
    })?;
    word.parse::<u16>().map_err(|_| {
        CompileError::new(
            ErrorKind::InvalidIndex,
            format!("Invalid index '{word}' (must be a non-negative integer)"),
            span,
        )
    })
}

fn parse_label(word: Option<&str>, command: &str, span: Span) -> Result<String, CompileError> {
    let word = word.ok_or_else(|| {
        CompileError::new(
            ErrorKind::MissingArgument,
            format!("'{command}' requires a symbol operand"),
            span,
        )
    })?;
    Ok(word.to_string())
}

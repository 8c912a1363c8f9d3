//! # Assembly Line Parser
//!
//! Splits `.asm` source into the three Hack instruction kinds. All
//! whitespace inside a line is insignificant (`D = A` equals `D=A`), `//`
//! comments and blank lines are skipped.

use crate::error::{CompileError, ErrorKind, Span};

/// Largest address loadable by an A-instruction (15 bits).
pub const MAX_ADDRESS: u32 = 32767;

/// One parsed line of Hack assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInstruction {
    /// `@x` with a literal address
    AddressLiteral(u16),
    /// `@x` with a symbolic address
    AddressSymbol(String),
    /// `dest=comp;jump` with dest and jump optional
    Compute {
        dest: Option<String>,
        comp: String,
        jump: Option<String>,
    },
    /// `(SYMBOL)` label definition
    Label(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsmLine {
    pub instruction: AsmInstruction,
    /// 1-indexed source line
    pub line: usize,
}

pub struct ParseResult {
    pub lines: Vec<AsmLine>,
    pub errors: Vec<CompileError>,
}

/// Hack symbols: letters, digits, `_`, `.`, `$`, `:`; no leading digit.
fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || "_.$:".contains(c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || "_.$:".contains(c))
}

#[must_use]
pub fn parse_source(source: &str) -> ParseResult {
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for (i, raw_line) in source.lines().enumerate() {
        let line_number = i + 1;
        let code: String = raw_line
            .split("//")
            .next()
            .unwrap_or("")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if code.is_empty() {
            continue;
        }
        match parse_line(&code, line_number) {
            Ok(instruction) => lines.push(AsmLine {
                instruction,
                line: line_number,
            }),
            Err(err) => errors.push(err),
        }
    }

    ParseResult { lines, errors }
}

fn parse_line(code: &str, line_number: usize) -> Result<AsmInstruction, CompileError> {
    let span = Span::line(line_number);

    if let Some(operand) = code.strip_prefix('@') {
        return parse_a_instruction(operand, span);
    }

    if let Some(inner) = code.strip_prefix('(') {
        let symbol = inner.strip_suffix(')').ok_or_else(|| {
            CompileError::new(ErrorKind::InvalidSymbol, "Unclosed label definition", span)
        })?;
        if !is_valid_symbol(symbol) {
            return Err(CompileError::new(
                ErrorKind::InvalidSymbol,
                format!("Invalid label '{symbol}'"),
                span,
            ));
        }
        return Ok(AsmInstruction::Label(symbol.to_string()));
    }

    // C-instruction: dest=comp;jump with optional dest and jump
    let (dest, rest) = match code.split_once('=') {
        Some((dest, rest)) => (Some(dest.to_string()), rest),
        None => (None, code),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp.to_string(), Some(jump.to_string())),
        None => (rest.to_string(), None),
    };
    Ok(AsmInstruction::Compute { dest, comp, jump })
}

fn parse_a_instruction(operand: &str, span: Span) -> Result<AsmInstruction, CompileError> {
    if operand.chars().all(|c| c.is_ascii_digit()) && !operand.is_empty() {
        let value = operand.parse::<u32>().unwrap_or(u32::MAX);
        if value > MAX_ADDRESS {
            return Err(CompileError::new(
                ErrorKind::AddressOutOfRange,
                format!("Address {operand} exceeds {MAX_ADDRESS}"),
                span,
            ));
        }
        return Ok(AsmInstruction::AddressLiteral(value as u16));
    }
    if !is_valid_symbol(operand) {
        return Err(CompileError::new(
            ErrorKind::InvalidSymbol,
            format!("Invalid symbol '{operand}'"),
            span,
        ));
    }
    Ok(AsmInstruction::AddressSymbol(operand.to_string()))
}

//! # Hack Assembler
//!
//! Two-pass assembler for symbolic Hack assembly.
//!
//! ## Pipeline
//!
//! 1. **Line parser**: splits source into A-instructions, C-instructions
//!    and label definitions
//! 2. **First pass**: binds `(LABEL)` definitions to ROM addresses
//! 3. **Second pass**: resolves symbols (allocating RAM slots for
//!    variables) and emits one 16-bit word per executable instruction

pub mod encoding;
pub mod instruction;
pub mod symbols;


use crate::error::{CompileError, ErrorKind, Span};
use instruction::{AsmInstruction, AsmLine};
use symbols::SymbolTable;

pub struct AssembleResult {
    /// One word per executable instruction, ROM order.
    pub machine_code: Vec<u16>,
    pub errors: Vec<CompileError>,
}

#[must_use]
pub fn assemble(source: &str) -> AssembleResult {
    let parsed = instruction::parse_source(source);
    let mut errors = parsed.errors;

    let mut table = SymbolTable::new();
    first_pass(&parsed.lines, &mut table, &mut errors);
    let machine_code = second_pass(&parsed.lines, &mut table, &mut errors);

    AssembleResult {
        machine_code,
        errors,
    }
}

/// Render assembled words as `.hack` lines: 16 binary digits each.
pub fn to_binary_lines(machine_code: &[u16]) -> Vec<String> {
    machine_code.iter().map(|w| format!("{w:016b}")).collect()
}

/// Bind each label to the ROM address of the next executable instruction.
fn first_pass(lines: &[AsmLine], table: &mut SymbolTable, errors: &mut Vec<CompileError>) {
    let mut rom_index: u16 = 0;
    for line in lines {
        match &line.instruction {
            AsmInstruction::Label(symbol) => {
                if let Err(previous) = table.bind_label(symbol, rom_index) {
                    errors.push(CompileError::duplicate_label(
                        symbol,
                        previous,
                        Span::line(line.line),
                    ));
                }
            }
            _ => rom_index = rom_index.wrapping_add(1),
        }
    }
}

fn second_pass(
    lines: &[AsmLine],
    table: &mut SymbolTable,
    errors: &mut Vec<CompileError>,
) -> Vec<u16> {
    let mut machine_code = Vec::new();

    for line in lines {
        let span = Span::line(line.line);
        match &line.instruction {
            AsmInstruction::Label(_) => {}
            AsmInstruction::AddressLiteral(address) => {
                machine_code.push(encoding::encode_a(*address));
            }
            AsmInstruction::AddressSymbol(symbol) => {
                machine_code.push(encoding::encode_a(table.resolve_or_allocate(symbol)));
            }
            AsmInstruction::Compute { dest, comp, jump } => {
                let comp_bits = match encoding::comp_bits(comp) {
                    Some(bits) => bits,
                    None => {
                        errors.push(CompileError::new(
                            ErrorKind::UnknownComp,
                            format!("Unknown comp expression '{comp}'"),
                            span,
                        ));
                        continue;
                    }
                };
                let dest_bits = match dest {
                    None => 0,
                    Some(dest) => match encoding::dest_bits(dest) {
                        Some(bits) => bits,
                        None => {
                            errors.push(CompileError::new(
                                ErrorKind::UnknownDest,
                                format!("Unknown dest '{dest}'"),
                                span,
                            ));
                            continue;
                        }
                    },
                };
                let jump_bits = match jump {
                    None => 0,
                    Some(jump) => match encoding::jump_bits(jump) {
                        Some(bits) => bits,
                        None => {
                            errors.push(CompileError::new(
                                ErrorKind::UnknownJump,
                                format!("Unknown jump '{jump}'"),
                                span,
                            ));
                            continue;
                        }
                    },
                };
                machine_code.push(encoding::encode_c(comp_bits, dest_bits, jump_bits));
            }
        }
    }

    machine_code
}

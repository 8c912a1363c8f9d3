//! # Hack Toolchain
//!
//! The nand2tetris software stack: three translators that compose end to end,
//! taking a Jack program all the way down to Hack machine code.
//!
//! ## Pipeline
//!
//! 1. **JackCompiler** (`.jack` → `.vm`): tokenizer, recursive-descent
//!    parser, scope annotator, and a tree-walking VM writer
//! 2. **VMTranslator** (`.vm` → `.asm`): stack-machine semantics and the
//!    full calling convention as Hack assembly
//! 3. **Assembler** (`.asm` → `.hack`): two-pass symbol resolution and
//!    16-bit instruction encoding
//!
//! ## Example
//!
//! ```rust
//! use hack_toolchain::{parser, scope, tokenizer, vm_writer};
//!
//! let source = "class Main { function void main() { return; } }";
//! let lexed = tokenizer::tokenize(source);
//! assert!(lexed.errors.is_empty());
//! let mut ast = parser::parse(&lexed.tokens).unwrap();
//! scope::annotate(&mut ast).unwrap();
//! let vm_code = vm_writer::write_vm(&ast).unwrap();
//! assert_eq!(vm_code[0], "function Main.main 0");
//! ```

pub mod assembler;
pub mod error;
pub mod parser;
pub mod scope;
pub mod symbols;
pub mod tokenizer;
pub mod vm_translator;
pub mod vm_writer;

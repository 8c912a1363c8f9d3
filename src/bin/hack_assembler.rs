//! Command-line driver for the Hack assembler.
//!
//! Assembles one `.asm` file into a `.hack` binary image, one 16-character
//! line of `0`/`1` per instruction.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::assembler::{assemble, to_binary_lines};

#[derive(Parser, Debug)]
#[command(name = "hack-assembler")]
#[command(about = "Assemble symbolic Hack assembly into binary", long_about = None)]
#[command(version)]
struct Cli {
    /// The .asm file to assemble
    input: PathBuf,

    /// Output file (defaults to the input with a .hack extension)
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let result = assemble(&source);
    if !result.errors.is_empty() {
        for err in &result.errors {
            eprintln!("{}: {}", cli.input.display(), err);
        }
        bail!("{}: assembly failed", cli.input.display());
    }

    let out_path = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("hack"));
    let lines = to_binary_lines(&result.machine_code);
    fs::write(&out_path, lines.join("\n") + "\n")
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

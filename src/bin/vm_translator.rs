//! Command-line driver for the VM translator.
//!
//! Translates a `.vm` file into a sibling `.asm`, or a directory of `.vm`
//! files into `<dir>/<dirname>.asm` with the bootstrap prologue prepended
//! (suppressed by the `no_bootstrap` argument).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::vm_translator::{parse_commands, CodeWriter};

#[derive(Parser, Debug)]
#[command(name = "vm-translator")]
#[command(about = "Translate stack-VM programs to Hack assembly", long_about = None)]
#[command(version)]
struct Cli {
    /// A .vm file or a directory of .vm files
    input: PathBuf,

    /// Skip the SP=256 / Sys.init prologue when translating a directory
    #[arg(value_parser = ["no_bootstrap"])]
    no_bootstrap: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (files, out_path, bootstrap) = if cli.input.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(&cli.input)
            .with_context(|| format!("Failed to read directory {}", cli.input.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
            .collect();
        if files.is_empty() {
            bail!("No .vm files found in {}", cli.input.display());
        }
        files.sort();
        let basename = cli
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        let out_path = cli.input.join(format!("{basename}.asm"));
        (files, out_path, cli.no_bootstrap.is_none())
    } else if cli.input.is_file() {
        let out_path = cli.input.with_extension("asm");
        (vec![cli.input.clone()], out_path, false)
    } else {
        bail!("Input path {} does not exist", cli.input.display());
    };

    let mut writer = CodeWriter::new();
    if bootstrap {
        writer.write_bootstrap();
    }

    let mut failed = false;
    for path in &files {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let parsed = parse_commands(&source);
        for err in &parsed.errors {
            eprintln!("{}: {}", path.display(), err);
        }
        if !parsed.errors.is_empty() {
            failed = true;
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.set_filename(&stem);
        for command in &parsed.commands {
            writer.write_command(&command.kind);
        }
    }
    if failed {
        bail!("Translation failed");
    }

    let asm = writer.into_asm();
    write_lines(&out_path, &asm)?;
    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))
}

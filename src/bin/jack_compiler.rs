//! Command-line driver for the Jack compiler.
//!
//! Compiles a `.jack` file, or every `.jack` file in a directory, into
//! sibling `.vm` files. `--tokenize-only` emits token XML instead; `--debug`
//! prints the syntax tree and the VM listing to stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::tokenizer::token::Token;
use hack_toolchain::tokenizer::{tokenize, Tokenizer};
use hack_toolchain::{parser, scope, vm_writer};

#[derive(Parser, Debug)]
#[command(name = "jack-compiler")]
#[command(about = "Compile Jack classes to stack-VM code", long_about = None)]
#[command(version)]
struct Cli {
    /// A .jack file or a directory containing .jack files
    input: PathBuf,

    /// Emit token XML instead of VM code
    #[arg(long = "tokenize-only")]
    tokenize_only: bool,

    /// Directory for output files (defaults to the input's directory)
    #[arg(long = "output-folder")]
    output_folder: Option<PathBuf>,

    /// Print the syntax tree and the VM listing
    #[arg(long = "debug")]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for path in discover_inputs(&cli.input)? {
        compile_file(&path, &cli)?;
    }
    Ok(())
}

/// Resolve the input argument to the list of `.jack` files to compile.
fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if input.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(input)
            .with_context(|| format!("Failed to read directory {}", input.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        if files.is_empty() {
            bail!("No .jack files found in {}", input.display());
        }
        files.sort();
        return Ok(files);
    }
    bail!("Input path {} does not exist", input.display());
}

fn compile_file(path: &Path, cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let lexed = tokenize(&source);
    if !lexed.errors.is_empty() {
        for err in &lexed.errors {
            eprintln!("{}: {}", path.display(), err);
        }
        bail!("{}: tokenization failed", path.display());
    }

    let (output, extension) = if cli.tokenize_only {
        (tokens_to_xml(lexed.tokens), "xml")
    } else {
        let mut ast = parser::parse(&lexed.tokens)
            .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
        scope::annotate(&mut ast)
            .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
        let vm_code = vm_writer::write_vm(&ast)
            .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))?;
        if cli.debug {
            println!("{ast}");
            for line in &vm_code {
                println!("{line}");
            }
        }
        (vm_code.join("\n"), "vm")
    };

    let out_path = output_path(path, cli.output_folder.as_deref(), extension);
    fs::write(&out_path, output + "\n")
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

fn output_path(input: &Path, output_folder: Option<&Path>, extension: &str) -> PathBuf {
    let folder = output_folder
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")).to_path_buf());
    folder.join(input.with_extension(extension).file_name().unwrap_or_default())
}

/// Render the token stream as the classic `<tokens>` XML document.
fn tokens_to_xml(tokens: Vec<Token>) -> String {
    let mut tkz = Tokenizer::new(tokens);
    let mut out = String::from("<tokens>\n");
    while tkz.has_more_tokens() {
        tkz.advance();
        let (tag, value) = if let Some(kw) = tkz.keyword() {
            ("keyword", kw.to_string())
        } else if let Some(sym) = tkz.symbol() {
            ("symbol", sym.to_string())
        } else if let Some(value) = tkz.int_val() {
            ("integerConstant", value.to_string())
        } else if let Some(value) = tkz.string_val() {
            ("stringConstant", value.to_string())
        } else if let Some(name) = tkz.identifier() {
            ("identifier", name.to_string())
        } else {
            continue;
        };
        out.push_str(&format!("<{tag}> {} </{tag}>\n", escape_xml(&value)));
    }
    out.push_str("</tokens>");
    out
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

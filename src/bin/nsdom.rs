//! nsdom CLI: format, compare and inspect XML documents.

use clap::{Args, Parser, Subcommand};
use nsdom::{Element, OutputOptions, choose_prefixes, compare, parse_reader, parse_str, to_writer};
use std::cmp::Ordering;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::process;

#[derive(Parser)]
#[command(name = "nsdom", about = "Namespace-aware XML formatting and comparison")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document and write it back out
    Fmt(FmtArgs),
    /// Compare two documents structurally (exit code 1 if they differ)
    Diff(DiffArgs),
    /// Show the namespace prefixes the serializer would use
    Prefixes(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input file (- for stdin)
    input: String,
}

#[derive(Args)]
struct FmtArgs {
    #[command(flatten)]
    common: InputArgs,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Re-indent element-only content
    #[arg(long)]
    reindent: bool,

    /// Indentation per level (with --reindent)
    #[arg(long, default_value = nsdom::options::DEFAULT_INDENT)]
    indent: String,

    /// Write an XML declaration first
    #[arg(long)]
    declaration: bool,
}

#[derive(Args)]
struct DiffArgs {
    /// First document (- for stdin)
    a: String,

    /// Second document
    b: String,

    /// Compare text trimmed of surrounding whitespace
    #[arg(long)]
    ignore_whitespace: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32, String> {
    match cli.command {
        Command::Fmt(args) => run_fmt(args).map(|()| 0),
        Command::Diff(args) => run_diff(args),
        Command::Prefixes(args) => run_prefixes(args).map(|()| 0),
    }
}

fn load(path: &str) -> Result<Element, String> {
    if path == "-" {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            eprintln!("reading from stdin (Ctrl+D to finish)...");
        }
        return parse_reader(stdin.lock(), None).map_err(|e| e.to_string());
    }
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read '{path}': {e}"))?;
    parse_str(&text, Some(Path::new(path))).map_err(|e| e.to_string())
}

fn run_fmt(args: FmtArgs) -> Result<(), String> {
    let root = load(&args.common.input)?;
    let options = OutputOptions::default()
        .with_reindent(args.reindent)
        .with_indent(args.indent)
        .with_xml_declaration(args.declaration);

    match args.output.as_deref() {
        Some(path) if path != "-" => {
            let file = std::fs::File::create(path).map_err(|e| format!("cannot create '{path}': {e}"))?;
            to_writer(&root, std::io::BufWriter::new(file), &options).map_err(|e| e.to_string())
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            to_writer(&root, &mut stdout, &options).map_err(|e| e.to_string())?;
            writeln!(stdout).map_err(|e| e.to_string())
        }
    }
}

fn run_diff(args: DiffArgs) -> Result<i32, String> {
    let a = load(&args.a)?;
    let b = load(&args.b)?;
    match compare(&a, &b, args.ignore_whitespace) {
        Ordering::Equal => {
            println!("documents are equal");
            Ok(0)
        }
        ord => {
            let relation = if ord == Ordering::Less { "sorts before" } else { "sorts after" };
            println!("documents differ: {} {relation} {}", args.a, args.b);
            Ok(1)
        }
    }
}

fn run_prefixes(args: InputArgs) -> Result<(), String> {
    let root = load(&args.input)?;
    for (uri, prefix) in choose_prefixes(&root).iter() {
        if prefix.is_empty() {
            println!("(default)\t{uri}");
        } else {
            println!("{prefix}\t{uri}");
        }
    }
    Ok(())
}

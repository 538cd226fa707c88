// File: ./src/cli.rs
//! Shared command-line interface logic: argument parsing and help text.
use anyhow::{Result, anyhow, bail};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every date in the document becomes a candidate event.
    Extract,
    /// Named assessments from a course syllabus.
    Syllabus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub mode: Mode,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub min_confidence: Option<f64>,
    pub json: bool,
    pub dry_run: bool,
    pub override_root: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(CliArgs),
}

/// Parses `args` without the binary name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    if args.is_empty() {
        return Ok(Command::Help);
    }

    let mut mode = None;
    let mut input: Option<PathBuf> = None;
    let mut output = None;
    let mut min_confidence = None;
    let mut json = false;
    let mut dry_run = false;
    let mut override_root = None;
    let mut verbose = false;

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| anyhow!("{} expects a value", args[i]))
        };
        match args[i].as_str() {
            "--help" | "-h" | "help" => return Ok(Command::Help),
            "--root" | "-r" => {
                override_root = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--output" | "-o" => {
                output = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--min-confidence" => {
                let raw = value(i)?;
                let v: f64 = raw
                    .parse()
                    .map_err(|_| anyhow!("--min-confidence expects a number, got '{}'", raw))?;
                if !(0.0..=1.0).contains(&v) {
                    bail!("--min-confidence must be between 0 and 1");
                }
                min_confidence = Some(v);
                i += 1;
            }
            "--json" => json = true,
            "--dry-run" | "-n" => dry_run = true,
            "--verbose" | "-v" => verbose = true,
            "extract" if mode.is_none() => mode = Some(Mode::Extract),
            "syllabus" if mode.is_none() => mode = Some(Mode::Syllabus),
            arg if arg.starts_with('-') => bail!("Unknown option '{}'", arg),
            arg => {
                if input.is_some() {
                    bail!("Unexpected argument '{}'", arg);
                }
                input = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    let mode = mode.ok_or_else(|| anyhow!("Missing command (extract or syllabus)"))?;
    let input = input.ok_or_else(|| anyhow!("Missing input file"))?;
    Ok(Command::Run(CliArgs {
        mode,
        input,
        output,
        min_confidence,
        json,
        dry_run,
        override_root,
        verbose,
    }))
}

pub fn print_help(binary_name: &str) {
    println!(
        "Datecal v{} - Turn dates in documents into calendar files",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!(
        "    {} extract <file> [--min-confidence <x>] [--output <dir>] [--dry-run]",
        binary_name
    );
    println!(
        "    {} syllabus <file> [--output <dir>] [--json] [--dry-run]",
        binary_name
    );
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -o, --output <dir>        Directory for the .ics files.");
    println!("    --min-confidence <x>      Skip dates scored below x (0-1, default 0.5).");
    println!("    --json                    Print assessments as JSON.");
    println!("    -n, --dry-run             Show what was found without writing files.");
    println!("    -r, --root <path>         Use a different directory for config and data.");
    println!("    -v, --verbose             Debug logging on stderr.");
    println!("    -h, --help                Show this help message.");
    println!();
    println!("INPUT:");
    println!("    Plain text (.txt) and Word (.docx) documents are supported.");
    println!();
    println!("EXAMPLES:");
    println!(
        "    {} extract memo.txt                        One .ics per date found",
        binary_name
    );
    println!(
        "    {} extract memo.txt --min-confidence 0.8   Only well formed dates",
        binary_name
    );
    println!(
        "    {} syllabus outline.docx --json -n         List assessments only",
        binary_name
    );
    println!();
}

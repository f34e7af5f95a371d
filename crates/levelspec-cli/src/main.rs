use clap::{Parser, Subcommand};
use colored::Colorize;
use levelspec_core::{schemas, Diagnostic, DocumentFile, Error, Group, ParseError, Reader, Schema};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// levelspec - level file checker
///
/// Check, validate, format and fingerprint level description files.
#[derive(Parser)]
#[command(name = "levelspec", version, about, long_about = None)]
struct Cli {
    /// Only print errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log debug detail to stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file parses (syntax only)
    Check {
        /// Path to level file
        file: PathBuf,
        /// Let a built-in schema steer the parse (needed for bare booleans)
        #[arg(long)]
        schema: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a file against a built-in schema
    Validate {
        /// Path to level file
        file: PathBuf,
        /// Schema name: environment, entity or background
        #[arg(long)]
        schema: String,
        /// Reject fields the schema does not declare
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a file in standard layout
    Fmt {
        /// Path to level file
        file: PathBuf,
        /// Let a built-in schema steer the parse
        #[arg(long)]
        schema: Option<String>,
        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Compute the content fingerprint (SHA-256) of a file
    Hash {
        /// Path to level file
        file: PathBuf,
        /// Let a built-in schema steer the parse
        #[arg(long)]
        schema: Option<String>,
    },

    /// List built-in schemas
    Schemas,

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let exit_code = match cli.command {
        Commands::Check { file, schema, json } => cmd_check(&file, schema.as_deref(), json, cli.quiet),
        Commands::Validate {
            file,
            schema,
            strict,
            json,
        } => cmd_validate(&file, &schema, strict, json, cli.quiet),
        Commands::Fmt {
            file,
            schema,
            write,
        } => cmd_fmt(&file, schema.as_deref(), write, cli.quiet),
        Commands::Hash { file, schema } => cmd_hash(&file, schema.as_deref()),
        Commands::Schemas => {
            for name in schemas::NAMES {
                println!("{}", name);
            }
            0
        }
        Commands::Version => {
            println!(
                "levelspec {} (levelspec-core {})",
                env!("CARGO_PKG_VERSION"),
                levelspec_core::VERSION
            );
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(quiet: bool, verbose: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ── Commands ──────────────────────────────────────────────

fn cmd_check(file: &Path, schema: Option<&str>, json: bool, quiet: bool) -> i32 {
    let schema = match resolve(schema) {
        Ok(schema) => schema,
        Err(err) => return fail(&err),
    };
    let mut reader = match open(file) {
        Ok(reader) => reader,
        Err(unreadable) => return unreadable.report(file, json),
    };
    tracing::debug!(file = %file.display(), "checking syntax");

    let parsed = load(&mut reader, schema);
    let diagnostics = reader.into_diagnostics();
    report(file, parsed.is_ok(), &diagnostics, json, quiet)
}

fn cmd_validate(file: &Path, schema: &str, strict: bool, json: bool, quiet: bool) -> i32 {
    let schema = match schemas::by_name(schema) {
        Ok(schema) => schema,
        Err(err) => return fail(&err),
    };
    let mut reader = match open(file) {
        Ok(reader) => reader,
        Err(unreadable) => return unreadable.report(file, json),
    };
    tracing::debug!(file = %file.display(), schema = schema.name(), strict, "validating");

    let root = match schema.load(&mut reader) {
        Ok(root) => root,
        Err(_) => return report(file, false, reader.diagnostics(), json, quiet),
    };

    let result = schema.validate(&root, strict);
    let valid = result.is_valid();
    let mut diagnostics = reader.into_diagnostics();
    diagnostics.extend(result.diagnostics);
    report(file, valid, &diagnostics, json, quiet)
}

fn cmd_fmt(file: &Path, schema: Option<&str>, write: bool, quiet: bool) -> i32 {
    let document = match load_document(file, schema) {
        Ok(document) => document,
        Err(code) => return code,
    };

    if write {
        if let Err(err) = document.save(file) {
            return fail(&err);
        }
        if !quiet {
            println!("{} formatted {}", "✓".green().bold(), file.display());
        }
    } else {
        let stdout = std::io::stdout();
        if let Err(source) = document.print(&mut stdout.lock()) {
            return fail(&Error::Io {
                path: PathBuf::from("<stdout>"),
                source,
            });
        }
    }
    0
}

fn cmd_hash(file: &Path, schema: Option<&str>) -> i32 {
    match load_document(file, schema) {
        Ok(document) => {
            println!("{}", document.fingerprint());
            0
        }
        Err(code) => code,
    }
}

// ── Helpers ───────────────────────────────────────────────

fn resolve(name: Option<&str>) -> Result<Option<&'static Schema>, Error> {
    name.map(schemas::by_name).transpose()
}

/// A file whose bytes could not be read at all
struct Unreadable {
    error: Error,
    diagnostics: Vec<Diagnostic>,
}

impl Unreadable {
    /// Exit code 2; `--json` still gets the `io` diagnostic
    fn report(self, file: &Path, json: bool) -> i32 {
        if json {
            print_json(file, false, &self.diagnostics);
        }
        fail(&self.error)
    }
}

fn open(file: &Path) -> Result<Reader, Unreadable> {
    let mut reader = Reader::open(file);
    match reader.take_io_error() {
        Some(source) => Err(Unreadable {
            error: Error::Io {
                path: file.to_path_buf(),
                source,
            },
            diagnostics: reader.into_diagnostics(),
        }),
        None => Ok(reader),
    }
}

fn load(reader: &mut Reader, schema: Option<&Schema>) -> Result<Group, ParseError> {
    match schema {
        Some(schema) => schema.load(reader),
        None => Group::load(reader),
    }
}

/// Resolve, read and parse; on failure the exit code is already decided
fn load_document(file: &Path, schema: Option<&str>) -> Result<DocumentFile, i32> {
    let schema = resolve(schema).map_err(|err| fail(&err))?;
    let mut reader = open(file).map_err(|unreadable| fail(&unreadable.error))?;
    match load(&mut reader, schema) {
        Ok(root) => Ok(DocumentFile::new(root)),
        Err(_) => {
            eprintln!("{} {}: syntax error", "✗".red().bold(), file.display());
            Err(1)
        }
    }
}

/// Print the outcome and pick the exit code: 0 valid, 1 invalid
fn report(file: &Path, valid: bool, diagnostics: &[Diagnostic], json: bool, quiet: bool) -> i32 {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    if json {
        print_json(file, valid, diagnostics);
    } else if valid {
        if !quiet {
            let suffix = match warnings {
                0 => String::new(),
                1 => " (1 warning)".to_string(),
                n => format!(" ({} warnings)", n),
            };
            println!("{} {} is valid{}", "✓".green().bold(), file.display(), suffix);
        }
    } else {
        let noun = if errors == 1 { "error" } else { "errors" };
        eprintln!("{} {}: {} {}", "✗".red().bold(), file.display(), errors, noun);
    }

    if valid {
        0
    } else {
        1
    }
}

fn print_json(file: &Path, valid: bool, diagnostics: &[Diagnostic]) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let output = serde_json::json!({
        "file": file.display().to_string(),
        "valid": valid,
        "errors": errors,
        "warnings": diagnostics.len() - errors,
        "diagnostics": diagnostics,
    });
    println!("{:#}", output);
}

/// Report a failure that prevented checking at all; exit code 2
fn fail(err: &Error) -> i32 {
    eprintln!("{} {}", "error:".red().bold(), err);
    2
}

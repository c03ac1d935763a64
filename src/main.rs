//! Purpose: `querydiff` CLI entry point.
//! Role: Binary crate root; parses args, ingests both reports, diffs them, sets the exit code.
//! Invariants: Equivalent reports produce no stdout output and exit 0.
//! Invariants: Mismatches go to stdout (one line each) and exit 2.
//! Invariants: Usage errors are detected before any file is opened and exit 1.
//! Invariants: Logs and errors go to stderr only.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use querydiff::api::{
    Error, ErrorKind, MISMATCH_EXIT_CODE, Mismatch, ReportFormat, STDIN_PATH, diff, diff_all,
    ingest_path, to_exit_code,
};
use querydiff::report::{mismatch_json, mismatch_text};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err((err, style)) => {
            emit_error(&err, style);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser, Debug)]
#[command(
    name = "querydiff",
    version,
    about = "Check that two query engines report the same result set",
    long_about = r#"Compare a reference (plaintext) query report against a report from the engine under test.

Rows and columns are compared by position. Floats match when they differ by less than 0.01;
integers and text must match exactly, and an integer never matches a float."#,
    after_help = r#"EXIT STATUS
  0  reports are equivalent (nothing printed)
  1  usage error
  2  reports differ (mismatch printed to stdout)
  3+ a report could not be read

EXAMPLES
  $ querydiff q01.plain.out q01.engine.out
  $ querydiff --all --format json q01.plain.out q01.engine.out
  $ engine-run q01.sql | querydiff q01.plain.out -"#
)]
struct Cli {
    #[arg(
        value_name = "PLAINTEXT",
        help = "Report from the reference engine (`-` for stdin)",
        value_hint = ValueHint::FilePath
    )]
    plaintext: PathBuf,
    #[arg(
        value_name = "ENGINE",
        help = "Report from the engine under test (`-` for stdin)",
        value_hint = ValueHint::FilePath
    )]
    engine: PathBuf,
    #[arg(long, help = "Report every mismatch instead of stopping at the first")]
    all: bool,
    #[arg(
        long,
        default_value = "human",
        value_enum,
        help = "Mismatch output format: human|json"
    )]
    format: OutputFormat,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides"
    )]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// How a fatal error is written to stderr.
#[derive(Copy, Clone, Debug)]
struct ErrorStyle {
    color: ColorMode,
    format: OutputFormat,
}

impl Default for ErrorStyle {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            format: OutputFormat::Human,
        }
    }
}

fn run<I>(args: I) -> Result<RunOutcome, (Error, ErrorStyle)>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ErrorStyle::default(),
                    )
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ErrorStyle::default(),
                ));
            }
        },
    };

    let style = ErrorStyle {
        color: cli.color,
        format: cli.format,
    };
    init_tracing(cli.verbose);

    compare(&cli)
        .map_err(add_io_hint)
        .map_err(|err| (err, style))
}

fn compare(cli: &Cli) -> Result<RunOutcome, Error> {
    if is_stdin(&cli.plaintext) && is_stdin(&cli.engine) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("only one report can be read from stdin")
            .with_hint("Pass at least one report as a file path."));
    }

    let plaintext = ingest_path(&cli.plaintext, ReportFormat::Plaintext)?;
    let engine = ingest_path(&cli.engine, ReportFormat::Engine)?;
    info!(
        plaintext_rows = plaintext.outcome.rows,
        engine_rows = engine.outcome.rows,
        "reports loaded"
    );

    let mismatches = if cli.all {
        diff_all(&plaintext.rows, &engine.rows)
    } else {
        diff(&plaintext.rows, &engine.rows)
            .mismatch()
            .cloned()
            .into_iter()
            .collect()
    };

    if mismatches.is_empty() {
        return Ok(RunOutcome::ok());
    }
    for mismatch in &mismatches {
        println!("{}", render_mismatch(mismatch, cli.format));
    }
    Ok(RunOutcome::with_code(MISMATCH_EXIT_CODE))
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

fn render_mismatch(mismatch: &Mismatch, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => mismatch_text(mismatch),
        OutputFormat::Json => serde_json::to_string(&mismatch_json(mismatch))
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string()),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check the report path; use `-` to read from stdin."),
        ErrorKind::Permission => {
            err.with_hint("Permission denied. Check the report's file permissions.")
        }
        ErrorKind::Io => err.with_hint("I/O error. Check the path and the filesystem."),
        _ => err,
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, style: ErrorStyle) {
    if style.format == OutputFormat::Json {
        let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
            "{\"error\":{\"message\":\"json encode failed\"}}".to_string()
        });
        eprintln!("{json}");
        return;
    }
    let is_tty = io::stderr().is_terminal();
    eprintln!("{}", error_text(err, style.color.use_color(is_tty)));
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);
    match usage {
        Some(usage) => format!("Usage: {usage}. Try `querydiff --help`."),
        None => "Usage: querydiff [OPTIONS] <PLAINTEXT> <ENGINE>. Try `querydiff --help`."
            .to_string(),
    }
}

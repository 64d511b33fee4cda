// Command-line front end for dmadiff.
//
// `dmadiff [OPTIONS] <OLD> <NEW>` loads both images, compares them through
// their dmadata tables and writes one line per finding to stderr. Exit code
// is 0 whenever the comparison completes, 1 on any error.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};

use crate::dmadata::{Side, TableFlavor};
use crate::engine::{self, DiffError, DiffOptions, DiffSummary};
use crate::io::{LoadedImage, load_image};
use crate::report::TextReport;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Find out what has moved or changed inside a ROM hack.
#[derive(Parser, Debug)]
#[command(
    name = "dmadiff",
    version,
    about = "Compare the dmadata-indexed files of two ROM images",
    arg_required_else_help = true
)]
struct Cli {
    /// Original ROM image.
    #[arg(value_hint = ValueHint::FilePath)]
    old: PathBuf,

    /// Modified ROM image.
    #[arg(value_hint = ValueHint::FilePath)]
    new: PathBuf,

    /// Quiet mode (only findings and errors).
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (also list unchanged files and image digests).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Image family, which selects the dmadata magic.
    #[arg(long, value_enum, default_value_t = FlavorArg::N64)]
    flavor: FlavorArg,

    /// Do not compare whole images when no indexed file changed.
    #[arg(long = "no-residual")]
    no_residual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FlavorArg {
    N64,
    Ique,
}

impl From<FlavorArg> for TableFlavor {
    fn from(f: FlavorArg) -> Self {
        match f {
            FlavorArg::N64 => TableFlavor::N64,
            FlavorArg::Ique => TableFlavor::IQue,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

struct Options {
    old_file: PathBuf,
    new_file: PathBuf,
    quiet: bool,
    verbose: u8,
    diff: DiffOptions,
}

fn resolve_options(cli: Cli) -> Options {
    let verbose = cli.verbose.min(2);
    Options {
        old_file: cli.old,
        new_file: cli.new,
        quiet: cli.quiet,
        verbose,
        diff: DiffOptions {
            flavor: cli.flavor.into(),
            report_unchanged: verbose > 0,
            residual_check: !cli.no_residual,
        },
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("dmadiff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Print a diff error, naming the files involved where the error has a side.
fn report_error(err: &DiffError, opts: &Options) {
    let old = opts.old_file.display();
    let new = opts.new_file.display();
    match err {
        DiffError::IndexNotFound { side } => {
            if matches!(side, Side::Old | Side::Both) {
                eprintln!("dmadiff: failed to find dmadata in file '{old}'");
            }
            if matches!(side, Side::New | Side::Both) {
                eprintln!("dmadiff: failed to find dmadata in file '{new}'");
            }
        }
        DiffError::IndexLocationMismatch { old: a, new: b } => {
            eprintln!("dmadiff: dmadata at different addresses in each file...");
            eprintln!(" -> {a:08x}   {old}");
            eprintln!(" -> {b:08x}   {new}");
        }
        DiffError::IndexExtentNotFound { .. } => {
            eprintln!("dmadiff: {err} in file '{old}'");
        }
        DiffError::IndexExtentMismatch { .. } | DiffError::IndexExtentOutOfBounds { .. } => {
            eprintln!("dmadiff: {err}");
            eprintln!(" -> {old}");
            eprintln!(" -> {new}");
        }
        _ => eprintln!("dmadiff: {err}"),
    }
}

fn print_image(image: &LoadedImage) {
    match image.digest_hex() {
        Some(hex) => eprintln!(
            "dmadiff: {}: {} bytes, sha256 {hex}",
            image.path.display(),
            image.len()
        ),
        None => eprintln!("dmadiff: {}: {} bytes", image.path.display(), image.len()),
    }
}

fn print_summary(summary: &DiffSummary) {
    eprintln!(
        "dmadiff: {} entries, {} changed ({} relocated, {} resized, {} modified)",
        summary.entries, summary.changed, summary.relocated, summary.resized, summary.modified
    );
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff(opts: &Options) -> i32 {
    // Load both so that every unreadable file is reported.
    let old = load_image(&opts.old_file);
    let new = load_image(&opts.new_file);
    let (old, new) = match (old, new) {
        (Ok(a), Ok(b)) => (a, b),
        (a, b) => {
            for e in [a.err(), b.err()].into_iter().flatten() {
                eprintln!("dmadiff: {e}");
            }
            return 1;
        }
    };

    let mut sink = TextReport::new(io::stderr().lock()).quiet(opts.quiet);
    match engine::diff_images(&old.data, &new.data, &opts.diff, &mut sink) {
        Ok(summary) => {
            drop(sink);
            if opts.verbose > 0 && !opts.quiet {
                print_image(&old);
                print_image(&new);
                print_summary(&summary);
            }
            0
        }
        Err(e) => {
            drop(sink);
            report_error(&e, opts);
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap and runs the comparison.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let opts = resolve_options(cli);
    process::exit(cmd_diff(&opts));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

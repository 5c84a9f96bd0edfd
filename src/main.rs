//! pfind command line.
//!
//! Usage:
//!     pfind [FLAGS] <name-pattern> [search-dir]
//!     pfind --full [FLAGS] <pattern>... [--in <search-dir>]

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pfind::{parse_timeout, write_results, FindError, OutputMode, TypeConstraint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pfind", version, about = "Find files and directories by name pattern")]
struct Args {
    /// Name pattern, then an optional search dir. With --full: name patterns only.
    #[arg(required = true, value_name = "PATTERN")]
    positional: Vec<String>,

    /// Search dir (required form with --full)
    #[arg(long = "in", value_name = "SEARCH_DIR")]
    search_in: Option<String>,

    /// Only directories
    #[arg(short = 'd', long, conflicts_with = "file")]
    dir: bool,

    /// Only regular files
    #[arg(short = 'f', long)]
    file: bool,

    /// Match full paths; several patterns are AND-composed
    #[arg(short = 'F', long)]
    full: bool,

    /// Treat name patterns as regular expressions
    #[arg(short = 'r', long)]
    regex: bool,

    /// Treat the search dir as a directory pattern even if it exists
    #[arg(short = 'b', long)]
    bypass: bool,

    /// Per-root timeout: N (seconds), Nms, Ns, Nm, Nh; 0 disables
    #[arg(long, value_name = "DURATION", env = "PFIND_TIMEOUT")]
    timeout: Option<String>,

    /// Prefix each match with modification time and size
    #[arg(short = 'i', long, conflicts_with = "counts")]
    info: bool,

    /// Print match counts per parent directory
    #[arg(long)]
    counts: bool,

    /// Removed alias of --counts
    #[arg(long = "count", hide = true)]
    removed_count: bool,

    /// Do not honor .gitignore / .ignore files
    #[arg(short = 'I', long)]
    no_ignore: bool,

    /// Where directory-pattern discovery starts
    #[arg(long, value_name = "DIR", default_value = "/")]
    origin: PathBuf,

    /// Walker threads per root
    #[arg(long)]
    threads: Option<usize>,

    /// Roots searched concurrently
    #[arg(long)]
    jobs: Option<usize>,

    /// Raise log verbosity (repeatable); PFIND_LOG overrides
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<FindError>() {
            Some(FindError::Io { source, .. }) if source.kind() == io::ErrorKind::BrokenPipe => {
                ExitCode::SUCCESS
            }
            Some(find_err) => {
                eprintln!("pfind: {err:#}");
                ExitCode::from(find_err.exit_code() as u8)
            }
            None => {
                eprintln!("pfind: {err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "pfind=warn",
        1 => "pfind=info",
        2 => "pfind=debug",
        _ => "pfind=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("PFIND_LOG").unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.removed_count {
        return Err(FindError::usage("--count has been removed; use --counts").into());
    }

    let (patterns, location) = split_positionals(&args)?;

    let mut builder = pfind::search()
        .patterns(patterns)
        .full_path(args.full)
        .regex_mode(args.regex)
        .bypass(args.bypass)
        .honor_ignore_files(!args.no_ignore)
        .origin(args.origin.clone());
    if let Some(location) = location {
        builder = builder.location(location);
    }
    if args.dir {
        builder = builder.kind(TypeConstraint::Dir);
    } else if args.file {
        builder = builder.kind(TypeConstraint::File);
    }
    if let Some(raw) = &args.timeout {
        builder = builder.timeout(parse_timeout(raw)?);
    }
    if let Some(threads) = args.threads {
        builder = builder.threads(threads);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }

    let mode = if args.counts {
        OutputMode::Counts
    } else if args.info {
        OutputMode::Info
    } else {
        OutputMode::Plain
    };

    let mut search = builder.stream()?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let matches = write_results(mode, search.by_ref(), &mut out).context("search failed")?;

    let stats = search.stats();
    tracing::info!(
        matches,
        roots = stats.roots_searched,
        timed_out = stats.roots_timed_out,
        failed = stats.roots_failed,
        elapsed_ms = stats.duration.as_millis() as u64,
        "search complete"
    );
    Ok(())
}

/// Name patterns and search dir from the positionals.
fn split_positionals(args: &Args) -> Result<(Vec<String>, Option<String>), FindError> {
    let mut positional = args.positional.clone();

    if args.full {
        if args.search_in.is_none() && positional.len() > 1 {
            if let Some(last) = positional.last().filter(|p| Path::new(p.as_str()).is_dir()) {
                tracing::warn!(
                    pattern = %last,
                    "last pattern names an existing directory; it is matched as a pattern, use --in to search it"
                );
            }
        }
        return Ok((positional, args.search_in.clone()));
    }

    match positional.len() {
        1 => Ok((positional, args.search_in.clone())),
        2 if args.search_in.is_some() => Err(FindError::usage(
            "search dir given both positionally and with --in",
        )),
        2 => {
            let location = positional.pop();
            Ok((positional, location))
        }
        _ => Err(FindError::usage(
            "too many arguments: expected <name-pattern> [search-dir] (use --full for several patterns)",
        )),
    }
}

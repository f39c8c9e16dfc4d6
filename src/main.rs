//! Entry point for the site i18n build step.

use std::path::PathBuf;
use std::process::ExitCode;

use site_i18n::{
    BuildError,
    Site,
};
use tracing_subscriber::EnvFilter;

/// `--help` output
const USAGE: &str = "\
Usage: site-i18n [--root DIR] [--check] [--strict]

  --root DIR   Site root containing .site-i18n.json (default: .)
  --check      Validate configuration and translations without copying assets
  --strict     Exit with status 1 when a key is missing with no fallback";

/// Parsed command line.
#[derive(Debug)]
struct Args {
    /// Site root
    root: PathBuf,
    /// Skip the passthrough copy
    check: bool,
    /// Fail on uncovered missing translations
    strict: bool,
}

fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let args = match parse_args(pargs) {
        Ok(args) => args,
        Err(error) => {
            tracing::error!("Invalid arguments: {error}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::from(2)
        }
    }
}

/// Help goes to stdout so it can be piped.
#[allow(clippy::print_stdout)]
fn print_usage() {
    println!("{USAGE}");
}

/// Reads flags and warns about anything left over.
fn parse_args(mut pargs: pico_args::Arguments) -> Result<Args, pico_args::Error> {
    let args = Args {
        root: pargs.opt_value_from_str("--root")?.unwrap_or_else(|| PathBuf::from(".")),
        check: pargs.contains("--check"),
        strict: pargs.contains("--strict"),
    };

    for unused in pargs.finish() {
        tracing::warn!("Ignoring unknown argument: {}", unused.to_string_lossy());
    }

    Ok(args)
}

/// Loads the site, audits translations and copies assets.
fn run(args: &Args) -> Result<ExitCode, BuildError> {
    tracing::debug!(?args, "Starting site i18n build");

    let site = Site::open(&args.root)?;

    let missing = site.audit();
    let mut uncovered = 0_usize;
    for gap in &missing {
        if let Some(fallback) = &gap.covered_by {
            tracing::debug!(
                locale = %gap.locale,
                key = %gap.key,
                fallback = %fallback,
                "Key served by fallback"
            );
        } else {
            uncovered += 1;
            tracing::warn!(
                locale = %gap.locale,
                key = %gap.key,
                "Missing translation with no fallback"
            );
        }
    }

    if !args.check {
        site.copy_passthrough()?;
    }

    if args.strict && uncovered > 0 {
        tracing::error!(uncovered, "Missing translations with no fallback");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

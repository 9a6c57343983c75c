//! nb CLI - static blog generator.
//!
//! Provides commands for:
//! - `generate`: Fetch the site table and render the blog into `public/`
//! - `preview`: Open the generated site in the configured browser

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GenerateArgs, PreviewArgs};
use error::CliError;
use output::Output;

/// Crates whose logs are shown at the selected level.
const LOG_TARGETS: [&str; 7] = [
    "nb",
    "nb_cache",
    "nb_config",
    "nb_generate",
    "nb_renderer",
    "nb_site",
    "nb_source",
];

/// nb - static blog generator.
#[derive(Parser)]
#[command(name = "nb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the blog from a work directory.
    Generate(GenerateArgs),
    /// Open the generated blog in the configured browser.
    Preview(PreviewArgs),
}

/// Log filter: `RUST_LOG` when set, otherwise `info` (or `debug` with
/// `--verbose`) for the nb crates and `warn` for everything else.
fn log_filter(verbose: bool) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::from_default_env();
    }
    let level = if verbose { "debug" } else { "info" };
    let directives: Vec<String> = std::iter::once("warn".to_owned())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect();
    EnvFilter::new(directives.join(","))
}

/// Install the global subscriber. Logs go to stderr.
pub(crate) fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Generate(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
        Commands::Preview(args) => {
            init_logging(false);
            args.execute().map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "nb",
            "generate",
            "blog",
            "--concurrency",
            "5",
            "--verbose",
            "--ignore-cache",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.work_dir, PathBuf::from("blog"));
        assert_eq!(args.concurrency, Some(5));
        assert!(args.verbose);
        assert!(args.ignore_cache);
    }

    #[test]
    fn test_parse_preview_requires_work_dir() {
        assert!(Cli::try_parse_from(["nb", "preview"]).is_err());
        let cli = Cli::try_parse_from(["nb", "preview", "."]).unwrap();
        assert!(matches!(cli.command, Commands::Preview(_)));
    }
}

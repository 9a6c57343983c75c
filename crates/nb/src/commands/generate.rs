//! `nb generate` command implementation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use nb_cache::{Cache, FileCache};
use nb_config::{CliSettings, Config};
use nb_generate::{GenerateOptions, GenerateReport, Generator};
use nb_renderer::{JinjaRenderer, TemplateProvider};
use nb_source::FsSource;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Work directory containing config.json and themes/.
    pub(crate) work_dir: PathBuf,

    /// Number of pages fetched and rendered at the same time (overrides config).
    #[arg(short, long, env = "NB_CONCURRENCY")]
    pub(crate) concurrency: Option<usize>,

    /// Print debug logs.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Fetch every page even if its cached copy is up to date.
    #[arg(long)]
    pub(crate) ignore_cache: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the run aborts before
    /// rendering pages. Page failures are reported through the exit code.
    pub(crate) async fn execute(self) -> Result<ExitCode, CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            concurrency: self.concurrency,
            ignore_cache: self.ignore_cache.then_some(true),
            verbose: self.verbose.then_some(true),
        };
        let config = Config::load(&self.work_dir, Some(&cli_settings))?;
        // `verbose` may come from config.json, so logging starts here.
        crate::init_logging(config.verbose);
        tracing::debug!(
            dirs = ?config.dirs,
            concurrency = config.concurrency,
            "Loaded configuration"
        );

        output.info(&format!("Theme: {}", config.theme));
        output.info(&format!("Output: {}", config.dirs.out_dir.display()));

        let cache: Arc<dyn Cache> = Arc::new(FileCache::new(config.dirs.cache_dir.clone()));
        let source = Arc::new(FsSource::new(config.dirs.source_dir.clone()));
        let provider = Arc::new(TemplateProvider::new(config.dirs.layout_dir()));
        let renderer = Arc::new(JinjaRenderer::new(provider));

        let options = GenerateOptions::from_config(&config);
        let generator = Generator::new(options, source, renderer, cache);
        let report = generator.generate().await?;

        print_report(&output, &report);
        Ok(ExitCode::from(u8::from(!report.is_success())))
    }
}

fn print_report(output: &Output, report: &GenerateReport) {
    output.info(&format!(
        "{} of {} posts updated, {} published",
        report.updated, report.total, report.published
    ));
    if report.skipped > 0 {
        output.warning(&format!("{} unpublished posts skipped", report.skipped));
    }
    if report.is_success() {
        output.success(&format!("Generated {} posts", report.rendered));
        return;
    }
    output.error(&format!(
        "Generated {} posts, {} failed:",
        report.rendered,
        report.failures.len()
    ));
    for failure in &report.failures {
        output.error(&format!("  {}: {}", failure.page_id, failure.message));
    }
}

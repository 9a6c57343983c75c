//! `nb preview` command implementation.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use clap::Args;
use nb_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Work directory containing config.json.
    work_dir: PathBuf,
}

impl PreviewArgs {
    /// Open the generated site entry with `previewBrowser`.
    ///
    /// The browser is started as a detached process and not waited for.
    ///
    /// # Errors
    ///
    /// Returns an error if `previewBrowser` is not set or the browser cannot
    /// be started.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(&self.work_dir, None)?;
        let browser = config.require_preview_browser()?;
        let index = config.dirs.index_path();

        Command::new(browser)
            .arg(&index)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        output.success(&format!("Opened {} with {browser}", index.display()));
        Ok(())
    }
}

//! Configuration management for nb.
//!
//! Parses the `config.json` file at the root of a work directory and
//! resolves every directory the build reads from or writes to.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Work directory layout
//!
//! ```text
//! {work_dir}/
//! +-- config.json
//! +-- cache/                 # page content cache
//! +-- source/                # filesystem export (see `sourceDir`)
//! +-- themes/{theme}/
//! |   +-- layout/            # {template}.html files
//! |   +-- assets/            # copied verbatim into public/
//! +-- public/
//!     +-- index.html
//!     +-- tag/{tag}.html
//!     +-- {page.url}
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename inside the work directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Concurrency used when neither the config nor the CLI sets one.
pub const DEFAULT_CONCURRENCY: usize = 3;

const MAX_CONCURRENCY: usize = 64;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page fetch/render concurrency.
    pub concurrency: Option<usize>,
    /// Force every page to be fetched regardless of the cache.
    pub ignore_cache: Option<bool>,
    /// Enable debug logging.
    pub verbose: Option<bool>,
}

/// Configuration as parsed from `config.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigRaw {
    theme: String,
    url: String,
    #[serde(default)]
    preview_browser: Option<String>,
    #[serde(default)]
    concurrency: Option<usize>,
    #[serde(default)]
    source_dir: Option<String>,
    #[serde(default)]
    verbose: bool,
}

/// Resolved build directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    /// Work directory holding `config.json`.
    pub work_dir: PathBuf,
    /// Selected theme (`themes/{theme}`).
    pub theme_dir: PathBuf,
    /// Output directory (`public/`).
    pub out_dir: PathBuf,
    /// Tag listing directory (`public/tag/`).
    pub tag_dir: PathBuf,
    /// Page content cache (`cache/`).
    pub cache_dir: PathBuf,
    /// Filesystem export read by the bundled content source.
    pub source_dir: PathBuf,
}

impl Dirs {
    fn new(work_dir: &Path, theme: &str, source_dir: &str) -> Self {
        let out_dir = work_dir.join("public");
        Self {
            work_dir: work_dir.to_path_buf(),
            theme_dir: work_dir.join("themes").join(theme),
            tag_dir: out_dir.join("tag"),
            out_dir,
            cache_dir: work_dir.join("cache"),
            source_dir: work_dir.join(source_dir),
        }
    }

    /// Template directory of the theme (`themes/{theme}/layout/`).
    #[must_use]
    pub fn layout_dir(&self) -> PathBuf {
        self.theme_dir.join("layout")
    }

    /// Static asset directory of the theme (`themes/{theme}/assets/`).
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.theme_dir.join("assets")
    }

    /// Site entry page (`public/index.html`).
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.out_dir.join("index.html")
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// Theme name (directory under `themes/`).
    pub theme: String,
    /// URL of the remote table holding the site's pages.
    pub url: String,
    /// Browser binary used by `preview`.
    pub preview_browser: Option<String>,
    /// Maximum number of page tasks in flight.
    pub concurrency: usize,
    /// Fetch every page regardless of the cache.
    pub ignore_cache: bool,
    /// Enable debug logging.
    pub verbose: bool,
    /// Resolved directories.
    pub dirs: Dirs,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load `config.json` from `work_dir` and apply CLI settings.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. Validation runs last.
    pub fn load(work_dir: &Path, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let path = work_dir.join(CONFIG_FILENAME);
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_json(&content, work_dir)?;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON text, resolving paths against `work_dir`.
    ///
    /// Does not validate; see [`Config::validate`].
    pub fn from_json(content: &str, work_dir: &Path) -> Result<Self, ConfigError> {
        let raw: ConfigRaw = serde_json::from_str(content)?;
        let dirs = Dirs::new(
            work_dir,
            &raw.theme,
            raw.source_dir.as_deref().unwrap_or("source"),
        );
        Ok(Self {
            theme: raw.theme,
            url: raw.url,
            preview_browser: raw.preview_browser.filter(|b| !b.is_empty()),
            concurrency: raw.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            ignore_cache: false,
            verbose: raw.verbose,
            dirs,
        })
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(concurrency) = settings.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(ignore_cache) = settings.ignore_cache {
            self.ignore_cache = ignore_cache;
        }
        if let Some(verbose) = settings.verbose {
            self.verbose = verbose;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.theme, "theme")?;
        if self.theme.contains(['/', '\\']) || self.theme == ".." {
            return Err(ConfigError::Validation(
                "theme must be a directory name under themes/".to_owned(),
            ));
        }
        require_non_empty(&self.url, "url")?;
        require_http_url(&self.url, "url")?;

        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be greater than 0".to_owned(),
            ));
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "concurrency cannot exceed {MAX_CONCURRENCY}"
            )));
        }
        Ok(())
    }

    /// Get the browser configured for `preview`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `previewBrowser` is not set.
    pub fn require_preview_browser(&self) -> Result<&str, ConfigError> {
        self.preview_browser.as_deref().ok_or_else(|| {
            ConfigError::Validation(
                "\"previewBrowser\" property is not set in your config file".to_owned(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    const MINIMAL: &str = r#"{"theme": "pure", "url": "https://www.notion.so/abc"}"#;

    fn assert_validation_error(config: &Config, expected: &str) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(
            err.to_string().contains(expected),
            "'{err}' should contain '{expected}'"
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json(MINIMAL, Path::new("/site")).unwrap();

        assert_eq!(config.theme, "pure");
        assert_eq!(config.url, "https://www.notion.so/abc");
        assert_eq!(config.preview_browser, None);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(!config.ignore_cache);
        config.validate().unwrap();
    }

    #[test]
    fn test_resolve_dirs() {
        let config = Config::from_json(MINIMAL, Path::new("/site")).unwrap();

        assert_eq!(
            config.dirs,
            Dirs {
                work_dir: PathBuf::from("/site"),
                theme_dir: PathBuf::from("/site/themes/pure"),
                out_dir: PathBuf::from("/site/public"),
                tag_dir: PathBuf::from("/site/public/tag"),
                cache_dir: PathBuf::from("/site/cache"),
                source_dir: PathBuf::from("/site/source"),
            }
        );
        assert_eq!(
            config.dirs.layout_dir(),
            PathBuf::from("/site/themes/pure/layout")
        );
        assert_eq!(
            config.dirs.assets_dir(),
            PathBuf::from("/site/themes/pure/assets")
        );
        assert_eq!(
            config.dirs.index_path(),
            PathBuf::from("/site/public/index.html")
        );
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "theme": "pure",
            "url": "https://www.notion.so/abc",
            "previewBrowser": "firefox",
            "concurrency": 8,
            "sourceDir": "export",
            "verbose": true
        }"#;
        let config = Config::from_json(json, Path::new("/site")).unwrap();

        assert_eq!(config.preview_browser.as_deref(), Some("firefox"));
        assert_eq!(config.concurrency, 8);
        assert!(config.verbose);
        assert_eq!(config.dirs.source_dir, PathBuf::from("/site/export"));
    }

    #[test]
    fn test_missing_required_key_is_parse_error() {
        let err = Config::from_json(r#"{"theme": "pure"}"#, Path::new("/site")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_corrupt_json_is_parse_error() {
        let err = Config::from_json("{theme", Path::new("/site")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_empty_theme() {
        let config =
            Config::from_json(r#"{"theme": "", "url": "https://x.io"}"#, Path::new("/")).unwrap();
        assert_validation_error(&config, "theme cannot be empty");
    }

    #[test]
    fn test_validate_theme_with_separator() {
        let config = Config::from_json(
            r#"{"theme": "../etc", "url": "https://x.io"}"#,
            Path::new("/"),
        )
        .unwrap();
        assert_validation_error(&config, "theme must be a directory name");
    }

    #[test]
    fn test_validate_url_scheme() {
        let config =
            Config::from_json(r#"{"theme": "pure", "url": "notion.so/x"}"#, Path::new("/"))
                .unwrap();
        assert_validation_error(&config, "url must start with http");
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let mut config = Config::from_json(MINIMAL, Path::new("/")).unwrap();

        config.concurrency = 0;
        assert_validation_error(&config, "greater than 0");

        config.concurrency = 65;
        assert_validation_error(&config, "cannot exceed 64");
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::from_json(MINIMAL, Path::new("/")).unwrap();

        config.apply_cli_settings(&CliSettings {
            concurrency: Some(10),
            ignore_cache: Some(true),
            verbose: Some(true),
        });

        assert_eq!(config.concurrency, 10);
        assert!(config.ignore_cache);
        assert!(config.verbose);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::from_json(MINIMAL, Path::new("/")).unwrap();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(!config.ignore_cache);
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_verbose_survives_absent_cli_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let json = r#"{"theme": "pure", "url": "https://www.notion.so/abc", "verbose": true}"#;
        fs::write(tmp.path().join(CONFIG_FILENAME), json).unwrap();

        let settings = CliSettings {
            verbose: None,
            ..CliSettings::default()
        };
        let config = Config::load(tmp.path(), Some(&settings)).unwrap();

        assert!(config.verbose);
    }

    #[test]
    fn test_load_from_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let settings = CliSettings {
            concurrency: Some(2),
            ..CliSettings::default()
        };
        let config = Config::load(tmp.path(), Some(&settings)).unwrap();

        assert_eq!(config.concurrency, 2);
        assert_eq!(config.dirs.work_dir, tmp.path());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();

        let err = Config::load(tmp.path(), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_require_preview_browser() {
        let config = Config::from_json(MINIMAL, Path::new("/")).unwrap();
        assert!(config.require_preview_browser().is_err());

        let config = Config::from_json(
            r#"{"theme": "pure", "url": "https://x.io", "previewBrowser": "firefox"}"#,
            Path::new("/"),
        )
        .unwrap();
        assert_eq!(config.require_preview_browser().unwrap(), "firefox");
    }
}

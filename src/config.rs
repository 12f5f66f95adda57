//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pmcollect/pmcollect.toml`
//! 3. Local config: `<config_dir>/.pmcollect.toml` (current directory by default)
//! 4. Environment variables: `PMCOLLECT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::SchemaSelection;

/// Annual baseline archive URL; `{year}` is the two-digit release year and
/// `{index}` the zero-padded archive number.
pub const DEFAULT_BASELINE_URL: &str =
    "https://ftp.ncbi.nlm.nih.gov/pubmed/baseline/pubmed{year}n{index}.xml.gz";

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchConfig {
    /// Destination for fetched archives (default: ~/.pmcollect/cache)
    pub cache_dir: PathBuf,
    /// Maximum number of simultaneous fetches
    pub concurrency_limit: usize,
    /// Source URL template, see [`DEFAULT_BASELINE_URL`]
    pub baseline_url: String,
    /// Two-digit release year substituted for `{year}`
    pub baseline_year: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_base_dir().join("cache"),
            concurrency_limit: 8,
            baseline_url: DEFAULT_BASELINE_URL.to_string(),
            baseline_year: 24,
        }
    }
}

/// Raw fetch config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFetchConfig {
    pub cache_dir: Option<PathBuf>,
    pub concurrency_limit: Option<usize>,
    pub baseline_url: Option<String>,
    pub baseline_year: Option<u32>,
}

impl FetchConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawFetchConfig) -> Self {
        Self {
            cache_dir: overlay
                .cache_dir
                .clone()
                .unwrap_or_else(|| self.cache_dir.clone()),
            concurrency_limit: overlay.concurrency_limit.unwrap_or(self.concurrency_limit),
            baseline_url: overlay
                .baseline_url
                .clone()
                .unwrap_or_else(|| self.baseline_url.clone()),
            baseline_year: overlay.baseline_year.unwrap_or(self.baseline_year),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_tag: Option<String>,
    pub record_tag: Option<String>,
    pub schema: Option<SchemaSelection>,
    pub fail_fast: Option<bool>,
    #[serde(default)]
    pub fetch: RawFetchConfig,
}

/// Unified configuration for pmcollect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tag of the document root handed to the tree provider
    pub root_tag: String,
    /// Tag of one citation record below the root
    pub record_tag: String,
    /// Schema revision: detected per record, or pinned
    pub schema: SchemaSelection,
    /// Abort a batch on the first failing record
    pub fail_fast: bool,
    /// Retrieval settings
    pub fetch: FetchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_tag: "PubmedArticleSet".into(),
            record_tag: "PubmedArticle".into(),
            schema: SchemaSelection::Auto,
            fail_fast: false,
            fetch: FetchConfig::default(),
        }
    }
}

/// Get the default base directory (~/.pmcollect).
fn default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".pmcollect"))
        .unwrap_or_else(|| PathBuf::from("~/.pmcollect"))
}

/// Get the XDG config directory for pmcollect.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pmcollect").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pmcollect.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".pmcollect.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.fetch.cache_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.fetch.cache_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_tag: overlay
                .root_tag
                .clone()
                .unwrap_or_else(|| self.root_tag.clone()),
            record_tag: overlay
                .record_tag
                .clone()
                .unwrap_or_else(|| self.record_tag.clone()),
            schema: overlay.schema.unwrap_or(self.schema),
            fail_fast: overlay.fail_fast.unwrap_or(self.fail_fast),
            fetch: self.fetch.merge(&overlay.fetch),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding the local `.pmcollect.toml`
    ///   (current directory when `None`)
    pub fn load(config_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let local_dir = config_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let local_path = local_config_path(&local_dir);
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply PMCOLLECT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("PMCOLLECT").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_tag") {
            settings.root_tag = val;
        }
        if let Ok(val) = config.get_string("record_tag") {
            settings.record_tag = val;
        }
        if let Ok(val) = config.get_string("schema") {
            settings.schema = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("fail_fast") {
            settings.fail_fast = val;
        }
        if let Ok(val) = config.get_string("fetch.cache_dir") {
            settings.fetch.cache_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("fetch.concurrency_limit") {
            settings.fetch.concurrency_limit =
                usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("fetch.concurrency_limit out of range: {val}"),
                })?;
        }
        if let Ok(val) = config.get_string("fetch.baseline_url") {
            settings.fetch.baseline_url = val;
        }
        if let Ok(val) = config.get_int("fetch.baseline_year") {
            settings.fetch.baseline_year =
                u32::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("fetch.baseline_year out of range: {val}"),
                })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.fetch.concurrency_limit == 0 {
            return Err(ApplicationError::Config {
                message: "fetch.concurrency_limit must be at least 1".into(),
            });
        }
        if self.root_tag.is_empty() || self.record_tag.is_empty() {
            return Err(ApplicationError::Config {
                message: "root_tag and record_tag must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pmcollect configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pmcollect/pmcollect.toml
#   Local:  ./.pmcollect.toml (or the directory given with -C)
#   Env:    PMCOLLECT_* environment variables, nested keys with "__"
#           e.g. PMCOLLECT_FETCH__CONCURRENCY_LIMIT=4

# Tag of the document root and of one record below it
# root_tag = "PubmedArticleSet"
# record_tag = "PubmedArticle"

# Container spelling: "auto" detects per record, "current" or "legacy" pins it
# schema = "auto"

# Abort a batch on the first record that fails to map
# fail_fast = false

[fetch]
# Destination directory for fetched archives
# cache_dir = "~/.pmcollect/cache"

# Maximum number of simultaneous fetches
# concurrency_limit = 8

# Source URL template ({year}: two-digit release year, {index}: archive number)
# baseline_url = "https://ftp.ncbi.nlm.nih.gov/pubmed/baseline/pubmed{year}n{index}.xml.gz"
# baseline_year = 24
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let settings = Settings::load(Some(dir.path())).expect("load defaults");
        assert_eq!(settings.root_tag, "PubmedArticleSet");
        assert_eq!(settings.record_tag, "PubmedArticle");
        assert!(settings.fetch.cache_dir.to_string_lossy().contains(".pmcollect"));
        assert!(settings.fetch.concurrency_limit >= 1);
    }

    #[test]
    fn given_local_config_when_loading_then_overrides_defaults() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(
            local_config_path(dir.path()),
            "schema = \"legacy\"\nfail_fast = true\n[fetch]\nconcurrency_limit = 3\n",
        )
        .expect("write config");

        let settings = Settings::load(Some(dir.path())).expect("load");

        assert_eq!(settings.schema, SchemaSelection::Legacy);
        assert!(settings.fail_fast);
        assert_eq!(settings.fetch.concurrency_limit, 3);
        assert_eq!(settings.fetch.baseline_url, DEFAULT_BASELINE_URL);
    }

    #[test]
    fn given_zero_concurrency_when_loading_then_config_error() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(
            local_config_path(dir.path()),
            "[fetch]\nconcurrency_limit = 0\n",
        )
        .expect("write config");

        let result = Settings::load(Some(dir.path()));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_malformed_local_config_when_loading_then_config_error() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(local_config_path(dir.path()), "schema = [").expect("write config");

        let result = Settings::load(Some(dir.path()));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_tilde_in_cache_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.fetch.cache_dir = PathBuf::from("~/.pmcollect/cache");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let cache = settings.fetch.cache_dir.to_string_lossy();
        assert!(cache.starts_with(&home), "cache_dir should start with home dir: {cache}");
        assert!(!cache.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_inherit() {
        let base = FetchConfig::default();
        let overlay = RawFetchConfig {
            baseline_year: Some(25),
            ..RawFetchConfig::default()
        };

        let merged = base.merge(&overlay);

        assert_eq!(merged.baseline_year, 25);
        assert_eq!(merged.concurrency_limit, base.concurrency_limit);
        assert_eq!(merged.cache_dir, base.cache_dir);
    }

    #[test]
    fn given_settings_when_serializing_then_emits_fetch_section() {
        let toml = Settings::default().to_toml().expect("serialize");
        assert!(toml.contains("record_tag"));
        assert!(toml.contains("[fetch]"));
        assert!(Settings::template().contains("concurrency_limit"));
    }
}

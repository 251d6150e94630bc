//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treekit/treekit.toml`
//! 3. Local config: a file passed by the caller
//! 4. Environment variables: `TREEKIT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Default retry ceiling for name collisions during path reconstruction.
pub const DEFAULT_MAX_RENAME_TRIES: usize = 10_000;

/// Unified configuration for treekit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Number of names tried per node before `paths_to_tree` gives up
    pub max_rename_tries: usize,
    /// Placed between base name and counter when renaming (`x` -> `x_0`)
    pub rename_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_rename_tries: DEFAULT_MAX_RENAME_TRIES,
            rename_separator: "_".into(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_rename_tries: Option<usize>,
    pub rename_separator: Option<String>,
}

/// Get the XDG config directory for treekit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treekit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treekit.toml"))
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_rename_tries: overlay.max_rename_tries.unwrap_or(self.max_rename_tries),
            rename_separator: overlay
                .rename_separator
                .clone()
                .unwrap_or_else(|| self.rename_separator.clone()),
        }
    }

    /// Load settings with layered precedence, reading `TREEKIT_*` environment variables.
    pub fn load(local_config: Option<&Path>) -> TreeResult<Self> {
        Self::load_with_prefix(local_config, "TREEKIT")
    }

    /// Load settings with layered precedence and a custom environment prefix.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config file, if present
    /// 3. `local_config`, if given (must exist)
    /// 4. Environment variables `<PREFIX>_*`
    #[instrument(level = "debug")]
    pub fn load_with_prefix(local_config: Option<&Path>, env_prefix: &str) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local) = local_config {
            debug!("loading local config {}", local.display());
            current = current.merge_with(&load_raw_settings(local)?);
        }

        current = Self::apply_env_overrides(current, env_prefix)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply `<PREFIX>_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env_prefix: &str) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("max_rename_tries") {
            settings.max_rename_tries = val;
        }
        if let Ok(val) = config.get_string("rename_separator") {
            settings.rename_separator = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> TreeResult<()> {
        if self.max_rename_tries == 0 {
            return Err(TreeError::Config {
                message: "max_rename_tries must be at least 1".into(),
            });
        }
        Ok(())
    }
}

//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dictree/dictree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `DICTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::Language;

/// A language the store is seeded with when it is first created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageSeed {
    /// ISO code used as translation key, e.g. `en-US`
    pub iso: String,
    /// Display name
    pub name: String,
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub default_languages: Option<Vec<LanguageSeed>>,
}

/// Unified configuration for dictree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Location of the TOML dictionary store
    pub store_path: PathBuf,
    /// Languages a new store starts out with
    pub default_languages: Vec<LanguageSeed>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_languages: vec![LanguageSeed {
                iso: "en-US".into(),
                name: "English (United States)".into(),
            }],
        }
    }
}

/// Default store location (`<data_dir>/dictree/dictionary.toml`).
fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "dictree")
        .map(|dirs| dirs.data_dir().join("dictionary.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.dictree/dictionary.toml"))
}

/// Get the XDG config directory for dictree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dictree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dictree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
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
    /// Seed languages as domain values.
    pub fn seed_languages(&self) -> Vec<Language> {
        self.default_languages
            .iter()
            .map(|seed| Language::new(seed.iso.clone(), seed.name.clone()))
            .collect()
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            default_languages: overlay
                .default_languages
                .clone()
                .unwrap_or_else(|| self.default_languages.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        Ok(current)
    }

    /// Apply DICTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DICTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dictree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/dictree/dictree.toml
#   Explicit: dictree --config <file>
#   Env:      DICTREE_STORE_PATH

# Dictionary store file
# store_path = "~/.local/share/dictree/dictionary.toml"

# Languages a new store is created with
# [[default_languages]]
# iso = "en-US"
# name = "English (United States)"
#
# [[default_languages]]
# iso = "da-DK"
# name = "Danish"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

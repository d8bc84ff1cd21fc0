//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STRATA__SECTION__KEY`, e.g. `STRATA__SYNTH__FORCE=true`
//! 3. Config file: `--config FILE`, else the platform config directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use strata_adapters::MANIFEST_FILE;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "STRATA";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Synthesis defaults.
    pub synth: SynthConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Project discovery.
    pub project: ProjectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Overwrite hand-written files without `--force`.
    pub force: bool,
    /// Run post-synthesis hooks.
    pub post_synthesize: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            force: false,
            post_synthesize: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Manifest file name, relative to the project directory.
    pub manifest: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: MANIFEST_FILE.into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist. The
    /// default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = config_file.cloned().unwrap_or_else(Self::config_path);
        Self::load_from(&path, config_file.is_some())
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .context("failed to encode default configuration")?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from '{}'", path.display()))?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.strata.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "strata", "strata")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".strata.toml"))
    }

    /// Look up a dotted key such as `synth.force`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(self).ok()?;
        for segment in key.split('.') {
            value = value.get_mut(segment)?.take();
        }
        Some(value)
    }
}

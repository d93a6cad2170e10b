//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/datasummary/datasummary.toml`
//! 3. Local config: `<dir>/.datasummary.toml` (usually the dataset's directory)
//! 4. Environment variables: `DATASUMMARY_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, OutputFormat};
use crate::domain::SchemaPolicy;

/// Unified configuration for datasummary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Handling of groups whose members diverge from the seed's shape
    pub schema_policy: SchemaPolicy,
    /// Default output format for `summarize`
    pub output: OutputFormat,
    /// Decimal places in tree output
    pub precision: usize,
    /// Aggregate sections on the rayon thread pool
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_policy: SchemaPolicy::Ignore,
            output: OutputFormat::Tree,
            precision: 2,
            parallel: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub schema_policy: Option<SchemaPolicy>,
    pub output: Option<OutputFormat>,
    pub precision: Option<usize>,
    pub parallel: Option<bool>,
}

/// Get the XDG config directory for datasummary.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "datasummary").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("datasummary.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".datasummary.toml")
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
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            schema_policy: overlay.schema_policy.unwrap_or(self.schema_policy),
            output: overlay.output.unwrap_or(self.output),
            precision: overlay.precision.unwrap_or(self.precision),
            parallel: overlay.parallel.unwrap_or(self.parallel),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.datasummary.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/datasummary/datasummary.toml`
    /// 3. Local config: `<local_dir>/.datasummary.toml`
    /// 4. Environment variables: `DATASUMMARY_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env_source())
    }

    /// Apply DATASUMMARY_* variables from `env` as explicit overrides.
    ///
    /// Malformed values are errors, never silently ignored.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = optional(config.get_string("schema_policy"))? {
            settings.schema_policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = optional(config.get_string("output"))? {
            settings.output = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = optional(config.get_int("precision"))? {
            settings.precision = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("precision must not be negative: {}", val),
            })?;
        }
        if let Some(val) = optional(config.get_bool("parallel"))? {
            settings.parallel = val;
        }

        Ok(settings)
    }

    /// Load ONLY the local config file, on top of compiled defaults.
    ///
    /// Returns None if no local config file exists.
    pub fn load_local_only(dir: &Path) -> Result<Option<Self>, ApplicationError> {
        let local_path = local_config_path(dir);
        if !local_path.exists() {
            return Ok(None);
        }

        let defaults = Settings::default();
        let config = Config::builder()
            .set_default("schema_policy", defaults.schema_policy.to_string())
            .map_err(config_err)?
            .set_default("output", defaults.output.to_string())
            .map_err(config_err)?
            .set_default("precision", defaults.precision as i64)
            .map_err(config_err)?
            .set_default("parallel", defaults.parallel)
            .map_err(config_err)?
            .add_source(File::from(local_path).required(true))
            .build()
            .map_err(config_err)?;

        let settings: Self = config.try_deserialize().map_err(config_err)?;
        Ok(Some(settings))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# datasummary configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/datasummary/datasummary.toml
#   Local:  <dataset dir>/.datasummary.toml
#   Env:    DATASUMMARY_* environment variables (explicit overrides)

# Groups whose items do not share the first item's fields:
#   ignore - merge anyway, unmatched fields are dropped silently
#   warn   - merge anyway, log and report every divergence
#   strict - fail on the first divergent group
# schema_policy = "ignore"

# Output format of `summarize`: json, toml or tree
# output = "tree"

# Decimal places for values in tree output
# precision = 2

# Aggregate sections in parallel
# parallel = true
"#
        .to_string()
    }
}

/// `DATASUMMARY_SCHEMA_POLICY` → `schema_policy`; `__` separates nested keys.
fn env_source() -> Environment {
    Environment::with_prefix("DATASUMMARY")
        .prefix_separator("_")
        .separator("__")
}

/// A missing key is `None`; any other lookup failure is a config error.
fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

//! Validator configuration with multi-source merging.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. Project config (`sqlvet.toml`)
//! 3. Local overrides (`sqlvet.local.toml`, gitignored)
//! 4. Environment variables (`SQLVET_*`, sections split on `__`)
//!
//! ```toml
//! [dialect]
//! name = "aql"
//! preprocess = true
//!
//! [warnings]
//! select_star = true
//! unbounded_select = false
//!
//! [lexical]
//! enabled = true
//!
//! [[lexical.extra]]
//! pattern = '(?i)\bGROUP\s+BY\s+(ORDER|LIMIT)\b'
//! message = "Empty GROUP BY list"
//! ```

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dialect::DialectConfig;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "sqlvet.toml";
/// Local override file name.
pub const LOCAL_CONFIG_FILE: &str = "sqlvet.local.toml";

/// Complete validator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlvetConfig {
    pub dialect: DialectConfig,
    pub warnings: WarningsConfig,
    pub lexical: LexicalConfig,
}

/// Toggles for the advisory checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningsConfig {
    /// Warn on `SELECT *`.
    pub select_star: bool,
    /// Warn on a top-level SELECT with neither WHERE nor a row limit.
    pub unbounded_select: bool,
    /// Warn on ABAP `SELECT SINGLE` without WHERE.
    pub single_without_where: bool,
}

impl Default for WarningsConfig {
    fn default() -> Self {
        Self {
            select_star: true,
            unbounded_select: true,
            single_without_where: true,
        }
    }
}

/// Lexical pre-validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    pub enabled: bool,
    /// Extra pattern checks appended after the built-in ones.
    pub extra: Vec<PatternCheck>,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra: Vec::new(),
        }
    }
}

/// A user-supplied lexical check: `message` is reported when `pattern`
/// matches the normalized, literal-masked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCheck {
    pub pattern: String,
    pub message: String,
}

/// Configuration loader with builder pattern.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    /// Replaces the process environment when set.
    env_vars: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// Creates a loader rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "SQLVET".to_string(),
            env_vars: None,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the environment variable prefix (default: `SQLVET`).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    #[cfg(test)]
    fn with_env_vars<'a>(mut self, vars: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        );
        self
    }

    /// Loads configuration from all sources with proper precedence.
    pub fn load(self) -> Result<SqlvetConfig> {
        let mut builder = config::Config::builder();

        let defaults = SqlvetConfig::default();
        builder = builder.add_source(
            config::Config::try_from(&defaults).context("Failed to serialize defaults")?,
        );

        for name in [PROJECT_CONFIG_FILE, LOCAL_CONFIG_FILE] {
            let file = self.project_dir.join(name);
            if file.exists() {
                builder = builder.add_source(
                    config::File::from(file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        // SQLVET_WARNINGS__SELECT_STAR=false
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(self.env_vars),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

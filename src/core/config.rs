use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_CREDIT_LIMIT: f64 = 1_000_000.0;
pub const DEFAULT_HISTORY_MONTHS: u32 = 6;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SourcesConfig {
    pub balances: Option<PathBuf>,
    pub movements: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "default_credit_limit")]
    pub credit_limit: f64,
    #[serde(default)]
    pub overdraft_threshold: f64,
    #[serde(default = "default_history_months")]
    pub history_months: u32,
}

fn default_credit_limit() -> f64 {
    DEFAULT_CREDIT_LIMIT
}

fn default_history_months() -> u32 {
    DEFAULT_HISTORY_MONTHS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            credit_limit: DEFAULT_CREDIT_LIMIT,
            overdraft_threshold: 0.0,
            history_months: DEFAULT_HISTORY_MONTHS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Loads `path` when given, else the default config file when it exists,
    /// else built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }
        match Self::default_config_path() {
            Ok(default_path) if default_path.exists() => Self::load_from_path(&default_path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "acctpulse", "acctpulse")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if let Some(base) = path.as_ref().parent() {
            config.sources.resolve_relative_to(base);
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

impl SourcesConfig {
    fn resolve_relative_to(&mut self, base: &Path) {
        for source in [&mut self.balances, &mut self.movements].into_iter().flatten() {
            if source.is_relative() {
                *source = base.join(&*source);
            }
        }
    }
}

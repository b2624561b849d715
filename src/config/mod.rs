use crate::data::SortMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub beads: BeadsConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub prefetch: PrefetchConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// How the `bd` CLI is invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeadsConfig {
    #[serde(default = "default_command")]
    pub command: String,
    /// Extra arguments appended to `bd list --json`
    #[serde(default)]
    pub list_args: Vec<String>,
    /// Extra arguments appended to `bd comments <id> --json`
    #[serde(default)]
    pub comments_args: Vec<String>,
    /// Directory containing `.beads/`; defaults to the current directory
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_command() -> String {
    "bd".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for BeadsConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            list_args: Vec::new(),
            comments_args: Vec::new(),
            workdir: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Periodic refresh; 0 disables the timer
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Refresh when files under `.beads/` change
    #[serde(default = "default_true")]
    pub watch_files: bool,
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            watch_files: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefetchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    crate::tree::prefetch::DEFAULT_MAX_CONCURRENT
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub sort_mode: SortMode,
    /// Open the root issues on the first load
    #[serde(default = "default_true")]
    pub expand_roots: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            expand_roots: true,
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "beadscope")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Log file used while the TUI owns the terminal
pub fn log_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("beadscope.log"))
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Write the default config to `path` (or the default location).
///
/// Refuses to overwrite an existing file. Returns the path written.
pub fn init(path: Option<&Path>) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if config_path.exists() {
        anyhow::bail!("Config already exists at {}", config_path.display());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}

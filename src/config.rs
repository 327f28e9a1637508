// Configuration loading
//
// Reads `<config_dir>/taskquery/config.yaml`. Every key is optional.

use crate::query::QuerySpec;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "taskquery";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// JSONL file holding the task collection
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,

    /// Query applied by `list` before command-line flags
    #[serde(default)]
    pub default_query: QuerySpec,

    /// Colorize terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            default_query: QuerySpec::default(),
            color: default_color(),
        }
    }
}

fn default_tasks_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("tasks.jsonl")
}

fn default_color() -> bool {
    true
}

impl Config {
    /// Default config location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
    }

    /// Load from `path`, or the default location when `None`
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

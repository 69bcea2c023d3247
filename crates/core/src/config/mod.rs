//! Analyzer configuration: which interpreter evaluates calls, how long each
//! evaluation may take, and how modules are aliased in evaluated code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::worker::{default_imports, resolve_python_path, PythonWorker};

/// Serializable analyzer settings, read from JSON or YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Interpreter used for evaluation and library read-through.
    #[serde(default = "default_python")]
    pub python: PathBuf,
    /// Per-call time budget in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `(module, alias)` pairs imported before every evaluation.
    #[serde(default = "default_imports")]
    pub aliases: Vec<(String, String)>,
    /// Directory evaluations run in, so relative file paths in calls resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Suffix output file names with a per-run timestamp.
    #[serde(default = "default_true")]
    pub timestamped_outputs: bool,
}

fn default_python() -> PathBuf {
    resolve_python_path()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_true() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            timeout_secs: default_timeout_secs(),
            aliases: default_imports(),
            working_dir: None,
            timestamped_outputs: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A worker configured from these settings.
    pub fn worker(&self) -> PythonWorker {
        PythonWorker::new(self.python.clone(), self.timeout())
            .with_imports(self.aliases.clone())
            .with_working_dir(self.working_dir.clone())
    }
}

/// Load a config file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let config = if is_yaml {
        serde_yaml::from_str(&body).context("Failed to parse config YAML")?
    } else {
        serde_json::from_str(&body).context("Failed to parse config JSON")?
    };
    Ok(config)
}

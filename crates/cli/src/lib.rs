use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use riskycomb_core::config::{load_config, AnalyzerConfig};
use riskycomb_core::model::TargetFunction;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod commands;

/// Install the stderr log subscriber. `RUST_LOG` wins unless `-v` was given.
pub fn init_logging(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Overrides collected from command-line flags.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub python: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub working_dir: Option<PathBuf>,
    pub no_timestamp: bool,
}

/// Resolve settings: flags, then `RISKYCOMB_PYTHON`, then the config file,
/// then defaults.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<AnalyzerConfig> {
    let mut config = match &overrides.config {
        Some(path) => load_config(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(python) = std::env::var_os("RISKYCOMB_PYTHON") {
        config.python = PathBuf::from(python);
    }
    if let Some(python) = &overrides.python {
        config.python = python.clone();
    }
    if let Some(secs) = overrides.timeout_secs {
        config.timeout_secs = secs;
    }
    if let Some(dir) = &overrides.working_dir {
        config.working_dir = Some(dir.clone());
    }
    if overrides.no_timestamp {
        config.timestamped_outputs = false;
    }
    Ok(config)
}

/// Target from explicit flags, falling back to the input file name
/// (`<module>.<function>-<anything>`).
pub fn resolve_target(
    input: &Path,
    module: Option<String>,
    function: Option<String>,
) -> Result<TargetFunction> {
    let from_path = TargetFunction::from_input_path(input);
    let module = module.or_else(|| from_path.as_ref().map(|t| t.module.clone()));
    let function = function.or_else(|| from_path.as_ref().map(|t| t.function.clone()));
    match (module, function) {
        (Some(module), Some(function)) => Ok(TargetFunction::new(module, function)),
        _ => Err(anyhow!(
            "Cannot tell the target function of {}; name it <module>.<function>-<suffix> or pass --module and --function",
            input.display()
        )),
    }
}

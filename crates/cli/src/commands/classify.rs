use anyhow::{Context, Result};

use riskycomb_core::call::extract_call;
use riskycomb_core::classify::default_registry;
use riskycomb_core::services::{
    classify_call, Materializer, NullMaterializer, PythonMaterializer,
};

use crate::{resolve_config, ConfigOverrides};

/// Classify a single logged call without evaluating it first.
///
/// With `offline`, rules that need the real library are reported as skipped.
pub fn classify_command(
    module: &str,
    line: &str,
    offline: bool,
    overrides: &ConfigOverrides,
    json: bool,
) -> Result<()> {
    let registry = default_registry();
    let call = extract_call(line);
    let materializer: Box<dyn Materializer> = if offline {
        tracing::debug!("offline: library read-through disabled");
        Box::new(NullMaterializer)
    } else {
        let config = resolve_config(overrides)?;
        Box::new(PythonMaterializer::new(config.worker()))
    };

    let classification = classify_call(&registry, module, &call, materializer.as_ref())
        .with_context(|| format!("Failed to classify `{call}`"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
        return Ok(());
    }

    if classification.tags.is_empty() {
        println!("No risky combinations in {module}.{call}");
    }
    for tag in &classification.tags {
        println!("{tag}");
    }
    for skipped in &classification.skipped {
        eprintln!("skipped {}: {}", skipped.family, skipped.error);
    }
    Ok(())
}

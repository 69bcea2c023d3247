use anyhow::Result;
use serde::Serialize;

use riskycomb_core::classify::default_registry;

#[derive(Debug, Serialize)]
pub struct FunctionInfo {
    pub module: String,
    pub function: String,
    pub parameters: usize,
}

/// List the functions that have a rule set.
pub fn list_functions_command(json: bool) -> Result<()> {
    let registry = default_registry();
    let entries: Vec<FunctionInfo> = registry
        .keys()
        .filter_map(|(module, function)| {
            registry.get(module, function).map(|entry| FunctionInfo {
                module: module.to_string(),
                function: function.to_string(),
                parameters: entry.descriptor.params.len(),
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Functions:");
    for entry in entries {
        println!("- {}.{} ({} parameters)", entry.module, entry.function, entry.parameters);
    }
    Ok(())
}

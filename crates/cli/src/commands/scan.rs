use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use riskycomb_core::classify::default_registry;
use riskycomb_core::model::{RunSummary, TargetFunction};
use riskycomb_core::report::{ReportSink, RunTag};
use riskycomb_core::services::{Pipeline, PythonEvaluator, PythonMaterializer};

use crate::{resolve_config, resolve_target, ConfigOverrides};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub module: Option<String>,
    pub function: Option<String>,
    pub overrides: ConfigOverrides,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    target: &'a TargetFunction,
    executable_log: PathBuf,
    summary: &'a RunSummary,
}

/// Evaluate every call in a log and write executable, timed-out and
/// per-tag logs into the output directory.
pub fn scan_command(opts: &ScanOptions) -> Result<()> {
    let config = resolve_config(&opts.overrides)?;
    let target = resolve_target(&opts.input, opts.module.clone(), opts.function.clone())?;

    tracing::debug!(
        target_function = %target,
        python = %config.python.display(),
        timeout_secs = config.timeout_secs,
        "starting scan"
    );

    let registry = default_registry();
    let worker = config.worker();
    let evaluator = PythonEvaluator::new(worker.clone());
    let materializer = PythonMaterializer::new(worker);

    let run_tag = if config.timestamped_outputs { RunTag::now() } else { RunTag::None };
    let mut sink = ReportSink::create(&opts.output_dir, &target.function, run_tag)
        .with_context(|| format!("Failed to prepare output dir {}", opts.output_dir.display()))?;
    let pipeline = Pipeline::new(target.clone(), &registry, &evaluator, &materializer)?;
    let summary = pipeline
        .run_file(&opts.input, &mut sink)
        .with_context(|| format!("Failed to scan {}", opts.input.display()))?;

    if opts.json {
        let report =
            ScanReport { target: &target, executable_log: sink.executable_path(), summary: &summary };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Scanned {} for {}", opts.input.display(), target);
    println!("  Lines:          {}", summary.lines);
    println!("  Unsafe:         {}", summary.unsafe_calls);
    println!("  Not executable: {}", summary.not_executable);
    println!("  Executable:     {}", summary.executable);
    println!("  Timed out:      {}", summary.timed_out);
    if summary.unclassified > 0 {
        println!("  Unclassified:   {}", summary.unclassified);
    }
    if summary.skipped_rules > 0 {
        println!("  Skipped rules:  {}", summary.skipped_rules);
    }
    println!("  Executable log: {}", sink.executable_path().display());
    if summary.tags.is_empty() {
        println!("Risky combinations: (none)");
    } else {
        println!("Risky combinations:");
        for (tag, count) in &summary.tags {
            println!("- {tag}: {count}");
        }
    }
    Ok(())
}

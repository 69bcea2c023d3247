use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::call::{extract_call, has_call_shape, is_safe, parse_call, ParseError};
use crate::classify::Classification;
use crate::model::{CallRecord, EvaluationOutcome, RunSummary, TargetFunction};
use crate::registry::{bind, BindError, Registry};
use crate::report::{ReportError, ReportSink};
use crate::services::evaluator::{Evaluation, Evaluator};
use crate::services::materialize::Materializer;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read input {path}: {source}")]
    Input { path: PathBuf, source: std::io::Error },
    #[error("no rule set registered for {0}")]
    UnknownFunction(TargetFunction),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("no rule set registered for {module}.{function}")]
    Unsupported { module: String, function: String },
}

/// Parse, bind and classify one bare call against `module`'s rule sets.
pub fn classify_call(
    registry: &Registry,
    module: &str,
    call: &CallRecord,
    materializer: &dyn Materializer,
) -> Result<Classification, ClassifyError> {
    let parsed = parse_call(call.as_str())?;
    let entry = registry.get(module, &parsed.function).ok_or_else(|| {
        ClassifyError::Unsupported { module: module.to_string(), function: parsed.function.clone() }
    })?;
    let binding = bind(entry.descriptor, &parsed)?;
    Ok(entry.classifier.classify(&binding, materializer))
}

/// Sequential driver over one input log targeting one function.
pub struct Pipeline<'a> {
    target: TargetFunction,
    registry: &'a Registry,
    evaluator: &'a dyn Evaluator,
    materializer: &'a dyn Materializer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        target: TargetFunction,
        registry: &'a Registry,
        evaluator: &'a dyn Evaluator,
        materializer: &'a dyn Materializer,
    ) -> Result<Self, PipelineError> {
        if registry.get(&target.module, &target.function).is_none() {
            return Err(PipelineError::UnknownFunction(target));
        }
        Ok(Self { target, registry, evaluator, materializer })
    }

    pub fn target(&self) -> &TargetFunction {
        &self.target
    }

    pub fn run_file(&self, path: &Path, sink: &mut ReportSink) -> Result<RunSummary, PipelineError> {
        let file = File::open(path)
            .map_err(|source| PipelineError::Input { path: path.to_path_buf(), source })?;
        self.run(BufReader::new(file), sink).map_err(|err| match err {
            PipelineError::Input { source, .. } => {
                PipelineError::Input { path: path.to_path_buf(), source }
            }
            other => other,
        })
    }

    /// Process every line of `input`. Only output and input i/o errors abort
    /// the run; everything else is counted in the summary.
    pub fn run<R: BufRead>(
        &self,
        mut input: R,
        sink: &mut ReportSink,
    ) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .map_err(|source| PipelineError::Input { path: PathBuf::new(), source })?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.process_line(&line, sink, &mut summary)?;
        }
        tracing::info!(
            target_function = %self.target,
            lines = summary.lines,
            executable = summary.executable,
            timed_out = summary.timed_out,
            tags = summary.tags.len(),
            "run finished"
        );
        Ok(summary)
    }

    /// Handle one raw log line. `None` when the line was empty or dropped
    /// before evaluation.
    pub fn process_line(
        &self,
        line: &str,
        sink: &mut ReportSink,
        summary: &mut RunSummary,
    ) -> Result<Option<EvaluationOutcome>, PipelineError> {
        let call = extract_call(line);
        if call.as_str().trim().is_empty() {
            return Ok(None);
        }
        summary.lines += 1;

        if !is_safe(&call) {
            tracing::debug!(call = %call, "dropping call that reads interactive input");
            summary.unsafe_calls += 1;
            return Ok(None);
        }
        if !has_call_shape(&call) {
            tracing::debug!(call = %call, "dropping line without a call");
            summary.not_executable += 1;
            return Ok(Some(EvaluationOutcome::NotExecutable));
        }

        match self.evaluator.evaluate(&self.target, &call) {
            Evaluation::Succeeded => {
                summary.executable += 1;
                sink.record_executable(&call)?;
                let tags = match classify_call(self.registry, &self.target.module, &call, self.materializer)
                {
                    Ok(classification) => {
                        summary.skipped_rules += classification.skipped.len();
                        classification.tags
                    }
                    Err(err) => {
                        tracing::warn!(call = %call, error = %err, "executable call could not be classified");
                        summary.unclassified += 1;
                        Vec::new()
                    }
                };
                for tag in &tags {
                    sink.record_tag(tag, &call)?;
                }
                summary.record_tags(&tags);
                Ok(Some(EvaluationOutcome::Executable { tags }))
            }
            Evaluation::Failed { reason } => {
                tracing::debug!(call = %call, reason = %reason, "call is not executable in isolation");
                summary.not_executable += 1;
                Ok(Some(EvaluationOutcome::NotExecutable))
            }
            Evaluation::TimedOut { budget } => {
                tracing::debug!(call = %call, ?budget, "call timed out");
                summary.timed_out += 1;
                sink.record_timed_out(&call)?;
                Ok(Some(EvaluationOutcome::TimedOut))
            }
        }
    }
}

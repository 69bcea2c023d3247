use std::time::Duration;

use crate::model::{CallRecord, TargetFunction};
use crate::services::worker::{PythonWorker, WorkerError, WorkerMode};

/// Outcome of evaluating one call in isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Succeeded,
    Failed { reason: String },
    TimedOut { budget: Duration },
}

/// Decides whether a call is executable using only its literal arguments.
pub trait Evaluator {
    fn evaluate(&self, target: &TargetFunction, call: &CallRecord) -> Evaluation;
}

/// Evaluates `<alias>.<call>` in a fresh Python worker per call.
pub struct PythonEvaluator {
    worker: PythonWorker,
}

impl PythonEvaluator {
    pub fn new(worker: PythonWorker) -> Self {
        Self { worker }
    }

    /// The expression handed to the interpreter for `call`.
    pub fn expression(&self, target: &TargetFunction, call: &CallRecord) -> String {
        let prefix = self
            .worker
            .imports
            .iter()
            .find(|(module, _)| module == &target.module)
            .map(|(_, alias)| alias.as_str())
            .unwrap_or(target.module.as_str());
        format!("{prefix}.{call}")
    }
}

impl Evaluator for PythonEvaluator {
    fn evaluate(&self, target: &TargetFunction, call: &CallRecord) -> Evaluation {
        let expression = self.expression(target, call);
        match self.worker.run(WorkerMode::Evaluate, &[], &expression) {
            Ok(_) => Evaluation::Succeeded,
            Err(WorkerError::TimedOut(budget)) => Evaluation::TimedOut { budget },
            Err(err @ WorkerError::Spawn { .. }) => {
                tracing::warn!(error = %err, "evaluator could not start interpreter");
                Evaluation::Failed { reason: err.to_string() }
            }
            Err(err) => Evaluation::Failed { reason: err.to_string() },
        }
    }
}

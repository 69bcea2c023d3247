//! Process-backed services: the isolated Python worker, the evaluator and
//! materializer built on it, and the driver tying them to the report sink.

pub mod evaluator;
pub mod materialize;
pub mod pipeline;
pub mod worker;

pub use evaluator::{Evaluation, Evaluator, PythonEvaluator};
pub use materialize::{
    FrameFacts, Label, MaterializeError, MaterializeRequest, Materializer, NullMaterializer,
    PythonMaterializer, ValueFacts,
};
pub use pipeline::{classify_call, ClassifyError, Pipeline, PipelineError};
pub use worker::{PythonWorker, WorkerError, WorkerMode};

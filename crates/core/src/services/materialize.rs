use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::call::PyValue;
use crate::services::worker::{PythonWorker, WorkerError, WorkerMode};

/// A Python expression to build with the real library, plus named inputs
/// evaluated first and bound in the same namespace. Inputs let a rule ask
/// whether the result aliases an object the caller passed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MaterializeRequest {
    pub inputs: Vec<(String, String)>,
    pub expression: String,
    /// Also report the distinct cell types of each column of a table.
    pub cell_types: bool,
}

impl MaterializeRequest {
    /// Describe the value of a single source expression.
    pub fn value(source: impl Into<String>) -> Self {
        Self { inputs: Vec::new(), expression: source.into(), cell_types: false }
    }

    /// `module.function(args...)`, with keyword arguments rendered as `k=v`.
    pub fn call<'a, I>(module: &str, function: &str, args: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'a str>, String)>,
    {
        let rendered: Vec<String> = args
            .into_iter()
            .map(|(keyword, source)| match keyword {
                Some(k) => format!("{k}={source}"),
                None => source,
            })
            .collect();
        Self::value(format!("{module}.{function}({})", rendered.join(", ")))
    }

    pub fn with_input(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.inputs.push((name.into(), source.into()));
        self
    }

    pub fn with_cell_types(mut self) -> Self {
        self.cell_types = true;
        self
    }
}

impl fmt::Display for MaterializeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, source) in &self.inputs {
            write!(f, "{name} = {source}; ")?;
        }
        f.write_str(&self.expression)
    }
}

/// A column or index label as the library reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Str(String),
    Other { repr: String },
}

impl Label {
    /// The label a literal written at the call site stands for.
    pub fn of_value(value: &PyValue) -> Self {
        match value {
            PyValue::Int(i) => Label::Int(*i),
            PyValue::Str(s) => Label::Str(s.clone()),
            other => Label::Other { repr: other.to_source() },
        }
    }

    /// Whether a label written at the call site names this column.
    pub fn matches(&self, value: &PyValue) -> bool {
        match (self, value) {
            (Label::Int(i), v) => v.as_i64() == Some(*i) && !matches!(v, PyValue::Bool(_)),
            (Label::Str(s), PyValue::Str(v)) => s == v,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{i}"),
            Label::Str(s) => f.write_str(s),
            Label::Other { repr } => f.write_str(repr),
        }
    }
}

/// Shape and typing of a materialised table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameFacts {
    pub columns: Vec<Label>,
    pub rows: usize,
    #[serde(default)]
    pub index_is_datetime: bool,
    /// Per-column dtype name (`int64`, `object`, `datetime64[ns]`, ...).
    #[serde(default)]
    pub dtypes: Vec<String>,
    /// Per-column distinct Python type names of the cells, in order of first
    /// appearance. Builtins are unqualified. Only filled when the request
    /// asked for cell types.
    #[serde(default)]
    pub cell_types: Vec<Vec<String>>,
}

impl FrameFacts {
    pub fn column_index(&self, label: &PyValue) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(label))
    }

    pub fn column_named(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.as_str() == Some(name))
    }
}

/// What the real library produced for a [`MaterializeRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueFacts {
    pub type_name: String,
    #[serde(default)]
    pub ndim: Option<usize>,
    /// Set for real scalars (`int`, `float`, numpy numbers).
    #[serde(default)]
    pub number: Option<f64>,
    /// Per request input: does the result share memory with it.
    #[serde(default)]
    pub shares_memory: BTreeMap<String, bool>,
    /// What iterating the value yields, for builtin containers, 1-d arrays
    /// and indexes: elements, or keys for a dict.
    #[serde(default)]
    pub members: Option<Vec<Label>>,
    #[serde(default)]
    pub frame: Option<FrameFacts>,
}

impl ValueFacts {
    pub fn is_ndarray(&self) -> bool {
        self.type_name == "numpy.ndarray"
    }

    pub fn is_frame(&self) -> bool {
        self.frame.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterializeError {
    #[error("library read-through is not available")]
    Unavailable,
    #[error("library raised {0}")]
    Raised(String),
    #[error("library call exceeded {0:?}")]
    TimedOut(Duration),
    #[error("worker failure: {0}")]
    Worker(String),
}

/// Read-through to the real libraries for facts a literal cannot give.
pub trait Materializer {
    fn describe(&self, request: &MaterializeRequest) -> Result<ValueFacts, MaterializeError>;
}

/// Refuses every request; rules that need the library are skipped.
pub struct NullMaterializer;

impl Materializer for NullMaterializer {
    fn describe(&self, _request: &MaterializeRequest) -> Result<ValueFacts, MaterializeError> {
        Err(MaterializeError::Unavailable)
    }
}

/// Materialises values in a fresh Python worker per request.
pub struct PythonMaterializer {
    worker: PythonWorker,
}

impl PythonMaterializer {
    pub fn new(worker: PythonWorker) -> Self {
        Self { worker }
    }
}

impl Materializer for PythonMaterializer {
    fn describe(&self, request: &MaterializeRequest) -> Result<ValueFacts, MaterializeError> {
        tracing::debug!(request = %request, cell_types = request.cell_types, "materializing");
        let mode =
            if request.cell_types { WorkerMode::DescribeCells } else { WorkerMode::Describe };
        let reply = self
            .worker
            .run(mode, &request.inputs, &request.expression)
            .map_err(|err| match err {
                WorkerError::TimedOut(budget) => MaterializeError::TimedOut(budget),
                WorkerError::Raised(msg) => MaterializeError::Raised(msg),
                other => MaterializeError::Worker(other.to_string()),
            })?;
        reply.ok_or_else(|| MaterializeError::Worker("worker returned no facts".into()))
    }
}

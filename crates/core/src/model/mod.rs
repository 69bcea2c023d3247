//! Core data model: call records, target functions, risky tags and outcomes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Bare call text, e.g. `zeros(3, order="F")`, with module qualifiers and any
/// source annotation removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRecord(String);

impl CallRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `(module, function)` pair a batch of calls targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetFunction {
    pub module: String,
    pub function: String,
}

impl TargetFunction {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self { module: module.into(), function: function.into() }
    }

    /// Derive the target from an input log path named
    /// `[<dir>/]<module>.<function>-<anything>`.
    ///
    /// Returns `None` when the file name carries no module qualifier.
    pub fn from_input_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let identifier = file_name.split('-').next()?;
        let (module, function) = identifier.rsplit_once('.')?;
        if module.is_empty() || function.is_empty() {
            return None;
        }
        Some(Self::new(module, function))
    }
}

impl fmt::Display for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// Advisory finding naming the parameters that interact riskily, in the form
/// `<function>.<param>-<param>[-<param>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskyTag(String);

impl RiskyTag {
    pub fn new(function: &str, params: &[&str]) -> Self {
        Self(format!("{}.{}", function, params.join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RiskyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for RiskyTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What happened to one call record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EvaluationOutcome {
    Executable { tags: Vec<RiskyTag> },
    NotExecutable,
    TimedOut,
}

/// Counters for one pass over an input log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub lines: usize,
    pub unsafe_calls: usize,
    pub not_executable: usize,
    pub executable: usize,
    pub timed_out: usize,
    /// Executable calls whose arguments could not be parsed or bound.
    pub unclassified: usize,
    /// Rule families that could not complete, summed over all calls.
    pub skipped_rules: usize,
    pub tags: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn record_tags(&mut self, tags: &[RiskyTag]) {
        for tag in tags {
            *self.tags.entry(tag.as_str().to_string()).or_default() += 1;
        }
    }
}

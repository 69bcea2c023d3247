//! Risky-combination rule sets, one per supported function.
//!
//! A rule set is an ordered list of named families. Families run in order and
//! independently: a family that cannot decide (unresolvable argument, library
//! read-through failure) is recorded as skipped and the rest still run.

mod frame;
mod numeric;
mod plot;
mod read_csv;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::call::PyValue;
use crate::model::RiskyTag;
use crate::registry::{self, ArgumentBinding, Registry};
use crate::services::materialize::{
    Label, MaterializeError, MaterializeRequest, Materializer, ValueFacts,
};

pub use plot::{parse_fmt, FmtSpec};

/// Per-function classification routine.
pub trait Classifier: Send + Sync {
    /// Tags in rule order. Must not depend on anything but the binding and
    /// the facts the materializer reports.
    fn classify(&self, binding: &ArgumentBinding, materializer: &dyn Materializer)
        -> Classification;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub tags: Vec<RiskyTag>,
    pub skipped: Vec<SkippedRule>,
}

/// A family that could not complete for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRule {
    pub family: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("cannot decide `{param}` from `{text}`")]
    Unresolved { param: &'static str, text: String },
    #[error("unexpected value for `{param}`: {detail}")]
    Unexpected { param: &'static str, detail: String },
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

pub type FamilyCheck = fn(&RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError>;

pub struct Family {
    pub name: &'static str,
    pub check: FamilyCheck,
}

/// A fixed, ordered list of rule families for one function.
pub struct RuleSet {
    families: &'static [Family],
}

impl RuleSet {
    pub const fn new(families: &'static [Family]) -> Self {
        Self { families }
    }

    pub fn family_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.families.iter().map(|f| f.name)
    }
}

impl Classifier for RuleSet {
    fn classify(
        &self,
        binding: &ArgumentBinding,
        materializer: &dyn Materializer,
    ) -> Classification {
        let ctx = RuleContext::new(binding, materializer);
        let mut out = Classification::default();
        for family in self.families {
            match (family.check)(&ctx) {
                Ok(tags) => {
                    for tag in tags {
                        if !out.tags.contains(&tag) {
                            out.tags.push(tag);
                        }
                    }
                }
                Err(error) => {
                    tracing::debug!(
                        function = binding.function(),
                        family = family.name,
                        error = %error,
                        "rule family skipped"
                    );
                    out.skipped.push(SkippedRule { family: family.name, error: error.to_string() });
                }
            }
        }
        out
    }
}

/// What a family sees: the binding plus a memoising view of the materializer.
pub struct RuleContext<'a> {
    binding: &'a ArgumentBinding,
    materializer: &'a dyn Materializer,
    facts: RefCell<HashMap<MaterializeRequest, Result<ValueFacts, MaterializeError>>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(binding: &'a ArgumentBinding, materializer: &'a dyn Materializer) -> Self {
        Self { binding, materializer, facts: RefCell::new(HashMap::new()) }
    }

    pub fn binding(&self) -> &ArgumentBinding {
        self.binding
    }

    pub fn get(&self, name: &str) -> Option<&PyValue> {
        self.binding.get(name)
    }

    pub fn is_supplied(&self, name: &str) -> bool {
        self.binding.is_supplied(name)
    }

    /// Supplied and not `None`.
    pub fn is_given(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_none())
    }

    pub fn tag(&self, params: &[&str]) -> RiskyTag {
        RiskyTag::new(self.binding.function(), params)
    }

    /// Facts for `request`, asking the materializer at most once per call.
    pub fn describe(&self, request: MaterializeRequest) -> Result<ValueFacts, RuleError> {
        if let Some(cached) = self.facts.borrow().get(&request) {
            return cached.clone().map_err(RuleError::from);
        }
        let result = self.materializer.describe(&request);
        self.facts.borrow_mut().insert(request, result.clone());
        result.map_err(RuleError::from)
    }

    /// `module.function(...)` with the given parameters passed as keywords,
    /// in the order listed, when the caller supplied them.
    pub fn call_request(&self, params: &[&str]) -> MaterializeRequest {
        let descriptor = self.binding.descriptor();
        MaterializeRequest::call(
            descriptor.module,
            descriptor.name,
            params
                .iter()
                .filter_map(|name| self.get(name).map(|v| (Some(*name), v.to_source()))),
        )
    }

    /// Truthiness of a parameter's effective value; opaque values are resolved
    /// by the library.
    pub fn truthy(&self, name: &'static str) -> Result<bool, RuleError> {
        let Some(value) = self.binding.value_or_default(name) else {
            return Ok(false);
        };
        if let Some(b) = value.truthy() {
            return Ok(b);
        }
        let facts = self.describe(MaterializeRequest::value(format!("bool({value})")))?;
        match facts.type_name.as_str() {
            "bool" => facts
                .number
                .map(|n| n != 0.0)
                .ok_or(RuleError::Unresolved { param: name, text: value.to_source() }),
            _ => Err(RuleError::Unresolved { param: name, text: value.to_source() }),
        }
    }

    /// A real number for `name`, read from the literal or from the library.
    pub fn number(&self, name: &'static str, value: &PyValue) -> Result<f64, RuleError> {
        if let Some(n) = value.as_f64() {
            return Ok(n);
        }
        if value.is_literal() {
            return Err(RuleError::Unexpected {
                param: name,
                detail: format!("`{value}` is not a real number"),
            });
        }
        self.describe(MaterializeRequest::value(value.to_source()))?
            .number
            .ok_or(RuleError::Unresolved { param: name, text: value.to_source() })
    }

    /// What iterating `value` yields, as labels. Literals are read natively.
    pub fn members(&self, name: &'static str, value: &PyValue) -> Result<Vec<Label>, RuleError> {
        if value.is_literal() {
            if let Some(members) = value.members() {
                return Ok(members.iter().map(Label::of_value).collect());
            }
        }
        self.describe(MaterializeRequest::value(value.to_source()))?
            .members
            .ok_or(RuleError::Unresolved { param: name, text: value.to_source() })
    }

    /// Keys of `value` when it evaluates to a dict, `None` for anything else.
    pub fn dict_keys(
        &self,
        name: &'static str,
        value: &PyValue,
    ) -> Result<Option<Vec<Label>>, RuleError> {
        match value {
            PyValue::Dict(entries) if entries.iter().all(|(key, _)| key.is_literal()) => {
                Ok(Some(entries.iter().map(|(key, _)| Label::of_value(key)).collect()))
            }
            PyValue::Dict(_) | PyValue::Name(_) | PyValue::Expr(_) => {
                let facts = self.describe(MaterializeRequest::value(value.to_source()))?;
                if facts.type_name != "dict" {
                    return Ok(None);
                }
                facts
                    .members
                    .map(Some)
                    .ok_or(RuleError::Unresolved { param: name, text: value.to_source() })
            }
            _ => Ok(None),
        }
    }
}

/// Registry of every supported function with its rule set.
pub fn default_registry() -> Registry {
    let mut functions = Registry::new();
    functions
        .register(&registry::ZEROS, RuleSet::new(numeric::ZEROS_FAMILIES))
        .register(&registry::ARRAY, RuleSet::new(numeric::ARRAY_FAMILIES))
        .register(&registry::ARANGE, RuleSet::new(numeric::ARANGE_FAMILIES))
        .register(&registry::SHOW, RuleSet::new(&[]))
        .register(&registry::PLOT, RuleSet::new(plot::PLOT_FAMILIES))
        .register(&registry::DATAFRAME, RuleSet::new(frame::DATAFRAME_FAMILIES))
        .register(&registry::READ_CSV, RuleSet::new(read_csv::READ_CSV_FAMILIES));
    functions
}

//! Static parameter tables for the supported library functions, plus the
//! registry that pairs each table with its classifier.
//!
//! Defaults are the library's own. They are only consulted by rules that
//! need the effective value of a parameter the caller left out; whether a
//! parameter was supplied at all is tracked separately by [`ArgumentBinding`].

mod binding;
mod tables;

use std::collections::BTreeMap;

pub use binding::{bind, Arg, ArgumentBinding, BindError};
pub use tables::{ARANGE, ARRAY, DATAFRAME, PLOT, READ_CSV, SHOW, ZEROS};

use crate::call::PyValue;
use crate::classify::Classifier;

/// How a formal parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    KeywordOnly,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
}

/// A library-defined default value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LibDefault {
    /// No default: the caller must supply the parameter.
    Required,
    /// The library computes the default at call time; no static value is modelled.
    Dynamic,
    None,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    /// A builtin or attribute, e.g. `float`.
    Name(&'static str),
}

impl LibDefault {
    pub fn to_value(self) -> Option<PyValue> {
        match self {
            LibDefault::Required | LibDefault::Dynamic => None,
            LibDefault::None => Some(PyValue::None),
            LibDefault::Bool(b) => Some(PyValue::Bool(b)),
            LibDefault::Int(i) => Some(PyValue::Int(i)),
            LibDefault::Str(s) => Some(PyValue::Str(s.to_string())),
            LibDefault::Name(n) => Some(PyValue::Name(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: LibDefault,
    /// Alternative keyword spellings the library accepts (e.g. `lw`).
    pub aliases: &'static [&'static str],
}

impl Param {
    pub const fn new(name: &'static str, kind: ParamKind, default: LibDefault) -> Self {
        Self { name, kind, default, aliases: &[] }
    }

    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.name == keyword || self.aliases.contains(&keyword)
    }
}

/// Ordered formal parameters of one library function.
#[derive(Debug)]
pub struct FunctionDescriptor {
    pub module: &'static str,
    pub name: &'static str,
    pub params: &'static [Param],
}

impl FunctionDescriptor {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// One supported function: its parameter table and its rule set.
pub struct RegistryEntry {
    pub descriptor: &'static FunctionDescriptor,
    pub classifier: Box<dyn Classifier>,
}

/// Lookup of supported functions keyed by `(module, function)`.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<(String, String), RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    pub fn register<C: Classifier + 'static>(
        &mut self,
        descriptor: &'static FunctionDescriptor,
        classifier: C,
    ) -> &mut Self {
        self.entries.insert(
            (descriptor.module.to_string(), descriptor.name.to_string()),
            RegistryEntry { descriptor, classifier: Box::new(classifier) },
        );
        self
    }

    pub fn get(&self, module: &str, function: &str) -> Option<&RegistryEntry> {
        self.entries.get(&(module.to_string(), function.to_string()))
    }

    /// Registered `(module, function)` pairs in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.keys().map(|(m, f)| (m.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

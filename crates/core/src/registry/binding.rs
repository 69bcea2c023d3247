use thiserror::Error;

use super::{FunctionDescriptor, ParamKind};
use crate::call::{ParsedCall, PyValue};

/// Per-parameter binding state. `Unset` means the caller did not supply the
/// parameter; it can never be confused with a value the caller wrote.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Unset,
    Supplied(PyValue),
}

impl Arg {
    pub fn is_supplied(&self) -> bool {
        matches!(self, Arg::Supplied(_))
    }

    pub fn value(&self) -> Option<&PyValue> {
        match self {
            Arg::Supplied(v) => Some(v),
            Arg::Unset => None,
        }
    }
}

static UNSET: Arg = Arg::Unset;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{function}() takes at most {max} positional arguments but {given} were given")]
    TooManyPositional { function: &'static str, max: usize, given: usize },
    #[error("{function}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword { function: &'static str, keyword: String },
    #[error("{function}() got multiple values for argument '{param}'")]
    Duplicate { function: &'static str, param: &'static str },
    #[error("{function}() missing required argument '{param}'")]
    MissingRequired { function: &'static str, param: &'static str },
}

/// Every formal parameter of a target function resolved to either the value
/// the caller supplied or [`Arg::Unset`].
#[derive(Debug, Clone)]
pub struct ArgumentBinding {
    descriptor: &'static FunctionDescriptor,
    args: Vec<Arg>,
    varargs: Vec<PyValue>,
    extra_keywords: Vec<(String, PyValue)>,
}

impl ArgumentBinding {
    pub fn descriptor(&self) -> &'static FunctionDescriptor {
        self.descriptor
    }

    pub fn function(&self) -> &'static str {
        self.descriptor.name
    }

    /// Binding state of `name`; unknown names read as unset.
    pub fn arg(&self, name: &str) -> &Arg {
        self.descriptor.index_of(name).map(|idx| &self.args[idx]).unwrap_or(&UNSET)
    }

    /// The value the caller supplied for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&PyValue> {
        self.arg(name).value()
    }

    pub fn is_supplied(&self, name: &str) -> bool {
        self.arg(name).is_supplied()
    }

    /// The supplied value, or the library default when the caller left the
    /// parameter out. `None` when neither exists.
    pub fn value_or_default(&self, name: &str) -> Option<PyValue> {
        if let Some(value) = self.get(name) {
            return Some(value.clone());
        }
        self.descriptor.param(name).and_then(|p| p.default.to_value())
    }

    /// Values captured by a `*args` parameter.
    pub fn varargs(&self) -> &[PyValue] {
        &self.varargs
    }

    /// Keywords captured by a `**kwargs` parameter.
    pub fn extra_keywords(&self) -> &[(String, PyValue)] {
        &self.extra_keywords
    }

    /// Supplied parameters in declaration order, with their canonical names.
    pub fn supplied(&self) -> impl Iterator<Item = (&'static str, &PyValue)> + '_ {
        self.descriptor
            .params
            .iter()
            .zip(&self.args)
            .filter_map(|(param, arg)| arg.value().map(|v| (param.name, v)))
    }
}

/// Bind a parsed call to a function's formal parameters the way Python does.
pub fn bind(
    descriptor: &'static FunctionDescriptor,
    call: &ParsedCall,
) -> Result<ArgumentBinding, BindError> {
    let function = descriptor.name;
    let mut args = vec![Arg::Unset; descriptor.params.len()];
    let mut varargs = Vec::new();
    let mut extra_keywords = Vec::new();

    let mut positional = call.positional.iter();
    let mut positional_slots = 0;
    for (idx, param) in descriptor.params.iter().enumerate() {
        match param.kind {
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword => {
                positional_slots += 1;
                if let Some(value) = positional.next() {
                    args[idx] = Arg::Supplied(value.clone());
                }
            }
            ParamKind::VarPositional => varargs.extend(positional.by_ref().cloned()),
            ParamKind::KeywordOnly | ParamKind::VarKeyword => {}
        }
    }
    if positional.next().is_some() {
        return Err(BindError::TooManyPositional {
            function,
            max: positional_slots,
            given: call.positional.len(),
        });
    }

    let accepts_extra = descriptor.params.iter().any(|p| p.kind == ParamKind::VarKeyword);
    for (keyword, value) in &call.keywords {
        let slot = descriptor.params.iter().position(|p| {
            matches!(p.kind, ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly)
                && p.matches_keyword(keyword)
        });
        match slot {
            Some(idx) if args[idx].is_supplied() => {
                return Err(BindError::Duplicate { function, param: descriptor.params[idx].name });
            }
            Some(idx) => args[idx] = Arg::Supplied(value.clone()),
            None if accepts_extra => {
                if extra_keywords.iter().any(|(k, _): &(String, PyValue)| k == keyword) {
                    return Err(BindError::UnexpectedKeyword { function, keyword: keyword.clone() });
                }
                extra_keywords.push((keyword.clone(), value.clone()));
            }
            None => {
                return Err(BindError::UnexpectedKeyword { function, keyword: keyword.clone() })
            }
        }
    }

    for (param, arg) in descriptor.params.iter().zip(&args) {
        if param.default == super::LibDefault::Required && !arg.is_supplied() {
            return Err(BindError::MissingRequired { function, param: param.name });
        }
    }

    Ok(ArgumentBinding { descriptor, args, varargs, extra_keywords })
}

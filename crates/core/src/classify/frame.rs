//! Rules for `pandas.DataFrame`.

use super::{Family, RuleContext, RuleError};
use crate::call::PyValue;
use crate::model::RiskyTag;
use crate::services::materialize::MaterializeRequest;

pub(super) static DATAFRAME_FAMILIES: &[Family] = &[
    Family { name: "data-copy", check: data_copy },
    Family { name: "data-columns", check: data_columns },
    Family { name: "data-dtype", check: data_dtype },
];

/// Coarse Python type families used to compare a requested dtype with the
/// values a table actually holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeFamily {
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Bool,
    /// `object`: every value matches.
    Any,
    Other,
}

impl TypeFamily {
    /// Family of a dtype as written at the call site (`int`, `np.float32`,
    /// `"int64"`, `"O"`).
    pub(crate) fn of_dtype(spelling: &str) -> Option<Self> {
        let name = strip_numpy(spelling);
        let family = match name {
            "int" | "int_" | "intc" | "intp" | "longlong" | "i" => TypeFamily::Int,
            "float" | "float_" | "double" | "single" | "half" | "longdouble" | "f" => {
                TypeFamily::Float
            }
            "complex" | "complex_" | "c" => TypeFamily::Complex,
            "str" | "str_" | "unicode" | "unicode_" | "U" => TypeFamily::Str,
            "bytes" | "bytes_" | "S" => TypeFamily::Bytes,
            "bool" | "bool_" | "?" => TypeFamily::Bool,
            "object" | "object_" | "O" => TypeFamily::Any,
            n => sized(n)?,
        };
        Some(family)
    }

    /// Family of a cell's Python type name as the worker reports it.
    pub(crate) fn of_cell(type_name: &str) -> Self {
        match strip_numpy(type_name) {
            "bool" | "bool_" => TypeFamily::Bool,
            "int" | "int_" | "intc" | "intp" | "longlong" | "ulonglong" => TypeFamily::Int,
            "float" | "double" | "longdouble" => TypeFamily::Float,
            "complex" => TypeFamily::Complex,
            "str" | "str_" => TypeFamily::Str,
            "bytes" | "bytes_" => TypeFamily::Bytes,
            n => sized(n).unwrap_or(TypeFamily::Other),
        }
    }

    /// Whether a value of family `cell` is an instance of `self`.
    pub(crate) fn accepts(self, cell: TypeFamily) -> bool {
        match self {
            TypeFamily::Any => true,
            TypeFamily::Int => matches!(cell, TypeFamily::Int | TypeFamily::Bool),
            other => other == cell,
        }
    }
}

fn strip_numpy(name: &str) -> &str {
    name.strip_prefix("numpy.").or_else(|| name.strip_prefix("np.")).unwrap_or(name)
}

/// `int32`, `uint8`, `float64`, `complex128` and friends.
fn sized(name: &str) -> Option<TypeFamily> {
    let (family, bits) = if let Some(bits) = name.strip_prefix("uint") {
        (TypeFamily::Int, bits)
    } else if let Some(bits) = name.strip_prefix("int") {
        (TypeFamily::Int, bits)
    } else if let Some(bits) = name.strip_prefix("float") {
        (TypeFamily::Float, bits)
    } else if let Some(bits) = name.strip_prefix("complex") {
        (TypeFamily::Complex, bits)
    } else {
        return None;
    };
    (!bits.is_empty() && bits.chars().all(|c| c.is_ascii_digit())).then_some(family)
}

fn data_copy(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.is_supplied("copy") {
        return Ok(vec![]);
    }
    let copy_is_meaningful = match ctx.get("data") {
        None => false,
        Some(data) if data.is_literal() => false,
        Some(data) => {
            let facts = ctx.describe(MaterializeRequest::value(data.to_source()))?;
            facts.is_frame() || (facts.is_ndarray() && facts.ndim == Some(2))
        }
    };
    Ok(if copy_is_meaningful { vec![] } else { vec![ctx.tag(&["data", "copy"])] })
}

fn data_columns(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let (Some(data), Some(columns)) = (ctx.get("data"), ctx.get("columns")) else {
        return Ok(vec![]);
    };
    if columns.is_none() {
        return Ok(vec![]);
    }
    // Literal on both sides: Python `in`, so `1` still finds a `True` key.
    if let (PyValue::Dict(_), Some(members)) = (data, columns.members()) {
        if data.is_literal() && columns.is_literal() {
            let missing = members.iter().any(|column| data.py_contains(column) == Some(false));
            return Ok(if missing { vec![ctx.tag(&["data", "columns"])] } else { vec![] });
        }
    }
    let Some(keys) = ctx.dict_keys("data", data)? else {
        return Ok(vec![]);
    };
    let missing = ctx.members("columns", columns)?.iter().any(|column| !keys.contains(column));
    Ok(if missing { vec![ctx.tag(&["data", "columns"])] } else { vec![] })
}

fn data_dtype(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let Some(dtype) = ctx.get("dtype") else {
        return Ok(vec![]);
    };
    if dtype.is_none() {
        return Ok(vec![]);
    }
    let spelling = match dtype {
        PyValue::Name(n) => n.as_str(),
        PyValue::Str(s) => s.as_str(),
        other => return Err(RuleError::Unresolved { param: "dtype", text: other.to_source() }),
    };
    let requested = TypeFamily::of_dtype(spelling).ok_or_else(|| RuleError::Unexpected {
        param: "dtype",
        detail: format!("unsupported dtype `{spelling}`"),
    })?;

    let request =
        ctx.call_request(&["data", "index", "columns", "dtype", "copy"]).with_cell_types();
    let facts = ctx.describe(request)?;
    let frame = facts.frame.ok_or_else(|| RuleError::Unexpected {
        param: "data",
        detail: format!("DataFrame produced a `{}`", facts.type_name),
    })?;
    let mismatch = frame
        .cell_types
        .iter()
        .any(|column| column.iter().any(|cell| !requested.accepts(TypeFamily::of_cell(cell))));
    Ok(if mismatch { vec![ctx.tag(&["data", "dtype"])] } else { vec![] })
}

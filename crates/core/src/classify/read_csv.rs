//! Rules for `pandas.read_csv`.
//!
//! The first families only look at which parameters were supplied and their
//! literal values. The `filepath-*` families compare the arguments with the
//! file as pandas actually reads it, through two materialised reads:
//!
//! * baseline: the file path plus the parameters that decide how rows are
//!   split into columns (`header`, `sep`, `delimiter`, `delim_whitespace`,
//!   `encoding`, `compression`);
//! * dated: the baseline plus `index_col` and `parse_dates`.

use super::frame::TypeFamily;
use super::{Family, RuleContext, RuleError};
use crate::call::PyValue;
use crate::model::RiskyTag;
use crate::services::materialize::{FrameFacts, Label, MaterializeRequest};

pub(super) static READ_CSV_FAMILIES: &[Family] = &[
    Family { name: "delim-whitespace", check: delim_whitespace },
    Family { name: "sep-delimiter", check: sep_delimiter },
    Family { name: "header", check: header },
    Family { name: "duplicate-values", check: duplicate_values },
    Family { name: "na-filter", check: na_filter },
    Family { name: "parse-dates-inert", check: parse_dates_inert },
    Family { name: "bad-lines", check: bad_lines },
    Family { name: "quoting", check: quoting },
    Family { name: "names-shape", check: names_shape },
    Family { name: "dtype-shape", check: dtype_shape },
    Family { name: "skipfooter", check: skipfooter },
    Family { name: "skiprows-skipfooter", check: skiprows_skipfooter },
    Family { name: "parse-dates-result", check: parse_dates_result },
];

/// Parameters that take one character-like value and are silently ignored
/// when another one is given the same value.
const SINGLE_VALUED: &[&str] = &[
    "lineterminator",
    "escapechar",
    "delimiter",
    "sep",
    "comment",
    "thousands",
    "decimal",
    "quotechar",
];

const LIST_VALUED: &[&str] = &["na_values", "true_values", "false_values"];

const BASELINE_PARAMS: &[&str] =
    &["filepath_or_buffer", "header", "sep", "delimiter", "delim_whitespace", "encoding", "compression"];

const DATE_PARAMS: &[&str] =
    &["infer_datetime_format", "keep_date_col", "date_parser", "dayfirst", "cache_dates"];

/// `csv.QUOTE_NONE`
const QUOTE_NONE: i64 = 3;

fn delim_whitespace(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.truthy("delim_whitespace")? {
        return Ok(vec![]);
    }
    Ok(["sep", "delimiter"]
        .into_iter()
        .filter(|p| ctx.is_supplied(p))
        .map(|p| ctx.tag(&["delim_whitespace", p]))
        .collect())
}

fn sep_delimiter(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if ctx.is_supplied("sep") && ctx.is_supplied("delimiter") {
        Ok(vec![ctx.tag(&["sep", "delimiter"])])
    } else {
        Ok(vec![])
    }
}

fn header(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let mut tags = Vec::new();
    if ctx.is_supplied("names") {
        if ctx.is_supplied("prefix") {
            tags.push(ctx.tag(&["names", "prefix"]));
        }
        if ctx.is_supplied("header") {
            tags.push(ctx.tag(&["names", "header"]));
        }
    }
    let no_header_row = ctx.get("header").is_some_and(PyValue::is_none);
    if !no_header_row && ctx.is_supplied("prefix") {
        tags.push(ctx.tag(&["header", "prefix"]));
    }
    Ok(tags)
}

fn literal<'c>(ctx: &'c RuleContext<'_>, name: &'static str) -> Result<Option<&'c PyValue>, RuleError> {
    match ctx.get(name) {
        Some(v) if !v.is_literal() => {
            Err(RuleError::Unresolved { param: name, text: v.to_source() })
        }
        other => Ok(other),
    }
}

fn literals<'c>(
    ctx: &'c RuleContext<'_>,
    names: &[&'static str],
) -> Result<Vec<(&'static str, Option<&'c PyValue>)>, RuleError> {
    names.iter().map(|&name| literal(ctx, name).map(|value| (name, value))).collect()
}

fn duplicate_values(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let singles = literals(ctx, SINGLE_VALUED)?;
    let lists = literals(ctx, LIST_VALUED)?;

    let mut tags = Vec::new();
    for (i, (a, a_val)) in singles.iter().enumerate() {
        let Some(a_val) = a_val else { continue };
        for (b, b_val) in &singles[i + 1..] {
            if (*a, *b) == ("delimiter", "sep") {
                continue;
            }
            if b_val.is_some_and(|b_val| a_val.py_eq(b_val)) {
                tags.push(ctx.tag(&[*a, *b]));
            }
        }
        for (b, b_val) in &lists {
            let Some(b_val) = b_val else { continue };
            let contained = b_val
                .py_contains(a_val)
                .ok_or(RuleError::Unresolved { param: *b, text: b_val.to_source() })?;
            if contained {
                tags.push(ctx.tag(&[*a, *b]));
            }
        }
    }
    for (i, (a, a_val)) in lists.iter().enumerate() {
        let Some(a_val) = a_val else { continue };
        let members =
            a_val.members().ok_or(RuleError::Unresolved { param: *a, text: a_val.to_source() })?;
        for (b, b_val) in &lists[i + 1..] {
            let Some(b_val) = b_val else { continue };
            if members.iter().any(|m| b_val.py_contains(m) == Some(true)) {
                tags.push(ctx.tag(&[*a, *b]));
            }
        }
    }
    Ok(tags)
}

fn is_false(ctx: &RuleContext<'_>, name: &'static str) -> Result<bool, RuleError> {
    match literal(ctx, name)? {
        Some(v) => Ok(v.py_eq(&PyValue::Bool(false))),
        None => Ok(false),
    }
}

fn na_filter(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !is_false(ctx, "na_filter")? {
        return Ok(vec![]);
    }
    Ok(["na_values", "keep_default_na"]
        .into_iter()
        .filter(|p| ctx.is_supplied(p))
        .map(|p| ctx.tag(&["na_filter", p]))
        .collect())
}

fn parse_dates_inert(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if ctx.is_supplied("parse_dates") && !is_false(ctx, "parse_dates")? {
        return Ok(vec![]);
    }
    Ok(DATE_PARAMS
        .iter()
        .copied()
        .filter(|p| ctx.is_supplied(p))
        .map(|p| ctx.tag(&["parse_dates", p]))
        .collect())
}

fn bad_lines(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.is_supplied("warn_bad_lines") {
        return Ok(vec![]);
    }
    if ctx.truthy("error_bad_lines")? && ctx.truthy("warn_bad_lines")? {
        Ok(vec![ctx.tag(&["error_bad_lines", "warn_bad_lines"])])
    } else {
        Ok(vec![])
    }
}

fn quoting(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let Some(mode) = ctx.get("quoting") else {
        return Ok(vec![]);
    };
    let mode = match mode {
        PyValue::Name(name) => match name.rsplit('.').next() {
            Some("QUOTE_MINIMAL") => 0,
            Some("QUOTE_ALL") => 1,
            Some("QUOTE_NONNUMERIC") => 2,
            Some("QUOTE_NONE") => QUOTE_NONE,
            _ => ctx.number("quoting", mode)? as i64,
        },
        other => ctx.number("quoting", other)? as i64,
    };
    if mode == QUOTE_NONE && ctx.is_supplied("doublequote") {
        Ok(vec![ctx.tag(&["quoting", "doublequote"])])
    } else {
        Ok(vec![])
    }
}

fn baseline(ctx: &RuleContext<'_>) -> Result<FrameFacts, RuleError> {
    let facts = ctx.describe(ctx.call_request(BASELINE_PARAMS))?;
    facts.frame.ok_or_else(|| RuleError::Unexpected {
        param: "filepath_or_buffer",
        detail: format!("read_csv produced a `{}`", facts.type_name),
    })
}

fn column_filter_active(ctx: &RuleContext<'_>) -> bool {
    ctx.is_given("usecols")
}

/// `len(value)`, natively for literals.
fn length(ctx: &RuleContext<'_>, name: &'static str, value: &PyValue) -> Result<usize, RuleError> {
    if let Some(members) = value.members() {
        return Ok(members.len());
    }
    let len = ctx
        .describe(MaterializeRequest::value(format!("len({value})")))?
        .number
        .ok_or(RuleError::Unresolved { param: name, text: value.to_source() })?;
    Ok(len as usize)
}

fn names_shape(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if column_filter_active(ctx) {
        return Ok(vec![]);
    }
    let Some(names) = ctx.get("names") else {
        return Ok(vec![]);
    };
    let expected = length(ctx, "names", names)?;
    let frame = baseline(ctx)?;
    Ok(if frame.columns.len() != expected { vec![ctx.tag(&["filepath", "names"])] } else { vec![] })
}

fn dtype_shape(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if column_filter_active(ctx) {
        return Ok(vec![]);
    }
    let Some(dtype) = ctx.get("dtype") else {
        return Ok(vec![]);
    };
    // A single type for every column names none of them.
    if let PyValue::Name(name) = dtype {
        if TypeFamily::of_dtype(name).is_some() {
            return Ok(vec![]);
        }
    }
    let Some(keys) = ctx.dict_keys("dtype", dtype)? else {
        return Ok(vec![]);
    };
    let frame = baseline(ctx)?;
    let unknown = keys.iter().any(|key| match key {
        Label::Str(name) => frame.column_named(name).is_none(),
        Label::Int(idx) => *idx < 0 || *idx as usize >= frame.columns.len(),
        Label::Other { .. } => false,
    });
    Ok(if unknown { vec![ctx.tag(&["filepath", "dtype"])] } else { vec![] })
}

fn skipfooter(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let Some(footer) = ctx.get("skipfooter") else {
        return Ok(vec![]);
    };
    let footer = ctx.number("skipfooter", footer)?;
    let rows = baseline(ctx)?.rows as f64;
    Ok(if footer > rows { vec![ctx.tag(&["filepath", "skipfooter"])] } else { vec![] })
}

fn skiprows_skipfooter(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let (Some(skiprows), Some(footer)) = (ctx.get("skiprows"), ctx.get("skipfooter")) else {
        return Ok(vec![]);
    };
    if skiprows.as_sequence().is_some() {
        return Err(RuleError::Unexpected {
            param: "skiprows",
            detail: "a row list cannot be added to a footer count".into(),
        });
    }
    let total = ctx.number("skiprows", skiprows)? + ctx.number("skipfooter", footer)?;
    let rows = baseline(ctx)?.rows as f64;
    Ok(if total > rows { vec![ctx.tag(&["filepath", "skiprows", "skipfooter"])] } else { vec![] })
}

fn parse_dates_result(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let Some(parse_dates) = ctx.get("parse_dates") else {
        return Ok(vec![]);
    };
    let dated_params: Vec<&str> =
        BASELINE_PARAMS.iter().copied().chain(["index_col", "parse_dates"]).collect();
    let tag = vec![ctx.tag(&["filepath", "parse_dates"])];

    match parse_dates {
        PyValue::Bool(true) => {
            let dated = ctx.describe(ctx.call_request(&dated_params))?;
            let index_is_datetime = dated.frame.is_some_and(|f| f.index_is_datetime);
            Ok(if index_is_datetime { vec![] } else { tag })
        }
        PyValue::List(selectors) => {
            let base = baseline(ctx)?;
            let facts = ctx.describe(ctx.call_request(&dated_params))?;
            let dated = facts.frame.ok_or_else(|| RuleError::Unexpected {
                param: "parse_dates",
                detail: format!("read_csv produced a `{}`", facts.type_name),
            })?;
            for selector in selectors {
                let name = date_column_name(&base, selector)?;
                let idx = dated.column_named(&name).ok_or_else(|| RuleError::Unexpected {
                    param: "parse_dates",
                    detail: format!("no column `{name}` after parsing"),
                })?;
                if dated.dtypes.get(idx).map(String::as_str) == Some("object") {
                    return Ok(tag);
                }
            }
            Ok(vec![])
        }
        _ => Ok(vec![]),
    }
}

/// Name of the column a `parse_dates` entry produces: the name itself, the
/// baseline column at a position, or positions joined with `_`.
fn date_column_name(base: &FrameFacts, selector: &PyValue) -> Result<String, RuleError> {
    let at = |value: &PyValue| -> Result<String, RuleError> {
        value
            .as_i64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| base.columns.get(i))
            .map(ToString::to_string)
            .ok_or_else(|| RuleError::Unexpected {
                param: "parse_dates",
                detail: format!("no column at {value}"),
            })
    };
    match selector {
        PyValue::Str(name) => Ok(name.clone()),
        PyValue::List(positions) => {
            Ok(positions.iter().map(at).collect::<Result<Vec<_>, _>>()?.join("_"))
        }
        other => at(other),
    }
}

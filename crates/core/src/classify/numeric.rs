//! Rules for the numpy constructors: `zeros`, `array`, `arange`.

use super::frame::TypeFamily;
use super::{Family, RuleContext, RuleError};
use crate::call::PyValue;
use crate::model::RiskyTag;
use crate::services::materialize::MaterializeRequest;

pub(super) static ZEROS_FAMILIES: &[Family] = &[Family { name: "shape-order", check: zeros_order }];

pub(super) static ARRAY_FAMILIES: &[Family] = &[
    Family { name: "object-order", check: array_order },
    Family { name: "copy", check: array_copy },
];

pub(super) static ARANGE_FAMILIES: &[Family] =
    &[Family { name: "start-stop-step", check: arange_direction }];

/// Shape of a literal as numpy would build it, `None` when ragged or opaque.
pub(crate) fn literal_shape(value: &PyValue) -> Option<Vec<usize>> {
    match value {
        PyValue::Name(_) | PyValue::Expr(_) => None,
        PyValue::List(items) | PyValue::Tuple(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let shape = literal_shape(item)?;
                match &inner {
                    Some(existing) if *existing != shape => return None,
                    Some(_) => {}
                    None => inner = Some(shape),
                }
            }
            let mut shape = vec![items.len()];
            shape.extend(inner.unwrap_or_default());
            Some(shape)
        }
        _ => Some(Vec::new()),
    }
}

fn zeros_order(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.is_supplied("order") {
        return Ok(vec![]);
    }
    let Some(shape) = ctx.get("shape") else {
        return Ok(vec![]);
    };
    let ndim = match shape {
        PyValue::Int(_) | PyValue::Bool(_) => 1,
        PyValue::List(items) | PyValue::Tuple(items) => items.len(),
        other => ctx
            .describe(MaterializeRequest::call("numpy", "zeros", [(None, other.to_source())]))?
            .ndim
            .ok_or(RuleError::Unresolved { param: "shape", text: other.to_source() })?,
    };
    Ok(if ndim == 1 { vec![ctx.tag(&["shape", "order"])] } else { vec![] })
}

/// `numpy.array(__object, ...)` with every other supplied parameter, the
/// object bound as a named input so aliasing can be checked.
fn array_request(ctx: &RuleContext<'_>, object: &PyValue) -> MaterializeRequest {
    let mut args = vec![(None, "__object".to_string())];
    args.extend(
        ["dtype", "copy", "order", "subok", "ndmin", "like"]
            .into_iter()
            .filter_map(|name| ctx.get(name).map(|v| (Some(name), v.to_source()))),
    );
    MaterializeRequest::call("numpy", "array", args).with_input("__object", object.to_source())
}

fn array_order(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.is_supplied("order") {
        return Ok(vec![]);
    }
    let Some(object) = ctx.get("object") else {
        return Ok(vec![]);
    };
    let ndmin = ctx.get("ndmin").map_or(Some(0), |v| v.as_i64().map(|n| n.max(0) as usize));
    // A structured dtype turns each inner tuple into one record.
    let scalar_dtype = match ctx.get("dtype") {
        None | Some(PyValue::None) => true,
        Some(PyValue::Name(name)) | Some(PyValue::Str(name)) => TypeFamily::of_dtype(name).is_some(),
        Some(_) => false,
    };
    let ndim = match (literal_shape(object), ndmin) {
        (Some(shape), Some(ndmin)) if scalar_dtype => shape.len().max(ndmin),
        _ => ctx
            .describe(array_request(ctx, object))?
            .ndim
            .ok_or(RuleError::Unresolved { param: "object", text: object.to_source() })?,
    };
    Ok(if ndim == 1 { vec![ctx.tag(&["object", "order"])] } else { vec![] })
}

fn array_copy(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.get("copy").is_some_and(|c| c.py_eq(&PyValue::Bool(false))) {
        return Ok(vec![]);
    }
    let Some(object) = ctx.get("object") else {
        return Ok(vec![]);
    };
    // A literal is converted into fresh storage; it can never be aliased.
    let shared = if object.is_literal() {
        false
    } else {
        ctx.describe(array_request(ctx, object))?
            .shares_memory
            .get("__object")
            .copied()
            .unwrap_or(false)
    };
    Ok(if shared { vec![] } else { vec![ctx.tag(&["copy"])] })
}

fn arange_direction(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    // With a single bound, numpy reads it as `stop`.
    let (start, stop) = match (ctx.get("start"), ctx.get("stop")) {
        (start, Some(stop)) => (start.cloned(), stop.clone()),
        (Some(only), None) => (None, only.clone()),
        (None, None) => return Ok(vec![]),
    };
    let start = match &start {
        Some(v) => ctx.number("start", v)?,
        None => 0.0,
    };
    let stop = ctx.number("stop", &stop)?;
    let step = match ctx.get("step") {
        Some(v) => ctx.number("step", v)?,
        None => 1.0,
    };

    let interval = stop - start;
    if (interval > 0.0 && step < 0.0) || (interval < 0.0 && step > 0.0) {
        Ok(vec![ctx.tag(&["start", "stop", "step"])])
    } else {
        Ok(vec![])
    }
}

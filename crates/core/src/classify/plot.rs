//! Rules for `matplotlib.pyplot.plot`.

use super::{Family, RuleContext, RuleError};
use crate::call::PyValue;
use crate::model::RiskyTag;

pub(super) static PLOT_FAMILIES: &[Family] = &[
    Family { name: "fmt-overlap", check: fmt_overlap },
    Family { name: "linestyle-dashes", check: linestyle_dashes },
    Family { name: "line-style-props", check: line_style_props },
    Family { name: "marker-props", check: marker_props },
    Family { name: "picker-pickradius", check: picker_pickradius },
];

const FMT_MARKERS: &[char] = &[
    '.', ',', 'o', 'v', '^', '<', '>', '1', '2', '3', '4', 's', 'p', '*', 'h', 'H', '+', 'x', 'D',
    'd', '|', '_',
];
const FMT_LINESTYLES: &[&str] = &["-", "--", "-.", ":"];
const FMT_COLORS: &[char] = &['r', 'g', 'b', 'c', 'm', 'y', 'k', 'w'];

const MARKER_PROPS: &[&str] = &[
    "fillstyle",
    "markeredgecolor",
    "markeredgewidth",
    "markerfacecolor",
    "markerfacecoloralt",
    "markersize",
    "markevery",
];

/// What the shorthand format strings of one call specify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FmtSpec {
    pub marker: bool,
    pub linestyle: bool,
    /// A plain `-` token was seen.
    pub solid: bool,
    pub color: bool,
}

/// Scan every string positional for marker, line-style and color tokens.
///
/// A glyph counts as a marker only once a line style has been seen or the
/// string is shorter than three characters. A string that yields neither a
/// marker nor a line style is taken to be a color. Flags accumulate across
/// strings.
pub fn parse_fmt<'a>(args: impl IntoIterator<Item = &'a str>) -> FmtSpec {
    let mut spec = FmtSpec::default();
    for arg in args {
        for style in FMT_LINESTYLES {
            if arg.contains(style) {
                spec.linestyle = true;
                if *style == "-" && !arg.contains("--") && !arg.contains("-.") {
                    spec.solid = true;
                }
            }
        }
        if FMT_MARKERS.iter().any(|m| arg.contains(*m))
            && (spec.linestyle || arg.chars().count() < 3)
        {
            spec.marker = true;
        }
        if FMT_COLORS.iter().any(|c| arg.contains(*c)) || arg.starts_with('#') {
            spec.color = true;
        }
        if !spec.marker && !spec.linestyle {
            spec.color = true;
        }
    }
    spec
}

fn fmt_of(ctx: &RuleContext<'_>) -> FmtSpec {
    parse_fmt(ctx.binding().varargs().iter().filter_map(PyValue::as_str))
}

fn fmt_overlap(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let fmt = fmt_of(ctx);
    let mut tags = Vec::new();
    if fmt.marker && ctx.is_supplied("marker") {
        tags.push(ctx.tag(&["fmt", "marker"]));
    }
    if fmt.linestyle && ctx.is_supplied("linestyle") {
        tags.push(ctx.tag(&["fmt", "linestyle"]));
    }
    if fmt.color && ctx.is_supplied("color") {
        tags.push(ctx.tag(&["fmt", "color"]));
    }
    Ok(tags)
}

fn linestyle_dashes(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if ctx.is_supplied("linestyle") && ctx.is_supplied("dashes") {
        Ok(vec![ctx.tag(&["linestyle", "dashes"])])
    } else {
        Ok(vec![])
    }
}

/// Whether a dash pattern draws a solid line: every gap is zero. Gaps are
/// counted from one, so they sit at the 1st, 3rd, 5th... element.
///
/// This reverses matplotlib's `(on, off, ...)` order. It is the one reading
/// under which both `(1, 0, 1, 0)` and `(1, 1, 1, 0)` stay dashed, so a
/// pattern such as `(5, 0)` also counts as dashed here.
fn dashes_solid(dashes: &PyValue) -> Result<bool, RuleError> {
    let unresolved = || RuleError::Unresolved { param: "dashes", text: dashes.to_source() };
    let items = dashes.as_sequence().ok_or_else(unresolved)?;
    for gap in items.iter().step_by(2) {
        if gap.as_f64().is_none() {
            return Err(unresolved());
        }
        if !gap.py_eq(&PyValue::Int(0)) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn line_style_props(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let fmt = fmt_of(ctx);
    let linestyle = ctx.get("linestyle");
    let dashes = ctx.get("dashes");

    let mut solid = !(fmt.linestyle || linestyle.is_some() || dashes.is_some());
    if fmt.solid || linestyle.and_then(PyValue::as_str) == Some("-") {
        solid = true;
    }
    if let Some(dashes) = dashes {
        solid = dashes_solid(dashes)?;
    }

    let family: [&str; 2] =
        if solid { ["dash_capstyle", "dash_joinstyle"] } else { ["solid_capstyle", "solid_joinstyle"] };
    Ok(family.into_iter().filter(|p| ctx.is_supplied(p)).map(|p| ctx.tag(&["fmt", p])).collect())
}

fn marker_props(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    let no_marker = match ctx.get("marker") {
        None | Some(PyValue::None) => true,
        Some(PyValue::Str(s)) => s.is_empty(),
        Some(_) => false,
    };
    if !no_marker || fmt_of(ctx).marker {
        return Ok(vec![]);
    }
    Ok(MARKER_PROPS
        .iter()
        .copied()
        .filter(|p| ctx.is_supplied(p))
        .map(|p| ctx.tag(&["marker", p]))
        .collect())
}

fn picker_pickradius(ctx: &RuleContext<'_>) -> Result<Vec<RiskyTag>, RuleError> {
    if !ctx.is_supplied("pickradius") {
        return Ok(vec![]);
    }
    let inactive = match ctx.get("picker") {
        None | Some(PyValue::None) => true,
        Some(p) => p.py_eq(&PyValue::Bool(false)),
    };
    Ok(if inactive { vec![ctx.tag(&["picker", "pickradius"])] } else { vec![] })
}

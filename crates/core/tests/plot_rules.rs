mod common;

use common::{classify, offline_tags, skipped_families};
use riskycomb_core::classify::{parse_fmt, FmtSpec};
use riskycomb_core::services::NullMaterializer;

const PLT: &str = "matplotlib.pyplot";

#[test]
fn fmt_string_components() {
    assert_eq!(
        parse_fmt(["go--"]),
        FmtSpec { marker: true, linestyle: true, solid: false, color: true }
    );
    assert_eq!(parse_fmt(["-"]), FmtSpec { linestyle: true, solid: true, ..FmtSpec::default() });
    assert_eq!(parse_fmt(["r"]), FmtSpec { color: true, ..FmtSpec::default() });
    assert_eq!(parse_fmt(["o"]), FmtSpec { marker: true, ..FmtSpec::default() });
    assert_eq!(parse_fmt(["-."]).solid, false);
}

#[test]
fn fmt_string_overlapping_keywords() {
    let tags = offline_tags(PLT, "plot(x, y, 'go--', marker='x', linestyle=':', color='r')");
    assert_eq!(tags, vec!["plot.fmt-marker", "plot.fmt-linestyle", "plot.fmt-color"]);
}

#[test]
fn fmt_overlap_honours_aliases() {
    assert_eq!(offline_tags(PLT, "plot(x, y, 'r', c='b')"), vec!["plot.fmt-color"]);
    assert!(offline_tags(PLT, "plot(x, y, color='b')").is_empty());
}

#[test]
fn linestyle_with_dashes() {
    let tags = offline_tags(PLT, "plot(x, y, linestyle='--', dashes=[2, 2])");
    assert_eq!(tags, vec!["plot.linestyle-dashes"]);
}

#[test]
fn dash_props_on_a_dashed_pattern_are_fine() {
    assert!(offline_tags(PLT, "plot(x, y, dashes=(1, 0, 1, 0), dash_capstyle='round')").is_empty());
    assert!(offline_tags(PLT, "plot(x, y, dashes=(1, 1, 1, 0), dash_capstyle='round')").is_empty());
}

#[test]
fn dash_props_on_a_solid_pattern_tag() {
    assert_eq!(
        offline_tags(PLT, "plot(x, y, dashes=(0, 5, 0, 5), dash_capstyle='round')"),
        vec!["plot.fmt-dash_capstyle"]
    );
    assert_eq!(offline_tags(PLT, "plot(x, y, dash_joinstyle='miter')"), vec!["plot.fmt-dash_joinstyle"]);
    assert_eq!(offline_tags(PLT, "plot(x, y, '-', dash_capstyle='butt')"), vec!["plot.fmt-dash_capstyle"]);
}

#[test]
fn dash_gaps_are_read_from_the_first_element() {
    assert_eq!(
        offline_tags(PLT, "plot(x, y, dashes=(5, 0), solid_capstyle='round')"),
        vec!["plot.fmt-solid_capstyle"]
    );
    assert!(offline_tags(PLT, "plot(x, y, dashes=(0, 5), solid_capstyle='round')").is_empty());
}

#[test]
fn solid_props_on_a_dashed_line_tag() {
    assert_eq!(
        offline_tags(PLT, "plot(x, y, '--', solid_capstyle='round', solid_joinstyle='bevel')"),
        vec!["plot.fmt-solid_capstyle", "plot.fmt-solid_joinstyle"]
    );
    assert!(offline_tags(PLT, "plot(x, y, solid_capstyle='round')").is_empty());
}

#[test]
fn opaque_dash_pattern_skips_the_family() {
    let result = classify(PLT, "plot(x, y, dashes=pattern, dash_capstyle='round')", &NullMaterializer);
    assert!(result.tags.is_empty());
    assert_eq!(skipped_families(&result), vec!["line-style-props"]);
}

#[test]
fn marker_props_without_a_marker() {
    assert_eq!(offline_tags(PLT, "plot(x, y, markersize=4)"), vec!["plot.marker-markersize"]);
    assert_eq!(offline_tags(PLT, "plot(x, y, ms=4)"), vec!["plot.marker-markersize"]);
    assert_eq!(
        offline_tags(PLT, "plot(x, y, marker='', mec='r', fillstyle='none')"),
        vec!["plot.marker-fillstyle", "plot.marker-markeredgecolor"]
    );
}

#[test]
fn marker_props_with_a_marker_are_fine() {
    assert!(offline_tags(PLT, "plot(x, y, 'o', markersize=4)").is_empty());
    assert!(offline_tags(PLT, "plot(x, y, marker='s', markersize=4)").is_empty());
}

#[test]
fn pickradius_without_picker() {
    assert_eq!(offline_tags(PLT, "plot(x, y, pickradius=5)"), vec!["plot.picker-pickradius"]);
    assert_eq!(
        offline_tags(PLT, "plot(x, y, picker=False, pickradius=5)"),
        vec!["plot.picker-pickradius"]
    );
    assert!(offline_tags(PLT, "plot(x, y, picker=True, pickradius=5)").is_empty());
}

#[test]
fn show_has_no_rules() {
    assert!(offline_tags(PLT, "show(block=False)").is_empty());
}

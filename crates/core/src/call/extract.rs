use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::CallRecord;

static CALL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^[A-Za-z_][A-Za-z0-9_]*\s*\(.*\)").expect("valid regex"));

/// Extract the bare call text from one log line.
///
/// A leading `<source-id>: ` annotation is removed first (only when it ends
/// before the first `(`, so colons inside the arguments are left alone). Then
/// everything up to and including the last `.` before the first `(` is
/// stripped, which drops module aliases and attribute chains. Lines without a
/// qualifier are returned unchanged apart from the line terminator.
pub fn extract_call(line: &str) -> CallRecord {
    let line = line.trim_end_matches(['\n', '\r']);
    let call = strip_source_annotation(line);
    let head_end = call.find('(').unwrap_or(call.len());
    let start = call[..head_end].rfind('.').map(|idx| idx + 1).unwrap_or(0);
    CallRecord::new(&call[start..])
}

fn strip_source_annotation(line: &str) -> &str {
    let first_paren = line.find('(').unwrap_or(line.len());
    match line.find(": ") {
        Some(idx) if idx < first_paren => &line[idx + 2..],
        _ => line,
    }
}

/// Quick structural check: does the text start with `identifier(` and contain
/// a closing parenthesis? Lines failing this cannot be calls and are dropped
/// without spawning an evaluator.
pub fn has_call_shape(call: &CallRecord) -> bool {
    CALL_SHAPE.is_match(call.as_str().trim())
}

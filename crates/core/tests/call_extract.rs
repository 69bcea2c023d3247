use riskycomb_core::call::{extract_call, has_call_shape, is_safe};
use riskycomb_core::model::CallRecord;

#[test]
fn strips_module_qualifier_and_line_terminator() {
    let call = extract_call("np.zeros(3, order='F')\n");
    assert_eq!(call.as_str(), "zeros(3, order='F')");
}

#[test]
fn strips_nested_qualifier_up_to_last_dot_before_paren() {
    let call = extract_call("matplotlib.pyplot.plot(x, y, 'go--')\r\n");
    assert_eq!(call.as_str(), "plot(x, y, 'go--')");
}

#[test]
fn dots_inside_arguments_are_kept() {
    let call = extract_call("np.arange(0.5, 2.5, 0.1)");
    assert_eq!(call.as_str(), "arange(0.5, 2.5, 0.1)");
}

#[test]
fn unqualified_line_is_unchanged() {
    let call = extract_call("read_csv('a.csv', sep=';')");
    assert_eq!(call.as_str(), "read_csv('a.csv', sep=';')");
}

#[test]
fn source_annotation_is_removed() {
    let call = extract_call("notebook_17.py: pd.read_csv('a.csv', sep=': ')");
    assert_eq!(call.as_str(), "read_csv('a.csv', sep=': ')");
}

#[test]
fn colon_inside_arguments_is_not_an_annotation() {
    let call = extract_call("DataFrame({'a': [1, 2]})");
    assert_eq!(call.as_str(), "DataFrame({'a': [1, 2]})");
}

#[test]
fn call_shape_accepts_calls_and_rejects_fragments() {
    assert!(has_call_shape(&CallRecord::new("zeros(3)")));
    assert!(has_call_shape(&CallRecord::new("zeros (3)")));
    assert!(!has_call_shape(&CallRecord::new("x = 3")));
    assert!(!has_call_shape(&CallRecord::new("zeros(")));
    assert!(!has_call_shape(&CallRecord::new("(3)")));
}

#[test]
fn interactive_input_is_unsafe() {
    assert!(!is_safe(&CallRecord::new("zeros(int(input('n? ')))")));
    assert!(!is_safe(&CallRecord::new("read_csv(input ('path'))")));
    assert!(is_safe(&CallRecord::new("read_csv('input.csv')")));
    assert!(is_safe(&CallRecord::new("zeros(3)")));
}

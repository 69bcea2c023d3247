use riskycomb_core::call::{parse_call, PyValue};
use riskycomb_core::classify::default_registry;
use riskycomb_core::registry::{self, bind, Arg, ArgumentBinding, BindError, FunctionDescriptor};

fn bound(descriptor: &'static FunctionDescriptor, call: &str) -> Result<ArgumentBinding, BindError> {
    bind(descriptor, &parse_call(call).expect("parse"))
}

#[test]
fn positional_and_keyword_forms_bind_identically() {
    let by_position = bound(&registry::ARANGE, "arange(10, 5, 1)").expect("bind");
    let by_keyword = bound(&registry::ARANGE, "arange(step=1, stop=5, start=10)").expect("bind");
    for name in ["start", "stop", "step"] {
        assert_eq!(by_position.get(name), by_keyword.get(name), "{name}");
    }
}

#[test]
fn omitted_parameters_are_unset_but_have_defaults() {
    let binding = bound(&registry::ZEROS, "zeros(3)").expect("bind");
    assert_eq!(binding.arg("order"), &Arg::Unset);
    assert!(!binding.is_supplied("order"));
    assert_eq!(binding.value_or_default("order"), Some(PyValue::Str("C".into())));
    assert_eq!(binding.value_or_default("like"), Some(PyValue::None));
}

#[test]
fn explicit_none_is_supplied() {
    let binding = bound(&registry::READ_CSV, "read_csv('a.csv', header=None)").expect("bind");
    assert!(binding.is_supplied("header"));
    assert_eq!(binding.get("header"), Some(&PyValue::None));
}

#[test]
fn aliases_bind_to_canonical_parameter() {
    let binding = bound(&registry::PLOT, "plot(x, y, ls='--', c='r')").expect("bind");
    assert!(binding.is_supplied("linestyle"));
    assert!(binding.is_supplied("color"));
    assert_eq!(binding.varargs().len(), 2);
    let names: Vec<&str> = binding.supplied().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["color", "linestyle"]);
}

#[test]
fn keyword_only_parameters_reject_positional_overflow() {
    let err = bound(&registry::ARRAY, "array([1], None, False)").expect_err("too many");
    assert_eq!(err, BindError::TooManyPositional { function: "array", max: 2, given: 3 });
}

#[test]
fn binding_errors_match_python() {
    assert_eq!(
        bound(&registry::ZEROS, "zeros(3, shape=4)").expect_err("duplicate"),
        BindError::Duplicate { function: "zeros", param: "shape" }
    );
    assert_eq!(
        bound(&registry::ZEROS, "zeros(3, colour='F')").expect_err("unknown"),
        BindError::UnexpectedKeyword { function: "zeros", keyword: "colour".into() }
    );
    assert_eq!(
        bound(&registry::ZEROS, "zeros(order='F')").expect_err("missing"),
        BindError::MissingRequired { function: "zeros", param: "shape" }
    );
}

#[test]
fn registry_covers_every_supported_function() {
    let functions = default_registry();
    let mut keys: Vec<(String, String)> =
        functions.keys().map(|(m, f)| (m.to_string(), f.to_string())).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            ("matplotlib.pyplot".to_string(), "plot".to_string()),
            ("matplotlib.pyplot".to_string(), "show".to_string()),
            ("numpy".to_string(), "arange".to_string()),
            ("numpy".to_string(), "array".to_string()),
            ("numpy".to_string(), "zeros".to_string()),
            ("pandas".to_string(), "DataFrame".to_string()),
            ("pandas".to_string(), "read_csv".to_string()),
        ]
    );
    assert!(functions.get("numpy", "ones").is_none());
}

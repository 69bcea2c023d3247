mod common;

use std::collections::BTreeMap;

use common::{classify, offline_tags, skipped_families, tag_names, FnMaterializer};
use riskycomb_core::services::{MaterializeError, NullMaterializer, ValueFacts};

#[test]
fn zeros_order_on_one_dimensional_shape() {
    assert_eq!(offline_tags("numpy", "zeros(3, order='F')"), vec!["zeros.shape-order"]);
    assert_eq!(offline_tags("numpy", "zeros([4], 'int', 'C')"), vec!["zeros.shape-order"]);
}

#[test]
fn zeros_order_on_multi_dimensional_shape_is_fine() {
    assert!(offline_tags("numpy", "zeros((2, 3), order='F')").is_empty());
    assert!(offline_tags("numpy", "zeros(3)").is_empty());
}

#[test]
fn zeros_opaque_shape_asks_the_library() {
    let one_d = FnMaterializer::new(|_| {
        Ok(ValueFacts { type_name: "numpy.ndarray".into(), ndim: Some(1), ..ValueFacts::default() })
    });
    let result = classify("numpy", "zeros(n, order='F')", &one_d);
    assert_eq!(tag_names(&result), vec!["zeros.shape-order"]);
    assert_eq!(one_d.seen.borrow()[0].expression, "numpy.zeros(n)");

    let offline = classify("numpy", "zeros(n, order='F')", &NullMaterializer);
    assert!(offline.tags.is_empty());
    assert_eq!(skipped_families(&offline), vec!["shape-order"]);
}

#[test]
fn arange_with_step_against_interval() {
    for call in ["arange(-5)", "arange(10, 5)", "arange(20, 25, -1)"] {
        assert_eq!(offline_tags("numpy", call), vec!["arange.start-stop-step"], "{call}");
    }
    for call in ["arange(5)", "arange(0, 5, 0.5)", "arange(5, 0, -1)", "arange(3, 3)"] {
        assert!(offline_tags("numpy", call).is_empty(), "{call}");
    }
}

#[test]
fn arange_keyword_order_does_not_matter() {
    assert_eq!(offline_tags("numpy", "arange(stop=5, start=10)"), vec!["arange.start-stop-step"]);
    assert_eq!(
        offline_tags("numpy", "arange(step=-1, start=20, stop=25)"),
        vec!["arange.start-stop-step"]
    );
    assert!(offline_tags("numpy", "arange(step=0.5, stop=5, start=0)").is_empty());
}

#[test]
fn arange_resolves_opaque_bounds_through_the_library() {
    let numbers = FnMaterializer::new(|request| match request.expression.as_str() {
        "n" => Ok(ValueFacts { type_name: "int".into(), number: Some(-3.0), ..ValueFacts::default() }),
        other => Err(MaterializeError::Raised(format!("NameError: {other}"))),
    });
    let result = classify("numpy", "arange(n)", &numbers);
    assert_eq!(tag_names(&result), vec!["arange.start-stop-step"]);
}

#[test]
fn array_order_on_flat_object() {
    assert_eq!(offline_tags("numpy", "array([1, 2, 3], order=\"F\")"), vec!["array.object-order"]);
    assert!(offline_tags("numpy", "array([[1, 2], [3, 4]], order='F')").is_empty());
    assert!(offline_tags("numpy", "array([1, 2, 3], order='F', ndmin=2)").is_empty());
}

#[test]
fn array_order_with_scalar_dtype_stays_offline() {
    assert!(offline_tags("numpy", "array([[1, 2], [3, 4]], dtype=float, order='F')").is_empty());
    assert_eq!(
        offline_tags("numpy", "array([1, 2], dtype='int32', order='F')"),
        vec!["array.object-order"]
    );
}

#[test]
fn array_order_with_record_dtype_asks_the_library() {
    let call = "array([(1, 2), (3, 4)], dtype=[('a', 'i4'), ('b', 'i4')], order='F')";
    let records = FnMaterializer::new(|_| {
        Ok(ValueFacts { type_name: "numpy.ndarray".into(), ndim: Some(1), ..ValueFacts::default() })
    });
    assert_eq!(tag_names(&classify("numpy", call, &records)), vec!["array.object-order"]);
    assert_eq!(
        records.seen.borrow()[0].expression,
        "numpy.array(__object, dtype=[('a', 'i4'), ('b', 'i4')], order='F')"
    );

    let offline = classify("numpy", call, &NullMaterializer);
    assert!(offline.tags.is_empty());
    assert_eq!(skipped_families(&offline), vec!["object-order"]);
}

#[test]
fn array_copy_false_on_literal_always_copies() {
    assert_eq!(offline_tags("numpy", "array([1, 2, 3], copy=False)"), vec!["array.copy"]);
    assert!(offline_tags("numpy", "array([1, 2, 3], copy=True)").is_empty());
}

#[test]
fn array_order_and_copy_together_keep_rule_order() {
    assert_eq!(
        offline_tags("numpy", "array([1, 2, 3], copy=False, order='F')"),
        vec!["array.object-order", "array.copy"]
    );
}

#[test]
fn array_copy_false_on_shared_object_is_fine() {
    let shared = FnMaterializer::new(|_| {
        Ok(ValueFacts {
            type_name: "numpy.ndarray".into(),
            ndim: Some(1),
            shares_memory: BTreeMap::from([("__object".to_string(), true)]),
            ..ValueFacts::default()
        })
    });
    let result = classify("numpy", "array(a, copy=False)", &shared);
    assert!(result.tags.is_empty());
    let seen = shared.seen.borrow();
    assert_eq!(seen[0].expression, "numpy.array(__object, copy=False)");
    assert_eq!(seen[0].inputs, vec![("__object".to_string(), "a".to_string())]);
}

#[test]
fn array_copy_false_on_converted_object_tags() {
    let converted = FnMaterializer::new(|_| {
        Ok(ValueFacts {
            type_name: "numpy.ndarray".into(),
            ndim: Some(1),
            shares_memory: BTreeMap::from([("__object".to_string(), false)]),
            ..ValueFacts::default()
        })
    });
    let result = classify("numpy", "array(values, copy=False)", &converted);
    assert_eq!(tag_names(&result), vec!["array.copy"]);
}

#![allow(dead_code)]

use std::cell::RefCell;

use riskycomb_core::classify::{default_registry, Classification};
use riskycomb_core::model::CallRecord;
use riskycomb_core::services::{
    classify_call, FrameFacts, Label, MaterializeError, MaterializeRequest, Materializer,
    NullMaterializer, ValueFacts,
};

/// Answers materialize requests from a closure and remembers what it was asked.
pub struct FnMaterializer<F> {
    answer: F,
    pub seen: RefCell<Vec<MaterializeRequest>>,
}

impl<F> FnMaterializer<F>
where
    F: Fn(&MaterializeRequest) -> Result<ValueFacts, MaterializeError>,
{
    pub fn new(answer: F) -> Self {
        Self { answer, seen: RefCell::new(Vec::new()) }
    }
}

impl<F> Materializer for FnMaterializer<F>
where
    F: Fn(&MaterializeRequest) -> Result<ValueFacts, MaterializeError>,
{
    fn describe(&self, request: &MaterializeRequest) -> Result<ValueFacts, MaterializeError> {
        self.seen.borrow_mut().push(request.clone());
        (self.answer)(request)
    }
}

pub fn classify(module: &str, call: &str, materializer: &dyn Materializer) -> Classification {
    classify_call(&default_registry(), module, &CallRecord::new(call), materializer)
        .expect("call should classify")
}

pub fn offline_tags(module: &str, call: &str) -> Vec<String> {
    tag_names(&classify(module, call, &NullMaterializer))
}

pub fn tag_names(classification: &Classification) -> Vec<String> {
    classification.tags.iter().map(|t| t.as_str().to_string()).collect()
}

pub fn skipped_families(classification: &Classification) -> Vec<&'static str> {
    classification.skipped.iter().map(|s| s.family).collect()
}

/// Facts for a table with string column labels and uniform cell types.
pub fn frame(columns: &[&str], rows: usize) -> ValueFacts {
    ValueFacts {
        type_name: "pandas.core.frame.DataFrame".into(),
        ndim: Some(2),
        frame: Some(FrameFacts {
            columns: columns.iter().map(|c| Label::Str(c.to_string())).collect(),
            rows,
            dtypes: vec!["int64".into(); columns.len()],
            cell_types: vec![vec!["int".into()]; columns.len()],
            ..FrameFacts::default()
        }),
        ..ValueFacts::default()
    }
}

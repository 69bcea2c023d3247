use std::fs;
use std::io::Cursor;
use std::time::Duration;

use riskycomb_core::classify::default_registry;
use riskycomb_core::model::{CallRecord, EvaluationOutcome, RunSummary, TargetFunction};
use riskycomb_core::report::{ReportSink, RunTag};
use riskycomb_core::services::{Evaluation, Evaluator, NullMaterializer, Pipeline, PipelineError};
use tempfile::tempdir;

/// Fails calls naming `undefined`, times out calls naming `forever`.
struct ScriptedEvaluator;

impl Evaluator for ScriptedEvaluator {
    fn evaluate(&self, _target: &TargetFunction, call: &CallRecord) -> Evaluation {
        if call.as_str().contains("undefined") {
            Evaluation::Failed { reason: "NameError: name 'undefined' is not defined".into() }
        } else if call.as_str().contains("forever") {
            Evaluation::TimedOut { budget: Duration::from_secs(1) }
        } else {
            Evaluation::Succeeded
        }
    }
}

fn zeros() -> TargetFunction {
    TargetFunction::new("numpy", "zeros")
}

#[test]
fn only_executable_calls_reach_the_executable_log() {
    let dir = tempdir().expect("tempdir");
    let functions = default_registry();
    let pipeline =
        Pipeline::new(zeros(), &functions, &ScriptedEvaluator, &NullMaterializer).expect("pipeline");
    let mut sink = ReportSink::create(dir.path(), "zeros", RunTag::None).expect("sink");

    let input = "np.zeros((2, 3))\nnp.zeros(int(input('n')))\nnp.zeros(undefined)\n\n";
    let summary = pipeline.run(Cursor::new(input), &mut sink).expect("run");

    assert_eq!(
        summary,
        RunSummary { lines: 3, unsafe_calls: 1, not_executable: 1, executable: 1, ..RunSummary::default() }
    );
    assert_eq!(fs::read_to_string(sink.executable_path()).expect("read"), "zeros((2, 3))\n");
    let files: Vec<_> = fs::read_dir(dir.path()).expect("list").collect();
    assert_eq!(files.len(), 1, "no tag or timeout logs expected");
}

#[test]
fn tags_and_timeouts_are_recorded() {
    let dir = tempdir().expect("tempdir");
    let functions = default_registry();
    let pipeline =
        Pipeline::new(zeros(), &functions, &ScriptedEvaluator, &NullMaterializer).expect("pipeline");
    let mut sink = ReportSink::create(dir.path(), "zeros", RunTag::None).expect("sink");

    let input = "nb.py: np.zeros(3, order='F')\nnp.zeros(forever)\nnp.zeros(4, order='C')\n";
    let summary = pipeline.run(Cursor::new(input), &mut sink).expect("run");

    assert_eq!(summary.executable, 2);
    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.tags.get("zeros.shape-order"), Some(&2));
    assert_eq!(
        fs::read_to_string(dir.path().join("zeros.shape-order.csv")).expect("read"),
        "zeros(3, order='F')\nzeros(4, order='C')\n"
    );
    assert_eq!(fs::read_to_string(sink.timed_out_path()).expect("read"), "zeros(forever)\n");
}

#[test]
fn process_line_reports_each_outcome() {
    let dir = tempdir().expect("tempdir");
    let functions = default_registry();
    let pipeline =
        Pipeline::new(zeros(), &functions, &ScriptedEvaluator, &NullMaterializer).expect("pipeline");
    let mut sink = ReportSink::create(dir.path(), "zeros", RunTag::None).expect("sink");
    let mut summary = RunSummary::default();

    let mut outcome = |line: &str| pipeline.process_line(line, &mut sink, &mut summary).expect("line");
    assert_eq!(outcome("   \n"), None);
    assert_eq!(outcome("zeros(input())"), None);
    assert_eq!(outcome("not a call"), Some(EvaluationOutcome::NotExecutable));
    assert_eq!(outcome("zeros(undefined)"), Some(EvaluationOutcome::NotExecutable));
    assert_eq!(outcome("zeros(forever)"), Some(EvaluationOutcome::TimedOut));
    match outcome("zeros(3, order='F')") {
        Some(EvaluationOutcome::Executable { tags }) => assert_eq!(tags, vec!["zeros.shape-order"]),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(summary.lines, 5);
}

#[test]
fn executable_but_unbindable_calls_are_counted() {
    let dir = tempdir().expect("tempdir");
    let functions = default_registry();
    let pipeline =
        Pipeline::new(zeros(), &functions, &ScriptedEvaluator, &NullMaterializer).expect("pipeline");
    let mut sink = ReportSink::create(dir.path(), "zeros", RunTag::None).expect("sink");

    let summary = pipeline.run(Cursor::new("np.zeros(*dims)\n"), &mut sink).expect("run");
    assert_eq!(summary.executable, 1);
    assert_eq!(summary.unclassified, 1);
    assert!(summary.tags.is_empty());
}

#[test]
fn unregistered_target_is_rejected() {
    let functions = default_registry();
    let err = Pipeline::new(
        TargetFunction::new("numpy", "ones"),
        &functions,
        &ScriptedEvaluator,
        &NullMaterializer,
    )
    .err()
    .expect("unknown function");
    assert!(matches!(err, PipelineError::UnknownFunction(t) if t.function == "ones"));
}

#[test]
fn target_is_read_from_input_file_names() {
    let target = TargetFunction::from_input_path("logs/pandas.read_csv-part1.txt".as_ref());
    assert_eq!(target, Some(TargetFunction::new("pandas", "read_csv")));
    let target = TargetFunction::from_input_path("matplotlib.pyplot.plot-all".as_ref());
    assert_eq!(target, Some(TargetFunction::new("matplotlib.pyplot", "plot")));
    assert_eq!(TargetFunction::from_input_path("zeros-calls".as_ref()), None);
}

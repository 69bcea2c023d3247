use std::fs;
use std::path::{Path, PathBuf};

use riskycomb::{resolve_config, resolve_target, ConfigOverrides};
use riskycomb_core::model::TargetFunction;
use tempfile::tempdir;

#[test]
fn target_from_file_name() {
    let target = resolve_target(Path::new("logs/numpy.arange-2024.txt"), None, None).expect("target");
    assert_eq!(target, TargetFunction::new("numpy", "arange"));
}

#[test]
fn explicit_flags_override_file_name() {
    let target = resolve_target(
        Path::new("numpy.arange-2024.txt"),
        None,
        Some("zeros".to_string()),
    )
    .expect("target");
    assert_eq!(target, TargetFunction::new("numpy", "zeros"));

    let target =
        resolve_target(Path::new("calls"), Some("pandas".into()), Some("DataFrame".into())).expect("target");
    assert_eq!(target, TargetFunction::new("pandas", "DataFrame"));
}

#[test]
fn target_without_any_hint_is_an_error() {
    assert!(resolve_target(Path::new("calls"), Some("numpy".into()), None).is_err());
}

#[test]
fn flags_win_over_config_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("riskycomb.json");
    fs::write(&path, r#"{ "python": "/from/config", "timeout_secs": 7, "timestamped_outputs": true }"#)
        .expect("write");

    let from_file = resolve_config(&ConfigOverrides { config: Some(path.clone()), ..Default::default() })
        .expect("config");
    assert_eq!(from_file.timeout_secs, 7);
    assert!(from_file.timestamped_outputs);

    let overridden = resolve_config(&ConfigOverrides {
        config: Some(path),
        python: Some(PathBuf::from("/from/flag")),
        timeout_secs: Some(3),
        working_dir: Some(PathBuf::from("/work")),
        no_timestamp: true,
    })
    .expect("config");
    assert_eq!(overridden.python, PathBuf::from("/from/flag"));
    assert_eq!(overridden.timeout_secs, 3);
    assert_eq!(overridden.working_dir, Some(PathBuf::from("/work")));
    assert!(!overridden.timestamped_outputs);
}

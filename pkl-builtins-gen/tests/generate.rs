//! End-to-end tests for the generation passes against a fake `pkl` tool.
#![cfg(unix)]

mod common;

use common::FakeProject;
use pkl_builtins_gen::aggregator::HEADER;
use pkl_builtins_gen::metadata::SkipReason;
use pkl_builtins_gen::{GenError, MetadataEntry, generate, load_metadata};
use rstest::{fixture, rstest};
use serde_json::json;
use serial_test::serial;

#[fixture]
fn project() -> FakeProject {
    let project = FakeProject::new();
    project.add_builtin(
        "ruff.pkl",
        "ruff",
        &json!([{ "category": "Python", "description": "Lint Python" }]),
    );
    project.add_builtin(
        "node-js.pkl",
        "node_js",
        &json!([{
            "category": "JavaScript/TypeScript",
            "project_indicators": [{ "file": "package.json" }, { "glob": "*.js" }]
        }]),
    );
    project.add_builtin("black.pkl", "black", &json!([]));
    project
}

#[rstest]
#[serial]
fn aggregator_binds_fragments_in_filename_order(project: FakeProject) {
    let report = generate(&project.config()).expect("generate");

    let expected = format!(
        "{HEADER}{}",
        concat!(
            "black = Builtins[\"builtins/black.pkl\"].black\n",
            "node_js = Builtins[\"builtins/node-js.pkl\"].node_js\n",
            "ruff = Builtins[\"builtins/ruff.pkl\"].ruff\n",
        )
    );
    assert_eq!(project.read("pkl/Builtins.pkl"), expected);
    assert_eq!(report.aggregator_path, project.root().join("pkl/Builtins.pkl"));
    assert_eq!(report.fragments.len(), 3);
}

#[rstest]
#[serial]
fn formatter_runs_before_reflection(project: FakeProject) {
    generate(&project.config()).expect("generate despite formatter exit 11");

    let calls = project.calls();
    let uri = format!("file://{}/scripts/reflect.pkl", project.root());
    let eval = |name: &str| {
        format!("eval pkl/builtins/{name} --format json -x import(\"{uri}\").render(module)")
    };
    assert_eq!(
        calls,
        [
            "format --write pkl/Builtins.pkl".to_owned(),
            eval("black.pkl"),
            eval("node-js.pkl"),
            eval("ruff.pkl"),
        ]
    );
}

#[rstest]
#[serial]
fn metadata_lists_entries_in_fragment_order(project: FakeProject) {
    let report = generate(&project.config()).expect("generate");

    let entries = load_metadata(&report.metadata_path).expect("load metadata");
    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, ["black", "node_js", "ruff"]);
    assert_eq!(
        entries.first(),
        Some(&MetadataEntry {
            name: "black".to_owned(),
            ..MetadataEntry::default()
        })
    );
    assert_eq!(entries[1].project_indicators.len(), 2);
    assert_eq!(entries[2].description, "Lint Python");

    let raw = project.read("pkl/builtins_meta.json");
    assert!(
        raw.starts_with(
            r#"[{"name": "black", "category": "", "description": "", "project_indicators": []}, "#
        ),
        "unexpected sidecar layout: {raw}"
    );
    assert!(raw.contains(r#""project_indicators": [{"file": "package.json"}, {"glob": "*.js"}]"#));
    assert!(raw.ends_with("]\n"), "sidecar should end with a newline");
    assert_eq!(raw.lines().count(), 1, "sidecar should be a single line");
    assert_eq!(report.entries, 3);
    assert!(report.skipped.is_empty());
}

#[rstest]
#[serial]
fn failing_fragment_is_left_out(project: FakeProject) {
    project.fail_reflection("node-js.pkl", 1);

    let report = generate(&project.config()).expect("generate");

    let raw = project.read("pkl/builtins_meta.json");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("sidecar is valid JSON");
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].fragment.file_name, "node-js.pkl");
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::NonZeroExit { code: Some(1), .. }
    ));
    assert!(project.read("pkl/Builtins.pkl").contains("node_js = "));
}

#[rstest]
#[serial]
fn unusable_reflection_output_is_left_out(project: FakeProject) {
    project.add_fragment("broken.pkl", "this is not json");
    project.add_fragment("empty.pkl", r#"{"moduleClass":{"properties":{}}}"#);
    project.add_fragment("other.pkl", r#"{"something":"else"}"#);

    let report = generate(&project.config()).expect("generate");

    let names: Vec<String> = load_metadata(&report.metadata_path)
        .expect("load metadata")
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["black", "node_js", "ruff"]);
    let reasons: Vec<&SkipReason> = report.skipped.iter().map(|skip| &skip.reason).collect();
    assert!(matches!(reasons[0], SkipReason::InvalidJson(_)));
    assert_eq!(reasons[1], &SkipReason::NoProperties);
    assert_eq!(reasons[2], &SkipReason::MissingProperties);
}

#[rstest]
#[serial]
fn stalled_reflection_times_out(project: FakeProject) {
    project.stall_reflection("ruff.pkl", 30);
    let config = pkl_builtins_gen::GenConfig {
        timeout_secs: 1,
        ..project.config()
    };

    let start = std::time::Instant::now();
    let report = generate(&config).expect("generate");

    assert!(start.elapsed() < std::time::Duration::from_secs(20));
    assert_eq!(report.entries, 2);
    assert!(matches!(report.skipped[0].reason, SkipReason::Timeout(_)));
}

#[rstest]
#[serial]
fn empty_fragment_directory_yields_header_and_empty_list() {
    let project = FakeProject::new();

    let report = generate(&project.config()).expect("generate");

    assert_eq!(project.read("pkl/Builtins.pkl"), HEADER);
    assert_eq!(project.read("pkl/builtins_meta.json"), "[]\n");
    assert!(report.fragments.is_empty());
}

#[rstest]
#[serial]
fn rerun_is_byte_identical(project: FakeProject) {
    generate(&project.config()).expect("first run");
    let aggregator = project.read("pkl/Builtins.pkl");
    let metadata = project.read("pkl/builtins_meta.json");

    generate(&project.config()).expect("second run");

    assert_eq!(project.read("pkl/Builtins.pkl"), aggregator);
    assert_eq!(project.read("pkl/builtins_meta.json"), metadata);
    let leftovers: Vec<String> = std::fs::read_dir(project.root().join("pkl"))
        .expect("read pkl dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[rstest]
#[serial]
fn missing_fragment_directory_aborts() {
    let project = FakeProject::new();
    std::fs::remove_dir(project.root().join("pkl/builtins")).expect("remove builtins dir");

    let err = generate(&project.config()).expect_err("generation should fail");

    assert!(matches!(err, GenError::Io { .. }), "unexpected error: {err}");
    assert!(project.calls().is_empty());
}

#[rstest]
#[serial]
fn missing_formatter_aborts_before_metadata(project: FakeProject) {
    let config = pkl_builtins_gen::GenConfig {
        pkl: project.root().join("bin/no-such-pkl").into_string(),
        ..project.config()
    };

    let err = generate(&config).expect_err("generation should fail");

    assert!(matches!(err, GenError::Spawn { .. }), "unexpected error: {err}");
    assert!(project.root().join("pkl/Builtins.pkl").exists());
    assert!(!project.root().join("pkl/builtins_meta.json").exists());
}

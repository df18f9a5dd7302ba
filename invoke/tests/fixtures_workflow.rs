use std::fs;
use std::path::{Path, PathBuf};

use sigplot_core::{ParameterSchema, RecordGraph, UnitSystem};
use sigplot_invoke::{
    BoundingBox, PlotRun, ProcessRunner, RunState, Synthesizer, ToolConfig, WorkflowError,
};

#[test]
fn test_fixture_graph_synthesizes_both_vectors() {
    let graph = load_graph("ridge-p2p.yaml");
    let schema = ParameterSchema::signalserver();
    let config = ToolConfig::new("signalserver", "/srv/ant");

    let vectors = Synthesizer::new(&schema, &config)
        .synthesize(&graph)
        .expect("fixture graph should synthesize");

    assert_eq!(
        vectors.primary,
        [
            "-dbm", "-erp", "25", "-f", "446", "-R", "25", "-res", "600", "-pm", "1", "-cl", "5",
            "-rel", "90", "-ant", "/srv/ant/yagi/y9.ant", "-lat", "51.849", "-lon", "-0.944",
            "-txh", "30",
        ]
    );
    assert_eq!(
        vectors.p2p,
        ["-rxg", "2.1", "-rxh", "10", "-rla", "51.839", "-rlo", "-1.424"]
    );
}

#[cfg(unix)]
#[test]
fn test_two_pass_run_against_stand_in_tool() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = fixture_text("fake-signalserver.sh").replace(
        "@REPORT@",
        &fixture_path("ridge-p2p.txt").display().to_string(),
    );
    let tool = dir.path().join("signalserver");
    fs::write(&tool, script).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = ToolConfig::new(&tool, dir.path().join("ant"));
    config.output_dir = dir.path().join("out");
    let graph = load_graph("ridge-p2p.yaml");
    let schema = ParameterSchema::signalserver();
    let runner = ProcessRunner::new(config.timeout());

    let outcome = PlotRun::new(&schema, &config, &graph, runner)
        .unwrap()
        .execute()
        .expect("both passes should succeed");

    assert_eq!(
        outcome.bbox,
        BoundingBox {
            north: 52.2,
            east: -0.54,
            south: 51.49,
            west: -1.82,
        }
    );
    let report = outcome.report.expect("p2p report should be decoded");
    assert_eq!(report.units(), UnitSystem::Imperial);
    assert_eq!(report.link().computed_path_loss, 141.88);

    let args = fs::read_to_string(config.output_dir.join("ridge-p2p.args")).unwrap();
    let passes: Vec<&str> = args.lines().collect();
    assert_eq!(passes.len(), 2);
    assert!(!passes[0].contains("-rla"));
    assert!(passes[1].starts_with(passes[0]));
    assert!(passes[1].ends_with("-rlo -1.424 -ng"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["transmitter"]["height"], 30.0);

    assert_eq!(outcome.report_json, Some(config.output_dir.join("ridge-p2p.json")));
    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.output_dir.join("ridge-p2p.json")).unwrap())
            .unwrap();
    assert_eq!(stored["link"]["computed_path_loss"], 141.88);
}

#[test]
fn test_missing_tool_fails_area_pass() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ToolConfig::new(dir.path().join("no-such-tool"), dir.path());
    config.output_dir = dir.path().join("out");
    let graph = load_graph("ridge-p2p.yaml");
    let schema = ParameterSchema::signalserver();

    let mut run = PlotRun::new(&schema, &config, &graph, ProcessRunner::new(config.timeout()))
        .unwrap();
    let err = run.run_area().unwrap_err();
    assert!(matches!(err, WorkflowError::Tool(_)));
    assert!(matches!(run.state(), RunState::Failed { last_bbox: None, .. }));
}

fn load_graph(name: &str) -> RecordGraph {
    serde_yaml::from_str(&fixture_text(name)).expect("fixture graph must parse")
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file must be readable")
}

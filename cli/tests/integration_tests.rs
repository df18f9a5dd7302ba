use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sigplot(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sigplot"))
        .args(args)
        .output()
        .expect("failed to run sigplot")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn strings(value: &serde_json::Value) -> Vec<&str> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_str().expect("expected a string"))
        .collect()
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

#[test]
fn schema_prints_builtin_table_as_json() {
    let output = sigplot(&["schema"]);
    assert!(output.status.success());
    let schema = stdout_json(&output);
    assert_eq!(schema["global"][0]["flag"], "-t");
    let station = schema["station"].as_array().unwrap();
    let hp = station
        .iter()
        .find(|spec| spec["name"] == "polarization")
        .expect("polarization spec");
    assert_eq!(hp["emission"]["when_equals"], "horizontal");
}

#[test]
fn schema_prints_yaml() {
    let output = sigplot(&["schema", "--format", "yaml"]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("name: rx_height"));
}

// ---------------------------------------------------------------------------
// args
// ---------------------------------------------------------------------------

#[test]
fn args_synthesizes_primary_and_p2p_vectors() {
    let plot = fixture("ridge-plot.yaml");
    let config = fixture("sigplot.yaml");
    let output = sigplot(&[
        "args",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let vectors = stdout_json(&output);
    let primary = strings(&vectors["primary"]);
    assert_eq!(primary[..6], ["-t", "-sdf", "/opt/signalserver/sdf", "-dbm", "-erp", "25"]);
    assert!(!primary.contains(&"-haf"));
    assert!(primary.contains(&"/opt/signalserver/antenna_profiles/yagi/y9.ant"));
    assert_eq!(
        strings(&vectors["p2p"]),
        ["-rxg", "2.1", "-rxh", "10", "-rla", "51.839", "-rlo", "-1.424"]
    );
}

#[test]
fn args_omit_unset_policy_keeps_zero() {
    let plot = fixture("ridge-plot.yaml");
    let config = fixture("sigplot.yaml");
    let output = sigplot(&[
        "args",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--policy",
        "omit-unset",
    ]);
    assert!(output.status.success());
    let vectors = stdout_json(&output);
    let primary = strings(&vectors["primary"]);
    let haf = primary.iter().position(|a| *a == "-haf").expect("-haf emitted");
    assert_eq!(primary[haf + 1], "0");
}

#[test]
fn args_rejects_graph_without_antenna() {
    let dir = tempfile::tempdir().unwrap();
    let plot = dir.path().join("bare.yaml");
    fs::write(
        &plot,
        "plot:\n  name: bare\n  frequency: 446.0\nstation1:\n  name: Tx\n",
    )
    .unwrap();
    let config = fixture("sigplot.yaml");
    let output = sigplot(&[
        "args",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to synthesize arguments"));
    assert!(stderr.contains("antenna"));
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

#[test]
fn decode_prints_text_report() {
    let report = fixture("ridge-report.txt");
    let output = sigplot(&["decode", report.to_str().unwrap()]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.starts_with("Analysis Report:"));
    assert!(text.contains("Computed path loss: 141.88 dB"));
}

#[test]
fn decode_multiple_reports_as_json_keeps_input_order() {
    let ridge = fixture("ridge-report.txt");
    let harbour = fixture("harbour-report.txt");
    let output = sigplot(&[
        "decode",
        ridge.to_str().unwrap(),
        harbour.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let ridge_at = text.find("ridge-report.txt").unwrap();
    let harbour_at = text.find("harbour-report.txt").unwrap();
    assert!(ridge_at < harbour_at);
    assert!(text.contains("\"computed_path_loss\": 141.88"));
}

#[test]
fn decode_write_json_writes_beside_input() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("harbour.txt");
    fs::copy(fixture("harbour-report.txt"), &report).unwrap();

    let output = sigplot(&["decode", report.to_str().unwrap(), "--write-json"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("harbour.json")).unwrap())
            .unwrap();
    assert_eq!(json["model"]["polarization"], "horizontal");
    assert_eq!(json["link"]["obstructions"].as_array().map(Vec::len), Some(0));
}

#[test]
fn decode_reports_failures_and_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.txt");
    fs::write(&broken, "Transmitter site: Tx\nSite location: 51.8490, -0.9440\n").unwrap();
    let good = fixture("ridge-report.txt");

    let output = sigplot(&[
        "decode",
        good.to_str().unwrap(),
        broken.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.txt"));
    assert!(stderr.contains("1 of 2 report(s) failed to decode"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Analysis Report:"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_with_missing_tool_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sigplot.yaml");
    fs::write(
        &config,
        format!(
            "path: {}\nantenna_profiles_dir: {}\n",
            dir.path().join("no-such-signalserver").display(),
            dir.path().display()
        ),
    )
    .unwrap();
    let plot = fixture("ridge-plot.yaml");
    let out = dir.path().join("out");

    let output = sigplot(&[
        "run",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Plot 'ridge-p2p' failed"));
    assert!(out.is_dir());
}

#[test]
fn missing_config_is_reported() {
    let plot = fixture("ridge-plot.yaml");
    let output = sigplot(&[
        "args",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        "/nonexistent/sigplot.yaml",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}

#[cfg(unix)]
#[test]
fn run_reports_area_extent_when_second_pass_fails() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let tool = dir.path().join("signalserver");
    fs::write(
        &tool,
        "#!/bin/sh\n\
         for arg in \"$@\"; do\n\
         \x20 if [ \"$arg\" = \"-rla\" ]; then echo 'receiver out of range' >&2; exit 3; fi\n\
         done\n\
         echo '|52.20|-0.54|51.49|-1.82|'\n",
    )
    .unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let config = dir.path().join("sigplot.yaml");
    fs::write(
        &config,
        format!(
            "path: {}\nantenna_profiles_dir: {}\n",
            tool.display(),
            dir.path().display()
        ),
    )
    .unwrap();
    let plot = fixture("ridge-plot.yaml");
    let out = dir.path().join("out");

    let output = sigplot(&[
        "run",
        "--plot",
        plot.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("receiver out of range"));
    assert!(stderr.contains("extent N 52.2 E -0.54 S 51.49 W -1.82"));
}

//! End-to-end tests for the `spriterig` binary.
//!
//! Every command here runs without Blender: dry runs drive the in-memory
//! scene host.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spriterig-tests --test cli_e2e
//! ```

use pretty_assertions::assert_eq;

use spriterig_tests::{ProjectFixture, TestHarness};

#[test]
fn directions_json() {
    let harness = TestHarness::new();
    let result = harness.run_cli(&["directions", "-n", "4", "--json"]);
    result.assert_success();

    let output = result.json();
    assert_eq!(output["count"], 4);
    assert_eq!(output["angles"], serde_json::json!([0.0, 90.0, 180.0, 270.0]));
}

#[test]
fn directions_rejects_non_positive() {
    let harness = TestHarness::new();
    let result = harness.run_cli(&["directions", "-n", "-3"]);
    result.assert_failure();
    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("direction count must be a positive integer"));
}

#[test]
fn validate_reference_project() {
    let harness = TestHarness::new();
    let fixture = ProjectFixture::reference();
    let result = harness.run_cli(&["validate", "--project", &fixture.project_arg(), "--json"]);
    result.assert_success();

    let output = result.json();
    assert_eq!(output["ok"], true);
    assert_eq!(output["job_count"], (16 * 4 + 1 + 16) * 8);
}

#[test]
fn validate_reports_coded_errors() {
    let harness = TestHarness::new();
    let fixture = ProjectFixture::new(
        r#"{ "characters": [
            { "id": "Archer!", "animations": [
                { "export_name": "walk", "action": "walk", "frame_count": 0 } ] } ] }"#,
    );
    let result = harness.run_cli(&["validate", "--project", &fixture.project_arg(), "--json"]);
    assert_eq!(result.exit_code, 1);

    let output = result.json();
    let codes: Vec<&str> = output["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"E004"), "codes: {:?}", codes);
    assert!(codes.contains(&"E014"), "codes: {:?}", codes);
}

#[test]
fn plan_lists_first_jobs() {
    let harness = TestHarness::new();
    let fixture = ProjectFixture::reference();
    let result = harness.run_cli(&[
        "plan",
        "--project",
        &fixture.project_arg(),
        "--limit",
        "3",
        "--json",
    ]);
    result.assert_success();

    let output = result.json();
    assert_eq!(output["truncated"], true);
    let paths: Vec<&str> = output["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            "archer/walk/00_0000.png",
            "archer/walk/00_0001.png",
            "archer/walk/00_0002.png"
        ]
    );
}

#[test]
fn render_dry_run_writes_report() {
    let harness = TestHarness::new();
    let fixture = ProjectFixture::new(
        r#"{ "direction_count": 2, "characters": [
            { "id": "archer", "animations": [
                { "export_name": "walk", "action": "walk", "frame_count": 3 } ] } ] }"#,
    );
    let report_path = fixture.path().join("report.json");
    let result = harness.run_cli(&[
        "render",
        "--project",
        &fixture.project_arg(),
        "--dry-run",
        "--report",
        &report_path.to_string_lossy(),
    ]);
    result.assert_success();
    assert!(result.stdout.contains("SUCCESS"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["report"]["planned"], 6);
    assert_eq!(report["report"]["rendered"], 6);
    assert_eq!(report["project_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn select_dry_run_accepts_labels_and_keys() {
    let harness = TestHarness::new();
    let result = harness.run_cli(&["select", "--blend", "scene.blend", "-d", "NW", "--dry-run"]);
    result.assert_success();
    assert!(result.stdout.contains("135"));

    let result = harness.run_cli(&["select", "--blend", "scene.blend", "-d", "8", "--dry-run"]);
    result.assert_failure();
}

#[test]
fn rig_dry_run_writes_plan() {
    let harness = TestHarness::new();
    let plan_path = harness.path().join("rig.json");
    let result = harness.run_cli(&[
        "rig",
        "--blend",
        "scene.blend",
        "--dry-run",
        "--no-reference",
        "--plan-out",
        &plan_path.to_string_lossy(),
        "--json",
    ]);
    result.assert_success();

    let output = result.json();
    assert_eq!(output["nodes"], serde_json::json!(["ROTATEBOX", "CAMERA", "LIGHT"]));

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
    let ops: Vec<&str> = plan["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["op"].as_str().unwrap())
        .collect();
    assert!(ops.contains(&"set_active_camera"));
    assert!(ops.contains(&"apply_render_settings"));
    assert!(!ops.contains(&"render"));
}

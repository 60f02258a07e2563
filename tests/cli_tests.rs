use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(30);

#[test]
fn test_pipeline_help() {
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.arg("--help")
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Run the Crop Recommendation System pipeline",
        ))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--skip-preprocessing"))
        .stdout(predicate::str::contains("--skip-training"))
        .stdout(predicate::str::contains("--no-app"));
}

#[test]
fn test_pipeline_rejects_unknown_mode() {
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args(["--mode", "turbo"])
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_all_apps_help() {
    let mut cmd = cargo_bin_cmd!("run-all-apps");
    cmd.arg("--help")
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--no-browser"));
}

#[cfg(unix)]
#[test]
fn test_pipeline_enhanced_runs_enhanced_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args(["--mode", "enhanced", "--python", "true", "--streamlit", "true"])
        .arg("--base-dir")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting pipeline in enhanced mode"))
        .stdout(predicate::str::contains("preprocess_combined_data.py"))
        .stdout(predicate::str::contains("train_combined_model.py"))
        .stdout(predicate::str::contains("app_combined.py"))
        .stdout(predicate::str::contains("preprocess_crop_data.py").not())
        .stdout(predicate::str::contains("crop_prediction_model.py").not());
}

#[cfg(unix)]
#[test]
fn test_pipeline_keeps_going_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args(["--python", "false", "--streamlit", "true", "--json"])
        .arg("--base-dir")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Command completed with return code: 1"))
        .stdout(predicate::str::contains("Launching basic web application..."))
        .stdout(predicate::str::contains(r#""step": "launch""#))
        .stdout(predicate::str::contains(r#""exit_code": 0"#));
}

#[cfg(unix)]
#[test]
fn test_pipeline_skip_flags_leave_only_launch() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args([
        "--skip-preprocessing",
        "--skip-training",
        "--python",
        "false",
        "--streamlit",
        "true",
    ])
    .arg("--base-dir")
    .arg(dir.path())
    .env_remove("RUST_LOG")
    .timeout(TIMEOUT)
    .assert()
    .success()
    .stdout(predicate::str::contains("Running basic data preprocessing...").not())
    .stdout(predicate::str::contains("Training basic crop prediction model...").not())
    .stdout(predicate::str::contains("Launching basic web application..."));
}

#[cfg(unix)]
#[test]
fn test_all_apps_exit_when_every_app_dies() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("apps.json");
    std::fs::write(
        &config,
        r#"{"apps": [
            {"name": "Field Analyzer", "path": "src/webapp/app.py", "port": 8501},
            {"name": "Basic Crop Recommender", "path": "src/webapp/crop_recommendation_app.py", "port": 8502}
        ]}"#,
    )
    .unwrap();

    // `false -m streamlit ...` exits straight away with status 1.
    let mut cmd = cargo_bin_cmd!("run-all-apps");
    cmd.arg("--config")
        .arg(&config)
        .args([
            "--python",
            "false",
            "--no-browser",
            "--poll-interval",
            "100ms",
        ])
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting app on http://localhost:8501"))
        .stdout(predicate::str::contains("All apps have terminated. Exiting."))
        .stderr(predicate::str::contains(
            "WARNING: Basic Crop Recommender on port 8502 has terminated.",
        ));
}

#[test]
fn test_all_apps_bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("apps.json");
    std::fs::write(&config, "not json").unwrap();

    let mut cmd = cargo_bin_cmd!("run-all-apps");
    cmd.arg("--config")
        .arg(&config)
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[cfg(unix)]
#[test]
fn test_pipeline_default_logging_does_not_block_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args(["--python", "true", "--streamlit", "true"])
        .arg("--base-dir")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .timeout(TIMEOUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: true"))
        .stdout(predicate::str::contains("Command completed with return code: 0").count(3))
        .stderr(predicate::str::contains("starting step"));
}

#[cfg(unix)]
#[test]
fn test_pipeline_merges_child_streams_in_order() {
    let dir = tempfile::tempdir().unwrap();
    // The quoted script path ends up as an argument to the trailing `true`.
    let mut cmd = cargo_bin_cmd!("run-pipeline");
    cmd.args([
        "--skip-preprocessing",
        "--skip-training",
        "--streamlit",
        "for i in 1 2; do echo out$i; echo err$i >&2; done; true",
    ])
    .arg("--base-dir")
    .arg(dir.path())
    .env_remove("RUST_LOG")
    .timeout(TIMEOUT)
    .assert()
    .success()
    .stdout(predicate::str::contains("out1\nerr1\nout2\nerr2\n"));
}

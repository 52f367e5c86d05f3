//! CLI integration tests for the simeval binaries.
//!
//! Tests exercise `simeval` and `simeval-asset` through `std::process::Command`,
//! covering input strategy selection, alignment failures, evaluator dispatch
//! through a stub scoring command, and the ASSET reshaping job.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn simeval_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_simeval"))
}

fn asset_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_simeval-asset"))
}

fn run(bin: &Path, args: &[&str], cwd: &Path) -> Output {
    Command::new(bin)
        .args(args)
        .current_dir(cwd)
        .env_remove("SIMEVAL_EVALUATOR_URL")
        .output()
        .expect("Failed to execute binary")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Expected exit code 0, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn assert_failure(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(1),
        "Expected exit code 1, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Config pointing the command backend at a shell stub that scores every
/// item with fluency = 0.5 and simplicity = 1.0
fn stub_config(dir: &Path) -> PathBuf {
    let script = write(
        dir,
        "scorer.sh",
        r#"items=$(cat)
count=$(printf '%s' "$items" | grep -o '"system_output"' | wc -l)
out="["
i=0
while [ "$i" -lt "$count" ]; do
  [ "$i" -gt 0 ] && out="$out,"
  out="$out{\"fluency\": 0.5, \"simplicity\": 1.0}"
  i=$((i + 1))
done
echo "$out]"
"#,
    );

    write(
        dir,
        "evaluator.toml",
        &format!(
            r#"[evaluator]
backend = "command"
program = "sh"
args = ["{}"]
timeout_ms = 30000

[tasks.simplification]
dimensions = ["fluency", "simplicity"]
"#,
            script.display()
        ),
    )
}

fn setup() -> TempDir {
    tempfile::tempdir().unwrap()
}

// =============================================================================
// Evaluation CLI
// =============================================================================

#[test]
fn test_help() {
    let dir = setup();
    let output = run(&simeval_bin(), &["--help"], dir.path());
    assert_success(&output);
    let out = stdout_str(&output);
    assert!(out.contains("--src_file"));
    assert!(out.contains("--ref_file"));
    assert!(out.contains("--task"));
}

#[test]
fn test_source_bundled_run() {
    let dir = setup();
    let config = stub_config(dir.path());
    let hyp = write(dir.path(), "hyp.jsonl", "{\"model_output\":\"a\"}\n{\"model_output\":\"b\"}\n");
    let src = write(
        dir.path(),
        "src.jsonl",
        "{\"complex\":\"A\",\"simple\":[\"x\"]}\n{\"complex\":\"B\",\"simple\":[\"y\"]}\n",
    );
    let out_file = dir.path().join("results").join("scores.json");

    let output = run(
        &simeval_bin(),
        &[
            hyp.to_str().unwrap(),
            "--src_file",
            src.to_str().unwrap(),
            "--task",
            "simplification",
            "--config",
            config.to_str().unwrap(),
            "--out_file",
            out_file.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output);

    let out = stdout_str(&output);
    assert!(out.contains("Evaluating as a SIMPLIFICATION task"));
    assert!(out.contains("fluency"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_file).unwrap()).unwrap();
    assert_eq!(report["total_items"], 2);
    assert_eq!(report["averages"]["fluency"], 0.5);
    assert_eq!(report["items"].as_array().unwrap().len(), 2);
}

#[test]
fn test_explicit_source_and_reference_files() {
    let dir = setup();
    let config = stub_config(dir.path());
    let hyp = write(dir.path(), "hyp.txt", "a\nb\nc\n");
    let src = write(dir.path(), "src.txt", "A\nB\nC\n");
    let refs = write(dir.path(), "refs.txt", "x\ny\nz\n");

    let output = run(
        &simeval_bin(),
        &[
            hyp.to_str().unwrap(),
            "--src_file",
            src.to_str().unwrap(),
            "--ref_file",
            refs.to_str().unwrap(),
            "--task",
            "simplification",
            "--config",
            config.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output);
}

#[test]
fn test_hypothesis_bundled_run() {
    let dir = setup();
    let config = stub_config(dir.path());
    let hyp = write(
        dir.path(),
        "hyp.jsonl",
        "{\"model_output\":\"a\",\"source\":\"A\",\"references\":[\"x\",\"x2\"]}\n",
    );

    let output = run(
        &simeval_bin(),
        &[
            hyp.to_str().unwrap(),
            "--task",
            "simplification",
            "--config",
            config.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output);
}

#[test]
fn test_length_mismatch_aborts() {
    let dir = setup();
    let config = stub_config(dir.path());
    let hyp = write(dir.path(), "hyp.txt", "a\nb\n");
    let src = write(dir.path(), "src.tsv", "A\tx\nB\ty\nC\tz\n");

    let output = run(
        &simeval_bin(),
        &[
            hyp.to_str().unwrap(),
            "--src_file",
            src.to_str().unwrap(),
            "--task",
            "simplification",
            "--config",
            config.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_failure(&output);
    assert!(stderr_str(&output).contains("does not match number of hypothesis sentences"));
    assert!(!stdout_str(&output).contains("Evaluating as"));
}

#[test]
fn test_missing_model_output_field() {
    let dir = setup();
    let hyp = write(dir.path(), "hyp.jsonl", "{\"output\":\"a\"}\n");

    let output = run(&simeval_bin(), &[hyp.to_str().unwrap()], dir.path());
    assert_failure(&output);
    assert!(stderr_str(&output).contains("`model_output`"));
}

#[test]
fn test_reference_file_requires_source_file() {
    let dir = setup();
    let hyp = write(dir.path(), "hyp.txt", "a\n");
    let refs = write(dir.path(), "refs.txt", "x\n");

    let output = run(
        &simeval_bin(),
        &[hyp.to_str().unwrap(), "--ref_file", refs.to_str().unwrap()],
        dir.path(),
    );
    assert_failure(&output);
    assert!(stderr_str(&output).contains("--ref_file requires --src_file"));
}

#[test]
fn test_unknown_task() {
    let dir = setup();
    let config = stub_config(dir.path());
    let hyp = write(dir.path(), "hyp.txt", "a\n");
    let src = write(dir.path(), "src.txt", "A\n");
    let refs = write(dir.path(), "refs.txt", "x\n");

    let output = run(
        &simeval_bin(),
        &[
            hyp.to_str().unwrap(),
            "--src_file",
            src.to_str().unwrap(),
            "--ref_file",
            refs.to_str().unwrap(),
            "--task",
            "translation",
            "--config",
            config.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_failure(&output);
    assert!(stderr_str(&output).contains("Unknown task `translation`"));
}

#[test]
fn test_missing_hypothesis_file() {
    let dir = setup();
    let output = run(&simeval_bin(), &["does-not-exist.jsonl"], dir.path());
    assert_failure(&output);
    assert!(stderr_str(&output).contains("does-not-exist.jsonl"));
}

// =============================================================================
// ASSET reshaping CLI
// =============================================================================

fn asset_fixture(dir: &Path) -> PathBuf {
    let asset = dir.join("asset");
    for i in 0..10 {
        write(
            &asset,
            &format!("dataset/asset.test.simp.{}", i),
            &format!("zero ref {}\none ref {}\n", i, i),
        );
    }
    write(
        &asset,
        "human_ratings/human_ratings.csv",
        "\
original,simplification,original_sentence_id,aspect,worker_id,rating
One.,One simple.,1,meaning,7,80
One.,One simple.,1,fluency,7,90
One.,One simple.,1,simplicity,7,70
Zero.,Zero simple.,0,meaning,7,60
Zero.,Zero simple.,0,fluency,7,50
Zero.,Zero simple.,0,simplicity,7,40
",
    );
    asset
}

#[test]
fn test_asset_reshape() {
    let dir = setup();
    let asset = asset_fixture(dir.path());
    let out_file = dir.path().join("data").join("asset.json");

    let output = run(
        &asset_bin(),
        &[
            "--asset-dir",
            asset.to_str().unwrap(),
            "--out-file",
            out_file.to_str().unwrap(),
        ],
        dir.path(),
    );
    assert_success(&output);
    assert!(stdout_str(&output).contains("Collected 2 annotated data points"));

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&out_file).unwrap()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["doc_id"], 0);
    assert_eq!(records[0]["source"], "Zero.");
    assert_eq!(records[0]["scores"]["coherence"], 60.0);
    assert_eq!(records[0]["scores"]["consistency"], 60.0);
    assert!(records[0]["reference"].as_str().unwrap().starts_with("zero ref"));
    assert!(records[1]["reference"].as_str().unwrap().starts_with("one ref"));
}

#[test]
fn test_asset_reshape_is_deterministic() {
    let dir = setup();
    let asset = asset_fixture(dir.path());
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    for out in [&first, &second] {
        let output = run(
            &asset_bin(),
            &[
                "--asset-dir",
                asset.to_str().unwrap(),
                "--out-file",
                out.to_str().unwrap(),
                "--seed",
                "13",
            ],
            dir.path(),
        );
        assert_success(&output);
    }

    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_asset_missing_aspect_aborts() {
    let dir = setup();
    let asset = asset_fixture(dir.path());
    write(
        &asset,
        "human_ratings/human_ratings.csv",
        "\
original,simplification,original_sentence_id,aspect,worker_id,rating
Zero.,Zero simple.,0,meaning,7,60
",
    );

    let output = run(
        &asset_bin(),
        &["--asset-dir", asset.to_str().unwrap(), "--out-file", "out.json"],
        dir.path(),
    );
    assert_failure(&output);
    assert!(stderr_str(&output).contains("no `fluency` rating"));
    assert!(!dir.path().join("out.json").exists());
}

//! CLI tests for `concord score`, `concord clusters`, and `concord completions`

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DOC_SHARED: &str = r#"{"source_url":"d1","text":"aspirin","tracks":[{"project":"trackA","denotations":[{"id":"T1","obj":["Drug"],"span":{"begin":0,"end":5},"link_ids":["X1"],"text":"aspir"}]},{"project":"trackB","denotations":[{"id":"T1","obj":["Drug"],"span":{"begin":2,"end":6},"link_ids":["X1"],"text":"piri"}]}]}"#;

const DOC_DISJOINT: &str = r#"{"source_url":"d2","text":"","tracks":[{"project":"trackA","denotations":[{"id":"T1","obj":"Drug","span":{"begin":0,"end":3},"link_ids":[],"text":""}]},{"project":"trackB","denotations":[{"id":"T1","obj":"Drug","span":{"begin":10,"end":12},"link_ids":[],"text":""}]}]}"#;

const DOC_GENERIC: &str = r#"{"source_url":"d3","text":"","tracks":[{"project":"trackA","denotations":[{"id":"T1","obj":"biolink:NamedThing","span":{"begin":0,"end":4},"text":"abcd"}]},{"project":"trackC","denotations":[{"id":"T9","obj":"Drug","span":{"begin":1,"end":3},"text":"bc"}]}]}"#;

fn setup_jsonl(lines: &[&str]) -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let file_path = dir.path().join("input.jsonl");
    fs::write(&file_path, lines.join("\n") + "\n").expect("Failed to write test file");
    (dir, file_path.to_string_lossy().to_string())
}

fn concord() -> Command {
    let mut cmd = Command::cargo_bin("concord").unwrap();
    // Keep results independent of the developer's own config file and log settings.
    cmd.env("XDG_CONFIG_HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_score_table() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED]);
    concord()
        .args(["score", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 1"))
        .stdout(predicate::str::contains("trackA"))
        .stdout(predicate::str::contains("100.0%"))
        .stderr(predicate::str::contains("Compared 2 projects across 2 pairs"));
}

#[test]
fn test_score_json_counts() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED, DOC_DISJOINT]);
    let output = concord()
        .args(["score", &path, "--format", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stderr.is_empty());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ab = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["project_1"] == "trackA" && r["project_2"] == "trackB")
        .unwrap();
    assert_eq!(ab["counts"]["total_spans"], 3);
    assert_eq!(ab["counts"]["shared_spans"], 1);
    assert_eq!(ab["counts"]["spans_in_1_not_2"], 1);
    assert_eq!(ab["counts"]["spans_in_2_not_1"], 1);
    assert_eq!(ab["counts"]["identical_link_ids"], 1);
    assert_eq!(ab["counts"]["identical_obj"], 1);
}

#[test]
fn test_score_stdin() {
    concord()
        .args(["score", "-", "--format", "tsv", "-q"])
        .write_stdin(format!("{}\n", DOC_SHARED))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("project_1\tproject_2"))
        .stdout(predicate::str::contains("trackA\ttrackB\t1\t1\t0\t0\t1\t1"));
}

#[test]
fn test_score_filter_excludes_project() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED, DOC_GENERIC]);
    concord()
        .args(["score", &path, "-f", "trackA", "-f", "trackC", "--format", "markdown", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| trackA | trackC |"))
        .stdout(predicate::str::contains("trackB").not());
}

#[test]
fn test_score_directory_with_output_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::write(dir.path().join("a.jsonl"), format!("{}\n", DOC_SHARED)).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/b.jsonl"), format!("{}\n", DOC_SHARED)).unwrap();
    fs::write(dir.path().join("ignored.txt"), "not json").unwrap();
    let out = dir.path().join("report.json");

    concord()
        .args([
            "score",
            dir.path().to_str().unwrap(),
            "--format",
            "json",
            "-O",
            out.to_str().unwrap(),
            "--jobs",
            "2",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Report written to"));

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let ab = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["project_1"] == "trackA" && r["project_2"] == "trackB")
        .unwrap();
    assert_eq!(ab["counts"]["shared_spans"], 2);
}

#[test]
fn test_score_limit() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED, DOC_SHARED, DOC_SHARED]);
    concord()
        .args(["score", &path, "--limit", "1", "--format", "tsv", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trackA\ttrackB\t1\t1\t"));
}

#[test]
fn test_score_config_file() {
    let (dir, path) = setup_jsonl(&[DOC_SHARED]);
    let config = dir.path().join("concord.toml");
    fs::write(&config, "format = \"tsv\"\n").unwrap();
    concord()
        .args(["score", &path, "--config", config.to_str().unwrap(), "-q"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("project_1\t"));
}

#[test]
fn test_score_malformed_record_fails() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED, r#"{"source_url":"oops"}"#]);
    concord()
        .args(["score", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("input.jsonl:2"));
}

#[test]
fn test_score_inverted_span_fails() {
    let bad = r#"{"tracks":[{"project":"a","denotations":[{"span":{"begin":5,"end":2}}]}]}"#;
    let (_dir, path) = setup_jsonl(&[bad]);
    concord()
        .args(["score", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed record"));
}

#[test]
fn test_score_missing_input() {
    concord()
        .args(["score", "/no/such/input.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such file or directory"));
}

#[test]
fn test_score_empty_input() {
    let (_dir, path) = setup_jsonl(&[]);
    concord()
        .args(["score", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("No overlapping tracks to compare."));
}

#[test]
fn test_clusters_text() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED, DOC_DISJOINT, DOC_GENERIC]);
    concord()
        .args(["clusters", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("d1 (1 cluster, 1 shown)"))
        .stdout(predicate::str::contains("0_5 (2 annotations)"))
        .stdout(predicate::str::contains("d2 (2 clusters, 0 shown)"))
        .stdout(predicate::str::contains("[generic] [trackA]"));
}

#[test]
fn test_clusters_json_round_trip() {
    let (_dir, path) = setup_jsonl(&[DOC_SHARED]);
    let output = concord()
        .args(["clusters", &path, "--format", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let line: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(line["source_url"], "d1");
    let clusters = concord::SpanClusters::from_json(&line["clusters"].to_string()).unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters.denotation_count(), 2);
}

#[test]
fn test_clusters_output_file_is_plain_text() {
    let (dir, path) = setup_jsonl(&[DOC_SHARED, DOC_GENERIC]);
    let out = dir.path().join("clusters.txt");
    concord()
        .args(["clusters", &path, "-O", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Listed 2 clusters from 2 documents"));

    let listing = fs::read_to_string(&out).unwrap();
    assert!(listing.contains("d1 (1 cluster, 1 shown)"));
    assert!(listing.contains("[generic] [trackA]"));
    assert!(!listing.contains('\x1b'));
}

#[test]
fn test_score_invalid_utf8_reports_line() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("input.jsonl");
    let mut bytes = format!("{}\n", DOC_SHARED).into_bytes();
    bytes.extend_from_slice(b"{\"source_url\":\"\xff\xfe\"}\n");
    fs::write(&path, bytes).unwrap();
    concord()
        .args(["score", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed record"))
        .stderr(predicate::str::contains("input.jsonl:2"));
}

#[test]
fn test_completions() {
    concord()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("concord"));
}

#[test]
fn test_help_lists_subcommands() {
    concord()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("clusters"));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn get_verifier_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rts-verifier"))
}

/// Write RTS lines, each behind a realistic message prefix, to a log file
fn write_log(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let content: String = lines
        .iter()
        .map(|line| {
            format!("[1700000000:123456][4242:0x7f][WT_SESSION.rollback_to_stable] [WT_VERB_RTS][DEBUG_1]: {line}\n")
        })
        .collect();
    let path = dir.path().join("rts.log");
    fs::write(&path, content).unwrap();
    path
}

fn run_verifier(path: &Path, args: &[&str]) -> Output {
    Command::new(get_verifier_binary())
        .arg(path)
        .args(args)
        .env_remove("RTS_VERIFIER_LOG")
        .output()
        .expect("Failed to execute rts-verifier")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

const TREE_AHEAD: &str = "[TREE] file:foo.wt modified=true durable_timestamp=(6, 0) > stable_timestamp=(5, 0): true has_prepared_updates=false durable_timestamp_not_found=false txnid=10 > recovery_checkpoint_snap_min=5: true";

#[test]
fn test_healthy_run_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            "[TREE] file:foo.wt modified=false durable_timestamp=(5, 0) > stable_timestamp=(5, 0): false has_prepared_updates=false durable_timestamp_not_found=false txnid=10 > recovery_checkpoint_snap_min=5: true",
            "[END]",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr_of(&output));
    assert_eq!(
        stdout_of(&output),
        "summary: 3 operations, 1 trees, 0 errors, 0 warnings, 0 info\n"
    );
}

#[test]
fn test_stable_regression_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(10, 0)",
            "[INIT] stable_timestamp=(9, 0)",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(
        stdout.starts_with("ERROR stable_regression (line 2): "),
        "unexpected report: {stdout}"
    );
}

#[test]
fn test_update_without_page_is_only_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            TREE_AHEAD,
            "[UPDATE_ABORT] file:foo.wt txnid=10 txnid_not_visible=true stable_timestamp=(5, 0) < durable_timestamp=(6, 0): true prepare_state=PREPARE_INIT",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("WARN update_without_page (line 3): "));
    assert!(stdout.contains("[tree=file:foo.wt]"));

    let quiet = run_verifier(&log, &["--quiet"]);
    assert_eq!(quiet.status.code(), Some(0));
    assert!(!stdout_of(&quiet).contains("update_without_page"));
}

#[test]
fn test_unjustified_tw_abort_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            "[TREE] file:foo.wt modified=true durable_timestamp=(3, 0) > stable_timestamp=(5, 0): false has_prepared_updates=false durable_timestamp_not_found=false txnid=1 > recovery_checkpoint_snap_min=5: false",
            "[ONDISK_ABORT_TW] file:foo.wt time_window=(3, 0)/(3, 0)/1 durable_timestamp > stable_timestamp: false txnid_not_visible=false tw_has_no_stop_and_is_prepared=false",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).contains("ERROR tw_abort_without_reason (line 3): "));
}

#[test]
fn test_inverted_hs_window_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            TREE_AHEAD,
            "[HS_UPDATE_ABORT] file:foo.wt time_window=start: (8, 0)/(7, 0)/1 stop: (6, 0)/(5, 0)/2 type=STANDARD stable_timestamp=(5, 0)",
        ],
    );

    let output = run_verifier(&log, &["--json"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected report: {stdout}");
    let finding: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(finding["severity"], "ERROR");
    assert_eq!(finding["code"], "hs_tw_invalid");
    assert_eq!(finding["line_number"], 3);
    assert_eq!(finding["tree"], "file:foo.wt");
    assert!(finding.get("page").is_none());
}

#[test]
fn test_shutdown_rts_failure_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            "[SHUTDOWN_INIT] stable_timestamp=(5, 0)",
            "[SHUTDOWN_RTS] performing shutdown rollback to stable failed with code 22",
            "[END]",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("0 errors"));
    assert!(stdout.ends_with("shutdown rollback to stable reported failure\n"));
}

#[test]
fn test_max_findings_withholds_and_keeps_status() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(10, 0)",
            "[INIT] stable_timestamp=(9, 0)",
            "[INIT] stable_timestamp=(8, 0)",
            "[INIT] stable_timestamp=(7, 0)",
        ],
    );

    let output = run_verifier(&log, &["--max-findings=1"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output).matches("stable_regression").count(), 1);
    assert!(stderr_of(&output).contains("2 more findings withheld"));
}

#[test]
fn test_malformed_line_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(
        &temp_dir,
        &[
            "[INIT] stable_timestamp=(5, 0)",
            "[PAGE_ROLLBACK] file:foo.wt roll back page modified=true",
        ],
    );

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("line 2"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("[PAGE_ROLLBACK] file:foo.wt roll back page modified=true"));
}

#[test]
fn test_unknown_tag_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(&temp_dir, &["[NOT_A_TAG] file:foo.wt"]);

    let output = run_verifier(&log, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("NOT_A_TAG"));
}

#[test]
fn test_missing_file_exits_three() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_verifier(&temp_dir.path().join("absent.log"), &[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr_of(&output).contains("absent.log"));
}

#[test]
fn test_log_env_var_enables_diagnostics() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_log(&temp_dir, &["[INIT] stable_timestamp=(5, 0)"]);

    let output = Command::new(get_verifier_binary())
        .arg(&log)
        .env("RTS_VERIFIER_LOG", "debug")
        .output()
        .expect("Failed to execute rts-verifier");
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("evaluating operation"));
    assert!(!stdout_of(&output).contains("evaluating operation"));
}

//! Integration test: the subprocess acquirer against a fake tool script.
#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use tdm_core::acquire::{Acquirer, AcquisitionError, YtDlpAcquirer, TIMEOUT_EXIT_CODE};
use tdm_core::config::AcquisitionConfig;
use tempfile::tempdir;

fn acquirer(program: &std::path::Path, timeout_secs: u64) -> YtDlpAcquirer {
    YtDlpAcquirer::from_config(&AcquisitionConfig {
        program: program.to_string_lossy().into_owned(),
        timeout_secs,
        ..AcquisitionConfig::default()
    })
}

#[tokio::test]
async fn success_writes_file_and_passes_contract_arguments() {
    let dir = tempdir().unwrap();
    let tool = common::fake_tool::write(
        dir.path(),
        r#"echo "[download] Destination: $out"; printf 'audio' > "$out"; exit 0"#,
    );
    let out = dir.path().join("Song.mp3");

    acquirer(&tool, 10)
        .acquire(r#"ytsearch1:"Artist" "Song""#, &out)
        .await
        .expect("acquire");

    assert_eq!(std::fs::read(&out).unwrap(), b"audio");
    let args = std::fs::read_to_string(dir.path().join("Song.mp3.args")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(
        args,
        vec![
            "-x",
            "--audio-format",
            "mp3",
            "--match-filter",
            "!is_short",
            "-o",
            out.to_str().unwrap(),
            r#"ytsearch1:"Artist" "Song""#,
        ]
    );
}

#[tokio::test]
async fn non_zero_exit_carries_code_and_combined_output() {
    let dir = tempdir().unwrap();
    let tool = common::fake_tool::write(
        dir.path(),
        r#"echo "[youtube:search] searching"; echo "ERROR: no results" >&2; exit 1"#,
    );
    let out = dir.path().join("Song.mp3");

    let err = acquirer(&tool, 10)
        .acquire("ytsearch1:nothing", &out)
        .await
        .unwrap_err();
    match &err {
        AcquisitionError::Exited { code, output } => {
            assert_eq!(*code, 1);
            assert!(output.contains("searching"), "stdout captured: {output}");
            assert!(output.contains("ERROR: no results"), "stderr captured: {output}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), Some(1));
    assert!(!out.exists());
}

#[tokio::test]
async fn hung_tool_is_killed_at_deadline() {
    let dir = tempdir().unwrap();
    let tool = common::fake_tool::write(dir.path(), "exec sleep 30");
    let out = dir.path().join("Song.mp3");

    let started = Instant::now();
    let err = acquirer(&tool, 1)
        .acquire("ytsearch1:slow", &out)
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(15));
    assert!(matches!(err, AcquisitionError::TimedOut { .. }));
    assert_eq!(err.exit_code(), Some(TIMEOUT_EXIT_CODE));
}

#[tokio::test]
async fn exit_zero_without_file_is_missing_output() {
    let dir = tempdir().unwrap();
    let tool = common::fake_tool::write(dir.path(), "exit 0");
    let out = dir.path().join("Song.mp3");

    let err = acquirer(&tool, 10)
        .acquire("ytsearch1:ghost", &out)
        .await
        .unwrap_err();
    assert!(matches!(err, AcquisitionError::MissingOutput { .. }));
    assert_eq!(err.exit_code(), None);
}

#[tokio::test]
async fn exit_zero_without_file_is_trusted_when_verification_is_off() {
    let dir = tempdir().unwrap();
    let tool = common::fake_tool::write(dir.path(), "exit 0");
    let acquirer = YtDlpAcquirer::from_config(&AcquisitionConfig {
        program: tool.to_string_lossy().into_owned(),
        verify_output: false,
        ..AcquisitionConfig::default()
    });

    acquirer
        .acquire("ytsearch1:ghost", &dir.path().join("Song.mp3"))
        .await
        .expect("exit 0 is success without verification");
}

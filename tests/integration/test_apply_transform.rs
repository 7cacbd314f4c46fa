#![cfg(unix)]

use serial_test::serial;
use spatial_backend::core::types::ErrorCategory;
use spatial_backend::core::{AimsApplyTransform, PointTransformer};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Write an executable stand-in for the transform tool.
fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-aims");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).unwrap();
    path
}

fn chain(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
#[serial]
async fn test_identity_tool_returns_points_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(
        temp_dir.path(),
        "echo 'reading transforms...'\ncat\necho\necho done",
    ));
    let points = [[1.0, 2.0, 3.5], [0.0, -1.0, 0.5]];

    let result = tool
        .transform_points(&points, &chain(&["identity"]), temp_dir.path())
        .await
        .unwrap();
    assert_eq!(result, points.to_vec());
}

#[tokio::test]
#[serial]
async fn test_tool_runs_in_working_dir_with_chain_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let instance = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(
        temp_dir.path(),
        "echo \"$@\" > args.txt\ncat",
    ));

    let point = tool
        .transform_point(
            [10.0, 20.0, 30.0],
            &chain(&["A_to_B.trm", "inv:C_to_B.ima"]),
            instance.path(),
        )
        .await
        .unwrap();
    assert_eq!(point, [10.0, 20.0, 30.0]);

    let recorded = fs::read_to_string(instance.path().join("args.txt")).unwrap();
    assert_eq!(
        recorded.trim(),
        "--points --mmap-fields --input - --output - \
         --direct-transform A_to_B.trm --direct-transform inv:C_to_B.ima"
    );
}

#[tokio::test]
#[serial]
async fn test_non_zero_exit_reports_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(
        temp_dir.path(),
        "cat > /dev/null\necho 'cannot read A_to_B.trm' >&2\nexit 3",
    ));

    let err = tool
        .transform_points(&[[1.0, 2.0, 3.0]], &chain(&["A_to_B.trm"]), temp_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::ToolExecutionError);
    assert_eq!(err.code, "SB-TOOL-EXIT");
    assert!(err.message.contains("exit code 3"));
    assert_eq!(
        err.context.get("stderr").map(String::as_str),
        Some("cannot read A_to_B.trm")
    );
}

#[tokio::test]
#[serial]
async fn test_slow_tool_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(temp_dir.path(), "sleep 5\ncat"))
        .with_timeout(Some(Duration::from_millis(200)));

    let err = tool
        .transform_points(&[[1.0, 2.0, 3.0]], &[], temp_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::TimeoutError);
    assert_eq!(err.code, "SB-TOOL-TIMEOUT");
}

#[tokio::test]
#[serial]
async fn test_point_count_mismatch_is_internal_error() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(
        temp_dir.path(),
        "cat > /dev/null\necho '(1, 2, 3)'",
    ));

    let err = tool
        .transform_points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], &[], temp_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::InternalError);
    assert_eq!(err.code, "SB-POINT-COUNT");
}

#[tokio::test]
#[serial]
async fn test_unreadable_number_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let tool = AimsApplyTransform::new(fake_tool(
        temp_dir.path(),
        "cat > /dev/null\necho '(1, two, 3)'",
    ));

    let err = tool
        .transform_points(&[[1.0, 2.0, 3.0]], &[], temp_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::ParseError);
}

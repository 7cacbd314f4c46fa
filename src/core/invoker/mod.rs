#![allow(clippy::result_large_err)] // Invocation APIs return AppError to keep tool diagnostics attached.

//! Running transform chains through the external `AimsApplyTransform` tool.

pub mod command;
pub mod parse;

pub use command::{build_command, build_image_command, image_command_parts, TOOL_NAME};
pub use parse::{parse_points, serialize_points, ParsedPoints, PointParseError};

use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, Point};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Applies a chain of direct transforms to points.
#[async_trait]
pub trait PointTransformer: Send + Sync + 'static {
    /// Transform every point in one pass; the output keeps the input order.
    async fn transform_points(
        &self,
        points: &[Point],
        chain: &[String],
        working_dir: &Path,
    ) -> Result<Vec<Point>, AppError>;

    async fn transform_point(
        &self,
        point: Point,
        chain: &[String],
        working_dir: &Path,
    ) -> Result<Point, AppError> {
        let points = self.transform_points(&[point], chain, working_dir).await?;
        match points.as_slice() {
            [single] => Ok(*single),
            _ => Err(count_mismatch(1, points.len())),
        }
    }
}

/// [`PointTransformer`] backed by the `AimsApplyTransform` executable.
#[derive(Debug, Clone)]
pub struct AimsApplyTransform {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for AimsApplyTransform {
    fn default() -> Self {
        Self::new(TOOL_NAME)
    }
}

impl AimsApplyTransform {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for a points-mode run reading stdin and writing stdout.
    pub fn points_arguments(chain: &[String]) -> Vec<String> {
        let mut args: Vec<String> = ["--points", "--mmap-fields", "--input", "-", "--output", "-"]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        for transform in chain {
            args.push("--direct-transform".to_string());
            args.push(transform.clone());
        }
        args
    }

    async fn run(&self, input: String, args: &[String], working_dir: &Path) -> Result<Vec<u8>, AppError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                AppError::new(
                    ErrorCategory::ToolExecutionError,
                    format!("failed to start {}: {}", self.program.display(), err),
                )
                .with_code("SB-TOOL-SPAWN")
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            AppError::new(ErrorCategory::InternalError, "child stdin was not captured")
        })?;
        // Feed stdin concurrently so a tool that writes before reading everything cannot block us.
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            result
        });

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    AppError::new(
                        ErrorCategory::TimeoutError,
                        format!(
                            "{} did not complete within {}",
                            self.program.display(),
                            humantime::format_duration(limit)
                        ),
                    )
                    .with_code("SB-TOOL-TIMEOUT")
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|err| {
            AppError::new(
                ErrorCategory::ToolExecutionError,
                format!("failed to wait for {}: {}", self.program.display(), err),
            )
        })?;

        if let Ok(Err(err)) = writer.await {
            // A tool that exits early closes its stdin; the exit status tells the real story.
            tracing::debug!("writing points to {} failed: {}", self.program.display(), err);
        }

        if !output.status.success() {
            let mut err = AppError::new(
                ErrorCategory::ToolExecutionError,
                format!(
                    "{} failed with exit code {}",
                    self.program.display(),
                    output
                        .status
                        .code()
                        .map_or_else(|| "none".to_string(), |code| code.to_string())
                ),
            )
            .with_code("SB-TOOL-EXIT");
            err.add_context("stderr", String::from_utf8_lossy(&output.stderr).trim());
            return Err(err);
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl PointTransformer for AimsApplyTransform {
    async fn transform_points(
        &self,
        points: &[Point],
        chain: &[String],
        working_dir: &Path,
    ) -> Result<Vec<Point>, AppError> {
        let args = Self::points_arguments(chain);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut words = vec![self.program.display().to_string()];
            words.extend(args.iter().cloned());
            tracing::debug!(
                "Transforming {} points with: {}",
                points.len(),
                shell_words::join(&words)
            );
        }

        let start = Instant::now();
        let stdout = self.run(serialize_points(points), &args, working_dir).await?;
        tracing::info!(
            "{} completed in {:.3} s",
            self.program.display(),
            start.elapsed().as_secs_f64()
        );

        let target_points = parse_points(stdout.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                AppError::new(
                    ErrorCategory::ParseError,
                    format!("unreadable output from {}: {}", self.program.display(), err),
                )
            })?;
        if target_points.len() != points.len() {
            return Err(count_mismatch(points.len(), target_points.len()));
        }
        Ok(target_points)
    }
}

fn count_mismatch(expected: usize, found: usize) -> AppError {
    tracing::error!(
        "transform returned {} points for {} input points",
        found,
        expected
    );
    AppError::new(
        ErrorCategory::InternalError,
        format!(
            "transform returned {} points for {} input points",
            found, expected
        ),
    )
    .with_code("SB-POINT-COUNT")
}

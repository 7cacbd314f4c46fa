//! Text protocol spoken with `AimsApplyTransform` in points mode.

use crate::core::types::Point;
use regex::Regex;
use std::io::{self, BufRead};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointParseError {
    #[error("failed to read transform output: {0}")]
    Io(#[from] io::Error),
    #[error("invalid coordinate {value:?} in line {line:?}")]
    InvalidNumber { line: String, value: String },
}

fn point_regex() -> &'static Regex {
    static POINT_RE: OnceLock<Regex> = OnceLock::new();
    POINT_RE.get_or_init(|| {
        Regex::new(r"^\s*\(\s*([^,]+)\s*,\s*([^,]+)\s*,\s*([^,]+)\s*\)\s*$")
            .expect("point pattern is a valid regex")
    })
}

/// Serialize points as one `(x, y, z)` line each.
pub fn serialize_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|[x, y, z]| format!("({}, {}, {})", x, y, z))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lazily parse points from the output of the external tool.
///
/// Lines that do not look like `(x, y, z)` are skipped, since the tool prints
/// its diagnostics on the same stream.
pub fn parse_points<R: BufRead>(reader: R) -> ParsedPoints<R> {
    ParsedPoints {
        lines: reader.lines(),
    }
}

/// Single-pass iterator returned by [`parse_points`].
pub struct ParsedPoints<R> {
    lines: io::Lines<R>,
}

impl<R: BufRead> Iterator for ParsedPoints<R> {
    type Item = Result<Point, PointParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if let Some(captures) = point_regex().captures(&line) {
                return Some(parse_captures(&line, &captures));
            }
        }
        None
    }
}

fn parse_captures(line: &str, captures: &regex::Captures<'_>) -> Result<Point, PointParseError> {
    let mut point = [0.0; 3];
    for (slot, coordinate) in point.iter_mut().enumerate() {
        let raw = captures.get(slot + 1).map_or("", |m| m.as_str()).trim();
        *coordinate = raw.parse().map_err(|_| PointParseError::InvalidNumber {
            line: line.to_string(),
            value: raw.to_string(),
        })?;
    }
    Ok(point)
}

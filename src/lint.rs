//! Lint-score harvesting: runs an external linter and extracts the final
//! rating from its report.

use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MetricsError;

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d.]+)/").unwrap());

/// Runs `program` over `paths` and parses the trailing `N.NN/10`-style
/// rating from its report.
///
/// The linter's exit status is ignored; most linters exit non-zero
/// whenever they have anything to report.
pub fn lint_score(
    program: &str,
    paths: &[String],
    rcfile: Option<&str>,
) -> Result<f64, MetricsError> {
    let mut cmd = Command::new(program);
    cmd.args(paths);
    if let Some(rc) = rcfile {
        cmd.arg(format!("--rcfile={rc}"));
    }
    log::debug!("lint: {program} {}", paths.join(" "));
    let output = cmd
        .output()
        .map_err(|e| MetricsError::lint(format!("failed to run {program}: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_score(&stdout)
        .ok_or_else(|| MetricsError::lint(format!("no score found in {program} output")))
}

/// Extracts the rating from the last non-empty report line.
pub fn parse_score(report: &str) -> Option<f64> {
    let line = report.lines().rev().find(|l| !l.trim().is_empty())?;
    let caps = SCORE_PATTERN.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

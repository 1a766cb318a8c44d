use std::path::Path;
use std::process::Command;

use crate::error::MetricsError;
use crate::git::Commit;

/// Runs `git log from..to` and returns one record per commit.
///
/// The `COMMIT|` sentinel keeps parsing line-oriented, and the subject is
/// always the last field because messages may themselves contain `|`.
pub fn commits_in_range(cwd: &Path, from: &str, to: &str) -> Result<Vec<Commit>, MetricsError> {
    let range = format!("{from}..{to}");
    let output = Command::new("git")
        .args(["log", "--format=COMMIT|%H|%s", &range])
        .current_dir(cwd)
        .output()
        .map_err(|e| MetricsError::repository(format!("failed to run git log: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MetricsError::repository(format!(
            "git log {range} failed: {}",
            stderr.trim()
        )));
    }

    let commits = parse_log_output(&String::from_utf8_lossy(&output.stdout));
    log::debug!("git log {range}: {} commits", commits.len());
    Ok(commits)
}

fn parse_log_output(output: &str) -> Vec<Commit> {
    let mut commits = Vec::new();
    for line in output.lines() {
        let Some(rest) = line.strip_prefix("COMMIT|") else {
            continue;
        };
        let mut parts = rest.splitn(2, '|');
        let (Some(sha), Some(subject)) = (parts.next(), parts.next()) else {
            continue;
        };
        if sha.is_empty() {
            continue;
        }
        commits.push(Commit {
            sha: sha.to_string(),
            subject: subject.to_string(),
        });
    }
    commits
}

// ─── Tests ────────────────────────────────────────────────────────────────────

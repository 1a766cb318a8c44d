use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MetricsError;
use crate::git::ChangeStats;

/// Runs `git show --numstat` for one commit and maps each changed file to
/// its line statistics.
///
/// A commit that no longer resolves is reported as [`MetricsError::CommitNotFound`]
/// so callers can distinguish a vanished ref from an unusable repository.
pub fn commit_file_stats(
    cwd: &Path,
    sha: &str,
) -> Result<HashMap<String, ChangeStats>, MetricsError> {
    let output = Command::new("git")
        .args(["show", sha, "--numstat", "--format="])
        .current_dir(cwd)
        .output()
        .map_err(|e| MetricsError::repository(format!("failed to run git show: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MetricsError::commit_not_found(format!(
            "{sha}: {}",
            stderr.trim()
        )));
    }

    Ok(parse_numstat(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `--numstat` output lines: `<added>\t<deleted>\t<path>`.
///
/// Binary files show `-` counters; they are recorded with zero weight but
/// still count as touched. Rename notations collapse to the new name.
fn parse_numstat(output: &str) -> HashMap<String, ChangeStats> {
    let mut stats: HashMap<String, ChangeStats> = HashMap::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut parts = trimmed.splitn(3, '\t');
        let (Some(added_raw), Some(deleted_raw), Some(raw_name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Some(filename) = normalize_filename(raw_name) else {
            continue;
        };
        let entry = stats.entry(filename).or_default();
        entry.additions += added_raw.parse().unwrap_or(0);
        entry.deletions += deleted_raw.parse().unwrap_or(0);
    }
    stats
}

/// Normalizes git rename notations:
///   "src/{old => new}/file.js" → "src/new/file.js"
///   "old-name => new-name"     → "new-name"
fn normalize_filename(raw: &str) -> Option<String> {
    if raw.contains('{') && raw.contains("=>") {
        let result = RENAME_RE.replace(raw, "$1").replace("//", "/");
        return if result.contains('{') {
            None
        } else {
            Some(result.trim().to_string())
        };
    }
    if raw.contains(" => ") {
        return raw.split(" => ").last().map(|s| s.trim().to_string());
    }
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

static RENAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+ => ([^}]+)\}").unwrap());

// ─── Tests ────────────────────────────────────────────────────────────────────

//! Tag listing ordered by version, newest first.

use std::cmp::Ordering;
use std::path::Path;
use std::process::Command;

use crate::error::MetricsError;

/// A leniently parsed dotted version.
///
/// Numeric components compare positionally; a missing component counts as
/// zero, so `1.2` and `1.2.0` are equal. A pre-release suffix sorts older
/// than the bare version it qualifies.
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u64>,
    pre_release: Option<String>,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.parts.len().max(other.parts.len());
        for i in 0..width {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parses a tag name as a version. Accepts an optional `v`/`V` prefix and a
/// trailing pre-release suffix. Names that do not start with a number after
/// the prefix are not versions and yield `None`.
pub fn parse_version(name: &str) -> Option<Version> {
    let trimmed = name.trim();
    let rest = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    let numeric_end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    let (numeric, suffix) = rest.split_at(numeric_end);

    let mut parts = Vec::new();
    for piece in numeric.split('.') {
        if piece.is_empty() {
            continue;
        }
        parts.push(piece.parse().ok()?);
    }
    if parts.is_empty() {
        return None;
    }

    let suffix = suffix.trim_start_matches(&['-', '.', '_'][..]);
    let pre_release = if suffix.is_empty() {
        None
    } else {
        Some(suffix.to_ascii_lowercase())
    };

    Some(Version { parts, pre_release })
}

/// Lists the repository's tags that parse as versions, newest first.
/// Tags that do not look like versions are dropped.
pub fn recent_tag_names(cwd: &Path) -> Result<Vec<String>, MetricsError> {
    let output = Command::new("git")
        .args(["tag"])
        .current_dir(cwd)
        .output()
        .map_err(|e| MetricsError::repository(format!("failed to run git tag: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MetricsError::repository(format!(
            "git tag failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut tagged: Vec<(String, Version)> = stdout
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| parse_version(name).map(|v| (name.to_string(), v)))
        .collect();

    tagged.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    log::debug!("git tag: {} version tags", tagged.len());
    Ok(tagged.into_iter().map(|(name, _)| name).collect())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! Version-control access: commit-range traversal, per-commit change
//! statistics, and tag listing, all via the `git` CLI.

pub mod log_parser;
pub mod numstat;
pub mod tags;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::MetricsError;

/// One commit as seen by ticket extraction: identifier plus message head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub subject: String,
}

/// Line-change statistics for one file within one commit.
///
/// Binary files report zero for both counters but still count as touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeStats {
    pub additions: usize,
    pub deletions: usize,
}

impl ChangeStats {
    /// Total changed-line weight, the unit the bug score accumulates.
    pub fn lines(&self) -> usize {
        self.additions + self.deletions
    }
}

/// History access the bug-score aggregation needs from a VCS.
pub trait Vcs {
    /// Commits reachable from `to` but not from `from`, i.e. `from..to`.
    fn commits_in_range(&self, from: &str, to: &str) -> Result<Vec<Commit>, MetricsError>;

    /// Per-file change statistics for a single commit.
    fn commit_file_stats(&self, sha: &str)
        -> Result<HashMap<String, ChangeStats>, MetricsError>;
}

/// A git repository addressed by its working-tree directory.
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    /// Opens `path`, verifying it exists and sits inside a git working tree.
    pub fn open(path: &Path) -> Result<Self, MetricsError> {
        if !path.exists() {
            return Err(MetricsError::repository(format!(
                "repository path does not exist: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(MetricsError::repository(format!(
                "repository path is not a directory: {}",
                path.display()
            )));
        }
        let output = Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(path)
            .output()
            .map_err(|e| MetricsError::repository(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(MetricsError::repository(format!(
                "not a git repository: {}",
                path.display()
            )));
        }
        Ok(GitRepo {
            workdir: path.to_path_buf(),
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl Vcs for GitRepo {
    fn commits_in_range(&self, from: &str, to: &str) -> Result<Vec<Commit>, MetricsError> {
        log_parser::commits_in_range(&self.workdir, from, to)
    }

    fn commit_file_stats(
        &self,
        sha: &str,
    ) -> Result<HashMap<String, ChangeStats>, MetricsError> {
        numstat::commit_file_stats(&self.workdir, sha)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

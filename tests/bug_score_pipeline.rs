//! End-to-end aggregation over a real throwaway git repository.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::Command;

use regex::Regex;
use tempfile::TempDir;

use code_metrics::bugscore;
use code_metrics::error::MetricsError;
use code_metrics::git::{tags, GitRepo, Vcs};
use code_metrics::tracker::IssueTracker;

/// Tracker double with a fixed defect set and the production key pattern.
struct StaticTracker {
    pattern: Regex,
    defects: BTreeSet<String>,
}

impl StaticTracker {
    fn new(defects: &[&str]) -> Self {
        StaticTracker {
            pattern: Regex::new(r"^\s*(PROJ-\d+)").unwrap(),
            defects: defects.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IssueTracker for StaticTracker {
    fn issue_key(&self, message: &str) -> Option<String> {
        self.pattern
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn filter_defects(&self, keys: &BTreeSet<String>) -> Result<BTreeSet<String>, MetricsError> {
        Ok(keys.intersection(&self.defects).cloned().collect())
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "dev")
        .env("GIT_AUTHOR_EMAIL", "dev@example.com")
        .env("GIT_COMMITTER_NAME", "dev")
        .env("GIT_COMMITTER_EMAIL", "dev@example.com")
        .status()
        .expect("git should be runnable");
    assert!(status.success(), "git {args:?} failed");
}

fn commit(dir: &Path, message: &str) {
    git(dir, &["add", "."]);
    git(dir, &["-c", "commit.gpgsign=false", "commit", "-qm", message]);
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("fixture dirs should create");
    }
    fs::write(path, content).expect("fixture file should write");
}

fn head_sha(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .expect("git rev-parse should run");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Lays down the fixture history:
///   base:    a.py with three lines
///   PROJ-12: rewrite a.py, 5 additions and 2 deletions (defect)
///   PROJ-13: append one line to a.py (story)
///   (none):  add b.py without a ticket
///   PROJ-14: add tests/test_core.py (2 lines) and src/core.py (3 lines) (defect)
fn build_fixture(dir: &Path) -> String {
    git(dir, &["init", "-q"]);

    write(dir, "a.py", "one\ntwo\nthree\n");
    commit(dir, "initial layout");
    let base = head_sha(dir);

    write(dir, "a.py", "one\nx1\nx2\nx3\nx4\nx5\n");
    commit(dir, "PROJ-12 fix crash in parser");

    write(dir, "a.py", "one\nx1\nx2\nx3\nx4\nx5\nextra\n");
    commit(dir, "PROJ-13 add feature flag");

    write(dir, "b.py", "b\n");
    commit(dir, "no ticket here");

    write(dir, "tests/test_core.py", "t1\nt2\n");
    write(dir, "src/core.py", "c1\nc2\nc3\n");
    commit(dir, "PROJ-14 fix boundary condition");

    base
}

#[test]
fn bug_score_over_real_history() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    let base = build_fixture(dir);

    let repo = GitRepo::open(dir).expect("fixture should open as a repository");
    let tracker = StaticTracker::new(&["PROJ-12", "PROJ-14"]);

    let records =
        bugscore::bug_score(&repo, &tracker, &base, "HEAD", None).expect("aggregation runs");

    let summary: Vec<(&str, usize, String)> = records
        .iter()
        .map(|r| (r.file.as_str(), r.changes_score, r.ticket_names()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a.py", 7, "PROJ-12".to_string()),
            ("src/core.py", 3, "PROJ-14".to_string()),
            ("tests/test_core.py", 2, "PROJ-14".to_string()),
        ],
        "only defect commits contribute, ranked by score"
    );
}

#[test]
fn ignore_pattern_excludes_test_paths() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    let base = build_fixture(dir);

    let repo = GitRepo::open(dir).expect("repository opens");
    let tracker = StaticTracker::new(&["PROJ-12", "PROJ-14"]);
    let ignore = Regex::new("^tests/").unwrap();

    let records = bugscore::bug_score(&repo, &tracker, &base, "HEAD", Some(&ignore))
        .expect("aggregation runs");

    let files: Vec<&str> = records.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(
        files,
        vec!["a.py", "src/core.py"],
        "paths under tests/ should be dropped before scoring"
    );
}

#[test]
fn repeated_runs_agree() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    let base = build_fixture(dir);

    let repo = GitRepo::open(dir).expect("repository opens");
    let tracker = StaticTracker::new(&["PROJ-12", "PROJ-14"]);

    let first = bugscore::bug_score(&repo, &tracker, &base, "HEAD", None).expect("first run");
    let second = bugscore::bug_score(&repo, &tracker, &base, "HEAD", None).expect("second run");
    assert_eq!(first, second, "same inputs must render the same report");
}

#[test]
fn ticket_extraction_walks_the_exact_range() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    let base = build_fixture(dir);

    let repo = GitRepo::open(dir).expect("repository opens");
    let tracker = StaticTracker::new(&[]);

    let commits =
        bugscore::ticket_commits(&repo, &tracker, &base, "HEAD").expect("extraction runs");
    let mut tickets: Vec<&str> = commits.values().map(String::as_str).collect();
    tickets.sort_unstable();
    assert_eq!(
        tickets,
        vec!["PROJ-12", "PROJ-13", "PROJ-14"],
        "the base commit is outside the range and unticketed commits are dropped"
    );

    let head = head_sha(dir);
    let empty = bugscore::ticket_commits(&repo, &tracker, &head, "HEAD").expect("empty range");
    assert!(empty.is_empty(), "HEAD..HEAD holds no commits");
}

#[test]
fn vanished_commit_reports_commit_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    build_fixture(dir);

    let repo = GitRepo::open(dir).expect("repository opens");
    let err = repo
        .commit_file_stats("0000000000000000000000000000000000000000")
        .expect_err("the null sha never resolves");
    assert!(
        matches!(err, MetricsError::CommitNotFound(_)),
        "expected commit-not-found, got: {err}"
    );
}

#[test]
fn unknown_range_endpoint_is_a_repository_error() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    build_fixture(dir);

    let repo = GitRepo::open(dir).expect("repository opens");
    let err = repo
        .commits_in_range("no-such-tag", "HEAD")
        .expect_err("an unknown endpoint should fail");
    assert!(
        matches!(err, MetricsError::Repository(_)),
        "expected a repository error, got: {err}"
    );
}

#[test]
fn version_tags_list_newest_first() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path();
    build_fixture(dir);

    git(dir, &["tag", "v1.0.0"]);
    git(dir, &["tag", "v1.1.0rc1"]);
    git(dir, &["tag", "v1.1.0"]);
    git(dir, &["tag", "nightly-build"]);

    let repo = GitRepo::open(dir).expect("repository opens");
    let names = tags::recent_tag_names(repo.workdir()).expect("tag listing runs");
    assert_eq!(
        names,
        vec!["v1.1.0", "v1.1.0rc1", "v1.0.0"],
        "non-version tags are dropped and the rest sort newest first"
    );
}

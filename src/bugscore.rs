//! Bug-score correlation: ranks files by how much bug-fix work landed on
//! them across a commit range.
//!
//! The pipeline has two phases. Phase one walks `from..to`, keeps the
//! commits whose message leads with a ticket key, and asks the tracker
//! which of those tickets are confirmed defects (one batched query).
//! Phase two folds each defect commit's per-file change statistics into
//! one [`FileScore`] per touched file.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::Regex;

use crate::error::MetricsError;
use crate::git::Vcs;
use crate::tracker::IssueTracker;

/// Aggregate bug-fix pressure on one file across a commit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileScore {
    pub file: String,
    /// Distinct defect tickets whose fixes touched this file.
    pub tickets: BTreeSet<String>,
    /// Cumulative changed-line weight across every attributed commit.
    pub changes_score: usize,
}

impl FileScore {
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    /// Space-joined ticket keys, lexicographic.
    pub fn ticket_names(&self) -> String {
        self.tickets
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Maps every commit in `from..to` whose message leads with a ticket key
/// to that key. Commits without a key are silently excluded.
pub fn ticket_commits<V, T>(
    vcs: &V,
    tracker: &T,
    from: &str,
    to: &str,
) -> Result<HashMap<String, String>, MetricsError>
where
    V: Vcs,
    T: IssueTracker,
{
    let mut commits = HashMap::new();
    for commit in vcs.commits_in_range(from, to)? {
        if let Some(ticket) = tracker.issue_key(&commit.subject) {
            commits.insert(commit.sha, ticket);
        }
    }
    Ok(commits)
}

/// Full aggregation over `from..to`.
///
/// `ignore` drops any file path it matches before scoring. Change
/// statistics are only fetched for commits whose ticket survived the
/// defect filter. The returned records are sorted by descending
/// `changes_score`, then descending ticket count, then path, so identical
/// inputs always render identically.
pub fn bug_score<V, T>(
    vcs: &V,
    tracker: &T,
    from: &str,
    to: &str,
    ignore: Option<&Regex>,
) -> Result<Vec<FileScore>, MetricsError>
where
    V: Vcs,
    T: IssueTracker,
{
    let commits = ticket_commits(vcs, tracker, from, to)?;
    let distinct: BTreeSet<String> = commits.values().cloned().collect();
    let defects = tracker.filter_defects(&distinct)?;
    log::debug!(
        "{} ticketed commits, {} distinct tickets, {} confirmed defects",
        commits.len(),
        distinct.len(),
        defects.len()
    );

    let mut scores: BTreeMap<String, FileScore> = BTreeMap::new();
    for (sha, ticket) in &commits {
        if !defects.contains(ticket) {
            continue;
        }
        for (file, stats) in vcs.commit_file_stats(sha)? {
            if ignore.is_some_and(|re| re.is_match(&file)) {
                continue;
            }
            let entry = scores.entry(file).or_insert_with_key(|path| FileScore {
                file: path.clone(),
                tickets: BTreeSet::new(),
                changes_score: 0,
            });
            entry.tickets.insert(ticket.clone());
            entry.changes_score += stats.lines();
        }
    }

    let mut records: Vec<FileScore> = scores.into_values().collect();
    records.sort_by(|a, b| {
        b.changes_score
            .cmp(&a.changes_score)
            .then_with(|| b.tickets.len().cmp(&a.tickets.len()))
            .then_with(|| a.file.cmp(&b.file))
    });
    Ok(records)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

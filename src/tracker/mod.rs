//! Issue-tracker access: ticket-key extraction and defect filtering.

pub mod jira;

use std::collections::BTreeSet;

use crate::error::MetricsError;

/// What the bug-score aggregation needs from an issue tracker.
pub trait IssueTracker {
    /// Extracts the ticket key leading `message`, if any.
    fn issue_key(&self, message: &str) -> Option<String>;

    /// Narrows `keys` to the subset confirmed as defect-type issues.
    ///
    /// An empty input must return empty without any remote traffic.
    fn filter_defects(&self, keys: &BTreeSet<String>) -> Result<BTreeSet<String>, MetricsError>;
}

pub use jira::JiraClient;

//! JIRA REST client: one batched JQL search per report, lazily built HTTP.

use std::collections::BTreeSet;
use std::time::Duration;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::config::JiraConfig;
use crate::error::MetricsError;
use crate::tracker::IssueTracker;

/// Issue types treated as defects when computing the bug score.
pub const DEFECT_ISSUE_TYPES: [&str; 2] = ["Bug", "Bug Sub Task"];

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: usize = 1000;

/// Client over the JIRA search API.
///
/// Construction validates the configuration and compiles the ticket
/// pattern; no network traffic happens until [`IssueTracker::filter_defects`]
/// is called with a non-empty key set. The HTTP client is built on first
/// use and reused for the client's lifetime.
pub struct JiraClient {
    config: JiraConfig,
    ticket_pattern: Regex,
    http: OnceCell<reqwest::blocking::Client>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, MetricsError> {
        // Keys must lead the message (leading whitespace tolerated), so a
        // ticket mentioned mid-sentence never counts.
        let pattern = format!(r"^\s*({}-\d+)", regex::escape(&config.project_prefix));
        let ticket_pattern = Regex::new(&pattern).map_err(|e| {
            MetricsError::configuration(format!(
                "invalid ticket pattern for project '{}': {e}",
                config.project_prefix
            ))
        })?;
        Ok(JiraClient {
            config,
            ticket_pattern,
            http: OnceCell::new(),
        })
    }

    pub fn from_env() -> Result<Self, MetricsError> {
        Self::new(JiraConfig::from_env()?)
    }

    fn http(&self) -> Result<&reqwest::blocking::Client, MetricsError> {
        self.http.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .map_err(|e| {
                    MetricsError::remote_service(format!("failed to build http client: {e}"))
                })
        })
    }
}

/// Builds the batched defect query: one search regardless of key count.
/// Keys are already sorted by the caller's `BTreeSet`, which keeps the
/// query text stable for identical inputs.
fn defect_jql(keys: &BTreeSet<String>) -> String {
    let types = DEFECT_ISSUE_TYPES
        .iter()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(",");
    let keys = keys.iter().cloned().collect::<Vec<_>>().join(",");
    format!("issuetype in ({types}) AND key in ({keys})")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    issues: Vec<IssueRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRef {
    key: String,
}

impl IssueTracker for JiraClient {
    fn issue_key(&self, message: &str) -> Option<String> {
        self.ticket_pattern
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn filter_defects(&self, keys: &BTreeSet<String>) -> Result<BTreeSet<String>, MetricsError> {
        if keys.is_empty() {
            return Ok(BTreeSet::new());
        }

        let jql = defect_jql(keys);
        log::debug!("jira search: {jql}");
        let url = format!(
            "{}/rest/api/2/search",
            self.config.server.trim_end_matches('/')
        );
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .http()?
            .get(&url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .query(&[
                ("jql", jql.as_str()),
                ("fields", "key"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .map_err(|e| MetricsError::remote_service(format!("jira search failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::remote_service(format!(
                "jira search returned {status}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| MetricsError::remote_service(format!("invalid jira response: {e}")))?;
        if parsed.issues.len() >= MAX_RESULTS {
            log::warn!(
                "jira search returned {} issues; results may be truncated",
                parsed.issues.len()
            );
        }

        Ok(parsed.issues.into_iter().map(|issue| issue.key).collect())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> JiraClient {
        // Unroutable server: any accidental network attempt fails loudly.
        JiraClient::new(JiraConfig {
            server: "http://127.0.0.1:1".to_string(),
            user: "reporter".to_string(),
            password: "hunter2".to_string(),
            project_prefix: "PROJ".to_string(),
        })
        .expect("config should produce a client")
    }

    #[test]
    fn test_issue_key_matches_leading_ticket() {
        let c = client();
        assert_eq!(c.issue_key("PROJ-12 fix null check"), Some("PROJ-12".into()));
        assert_eq!(
            c.issue_key("   PROJ-7 trailing whitespace tolerated"),
            Some("PROJ-7".into())
        );
    }

    #[test]
    fn test_issue_key_is_anchored() {
        let c = client();
        assert_eq!(
            c.issue_key("fix for PROJ-12"),
            None,
            "a key mentioned mid-message should not count"
        );
        assert_eq!(c.issue_key("no ticket here"), None);
        assert_eq!(c.issue_key(""), None);
    }

    #[test]
    fn test_issue_key_takes_first_of_several() {
        let c = client();
        assert_eq!(
            c.issue_key("PROJ-1 relates to PROJ-2"),
            Some("PROJ-1".into())
        );
    }

    #[test]
    fn test_issue_key_requires_exact_prefix() {
        let c = client();
        assert_eq!(c.issue_key("proj-12 lowercase"), None);
        assert_eq!(c.issue_key("OTHERPROJ-12 wrong project"), None);
        assert_eq!(c.issue_key("PROJ- 12 broken key"), None);
    }

    #[test]
    fn test_regex_metacharacters_in_prefix_are_literal() {
        let c = JiraClient::new(JiraConfig {
            server: "http://127.0.0.1:1".into(),
            user: "u".into(),
            password: "p".into(),
            project_prefix: "A.B".into(),
        })
        .expect("prefix with a dot should still build");
        assert_eq!(c.issue_key("A.B-3 fix"), Some("A.B-3".into()));
        assert_eq!(c.issue_key("AxB-3 fix"), None, "dot must not match any char");
    }

    #[test]
    fn test_defect_jql_is_batched_and_sorted() {
        let keys: BTreeSet<String> = ["PROJ-2", "PROJ-10", "PROJ-1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            defect_jql(&keys),
            "issuetype in ('Bug','Bug Sub Task') AND key in (PROJ-1,PROJ-10,PROJ-2)",
            "one query should carry every key, in set order"
        );
    }

    #[test]
    fn test_empty_key_set_skips_the_network() {
        let c = client();
        let result = c
            .filter_defects(&BTreeSet::new())
            .expect("empty input must not touch the unroutable server");
        assert!(result.is_empty());
    }

    #[test]
    fn test_search_response_parses_and_ignores_extras() {
        let body = r#"{
            "startAt": 0,
            "maxResults": 1000,
            "total": 2,
            "issues": [
                {"key": "PROJ-12", "id": "10001", "self": "https://jira/rest/api/2/issue/10001"},
                {"key": "PROJ-19", "id": "10002"}
            ]
        }"#;
        let parsed: SearchResponse =
            serde_json::from_str(body).expect("real search payloads should parse");
        let keys: Vec<&str> = parsed.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["PROJ-12", "PROJ-19"]);
    }
}

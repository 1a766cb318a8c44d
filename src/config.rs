//! Credentials and parameters for the remote collaborators.
//!
//! Values are read from the environment once, at the CLI boundary, and
//! passed into constructors as plain structs. Library code never touches
//! the process environment, and a missing value fails here before any
//! subprocess or network call happens.

use crate::error::MetricsError;

/// Connection settings for the issue tracker.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Base server URL, e.g. `https://jira.example.com`.
    pub server: String,
    pub user: String,
    pub password: String,
    /// Ticket key prefix for the tracked project, e.g. `PROJ`.
    pub project_prefix: String,
}

impl JiraConfig {
    /// Reads `JIRA_URL`, `JIRA_USER`, `JIRA_PASSWORD`, and `JIRA_PROJECT_ID`
    /// from the process environment.
    pub fn from_env() -> Result<Self, MetricsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key-to-value source. A missing or blank
    /// value is a configuration error naming the variable to set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MetricsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(JiraConfig {
            server: require(&lookup, "JIRA_URL", "JIRA server URL")?,
            user: require(&lookup, "JIRA_USER", "JIRA username")?,
            password: require(&lookup, "JIRA_PASSWORD", "JIRA password")?,
            project_prefix: require(&lookup, "JIRA_PROJECT_ID", "JIRA project ID")?,
        })
    }
}

/// Connection settings for the wiki that receives published reports.
#[derive(Debug, Clone)]
pub struct ConfluenceConfig {
    /// Content REST endpoint, e.g. `https://wiki.example.com/rest/api/content`.
    pub url: String,
    pub user: String,
    pub password: String,
    /// Key of the space that holds the report pages.
    pub space_key: String,
}

impl ConfluenceConfig {
    /// Reads `CONFLUENCE_URL`, `CONFLUENCE_USER`, `CONFLUENCE_PASSWORD`, and
    /// `CONFLUENCE_SPACE` from the process environment.
    pub fn from_env() -> Result<Self, MetricsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MetricsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ConfluenceConfig {
            url: require(&lookup, "CONFLUENCE_URL", "Confluence content URL")?,
            user: require(&lookup, "CONFLUENCE_USER", "Confluence username")?,
            password: require(&lookup, "CONFLUENCE_PASSWORD", "Confluence password")?,
            space_key: require(&lookup, "CONFLUENCE_SPACE", "Confluence space key")?,
        })
    }
}

fn require<F>(lookup: &F, key: &str, what: &str) -> Result<String, MetricsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MetricsError::configuration(format!(
            "{what} required. Set env var {key}"
        ))),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

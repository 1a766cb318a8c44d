//! Typed failures for every collaborator the report pipeline talks to.

use thiserror::Error;

/// Everything that can go wrong while building a report.
///
/// Configuration problems are raised before any subprocess or network
/// traffic. Remote failures are never retried.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A required credential or parameter is missing or malformed.
    #[error("configuration: {0}")]
    Configuration(String),

    /// The repository path, range, or a git invocation is unusable.
    #[error("repository: {0}")]
    Repository(String),

    /// A commit discovered during ticket extraction no longer resolves.
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// The issue tracker or wiki rejected a request.
    #[error("remote service: {0}")]
    RemoteService(String),

    /// The linter could not run or produced no score line.
    #[error("lint: {0}")]
    Lint(String),
}

impl MetricsError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        MetricsError::Configuration(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        MetricsError::Repository(msg.into())
    }

    pub fn commit_not_found(msg: impl Into<String>) -> Self {
        MetricsError::CommitNotFound(msg.into())
    }

    pub fn remote_service(msg: impl Into<String>) -> Self {
        MetricsError::RemoteService(msg.into())
    }

    pub fn lint(msg: impl Into<String>) -> Self {
        MetricsError::Lint(msg.into())
    }
}

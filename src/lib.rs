//! Code-quality reporting: per-file metrics plus bug-history correlation.
//!
//! The centerpiece is [`bugscore`], which walks a git commit range, maps
//! commits to issue-tracker tickets, narrows the tickets to confirmed
//! defects with one batched query, and folds per-commit change statistics
//! into a ranked [`bugscore::FileScore`] per touched file. Around it sit
//! the [`analyzers`] harvesters (complexity, maintainability, line
//! counts), [`lint`] for external linter ratings, [`git::tags`] for
//! release listings, [`format`] for table rendering, and [`confluence`]
//! for publishing rendered reports to a wiki.

pub mod analyzers;
pub mod bugscore;
pub mod config;
pub mod confluence;
pub mod error;
pub mod format;
pub mod git;
pub mod lint;
pub mod tracker;

pub use error::MetricsError;

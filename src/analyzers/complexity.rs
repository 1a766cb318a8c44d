//! Cyclomatic-complexity harvesting.
//!
//! A token scan, not a parser: each function unit starts at 1 and gains a
//! point per decision keyword and short-circuit operator. String contents
//! count as code; only line comments are stripped.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzers::source::{collect_sources, read_source, strip_line_comment, Language};

static PY_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+\w").unwrap());
static RS_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[\s(])fn\s+\w").unwrap());
static GO_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^func\b").unwrap());
static JS_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfunction\b|=>").unwrap());

static PY_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|elif|for|while|except|and|or)\b").unwrap());
static RS_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|while|for|loop|match)\b").unwrap());
static GO_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|for|case|select)\b").unwrap());
static GENERIC_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|for|while|case|catch)\b").unwrap());

fn function_opener(lang: Language) -> Option<&'static Regex> {
    match lang {
        Language::Python => Some(&PY_FUNC),
        Language::Rust => Some(&RS_FUNC),
        Language::Go => Some(&GO_FUNC),
        Language::JavaScript | Language::TypeScript => Some(&JS_FUNC),
        _ => None,
    }
}

fn branch_pattern(lang: Language) -> &'static Regex {
    match lang {
        Language::Python => &PY_BRANCH,
        Language::Rust => &RS_BRANCH,
        Language::Go => &GO_BRANCH,
        _ => &GENERIC_BRANCH,
    }
}

/// Decision points on one already-stripped line.
fn decision_points(line: &str, lang: Language) -> usize {
    branch_pattern(lang).find_iter(line).count()
        + line.matches("&&").count()
        + line.matches("||").count()
}

/// Average complexity of the function units in `source`.
///
/// Languages with a recognizable function opener are split into units, and
/// lines before the first opener are ignored. Other languages count as one
/// whole-file unit. `None` when no units are found.
pub fn file_complexity(source: &str, lang: Language) -> Option<f64> {
    let opener = function_opener(lang);
    let mut units: Vec<usize> = Vec::new();
    let mut current: Option<usize> = if opener.is_none() { Some(0) } else { None };

    for raw in source.lines() {
        let line = strip_line_comment(raw, lang);
        if let Some(re) = opener {
            if re.is_match(line) {
                if let Some(done) = current.take() {
                    units.push(done);
                }
                current = Some(0);
            }
        }
        if let Some(count) = current.as_mut() {
            *count += decision_points(line, lang);
        }
    }
    if let Some(done) = current {
        units.push(done);
    }

    if units.is_empty() {
        return None;
    }
    let total: usize = units.iter().map(|points| points + 1).sum();
    Some(total as f64 / units.len() as f64)
}

/// Whole-file decision complexity: 1 plus every decision point, module
/// level included. Feeds the maintainability index.
pub fn total_complexity(source: &str, lang: Language) -> usize {
    1 + source
        .lines()
        .map(|raw| decision_points(strip_line_comment(raw, lang), lang))
        .sum::<usize>()
}

/// Per-file average complexity over `paths`, worst first.
pub fn files_complexity(paths: &[PathBuf], ignore: Option<&Regex>) -> Vec<(String, f64)> {
    let mut data: Vec<(String, f64)> = Vec::new();
    for path in collect_sources(paths, ignore) {
        let Some(lang) = Language::from_path(&path) else {
            continue;
        };
        let Some(source) = read_source(&path) else {
            continue;
        };
        if let Some(score) = file_complexity(&source, lang) {
            data.push((path.to_string_lossy().into_owned(), score));
        }
    }
    data.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    data
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! Raw line counting: physical lines and non-blank source lines.

use std::path::PathBuf;

use regex::Regex;

use crate::analyzers::source::{collect_sources, read_source, strip_line_comment, Language};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawCounts {
    /// Physical lines.
    pub loc: usize,
    /// Lines that still hold code once comments and blanks are dropped.
    pub sloc: usize,
}

pub fn count_raw(source: &str, lang: Language) -> RawCounts {
    let mut counts = RawCounts::default();
    for raw in source.lines() {
        counts.loc += 1;
        if !strip_line_comment(raw, lang).trim().is_empty() {
            counts.sloc += 1;
        }
    }
    counts
}

/// Per-file physical line counts over `paths`, longest first.
pub fn files_line_count(paths: &[PathBuf], ignore: Option<&Regex>) -> Vec<(String, usize)> {
    let mut data: Vec<(String, usize)> = Vec::new();
    for path in collect_sources(paths, ignore) {
        let Some(lang) = Language::from_path(&path) else {
            continue;
        };
        let Some(source) = read_source(&path) else {
            continue;
        };
        data.push((
            path.to_string_lossy().into_owned(),
            count_raw(&source, lang).loc,
        ));
    }
    data.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    data
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_counts_physical_and_source_lines() {
        let source = indoc! {"
            import os

            # configuration
            DEBUG = True
        "};
        let counts = count_raw(source, Language::Python);
        assert_eq!(counts.loc, 4);
        assert_eq!(counts.sloc, 2, "blank and comment-only lines are not source");
    }

    #[test]
    fn test_trailing_comment_line_still_counts_as_source() {
        let counts = count_raw("x = 1  # set\n", Language::Python);
        assert_eq!(counts.loc, 1);
        assert_eq!(counts.sloc, 1);
    }

    #[test]
    fn test_empty_source_counts_zero() {
        assert_eq!(count_raw("", Language::Python), RawCounts::default());
    }

    #[test]
    fn test_unreadable_file_skipped_rest_still_counted() {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path();
        fs::write(dir.join("good.py"), "x = 1\ny = 2\n").expect("fixture file");
        fs::write(dir.join("bad.py"), b"\xff\xfe").expect("fixture file");

        let data = files_line_count(&[dir.to_path_buf()], None);
        assert_eq!(data.len(), 1, "the unreadable file is dropped from the report");
        assert!(data[0].0.ends_with("good.py"));
        assert_eq!(data[0].1, 2);
    }
}

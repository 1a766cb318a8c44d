//! Maintainability-index harvesting, on the 0..=100 scale.
//!
//! `MI = (171 - 5.2*ln(V) - 0.23*G - 16.2*ln(L)) * 100 / 171`, clamped,
//! where V is Halstead volume, G whole-file decision complexity, and L the
//! count of non-blank source lines. Higher is easier to maintain.

use std::collections::HashSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzers::complexity;
use crate::analyzers::loc;
use crate::analyzers::source::{collect_sources, read_source, strip_line_comment, Language};

/// Halstead base counts from a lightweight token scan. Identifier-shaped
/// tokens are operands; the symbol runs between them are operators.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Halstead {
    pub distinct_operators: usize,
    pub distinct_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
}

impl Halstead {
    /// `V = N * log2(n)`; zero for an empty vocabulary.
    pub fn volume(&self) -> f64 {
        let vocabulary = (self.distinct_operators + self.distinct_operands) as f64;
        let length = (self.total_operators + self.total_operands) as f64;
        if vocabulary <= 0.0 {
            0.0
        } else {
            length * vocabulary.log2()
        }
    }
}

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|\d[\dA-Za-z_.]*").unwrap());

pub fn halstead(source: &str, lang: Language) -> Halstead {
    let mut operators: HashSet<String> = HashSet::new();
    let mut operands: HashSet<String> = HashSet::new();
    let mut counts = Halstead::default();

    let mut record_operators = |chunk: &str, counts: &mut Halstead| {
        for op in chunk.split_whitespace() {
            counts.total_operators += 1;
            operators.insert(op.to_string());
        }
    };

    for raw in source.lines() {
        let line = strip_line_comment(raw, lang);
        let mut last = 0;
        for m in WORD.find_iter(line) {
            record_operators(&line[last..m.start()], &mut counts);
            counts.total_operands += 1;
            operands.insert(m.as_str().to_string());
            last = m.end();
        }
        record_operators(&line[last..], &mut counts);
    }

    counts.distinct_operators = operators.len();
    counts.distinct_operands = operands.len();
    counts
}

/// Maintainability index for one source text.
pub fn maintainability_index(source: &str, lang: Language) -> f64 {
    let volume = halstead(source, lang).volume().max(1.0);
    let decisions = complexity::total_complexity(source, lang) as f64;
    let sloc = loc::count_raw(source, lang).sloc.max(1) as f64;
    let mi = (171.0 - 5.2 * volume.ln() - 0.23 * decisions - 16.2 * sloc.ln()) * 100.0 / 171.0;
    mi.clamp(0.0, 100.0)
}

/// Per-file maintainability over `paths`, hardest to maintain first.
pub fn files_maintainability(paths: &[PathBuf], ignore: Option<&Regex>) -> Vec<(String, f64)> {
    let mut data: Vec<(String, f64)> = Vec::new();
    for path in collect_sources(paths, ignore) {
        let Some(lang) = Language::from_path(&path) else {
            continue;
        };
        let Some(source) = read_source(&path) else {
            continue;
        };
        data.push((
            path.to_string_lossy().into_owned(),
            maintainability_index(&source, lang),
        ));
    }
    data.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    data
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_halstead_counts_operands_and_operators() {
        let counts = halstead("x = y + 1\n", Language::Python);
        assert_eq!(counts.total_operands, 3, "x, y, 1");
        assert_eq!(counts.total_operators, 2, "= and +");
        assert_eq!(counts.distinct_operands, 3);
        assert_eq!(counts.distinct_operators, 2);
    }

    #[test]
    fn test_halstead_deduplicates_distinct_counts() {
        let counts = halstead("x = x + x\n", Language::Python);
        assert_eq!(counts.total_operands, 3);
        assert_eq!(counts.distinct_operands, 1, "x repeated is one operand");
    }

    #[test]
    fn test_volume_grows_with_length() {
        let small = halstead("a = 1\n", Language::Python).volume();
        let large = halstead(
            "a = 1\nb = a + 2\nc = b * a - 4\nd = c / b + a\n",
            Language::Python,
        )
        .volume();
        assert!(large > small, "more tokens must mean more volume");
        assert!(small > 0.0);
    }

    #[test]
    fn test_empty_source_has_zero_volume() {
        assert_eq!(halstead("", Language::Python).volume(), 0.0);
    }

    #[test]
    fn test_index_stays_on_scale() {
        let trivial = maintainability_index("x = 1\n", Language::Python);
        assert!((0.0..=100.0).contains(&trivial));

        let dense: String = (0..200)
            .map(|i| format!("if v{i} and v{} or flag{i}:\n    w{i} = v{i} + {i}\n", i + 1))
            .collect();
        let hard = maintainability_index(&dense, Language::Python);
        assert!((0.0..=100.0).contains(&hard));
        assert!(
            hard < trivial,
            "dense branchy code should rate below a one-liner ({hard} vs {trivial})"
        );
    }

    #[test]
    fn test_empty_file_rates_near_the_top() {
        let mi = maintainability_index("", Language::Python);
        assert!(mi > 90.0, "nothing to maintain should rate high, got {mi}");
    }

    #[test]
    fn test_index_penalizes_decisions() {
        let flat = indoc! {"
            def f(a):
                return a
        "};
        let branchy = indoc! {"
            def f(a):
                if a and a > 0 or a < -10:
                    return a
                elif a == 0:
                    return 0
                return -a
        "};
        let flat_mi = maintainability_index(flat, Language::Python);
        let branchy_mi = maintainability_index(branchy, Language::Python);
        assert!(
            branchy_mi < flat_mi,
            "decisions must lower the index ({branchy_mi} vs {flat_mi})"
        );
    }
}

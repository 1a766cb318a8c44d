//! Shared plumbing for the harvesters: language detection, comment
//! stripping, and source-tree collection.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    Ruby,
    CSharp,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "py" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            "js" | "jsx" | "mjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            "cc" | "cpp" | "cxx" | "hpp" => Some(Language::Cpp),
            "rb" => Some(Language::Ruby),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    /// Line-comment opener used when stripping comments.
    pub fn line_comment(&self) -> &'static str {
        match self {
            Language::Python | Language::Ruby => "#",
            _ => "//",
        }
    }
}

/// Drops everything from the line-comment opener on. Quote-aware enough
/// for counting: an opener inside a string literal is left alone, though
/// escape sequences are not tracked.
pub fn strip_line_comment(line: &str, lang: Language) -> &str {
    let opener = lang.line_comment();
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ if !in_single && !in_double && line[i..].starts_with(opener) => {
                return &line[..i];
            }
            _ => {}
        }
    }
    line
}

/// Expands files and directories into analyzable source paths, sorted.
///
/// Hidden directories are pruned during the walk. `ignore` drops any path
/// it matches, and unrecognized extensions are skipped.
pub fn collect_sources(paths: &[PathBuf], ignore: Option<&Regex>) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    for root in paths {
        if root.is_file() {
            if Language::from_path(root).is_some() && !is_ignored(root, ignore) {
                sources.push(root.clone());
            }
            continue;
        }
        let walk = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| !is_hidden_dir(entry));
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("walk: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if Language::from_path(path).is_none() || is_ignored(path, ignore) {
                continue;
            }
            sources.push(path.to_path_buf());
        }
    }
    sources.sort();
    sources
}

/// Reads a source file, logging and skipping on failure so one unreadable
/// file never sinks a whole report.
pub fn read_source(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("skipping {}: {e}", path.display());
            None
        }
    }
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_ignored(path: &Path, ignore: Option<&Regex>) -> bool {
    ignore.is_some_and(|re| re.is_match(&path.to_string_lossy()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

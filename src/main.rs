use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

use code_metrics::analyzers::{self, complexity, loc, maintainability};
use code_metrics::bugscore::{self, FileScore};
use code_metrics::confluence::ConfluenceSpace;
use code_metrics::error::MetricsError;
use code_metrics::format::{as_table, TableFormat};
use code_metrics::git::{tags, GitRepo};
use code_metrics::lint;
use code_metrics::tracker::jira::JiraClient;

const BUG_SCORE_HEADERS: [&str; 4] = ["No of tickets", "Tickets", "Score", "File changed"];

#[derive(Parser, Debug)]
#[command(
    name = "code-metrics",
    about = "Code-quality metrics and bug-history correlation reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank files by bug-fix pressure across a commit range.
    ///
    /// Walks FROM..TO, keeps commits whose message leads with a ticket key,
    /// asks the issue tracker which of those tickets are confirmed defects,
    /// and totals changed-line weight per touched file. Needs JIRA_URL,
    /// JIRA_USER, JIRA_PASSWORD, and JIRA_PROJECT_ID.
    BugScore {
        /// Range start, exclusive (tag, branch, or sha).
        from: String,
        /// Range end, inclusive (tag, branch, or sha).
        to: String,
        /// Git working-tree directory.
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Regex of file paths to leave out of the report.
        #[arg(long)]
        ignore: Option<String>,
        /// Output table format.
        #[arg(long, value_enum, default_value = "csv")]
        fmt: TableFormat,
    },

    /// List the distinct ticket keys referenced across a commit range.
    JiraTickets {
        /// Range start, exclusive.
        from: String,
        /// Range end, inclusive.
        to: String,
        /// Git working-tree directory.
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Per-file cyclomatic complexity, worst first.
    FilesComplexity {
        /// Files or directories to analyze.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Regex of file paths to skip.
        #[arg(long)]
        ignore: Option<String>,
        /// Show only the first N rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Output table format.
        #[arg(long, value_enum, default_value = "csv")]
        fmt: TableFormat,
    },

    /// Per-file maintainability index (0-100), hardest first.
    FilesMaintainability {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        ignore: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "csv")]
        fmt: TableFormat,
    },

    /// Per-file physical line counts, longest first.
    FilesLineCount {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        ignore: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "csv")]
        fmt: TableFormat,
    },

    /// Average cyclomatic complexity across every analyzed file.
    AverageComplexity {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        ignore: Option<String>,
    },

    /// Average maintainability index across every analyzed file.
    AverageMaintainability {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        ignore: Option<String>,
    },

    /// Average physical line count across every analyzed file.
    AverageLineCount {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        ignore: Option<String>,
    },

    /// Run an external linter and print its overall rating.
    LintScore {
        /// Paths handed to the linter verbatim.
        #[arg(required = true)]
        paths: Vec<String>,
        /// Linter executable to run.
        #[arg(long, default_value = "pylint")]
        lint_cmd: String,
        /// Configuration file passed as --rcfile.
        #[arg(long)]
        rcfile: Option<String>,
    },

    /// List version tags, newest first.
    RecentTags {
        /// Git working-tree directory.
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },

    /// Build the bug-score report and publish it to a wiki page.
    ///
    /// Renders the report as HTML and creates or updates the titled page in
    /// the configured Confluence space. Needs the JIRA_* variables plus
    /// CONFLUENCE_URL, CONFLUENCE_USER, CONFLUENCE_PASSWORD, and
    /// CONFLUENCE_SPACE.
    Publish {
        /// Range start, exclusive.
        from: String,
        /// Range end, inclusive.
        to: String,
        /// Title of the wiki page to create or update.
        #[arg(long)]
        title: String,
        /// Page id to create the page under, if it does not exist yet.
        #[arg(long)]
        parent: Option<String>,
        /// Git working-tree directory.
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Regex of file paths to leave out of the report.
        #[arg(long)]
        ignore: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), MetricsError> {
    match command {
        Commands::BugScore {
            from,
            to,
            path,
            ignore,
            fmt,
        } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let tracker = JiraClient::from_env()?;
            let repo = GitRepo::open(&path)?;

            let spinner = start_spinner(format!("Correlating {from}..{to} with the tracker"));
            let result = bugscore::bug_score(&repo, &tracker, &from, &to, ignore.as_ref());
            spinner.finish_and_clear();

            let records = result?;
            print!(
                "{}",
                as_table(&BUG_SCORE_HEADERS, &bug_score_rows(&records), fmt)
            );
            Ok(())
        }

        Commands::JiraTickets { from, to, path } => {
            let tracker = JiraClient::from_env()?;
            let repo = GitRepo::open(&path)?;
            let commits = bugscore::ticket_commits(&repo, &tracker, &from, &to)?;
            let tickets: BTreeSet<String> = commits.into_values().collect();
            if !tickets.is_empty() {
                println!("{}", tickets.into_iter().collect::<Vec<_>>().join(" "));
            }
            Ok(())
        }

        Commands::FilesComplexity {
            paths,
            ignore,
            limit,
            fmt,
        } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = complexity::files_complexity(&paths, ignore.as_ref());
            print!(
                "{}",
                as_table(
                    &["File", "Complexity score"],
                    &metric_rows(data, limit),
                    fmt
                )
            );
            Ok(())
        }

        Commands::FilesMaintainability {
            paths,
            ignore,
            limit,
            fmt,
        } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = maintainability::files_maintainability(&paths, ignore.as_ref());
            print!(
                "{}",
                as_table(
                    &["File", "Maintainability score"],
                    &metric_rows(data, limit),
                    fmt
                )
            );
            Ok(())
        }

        Commands::FilesLineCount {
            paths,
            ignore,
            limit,
            fmt,
        } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = loc::files_line_count(&paths, ignore.as_ref());
            print!(
                "{}",
                as_table(
                    &["File", "Physical lines of code"],
                    &count_rows(data, limit),
                    fmt
                )
            );
            Ok(())
        }

        Commands::AverageComplexity { paths, ignore } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = complexity::files_complexity(&paths, ignore.as_ref());
            let values: Vec<f64> = data.into_iter().map(|(_, value)| value).collect();
            println!("{:.2}", analyzers::average(&values));
            Ok(())
        }

        Commands::AverageMaintainability { paths, ignore } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = maintainability::files_maintainability(&paths, ignore.as_ref());
            let values: Vec<f64> = data.into_iter().map(|(_, value)| value).collect();
            println!("{:.2}", analyzers::average(&values));
            Ok(())
        }

        Commands::AverageLineCount { paths, ignore } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let data = loc::files_line_count(&paths, ignore.as_ref());
            let values: Vec<f64> = data.into_iter().map(|(_, value)| value as f64).collect();
            println!("{:.2}", analyzers::average(&values));
            Ok(())
        }

        Commands::LintScore {
            paths,
            lint_cmd,
            rcfile,
        } => {
            let score = lint::lint_score(&lint_cmd, &paths, rcfile.as_deref())?;
            println!("{score:.2}");
            Ok(())
        }

        Commands::RecentTags { path } => {
            let repo = GitRepo::open(&path)?;
            let names = tags::recent_tag_names(repo.workdir())?;
            if !names.is_empty() {
                println!("{}", names.join(" "));
            }
            Ok(())
        }

        Commands::Publish {
            from,
            to,
            title,
            parent,
            path,
            ignore,
        } => {
            let ignore = compile_ignore(ignore.as_deref())?;
            let tracker = JiraClient::from_env()?;
            let space = ConfluenceSpace::from_env()?;
            let repo = GitRepo::open(&path)?;

            let spinner = start_spinner(format!("Correlating {from}..{to} with the tracker"));
            let result = bugscore::bug_score(&repo, &tracker, &from, &to, ignore.as_ref());
            spinner.finish_and_clear();
            let records = result?;

            let table = as_table(
                &BUG_SCORE_HEADERS,
                &bug_score_rows(&records),
                TableFormat::Html,
            );
            let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
            let content = format!("{table}<p>Generated at {generated}</p>");

            let spinner = start_spinner(format!("Publishing '{title}'"));
            let result = space.publish(&title, parent.as_deref(), &content);
            spinner.finish_and_clear();
            let page_id = result?;

            eprintln!(
                "{} page {page_id} now holds {} file records",
                "✓".green(),
                records.len()
            );
            Ok(())
        }
    }
}

fn compile_ignore(pattern: Option<&str>) -> Result<Option<Regex>, MetricsError> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|e| {
                MetricsError::configuration(format!("invalid ignore pattern '{p}': {e}"))
            })
        })
        .transpose()
}

fn bug_score_rows(records: &[FileScore]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            vec![
                record.ticket_count().to_string(),
                record.ticket_names(),
                record.changes_score.to_string(),
                record.file.clone(),
            ]
        })
        .collect()
}

fn metric_rows(data: Vec<(String, f64)>, limit: Option<usize>) -> Vec<Vec<String>> {
    data.into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(file, value)| vec![file, format!("{value:.2}")])
        .collect()
}

fn count_rows(data: Vec<(String, usize)>, limit: Option<usize>) -> Vec<Vec<String>> {
    data.into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(file, value)| vec![file, value.to_string()])
        .collect()
}

/// Progress spinner on stderr; stdout stays clean for piping.
fn start_spinner(msg: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(msg);
    spinner
}

// ─── Tests ────────────────────────────────────────────────────────────────────

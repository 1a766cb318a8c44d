//! Table rendering for reports: CSV, text-table presets, and HTML.

use clap::ValueEnum;
use comfy_table::{presets, Table};

/// Output shapes a report table can take. `Csv` is the pipeline-friendly
/// default; the text presets are for humans; `Html` feeds the wiki.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Csv,
    Plain,
    Simple,
    Grid,
    #[value(alias = "fancy_grid")]
    FancyGrid,
    Pipe,
    Html,
}

/// Renders `rows` under `headers` in the requested format.
///
/// No rows renders as the empty string, so an empty report writes nothing
/// rather than a lonely header line.
pub fn as_table(headers: &[&str], rows: &[Vec<String>], format: TableFormat) -> String {
    if rows.is_empty() {
        return String::new();
    }
    match format {
        TableFormat::Csv => render_csv(headers, rows),
        TableFormat::Html => render_html(headers, rows),
        TableFormat::Plain => render_preset(presets::NOTHING, headers, rows),
        TableFormat::Simple => render_preset(presets::ASCII_HORIZONTAL_ONLY, headers, rows),
        TableFormat::Grid => render_preset(presets::ASCII_FULL, headers, rows),
        TableFormat::FancyGrid => render_preset(presets::UTF8_FULL, headers, rows),
        TableFormat::Pipe => render_preset(presets::ASCII_MARKDOWN, headers, rows),
    }
}

fn render_preset(preset: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(preset);
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    format!("{table}\n")
}

fn render_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(headers.iter().map(|h| h.to_string())));
    for row in rows {
        out.push_str(&csv_line(row.iter().cloned()));
    }
    out
}

fn csv_line(fields: impl Iterator<Item = String>) -> String {
    let mut line = fields.map(|f| csv_field(&f)).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

/// Quotes a field when it contains a delimiter, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render_html(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table>\n<thead>\n<tr>");
    for header in headers {
        out.push_str(&format!("<th>{}</th>", html_escape(header)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", html_escape(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

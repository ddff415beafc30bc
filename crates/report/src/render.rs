//! Page assembly and output renderers.

use crate::table::{IpoTable, StatusTabs, TableView, Tone, COLUMNS};
use ipo_core::{DisplayConfig, Error, LifecycleStatus, Result};
use ipo_ingestion::CategorizedIpos;
use serde::Serialize;
use std::fmt::Write;
use std::str::FromStr;

const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl FromStr for RenderFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(RenderFormat::Text),
            "html" => Ok(RenderFormat::Html),
            "json" => Ok(RenderFormat::Json),
            other => Err(Error::config(format!("unknown output format '{}'", other))),
        }
    }
}

/// Everything shown for one load: banner, tabs and tables.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Load failure banner.
    pub error: Option<String>,
    /// A load is still outstanding.
    pub loading: bool,
    pub tabs: StatusTabs,
    /// One table for the active status, or all three when none is active.
    pub tables: Vec<TableView>,
}

impl Page {
    /// Assemble a page. `active` of `None` shows every bucket.
    ///
    /// `loading` marks a load still in flight; `categorized` then holds the
    /// previous result, if any.
    pub fn build(
        categorized: &CategorizedIpos,
        active: Option<LifecycleStatus>,
        error: Option<String>,
        loading: bool,
        config: &DisplayConfig,
    ) -> Self {
        let statuses: Vec<LifecycleStatus> = match active {
            Some(status) => vec![status],
            None => LifecycleStatus::ALL.to_vec(),
        };
        let tables = statuses
            .into_iter()
            .map(|status| IpoTable::build(categorized.bucket(status), status, config))
            .collect();

        Self {
            error,
            loading,
            tabs: StatusTabs::new(categorized, active),
            tables,
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: RenderFormat, color: bool) -> Result<String> {
        match format {
            RenderFormat::Text => Ok(TextRenderer { color }.render(self)),
            RenderFormat::Html => Ok(HtmlRenderer.render(self)),
            RenderFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Fixed-width terminal output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    /// Colour GMP cells with ANSI codes.
    pub color: bool,
}

impl TextRenderer {
    pub fn render(&self, page: &Page) -> String {
        let mut out = String::new();

        if let Some(error) = &page.error {
            let _ = writeln!(out, "! {}", error);
            out.push('\n');
        }
        if page.loading {
            let _ = writeln!(out, "Loading IPOs...");
        }

        let tabs: Vec<String> = page
            .tabs
            .tabs
            .iter()
            .map(|t| if t.active { format!("[{}]", t.label()) } else { t.label() })
            .collect();
        let _ = writeln!(out, "{}", tabs.join("  "));

        for table in &page.tables {
            out.push('\n');
            self.render_table(&mut out, table);
        }

        out
    }

    fn render_table(&self, out: &mut String, table: &TableView) {
        let _ = writeln!(out, "== {} ==", table.status());

        let rows = match table {
            TableView::Empty { message, .. } => {
                let _ = writeln!(out, "{}", message);
                return;
            }
            TableView::Rows { rows, .. } => rows,
        };

        let cells: Vec<[String; 6]> = rows.iter().map(|r| r.cells()).collect();
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        let _ = writeln!(out, "{}", header.join(" | ").trim_end());
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));

        for (row, cells) in rows.iter().zip(cells.iter()) {
            let line: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, w))| {
                    let padded = format!("{:<w$}", cell, w = *w);
                    if i == 4 {
                        self.paint(padded, row.tone)
                    } else {
                        padded
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", line.join(" | ").trim_end());
        }
    }

    fn paint(&self, text: String, tone: Tone) -> String {
        if !self.color {
            return text;
        }
        match tone {
            Tone::Positive => format!("{}{}{}", ANSI_GREEN, text, ANSI_RESET),
            Tone::Negative => format!("{}{}{}", ANSI_RED, text, ANSI_RESET),
            Tone::Neutral => text,
        }
    }
}

/// Standalone HTML fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render(&self, page: &Page) -> String {
        let mut out = String::new();
        out.push_str("<div class=\"ipo-page\">\n");

        if let Some(error) = &page.error {
            let _ = writeln!(out, "<div class=\"ipo-error\" role=\"alert\">{}</div>", escape_html(error));
        }
        if page.loading {
            out.push_str("<div class=\"ipo-loading\">Loading IPOs...</div>\n");
        }

        out.push_str("<ul class=\"ipo-tabs\">\n");
        for tab in &page.tabs.tabs {
            let class = if tab.active { " class=\"active\"" } else { "" };
            let _ = writeln!(out, "<li{}>{}</li>", class, escape_html(&tab.label()));
        }
        out.push_str("</ul>\n");

        for table in &page.tables {
            self.render_table(&mut out, table);
        }

        out.push_str("</div>\n");
        out
    }

    fn render_table(&self, out: &mut String, table: &TableView) {
        let status = table.status().label().to_ascii_lowercase();
        let rows = match table {
            TableView::Empty { message, .. } => {
                let _ = writeln!(out, "<p class=\"ipo-empty\" data-status=\"{}\">{}</p>", status, escape_html(message));
                return;
            }
            TableView::Rows { rows, .. } => rows,
        };

        let _ = writeln!(out, "<table class=\"ipo-table\" data-status=\"{}\">", status);
        out.push_str("<thead><tr>");
        for column in COLUMNS {
            let _ = write!(out, "<th>{}</th>", escape_html(column));
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        for row in rows {
            let gmp_class = match row.tone {
                Tone::Positive => " class=\"gmp-positive\"",
                Tone::Negative => " class=\"gmp-negative\"",
                Tone::Neutral => "",
            };
            let _ = write!(
                out,
                "<tr><td>{}<br><small>{}</small></td>",
                escape_html(&row.company),
                escape_html(&row.kind)
            );
            for cell in [&row.dates, &row.issue_price, &row.issue_size] {
                let _ = write!(out, "<td>{}</td>", escape_html(cell));
            }
            let _ = write!(
                out,
                "<td{}>{}<br><small>est. {}</small></td>",
                gmp_class,
                escape_html(&row.gmp),
                escape_html(&row.estimated_price)
            );
            let _ = writeln!(out, "<td>{}</td></tr>", escape_html(&row.gain));
        }

        out.push_str("</tbody>\n</table>\n");
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

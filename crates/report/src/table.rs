//! Table view model for one lifecycle bucket, plus the status tabs.
//!
//! The view model holds display-ready strings only. Renderers lay it out but
//! never format numbers themselves.

use crate::format::ValueFormatter;
use ipo_core::{CanonicalIpoRecord, DisplayConfig, LifecycleStatus};
use ipo_ingestion::CategorizedIpos;
use serde::Serialize;

/// Column headers in display order.
pub const COLUMNS: [&str; 6] = [
    "Company/Type",
    "Dates",
    "Issue Price",
    "Issue Size",
    "GMP",
    "Est. Gain %",
];

/// Visual sentiment of a GMP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// GMP at or above zero.
    Positive,
    /// GMP below zero.
    Negative,
    /// No usable GMP.
    Neutral,
}

impl Tone {
    /// Tone for a GMP value. Non-finite values are neutral.
    pub fn of_gmp(gmp: Option<f64>) -> Self {
        match gmp {
            Some(g) if g.is_finite() && g < 0.0 => Tone::Negative,
            Some(g) if g.is_finite() => Tone::Positive,
            _ => Tone::Neutral,
        }
    }
}

/// One status tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub status: LifecycleStatus,
    pub count: usize,
    pub active: bool,
}

impl Tab {
    /// Label with count, e.g. `Open (3)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.status.label(), self.count)
    }
}

/// The three status tabs, always all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTabs {
    pub tabs: [Tab; 3],
}

impl StatusTabs {
    /// Build tabs from categorized records. `active` of `None` marks no tab.
    pub fn new(categorized: &CategorizedIpos, active: Option<LifecycleStatus>) -> Self {
        let tabs = categorized.counts().map(|(status, count)| Tab {
            status,
            count,
            active: active == Some(status),
        });
        Self { tabs }
    }

    /// The active tab, if any.
    pub fn active(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }
}

/// Display-ready cells for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub company: String,
    pub kind: String,
    /// `open – close`.
    pub dates: String,
    pub issue_price: String,
    pub issue_size: String,
    pub gmp: String,
    pub estimated_price: String,
    pub gain: String,
    pub tone: Tone,
}

impl TableRow {
    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 6] {
        [
            format!("{} ({})", self.company, self.kind),
            self.dates.clone(),
            self.issue_price.clone(),
            self.issue_size.clone(),
            self.gmp_cell(),
            self.gain.clone(),
        ]
    }

    /// GMP with the estimated listing price.
    pub fn gmp_cell(&self) -> String {
        format!("{} (est. {})", self.gmp, self.estimated_price)
    }
}

/// Rendered form of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableView {
    /// No records for the status.
    Empty {
        status: LifecycleStatus,
        message: String,
    },
    Rows {
        status: LifecycleStatus,
        rows: Vec<TableRow>,
    },
}

impl TableView {
    pub fn status(&self) -> LifecycleStatus {
        match self {
            TableView::Empty { status, .. } | TableView::Rows { status, .. } => *status,
        }
    }

    /// Number of rows (zero when empty).
    pub fn len(&self) -> usize {
        match self {
            TableView::Empty { .. } => 0,
            TableView::Rows { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds table views.
pub struct IpoTable;

impl IpoTable {
    /// Message shown when a bucket has no records.
    pub fn empty_message(status: LifecycleStatus) -> String {
        format!("No {} IPOs are currently available", status.label())
    }

    /// Build the view for `records` in bucket `status`.
    pub fn build(records: &[CanonicalIpoRecord], status: LifecycleStatus, config: &DisplayConfig) -> TableView {
        if records.is_empty() {
            return TableView::Empty {
                status,
                message: Self::empty_message(status),
            };
        }

        let formatter = ValueFormatter::new(config);
        let rows: Vec<TableRow> = records.iter().map(|r| Self::row(r, &formatter)).collect();
        tracing::debug!(status = %status, rows = rows.len(), "built IPO table");

        TableView::Rows { status, rows }
    }

    fn row(record: &CanonicalIpoRecord, fmt: &ValueFormatter) -> TableRow {
        TableRow {
            company: record.name.clone(),
            kind: record.kind.clone(),
            dates: format!("{} – {}", fmt.date(&record.open_date), fmt.date(&record.close_date)),
            issue_price: fmt.currency(record.issue_price),
            issue_size: fmt.count(record.issue_size),
            gmp: fmt.currency(record.gmp),
            estimated_price: fmt.currency(record.estimated_price),
            gain: fmt.percent(record.gain_percentage),
            tone: Tone::of_gmp(record.gmp),
        }
    }
}

//! Presentation of categorized IPO records.
//!
//! This crate provides:
//! - Value formatting (currency with Indian digit grouping, percent, dates)
//! - GMP tone, status tabs and the per-bucket table view model
//! - Text, HTML and JSON page renderers

pub mod format;
pub mod render;
pub mod table;

pub use format::ValueFormatter;
pub use render::{HtmlRenderer, Page, RenderFormat, TextRenderer};
pub use table::{IpoTable, StatusTabs, Tab, TableRow, TableView, Tone};

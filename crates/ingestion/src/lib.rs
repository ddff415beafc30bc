//! Data ingestion and normalization for the IPO watch system.
//!
//! This crate handles:
//! - Locale-formatted number and scraped date parsing
//! - Raw record normalization (field fallbacks, pipe-delimited summaries)
//! - Lifecycle classification (Upcoming / Open / Closed)

pub mod classifier;
pub mod normalizer;
pub mod parsing;

pub use classifier::{categorize, CategorizedIpos, ClassificationStats, LifecycleClassifier};
pub use normalizer::{normalize, IpoNormalizer, NormalizationStats};
pub use parsing::{parse_date_ms, parse_locale_number};

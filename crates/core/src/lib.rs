//! Core types and configuration for the IPO watch system.
//!
//! This crate provides shared types used across all other crates:
//! - Raw feed records and canonical IPO records
//! - Lifecycle status
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{ClassificationRule, Config, DisplayConfig, FeedConfig};
pub use error::{Error, Result};
pub use types::*;

//! IPO feed access for the IPO watch system.
//!
//! This crate provides:
//! - The `IpoSource` trait with HTTP and seed-file implementations
//! - Payload decoding (bare array or `data` envelope)
//! - Retry with exponential backoff
//! - Load state with a stale-response guard

pub mod http;
pub mod payload;
pub mod retry;
pub mod source;
pub mod store;

pub use http::HttpIpoSource;
pub use payload::decode_payload;
pub use retry::RetryPolicy;
pub use source::{FallbackSource, Fetched, IpoSource, SeedIpoSource};
pub use store::{IpoStore, LoadOutcome, LoadPhase, LoadState, LoadTicket};

//! IPO record sources.
//!
//! A source yields raw records; it knows nothing about normalization. The
//! seed dataset is just another source, injected where a fallback is wanted.

use crate::payload::{decode_payload, decode_payload_bytes};
use async_trait::async_trait;
use ipo_core::{Error, RawIpoRecord, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Anything that can produce raw IPO records.
#[async_trait]
pub trait IpoSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Fetch the current list of records. An empty list is a valid result.
    async fn fetch(&self) -> Result<Vec<RawIpoRecord>>;
}

/// Static dataset held in memory.
#[derive(Debug, Clone)]
pub struct SeedIpoSource {
    label: String,
    records: Vec<RawIpoRecord>,
}

impl SeedIpoSource {
    /// Wrap already-decoded records.
    pub fn from_records(label: impl Into<String>, records: Vec<RawIpoRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    /// Build from a JSON payload (bare array or `data` envelope).
    pub fn from_value(label: impl Into<String>, payload: Value) -> Self {
        Self::from_records(label, decode_payload(payload))
    }

    /// Load a JSON seed file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let records = decode_payload_bytes(&bytes)
            .map_err(|e| Error::config(format!("seed file {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), records = records.len(), "loaded seed dataset");
        Ok(Self::from_records(format!("seed:{}", path.display()), records))
    }

    /// Number of records in the dataset.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl IpoSource for SeedIpoSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<RawIpoRecord>> {
        Ok(self.records.clone())
    }
}

/// Records fetched in one cycle, and where they came from.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub records: Vec<RawIpoRecord>,
    /// The primary failed and these records came from the seed.
    pub from_seed: bool,
    /// Why the primary failed, when it did.
    pub primary_error: Option<String>,
}

/// A primary source with an optional seed to fall back on.
#[derive(Clone)]
pub struct FallbackSource {
    primary: Arc<dyn IpoSource>,
    seed: Option<Arc<dyn IpoSource>>,
}

impl FallbackSource {
    /// Use `primary` with no fallback.
    pub fn new(primary: Arc<dyn IpoSource>) -> Self {
        Self { primary, seed: None }
    }

    /// Fall back to `seed` when the primary fails.
    pub fn with_seed(mut self, seed: Arc<dyn IpoSource>) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Whether a seed is configured.
    pub fn has_seed(&self) -> bool {
        self.seed.is_some()
    }

    /// Fetch from the primary, falling back to the seed on failure.
    ///
    /// Errors only when the primary fails and there is no usable seed; the
    /// returned error is the primary's.
    pub async fn fetch(&self) -> Result<Fetched> {
        let primary_err = match self.primary.fetch().await {
            Ok(records) => {
                tracing::info!(source = self.primary.name(), records = records.len(), "fetched IPO records");
                return Ok(Fetched {
                    records,
                    from_seed: false,
                    primary_error: None,
                });
            }
            Err(e) => e,
        };

        tracing::warn!(source = self.primary.name(), error = %primary_err, "IPO feed failed");

        let Some(seed) = &self.seed else {
            return Err(primary_err);
        };

        match seed.fetch().await {
            Ok(records) => {
                tracing::info!(source = seed.name(), records = records.len(), "using seed IPO records");
                Ok(Fetched {
                    records,
                    from_seed: true,
                    primary_error: Some(primary_err.to_string()),
                })
            }
            Err(seed_err) => {
                tracing::warn!(source = seed.name(), error = %seed_err, "seed dataset failed");
                Err(primary_err)
            }
        }
    }
}

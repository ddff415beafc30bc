//! Load state for the IPO list, with a guard against stale responses.
//!
//! Each load takes a ticket from a monotonically increasing generation
//! counter. A finished load is applied only if its ticket is still the newest,
//! so a slow, superseded request can never overwrite a newer result.

use crate::source::{FallbackSource, Fetched};
use ipo_core::{CanonicalIpoRecord, Result};
use ipo_ingestion::IpoNormalizer;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Where the current load is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is outstanding.
    Loading,
    /// Last load succeeded.
    Ready,
    /// Last load failed; `error` explains why.
    Failed,
}

/// Snapshot of the last completed load.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    pub phase: LoadPhase,
    /// Normalized records of the last applied load.
    pub records: Vec<CanonicalIpoRecord>,
    /// User-facing failure message.
    pub error: Option<String>,
    /// Records come from the seed dataset after a feed failure.
    pub from_seed: bool,
    /// Generation that produced this state.
    pub generation: u64,
}

impl LoadState {
    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

/// Handle for one load, obtained from [`IpoStore::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the stored state.
    Applied,
    /// A newer load had started; the result was discarded.
    Superseded,
}

/// Holds the result of the most recent load.
#[derive(Debug, Default)]
pub struct IpoStore {
    generation: AtomicU64,
    state: RwLock<LoadState>,
}

impl IpoStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Any load started earlier becomes stale.
    pub async fn begin(&self) -> LoadTicket {
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.phase = LoadPhase::Loading;
        LoadTicket { generation }
    }

    /// Whether `ticket` belongs to the newest load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Apply a fetch result if `ticket` is still current.
    ///
    /// Records are normalized here; nothing from a previous load survives.
    pub async fn finish(&self, ticket: LoadTicket, result: Result<Fetched>) -> LoadOutcome {
        let mut state = self.state.write().await;
        if !self.is_current(ticket) {
            tracing::warn!(
                generation = ticket.generation,
                current = self.generation.load(Ordering::SeqCst),
                "discarding superseded IPO load"
            );
            return LoadOutcome::Superseded;
        }

        *state = match result {
            Ok(fetched) => {
                let records = IpoNormalizer::new().normalize_batch(&fetched.records);
                match fetched.primary_error {
                    None => LoadState {
                        phase: LoadPhase::Ready,
                        records,
                        error: None,
                        from_seed: false,
                        generation: ticket.generation,
                    },
                    Some(reason) => LoadState {
                        phase: LoadPhase::Failed,
                        records,
                        error: Some(format!("failed to load live data, showing seed data: {}", reason)),
                        from_seed: fetched.from_seed,
                        generation: ticket.generation,
                    },
                }
            }
            Err(e) => LoadState {
                phase: LoadPhase::Failed,
                records: Vec::new(),
                error: Some(format!("failed to load IPO data: {}", e)),
                from_seed: false,
                generation: ticket.generation,
            },
        };

        tracing::info!(
            generation = ticket.generation,
            phase = ?state.phase,
            records = state.records.len(),
            "IPO load applied"
        );
        LoadOutcome::Applied
    }

    /// Run one complete load cycle against `source`.
    pub async fn load(&self, source: &FallbackSource) -> LoadOutcome {
        let ticket = self.begin().await;
        let result = source.fetch().await;
        self.finish(ticket, result).await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> LoadState {
        self.state.read().await.clone()
    }
}

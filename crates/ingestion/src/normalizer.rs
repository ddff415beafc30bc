//! Normalization of raw feed records into canonical IPO records.
//!
//! Applies field-name fallbacks, parses locale-formatted numbers and splits
//! the pipe-delimited `raw` summary. Never fails: anything unreadable becomes
//! `None` (numbers) or an empty string (dates).

use crate::parsing::{parse_locale_number, scalar_number};
use ipo_core::{CanonicalIpoRecord, RawIpoRecord, RawScalar};
use std::collections::HashSet;

/// Name used when a record carries neither `company` nor `name`.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Issue type used when a record has no `type`.
pub const DEFAULT_KIND: &str = "EQ";

/// Statistics about the last normalized batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Records processed.
    pub records: u64,
    /// Records whose id was derived from name and open date.
    pub derived_ids: u64,
    /// Ids that collided within the batch and were suffixed.
    pub deduplicated_ids: u64,
    /// Numeric fields present in the feed but unparseable.
    pub rejected_numbers: u64,
    /// Records whose `raw` summary had fewer than four segments.
    pub short_raw: u64,
}

impl NormalizationStats {
    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Segments pulled out of a `"<status> | <size> | <n> | <gain>"` summary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSummary {
    pub issue_size: Option<f64>,
    pub gain_percentage: Option<f64>,
    pub segments: usize,
}

impl RawSummary {
    /// Split a summary string. Short or malformed input yields `None` fields.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        let issue_size = if parts.len() >= 2 {
            parse_locale_number(Some(parts[1]))
        } else {
            None
        };
        let gain_percentage = if parts.len() >= 4 {
            parse_locale_number(Some(parts[3]))
        } else {
            None
        };

        Self {
            issue_size,
            gain_percentage,
            segments: parts.len(),
        }
    }
}

/// Converts raw feed records into canonical records.
#[derive(Debug, Default)]
pub struct IpoNormalizer {
    stats: NormalizationStats,
}

impl IpoNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a batch, preserving input order.
    ///
    /// Statistics describe this batch only.
    pub fn normalize_batch(&mut self, raw: &[RawIpoRecord]) -> Vec<CanonicalIpoRecord> {
        self.stats.reset();
        let mut seen_ids: HashSet<String> = HashSet::with_capacity(raw.len());
        let mut out = Vec::with_capacity(raw.len());

        for record in raw {
            let mut canonical = self.normalize_one(record);

            if seen_ids.contains(&canonical.id) {
                canonical.id = unique_id(&canonical.id, &seen_ids);
                self.stats.deduplicated_ids += 1;
            }
            seen_ids.insert(canonical.id.clone());
            out.push(canonical);
        }

        tracing::debug!(
            records = self.stats.records,
            derived_ids = self.stats.derived_ids,
            deduplicated_ids = self.stats.deduplicated_ids,
            rejected_numbers = self.stats.rejected_numbers,
            short_raw = self.stats.short_raw,
            "normalized IPO batch"
        );

        out
    }

    /// Normalize a single record. Ids are not deduplicated here.
    pub fn normalize_one(&mut self, record: &RawIpoRecord) -> CanonicalIpoRecord {
        self.stats.records += 1;

        let name = first_text(&[&record.company, &record.name])
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let kind = first_text(&[&record.kind]).unwrap_or_else(|| DEFAULT_KIND.to_string());
        let open_date = first_text(&[&record.issue_start, &record.open_date]).unwrap_or_default();
        let close_date = first_text(&[&record.issue_end, &record.close_date]).unwrap_or_default();
        let listing_date = first_text(&[&record.listing_date]).unwrap_or_default();

        let id = match first_text(&[&record.id]) {
            Some(id) => id,
            None => {
                self.stats.derived_ids += 1;
                format!("{}-{}", name, open_date)
            }
        };

        let summary = match &record.raw {
            Some(raw) => {
                let summary = RawSummary::parse(&raw.as_text());
                if summary.segments < 4 {
                    self.stats.short_raw += 1;
                }
                summary
            }
            None => RawSummary::default(),
        };

        let issue_price = self.number(&record.issue_price);
        let gmp = self.number(&record.gmp);
        let issue_size = summary.issue_size.or_else(|| self.number(&record.issue_size));
        let estimated_price = self
            .number(&record.estimated_price)
            .or_else(|| derive_estimated_price(issue_price, gmp));

        CanonicalIpoRecord {
            id,
            name,
            kind,
            open_date,
            close_date,
            listing_date,
            issue_price,
            issue_size,
            gmp,
            estimated_price,
            gain_percentage: summary.gain_percentage,
        }
    }

    /// Get statistics for the last batch.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    fn number(&mut self, field: &Option<RawScalar>) -> Option<f64> {
        let value = scalar_number(field.as_ref());
        if field.is_some() && value.is_none() {
            self.stats.rejected_numbers += 1;
        }
        value
    }
}

/// Normalize a batch with a throwaway normalizer.
pub fn normalize(raw: &[RawIpoRecord]) -> Vec<CanonicalIpoRecord> {
    IpoNormalizer::new().normalize_batch(raw)
}

/// First field holding non-blank text, trimmed.
fn first_text(fields: &[&Option<RawScalar>]) -> Option<String> {
    fields.iter().find_map(|field| {
        let text = field.as_ref()?.as_text();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn derive_estimated_price(issue_price: Option<f64>, gmp: Option<f64>) -> Option<f64> {
    let price = issue_price? + gmp?;
    price.is_finite().then_some(price)
}

fn unique_id(base: &str, seen: &HashSet<String>) -> String {
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

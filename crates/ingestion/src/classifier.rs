//! Lifecycle classification of canonical IPO records.
//!
//! Assigns every record to exactly one of Upcoming, Open or Closed based on
//! its subscription window and the supplied clock. Classification is
//! recomputed on every call; nothing about a record's status is stored.

use crate::parsing::parse_date_ms;
use ipo_core::{CanonicalIpoRecord, ClassificationRule, LifecycleStatus, TimestampMs};

/// Statistics about one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    /// Total records classified.
    pub total: u64,
    /// Records classified as Upcoming.
    pub upcoming: u64,
    /// Records classified as Open.
    pub open: u64,
    /// Records classified as Closed.
    pub closed: u64,
    /// Records sent to Upcoming because a window date did not parse.
    pub unparseable_dates: u64,
    /// Records closed early by a past listing date.
    pub closed_by_listing: u64,
}

impl ClassificationStats {
    /// Count for a given status.
    pub fn count(&self, status: LifecycleStatus) -> u64 {
        match status {
            LifecycleStatus::Upcoming => self.upcoming,
            LifecycleStatus::Open => self.open,
            LifecycleStatus::Closed => self.closed,
        }
    }

    fn record(&mut self, status: LifecycleStatus) {
        self.total += 1;
        match status {
            LifecycleStatus::Upcoming => self.upcoming += 1,
            LifecycleStatus::Open => self.open += 1,
            LifecycleStatus::Closed => self.closed += 1,
        }
    }
}

/// Why a record landed in its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Open or close date missing or unparseable.
    UnknownWindow,
    /// Listing date already passed.
    Listed,
    /// Decided by the open/close window.
    Window,
}

/// Records split into lifecycle buckets, each in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedIpos {
    pub upcoming: Vec<CanonicalIpoRecord>,
    pub open: Vec<CanonicalIpoRecord>,
    pub closed: Vec<CanonicalIpoRecord>,
    pub stats: ClassificationStats,
}

impl CategorizedIpos {
    /// Records in one bucket.
    pub fn bucket(&self, status: LifecycleStatus) -> &[CanonicalIpoRecord] {
        match status {
            LifecycleStatus::Upcoming => &self.upcoming,
            LifecycleStatus::Open => &self.open,
            LifecycleStatus::Closed => &self.closed,
        }
    }

    /// Number of records across all buckets.
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.open.len() + self.closed.len()
    }

    /// Whether all buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket sizes in tab order.
    pub fn counts(&self) -> [(LifecycleStatus, usize); 3] {
        LifecycleStatus::ALL.map(|status| (status, self.bucket(status).len()))
    }

    fn push(&mut self, status: LifecycleStatus, record: CanonicalIpoRecord) {
        self.stats.record(status);
        match status {
            LifecycleStatus::Upcoming => self.upcoming.push(record),
            LifecycleStatus::Open => self.open.push(record),
            LifecycleStatus::Closed => self.closed.push(record),
        }
    }
}

/// Stateless lifecycle classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleClassifier {
    rule: ClassificationRule,
}

impl LifecycleClassifier {
    /// Create a classifier using the given rule.
    pub fn new(rule: ClassificationRule) -> Self {
        Self { rule }
    }

    /// Rule in use.
    pub fn rule(&self) -> ClassificationRule {
        self.rule
    }

    /// Classify a single record.
    pub fn classify(&self, record: &CanonicalIpoRecord, now: TimestampMs) -> LifecycleStatus {
        self.classify_with_verdict(record, now).0
    }

    /// Classify a single record and report which check decided it.
    pub fn classify_with_verdict(
        &self,
        record: &CanonicalIpoRecord,
        now: TimestampMs,
    ) -> (LifecycleStatus, Verdict) {
        if self.rule == ClassificationRule::ListingAware {
            if let Some(listing_ms) = parse_date_ms(&record.listing_date) {
                if listing_ms < now {
                    return (LifecycleStatus::Closed, Verdict::Listed);
                }
            }
        }

        let (open_ms, close_ms) = match (
            parse_date_ms(&record.open_date),
            parse_date_ms(&record.close_date),
        ) {
            (Some(open), Some(close)) => (open, close),
            _ => return (LifecycleStatus::Upcoming, Verdict::UnknownWindow),
        };

        let status = if open_ms <= now && now <= close_ms {
            LifecycleStatus::Open
        } else if close_ms < now {
            LifecycleStatus::Closed
        } else {
            LifecycleStatus::Upcoming
        };

        (status, Verdict::Window)
    }

    /// Split records into buckets. Input order is kept within each bucket.
    pub fn categorize(&self, records: &[CanonicalIpoRecord], now: TimestampMs) -> CategorizedIpos {
        let mut result = CategorizedIpos::default();

        for record in records {
            let (status, verdict) = self.classify_with_verdict(record, now);
            match verdict {
                Verdict::UnknownWindow => result.stats.unparseable_dates += 1,
                Verdict::Listed => result.stats.closed_by_listing += 1,
                Verdict::Window => {}
            }
            result.push(status, record.clone());
        }

        tracing::debug!(
            total = result.stats.total,
            upcoming = result.stats.upcoming,
            open = result.stats.open,
            closed = result.stats.closed,
            unparseable_dates = result.stats.unparseable_dates,
            "categorized IPO records"
        );

        result
    }
}

/// Categorize with the date-range rule.
pub fn categorize(records: &[CanonicalIpoRecord], now: TimestampMs) -> CategorizedIpos {
    LifecycleClassifier::default().categorize(records, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-01T00:00:00Z
    const JAN_1: i64 = 1_704_067_200_000;

    fn make_record(id: &str, open: &str, close: &str) -> CanonicalIpoRecord {
        let mut record = CanonicalIpoRecord::new(id, id);
        record.open_date = open.to_string();
        record.close_date = close.to_string();
        record
    }

    fn sample() -> Vec<CanonicalIpoRecord> {
        vec![
            make_record("past", "2023-12-01", "2023-12-05"),
            make_record("current", "2024-01-01", "2024-01-05"),
            make_record("future", "2024-02-01", "2024-02-05"),
            make_record("blank", "", ""),
            make_record("garbage", "soon", "2024-01-05"),
        ]
    }

    #[test]
    fn test_window_classification() {
        let now = JAN_1 + 2 * DAY_MS;
        let result = categorize(&sample(), now);

        let ids = |records: &[CanonicalIpoRecord]| {
            records.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(result.closed.as_slice()), vec!["past"]);
        assert_eq!(ids(result.open.as_slice()), vec!["current"]);
        assert_eq!(ids(result.upcoming.as_slice()), vec!["future", "blank", "garbage"]);
        assert_eq!(result.stats.unparseable_dates, 2);
    }

    #[test]
    fn test_open_boundary_inclusive() {
        let record = make_record("edge", "2024-01-01", "2024-01-05");
        let classifier = LifecycleClassifier::default();
        assert_eq!(classifier.classify(&record, JAN_1), LifecycleStatus::Open);
        assert_eq!(classifier.classify(&record, JAN_1 - 1), LifecycleStatus::Upcoming);
    }

    #[test]
    fn test_close_boundary_inclusive() {
        let record = make_record("edge", "2024-01-01", "2024-01-05");
        let close = JAN_1 + 4 * DAY_MS;
        let classifier = LifecycleClassifier::default();
        assert_eq!(classifier.classify(&record, close), LifecycleStatus::Open);
        assert_eq!(classifier.classify(&record, close + 1), LifecycleStatus::Closed);
    }

    #[test]
    fn test_unparseable_dates_are_upcoming() {
        let classifier = LifecycleClassifier::default();
        let far_future = JAN_1 + 10_000 * DAY_MS;
        for (open, close) in [("", ""), ("2024-01-01", ""), ("", "2024-01-05"), ("TBA", "TBA")] {
            let record = make_record("x", open, close);
            assert_eq!(classifier.classify(&record, far_future), LifecycleStatus::Upcoming);
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let records = sample();
        let now = JAN_1 + DAY_MS;
        let classifier = LifecycleClassifier::default();
        let first = classifier.categorize(&records, now);
        let second = classifier.categorize(&records, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_is_exhaustive() {
        let records = sample();
        for offset in [-100, -1, 0, 1, 2, 4, 5, 40, 100] {
            let result = categorize(&records, JAN_1 + offset * DAY_MS);
            assert_eq!(result.len(), records.len());

            let mut ids = HashSet::new();
            for status in LifecycleStatus::ALL {
                for record in result.bucket(status) {
                    assert!(ids.insert(record.id.clone()), "duplicate {}", record.id);
                }
            }
            let expected: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_empty_input() {
        let result = categorize(&[], JAN_1);
        assert!(result.is_empty());
        for (_, count) in result.counts() {
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_listing_date_ignored_by_default() {
        let mut record = make_record("listed", "2024-01-01", "2024-01-05");
        record.listing_date = "2024-01-02".to_string();
        let now = JAN_1 + 3 * DAY_MS;
        assert_eq!(
            LifecycleClassifier::default().classify(&record, now),
            LifecycleStatus::Open
        );
    }

    #[test]
    fn test_listing_aware_rule() {
        let mut record = make_record("listed", "2024-01-01", "2024-01-05");
        record.listing_date = "2024-01-02".to_string();
        let classifier = LifecycleClassifier::new(ClassificationRule::ListingAware);

        let result = classifier.categorize(&[record.clone()], JAN_1 + 3 * DAY_MS);
        assert_eq!(result.closed.len(), 1);
        assert_eq!(result.stats.closed_by_listing, 1);

        // Before listing the window still decides.
        assert_eq!(classifier.classify(&record, JAN_1 + DAY_MS / 2), LifecycleStatus::Open);

        // Unparseable listing date falls through to the window.
        record.listing_date = "TBA".to_string();
        assert_eq!(classifier.classify(&record, JAN_1 + 3 * DAY_MS), LifecycleStatus::Open);
    }

    #[test]
    fn test_stats_counts_match_buckets() {
        let result = categorize(&sample(), JAN_1 + 2 * DAY_MS);
        for (status, count) in result.counts() {
            assert_eq!(result.stats.count(status), count as u64);
        }
        assert_eq!(result.stats.total, 5);
    }
}

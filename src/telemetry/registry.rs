//! In-memory metric registry.
//!
//! # Responsibilities
//! - Hold the current value of every counter and gauge series
//! - Enforce one kind per metric name
//! - Hand out point-in-time snapshots to exporters
//!
//! # Design Decisions
//! - Series are stored in a `DashMap`; each mutation is a single
//!   entry-locked read-modify-write so concurrent requests never lose updates
//! - Entries are created lazily and never removed
//! - Scaled counters keep their running total in a finer unit next to the
//!   published record, so sub-unit increments are never rounded away

use dashmap::DashMap;

use crate::error::ValidationError;
use crate::telemetry::record::{MetricKind, MetricRecord, MetricValue, SeriesKey};

/// Process-wide store of named counters and gauges.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    series: DashMap<SeriesKey, Series>,
    kinds: DashMap<String, MetricKind>,
}

#[derive(Debug, Clone)]
struct Series {
    record: MetricRecord,
    /// Running total in sub-units; only used by scaled counters.
    fine_total: u64,
}

impl Series {
    fn new(record: MetricRecord) -> Self {
        Self {
            record,
            fine_total: 0,
        }
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to a counter, creating it at zero if absent.
    /// Returns the new cumulative value.
    pub fn increment_counter(
        &self,
        key: &SeriesKey,
        unit: &str,
        delta: i64,
    ) -> Result<u64, ValidationError> {
        if delta < 0 {
            return Err(ValidationError::NegativeDelta {
                name: key.name.clone(),
                delta,
            });
        }
        self.claim_kind(&key.name, MetricKind::Counter)?;

        let mut entry = self
            .series
            .entry(key.clone())
            .or_insert_with(|| Series::new(MetricRecord::counter(key, unit, 0)));
        match &mut entry.record.value {
            MetricValue::Count(total) => {
                *total = total.saturating_add(delta as u64);
                Ok(*total)
            }
            MetricValue::Point(_) => Err(counter_over_gauge(&key.name)),
        }
    }

    /// Add `delta` sub-units to a counter published in units of
    /// `per_unit` sub-units. The published value is the running sub-unit
    /// total rounded half up, so many small increments still add up.
    /// Returns the new published value.
    pub fn increment_scaled_counter(
        &self,
        key: &SeriesKey,
        unit: &str,
        delta: u64,
        per_unit: u64,
    ) -> Result<u64, ValidationError> {
        self.claim_kind(&key.name, MetricKind::Counter)?;
        let per_unit = per_unit.max(1);

        let mut entry = self
            .series
            .entry(key.clone())
            .or_insert_with(|| Series::new(MetricRecord::counter(key, unit, 0)));
        let series = &mut *entry;
        series.fine_total = series.fine_total.saturating_add(delta);
        let published = series.fine_total / per_unit
            + u64::from(series.fine_total % per_unit >= per_unit - per_unit / 2);
        match &mut series.record.value {
            MetricValue::Count(total) => {
                *total = published;
                Ok(published)
            }
            MetricValue::Point(_) => Err(counter_over_gauge(&key.name)),
        }
    }

    /// Create or overwrite a gauge.
    pub fn set_gauge(&self, key: &SeriesKey, unit: &str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                name: key.name.clone(),
            });
        }
        self.claim_kind(&key.name, MetricKind::Gauge)?;
        self.series
            .insert(key.clone(), Series::new(MetricRecord::gauge(key, unit, value)));
        Ok(())
    }

    /// Current record of one series, if it has been observed.
    pub fn get(&self, key: &SeriesKey) -> Option<MetricRecord> {
        self.series.get(key).map(|r| r.record.clone())
    }

    /// Snapshot of every series at call time.
    pub fn read_all(&self) -> impl Iterator<Item = MetricRecord> {
        let snapshot: Vec<MetricRecord> = self.series.iter().map(|r| r.record.clone()).collect();
        snapshot.into_iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn claim_kind(&self, name: &str, requested: MetricKind) -> Result<(), ValidationError> {
        let existing = *self.kinds.entry(name.to_string()).or_insert(requested);
        if existing != requested {
            return Err(ValidationError::KindMismatch {
                name: name.to_string(),
                existing,
                requested,
            });
        }
        Ok(())
    }
}

fn counter_over_gauge(name: &str) -> ValidationError {
    ValidationError::KindMismatch {
        name: name.to_string(),
        existing: MetricKind::Gauge,
        requested: MetricKind::Counter,
    }
}

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::model::{Catalog, CustomerId, Reading, SeriesRecord};

// ---------------------------------------------------------------------------
// Customer eligibility
// ---------------------------------------------------------------------------

/// Customers that have a file for every chosen category, in id order.
///
/// With nothing chosen every customer qualifies.
pub fn eligible_customers(catalog: &Catalog, chosen: &BTreeSet<String>) -> Vec<CustomerId> {
    catalog
        .customers
        .iter()
        .filter(|(_, files)| chosen.iter().all(|cat| files.contains_key(cat)))
        .map(|(id, _)| id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Date bounds
// ---------------------------------------------------------------------------

/// Earliest and latest timestamp over every loaded series.
///
/// `None` when there is nothing to span.
pub fn overall_date_bounds(series: &[SeriesRecord]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    series
        .iter()
        .filter_map(SeriesRecord::first_and_last)
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
}

/// Readings with `start <= timestamp <= end`, oldest first.
pub fn filter_by_range(readings: &[Reading], start: NaiveDateTime, end: NaiveDateTime) -> Vec<Reading> {
    let mut kept: Vec<Reading> = readings
        .iter()
        .filter(|r| start <= r.timestamp && r.timestamp <= end)
        .copied()
        .collect();
    kept.sort_by_key(|r| r.timestamp);
    kept
}

// ---------------------------------------------------------------------------
// DateRange – the user's inclusive calendar-day window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Whole days covering the given timestamp bounds.
    pub fn covering(bounds: (NaiveDateTime, NaiveDateTime)) -> Self {
        Self::new(bounds.0.date(), bounds.1.date())
    }

    /// First and last instant of the window. The end day is included.
    pub fn as_timestamps(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self
            .end
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN) - TimeDelta::nanoseconds(1))
            .unwrap_or(NaiveDateTime::MAX);
        (start, end)
    }

    /// Shrink to fit inside `bounds`; `None` when the two do not overlap.
    pub fn clamp_to(&self, bounds: (NaiveDateTime, NaiveDateTime)) -> Option<Self> {
        let full = Self::covering(bounds);
        let start = self.start.max(full.start);
        let end = self.end.min(full.end);
        (start <= end).then_some(Self { start, end })
    }
}

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// CustomerId – the part of a file name before the first underscore
// ---------------------------------------------------------------------------

/// A customer identifier as written in a file name.
///
/// All-digit identifiers compare by numeric value, everything else compares
/// as text, and every numeric identifier sorts before every textual one.
/// The original spelling is kept so the file can be found again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CustomerId {
    Numeric(String),
    Text(String),
}

impl CustomerId {
    pub fn new(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            CustomerId::Numeric(raw.to_string())
        } else {
            CustomerId::Text(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CustomerId::Numeric(s) | CustomerId::Text(s) => s,
        }
    }
}

/// Digits without leading zeros, so "007" and "7" have the same magnitude.
fn significant_digits(s: &str) -> &str {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        use CustomerId::*;
        match (self, other) {
            (Numeric(a), Numeric(b)) => {
                let (sa, sb) = (significant_digits(a), significant_digits(b));
                sa.len()
                    .cmp(&sb.len())
                    .then_with(|| sa.cmp(sb))
                    .then_with(|| a.cmp(b))
            }
            (Text(a), Text(b)) => a.cmp(b),
            (Numeric(_), Text(_)) => Ordering::Less,
            (Text(_), Numeric(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Files and readings
// ---------------------------------------------------------------------------

/// One `<customer>_<category>.csv` file inside a transformer directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFile {
    pub customer: CustomerId,
    pub category: String,
    /// Bare file name, relative to the transformer directory.
    pub file_name: String,
}

/// A single (timestamp, value) sample. Timestamps carry no timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// The readings of one customer/category pair, in file order.
#[derive(Debug, Clone)]
pub struct SeriesRecord {
    pub customer: CustomerId,
    pub category: String,
    pub path: PathBuf,
    pub readings: Vec<Reading>,
}

impl SeriesRecord {
    /// Legend label, `<customer>_<category>`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.customer, self.category)
    }

    pub fn first_and_last(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.readings.iter().map(|r| r.timestamp).min()?;
        let max = self.readings.iter().map(|r| r.timestamp).max()?;
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// Catalog – what files one transformer holds
// ---------------------------------------------------------------------------

/// Index of a transformer directory: customer → category → file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub customers: BTreeMap<CustomerId, BTreeMap<String, CustomerFile>>,
    pub categories: BTreeSet<String>,
    /// File names that did not match `<customer>_<category>.csv`.
    pub malformed: Vec<String>,
}

impl Catalog {
    /// Register a file. A second file for the same pair replaces the first.
    pub fn insert(&mut self, file: CustomerFile) {
        self.categories.insert(file.category.clone());
        self.customers
            .entry(file.customer.clone())
            .or_default()
            .insert(file.category.clone(), file);
    }

    pub fn file(&self, customer: &CustomerId, category: &str) -> Option<&CustomerFile> {
        self.customers.get(customer)?.get(category)
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};

use super::error::{DataError, Result};
use super::model::{CustomerFile, Reading, SeriesRecord};

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Layouts carrying a UTC offset. The offset is dropped, wall time kept.
/// `%#z` takes `+02`, `+0200`, `+02:00` and `Z`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y/%m/%d %H:%M:%S%.f%#z",
    "%Y/%m/%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y%m%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y"];

/// Parse a timestamp cell into a timezone-naive datetime.
///
/// Offsets such as `+02:00` or `Z` are stripped: `10:00+02:00` becomes
/// `10:00`, not `08:00`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: no header, two columns per row.
///   `2023-01-01 00:00:00,230.4`
///
/// The first bad row fails the whole file so a partial series is never
/// plotted.
pub fn load_readings(path: &Path) -> Result<Vec<Reading>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let row_error = |reason: String| DataError::Row {
            path: path.to_path_buf(),
            row,
            reason,
        };

        let record = result.map_err(|e| row_error(e.to_string()))?;
        if record.len() != 2 {
            return Err(row_error(format!("expected 2 columns, found {}", record.len())));
        }

        let ts_cell = &record[0];
        let value_cell = &record[1];
        let timestamp = parse_timestamp(ts_cell)
            .ok_or_else(|| row_error(format!("'{ts_cell}' is not a timestamp")))?;
        let value = value_cell
            .parse::<f64>()
            .map_err(|_| row_error(format!("'{value_cell}' is not a number")))?;

        readings.push(Reading::new(timestamp, value));
    }

    log::debug!("Read {} rows from {}", readings.len(), path.display());
    Ok(readings)
}

/// Load the series behind one catalog entry of `root/transformer`.
pub fn load_series(root: &Path, transformer: &str, file: &CustomerFile) -> Result<SeriesRecord> {
    let path = root.join(transformer).join(&file.file_name);
    let readings = load_readings(&path)?;
    Ok(SeriesRecord {
        customer: file.customer.clone(),
        category: file.category.clone(),
        path,
        readings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("phase_viz_loader_{nanos}_{n}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn offsets_are_stripped_not_converted() {
        assert_eq!(
            parse_timestamp("2023-01-01T10:00:00+02:00"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2023-01-01 10:00:00+10:00"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2023-01-01T10:00:00Z"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2023-01-01 10:00:00+02"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2023-01-01 10:00:00-0530"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
        assert_eq!(parse_timestamp("2023-01-01T10:00Z"), Some(at(2023, 1, 1, 10, 0, 0)));
        assert_eq!(
            parse_timestamp("2023/01/01 10:00+01:00"),
            Some(at(2023, 1, 1, 10, 0, 0))
        );
    }

    #[test]
    fn naive_and_date_only_layouts() {
        assert_eq!(parse_timestamp("2023-03-04 05:06:07"), Some(at(2023, 3, 4, 5, 6, 7)));
        assert_eq!(parse_timestamp("2023-03-04 05:06"), Some(at(2023, 3, 4, 5, 6, 0)));
        assert_eq!(parse_timestamp("2023-03-04"), Some(at(2023, 3, 4, 0, 0, 0)));
        assert_eq!(parse_timestamp("03/04/2023 05:06"), Some(at(2023, 3, 4, 5, 6, 0)));
        assert_eq!(parse_timestamp("2023/01/01 10:00"), Some(at(2023, 1, 1, 10, 0, 0)));
        assert_eq!(parse_timestamp("2023/01/01 10:00:30"), Some(at(2023, 1, 1, 10, 0, 30)));
        assert_eq!(parse_timestamp("2023/01/01"), Some(at(2023, 1, 1, 0, 0, 0)));
        assert_eq!(parse_timestamp("20230101"), Some(at(2023, 1, 1, 0, 0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn loads_headerless_two_column_file() {
        let path = temp_file(
            "1_Voltage.csv",
            "2023-01-01 00:00:00,230.1\n2023-01-01 00:30:00, 229.8\n",
        );
        let readings = load_readings(&path).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].timestamp, at(2023, 1, 1, 0, 30, 0));
        assert!((readings[1].value - 229.8).abs() < 1e-9);
    }

    #[test]
    fn bad_value_fails_with_row_number() {
        let path = temp_file("2_Voltage.csv", "2023-01-01 00:00:00,1.0\n2023-01-01 00:30:00,n/a\n");
        match load_readings(&path) {
            Err(DataError::Row { row, reason, .. }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("n/a"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_column_count_fails() {
        let path = temp_file("3_Voltage.csv", "2023-01-01 00:00:00,1.0,extra\n");
        assert!(matches!(load_readings(&path), Err(DataError::Row { row: 1, .. })));
    }

    #[test]
    fn empty_file_is_an_empty_series() {
        let path = temp_file("4_Voltage.csv", "");
        assert!(load_readings(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let path = std::env::temp_dir().join("phase_viz_definitely_missing.csv");
        assert!(matches!(load_readings(&path), Err(DataError::Open { .. })));
    }
}

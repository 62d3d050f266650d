/// Data layer: directory catalog, series loading, and selection filtering.
///
/// Architecture:
/// ```text
///  root/<transformer>/<customer>_<category>.csv
///        │
///        ▼
///   ┌──────────┐
///   │ catalog   │  list dirs, parse names → Catalog
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read CSV → SeriesRecord (naive timestamps)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  eligible customers, date bounds, range filter
///   └──────────┘
/// ```

pub mod catalog;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

use std::path::Path;

use super::error::{DataError, Result};
use super::model::{Catalog, CustomerFile, CustomerId};

const CSV_SUFFIX: &str = ".csv";

// ---------------------------------------------------------------------------
// File name parsing
// ---------------------------------------------------------------------------

/// Split `<customer>_<category>.csv` on the first underscore.
///
/// The category keeps any further underscores (`3_Reactive_Power.csv` →
/// `3`, `Reactive_Power`). Names without an underscore, without the `.csv`
/// suffix, or with an empty half are rejected.
pub fn parse_file_name(name: &str) -> Result<(CustomerId, String)> {
    let malformed = || DataError::MalformedFileName(name.to_string());

    let stem = name.strip_suffix(CSV_SUFFIX).ok_or_else(malformed)?;
    let (customer, category) = stem.split_once('_').ok_or_else(malformed)?;
    if customer.is_empty() || category.is_empty() {
        return Err(malformed());
    }
    Ok((CustomerId::new(customer), category.to_string()))
}

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// Entries of a directory that pass `keep`, split into usable names and
/// descriptions of entries that could not be read or named.
struct Listing {
    names: Vec<String>,
    skipped: Vec<String>,
}

fn scan_dir(dir: &Path, keep: impl Fn(&Path, &str) -> bool) -> Result<Listing> {
    let entries = std::fs::read_dir(dir).map_err(|source| DataError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listing = Listing {
        names: Vec::new(),
        skipped: Vec::new(),
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Unreadable entry in {}: {e}", dir.display());
                listing.skipped.push(format!("<unreadable entry: {e}>"));
                continue;
            }
        };
        let path = entry.path();
        let os_name = entry.file_name();
        let lossy = os_name.to_string_lossy();
        if !keep(&path, &lossy) {
            continue;
        }
        match os_name.to_str() {
            Some(name) => listing.names.push(name.to_string()),
            None => {
                log::warn!("Skipping {}: name is not valid UTF-8", path.display());
                listing.skipped.push(lossy.into_owned());
            }
        }
    }
    listing.names.sort();
    Ok(listing)
}

fn scan_customer_files(root: &Path, transformer: &str) -> Result<Listing> {
    scan_dir(&root.join(transformer), |path, name| {
        path.is_file() && name.ends_with(CSV_SUFFIX)
    })
}

/// Names of the immediate subdirectories of `root`, sorted.
pub fn list_transformers(root: &Path) -> Result<Vec<String>> {
    let listing = scan_dir(root, |path, _| path.is_dir())?;
    Ok(listing.names)
}

/// Names of the `.csv` files directly inside `root/transformer`, sorted.
pub fn list_customer_files(root: &Path, transformer: &str) -> Result<Vec<String>> {
    Ok(scan_customer_files(root, transformer)?.names)
}

// ---------------------------------------------------------------------------
// Catalog construction
// ---------------------------------------------------------------------------

/// Index file names by customer and category.
///
/// Malformed names are skipped and kept in [`Catalog::malformed`].
pub fn build_catalog<S: AsRef<str>>(files: &[S]) -> Catalog {
    let mut catalog = Catalog::default();
    for name in files {
        let name = name.as_ref();
        match parse_file_name(name) {
            Ok((customer, category)) => catalog.insert(CustomerFile {
                customer,
                category,
                file_name: name.to_string(),
            }),
            Err(e) => {
                log::warn!("Skipping {e}");
                catalog.malformed.push(name.to_string());
            }
        }
    }
    catalog
}

/// List and index one transformer directory.
///
/// Entries that cannot be read or whose names are not UTF-8 join the
/// malformed list.
pub fn load_catalog(root: &Path, transformer: &str) -> Result<Catalog> {
    let listing = scan_customer_files(root, transformer)?;
    let mut catalog = build_catalog(&listing.names);
    catalog.malformed.extend(listing.skipped);
    log::info!(
        "Transformer {transformer}: {} customers, {} categories, {} skipped",
        catalog.customer_count(),
        catalog.categories.len(),
        catalog.malformed.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_on_first_underscore_only() {
        let (id, cat) = parse_file_name("3_Reactive_Power.csv").unwrap();
        assert_eq!(id.as_str(), "3");
        assert_eq!(cat, "Reactive_Power");
    }

    #[test]
    fn rejects_names_without_underscore() {
        assert!(matches!(
            parse_file_name("readme.csv"),
            Err(DataError::MalformedFileName(_))
        ));
    }

    #[test]
    fn rejects_empty_halves_and_missing_suffix() {
        assert!(parse_file_name("_Voltage.csv").is_err());
        assert!(parse_file_name("12_.csv").is_err());
        assert!(parse_file_name("12_Voltage.txt").is_err());
    }

    #[test]
    fn catalog_from_three_files() {
        let catalog = build_catalog(&["1_Voltage.csv", "1_Current.csv", "2_Voltage.csv"]);
        let cats: Vec<&str> = catalog.categories.iter().map(String::as_str).collect();
        assert_eq!(cats, vec!["Current", "Voltage"]);
        assert_eq!(catalog.customer_count(), 2);
        let one = CustomerId::new("1");
        assert_eq!(catalog.customers.get(&one).map(|m| m.len()), Some(2));
        assert_eq!(
            catalog.file(&one, "Current").map(|f| f.file_name.as_str()),
            Some("1_Current.csv")
        );
    }

    #[test]
    fn malformed_names_are_reported_not_fatal() {
        let catalog = build_catalog(&["notes.csv", "5_Voltage.csv"]);
        assert_eq!(catalog.malformed, vec!["notes.csv".to_string()]);
        assert_eq!(catalog.customer_count(), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_listed_as_malformed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::time::{SystemTime, UNIX_EPOCH};

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("phase_viz_catalog_{nanos}"));
        let tx = root.join("TX");
        std::fs::create_dir_all(&tx).unwrap();
        std::fs::write(tx.join("1_Voltage.csv"), "").unwrap();
        std::fs::write(tx.join(OsStr::from_bytes(b"2_Volt\xffage.csv")), "").unwrap();
        std::fs::write(tx.join(OsStr::from_bytes(b"notes\xff.txt")), "").unwrap();

        assert_eq!(list_customer_files(&root, "TX").unwrap(), vec!["1_Voltage.csv"]);
        let catalog = load_catalog(&root, "TX").unwrap();
        assert_eq!(catalog.customer_count(), 1);
        assert_eq!(catalog.malformed.len(), 1);
        assert!(catalog.malformed[0].starts_with("2_Volt"));
        assert!(catalog.malformed[0].ends_with("age.csv"));

        let _ = std::fs::remove_dir_all(&root);
    }

    proptest! {
        #[test]
        fn parse_recovers_id_and_category(
            id in "[A-Za-z0-9]{1,8}",
            cat in "[A-Za-z][A-Za-z0-9_]{0,12}",
        ) {
            let name = format!("{id}_{cat}.csv");
            let (parsed_id, parsed_cat) = parse_file_name(&name).unwrap();
            prop_assert_eq!(parsed_id.as_str(), id.as_str());
            prop_assert_eq!(&parsed_cat, &cat);
            prop_assert!(!parsed_cat.ends_with(".csv"));
        }
    }
}

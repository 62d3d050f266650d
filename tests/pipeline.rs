use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use phase_viz::data::catalog::{build_catalog, list_customer_files, list_transformers};
use phase_viz::data::filter::{eligible_customers, filter_by_range, overall_date_bounds};
use phase_viz::data::loader::load_series;
use phase_viz::data::model::CustomerId;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn directory_to_filtered_series() {
    let root = unique_temp_dir("phase_viz_pipeline");
    let tx = root.join("TX_1");
    fs::create_dir_all(&tx).expect("failed to create transformer dir");
    fs::create_dir_all(root.join("TX_0")).expect("failed to create transformer dir");
    fs::write(root.join("loose_file.csv"), "").expect("failed to write stray file");

    fs::write(
        tx.join("10_Voltage.csv"),
        "2023-01-03T00:00:00+02:00,231\n2023-01-01T00:00:00+02:00,230\n2023-01-02T00:00:00+02:00,229\n",
    )
    .expect("failed to write 10_Voltage");
    fs::write(tx.join("2_Voltage.csv"), "2023-01-05 12:00:00,228\n").expect("failed to write 2_Voltage");
    fs::write(tx.join("2_Current.csv"), "2023-01-04 12:00:00,7.5\n").expect("failed to write 2_Current");
    fs::write(tx.join("notes.txt"), "ignored").expect("failed to write notes");

    let transformers = list_transformers(&root).expect("failed to list transformers");
    assert_eq!(transformers, vec!["TX_0", "TX_1"]);

    let files = list_customer_files(&root, "TX_1").expect("failed to list files");
    assert_eq!(files, vec!["10_Voltage.csv", "2_Current.csv", "2_Voltage.csv"]);

    let catalog = build_catalog(&files);
    let voltage: BTreeSet<String> = ["Voltage".to_string()].into_iter().collect();
    let eligible = eligible_customers(&catalog, &voltage);
    assert_eq!(eligible, vec![CustomerId::new("2"), CustomerId::new("10")]);

    let series: Vec<_> = eligible
        .iter()
        .map(|c| {
            let file = catalog.file(c, "Voltage").expect("file listed in catalog");
            load_series(&root, "TX_1", file).expect("failed to load series")
        })
        .collect();

    let (lo, hi) = overall_date_bounds(&series).expect("series have readings");
    assert_eq!(lo.date(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    assert_eq!(hi, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap().and_hms_opt(12, 0, 0).unwrap());

    let ten = &series[1];
    assert_eq!(ten.label(), "10_Voltage");
    let all = filter_by_range(&ten.readings, lo, hi);
    let values: Vec<f64> = all.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![230.0, 229.0, 231.0]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_root_is_an_error_not_a_panic() {
    let root = unique_temp_dir("phase_viz_missing");
    assert!(list_transformers(&root).is_err());
    assert!(list_customer_files(&root, "TX").is_err());
}

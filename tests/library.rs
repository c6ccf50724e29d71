//! Library comparison across two directories

mod common;

use common::LibraryFixture;
use dscompare::diff::AlignmentMode;
use dscompare::{compare_libraries, CompareError, CompareOptions};

const DEMO: &[&[&str]] = &[&["id", "value"], &["1", "10"], &["2", "20"]];

#[test]
fn shared_dataset_matches_across_case_and_extension() {
    let fx = LibraryFixture::new();
    fx.write_csv("base/demo.csv", DEMO);
    fx.write_csv("comp/DEMO.CSV", DEMO);

    let report = compare_libraries(&fx.base_dir(), &fx.comp_dir(), &[], &CompareOptions::new())
        .expect("libraries compare");

    assert_eq!(report.datasets.keys().collect::<Vec<_>>(), vec!["demo"]);
    let demo = &report.datasets["demo"];
    assert!(demo.row_count_match);
    assert_eq!(demo.ds1_rows, 2);
    assert!(demo.comparison.is_match);
    assert!(report.all_match());
}

#[test]
fn csv_and_json_with_same_stem_are_paired() {
    let fx = LibraryFixture::new();
    fx.write_csv("base/adsl.csv", DEMO);
    fx.write_json(
        "comp/adsl.json",
        r#"[{"id": 1, "value": 10}, {"id": 2, "value": 21}]"#,
    );

    let report = compare_libraries(
        &fx.base_dir(),
        &fx.comp_dir(),
        &["id".to_string()],
        &CompareOptions::new(),
    )
    .expect("libraries compare");

    let adsl = &report.datasets["adsl"];
    assert_eq!(adsl.vars_both, vec!["id", "value"]);
    assert_eq!(adsl.comparison.difference_count, 1);
    assert_eq!(adsl.comparison.differences[0].difference, Some(1.0));
}

#[test]
fn no_shared_names_gives_empty_mapping() {
    let fx = LibraryFixture::new();
    fx.write_csv("base/ae.csv", DEMO);
    fx.write_csv("comp/cm.csv", DEMO);

    let report = compare_libraries(&fx.base_dir(), &fx.comp_dir(), &[], &CompareOptions::new())
        .expect("libraries compare");

    assert!(report.datasets.is_empty());
    assert_eq!(report.base_only_datasets, vec!["ae"]);
    assert_eq!(report.comp_only_datasets, vec!["cm"]);
    assert!(!report.all_match());
}

#[test]
fn missing_sort_column_falls_back_to_position() {
    let fx = LibraryFixture::new();
    fx.write_csv("base/lb.csv", DEMO);
    fx.write_csv("comp/lb.csv", DEMO);

    let report = compare_libraries(
        &fx.base_dir(),
        &fx.comp_dir(),
        &["usubjid".to_string()],
        &CompareOptions::new(),
    )
    .expect("libraries compare");

    let lb = &report.datasets["lb"];
    assert!(matches!(
        lb.comparison.alignment,
        AlignmentMode::PositionalFallback { .. }
    ));
    assert!(lb.comparison.is_match);
}

#[test]
fn non_directory_is_rejected() {
    let fx = LibraryFixture::new();
    let file = fx.write_csv("plain.csv", DEMO);

    let err = compare_libraries(&file, &fx.comp_dir(), &[], &CompareOptions::new())
        .expect_err("a file is not a library");
    assert!(matches!(err, CompareError::DirectoryNotFound { .. }));
}

#[test]
fn unreadable_dataset_aborts_the_comparison() {
    let fx = LibraryFixture::new();
    fx.write_json("base/bad.json", "{ not json");
    fx.write_json("comp/bad.json", "[]");

    let err = compare_libraries(&fx.base_dir(), &fx.comp_dir(), &[], &CompareOptions::new())
        .expect_err("malformed file fails");
    assert!(matches!(err, CompareError::Read { .. }));
}

//! End-to-end batch normalization over a directory of exports
//!
//! Run with: cargo test --test batch_run

use std::fs;
use std::path::Path;

use cloud_activity_canon::batch::{run_batch, BatchOptions, FileOutcome, COMBINED_FILE};
use cloud_activity_canon::config::TaxonomyLocator;
use cloud_activity_canon::provider::Provider;
use cloud_activity_canon::table::read_csv;
use cloud_activity_canon::taxonomy::ActivityTaxonomy;
use tempfile::tempdir;

fn shipped_taxonomy() -> ActivityTaxonomy {
    TaxonomyLocator::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/taxonomy"))
        .load()
        .expect("shipped taxonomy should load")
}

fn write_exports(dir: &Path) {
    fs::write(
        dir.join("azure_activity.csv"),
        "\u{feff}Operation Name,Resource Type,Status\n\
         Microsoft.Compute/virtualMachines/deallocate/action,Virtual Machines,Succeeded\n\
         Microsoft.Compute/virtualMachines/powerOff/action,Virtual Machines,Succeeded\n",
    )
    .unwrap();
    fs::write(
        dir.join("aws_cloudtrail.csv"),
        "Event time,Event,Resource type,IsDataAction\n\
         2024-01-01T00:00:00Z,StopInstances,AWS::EC2::Instance,false\n\
         2024-01-01T00:01:00Z,GetObject,AWS::S3::Object,true\n\
         2024-01-01T00:02:00Z,ConsoleLogin,,false\n",
    )
    .unwrap();
    // No operation-like column
    fs::write(dir.join("gcp_broken.csv"), "id,timestamp\n1,2\n").unwrap();
    // Ragged row
    fs::write(dir.join("other.csv"), "Operation,Resource\ncreate,disks,extra\n").unwrap();
}

#[test]
fn batch_normalizes_and_skips_bad_files() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_exports(input.path());

    let taxonomy = shipped_taxonomy();
    let summary = run_batch(&BatchOptions::new(input.path(), output.path()), &taxonomy).unwrap();

    assert_eq!(summary.taxonomy_fingerprint, taxonomy.fingerprint);
    assert_eq!(summary.files.len(), 4);
    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.failure_count(), 2);

    // Summary keeps file-name order
    let inputs: Vec<&str> = summary
        .files
        .iter()
        .map(|f| match f {
            FileOutcome::Normalized { input, .. } | FileOutcome::Failed { input, .. } => {
                input.as_str()
            }
        })
        .collect();
    assert_eq!(
        inputs,
        vec!["aws_cloudtrail.csv", "azure_activity.csv", "gcp_broken.csv", "other.csv"]
    );

    match &summary.files[2] {
        FileOutcome::Failed { provider, error, .. } => {
            assert_eq!(*provider, Provider::Gcp);
            assert!(error.contains("gcp_broken.csv"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    assert!(!output.path().join("gcp_broken_canonical.csv").exists());
    assert!(!output.path().join("other_canonical.csv").exists());
}

#[test]
fn per_file_outputs_carry_derived_columns() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_exports(input.path());

    run_batch(&BatchOptions::new(input.path(), output.path()), &shipped_taxonomy()).unwrap();

    let azure = read_csv(&output.path().join("azure_activity_canonical.csv")).unwrap();
    let rows: Vec<_> = azure.records().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Status"), Some("Succeeded"));
    assert_eq!(
        rows[0].get("CommonActivityName"),
        Some("Virtual Machine Stopped (Billing Freed)")
    );
    assert_eq!(rows[1].get("Qualifiers"), Some("Billing Continues"));
    assert_eq!(rows[1].get("AggregationKey"), Some("VIRTUAL_MACHINE_STOPPED"));
    assert_eq!(rows[1].get("Provider"), Some("Azure"));

    let aws = read_csv(&output.path().join("aws_cloudtrail_canonical.csv")).unwrap();
    let rows: Vec<_> = aws.records().collect();
    assert_eq!(rows[0].get("AggregationKey"), Some("VIRTUAL_MACHINE_STOPPED"));
    assert_eq!(rows[1].get("ObjectType"), Some("Storage Object"));
    assert_eq!(rows[1].get("Qualifiers"), Some("Data"));
    assert_eq!(rows[2].get("CanonicalAction"), Some("Signed In"));
    assert_eq!(rows[2].get("Provider"), Some("Aws"));
}

#[test]
fn combined_output_unions_schemas() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_exports(input.path());

    let summary =
        run_batch(&BatchOptions::new(input.path(), output.path()), &shipped_taxonomy()).unwrap();
    assert_eq!(summary.combined_output.as_deref(), Some(COMBINED_FILE));
    assert_eq!(summary.combined_rows, 5);

    let combined = read_csv(&output.path().join(COMBINED_FILE)).unwrap();
    assert_eq!(combined.len(), 5);
    assert!(combined.column_index("Event").is_some());
    assert!(combined.column_index("Status").is_some());
    assert_eq!(
        combined.headers.iter().filter(|h| *h == "Provider").count(),
        1
    );
}

#[test]
fn no_combine_and_empty_dir() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    let empty = run_batch(&BatchOptions::new(input.path(), output.path()), &shipped_taxonomy()).unwrap();
    assert!(empty.files.is_empty());
    assert!(empty.combined_output.is_none());

    write_exports(input.path());
    let options = BatchOptions {
        combine: false,
        ..BatchOptions::new(input.path(), output.path())
    };
    let summary = run_batch(&options, &shipped_taxonomy()).unwrap();
    assert_eq!(summary.success_count(), 2);
    assert!(summary.combined_output.is_none());
    assert!(!output.path().join(COMBINED_FILE).exists());
}

#[test]
fn rerun_skips_previous_outputs() {
    let dir = tempdir().unwrap();
    write_exports(dir.path());

    let taxonomy = shipped_taxonomy();
    let options = BatchOptions {
        combine: false,
        ..BatchOptions::new(dir.path(), dir.path())
    };
    let first = run_batch(&options, &taxonomy).unwrap();
    let second = run_batch(&options, &taxonomy).unwrap();
    assert_eq!(first.files.len(), second.files.len());

    let a = fs::read_to_string(dir.path().join("azure_activity_canonical.csv")).unwrap();
    run_batch(&options, &taxonomy).unwrap();
    let b = fs::read_to_string(dir.path().join("azure_activity_canonical.csv")).unwrap();
    assert_eq!(a, b);
}

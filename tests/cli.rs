mod common;

use std::fs::{self, File};

use assert_cmd::Command;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{RAW_HEADER, SAMPLE_ROWS, TestWorkspace, sample_csv};

fn bin() -> Command {
    Command::cargo_bin("retail-clean").expect("binary exists")
}

fn parquet_columns_and_rows(path: &std::path::Path) -> (Vec<String>, usize) {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(File::open(path).expect("open parquet"))
            .expect("parquet builder");
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    let rows = builder
        .build()
        .expect("reader")
        .map(|batch| batch.expect("batch").num_rows())
        .sum();
    (columns, rows)
}

#[test]
fn run_writes_parquet_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", &sample_csv());
    let output = workspace.path().join("warehouse").join("orders.parquet");
    bin()
        .args([
            "run",
            "--job-name",
            "retail-etl",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let (columns, rows) = parquet_columns_and_rows(&output);
    assert_eq!(rows, SAMPLE_ROWS.len());
    assert!(columns.contains(&"order_date".to_string()));
    assert!(columns.contains(&"discount_amount".to_string()));
    assert!(!columns.contains(&"Order Date".to_string()));
}

#[test]
fn run_requires_job_name() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", &sample_csv());
    bin()
        .args(["run", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("--job-name"));
}

#[test]
fn run_fails_without_output_when_columns_are_missing() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", "Order ID,Sales\nA-1,10\n");
    let output = workspace.path().join("orders.parquet");
    bin()
        .args([
            "run",
            "--job-name",
            "retail-etl",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("missing required column").and(contains("Order Date")));
    assert!(!output.exists());
}

#[test]
fn lenient_schema_passes_missing_catalog_columns_through() {
    let workspace = TestWorkspace::new();
    let header = RAW_HEADER.replacen("Row ID,", "", 1);
    let mut contents = format!("{header}\n");
    for row in SAMPLE_ROWS {
        let (_, rest) = row.split_once(',').unwrap();
        contents.push_str(rest);
        contents.push('\n');
    }
    let input = workspace.write("orders.csv", &contents);
    let output = workspace.path().join("orders.parquet");
    let args = [
        "run",
        "--job-name",
        "retail-etl",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ];
    bin().args(args).assert().failure();
    bin()
        .args(args)
        .arg("--lenient-schema")
        .assert()
        .success();
    let (columns, rows) = parquet_columns_and_rows(&output);
    assert_eq!(rows, SAMPLE_ROWS.len());
    assert!(!columns.contains(&"row_id".to_string()));
}

#[test]
fn run_reads_tsv_from_stdin_with_explicit_delimiter() {
    let workspace = TestWorkspace::new();
    let tsv = "Row ID\tOrder ID\tOrder Date\tShip Date\tShip Mode\tCustomer ID\tProduct ID\t\
Sub-Category\tProduct Name\tSales\tQuantity\tDiscount\tProfit\n\
7\tCA-1\t1-2-2017\t1/5/2017\tFirst Class\tC-1\tP-1\tPhones\tPhone\t50\t1\t0.2\t5\n";
    let output = workspace.path().join("orders.parquet");
    bin()
        .args([
            "run",
            "--job-name",
            "stdin-job",
            "-i",
            "-",
            "--delimiter",
            "tab",
            "-o",
            output.to_str().unwrap(),
        ])
        .write_stdin(tsv)
        .assert()
        .success();
    let (_, rows) = parquet_columns_and_rows(&output);
    assert_eq!(rows, 1);
}

#[test]
fn preview_prints_cleaned_rows() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", &sample_csv());
    bin()
        .args(["preview", "-i", input.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(
            contains("order_date")
                .and(contains("cost_estimate"))
                .and(contains("2020-02-03"))
                .and(contains("2020-03-02"))
                .and(contains("US-2015-108966").not()),
        );
}

#[test]
fn profile_from_input_drives_run() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", &sample_csv());
    let profile = workspace.path().join("orders.profile.yaml");
    bin()
        .args([
            "profile",
            "-o",
            profile.to_str().unwrap(),
            "--from-input",
            input.to_str().unwrap(),
        ])
        .assert()
        .success();
    let yaml = fs::read_to_string(&profile).expect("read profile");
    assert!(yaml.contains("source: Segment"));
    assert!(yaml.contains("name: segment"));
    assert!(yaml.contains("M/d/yyyy"));

    let output = workspace.path().join("orders.parquet");
    bin()
        .args([
            "run",
            "--job-name",
            "profiled",
            "-i",
            input.to_str().unwrap(),
            "-p",
            profile.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    let (columns, _) = parquet_columns_and_rows(&output);
    assert!(columns.contains(&"segment".to_string()));
    assert!(!columns.contains(&"Segment".to_string()));
}

#[test]
fn invalid_profile_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", &sample_csv());
    let profile = workspace.write(
        "bad.yaml",
        "catalog: []\ndate_columns: [order_date]\ndate_formats: [\"yyyy.MM.dd\"]\nnumeric_columns: []\n",
    );
    bin()
        .args([
            "preview",
            "-i",
            input.to_str().unwrap(),
            "-p",
            profile.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Unsupported date pattern 'yyyy.MM.dd'"));
}

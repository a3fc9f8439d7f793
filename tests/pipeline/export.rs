use super::{config, g01_pass, FixtureEvents};
use arrow::array::{Array, StringArray};
use gnss_arcs::io::ExportCfg;
use gnss_arcs::prelude::*;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rstest::*;
use std::fs::File;
use std::path::PathBuf;

#[fixture]
fn report(config: RunConfig, g01_pass: FixtureEvents) -> RunReport {
    let ctx = PipelineContext::from_config(&config).unwrap();
    run(&ctx, &g01_pass).unwrap()
}

fn output(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "output_data", name]
        .iter()
        .collect()
}

#[rstest]
fn yaml_report(report: RunReport) {
    let path = report.to_yaml(output("rma_20123_test.yaml")).unwrap();
    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.contains("PartiallyTracked"));
    assert!(contents.contains("08:09:30"));
    assert!(contents.contains("CatalogUnresolved"));
}

#[rstest]
fn parquet_report(report: RunReport) {
    let cfg = ExportCfg::from_metadata(vec![("Receiver".to_string(), "RMA".to_string())]);
    let path = report
        .to_parquet(output("rma_20123_test.parquet"), cfg)
        .unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let metadata = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .unwrap()
        .clone();
    assert!(metadata
        .iter()
        .any(|kv| kv.key == "Receiver" && kv.value.as_deref() == Some("RMA")));
    assert!(metadata.iter().any(|kv| kv.key == "Day"));

    // One row for the predicted arc of G01, one for E11 which has no pass, and one per failed satellite
    let mut rows = Vec::new();
    for batch in builder.build().unwrap() {
        let batch = batch.unwrap();
        let satellites = batch
            .column_by_name("Satellite")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        let status = batch
            .column_by_name("Status")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        for i in 0..batch.num_rows() {
            rows.push((satellites.value(i).to_string(), status.value(i).to_string()));
        }
    }
    assert_eq!(rows.len(), 5);
    assert!(rows.contains(&("E11".to_string(), "no pass".to_string())));
    assert!(rows.contains(&("G01".to_string(), "partially-tracked".to_string())));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datafusion::arrow::array::{
    Array, ArrayRef, AsArray, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray,
};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use datafusion::parquet::arrow::ArrowWriter;
use minilake::{Codec, EngineSession, JobConfig, PartitionKey, WatermarkStore};

/// Schema of the fixture order partitions: just the columns the
/// incremental job reads.
#[allow(unused)]
pub fn orders_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Int64, false),
        Field::new("order_status", DataType::Utf8, false),
        Field::new("total", DataType::Float64, false),
        Field::new("ds", DataType::Date32, false),
    ]))
}

/// Write one orders partition file holding the given (status, total)
/// rows, all tagged with `ds`.
#[allow(unused)]
pub fn write_partition(root: &Path, ds: &str, rows: &[(&str, f64)]) -> PathBuf {
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();

    let key: PartitionKey = ds.parse().unwrap();
    let order_ids: Vec<i64> = (0..rows.len() as i64).collect();
    let statuses: Vec<&str> = rows.iter().map(|(status, _)| *status).collect();
    let totals: Vec<f64> = rows.iter().map(|(_, total)| *total).collect();
    let days = vec![key.days_since_epoch(); rows.len()];

    let batch = RecordBatch::try_new(orders_schema(), vec![
        Arc::new(Int64Array::from(order_ids)) as ArrayRef,
        Arc::new(StringArray::from(statuses)),
        Arc::new(Float64Array::from(totals)),
        Arc::new(Date32Array::from(days)),
    ])
    .unwrap();

    let path = raw.join(format!("orders_{ds}.parquet"));
    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, orders_schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

/// A job config rooted at `root`, mirroring the default layout.
#[allow(unused)]
pub fn job_config(root: &Path) -> JobConfig {
    JobConfig {
        source_glob:    root.join("raw").join("orders_*.parquet").to_string_lossy().into_owned(),
        output_path:    root.join("out").join("orders_daily_incr.parquet"),
        watermark_path: root.join("meta.json"),
        codec:          Codec::Zstd,
    }
}

#[allow(unused)]
pub fn set_watermark(config: &JobConfig, ds: &str) {
    WatermarkStore::new(&config.watermark_path).save(ds.parse().unwrap()).unwrap();
}

#[allow(unused)]
pub fn watermark_bytes(config: &JobConfig) -> Option<Vec<u8>> {
    fs::read(&config.watermark_path).ok()
}

#[allow(unused)]
pub fn key(ds: &str) -> PartitionKey {
    ds.parse().unwrap()
}

/// Read the published increment back as (ds, status, orders, gross) rows,
/// ordered by (ds, status).
#[allow(unused)]
pub async fn read_output(config: &JobConfig) -> Vec<(String, String, i64, f64)> {
    let session = EngineSession::new();
    session
        .register_source("increment", &config.output_path.to_string_lossy())
        .await
        .expect("published output should open");
    let batches = session
        .query(
            "SELECT CAST(ds AS VARCHAR) AS ds, order_status, orders, gross \
             FROM increment ORDER BY ds, order_status",
        )
        .await
        .unwrap();

    let mut rows = Vec::new();
    for batch in &batches {
        // Strings read back from parquet may arrive as Utf8View; cast
        // before downcasting.
        let ds = cast(batch.column(0), &DataType::Utf8).unwrap();
        let ds = ds.as_string::<i32>();
        let status = cast(batch.column(1), &DataType::Utf8).unwrap();
        let status = status.as_string::<i32>();
        let orders = cast(batch.column(2), &DataType::Int64).unwrap();
        let orders = orders.as_primitive::<Int64Type>();
        let gross = cast(batch.column(3), &DataType::Float64).unwrap();
        let gross = gross.as_primitive::<Float64Type>();
        for row in 0..batch.num_rows() {
            assert!(!ds.is_null(row));
            rows.push((
                ds.value(row).to_string(),
                status.value(row).to_string(),
                orders.value(row),
                gross.value(row),
            ));
        }
    }
    rows
}

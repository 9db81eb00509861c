#![allow(unused_crate_dependencies)]
//! End-to-end runs of the incremental partition publisher against parquet
//! fixtures on disk.

mod common;

use std::fs;

use minilake::job::{self, Outcome};
use minilake::{Error, WatermarkStore};
use tempfile::TempDir;

use crate::common::{job_config, key, read_output, set_watermark, watermark_bytes, write_partition};

#[tokio::test]
async fn aggregates_only_the_delta_window() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0), ("pending", 5.0)]);
    write_partition(tmp.path(), "2025-10-02", &[("shipped", 20.0)]);
    write_partition(tmp.path(), "2025-10-03", &[("shipped", 30.0), ("shipped", 40.0)]);
    write_partition(tmp.path(), "2025-10-04", &[("cancelled", 7.5)]);

    let config = job_config(tmp.path());
    set_watermark(&config, "2025-10-02");

    let outcome = job::run(&config).await.unwrap();
    assert_eq!(outcome, Outcome::Published { through: key("2025-10-04"), groups: 2 });

    // Only 10-03 and 10-04 are covered; 10-01 and 10-02 stay published
    // history.
    let rows = read_output(&config).await;
    assert_eq!(rows, vec![
        ("2025-10-03".to_string(), "shipped".to_string(), 2, 70.0),
        ("2025-10-04".to_string(), "cancelled".to_string(), 1, 7.5),
    ]);

    let store = WatermarkStore::new(&config.watermark_path);
    assert_eq!(store.load().unwrap(), key("2025-10-04"));
}

#[tokio::test]
async fn no_new_partitions_is_a_noop() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-03", &[("shipped", 30.0)]);
    write_partition(tmp.path(), "2025-10-04", &[("shipped", 40.0)]);

    let config = job_config(tmp.path());
    set_watermark(&config, "2025-10-04");
    let before = watermark_bytes(&config).unwrap();

    let outcome = job::run(&config).await.unwrap();
    assert_eq!(outcome, Outcome::NoNewPartitions { watermark: key("2025-10-04") });

    // Byte-identical state, no output file.
    assert_eq!(watermark_bytes(&config).unwrap(), before);
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn missing_state_processes_the_entire_history() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0)]);
    write_partition(tmp.path(), "2025-10-02", &[("pending", 5.0), ("pending", 2.5)]);

    let config = job_config(tmp.path());
    assert!(watermark_bytes(&config).is_none());

    let outcome = job::run(&config).await.unwrap();
    assert_eq!(outcome, Outcome::Published { through: key("2025-10-02"), groups: 2 });

    let rows = read_output(&config).await;
    assert_eq!(rows, vec![
        ("2025-10-01".to_string(), "shipped".to_string(), 1, 10.0),
        ("2025-10-02".to_string(), "pending".to_string(), 2, 7.5),
    ]);
    assert_eq!(WatermarkStore::new(&config.watermark_path).load().unwrap(), key("2025-10-02"));
}

#[tokio::test]
async fn failed_publish_leaves_the_watermark_untouched() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0)]);
    write_partition(tmp.path(), "2025-10-02", &[("shipped", 20.0)]);

    let mut config = job_config(tmp.path());
    set_watermark(&config, "2025-10-01");
    let before = watermark_bytes(&config).unwrap();

    // Block the write: the destination's parent is a plain file.
    let blocker = tmp.path().join("blocked");
    fs::write(&blocker, b"not a directory").unwrap();
    config.output_path = blocker.join("orders_daily_incr.parquet");

    let err = job::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::Write { .. }), "got {err:?}");
    assert_eq!(watermark_bytes(&config).unwrap(), before);
}

#[tokio::test]
async fn watermark_partition_is_never_recounted() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-02", &[("shipped", 100.0), ("shipped", 100.0)]);
    write_partition(tmp.path(), "2025-10-03", &[("shipped", 1.0)]);

    let config = job_config(tmp.path());
    set_watermark(&config, "2025-10-02");

    let outcome = job::run(&config).await.unwrap();
    assert_eq!(outcome, Outcome::Published { through: key("2025-10-03"), groups: 1 });

    // Strictly-greater boundary: none of the 10-02 gross leaks in.
    let rows = read_output(&config).await;
    assert_eq!(rows, vec![("2025-10-03".to_string(), "shipped".to_string(), 1, 1.0)]);
}

#[tokio::test]
async fn back_to_back_runs_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0)]);
    write_partition(tmp.path(), "2025-10-02", &[("new", 4.0)]);

    let config = job_config(tmp.path());
    let first = job::run(&config).await.unwrap();
    assert_eq!(first, Outcome::Published { through: key("2025-10-02"), groups: 2 });

    let output_before = fs::read(&config.output_path).unwrap();
    let state_before = watermark_bytes(&config).unwrap();

    let second = job::run(&config).await.unwrap();
    assert_eq!(second, Outcome::NoNewPartitions { watermark: key("2025-10-02") });
    assert_eq!(fs::read(&config.output_path).unwrap(), output_before);
    assert_eq!(watermark_bytes(&config).unwrap(), state_before);
}

#[tokio::test]
async fn a_new_partition_overwrites_the_increment_file() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0)]);

    let config = job_config(tmp.path());
    let first = job::run(&config).await.unwrap();
    assert_eq!(first, Outcome::Published { through: key("2025-10-01"), groups: 1 });

    write_partition(tmp.path(), "2025-10-02", &[("pending", 6.0)]);
    let second = job::run(&config).await.unwrap();
    assert_eq!(second, Outcome::Published { through: key("2025-10-02"), groups: 1 });

    // The increment file carries only the latest window.
    let rows = read_output(&config).await;
    assert_eq!(rows, vec![("2025-10-02".to_string(), "pending".to_string(), 1, 6.0)]);
    assert_eq!(WatermarkStore::new(&config.watermark_path).load().unwrap(), key("2025-10-02"));
}

#[tokio::test]
async fn corrupt_state_aborts_before_touching_anything() {
    let tmp = TempDir::new().unwrap();
    write_partition(tmp.path(), "2025-10-01", &[("shipped", 10.0)]);

    let config = job_config(tmp.path());
    fs::write(&config.watermark_path, "{{{ definitely not json").unwrap();

    let err = job::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::CorruptState { .. }), "got {err:?}");
    assert!(!config.output_path.exists());
    assert_eq!(watermark_bytes(&config).unwrap(), b"{{{ definitely not json".to_vec());
}

#[tokio::test]
async fn an_empty_source_glob_is_unavailable() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("raw")).unwrap();

    let config = job_config(tmp.path());
    let err = job::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }), "got {err:?}");
    assert!(watermark_bytes(&config).is_none());
}

//! Atomic parquet publishing.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use datafusion::arrow::array::RecordBatch;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::parquet::arrow::ArrowWriter;
use datafusion::parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use crate::config::Codec;
use crate::error::{Error, Result};

/// Sibling path a writer targets before renaming over `path`.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes result batches to a columnar destination file.
///
/// The destination is replaced atomically: batches go into a sibling
/// `.tmp` file which is renamed over the target only after a clean close.
/// A failed write leaves any previously published file in place.
#[derive(Debug)]
pub struct Publisher {
    destination: PathBuf,
    codec:       Codec,
}

impl Publisher {
    pub fn new(destination: impl Into<PathBuf>, codec: Codec) -> Self {
        Self { destination: destination.into(), codec }
    }

    pub fn destination(&self) -> &Path { &self.destination }

    /// Write `batches` as one parquet file, creating parent directories as
    /// needed. Returns the number of rows written.
    pub fn publish(&self, batches: &[RecordBatch]) -> Result<u64> {
        let Some(first) = batches.first() else {
            return Err(Error::Validation("refusing to publish an empty result".into()));
        };
        let schema = first.schema();

        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
            }
        }

        let tmp = temp_sibling(&self.destination);
        debug!(tmp = %tmp.display(), codec = %self.codec, "Writing parquet output");

        let rows = match write_batches(&tmp, schema, batches, self.codec) {
            Ok(rows) => rows,
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
        };

        fs::rename(&tmp, &self.destination).map_err(|e| Error::write(&self.destination, e))?;
        info!(rows, path = %self.destination.display(), "Published output file");
        Ok(rows)
    }
}

fn write_batches(
    tmp: &Path,
    schema: SchemaRef,
    batches: &[RecordBatch],
    codec: Codec,
) -> Result<u64> {
    let props = WriterProperties::builder().set_compression(codec.to_parquet()).build();
    let file = fs::File::create(tmp).map_err(|e| Error::write(tmp, e))?;
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).map_err(|e| Error::write(tmp, e))?;
    let mut rows = 0u64;
    for batch in batches {
        writer.write(batch).map_err(|e| Error::write(tmp, e))?;
        rows += batch.num_rows() as u64;
    }
    writer.close().map_err(|e| Error::write(tmp, e))?;
    Ok(rows)
}

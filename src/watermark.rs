//! Persistent watermark state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::partition::PartitionKey;
use crate::publish::temp_sibling;

/// On-disk layout of the state file: one record, one field.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    last_ds: PartitionKey,
}

/// Stores the last successfully published partition key between runs.
///
/// Single-writer: nothing locks the state file, so concurrent runs
/// against one store are unsupported. Callers serialize runs externally.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    /// Read the persisted watermark.
    ///
    /// A missing file yields [`PartitionKey::beginning`]; an unparsable
    /// file is [`Error::CorruptState`], surfaced to the caller instead of
    /// being defaulted away.
    pub fn load(&self) -> Result<PartitionKey> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No watermark state on file");
                return Ok(PartitionKey::beginning());
            }
            Err(e) => return Err(e.into()),
        };
        let state: PersistedState = serde_json::from_str(&raw).map_err(|e| Error::CorruptState {
            path:   self.path.clone(),
            reason: e.to_string(),
        })?;
        debug!(last_ds = %state.last_ds, "Loaded watermark state");
        Ok(state.last_ds)
    }

    /// Persist `key` as the new watermark.
    ///
    /// Written to a sibling temp file and renamed into place. Must be the
    /// final operation of a successful run; never called on the
    /// no-new-data path.
    pub fn save(&self, key: PartitionKey) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string(&PersistedState { last_ds: key })
            .map_err(|e| Error::write(&self.path, e))?;
        let tmp = temp_sibling(&self.path);
        fs::write(&tmp, body).map_err(|e| Error::write(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::write(&self.path, e))?;
        info!(last_ds = %key, path = %self.path.display(), "Advanced watermark");
        Ok(())
    }
}

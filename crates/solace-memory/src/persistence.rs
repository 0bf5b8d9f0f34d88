//! Snapshot persistence: four JSON artifacts, one per durable tier family,
//! namespaced by the store id.
//!
//! Each artifact is written to a temp file and renamed into place, so a
//! crash mid-write leaves the previous valid artifact intact. Loading is
//! tolerant per artifact: a missing or unparsable file yields an empty tier
//! and does not prevent the other artifacts from loading.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use solace_core::{Result, SolaceError};
use tracing::{debug, info, warn};

use crate::tiers::TierExport;

pub struct SnapshotFiles {
    dir: PathBuf,
    store_id: String,
}

impl SnapshotFiles {
    pub fn new(dir: impl Into<PathBuf>, store_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            store_id: store_id.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, family: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.json", self.store_id, family))
    }

    /// Write all four artifacts. Fails on the first artifact that cannot be
    /// written; earlier artifacts that were already renamed stay valid.
    pub fn save(&self, export: &TierExport) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        self.write_artifact("short_term", &export.short_term)?;
        self.write_artifact("long_term", &export.long_term)?;
        self.write_artifact("episodic", &export.episodic)?;
        self.write_artifact("semantic", &export.semantic)?;
        info!(
            dir = %self.dir.display(),
            short_term = export.short_term.len(),
            long_term = export.long_term.len(),
            episodic = export.episodic.len(),
            semantic = export.semantic.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Read whatever artifacts exist. Missing or corrupt artifacts leave
    /// that tier empty.
    pub fn load(&self) -> TierExport {
        TierExport {
            short_term: self.read_artifact("short_term"),
            long_term: self.read_artifact("long_term"),
            episodic: self.read_artifact("episodic"),
            semantic: self.read_artifact("semantic"),
        }
    }

    fn write_artifact<T: Serialize>(&self, family: &str, items: &[T]) -> Result<()> {
        let path = self.artifact_path(family);
        let json = serde_json::to_vec(items)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| SolaceError::SnapshotWrite {
            path: tmp.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| SolaceError::SnapshotWrite {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn read_artifact<T: DeserializeOwned>(&self, family: &str) -> Vec<T> {
        let path = self.artifact_path(family);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot artifact, tier starts empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read snapshot artifact");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "corrupt snapshot artifact, tier starts empty"
                );
                Vec::new()
            }
        }
    }
}

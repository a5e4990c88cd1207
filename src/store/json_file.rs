//! JSON file backend for activity records.
//!
//! Writes go through a temporary file in the same directory that is
//! atomically renamed over the target, so readers only ever see the old
//! file or the complete new one.

use super::{LoadOutcome, RecordSource};
use crate::error::{Result, TallyError};
use crate::models::ActivityRecord;
use chrono::Local;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Record file stored as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Serialize `records` into a synced temporary file next to the target.
    ///
    /// Nothing visible changes until the returned file is passed to
    /// [`JsonFileSource::commit`]. Dropping it discards the write.
    pub fn stage(&self, records: &[ActivityRecord]) -> Result<NamedTempFile> {
        let mut staged = NamedTempFile::new_in(self.parent_dir())
            .map_err(|e| TallyError::persist(&self.path, e))?;

        let mut json = serde_json::to_vec_pretty(records)
            .map_err(|e| TallyError::persist(&self.path, io::Error::from(e)))?;
        json.push(b'\n');

        let write = |file: &mut NamedTempFile| -> io::Result<()> {
            file.write_all(&json)?;
            file.flush()?;
            file.as_file().sync_all()
        };
        write(&mut staged).map_err(|e| TallyError::persist(&self.path, e))?;

        debug!(
            "Staged {} records ({} bytes) at {}",
            records.len(),
            json.len(),
            staged.path().display()
        );
        Ok(staged)
    }

    /// Atomically replace the record file with a staged write.
    pub fn commit(&self, staged: NamedTempFile) -> Result<()> {
        staged
            .persist(&self.path)
            .map_err(|e| TallyError::persist(&self.path, e.error))?;

        // The rename is only durable once the directory entry is on disk.
        if let Err(e) = sync_dir(self.parent_dir()) {
            warn!(
                "Could not sync directory {}: {}",
                self.parent_dir().display(),
                e
            );
        }
        Ok(())
    }

    /// First free `<file>.corrupt-<stamp>[-n]` path next to the record file.
    fn quarantine_target(&self, stamp: &str) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records.json".to_string());

        let mut target = self
            .parent_dir()
            .join(format!("{}.corrupt-{}", file_name, stamp));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .parent_dir()
                .join(format!("{}.corrupt-{}-{}", file_name, stamp, attempt));
            attempt += 1;
        }
        target
    }

    /// Move an unreadable record file aside so a fresh one can be started.
    fn quarantine(&self, reason: String) -> Result<TallyError> {
        let stamp = Local::now().format("%Y%m%dT%H%M%S").to_string();
        let target = self.quarantine_target(&stamp);

        std::fs::rename(&self.path, &target).map_err(|e| TallyError::io(&self.path, e))?;
        warn!(
            "Record file {} is unreadable ({}); moved to {}",
            self.path.display(),
            reason,
            target.display()
        );

        Ok(TallyError::CorruptStorage {
            path: self.path.clone(),
            quarantined_to: target,
            reason,
        })
    }
}

/// Flush a directory's entries to disk.
///
/// Directories cannot be opened as files on every platform; there this is a
/// no-op.
fn sync_dir(dir: &Path) -> io::Result<()> {
    match std::fs::File::open(dir) {
        Ok(handle) => handle.sync_all(),
        Err(_) => Ok(()),
    }
}

impl RecordSource for JsonFileSource {
    fn load(&self) -> Result<LoadOutcome> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No record file at {}, starting empty", self.path.display());
                return Ok(LoadOutcome::default());
            }
            Err(e) => {
                let warning = self.quarantine(e.to_string())?;
                return Ok(LoadOutcome::recovered(warning));
            }
        };

        if contents.trim().is_empty() {
            return Ok(LoadOutcome::default());
        }

        match serde_json::from_str::<Vec<ActivityRecord>>(&contents) {
            Ok(records) => {
                info!(
                    "Loaded {} records from {}",
                    records.len(),
                    self.path.display()
                );
                Ok(LoadOutcome {
                    records,
                    warning: None,
                })
            }
            Err(e) => {
                let warning = self.quarantine(e.to_string())?;
                Ok(LoadOutcome::recovered(warning))
            }
        }
    }

    fn save(&self, records: &[ActivityRecord]) -> Result<()> {
        let staged = self.stage(records)?;
        self.commit(staged)?;
        info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

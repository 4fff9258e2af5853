//! Persistence of the last opened note id.
//!
//! This is the only piece of state the client keeps on disk. It is written as
//! a small JSON document (`{"note_id": "..."}`) with an atomic
//! tempfile-and-rename so a crash mid-write never leaves a torn file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use marknote_core::{defaults, Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    note_id: String,
}

/// File-backed slot holding the id of the last opened note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOpened {
    path: PathBuf,
}

impl LastOpened {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location from `MARKNOTE_STATE_FILE`, or `last_opened.json` under the
    /// user's local data directory.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var("MARKNOTE_STATE_FILE") {
            if !path.is_empty() {
                return Ok(Self::new(path));
            }
        }
        let base = dirs::data_local_dir()
            .ok_or_else(|| Error::Config("no local data directory for this user".into()))?;
        Ok(Self::new(
            base.join(defaults::STATE_DIR_NAME)
                .join(defaults::LAST_OPENED_FILE),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored id. A missing or unreadable record reads as `None`.
    pub fn load(&self) -> Result<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Record>(&raw) {
            Ok(record) if !record.note_id.is_empty() => Ok(Some(record.note_id)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(
                    subsystem = "store",
                    component = "last_opened",
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring corrupt last-opened record"
                );
                Ok(None)
            }
        }
    }

    pub fn store(&self, note_id: &str) -> Result<()> {
        let data = serde_json::to_vec(&Record {
            note_id: note_id.to_string(),
        })?;
        write_atomic(&self.path, &data)?;
        debug!(note_id, path = %self.path.display(), "Stored last opened note");
        Ok(())
    }

    /// Remove the record. Clearing an absent record is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared last opened note");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> (tempfile::TempDir, LastOpened) {
        let dir = tempfile::tempdir().unwrap();
        let slot = LastOpened::new(dir.path().join("state").join("last_opened.json"));
        (dir, slot)
    }

    #[test]
    fn test_load_missing_is_none() {
        let (_dir, slot) = slot();
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_store_then_load() {
        let (_dir, slot) = slot();
        slot.store("n42").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("n42"));

        slot.store("n43").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("n43"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, slot) = slot();
        slot.store("n1").unwrap();
        slot.clear().unwrap();
        slot.clear().unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_record_reads_as_none() {
        let (_dir, slot) = slot();
        fs::create_dir_all(slot.path().parent().unwrap()).unwrap();
        fs::write(slot.path(), "{not json").unwrap();
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_record_format() {
        let (_dir, slot) = slot();
        slot.store("abc").unwrap();
        let raw = fs::read_to_string(slot.path()).unwrap();
        assert_eq!(raw, r#"{"note_id":"abc"}"#);
    }
}

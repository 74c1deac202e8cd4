use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AttendanceError, Result};
use crate::record::Record;

/// Persists the table snapshot as a JSON array of records.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored records in file order.
    ///
    /// A missing file is created empty. A file that cannot be parsed is
    /// logged and treated as empty; it is overwritten by the next save.
    pub fn load(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            info!("Creating empty database at {:?}", self.path);
            self.save(&[])?;
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path).map_err(|e| AttendanceError::io(&self.path, e))?;
        match serde_json::from_slice::<Vec<Record>>(&bytes) {
            Ok(records) => {
                info!("Loaded {} records from {:?}", records.len(), self.path);
                Ok(records)
            }
            Err(e) => {
                warn!("Ignoring unreadable database {:?}: {}", self.path, e);
                Ok(Vec::new())
            }
        }
    }

    /// Writes the full snapshot, replacing the previous file.
    pub fn save(&self, records: &[Record]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AttendanceError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content).map_err(|e| AttendanceError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("db.json"));
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("db.json"));
        let records = vec![
            Record::new(9, "Zed", "ECE", 1, 2, 20),
            Record::new(1, "Ann", "CSE", 3, 4, 20),
        ];
        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SnapshotStore::new(&path).load().unwrap().is_empty());
    }
}

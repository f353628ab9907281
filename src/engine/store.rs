use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::{MoneyError, Result};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Duplicate(&'static str),
}

/// A file holding one JSON array of records.
///
/// Appending loads the whole array, rejects an entry equal to one already
/// present, and rewrites the file. Nothing is written until the complete new
/// array is serialized in memory. There is no locking: two processes racing
/// between load and rewrite can lose an update.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries; a missing file is an empty store.
    pub fn load(&self) -> std::result::Result<Vec<Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Store {:?} does not exist yet, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => Err(e)?,
        };
        Ok(serde_json::from_str(&text)?)
    }

    pub fn append_unique(
        &self,
        entry: Value,
        duplicate: &'static str,
    ) -> std::result::Result<(), StoreError> {
        let mut entries = self.load()?;
        log::debug!("Loaded {} entries from {:?}", entries.len(), self.path);

        if entries.iter().any(|existing| *existing == entry) {
            log::warn!("Rejecting duplicate entry for {:?}", self.path);
            Err(StoreError::Duplicate(duplicate))?
        }

        entries.push(entry);
        write_pretty(&self.path, &entries)?;
        log::debug!("Wrote {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

/// Serializes `value` with 4-space indentation and replaces the file content.
pub fn write_pretty<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> std::result::Result<(), StoreError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    fs::write(path, buf)?;
    Ok(())
}

/// A record persisted through a [`JsonStore`].
pub trait StoredRecord {
    /// Name used in "Error saving <kind> to file" messages
    const KIND: &'static str;
    const DUPLICATE_MESSAGE: &'static str;

    /// JSON view of the record as it is written to the store.
    fn to_json(&self) -> serde_json::Result<Value>;

    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let store = JsonStore::new(path);
        log::debug!("Saving {} to {:?}", Self::KIND, store.path());
        self.to_json()
            .map_err(StoreError::from)
            .and_then(|entry| store.append_unique(entry, Self::DUPLICATE_MESSAGE))
            .map_err(|e| MoneyError::from_store(Self::KIND, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_that_missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("missing.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_that_entries_are_appended_in_order() {
        let dir = tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("store.json"));

        store.append_unique(json!({"id": 1}), "dup").unwrap();
        store.append_unique(json!({"id": 2}), "dup").unwrap();

        assert_eq!(store.load().unwrap(), vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn test_that_duplicate_is_rejected_and_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonStore::new(&path);

        store.append_unique(json!({"id": 1, "ts": 1742904000.123456}), "dup").unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let result = store.append_unique(json!({"id": 1, "ts": 1742904000.123456}), "Duplicate!");
        assert!(matches!(result, Err(StoreError::Duplicate("Duplicate!"))));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_that_file_is_written_with_four_space_indent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        JsonStore::new(&path).append_unique(json!({"b": 1, "a": 2}), "dup").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[\n    {\n        \"b\": 1,\n        \"a\": 2\n    }\n]");
    }

    #[test]
    fn test_that_malformed_file_returns_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let result = JsonStore::new(&path).append_unique(json!({}), "dup");
        assert!(matches!(result, Err(StoreError::Json(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }
}

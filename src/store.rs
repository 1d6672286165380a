// JSON file store: whole-document reads and atomic whole-document writes
// inside a single data directory

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    // Reads and decodes a whole JSON document.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path_of(name);
        let content =
            std::fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
        serde_json::from_str(&content).map_err(|e| PipelineError::parse(name, &e))
    }

    // Serialises `value` as JSON and replaces `name` atomically.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| PipelineError::parse(name, &e))?;
        self.write_raw(name, &bytes)
    }

    // Writes `bytes` verbatim. The data lands in a temp file next to the target
    // first and is renamed over it, so readers never see a partial document.
    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| PipelineError::io(&self.root, e))?;
        let target = self.path_of(name);

        let mut tmp = NamedTempFile::new_in(&self.root)
            .map_err(|e| PipelineError::io(&self.root, e))?;
        let tmp_path = tmp.path().to_path_buf();
        tmp.write_all(bytes)
            .map_err(|e| PipelineError::io(&tmp_path, e))?;
        tmp.flush().map_err(|e| PipelineError::io(&tmp_path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PipelineError::io(&tmp_path, e))?;
        tmp.persist(&target)
            .map_err(|e| PipelineError::io(&target, e.error))?;

        debug!(file = name, bytes = bytes.len(), "wrote document");
        Ok(())
    }

    // File names in the data directory accepted by `filter`, sorted so that
    // repeated scans see the same order.
    pub fn list_matching<F>(&self, filter: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| PipelineError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(&self.root, e))?;
            // Follows symlinks; a dangling link is not a file
            if !entry.path().is_file() {
                continue;
            }
            // Non UTF-8 names can't follow the naming contract anyway
            if let Some(name) = entry.file_name().to_str() {
                if filter(name) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_write_then_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .write_json("codes.json", &vec!["AA".to_string(), "BB".to_string()])
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("codes.json")).unwrap();
        assert_eq!(raw, r#"["AA","BB"]"#);

        let codes: Vec<String> = store.read_json("codes.json").unwrap();
        assert_eq!(codes, vec!["AA", "BB"]);
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write_json("doc.json", &json!({"a": [1, 2, 3]})).unwrap();
        store.write_json("doc.json", &json!([])).unwrap();

        let value: Value = store.read_json("doc.json").unwrap();
        assert_eq!(value, json!([]));

        // No temp files left behind
        let all = store.list_matching(|_| true).unwrap();
        assert_eq!(all, vec!["doc.json"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.read_json::<Value>("absent.json").unwrap_err();
        assert!(matches!(err, PipelineError::IoError { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write_raw("broken.json", b"['AA', 'BB']").unwrap();

        let err = store.read_json::<Vec<String>>("broken.json").unwrap_err();
        match err {
            PipelineError::JsonParseError { context, .. } => assert_eq!(context, "broken.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_matching_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for name in ["b_Airlines.json", "a_Airlines.json", "notes.txt"] {
            store.write_raw(name, b"{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested_Airlines.json")).unwrap();

        let names = store
            .list_matching(|name| name.ends_with("_Airlines.json"))
            .unwrap();
        assert_eq!(names, vec!["a_Airlines.json", "b_Airlines.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_matching_follows_symlinks() {
        let target_dir = tempfile::tempdir().unwrap();
        let target = target_dir.path().join("de.json");
        std::fs::write(&target, r#"{"response":[{"iata_code":"LH"}]}"#).unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("AirLabs_DE_Airlines.json")).unwrap();
        std::os::unix::fs::symlink(
            target_dir.path().join("gone.json"),
            dir.path().join("AirLabs_FR_Airlines.json"),
        )
        .unwrap();
        let store = FileStore::new(dir.path());

        let names = store
            .list_matching(|name| name.ends_with("_Airlines.json"))
            .unwrap();
        assert_eq!(names, vec!["AirLabs_DE_Airlines.json"]);
    }

    #[test]
    fn test_write_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/output"));
        store.write_raw("x.json", b"[]").unwrap();
        assert!(store.exists("x.json"));
    }
}

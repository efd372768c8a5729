use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{check_quota, KeyValueBackend};
use crate::errors::PersistenceError;

const EXTENSION: &str = "json";

/// One JSON document per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileBackend {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            quota_bytes: None,
        })
    }

    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Keys map to file names one-to-one, so anything
    /// outside `[A-Za-z0-9._-]` is rejected rather than rewritten.
    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        check_quota(key, value, self.quota_bytes)?;
        let target = self.path_for(key)?;
        let staging = target.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stores_one_file_per_key() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("data")).unwrap();
        backend.set("ptt.delivery.suctionLogs.v1", "[]").unwrap();
        backend.set("fund.members.v1", "[1]").unwrap();

        assert_eq!(
            backend.get("fund.members.v1").unwrap().as_deref(),
            Some("[1]")
        );
        assert_eq!(
            backend.keys().unwrap(),
            vec!["fund.members.v1", "ptt.delivery.suctionLogs.v1"]
        );
        assert!(backend.get("absent.v1").unwrap().is_none());
    }

    #[test]
    fn keys_outside_the_file_name_alphabet_are_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("a_b", "1").unwrap();
        for key in ["a/b", "a b", "../escape", ""] {
            assert!(matches!(
                backend.set(key, "2"),
                Err(PersistenceError::InvalidKey(_))
            ));
            assert!(matches!(backend.get(key), Err(PersistenceError::InvalidKey(_))));
        }
        assert_eq!(backend.get("a_b").unwrap().as_deref(), Some("1"));
        assert_eq!(backend.keys().unwrap(), vec!["a_b"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("k", "1").unwrap();
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn quota_rejects_large_values_and_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap().with_quota(Some(4));
        backend.set("k", "[1]").unwrap();
        assert!(matches!(
            backend.set("k", "[1,2,3]"),
            Err(PersistenceError::QuotaExceeded { .. })
        ));
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("[1]"));
    }
}

use crate::traits::KeyValueStore;
use crate::ReviewError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ReviewError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ReviewError> {
        if key.is_empty() {
            return Err(ReviewError::InvalidArgument("store key is empty".to_string()));
        }

        Ok(self.root.join(format!("{}.json", urlencoding::encode(key))))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ReviewError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ReviewError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "store entry written");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), ReviewError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::traits::KeyValueStore;
    use tempfile::tempdir;

    #[test]
    fn entries_persist_across_instances() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let first = FileStore::open(dir.path().join("cache"))?;
        first.set("parse_result_42", r#"{"a":1}"#)?;

        let second = FileStore::open(dir.path().join("cache"))?;
        assert_eq!(second.get("parse_result_42")?.as_deref(), Some(r#"{"a":1}"#));
        Ok(())
    }

    #[test]
    fn delete_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileStore::open(dir.path())?;
        store.set("auth_token", "abc")?;
        store.delete("auth_token")?;
        store.delete("auth_token")?;
        assert_eq!(store.get("auth_token")?, None);
        Ok(())
    }

    #[test]
    fn keys_cannot_escape_the_root() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileStore::open(dir.path().join("inner"))?;
        store.set("../outside", "x")?;

        assert!(!dir.path().join("outside.json").exists());
        assert_eq!(store.get("../outside")?.as_deref(), Some("x"));
        assert!(store.get("").is_err());
        Ok(())
    }

    #[test]
    fn distinct_keys_never_share_a_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = FileStore::open(dir.path())?;
        store.set("a.b", "dot")?;
        store.set("a_b", "underscore")?;
        store.set("a/b", "slash")?;

        assert_eq!(store.get("a.b")?.as_deref(), Some("dot"));
        assert_eq!(store.get("a_b")?.as_deref(), Some("underscore"));
        assert_eq!(store.get("a/b")?.as_deref(), Some("slash"));

        store.delete("a.b")?;
        assert_eq!(store.get("a.b")?, None);
        assert_eq!(store.get("a_b")?.as_deref(), Some("underscore"));
        Ok(())
    }
}

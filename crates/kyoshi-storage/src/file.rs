use std::fs;
use std::path::PathBuf;

use crate::{KeyValueStore, StorageError};

/// One JSON file per key under a data directory. Writes go through a temp
/// file and rename so a crash mid-write cannot leave a truncated value.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", encode_key(key))))
    }
}

/// Keys may contain arbitrary username bytes; escape anything that is not
/// filename-safe so distinct keys never collide on disk.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02x}")),
        }
    }
    out
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    fn temp_store() -> FileStore {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "kyoshi-store-{}-{}",
            std::process::id(),
            n
        ));
        FileStore::open(dir).expect("create temp store")
    }

    #[test]
    fn roundtrip_and_remove() {
        let store = temp_store();
        assert!(store.get("userData_ana").unwrap().is_none());

        store.set("userData_ana", r#"{"grammarEntries":[]}"#).unwrap();
        assert_eq!(
            store.get("userData_ana").unwrap().as_deref(),
            Some(r#"{"grammarEntries":[]}"#)
        );

        store.remove("userData_ana").unwrap();
        assert!(store.get("userData_ana").unwrap().is_none());
        // removing again is a no-op
        store.remove("userData_ana").unwrap();
    }

    #[test]
    fn unicode_keys_do_not_collide() {
        let store = temp_store();
        store.set("userData_みか", "a").unwrap();
        store.set("userData_ゆき", "b").unwrap();
        assert_eq!(store.get("userData_みか").unwrap().as_deref(), Some("a"));
        assert_eq!(store.get("userData_ゆき").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let store = temp_store();
        assert!(matches!(
            store.set("", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}

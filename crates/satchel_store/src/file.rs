//! File-based key/value backend for persistent storage.

use crate::backend::KeyValueBackend;
use crate::error::StoreResult;
use std::fs;
use std::path::{Path, PathBuf};

const VALUE_SUFFIX: &str = ".kv";

/// A file-based key/value backend.
///
/// Each key is stored as one file under a store directory, so data
/// survives process restarts. Writes go through a temporary file and a
/// rename, keeping the previous value readable if the process dies
/// mid-write.
///
/// # Example
///
/// ```no_run
/// use satchel_store::{FileBackend, KeyValueBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("./store")).unwrap();
/// backend.set("collection.bookings", "[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens or creates a file backend at the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{VALUE_SUFFIX}", encode_key(key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.value_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.value_path(key);
        let tmp = path.with_extension("tmp");

        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(encoded) = name.strip_suffix(VALUE_SUFFIX) {
                keys.push(decode_key(encoded));
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Encodes a key into a filesystem-safe name.
///
/// Alphanumerics, `.`, `-`, and `_` pass through; everything else becomes
/// `%XX`. The encoding is reversible so `keys()` can report originals.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' | b'_' => {
                out.push(byte as char);
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn decode_key(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 3 <= bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&encoded[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();

        assert_eq!(backend.get("collection.bookings").unwrap(), None);

        backend.set("collection.bookings", r#"[{"id":"b1"}]"#).unwrap();
        assert_eq!(
            backend.get("collection.bookings").unwrap().as_deref(),
            Some(r#"[{"id":"b1"}]"#)
        );
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let mut backend = FileBackend::open(dir.path()).unwrap();
            backend.set("satchel.pending", "[]").unwrap();
        }

        let backend = FileBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("satchel.pending").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();

        backend.set("a", "1").unwrap();
        backend.remove("a").unwrap();
        backend.remove("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
    }

    #[test]
    fn keys_reports_decoded_names() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();

        backend.set("collection.audit log", "[]").unwrap();
        backend.set("collection.bookings", "[]").unwrap();

        assert_eq!(
            backend.keys().unwrap(),
            vec!["collection.audit log", "collection.bookings"]
        );
    }

    #[test]
    fn key_encoding_roundtrip() {
        for key in ["plain", "with space", "slash/colon:", "unicode.café"] {
            assert_eq!(decode_key(&encode_key(key)), key);
        }
    }
}

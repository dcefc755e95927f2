//!
//! sizehub storage module
//! ----------------------
//! Durable JSON-backed collections under a single root directory. The layer
//! stands in for a future remote backend, so the layout is deliberately plain:
//! one file per collection (`accounts.json`, `credentials.json`,
//! `session.json`), each rewritten in full on every mutation.
//!
//! Key responsibilities:
//! - Atomic whole-collection writes (temp file + rename, same directory) so a
//!   crash never leaves a half-written collection visible.
//! - Missing files read as the empty collection; malformed files are reported
//!   as `StorageUnavailable`, never silently truncated.
//!
//! The public API centers around the `Store` type, which is wrapped in a
//! `SharedStore` (`Arc<Store>`) and handed to each identity component.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

mod paths;

/// Thread-safe handle shared by the identity store, credential vault and
/// session manager. The `Store` itself is immutable (just the root path);
/// each component serializes its own mutations.
pub type SharedStore = Arc<Store>;

/// On-disk storage handle rooted at a single directory.
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Create a new Store rooted at the given filesystem path.
    /// The directory is created if it does not already exist.
    pub fn new<P: AsRef<Path>>(root: P) -> AuthResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Wrap a freshly opened store for sharing across components.
    pub fn open_shared<P: AsRef<Path>>(root: P) -> AuthResult<SharedStore> {
        Ok(Arc::new(Self::new(root)?))
    }

    /// Return the configured root folder for this Store.
    pub fn root_path(&self) -> &PathBuf {
        &self.root
    }

    /// Read a whole collection. A missing file yields the empty collection;
    /// unreadable or malformed content is a storage failure.
    pub(crate) fn read_collection<T>(&self, path: &Path) -> AuthResult<T>
    where
        T: DeserializeOwned + Default,
    {
        if !path.exists() {
            return Ok(T::default());
        }
        let bytes = fs::read(path)?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }

    /// Durably replace a whole collection: serialize, write to a sibling temp
    /// file, then rename over the target. Readers either see the previous
    /// collection or the new one, never a partial write.
    pub(crate) fn write_collection<T>(&self, path: &Path, value: &T) -> AuthResult<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path).map_err(|e| {
            // best-effort cleanup of the orphaned temp file
            let _ = fs::remove_file(&tmp);
            AuthError::from(e)
        })?;
        debug!("storage.write file={} bytes={}", path.display(), bytes.len());
        Ok(())
    }

    /// Remove a collection file. Absence is not an error.
    pub(crate) fn remove_collection(&self, path: &Path) -> AuthResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

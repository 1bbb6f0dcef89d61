//! Document store access.
//!
//! Documents are whole JSON files addressed by a name relative to the data
//! directory (`manga.json`, `data/daily-views.json`, ...). Reads distinguish
//! "absent" from "broken"; writes are atomic; deletes are idempotent.

use crate::error::{MergeError, Result};
use atomic_write_file::AtomicWriteFile;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Name of the advisory lock file inside the data directory.
const LOCK_FILE: &str = ".merge.lock";

/// Result of an idempotent delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The file or folder existed and was removed.
    Removed,
    /// Nothing was there; no-op.
    Skipped,
}

/// Key-value access to whole documents.
///
/// Implementors provide raw byte access; typed reads and writes are layered
/// on top.
pub trait DocumentStore {
    /// Load the raw contents of a document, or `None` if it does not exist.
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a document. No partial write may be observable.
    fn save(&self, name: &str, contents: &[u8]) -> Result<()>;

    /// Check whether a document or folder exists.
    fn exists(&self, name: &str) -> bool;

    /// Delete a single document.
    fn delete_file(&self, name: &str) -> io::Result<Removal>;

    /// Delete a folder and everything below it.
    fn delete_folder(&self, name: &str) -> io::Result<Removal>;

    /// Read and parse a document.
    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let Some(bytes) = self.load(name)? else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| MergeError::Parse {
                name: name.to_string(),
                source,
            })
    }

    /// Serialize a document pretty-printed with a trailing newline.
    fn write<T: Serialize + ?Sized>(&self, name: &str, document: &T) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(document)?;
        json.push(b'\n');
        self.save(name, &json)
    }
}

/// Filesystem-backed [`DocumentStore`] rooted at a data directory.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store over an existing directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(MergeError::Io(io::Error::new(
                ErrorKind::NotFound,
                format!("data directory {} does not exist", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a document.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Take an exclusive advisory lock on the data directory.
    ///
    /// The lock is held until the returned guard is dropped. Fails fast with
    /// [`MergeError::Locked`] if another process holds it.
    pub fn lock(&self) -> Result<StoreLock> {
        let file = File::create(self.path(LOCK_FILE))?;
        file.try_lock_exclusive().map_err(|_| MergeError::Locked)?;
        Ok(StoreLock { _file: file })
    }
}

impl DocumentStore for FsStore {
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MergeError::Read {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn save(&self, name: &str, contents: &[u8]) -> Result<()> {
        let write = || -> io::Result<()> {
            let mut file = AtomicWriteFile::options().open(self.path(name))?;
            file.write_all(contents)?;
            file.commit()
        };

        write().map_err(|source| MergeError::Write {
            name: name.to_string(),
            source,
        })
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn delete_file(&self, name: &str) -> io::Result<Removal> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(Removal::Removed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Removal::Skipped),
            Err(e) => Err(e),
        }
    }

    fn delete_folder(&self, name: &str) -> io::Result<Removal> {
        match fs::remove_dir_all(self.path(name)) {
            Ok(()) => Ok(Removal::Removed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Removal::Skipped),
            Err(e) => Err(e),
        }
    }
}

/// Guard for [`FsStore::lock`]. Dropping it releases the lock.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
}

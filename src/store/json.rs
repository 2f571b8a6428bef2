//! JSON document store with atomic replace-on-write

use super::{Store, StoreError};
use crate::watch::AssetId;
use async_trait::async_trait;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Single JSON object `{ "<asset>": value }` on disk
///
/// Every operation re-reads the document, so writes made by another process
/// (e.g. the CLI while the monitor is running) are picked up. Each
/// read-modify-write holds an exclusive lock on `<path>.lock`, which every
/// handle and every process opening the same document shares. The new
/// document goes to a uniquely named temp file in the same directory, is
/// fsynced and renamed over the previous one, and the directory is fsynced
/// so the rename itself survives a crash.
pub struct JsonFileStore<V> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _value: PhantomData<fn() -> V>,
}

impl<V> JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Open a store, validating the existing document
    ///
    /// A missing file starts empty. A present but unreadable file is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _value: PhantomData,
        };

        let entries = store.load().await?;
        tracing::debug!(path = ?store.path, entries = entries.len(), "Opened JSON store");

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<AssetId, V>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Block until this process holds the document's lock file
    ///
    /// The lock is released when the returned handle is dropped.
    async fn lock_file(&self) -> Result<File, StoreError> {
        let dir = self.dir().to_path_buf();
        let lock_path = self.lock_path();

        self.blocking(move || {
            std::fs::create_dir_all(&dir)?;
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
    }

    async fn persist(&self, entries: &BTreeMap<AssetId, V>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let dir = self.dir().to_path_buf();
        let path = self.path.clone();

        self.blocking(move || {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            sync_dir(&dir)
        })
        .await
    }

    /// Lock, read, apply `mutate`, persist if it reports a change
    async fn modify<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<AssetId, V>) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let _file_lock = self.lock_file().await?;

        let mut entries = self.load().await?;
        if mutate(&mut entries) {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    /// Run filesystem work that has no async counterpart off the runtime
    async fn blocking<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce() -> io::Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(io::Error::other)
            .and_then(|result| result)
            .map_err(|e| self.io_error(e))
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[async_trait]
impl<V> Store<V> for JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn get(&self, id: &AssetId) -> Result<Option<V>, StoreError> {
        let mut entries = self.load().await?;
        Ok(entries.remove(id))
    }

    async fn put(&self, id: &AssetId, value: V) -> Result<(), StoreError> {
        let id = id.clone();
        self.modify(move |entries| {
            entries.insert(id, value);
            true
        })
        .await
    }

    async fn remove(&self, id: &AssetId) -> Result<(), StoreError> {
        self.modify(|entries| entries.remove(id).is_some()).await
    }

    async fn list_all(&self) -> Result<Vec<(AssetId, V)>, StoreError> {
        Ok(self.load().await?.into_iter().collect())
    }
}

//! In-process keyed store with optional JSON file persistence

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use ulid::Generator;

use super::{Documents, ListenerHandle, RemoteStore, Snapshot, StorePath, WatchCallback};
use crate::{StoreError, StoreResult};

type Collections = BTreeMap<String, Documents>;

struct Listener {
    handle: ListenerHandle,
    collection: String,
    callback: WatchCallback,
}

#[derive(Default)]
struct Inner {
    collections: Collections,
    listeners: Vec<Listener>,
    next_listener: u64,
    /// Bumped on every committed change
    version: u64,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            version: self.version,
            documents: self
                .collections
                .get(collection)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Callbacks to run for a change to `collection`, with the snapshot they receive
    fn notifications(&self, collection: &str) -> Vec<(WatchCallback, Arc<Snapshot>)> {
        let snapshot = self.snapshot(collection);
        self.listeners
            .iter()
            .filter(|l| l.collection == collection)
            .map(|l| (l.callback.clone(), Arc::clone(&snapshot)))
            .collect()
    }
}

/// A keyed document store living in this process
///
/// Keys are ULIDs from a monotonic generator, so key order is creation
/// order. When opened with a backing file, every change is written to that
/// file atomically before it becomes visible; a failed save leaves the store
/// unchanged.
///
/// Several processes may share one backing file. Each change holds an
/// exclusive lock on `<file>.lock`, reloads the file, applies the change and
/// saves, so no process overwrites another's records. Reads answer from the
/// contents seen at the last open or change.
///
/// Watch callbacks run on the calling task after the store lock has been
/// released, so a callback may call back into the store. Each snapshot
/// carries the store version it was taken at.
pub struct LocalStore {
    inner: Mutex<Inner>,
    keys: Mutex<Generator>,
    backing: Option<PathBuf>,
    offline: AtomicBool,
    watch_denied: AtomicBool,
}

impl LocalStore {
    /// Create an empty store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            keys: Mutex::new(Generator::new()),
            backing: None,
            offline: AtomicBool::new(false),
            watch_denied: AtomicBool::new(false),
        }
    }

    /// Open a store persisted to `path`, loading its contents if the file exists
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let collections = load(&path)?;
        tracing::debug!(
            path = %path.display(),
            collections = collections.len(),
            "Opened local store"
        );

        let mut store = Self::in_memory();
        store.inner = Mutex::new(Inner {
            collections,
            ..Inner::default()
        });
        store.backing = Some(path);
        Ok(store)
    }

    /// Backing file, if the store is persisted
    pub fn backing_path(&self) -> Option<&Path> {
        self.backing.as_deref()
    }

    /// Make every write fail as if the store could not be reached
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every new watch fail with a permission error
    pub fn set_watch_denied(&self, denied: bool) {
        self.watch_denied.store(denied, Ordering::SeqCst);
    }

    /// Number of active watches across all collections
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a change, persist it, then notify watchers of the touched collection
    ///
    /// `change` returns the name of the collection it modified, or `None`
    /// when nothing changed (no save, no notification).
    ///
    /// A backed store applies `change` to the file contents read under the
    /// file lock, not to its cached copy.
    fn mutate<F>(&self, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Collections) -> StoreResult<Option<String>>,
    {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "store is offline".to_string(),
            });
        }

        let notifications = {
            let mut inner = self.lock();
            let (_file_lock, mut next) = match &self.backing {
                Some(path) => (Some(FileLock::acquire(path)?), load(path)?),
                None => (None, inner.collections.clone()),
            };
            let Some(collection) = change(&mut next)? else {
                if self.backing.is_some() {
                    inner.collections = next;
                }
                return Ok(());
            };
            if let Some(path) = &self.backing {
                save(path, &next)?;
            }
            inner.collections = next;
            inner.version += 1;
            inner.notifications(&collection)
        };

        for (callback, snapshot) in notifications {
            callback(&*snapshot);
        }
        Ok(())
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("backing", &self.backing)
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn as_documents(path: &str, value: Value) -> StoreResult<Documents> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(Documents::new()),
        other => Err(StoreError::InvalidDocument {
            path: path.to_string(),
            message: format!("expected an object of documents, found {}", other),
        }),
    }
}

#[async_trait]
impl RemoteStore for LocalStore {
    fn generate_key(&self, collection: &str) -> StoreResult<String> {
        let mut generator = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        let key = generator
            .generate()
            .map_err(|e| StoreError::KeyGeneration {
                message: e.to_string(),
            })?
            .to_string();
        tracing::trace!(collection, key = %key, "Generated key");
        Ok(key)
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        let path = StorePath::parse(path)?;
        let inner = self.lock();
        let value = match &path {
            StorePath::Collection(collection) => inner
                .collections
                .get(collection)
                .map(|docs| Value::Object(docs.clone().into_iter().collect())),
            StorePath::Document { collection, key } => inner
                .collections
                .get(collection)
                .and_then(|docs| docs.get(key))
                .cloned(),
        };
        Ok(value)
    }

    async fn write(&self, path: &str, document: Value) -> StoreResult<()> {
        let raw = path;
        let path = StorePath::parse(raw)?;
        self.mutate(|collections| {
            match path {
                StorePath::Collection(collection) => {
                    let documents = as_documents(raw, document)?;
                    collections.insert(collection.clone(), documents);
                    Ok(Some(collection))
                }
                StorePath::Document { collection, key } => {
                    if document.is_null() {
                        let removed = collections
                            .get_mut(&collection)
                            .and_then(|docs| docs.remove(&key));
                        return Ok(removed.map(|_| collection));
                    }
                    collections
                        .entry(collection.clone())
                        .or_default()
                        .insert(key, document);
                    Ok(Some(collection))
                }
            }
        })
    }

    async fn patch(&self, path: &str, partial: Value) -> StoreResult<()> {
        let raw = path;
        let path = StorePath::parse(raw)?;
        let Value::Object(fields) = partial else {
            return Err(StoreError::InvalidDocument {
                path: raw.to_string(),
                message: "patch must be an object".to_string(),
            });
        };
        self.mutate(|collections| match path {
            StorePath::Collection(collection) => {
                let documents = collections.entry(collection.clone()).or_default();
                for (key, document) in fields {
                    if document.is_null() {
                        documents.remove(&key);
                    } else {
                        documents.insert(key, document);
                    }
                }
                Ok(Some(collection))
            }
            StorePath::Document { collection, key } => {
                let documents = collections.entry(collection.clone()).or_default();
                let entry = documents
                    .entry(key)
                    .or_insert_with(|| Value::Object(Default::default()));
                let Value::Object(existing) = entry else {
                    return Err(StoreError::InvalidDocument {
                        path: raw.to_string(),
                        message: "cannot patch a non-object document".to_string(),
                    });
                };
                for (field, value) in fields {
                    if value.is_null() {
                        existing.remove(&field);
                    } else {
                        existing.insert(field, value);
                    }
                }
                Ok(Some(collection))
            }
        })
    }

    async fn erase(&self, path: &str) -> StoreResult<()> {
        let path = StorePath::parse(path)?;
        self.mutate(|collections| match path {
            StorePath::Collection(collection) => {
                Ok(collections.remove(&collection).map(|_| collection))
            }
            StorePath::Document { collection, key } => {
                let removed = collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.remove(&key));
                Ok(removed.map(|_| collection))
            }
        })
    }

    async fn watch(&self, path: &str, callback: WatchCallback) -> StoreResult<ListenerHandle> {
        if self.watch_denied.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied {
                path: path.to_string(),
            });
        }
        let StorePath::Collection(collection) = StorePath::parse(path)? else {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
            });
        };

        let (handle, snapshot) = {
            let mut inner = self.lock();
            inner.next_listener += 1;
            let handle = ListenerHandle::new(inner.next_listener);
            inner.listeners.push(Listener {
                handle,
                collection: collection.clone(),
                callback: callback.clone(),
            });
            (handle, inner.snapshot(&collection))
        };
        tracing::debug!(collection = %collection, %handle, "Watch attached");

        callback(&*snapshot);
        Ok(handle)
    }

    fn unwatch(&self, path: &str, handle: ListenerHandle) {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|l| l.handle != handle);
        if inner.listeners.len() == before {
            tracing::warn!(path, %handle, "Unwatch for unknown listener");
        } else {
            tracing::debug!(path, %handle, "Watch detached");
        }
    }
}

/// Exclusive lock on the sidecar `<file>.lock`, held while a change is
/// loaded, applied and saved
struct FileLock {
    file: fs::File,
    path: PathBuf,
}

impl FileLock {
    fn acquire(store_path: &Path) -> StoreResult<Self> {
        if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let mut name = store_path.as_os_str().to_os_string();
        name.push(".lock");
        let path = PathBuf::from(name);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.lock_exclusive()
            .map_err(|_| StoreError::LockFailed { path: path.clone() })?;
        Ok(Self { file, path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release store lock");
        }
    }
}

/// Read all collections from `path`; a missing or empty file is an empty store
fn load(path: &Path) -> StoreResult<Collections> {
    if !path.exists() {
        return Ok(Collections::new());
    }
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Collections::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write all collections to `path` atomically
///
/// Uses write-to-temp-then-rename; callers hold the [`FileLock`].
fn save(path: &Path, collections: &Collections) -> StoreResult<()> {
    let content = serde_json::to_vec_pretty(collections)?;

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| StoreError::io(&temp_path, e))?;
    temp_file
        .write_all(&content)
        .map_err(|e| StoreError::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| StoreError::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

//! RemoteSyncClient: student records over a remote keyed store

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use roster_model::StudentRecord;

use crate::store::{Documents, ListenerHandle, RemoteStore, Snapshot, WatchCallback};
use crate::{Error, Result, WriteOp};

/// Collection used when none is configured
pub const DEFAULT_COLLECTION: &str = "students";

/// Create, update, delete and watch student records in one collection
///
/// Updates are full-document replaces: the stored document becomes exactly
/// the given record, never a merge with what was stored before.
#[derive(Clone)]
pub struct RemoteSyncClient {
    store: Arc<dyn RemoteStore>,
    collection: String,
}

impl RemoteSyncClient {
    pub fn new(store: Arc<dyn RemoteStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Name of the watched collection
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn document_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// Store a new record under a freshly generated key and return the key
    ///
    /// Any `id` already on `record` is ignored; the stored document carries
    /// the new key.
    pub async fn create(&self, record: &StudentRecord) -> Result<String> {
        let key = self
            .store
            .generate_key(&self.collection)
            .map_err(|e| Error::write_failed(WriteOp::Create, e))?;

        let document = StudentRecord {
            id: Some(key.clone()),
            ..record.clone()
        };
        let value = serde_json::to_value(&document)
            .map_err(|e| Error::write_failed(WriteOp::Create, e))?;
        self.store
            .write(&self.document_path(&key), value)
            .await
            .map_err(|e| Error::write_failed(WriteOp::Create, e))?;

        tracing::info!(collection = %self.collection, id = %key, "Created student record");
        Ok(key)
    }

    /// Replace the stored record at `id`
    ///
    /// Fails with [`Error::NotFound`] if `id` is no longer in the store.
    pub async fn update(&self, id: &str, record: &StudentRecord) -> Result<()> {
        let path = self.document_path(id);
        let existing = self
            .store
            .read(&path)
            .await
            .map_err(|e| Error::write_failed(WriteOp::Update, e))?;
        if existing.is_none() {
            return Err(Error::NotFound { id: id.to_string() });
        }

        let document = StudentRecord {
            id: Some(id.to_string()),
            ..record.clone()
        };
        let value = serde_json::to_value(&document)
            .map_err(|e| Error::write_failed(WriteOp::Update, e))?;
        self.store
            .write(&path, value)
            .await
            .map_err(|e| Error::write_failed(WriteOp::Update, e))?;

        tracing::info!(collection = %self.collection, id, "Updated student record");
        Ok(())
    }

    /// Remove the record at `id`; removing a missing record succeeds
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store
            .erase(&self.document_path(id))
            .await
            .map_err(|e| Error::write_failed(WriteOp::Delete, e))?;

        tracing::info!(collection = %self.collection, id, "Deleted student record");
        Ok(())
    }

    /// Watch the collection
    ///
    /// `on_change` receives the full, key-ordered snapshot once when the
    /// watch is attached and again after every change. Calls never overlap,
    /// and a snapshot no newer than one already delivered is dropped, so the
    /// last call always reflects the latest store state. `on_change` must
    /// not write to the watched collection. The watch lasts until the
    /// returned [`Subscription`] is cancelled or dropped.
    pub async fn subscribe<F>(&self, on_change: F) -> Result<Subscription>
    where
        F: Fn(Vec<StudentRecord>) + Send + Sync + 'static,
    {
        let delivered: Mutex<Option<u64>> = Mutex::new(None);
        let callback: WatchCallback = Arc::new(move |snapshot: &Snapshot| {
            let mut delivered = delivered.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*delivered, Some(version) if snapshot.version <= version) {
                tracing::debug!(version = snapshot.version, "Dropping stale snapshot");
                return;
            }
            *delivered = Some(snapshot.version);
            on_change(decode_snapshot(&snapshot.documents));
        });

        let handle = self
            .store
            .watch(&self.collection, callback)
            .await
            .map_err(|e| Error::SubscriptionFailed {
                path: self.collection.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(collection = %self.collection, %handle, "Subscribed");
        Ok(Subscription {
            store: Arc::clone(&self.store),
            path: self.collection.clone(),
            handle: Some(handle),
        })
    }

    /// Release a subscription
    pub fn unsubscribe(&self, subscription: Subscription) {
        subscription.cancel();
    }
}

impl fmt::Debug for RemoteSyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSyncClient")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// Turn raw collection contents into records, in key order
///
/// The key is authoritative for `id`. Documents that do not decode as a
/// student record are skipped with a warning.
pub fn decode_snapshot(documents: &Documents) -> Vec<StudentRecord> {
    documents
        .iter()
        .filter_map(|(key, value)| {
            match serde_json::from_value::<StudentRecord>(value.clone()) {
                Ok(record) => Some(StudentRecord {
                    id: Some(key.clone()),
                    ..record
                }),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}

/// An active collection watch
///
/// The watch is released exactly once: by [`Subscription::cancel`] or, if
/// that is never called, when the subscription is dropped.
pub struct Subscription {
    store: Arc<dyn RemoteStore>,
    path: String,
    handle: Option<ListenerHandle>,
}

impl Subscription {
    /// Store handle of the watch, while it is active
    pub fn handle(&self) -> Option<ListenerHandle> {
        self.handle
    }

    /// Release the watch now
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.store.unwatch(&self.path, handle);
            tracing::debug!(path = %self.path, %handle, "Unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("handle", &self.handle)
            .finish()
    }
}

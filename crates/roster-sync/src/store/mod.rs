//! RemoteStore trait and related types

mod local;

pub use local::LocalStore;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{StoreError, StoreResult};

/// Full contents of a collection, keyed by generated key
pub type Documents = BTreeMap<String, Value>;

/// Full contents of a watched collection as of one store version
///
/// Versions grow with every committed change. Callbacks can run on
/// different threads at once, so a listener may see an older snapshot after
/// a newer one and should ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub documents: Documents,
}

/// Callback invoked with every snapshot of a watched collection
pub type WatchCallback = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Token identifying an active watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A parsed store path
///
/// Paths are either a collection (`"students"`) or a document in a
/// collection (`"students/<key>"`). Leading and trailing slashes are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorePath {
    Collection(String),
    Document { collection: String, key: String },
}

impl StorePath {
    pub fn parse(path: &str) -> StoreResult<Self> {
        let invalid = || StoreError::InvalidPath {
            path: path.to_string(),
        };
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        match segments.as_slice() {
            [collection] => Ok(StorePath::Collection(collection.to_string())),
            [collection, key] => Ok(StorePath::Document {
                collection: collection.to_string(),
                key: key.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            StorePath::Collection(collection) => collection,
            StorePath::Document { collection, .. } => collection,
        }
    }
}

/// Operations the application needs from a remote keyed store
///
/// Writes are full overwrites, patches merge top-level fields, and watchers
/// receive the full contents of the watched collection on every change.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Produce a unique key for a new document without writing anything
    fn generate_key(&self, collection: &str) -> StoreResult<String>;

    /// Current document at `path`, if any
    async fn read(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Overwrite the value at `path`
    async fn write(&self, path: &str, document: Value) -> StoreResult<()>;

    /// Merge the fields of `partial` into the value at `path`
    async fn patch(&self, path: &str, partial: Value) -> StoreResult<()>;

    /// Delete the value at `path`; deleting a missing value is not an error
    async fn erase(&self, path: &str) -> StoreResult<()>;

    /// Watch a collection; `callback` also fires once with the current contents
    async fn watch(&self, path: &str, callback: WatchCallback) -> StoreResult<ListenerHandle>;

    /// Stop a watch previously returned by [`RemoteStore::watch`]
    fn unwatch(&self, path: &str, handle: ListenerHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_collection() {
        assert_eq!(
            StorePath::parse("/students").unwrap(),
            StorePath::Collection("students".to_string())
        );
    }

    #[test]
    fn test_parse_document() {
        let path = StorePath::parse("students/01HZX/").unwrap();
        assert_eq!(
            path,
            StorePath::Document {
                collection: "students".to_string(),
                key: "01HZX".to_string()
            }
        );
        assert_eq!(path.collection(), "students");
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("students//key")]
    #[case("students/key/name")]
    fn test_parse_rejects(#[case] path: &str) {
        assert!(matches!(
            StorePath::parse(path),
            Err(StoreError::InvalidPath { .. })
        ));
    }
}

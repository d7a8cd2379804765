//! ListViewModel: the live list of student records
//!
//! The view model starts `Empty` and moves to `Populated` with every snapshot
//! delivered by the subscription. Each snapshot replaces the previous one
//! wholesale. Deletes are not applied locally; a deleted record disappears
//! when the store delivers the next snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roster_model::StudentRecord;
use roster_sync::{RemoteSyncClient, Subscription};

use crate::Result;
use crate::form::FormStateController;

/// What the list currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    /// No snapshot received yet
    #[default]
    Empty,
    /// The most recent snapshot, in collection order
    Populated(Vec<StudentRecord>),
}

#[derive(Debug, Default)]
struct Shared {
    state: ListState,
    /// True when a snapshot has arrived since the last render
    dirty: bool,
    disposed: bool,
}

/// Live view of the student collection
///
/// The subscription is acquired once in [`ListViewModel::activate`] and
/// released once, by [`ListViewModel::dispose`] or on drop. Snapshots that
/// arrive after disposal are ignored.
pub struct ListViewModel {
    client: RemoteSyncClient,
    shared: Arc<RwLock<Shared>>,
    subscription: Option<Subscription>,
    subscription_error: Option<String>,
}

impl ListViewModel {
    /// Subscribe to the collection and start tracking snapshots
    ///
    /// If the subscription cannot be established the view model stays
    /// `Empty` and the failure is available from
    /// [`ListViewModel::subscription_error`].
    pub async fn activate(client: RemoteSyncClient) -> Self {
        let shared = Arc::new(RwLock::new(Shared::default()));
        let sink = Arc::clone(&shared);

        let result = client
            .subscribe(move |records| {
                let mut shared = write(&sink);
                if shared.disposed {
                    return;
                }
                tracing::debug!(count = records.len(), "Snapshot received");
                shared.state = ListState::Populated(records);
                shared.dirty = true;
            })
            .await;

        let (subscription, subscription_error) = match result {
            Ok(subscription) => (Some(subscription), None),
            Err(e) => {
                tracing::warn!(error = %e, "List subscription failed; staying empty");
                (None, Some(e.to_string()))
            }
        };

        Self {
            client,
            shared,
            subscription,
            subscription_error,
        }
    }

    /// Current state
    pub fn state(&self) -> ListState {
        read(&self.shared).state.clone()
    }

    /// Records of the latest snapshot; empty before the first one
    pub fn records(&self) -> Vec<StudentRecord> {
        match &read(&self.shared).state {
            ListState::Empty => Vec::new(),
            ListState::Populated(records) => records.clone(),
        }
    }

    /// Record with the given id in the latest snapshot
    pub fn find(&self, id: &str) -> Option<StudentRecord> {
        match &read(&self.shared).state {
            ListState::Empty => None,
            ListState::Populated(records) => records
                .iter()
                .find(|r| r.id.as_deref() == Some(id))
                .cloned(),
        }
    }

    /// Whether the subscription is active
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Why the subscription could not be established, if it failed
    pub fn subscription_error(&self) -> Option<&str> {
        self.subscription_error.as_deref()
    }

    /// Check and clear the "new snapshot" flag
    pub fn take_dirty(&self) -> bool {
        let mut shared = write(&self.shared);
        std::mem::take(&mut shared.dirty)
    }

    /// Load the record with `id` into the form for editing
    ///
    /// Returns `false` and leaves the form untouched if the record is not in
    /// the latest snapshot (it may have been deleted meanwhile).
    pub fn request_edit(&self, id: &str, form: &mut FormStateController) -> bool {
        match self.find(id) {
            Some(record) => {
                form.load_for_edit(record);
                true
            }
            None => {
                tracing::debug!(id, "Edit requested for record not in snapshot");
                false
            }
        }
    }

    /// Ask the store to delete the record with `id`
    ///
    /// The list keeps showing the record until the next snapshot arrives.
    pub async fn request_delete(&self, id: &str) -> Result<()> {
        self.client.delete(id).await?;
        Ok(())
    }

    /// Release the subscription; no state changes happen afterwards
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        write(&self.shared).disposed = true;
        if let Some(subscription) = self.subscription.take() {
            self.client.unsubscribe(subscription);
        }
    }
}

impl Drop for ListViewModel {
    fn drop(&mut self) {
        self.release();
    }
}

fn read(shared: &RwLock<Shared>) -> RwLockReadGuard<'_, Shared> {
    shared.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(shared: &RwLock<Shared>) -> RwLockWriteGuard<'_, Shared> {
    shared.write().unwrap_or_else(PoisonError::into_inner)
}

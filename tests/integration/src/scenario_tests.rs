//! Scenario tests for the data-entry flow
//!
//! Each section drives the form, the sync client and the live list together
//! against an in-memory store, covering the round trip, delete convergence,
//! edit fidelity and the failure modes a user can hit.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use roster_core::{Error, FormStateController, ListState, ListViewModel, SubmitOutcome};
use roster_model::{Field, LocationHierarchy, PaymentMode, StudentRecord, validate};
use roster_sync::{LocalStore, RemoteStore, RemoteSyncClient};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    store: Arc<LocalStore>,
    client: RemoteSyncClient,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(LocalStore::in_memory());
        let client = RemoteSyncClient::new(store.clone(), "students");
        Self { store, client }
    }

    fn form(&self) -> FormStateController {
        FormStateController::new(Arc::new(LocationHierarchy::builtin()), self.client.clone())
    }
}

fn asha() -> StudentRecord {
    StudentRecord {
        name: "Asha".to_string(),
        mobile: "9876543210".to_string(),
        payment: Some(PaymentMode::Cash),
        ..Default::default()
    }
}

fn fill(form: &mut FormStateController, record: &StudentRecord) {
    for field in Field::ALL {
        form.set_field(field, record.get(field)).unwrap();
    }
}

// =============================================================================
// Round trip and convergence
// =============================================================================

#[tokio::test]
async fn created_record_appears_once_in_next_snapshot() {
    let h = Harness::new();
    let list = ListViewModel::activate(h.client.clone()).await;
    let record = StudentRecord {
        email: "asha@example.com".to_string(),
        fees: "750".to_string(),
        date: "2024-08-20".to_string(),
        country: "India".to_string(),
        state: "Madhya Pradesh".to_string(),
        city: "Bhopal".to_string(),
        ..asha()
    };

    let id = h.client.create(&record).await.unwrap();

    let records = list.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0],
        StudentRecord {
            id: Some(id),
            ..record
        }
    );
}

#[tokio::test]
async fn deleted_record_is_gone_from_next_snapshot() {
    let h = Harness::new();
    let list = ListViewModel::activate(h.client.clone()).await;
    let keep = h.client.create(&asha()).await.unwrap();
    let gone = h.client.create(&asha()).await.unwrap();
    list.take_dirty();

    list.request_delete(&gone).await.unwrap();

    assert!(list.take_dirty());
    let ids: Vec<_> = list.records().into_iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, vec![keep]);
}

#[tokio::test]
async fn edit_load_then_submit_writes_identical_document() {
    let h = Harness::new();
    let list = ListViewModel::activate(h.client.clone()).await;
    let id = h
        .client
        .create(&StudentRecord {
            address: "4 Park Street".to_string(),
            country: "USA".to_string(),
            state: "California".to_string(),
            city: "Los Angeles".to_string(),
            ..asha()
        })
        .await
        .unwrap();
    let before = h.store.read(&format!("students/{id}")).await.unwrap();

    let mut form = h.form();
    assert!(list.request_edit(&id, &mut form));
    form.submit().await.unwrap();

    let after = h.store.read(&format!("students/{id}")).await.unwrap();
    assert_eq!(after, before);
}

// =============================================================================
// Validation and cascade
// =============================================================================

#[tokio::test]
async fn fees_require_a_date_only_when_non_zero() {
    let h = Harness::new();
    let mut draft = asha();
    assert_eq!(validate(&draft), Ok(()));

    draft.fees = "500".to_string();
    let mut form = h.form();
    fill(&mut form, &draft);
    assert!(form.date_required());

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(form.draft(), &draft, "draft preserved after validation failure");

    // Back to zero: the date is no longer needed
    form.set_field(Field::Fees, "0").unwrap();
    assert!(matches!(form.submit().await, Ok(SubmitOutcome::Created(_))));
}

#[test]
fn country_change_clears_dependent_fields() {
    let h = Harness::new();
    let mut form = h.form();
    form.set_field(Field::Country, "India").unwrap();
    form.set_field(Field::State, "Maharashtra").unwrap();
    form.set_field(Field::City, "Pune").unwrap();

    form.set_field(Field::Country, "USA").unwrap();

    assert_eq!(form.draft().country, "USA");
    assert_eq!(form.draft().state, "");
    assert_eq!(form.draft().city, "");
    assert_eq!(form.state_options().unwrap(), vec!["California", "Texas"]);
    assert!(form.city_options().unwrap().is_empty());
}

#[test]
fn unknown_location_fails_without_touching_draft() {
    let h = Harness::new();
    let mut form = h.form();
    form.set_field(Field::Country, "India").unwrap();

    let err = form.set_field(Field::State, "Texas").unwrap_err();

    assert!(err.is_invalid_lookup());
    assert_eq!(form.draft().country, "India");
    assert_eq!(form.draft().state, "");
}

// =============================================================================
// Remote failures
// =============================================================================

#[tokio::test]
async fn offline_submit_keeps_draft_for_resubmit() {
    let h = Harness::new();
    let mut form = h.form();
    fill(&mut form, &asha());
    h.store.set_offline(true);

    let err = form.submit().await.unwrap_err();

    assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    assert_eq!(form.draft(), &asha());

    h.store.set_offline(false);
    assert!(form.submit().await.is_ok());
    assert!(!form.is_editing());
    assert_eq!(form.draft(), &StudentRecord::default());
}

#[tokio::test]
async fn updating_a_concurrently_deleted_record_reports_not_found() {
    let h = Harness::new();
    let list = ListViewModel::activate(h.client.clone()).await;
    let id = h.client.create(&asha()).await.unwrap();
    let mut form = h.form();
    assert!(list.request_edit(&id, &mut form));

    h.client.delete(&id).await.unwrap();
    form.set_field(Field::Name, "Asha K").unwrap();
    let err = form.submit().await.unwrap_err();

    assert_eq!(err.user_message(), "This student no longer exists.");
    assert_eq!(form.draft().name, "Asha K");
    assert!(list.records().is_empty(), "no record is resurrected");
    assert!(!list.request_edit(&id, &mut form));
}

#[tokio::test]
async fn denied_subscription_leaves_list_empty() {
    let h = Harness::new();
    h.store.set_watch_denied(true);

    let list = ListViewModel::activate(h.client.clone()).await;

    assert_eq!(list.state(), ListState::Empty);
    assert!(list.subscription_error().is_some());
    assert_eq!(h.store.listener_count(), 0);
}

// =============================================================================
// Subscription lifetime
// =============================================================================

#[tokio::test]
async fn each_view_model_holds_exactly_one_listener() {
    let h = Harness::new();
    let first = ListViewModel::activate(h.client.clone()).await;
    let second = ListViewModel::activate(h.client.clone()).await;
    assert_eq!(h.store.listener_count(), 2);

    first.dispose();
    assert_eq!(h.store.listener_count(), 1);

    h.client.create(&asha()).await.unwrap();
    assert_eq!(second.records().len(), 1);

    drop(second);
    assert_eq!(h.store.listener_count(), 0);
}

//! End-to-end integration test for the vertical slice
//!
//! This test exercises the complete flow: config loading -> store -> form
//! submit -> live list.

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use roster_core::{AppConfig, FormStateController, ListState, ListViewModel, SubmitOutcome};
use roster_model::{Field, PaymentMode};
use tempfile::TempDir;

/// Set up a config file with a store file and a custom location table
fn setup_config() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("locations.toml"),
        r#"
[India]
Kerala = ["Kochi", "Thiruvananthapuram"]
Maharashtra = ["Mumbai", "Pune"]
"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("config.toml"),
        r#"
[store]
path = "data/students.json"

[locations]
file = "locations.toml"
"#,
    )
    .unwrap();
    temp
}

#[tokio::test]
async fn test_register_edit_delete_through_config() {
    let temp = setup_config();
    let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
    let locations = Arc::new(config.location_hierarchy().unwrap());
    assert_eq!(locations.countries(), vec!["India"]);

    let client = config.sync_client().unwrap();
    let list = ListViewModel::activate(client.clone()).await;
    assert_eq!(list.state(), ListState::Populated(Vec::new()));

    // Register
    let mut form = FormStateController::new(Arc::clone(&locations), client.clone());
    for (field, value) in [
        (Field::Name, "Asha"),
        (Field::Mobile, "9876543210"),
        (Field::Payment, "UPI"),
        (Field::Fees, "1200"),
        (Field::Date, "2024-06-01"),
        (Field::Country, "India"),
        (Field::State, "Kerala"),
        (Field::City, "Kochi"),
    ] {
        form.set_field(field, value).unwrap();
    }
    let outcome = form.submit().await.unwrap();
    let SubmitOutcome::Created(id) = outcome else {
        panic!("expected a create");
    };

    let records = list.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some(id.as_str()));
    assert_eq!(records[0].payment, Some(PaymentMode::Upi));
    assert_eq!(records[0].city, "Kochi");

    // Edit
    assert!(list.request_edit(&id, &mut form));
    form.set_field(Field::State, "Maharashtra").unwrap();
    form.set_field(Field::City, "Pune").unwrap();
    assert_eq!(form.submit().await.unwrap(), SubmitOutcome::Updated(id.clone()));
    assert_eq!(list.find(&id).unwrap().city, "Pune");

    // The file on disk holds the same document
    let raw = fs::read_to_string(temp.path().join("data/students.json")).unwrap();
    let on_disk: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["students"][&id]["state"], "Maharashtra");

    // Delete
    list.request_delete(&id).await.unwrap();
    assert!(list.records().is_empty());
    list.dispose();

    // A fresh process sees the same (empty) collection
    let reopened = ListViewModel::activate(config.sync_client().unwrap()).await;
    assert!(reopened.records().is_empty());
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp = setup_config();
    let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
    let locations = Arc::new(config.location_hierarchy().unwrap());

    let mut form = FormStateController::new(Arc::clone(&locations), config.sync_client().unwrap());
    form.set_field(Field::Name, "Ravi").unwrap();
    form.set_field(Field::Mobile, "9123456780").unwrap();
    form.set_field(Field::Payment, "Cheque").unwrap();
    form.submit().await.unwrap();

    let list = ListViewModel::activate(config.sync_client().unwrap()).await;
    let records = list.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ravi");
    assert_eq!(records[0].payment, Some(PaymentMode::Cheque));
}

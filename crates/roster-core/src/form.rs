//! FormStateController: the draft record behind the registration form
//!
//! Every edit goes through [`FormStateController::set_field`], which checks
//! the value, applies it, and clears dependent location fields in one step.
//! Callers never see a draft with a new country and a stale state or city.

use std::sync::Arc;

use roster_model::{Draft, Field, LocationHierarchy, StudentRecord, validate};
use roster_sync::RemoteSyncClient;

use crate::{Error, Result};

/// What a successful submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new record was stored under this key
    Created(String),
    /// The record with this key was replaced
    Updated(String),
}

impl SubmitOutcome {
    pub fn id(&self) -> &str {
        match self {
            SubmitOutcome::Created(id) | SubmitOutcome::Updated(id) => id,
        }
    }

    /// Confirmation shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Created(_) => "Student saved successfully!",
            SubmitOutcome::Updated(_) => "Student updated successfully!",
        }
    }
}

/// Owns the draft record and its lifecycle
pub struct FormStateController {
    draft: Draft,
    locations: Arc<LocationHierarchy>,
    client: RemoteSyncClient,
}

impl FormStateController {
    /// Create a controller with an empty draft
    pub fn new(locations: Arc<LocationHierarchy>, client: RemoteSyncClient) -> Self {
        Self {
            draft: Draft::default(),
            locations,
            client,
        }
    }

    /// The current draft
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Whether the draft is an existing record being edited
    pub fn is_editing(&self) -> bool {
        self.draft.id.is_some()
    }

    /// Whether the payment date must be filled in before submitting
    pub fn date_required(&self) -> bool {
        self.draft.has_fees()
    }

    /// Set one field of the draft
    ///
    /// Setting `country` clears `state` and `city`; setting `state` clears
    /// `city`. Non-empty location values must exist in the hierarchy under
    /// the current parent values. On any error the draft is left unchanged.
    ///
    /// Changing `fees` back to `"0"` keeps whatever `date` was entered.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
        field.check(value)?;

        let locations = &self.locations;
        let lookup = |result: std::result::Result<(), roster_model::LookupError>| {
            result.map_err(|e| Error::Model(e.into()))
        };

        let mut next = self.draft.clone();
        match field {
            Field::Country => {
                if !value.is_empty() {
                    lookup(locations.check_country(value))?;
                }
                next.country = value.to_string();
                next.state.clear();
                next.city.clear();
            }
            Field::State => {
                if !value.is_empty() {
                    lookup(locations.check_state(&next.country, value))?;
                }
                next.state = value.to_string();
                next.city.clear();
            }
            Field::City => {
                if !value.is_empty() {
                    lookup(locations.check_city(&next.country, &next.state, value))?;
                }
                next.city = value.to_string();
            }
            _ => next.put(field, value)?,
        }

        tracing::debug!(field = %field, "Draft field set");
        self.draft = next;
        Ok(())
    }

    /// Set a field by its stored name
    pub fn set_field_by_name(&mut self, name: &str, value: &str) -> Result<()> {
        let field: Field = name.parse()?;
        self.set_field(field, value)
    }

    /// Replace the draft with a copy of an existing record
    ///
    /// The record is taken as already consistent; no cascading is applied.
    pub fn load_for_edit(&mut self, record: StudentRecord) {
        tracing::debug!(id = ?record.id, "Draft loaded for edit");
        self.draft = record;
    }

    /// Replace the draft with an empty one
    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    /// Validate and persist the draft
    ///
    /// A draft without an `id` is created, otherwise the stored record is
    /// replaced. The draft is reset only after the store confirms the write;
    /// on any failure it is left exactly as it was.
    ///
    /// The write runs as its own task and must be called within a tokio
    /// runtime. If this future is dropped before completion the write still
    /// finishes, but the draft is not reset.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        if let Err(failure) = validate(&self.draft) {
            tracing::debug!(reason = %failure, "Submit rejected");
            return Err(failure.into());
        }

        let client = self.client.clone();
        let record = self.draft.clone();
        let write = tokio::spawn(async move {
            match record.id.clone() {
                Some(id) => client
                    .update(&id, &record)
                    .await
                    .map(|()| SubmitOutcome::Updated(id)),
                None => client.create(&record).await.map(SubmitOutcome::Created),
            }
        });

        let outcome = write.await.map_err(|e| Error::TaskFailed {
            message: e.to_string(),
        })??;

        self.reset();
        Ok(outcome)
    }

    /// Countries to offer in the country picker
    pub fn country_options(&self) -> Vec<&str> {
        self.locations.countries()
    }

    /// States of the selected country; empty while no country is selected
    pub fn state_options(&self) -> Result<Vec<&str>> {
        if self.draft.country.is_empty() {
            return Ok(Vec::new());
        }
        self.locations
            .states(&self.draft.country)
            .map_err(|e| Error::Model(e.into()))
    }

    /// Cities of the selected state; empty while no state is selected
    pub fn city_options(&self) -> Result<Vec<&str>> {
        if self.draft.state.is_empty() {
            return Ok(Vec::new());
        }
        let cities = self
            .locations
            .cities(&self.draft.country, &self.draft.state)
            .map_err(|e| Error::Model(e.into()))?;
        Ok(cities.iter().map(String::as_str).collect())
    }
}

//! Static country → state → city reference data
//!
//! The hierarchy is loaded once at startup and only ever looked up. Lookups
//! of a country or state that is not present return a [`LookupError`]
//! instead of panicking, so a bad cascading value is a recoverable error.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Countries, their states, and each state's ordered city list
///
/// Stored as TOML with one table per country:
///
/// ```toml
/// [India]
/// Maharashtra = ["Mumbai", "Pune", "Nagpur"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationHierarchy {
    countries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// A location value absent from the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Unknown country: {country}")]
    UnknownCountry { country: String },

    #[error("Unknown state '{state}' in {country}")]
    UnknownState { country: String, state: String },

    #[error("Unknown city '{city}' in {state}, {country}")]
    UnknownCity {
        country: String,
        state: String,
        city: String,
    },
}

impl LocationHierarchy {
    /// The reference table shipped with the application
    pub fn builtin() -> Self {
        fn state(name: &str, cities: &[&str]) -> (String, Vec<String>) {
            (
                name.to_string(),
                cities.iter().map(|c| c.to_string()).collect(),
            )
        }

        let countries = BTreeMap::from([
            (
                "India".to_string(),
                BTreeMap::from([
                    state("Madhya Pradesh", &["Bhopal", "Indore", "Jabalpur"]),
                    state("Maharashtra", &["Mumbai", "Pune", "Nagpur"]),
                ]),
            ),
            (
                "USA".to_string(),
                BTreeMap::from([
                    state("California", &["Los Angeles", "San Francisco"]),
                    state("Texas", &["Houston", "Dallas"]),
                ]),
            ),
        ]);

        Self { countries }
    }

    /// Parse a hierarchy from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a hierarchy from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::LocationIo {
            path: path.to_path_buf(),
            source,
        })?;
        let hierarchy = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            countries = hierarchy.countries.len(),
            "Loaded location hierarchy"
        );
        Ok(hierarchy)
    }

    /// All country names
    pub fn countries(&self) -> Vec<&str> {
        self.countries.keys().map(String::as_str).collect()
    }

    /// State names of a country
    pub fn states(&self, country: &str) -> std::result::Result<Vec<&str>, LookupError> {
        let states = self.country(country)?;
        Ok(states.keys().map(String::as_str).collect())
    }

    /// Ordered city list of a state
    pub fn cities(&self, country: &str, state: &str) -> std::result::Result<&[String], LookupError> {
        let states = self.country(country)?;
        states
            .get(state)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::UnknownState {
                country: country.to_string(),
                state: state.to_string(),
            })
    }

    /// Succeeds if `country` is a key of the hierarchy
    pub fn check_country(&self, country: &str) -> std::result::Result<(), LookupError> {
        self.country(country).map(|_| ())
    }

    /// Succeeds if `state` is a state of `country`
    pub fn check_state(&self, country: &str, state: &str) -> std::result::Result<(), LookupError> {
        self.cities(country, state).map(|_| ())
    }

    /// Succeeds if `city` is in the city list of `state`
    pub fn check_city(
        &self,
        country: &str,
        state: &str,
        city: &str,
    ) -> std::result::Result<(), LookupError> {
        if self.cities(country, state)?.iter().any(|c| c == city) {
            Ok(())
        } else {
            Err(LookupError::UnknownCity {
                country: country.to_string(),
                state: state.to_string(),
                city: city.to_string(),
            })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    fn country(
        &self,
        country: &str,
    ) -> std::result::Result<&BTreeMap<String, Vec<String>>, LookupError> {
        self.countries
            .get(country)
            .ok_or_else(|| LookupError::UnknownCountry {
                country: country.to_string(),
            })
    }
}

//! Locations command implementation

use colored::Colorize;

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the locations command
///
/// Prints countries, the states of `country`, or the cities of `state`.
pub fn run_locations(ctx: &Context, country: Option<&str>, state: Option<&str>) -> Result<()> {
    let (title, names) = choices(ctx, country, state)?;

    println!("{}:", title.bold());
    if names.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in names {
        println!("  - {}", name.cyan());
    }
    Ok(())
}

fn choices(
    ctx: &Context,
    country: Option<&str>,
    state: Option<&str>,
) -> Result<(String, Vec<String>)> {
    fn owned(names: Vec<&str>) -> Vec<String> {
        names.into_iter().map(str::to_string).collect()
    }
    let locations = &ctx.locations;

    match (country, state) {
        (None, _) => Ok(("Countries".to_string(), owned(locations.countries()))),
        (Some(country), None) => {
            let states = locations
                .states(country)
                .map_err(|e| CliError::Model(e.into()))?;
            Ok((format!("States of {country}"), owned(states)))
        }
        (Some(country), Some(state)) => {
            let cities = locations
                .cities(country, state)
                .map_err(|e| CliError::Model(e.into()))?;
            Ok((format!("Cities of {state}, {country}"), cities.to_vec()))
        }
    }
}

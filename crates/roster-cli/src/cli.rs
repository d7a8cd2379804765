//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roster_model::Field;

/// Roster - Register students and keep the list in sync
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to <config dir>/roster/config.toml)
    #[arg(long, global = true, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store file, overriding the configured one
    #[arg(long, global = true, env = "ROSTER_STORE")]
    pub store: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List registered students
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Register a new student
    ///
    /// Examples:
    ///   roster add --name Asha --mobile 9876543210 --payment Cash
    ///   roster add --name Ravi --mobile 9123456780 --payment UPI \
    ///       --fees 500 --date 2024-06-01 --country India --state Maharashtra --city Pune
    Add {
        #[command(flatten)]
        fields: RecordArgs,
    },

    /// Edit a registered student
    ///
    /// Only the given fields change. Changing the country clears state and
    /// city; changing the state clears city.
    Edit {
        /// Id of the student
        id: String,

        #[command(flatten)]
        fields: RecordArgs,
    },

    /// Delete a registered student
    Delete {
        /// Id of the student
        id: String,
    },

    /// Show the location choices
    ///
    /// Without arguments lists countries; with a country lists its states;
    /// with a country and state lists its cities.
    Locations {
        /// Country to list states for
        country: Option<String>,

        /// State to list cities for
        state: Option<String>,
    },
}

/// Student fields accepted by `add` and `edit`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordArgs {
    /// Student name
    #[arg(long)]
    pub name: Option<String>,

    /// Mobile number (digits only, at most 10)
    #[arg(long)]
    pub mobile: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Fees amount ("0" for none)
    #[arg(long)]
    pub fees: Option<String>,

    /// Payment date (YYYY-MM-DD), required when fees are not 0
    #[arg(long)]
    pub date: Option<String>,

    /// Payment mode: Cash, UPI or Cheque
    #[arg(long)]
    pub payment: Option<String>,

    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// State within the country
    #[arg(long)]
    pub state: Option<String>,

    /// City within the state
    #[arg(long)]
    pub city: Option<String>,
}

impl RecordArgs {
    /// Given fields in form order, so parents are set before their dependents
    pub fn edits(&self) -> Vec<(Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(|field| self.value(field).map(|v| (field, v)))
            .collect()
    }

    fn value(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => &self.name,
            Field::Mobile => &self.mobile,
            Field::Email => &self.email,
            Field::Address => &self.address,
            Field::Fees => &self.fees,
            Field::Date => &self.date,
            Field::Payment => &self.payment,
            Field::Country => &self.country,
            Field::State => &self.state,
            Field::City => &self.city,
        };
        value.as_deref()
    }
}

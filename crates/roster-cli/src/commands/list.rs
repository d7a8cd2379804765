//! List command implementation

use colored::Colorize;

use roster_core::ListViewModel;
use roster_model::StudentRecord;

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the list command
///
/// Subscribes to the student collection, prints the first snapshot and
/// releases the subscription.
pub async fn run_list(ctx: &Context, json: bool) -> Result<()> {
    let list = ListViewModel::activate(ctx.client()?).await;
    if let Some(reason) = list.subscription_error() {
        return Err(CliError::user(format!("Cannot load students: {reason}")));
    }
    let records = list.records();
    list.dispose();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No students registered yet.");
        println!();
        println!("Run {} to register one.", "roster add".cyan());
        return Ok(());
    }

    println!("{}", "Students".bold());
    println!();
    for record in &records {
        print_record(record);
    }
    println!();
    println!("{} student(s)", records.len());
    Ok(())
}

fn print_record(record: &StudentRecord) {
    println!(
        "  {} {}",
        record.name.bold(),
        record.id.as_deref().unwrap_or_default().dimmed()
    );
    println!("    {:<10} {}", "Mobile", record.mobile);
    if !record.email.is_empty() {
        println!("    {:<10} {}", "Email", record.email);
    }
    if !record.address.is_empty() {
        println!("    {:<10} {}", "Address", record.address);
    }
    println!("    {:<10} {}", "Fees", fees_label(record));
    let location = location_label(record);
    if !location.is_empty() {
        println!("    {:<10} {}", "Location", location);
    }
}

/// Fees, payment mode and date on one line
fn fees_label(record: &StudentRecord) -> String {
    let payment = record
        .payment
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    if record.has_fees() && !record.date.is_empty() {
        format!("{} ({}, {})", record.fees, payment, record.date)
    } else {
        format!("{} ({})", record.fees, payment)
    }
}

/// Non-empty location parts, most specific first
fn location_label(record: &StudentRecord) -> String {
    [&record.city, &record.state, &record.country]
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

//! Add, edit and delete command implementations

use colored::Colorize;

use roster_core::{FormStateController, ListViewModel};

use crate::cli::RecordArgs;
use crate::context::Context;
use crate::error::{CliError, Result};

/// Apply the given fields to the form, parents before dependents
fn apply(form: &mut FormStateController, fields: &RecordArgs) -> Result<()> {
    for (field, value) in fields.edits() {
        form.set_field(field, value)?;
    }
    Ok(())
}

/// Run the add command
pub async fn run_add(ctx: &Context, fields: &RecordArgs) -> Result<()> {
    let mut form = ctx.form(ctx.client()?);
    apply(&mut form, fields)?;

    let outcome = form.submit().await?;
    println!("{} {}", "OK".green().bold(), outcome.message());
    println!("   {}:   {}", "Id".dimmed(), outcome.id());
    Ok(())
}

/// Run the edit command
///
/// Loads the record from the live list, applies the given fields on top
/// and submits it as an update.
pub async fn run_edit(ctx: &Context, id: &str, fields: &RecordArgs) -> Result<()> {
    let client = ctx.client()?;
    let list = ListViewModel::activate(client.clone()).await;
    let mut form = ctx.form(client);

    if !list.request_edit(id, &mut form) {
        return Err(CliError::user(format!("No student with id {id}")));
    }
    list.dispose();

    if fields.edits().is_empty() {
        println!("{} Nothing to change.", "note:".yellow().bold());
        return Ok(());
    }
    apply(&mut form, fields)?;

    let outcome = form.submit().await?;
    println!("{} {}", "OK".green().bold(), outcome.message());
    Ok(())
}

/// Run the delete command
pub async fn run_delete(ctx: &Context, id: &str) -> Result<()> {
    let list = ListViewModel::activate(ctx.client()?).await;
    let known = list.find(id).is_some();
    list.request_delete(id).await?;
    list.dispose();

    if known {
        println!("{} Deleted student {}", "OK".green().bold(), id.cyan());
    } else {
        println!(
            "{} No student with id {}; nothing deleted.",
            "note:".yellow().bold(),
            id.cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roster_model::{PaymentMode, StudentRecord};
    use tempfile::TempDir;

    fn asha() -> RecordArgs {
        RecordArgs {
            name: Some("Asha".to_string()),
            mobile: Some("9876543210".to_string()),
            payment: Some("Cash".to_string()),
            ..Default::default()
        }
    }

    async fn stored(ctx: &Context) -> Vec<StudentRecord> {
        let list = ListViewModel::activate(ctx.client().unwrap()).await;
        list.records()
    }

    #[tokio::test]
    async fn test_add_persists_record() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::for_store(temp.path().join("students.json"));

        run_add(&ctx, &asha()).await.unwrap();

        let records = stored(&ctx).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Asha");
        assert_eq!(records[0].payment, Some(PaymentMode::Cash));
        assert_eq!(records[0].fees, "0");
    }

    #[tokio::test]
    async fn test_add_missing_required_fields_fails() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::for_store(temp.path().join("students.json"));
        let fields = RecordArgs {
            name: Some("Asha".to_string()),
            ..Default::default()
        };

        let err = run_add(&ctx, &fields).await.unwrap_err();

        assert_eq!(
            err.report(false),
            "Name, Mobile No, and Payment Mode are required."
        );
        assert!(stored(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_edit_changes_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::for_store(temp.path().join("students.json"));
        let mut fields = asha();
        fields.country = Some("India".to_string());
        fields.state = Some("Maharashtra".to_string());
        fields.city = Some("Pune".to_string());
        run_add(&ctx, &fields).await.unwrap();
        let id = stored(&ctx).await[0].id.clone().unwrap();

        let change = RecordArgs {
            state: Some("Madhya Pradesh".to_string()),
            ..Default::default()
        };
        run_edit(&ctx, &id, &change).await.unwrap();

        let records = stored(&ctx).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Asha");
        assert_eq!(records[0].state, "Madhya Pradesh");
        assert_eq!(records[0].city, "", "changing the state clears the city");
    }

    #[tokio::test]
    async fn test_edit_unknown_id_is_user_error() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::for_store(temp.path().join("students.json"));

        let err = run_edit(&ctx, "ghost", &asha()).await.unwrap_err();

        assert!(matches!(err, CliError::User { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::for_store(temp.path().join("students.json"));
        run_add(&ctx, &asha()).await.unwrap();
        let id = stored(&ctx).await[0].id.clone().unwrap();

        run_delete(&ctx, &id).await.unwrap();
        run_delete(&ctx, &id).await.unwrap();

        assert!(stored(&ctx).await.is_empty());
    }
}

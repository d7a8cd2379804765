//! Roster CLI
//!
//! Register students, list them, edit and delete them from the terminal.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e.report(verbose));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose)?;

    let Some(cmd) = cli.command else {
        println!("{} Student registration", "roster".green().bold());
        println!();
        println!("Run {} for available commands.", "roster --help".cyan());
        return Ok(());
    };

    let ctx = Context::load(cli.config.as_deref(), cli.store.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute_command(&ctx, cmd))
}

async fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { json } => commands::run_list(ctx, json).await,
        Commands::Add { fields } => commands::run_add(ctx, &fields).await,
        Commands::Edit { id, fields } => commands::run_edit(ctx, &id, &fields).await,
        Commands::Delete { id } => commands::run_delete(ctx, &id).await,
        Commands::Locations { country, state } => {
            commands::run_locations(ctx, country.as_deref(), state.as_deref())
        }
    }
}

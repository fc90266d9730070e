//! Pantry stock commands
//!
//! Usage:
//!   pantryman pantry set <NAME> [--quantity <N>] [--unit <UNIT>]
//!   pantryman pantry remove <NAME>

use super::{check, open_bound, CliResult};
use clap::{Args, Subcommand};
use pantryman_core::config::AppConfig;

#[derive(Debug, Args)]
pub struct PantryArgs {
    #[command(subcommand)]
    pub command: PantryCommand,
}

#[derive(Debug, Subcommand)]
pub enum PantryCommand {
    /// Mark an ingredient as stocked
    Set(SetArgs),
    /// Mark an ingredient as not stocked
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub name: String,

    #[arg(long)]
    pub quantity: Option<f64>,

    /// e.g. g, kg, ml, cup, piece
    #[arg(long)]
    pub unit: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    pub name: String,
}

/// Execute pantry command
pub fn execute(config: AppConfig, args: PantryArgs) -> CliResult {
    let mut app = open_bound(config)?;

    match args.command {
        PantryCommand::Set(set) => {
            let ok = app.session_mut().set_pantry_status(
                &set.name,
                true,
                set.quantity,
                set.unit.as_deref(),
            );
            check(&app, ok)?;
            println!("{} is in the pantry", set.name);
        }
        PantryCommand::Remove(remove) => {
            let ok = app
                .session_mut()
                .set_pantry_status(&remove.name, false, None, None);
            check(&app, ok)?;
            println!("{} removed from the pantry", remove.name);
        }
    }
    tracing::debug!(command = "pantry", "pantry command finished");
    Ok(())
}

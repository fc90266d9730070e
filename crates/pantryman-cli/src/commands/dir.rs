//! Data directory commands
//!
//! Usage:
//!   pantryman dir show
//!   pantryman dir set <PATH|tree://REF> [--yes] [--create]
//!   pantryman dir grant <tree://REF> <PATH>
//!   pantryman dir revoke <tree://REF>
//!   pantryman dir grants

use super::{report, CliResult};
use clap::{Args, Subcommand};
use pantryman_core::config::AppConfig;
use pantryman_core::errors::{ExError, ExErrorKind};
use pantryman_core::model::{RootKind, StorageRoot};
use pantryman_engine::app::PantryApp;
use pantryman_engine::session::BindingState;
use pantryman_engine::switch::SwitchMode;
use pantryman_engine::task::BackgroundTask;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

const PROGRESS_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Args)]
pub struct DirArgs {
    #[command(subcommand)]
    pub command: DirCommand,
}

#[derive(Debug, Subcommand)]
pub enum DirCommand {
    /// Show the active data directory
    Show,
    /// Switch to another data directory
    Set(SetArgs),
    /// Grant access to an external tree under a reference
    Grant(GrantArgs),
    /// Revoke a granted tree
    Revoke(RevokeArgs),
    /// List granted trees
    Grants,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Local directory or granted tree reference (tree://...)
    pub target: String,

    /// Accept the proposed switch without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Create the local directory if it does not exist
    #[arg(long)]
    pub create: bool,
}

#[derive(Debug, Args)]
pub struct GrantArgs {
    /// Tree reference (tree://...)
    pub reference: String,
    /// Directory the reference stands for
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct RevokeArgs {
    /// Tree reference (tree://...)
    pub reference: String,
}

/// Execute dir command
pub fn execute(config: AppConfig, args: DirArgs) -> CliResult {
    match args.command {
        DirCommand::Show => execute_show(config),
        DirCommand::Set(set_args) => execute_set(config, set_args),
        DirCommand::Grant(grant_args) => {
            let app = PantryApp::new(config);
            app.grants().grant(&grant_args.reference, &grant_args.path)?;
            println!(
                "Granted {} -> {}",
                grant_args.reference,
                grant_args.path.display()
            );
            Ok(())
        }
        DirCommand::Revoke(revoke_args) => {
            let app = PantryApp::new(config);
            if app.grants().revoke(&revoke_args.reference)? {
                println!("Revoked {}", revoke_args.reference);
            } else {
                println!("{} was not granted", revoke_args.reference);
            }
            Ok(())
        }
        DirCommand::Grants => {
            let app = PantryApp::new(config);
            for (reference, path) in app.grants().list()? {
                println!("{} -> {}", reference, path.display());
            }
            Ok(())
        }
    }
}

fn execute_show(config: AppConfig) -> CliResult {
    let mut app = PantryApp::new(config);
    let resolved = app.start();

    println!("Active: {}", resolved.root);
    println!("Path:   {}", resolved.path.display());
    if let Some(degradation) = &resolved.degradation {
        report(degradation);
    }
    match app.session().state() {
        BindingState::Bound { .. } => println!(
            "Status: open ({} ingredients)",
            app.session().list_ingredients().len()
        ),
        BindingState::Failed { error, .. } => println!("Status: failed ({})", error),
        BindingState::Unbound => println!("Status: not open"),
    }
    Ok(())
}

/// Parse the target; relative local paths are taken from the working directory
fn parse_target(target: &str) -> Result<StorageRoot, Box<dyn std::error::Error>> {
    let root = StorageRoot::from_pref(target).ok_or("target must not be empty")?;
    match root {
        StorageRoot::LocalPath(path) if path.is_relative() => {
            Ok(StorageRoot::LocalPath(std::env::current_dir()?.join(path)))
        }
        other => Ok(other),
    }
}

fn confirm_prompt(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn execute_set(config: AppConfig, args: SetArgs) -> CliResult {
    let candidate = parse_target(&args.target)?;
    if args.create && candidate.kind() == RootKind::LocalPath {
        if let Some(path) = candidate.as_local_path() {
            std::fs::create_dir_all(path)?;
        }
    }

    let mut app = PantryApp::new(config);
    app.start();

    let proposal = app.controller().select(candidate)?;
    println!("{}", proposal.describe());

    if !args.yes && !confirm_prompt("Proceed?")? {
        app.controller().cancel(&proposal);
        println!("Cancelled.");
        return Ok(());
    }

    let worker = app.controller().clone();
    let task = BackgroundTask::spawn("switch", move || worker.confirm(proposal))?;
    let mut waited = Duration::ZERO;
    while !task.is_finished() {
        std::thread::sleep(PROGRESS_TICK);
        waited += PROGRESS_TICK;
        eprint!("\rSwitching... {}s", waited.as_secs());
    }
    if !waited.is_zero() {
        eprintln!();
    }
    let outcome = task.wait()??;

    match &outcome.mode {
        SwitchMode::Migrated(migration) => {
            println!("Migrated: {}", migration.summary());
            for failure in migration.failed() {
                report(
                    &ExError::new(ExErrorKind::PerFileCopyFailure)
                        .with_op("migrate_dataset")
                        .with_entity(failure.name.clone())
                        .with_message(failure.reason.clone()),
                );
            }
        }
        SwitchMode::Adopted => println!("Adopted existing data."),
    }
    println!("Active: {}", outcome.root);

    if let Some(rebind) = app.resume() {
        rebind?;
        println!(
            "Opened {} ingredients.",
            app.session().list_ingredients().len()
        );
    }
    Ok(())
}

//! Pantryman CLI
//!
//! Command-line front end for the pantry data directory and its contents

use clap::{Parser, Subcommand};
use pantryman_core::logging_facility::{self, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "pantryman")]
#[command(about = "Pantryman - pantry and data directory management", long_about = None)]
struct Cli {
    /// Application home holding preferences, grants and the default data directory
    #[arg(long, env = "PANTRYMAN_HOME", global = true)]
    home: Option<PathBuf>,

    /// Log output format: pretty or json
    #[arg(long, env = "PANTRYMAN_LOG", default_value = "pretty", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Data directory operations
    Dir(commands::dir::DirArgs),
    /// Ingredient catalogue operations
    Ingredients(commands::ingredients::IngredientsArgs),
    /// Pantry stock operations
    Pantry(commands::pantry::PantryArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(Profile::parse(&cli.log_format));

    let result = commands::app_config(cli.home, &cli.log_format).and_then(|config| {
        match cli.command {
            Commands::Dir(args) => commands::dir::execute(config, args),
            Commands::Ingredients(args) => commands::ingredients::execute(config, args),
            Commands::Pantry(args) => commands::pantry::execute(config, args),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

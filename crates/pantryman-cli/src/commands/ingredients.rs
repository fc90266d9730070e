//! Ingredient catalogue commands
//!
//! Usage:
//!   pantryman ingredients list [--json] [--by-category]
//!   pantryman ingredients categories
//!   pantryman ingredients add <NAME> --category <CATEGORY> [--kb <TEXT>] [--tag <TAG>]...
//!   pantryman ingredients update <NAME> [--name <NEW>] [--category <CATEGORY>] [--kb <TEXT>] [--tag <TAG>]...
//!   pantryman ingredients delete <NAME>

use super::{check, open_bound, CliResult};
use clap::{Args, Subcommand};
use pantryman_core::config::AppConfig;
use pantryman_core::model::Ingredient;

#[derive(Debug, Args)]
pub struct IngredientsArgs {
    #[command(subcommand)]
    pub command: IngredientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IngredientsCommand {
    /// List ingredients in the active data directory
    List(ListArgs),
    /// List the distinct categories
    Categories,
    /// Create an ingredient
    Add(AddArgs),
    /// Change an ingredient; omitted fields keep their current value
    Update(UpdateArgs),
    /// Delete an ingredient
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Group by category
    #[arg(long)]
    pub by_category: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub name: String,

    #[arg(long)]
    pub category: String,

    /// Free-form notes
    #[arg(long)]
    pub kb: Option<String>,

    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Current name
    pub name: String,

    /// New name
    #[arg(long = "name")]
    pub new_name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub kb: Option<String>,

    /// Replaces all tags when given
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub name: String,
}

/// Execute ingredients command
pub fn execute(config: AppConfig, args: IngredientsArgs) -> CliResult {
    let mut app = open_bound(config)?;

    match args.command {
        IngredientsCommand::List(list) => {
            if list.by_category {
                let grouped = app.session().list_ingredients_by_category();
                if list.json {
                    println!("{}", serde_json::to_string_pretty(&grouped)?);
                } else {
                    for (category, items) in &grouped {
                        println!("{}:", category);
                        for ingredient in items {
                            println!("  {}", line(ingredient));
                        }
                    }
                }
            } else if list.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(app.session().list_ingredients())?
                );
            } else {
                for ingredient in app.session().list_ingredients() {
                    println!("{}", line(ingredient));
                }
            }
            Ok(())
        }
        IngredientsCommand::Categories => {
            for category in app.session().list_categories() {
                println!("{}", category);
            }
            Ok(())
        }
        IngredientsCommand::Add(add) => {
            let ok = app.session_mut().create_ingredient(
                &add.name,
                &add.category,
                add.kb.as_deref(),
                &add.tags,
            );
            check(&app, ok)?;
            println!("Added {}", add.name);
            Ok(())
        }
        IngredientsCommand::Update(update) => {
            let current = app
                .session()
                .list_ingredients()
                .iter()
                .find(|i| i.name == update.name)
                .cloned()
                .ok_or_else(|| format!("ingredient not found: {}", update.name))?;

            let new_name = update.new_name.unwrap_or_else(|| current.name.clone());
            let category = update.category.unwrap_or_else(|| current.category.clone());
            let kb = update.kb.or_else(|| current.kb.clone());
            let tags = if update.tags.is_empty() {
                current.tags.iter().cloned().collect()
            } else {
                update.tags
            };

            let ok = app.session_mut().update_ingredient(
                &update.name,
                &new_name,
                &category,
                kb.as_deref(),
                &tags,
            );
            check(&app, ok)?;
            println!("Updated {}", new_name);
            Ok(())
        }
        IngredientsCommand::Delete(delete) => {
            let ok = app.session_mut().delete_ingredient(&delete.name);
            check(&app, ok)?;
            println!("Deleted {}", delete.name);
            Ok(())
        }
    }
}

fn line(ingredient: &Ingredient) -> String {
    let mut text = format!("{} [{}]", ingredient.name, ingredient.category);
    if ingredient.is_in_pantry {
        text.push_str(" (in pantry");
        if let Some(quantity) = ingredient.quantity {
            text.push_str(&format!(": {}", quantity));
            if let Some(unit) = &ingredient.quantity_unit {
                text.push_str(&format!(" {}", unit.as_str()));
            }
        }
        text.push(')');
    }
    text
}

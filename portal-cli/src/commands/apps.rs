//! Store maintenance from the command line
//!
//! Applies the same validation as the admin API before writing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portal_core::{validate_entry, AppEntry, DocumentStore, JsonFileStore, PortalConfig};

#[derive(Parser, Debug)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AppsCommands {
    /// List apps in the store
    List {
        /// Output as JSON (includes audit fields)
        #[arg(long)]
        json: bool,
    },
    /// Add an app to the store
    Add(AddArgs),
    /// Remove an app by id
    Remove {
        /// App identifier
        id: String,
    },
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Unique identifier (letters, numbers, hyphens, underscores)
    #[arg(long)]
    pub id: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Launch target, relative path or http(s) URL
    #[arg(long)]
    pub url: String,

    /// Icon filename under the asset base
    #[arg(long)]
    pub image: String,

    /// Short description shown on hover and searched
    #[arg(long)]
    pub description: String,

    /// Recorded as created_by
    #[arg(long, env = "PORTAL_USER", default_value = "cli")]
    pub actor: String,
}

pub async fn run_apps(args: AppsArgs, config: PortalConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.store.path);

    match args.command {
        AppsCommands::List { json } => list(&store, json).await,
        AppsCommands::Add(add) => {
            let entry = AppEntry {
                id: add.id,
                name: add.name,
                url: add.url,
                image: add.image,
                description: add.description,
            }
            .trimmed();
            validate_entry(&entry)?;

            let stored = store
                .create(entry, &add.actor)
                .await
                .with_context(|| format!("Failed to add app to {}", store.path().display()))?;
            println!("Added '{}' to {}", stored.id(), store.path().display());
            Ok(())
        }
        AppsCommands::Remove { id } => {
            store
                .delete(id.trim())
                .await
                .with_context(|| format!("Failed to remove app from {}", store.path().display()))?;
            println!("Removed '{}'", id.trim());
            Ok(())
        }
    }
}

async fn list(store: &JsonFileStore, json: bool) -> Result<()> {
    let apps = store
        .list()
        .await
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
        return Ok(());
    }

    if apps.is_empty() {
        println!("No apps in {}", store.path().display());
        return Ok(());
    }

    for app in &apps {
        println!(
            "{:<16} {:<28} {:<32} {}",
            app.id(),
            app.entry.name,
            app.entry.url,
            app.created_by
        );
    }
    Ok(())
}

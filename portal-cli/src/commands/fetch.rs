//! One-shot load: run the candidate sources once and print the result

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use portal_core::{DocumentStore, JsonFileStore, Loader, PortalConfig, Resolution};

use crate::ui;

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_fetch(args: FetchArgs, config: PortalConfig) -> Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(JsonFileStore::new(&config.store.path));
    let loader = Loader::from_config(&config, Some(store))
        .context("Failed to build loader from config")?;

    let res: Resolution = ui::with_spinner_async(
        "Loading apps",
        "Apps loaded",
        async { Ok::<_, anyhow::Error>(loader.resolve_entries().await) },
    )
    .await?;

    if args.json {
        let out = serde_json::json!({
            "source": res.source,
            "failed": res.failed,
            "title": res.title,
            "apps": res.entries,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} ({} apps from {})",
        res.title.as_deref().unwrap_or(&config.portal.title),
        res.entries.len(),
        res.source
    );
    for entry in &res.entries {
        println!("  {:<16} {:<28} {}", entry.id, entry.name, entry.url);
    }
    if res.failed {
        eprintln!("All sources failed; nothing to show.");
    }

    Ok(())
}

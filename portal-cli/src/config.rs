//! `portal config` subcommands

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portal_core::PortalConfig;

const TEMPLATE: &str = include_str!("../../.portal-config.template.toml");

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a commented config template
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Print the effective config (file + environment) as TOML
    Show,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// `explicit` is the global --config / PORTAL_CONFIG value, if any.
pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(PortalConfig::config_path);

    match args.command {
        ConfigCommands::Init(args) => run_init(args, &path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(explicit),
    }
}

fn run_init(args: InitArgs, config_path: &Path) -> Result<()> {
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(config_path, TEMPLATE)
        .context(format!("Failed to write config file: {:?}", config_path))?;

    println!("Created config at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {}", config_path.display());
    println!("  2. Set server.admin_token (or PORTAL_ADMIN_TOKEN) to enable admin writes");
    println!("  3. Run: portal fetch");

    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<()> {
    let mut config = PortalConfig::load(explicit)?;
    if config.server.admin_token.is_some() {
        config.server.admin_token = Some("********".to_string());
    }

    let rendered = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{rendered}");

    for warning in config.warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config: PortalConfig = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(config.portal.title, portal_core::config::DEFAULT_TITLE);
        assert!(config.github.is_none());
        assert_eq!(config.server.bind.port(), 3030);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        run_init(InitArgs { force: false }, &path).unwrap();
        assert!(run_init(InitArgs { force: false }, &path).is_err());
        run_init(InitArgs { force: true }, &path).unwrap();
    }
}

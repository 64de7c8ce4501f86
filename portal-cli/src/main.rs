//! portal CLI - 32Gamers launcher portal
//!
//! - `serve`: run the portal page, apps document and admin API
//! - `fetch`: resolve the app list once through the candidate sources
//! - `apps`: add, remove and list entries in the store file
//! - `config`: manage ~/.portal/config.toml

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use portal_core::PortalConfig;

mod commands;
mod config;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "portal",
    author,
    version,
    about = "Launcher portal for the 32Gamers club apps",
    long_about = "Serve a searchable grid of app buttons loaded from a remote repository, \
                  a document store or a local apps.json, with a built-in list as last resort."
)]
struct Cli {
    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.portal/config.toml)
    #[arg(long, global = true, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Load the app list once and print it with its source
    Fetch(commands::fetch::FetchArgs),
    /// Manage apps in the store file (list, add, remove)
    Apps(commands::apps::AppsArgs),
    /// Manage portal configuration (init, path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Load ~/.portal/.env, then ./.env. Existing variables win.
fn load_env_files() {
    if let Some(home) = dirs::home_dir() {
        dotenvy::from_path(home.join(".portal").join(".env")).ok();
    }
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);

    match cli.command {
        Commands::Serve(args) => {
            commands::run_serve(args, PortalConfig::load(cli.config.as_deref())?).await?
        }
        Commands::Fetch(args) => {
            commands::run_fetch(args, PortalConfig::load(cli.config.as_deref())?).await?
        }
        Commands::Apps(args) => {
            commands::run_apps(args, PortalConfig::load(cli.config.as_deref())?).await?
        }
        Commands::Config(args) => config::run_config(args, cli.config.as_deref())?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

//! Subcommand implementations

pub mod apps;
pub mod fetch;
pub mod serve;

pub use apps::run_apps;
pub use fetch::run_fetch;
pub use serve::run_serve;

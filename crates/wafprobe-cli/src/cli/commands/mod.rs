//! CLI command handlers. Each command is in its own file.

mod config;
mod guess;
mod run;

pub use config::run_config;
pub use guess::run_guess;
pub use run::run_probe;

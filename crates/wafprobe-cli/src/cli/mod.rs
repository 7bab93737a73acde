//! CLI for wafprobe.

mod commands;
mod console;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use wafprobe_core::config;
use wafprobe_core::probe::ProbeKind;

use commands::{run_config, run_guess, run_probe};

/// Top-level CLI for wafprobe.
#[derive(Debug, Parser)]
#[command(name = "wafprobe")]
#[command(
    about = "wafprobe: find the exact header and payload size an HTTP edge/WAF accepts",
    long_about = None
)]
pub struct Cli {
    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe the target and report header and payload limits.
    Run(RunArgs),

    /// Show which common limit a size matches.
    Guess {
        /// Size in bytes.
        size: u64,
    },

    /// Print the effective configuration and its path.
    Config {
        /// Write the default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Target URL (overrides the configured one).
    #[arg(long)]
    pub url: Option<String>,

    /// Run only one pipeline instead of header then payload.
    #[arg(long, value_enum, value_name = "KIND")]
    pub only: Option<KindArg>,

    /// Also print the final summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Pipelines to run, in order.
    pub fn kinds(&self) -> Vec<ProbeKind> {
        match self.only {
            Some(k) => vec![k.into()],
            None => vec![ProbeKind::Header, ProbeKind::Payload],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Header,
    Payload,
}

impl From<KindArg> for ProbeKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Header => ProbeKind::Header,
            KindArg::Payload => ProbeKind::Payload,
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command.unwrap_or(CliCommand::Run(RunArgs::default())) {
            CliCommand::Run(args) => run_probe(cfg, args).await?,
            CliCommand::Guess { size } => run_guess(size),
            CliCommand::Config { init } => run_config(&cfg, init)?,
        }

        Ok(())
    }
}

//! `wafprobe run` – probe the target and print the limits found.

use anyhow::{Context, Result};
use wafprobe_core::config::ProbeConfig;
use wafprobe_core::pipeline;

use crate::cli::console::{print_summary, ConsoleObserver};
use crate::cli::RunArgs;

pub async fn run_probe(mut cfg: ProbeConfig, args: RunArgs) -> Result<()> {
    if let Some(url) = &args.url {
        cfg.url = url.clone();
    }
    cfg.validate()?;
    let kinds = args.kinds();

    let summary = tokio::task::spawn_blocking(move || {
        let mut observer = ConsoleObserver::new(&cfg.url);
        pipeline::run_with_curl(&kinds, &cfg, &mut observer)
    })
    .await
    .context("probe task join")??;

    print_summary(&summary);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

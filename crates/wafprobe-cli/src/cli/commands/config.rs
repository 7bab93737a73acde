//! `wafprobe config [--init]` – show or create the config file.

use anyhow::Result;
use wafprobe_core::config::{self, ProbeConfig};

pub fn run_config(cfg: &ProbeConfig, init: bool) -> Result<()> {
    let path = config::config_path()?;
    if init {
        if config::init_at(&path)? {
            println!("Wrote default config to {}", path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
    } else if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not present, built-in defaults)", path.display());
    }
    print!("{}", config::to_toml_string(cfg)?);
    Ok(())
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::ProbeKind;
use crate::search::SearchRange;

/// Invalid values in a loaded or overridden configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid target url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{kind} range is inverted: low {low} > high {high}")]
    InvertedRange { kind: ProbeKind, low: u64, high: u64 },
    #[error("refine_step must be greater than zero")]
    ZeroRefineStep,
    #[error("max_overshoot_steps must be greater than zero")]
    ZeroOvershootSteps,
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("header_name must not be empty")]
    EmptyHeaderName,
}

/// Global configuration loaded from `~/.config/wafprobe/config.toml`.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Target URL every probe is POSTed to.
    pub url: String,
    /// Whole-request timeout per probe. A timeout counts as a transport failure.
    pub timeout_secs: u64,
    /// Connect timeout per probe.
    pub connect_timeout_secs: u64,
    /// Value of the `Pragma` header sent with payload probes (asks the edge for debug headers).
    pub pragma: String,
    /// Name of the custom header whose value is inflated by header probes.
    pub header_name: String,
    /// Increment used by the overshoot phase of boundary refinement.
    pub refine_step: u64,
    /// Overshoot increments to try before giving up on finding a rejection.
    pub max_overshoot_steps: u32,
    /// Lowercase prefixes of response headers reported as vendor metadata.
    pub metadata_prefixes: Vec<String>,
    /// Coarse search range for header probes.
    pub header_range: SearchRange,
    /// Coarse search range for payload probes.
    pub payload_range: SearchRange,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: "https://alv.azion.app".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 15,
            pragma: "azion-debug-cache".to_string(),
            header_name: "x-waf-probe".to_string(),
            refine_step: 10_000,
            max_overshoot_steps: 1_000,
            metadata_prefixes: ["x-azion", "azion", "x-cache", "server"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            header_range: SearchRange::new(1_000, 1_048_576),
            payload_range: SearchRange::new(64_000, 10_485_760),
        }
    }
}

impl ProbeConfig {
    /// Coarse search range for the given probe kind.
    pub fn range_for(&self, kind: ProbeKind) -> SearchRange {
        match kind {
            ProbeKind::Header => self.header_range,
            ProbeKind::Payload => self.payload_range,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check values the search and the executor rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }
        for kind in [ProbeKind::Header, ProbeKind::Payload] {
            let range = self.range_for(kind);
            if range.low > range.high {
                return Err(ConfigError::InvertedRange {
                    kind,
                    low: range.low,
                    high: range.high,
                });
            }
        }
        if self.refine_step == 0 {
            return Err(ConfigError::ZeroRefineStep);
        }
        if self.max_overshoot_steps == 0 {
            return Err(ConfigError::ZeroOvershootSteps);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.header_name.trim().is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wafprobe")?;
    Ok(xdg_dirs.get_config_home().join("config.toml"))
}

/// Load configuration from the default path; a missing file yields the defaults.
pub fn load() -> Result<ProbeConfig> {
    load_from(&config_path()?)
}

/// Load and validate configuration from `path`; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<ProbeConfig> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(ProbeConfig::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ProbeConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Render a configuration the way it is stored on disk.
pub fn to_toml_string(cfg: &ProbeConfig) -> Result<String> {
    toml::to_string_pretty(cfg).context("serialize config")
}

/// Write the default configuration to `path` unless a file is already there.
/// Returns true if a file was created.
pub fn init_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let toml = to_toml_string(&ProbeConfig::default())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
    tracing::info!("created default config at {}", path.display());
    Ok(true)
}

//! Pipeline orchestration: coarse locate, refine, report; one probe kind at a time.
//!
//! Header and payload pipelines share no search state and never interleave.
//! The curl client is created once per run and dropped when the run ends.

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};

use crate::config::ProbeConfig;
use crate::probe::{CurlProbe, Probe, ProbeKind};
use crate::report::{extract_metadata, guess_limit, LimitGuess};
use crate::search::{
    locate, refine, BoundaryResult, ProbeSession, RefineSettings, SearchObserver, SearchRange,
};

/// Outcome of one probe kind's pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: ProbeKind,
    pub range: SearchRange,
    /// Coarse locator result; `None` means nothing in range was accepted
    /// and the refiner and reporter were skipped.
    pub coarse_size: Option<u64>,
    #[serde(skip)]
    pub boundary: Option<BoundaryResult>,
    pub guess: Option<LimitGuess>,
    #[serde(serialize_with = "pairs_as_map")]
    pub metadata: Vec<(String, String)>,
    pub probes: u32,
}

impl KindReport {
    /// Last size the edge accepted.
    pub fn last_accepted(&self) -> Option<u64> {
        self.boundary.as_ref().map(|b| b.size)
    }

    /// First size expected to be blocked; only known when a rejection was observed.
    pub fn first_blocked(&self) -> Option<u64> {
        self.boundary
            .as_ref()
            .filter(|b| b.rejected_at.is_some())
            .map(|b| b.size + 1)
    }

    /// True when the overshoot ran out of steps without seeing a rejection.
    pub fn unbounded(&self) -> bool {
        self.boundary
            .as_ref()
            .map_or(false, |b| b.rejected_at.is_none())
    }
}

/// Everything a run found, in the order the pipelines ran.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub url: String,
    pub reports: Vec<KindReport>,
}

impl RunSummary {
    pub fn report(&self, kind: ProbeKind) -> Option<&KindReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }
}

/// Run one probe kind's pipeline to completion.
pub fn run_kind(
    kind: ProbeKind,
    cfg: &ProbeConfig,
    probe: &mut dyn Probe,
    observer: &mut dyn SearchObserver,
) -> KindReport {
    let range = cfg.range_for(kind);
    let mut session = ProbeSession::new(kind, probe, observer);

    let coarse_size = locate(&mut session, range);
    let boundary =
        coarse_size.map(|base| refine(&mut session, base, RefineSettings::from(cfg)));

    let (guess, metadata) = match &boundary {
        Some(b) => (
            Some(guess_limit(b.size)),
            extract_metadata(&b.headers, &cfg.metadata_prefixes),
        ),
        None => (None, Vec::new()),
    };

    KindReport {
        kind,
        range,
        coarse_size,
        boundary,
        guess,
        metadata,
        probes: session.probes_sent(),
    }
}

/// Run the pipelines for `kinds` strictly one after another against `probe`.
pub fn run_all(
    kinds: &[ProbeKind],
    cfg: &ProbeConfig,
    probe: &mut dyn Probe,
    observer: &mut dyn SearchObserver,
) -> RunSummary {
    let reports = kinds
        .iter()
        .map(|&kind| run_kind(kind, cfg, probe, observer))
        .collect();
    RunSummary {
        url: cfg.url.clone(),
        reports,
    }
}

/// Acquire a curl client for `cfg.url`, run all pipelines, release the client.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn run_with_curl(
    kinds: &[ProbeKind],
    cfg: &ProbeConfig,
    observer: &mut dyn SearchObserver,
) -> Result<RunSummary> {
    cfg.validate()?;
    let mut client = CurlProbe::new(cfg).context("create HTTP client")?;
    tracing::info!(url = client.url(), ?kinds, "probe run started");
    let summary = run_all(kinds, cfg, &mut client, observer);
    drop(client);
    tracing::info!(url = %summary.url, "probe run finished");
    Ok(summary)
}

fn pairs_as_map<S: Serializer>(pairs: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

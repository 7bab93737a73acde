//! Boundary refiner: linear overshoot to a confirmed rejection, then a fine
//! binary search of the bracket down to the exact byte.

use crate::config::ProbeConfig;
use crate::probe::ResponseHeaders;

use super::{bisect, BoundaryResult, Phase, ProbeSession, SearchRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineSettings {
    /// Bytes added per overshoot probe.
    pub step: u64,
    /// Overshoot increments allowed before giving up on seeing a rejection.
    pub max_overshoot_steps: u32,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            step: 10_000,
            max_overshoot_steps: 1_000,
        }
    }
}

impl From<&ProbeConfig> for RefineSettings {
    fn from(cfg: &ProbeConfig) -> Self {
        Self {
            step: cfg.refine_step,
            max_overshoot_steps: cfg.max_overshoot_steps,
        }
    }
}

/// Narrow `base` (a coarse-accepted size) to the last accepted byte.
///
/// If the first overshoot probe at `base` is itself rejected (a flaky or
/// non-monotonic edge), `base` is returned as-is with no headers and no retry.
pub fn refine(
    session: &mut ProbeSession<'_>,
    base: u64,
    settings: RefineSettings,
) -> BoundaryResult {
    let step = settings.step.max(1);

    session.start_phase(Phase::Overshoot);
    let mut current = base;
    let mut increments = 0u32;
    let mut base_headers: Option<ResponseHeaders> = None;
    let mut last_headers = ResponseHeaders::new();
    let rejected_at = loop {
        let (outcome, result) = session.probe(Phase::Overshoot, current);
        if !outcome.is_accepted() {
            break Some(current);
        }
        if current == base {
            base_headers = Some(result.headers.clone());
        }
        last_headers = result.headers;
        if increments >= settings.max_overshoot_steps {
            break None;
        }
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break None,
        }
        increments += 1;
    };

    let boundary = match rejected_at {
        None => {
            tracing::warn!(
                kind = %session.kind(),
                size = current,
                "no rejection observed after {} overshoot steps",
                increments
            );
            BoundaryResult {
                size: current,
                headers: last_headers,
                rejected_at: None,
            }
        }
        Some(upper) if upper == base => {
            tracing::warn!(kind = %session.kind(), size = base, "coarse-accepted size rejected on re-probe");
            BoundaryResult {
                size: base,
                headers: ResponseHeaders::new(),
                rejected_at: Some(upper),
            }
        }
        Some(upper) => {
            session.start_phase(Phase::Fine);
            let (size, headers) = bisect(session, Phase::Fine, SearchRange::new(base, upper))
                .unwrap_or_else(|| (base, base_headers.unwrap_or_default()));
            BoundaryResult {
                size,
                headers,
                rejected_at: Some(upper),
            }
        }
    };

    tracing::info!(
        kind = %session.kind(),
        size = boundary.size,
        rejected_at = ?boundary.rejected_at,
        probes = session.probes_sent(),
        "boundary refined"
    );
    session.boundary_found(&boundary);
    boundary
}

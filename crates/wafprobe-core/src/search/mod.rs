//! Boundary search: coarse binary search, then overshoot + fine binary search.
//!
//! Search code is pure over an injected [`Probe`]; progress leaves through a
//! [`SearchObserver`] so the algorithm runs the same against curl or a mock.
//! Probes are strictly sequential: each step depends on the previous answer.

mod coarse;
mod refine;

#[cfg(test)]
pub(crate) mod mock;

pub use coarse::locate;
pub use refine::{refine, RefineSettings};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::outcome::{classify_result, Outcome};
use crate::probe::{Probe, ProbeKind, ProbeResult, ResponseHeaders};

/// Inclusive byte-count range for a binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub low: u64,
    pub high: u64,
}

impl SearchRange {
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }
}

/// Largest size seen ACCEPTED, with the headers of that very response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryResult {
    pub size: u64,
    pub headers: ResponseHeaders,
    /// Size the overshoot phase saw rejected; `None` if it ran out of steps
    /// without one, in which case `size` is only a lower bound.
    pub rejected_at: Option<u64>,
}

/// Stage of the pipeline a probe belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Coarse,
    Overshoot,
    Fine,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Coarse => "coarse",
            Phase::Overshoot => "overshoot",
            Phase::Fine => "fine",
        })
    }
}

/// Progress notifications emitted while searching.
#[derive(Debug)]
pub enum SearchEvent<'a> {
    PhaseStarted {
        kind: ProbeKind,
        phase: Phase,
    },
    Probed {
        kind: ProbeKind,
        phase: Phase,
        size: u64,
        outcome: Outcome,
        result: &'a ProbeResult,
    },
    BoundaryFound {
        kind: ProbeKind,
        boundary: &'a BoundaryResult,
    },
}

pub trait SearchObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_event(&mut self, _event: &SearchEvent<'_>) {}
}

/// One probe kind's view of the executor: sends, classifies, reports.
pub struct ProbeSession<'a> {
    kind: ProbeKind,
    probe: &'a mut dyn Probe,
    observer: &'a mut dyn SearchObserver,
    probes_sent: u32,
}

impl<'a> ProbeSession<'a> {
    pub fn new(
        kind: ProbeKind,
        probe: &'a mut dyn Probe,
        observer: &'a mut dyn SearchObserver,
    ) -> Self {
        Self {
            kind,
            probe,
            observer,
            probes_sent: 0,
        }
    }

    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    /// Number of probes issued through this session so far.
    pub fn probes_sent(&self) -> u32 {
        self.probes_sent
    }

    pub(crate) fn start_phase(&mut self, phase: Phase) {
        tracing::info!(kind = %self.kind, %phase, "phase started");
        self.observer.on_event(&SearchEvent::PhaseStarted {
            kind: self.kind,
            phase,
        });
    }

    pub(crate) fn probe(&mut self, phase: Phase, size: u64) -> (Outcome, ProbeResult) {
        let result = self.probe.send(self.kind, size);
        self.probes_sent += 1;
        let outcome = classify_result(&result, self.kind);
        tracing::debug!(kind = %self.kind, %phase, size, status = result.status, ?outcome, "probe");
        self.observer.on_event(&SearchEvent::Probed {
            kind: self.kind,
            phase,
            size,
            outcome,
            result: &result,
        });
        (outcome, result)
    }

    pub(crate) fn boundary_found(&mut self, boundary: &BoundaryResult) {
        self.observer.on_event(&SearchEvent::BoundaryFound {
            kind: self.kind,
            boundary,
        });
    }
}

/// Binary search for the largest ACCEPTED size in `range`.
///
/// ACCEPTED moves the floor above `mid`, anything else moves the ceiling
/// below it. Each accepted probe is larger than every earlier one, so the last
/// accepted probe is also the largest observed.
pub(crate) fn bisect(
    session: &mut ProbeSession<'_>,
    phase: Phase,
    range: SearchRange,
) -> Option<(u64, ResponseHeaders)> {
    let mut low = range.low;
    let mut high = range.high;
    let mut best = None;

    while low <= high {
        // Floor midpoint without overflowing on huge bounds.
        let mid = low + (high - low) / 2;
        let (outcome, result) = session.probe(phase, mid);
        if outcome.is_accepted() {
            best = Some((mid, result.headers));
            match mid.checked_add(1) {
                Some(next) => low = next,
                None => break,
            }
        } else {
            match mid.checked_sub(1) {
                Some(prev) => high = prev,
                None => break,
            }
        }
    }

    best
}

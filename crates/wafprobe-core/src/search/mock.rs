//! Deterministic probes and a recording observer for search tests.

use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeKind, ProbeResult, ResponseHeaders};

use super::{Phase, SearchEvent, SearchObserver};

/// Accepts every size `<= limit`, rejects the rest with `reject_status`.
/// Accepted responses carry `x-azion-size: <size>` so tests can tell which
/// probe a header set came from.
pub(crate) struct ThresholdProbe {
    pub limit: Option<u64>,
    pub reject_status: u32,
    pub calls: Vec<u64>,
}

impl ThresholdProbe {
    pub fn new(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            reject_status: 400,
            calls: Vec::new(),
        }
    }

    /// Rejects every size.
    pub fn never() -> Self {
        Self {
            limit: None,
            reject_status: 400,
            calls: Vec::new(),
        }
    }

    pub fn with_reject_status(mut self, status: u32) -> Self {
        self.reject_status = status;
        self
    }
}

impl Probe for ThresholdProbe {
    fn send(&mut self, _kind: ProbeKind, size: u64) -> ProbeResult {
        self.calls.push(size);
        match self.limit {
            Some(limit) if size <= limit => accepted(size),
            _ => ProbeResult::status(self.reject_status),
        }
    }
}

/// 501 response tagged with the probed size.
pub(crate) fn accepted(size: u64) -> ProbeResult {
    let mut headers = ResponseHeaders::new();
    headers.insert("x-azion-size", &size.to_string());
    headers.insert("Server", "azion");
    ProbeResult::response(501, headers)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Phase(Phase),
    Probe(Phase, u64, Outcome),
    Boundary(u64),
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub events: Vec<Recorded>,
}

impl RecordingObserver {
    pub fn phases(&self) -> Vec<Phase> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::Phase(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl SearchObserver for RecordingObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        self.events.push(match event {
            SearchEvent::PhaseStarted { phase, .. } => Recorded::Phase(*phase),
            SearchEvent::Probed {
                phase,
                size,
                outcome,
                ..
            } => Recorded::Probe(*phase, *size, *outcome),
            SearchEvent::BoundaryFound { boundary, .. } => Recorded::Boundary(boundary.size),
        });
    }
}

//! Classify probe results into accepted / blocked / error.
//!
//! Search direction only distinguishes ACCEPTED from everything else; BLOCKED
//! and ERROR are kept apart so the operator can see which one stopped a probe.

use serde::Serialize;

use crate::probe::{ProbeKind, ProbeResult};

/// Status codes meaning the request got through the edge. 501 is what the
/// origin answers to these POSTs once the edge lets them pass.
pub const ACCEPTED_STATUSES: [u32; 4] = [200, 201, 204, 501];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Blocked,
    Error,
}

impl Outcome {
    pub fn is_accepted(self) -> bool {
        self == Outcome::Accepted
    }
}

/// Classify an HTTP status code for the given probe kind.
///
/// 431 (header fields too large) only counts as a block for header probes.
pub fn classify(status: u32, kind: ProbeKind) -> Outcome {
    match (status, kind) {
        (s, _) if ACCEPTED_STATUSES.contains(&s) => Outcome::Accepted,
        (400, _) => Outcome::Blocked,
        (431, ProbeKind::Header) => Outcome::Blocked,
        _ => Outcome::Error,
    }
}

/// Classify a full probe result; transport failures are always ERROR.
pub fn classify_result(result: &ProbeResult, kind: ProbeKind) -> Outcome {
    if result.transport_failed() {
        return Outcome::Error;
    }
    let outcome = classify(result.status, kind);
    if outcome == Outcome::Error {
        tracing::warn!(%kind, status = result.status, "unexpected status, treating as rejection");
    }
    outcome
}

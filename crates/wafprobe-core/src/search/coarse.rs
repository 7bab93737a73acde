//! Coarse locator: wide-range binary search for the largest accepted size.

use super::{bisect, Phase, ProbeSession, SearchRange};

/// Largest size in `range` the edge accepted, or `None` if no probe was accepted.
///
/// Issues at most `floor(log2(high - low + 1)) + 1` probes.
pub fn locate(session: &mut ProbeSession<'_>, range: SearchRange) -> Option<u64> {
    session.start_phase(Phase::Coarse);
    let found = bisect(session, Phase::Coarse, range).map(|(size, _)| size);
    match found {
        Some(size) => tracing::info!(kind = %session.kind(), size, "coarse search accepted size"),
        None => tracing::info!(
            kind = %session.kind(),
            low = range.low,
            high = range.high,
            "coarse search found no accepted size"
        ),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use crate::probe::{ProbeKind, ProbeResult};
    use crate::search::mock::{Recorded, RecordingObserver, ThresholdProbe};
    use crate::search::NoopObserver;

    fn max_probes(range: SearchRange) -> u32 {
        let n = range.high - range.low + 1;
        63 - n.leading_zeros() + 1
    }

    fn run(range: SearchRange, probe: &mut ThresholdProbe) -> Option<u64> {
        let mut observer = NoopObserver;
        let mut session = ProbeSession::new(ProbeKind::Payload, probe, &mut observer);
        locate(&mut session, range)
    }

    #[test]
    fn payload_scenario_finds_73000() {
        let range = SearchRange::new(64_000, 10_485_760);
        let mut probe = ThresholdProbe::new(73_000);
        assert_eq!(run(range, &mut probe), Some(73_000));
        assert_eq!(probe.calls.len(), 24);
        assert!(probe.calls.len() as u32 <= max_probes(range));
        assert_eq!(probe.calls[0], 5_274_880);
    }

    #[test]
    fn nothing_accepted_returns_none() {
        let mut probe = ThresholdProbe::never();
        assert_eq!(run(SearchRange::new(1_000, 1_048_576), &mut probe), None);
    }

    #[test]
    fn everything_accepted_returns_high() {
        let mut probe = ThresholdProbe::new(u64::MAX);
        assert_eq!(run(SearchRange::new(1_000, 1_048_576), &mut probe), Some(1_048_576));
    }

    #[test]
    fn limit_below_range_returns_none() {
        let mut probe = ThresholdProbe::new(500);
        assert_eq!(run(SearchRange::new(1_000, 2_000), &mut probe), None);
    }

    #[test]
    fn zero_floor_does_not_underflow() {
        let mut probe = ThresholdProbe::never();
        assert_eq!(run(SearchRange::new(0, 10), &mut probe), None);
        assert_eq!(*probe.calls.last().unwrap(), 0);
    }

    #[test]
    fn single_element_range() {
        let mut probe = ThresholdProbe::new(5);
        assert_eq!(run(SearchRange::new(5, 5), &mut probe), Some(5));
        assert_eq!(probe.calls, vec![5]);

        let mut probe = ThresholdProbe::new(4);
        assert_eq!(run(SearchRange::new(5, 5), &mut probe), None);
    }

    #[test]
    fn huge_bounds_do_not_overflow() {
        let mut probe = ThresholdProbe::new(u64::MAX);
        let range = SearchRange::new(u64::MAX - 10, u64::MAX);
        assert_eq!(run(range, &mut probe), Some(u64::MAX));
    }

    #[test]
    fn every_threshold_in_small_range_is_exact() {
        let range = SearchRange::new(10, 200);
        for limit in 0..=210 {
            let mut probe = ThresholdProbe::new(limit);
            let found = run(range, &mut probe);
            let expected = if limit < range.low {
                None
            } else {
                Some(limit.min(range.high))
            };
            assert_eq!(found, expected, "limit {}", limit);
            assert!(probe.calls.len() as u32 <= max_probes(range), "limit {}", limit);
        }
    }

    #[test]
    fn error_statuses_move_ceiling_like_blocks() {
        let mut probe = ThresholdProbe::new(8_192).with_reject_status(502);
        assert_eq!(run(SearchRange::new(1_000, 1_048_576), &mut probe), Some(8_192));
    }

    #[test]
    fn non_monotonic_edge_degrades_without_panicking() {
        let range = SearchRange::new(0, 5_000);
        for period in 1..40u64 {
            let mut calls = Vec::new();
            let mut probe = |_kind: ProbeKind, size: u64| {
                calls.push(size);
                if (size / period) % 2 == 0 {
                    ProbeResult::status(200)
                } else {
                    ProbeResult::status(400)
                }
            };
            let mut observer = NoopObserver;
            let found = {
                let mut session = ProbeSession::new(ProbeKind::Header, &mut probe, &mut observer);
                locate(&mut session, range)
            };
            let accepted: Vec<u64> = calls
                .iter()
                .copied()
                .filter(|s| (s / period) % 2 == 0)
                .collect();
            assert_eq!(found, accepted.iter().copied().max(), "period {}", period);
            assert!(calls.len() as u32 <= max_probes(range));
        }
    }

    #[test]
    fn observer_sees_every_probe() {
        let mut probe = ThresholdProbe::new(150);
        let mut observer = RecordingObserver::default();
        {
            let mut session = ProbeSession::new(ProbeKind::Header, &mut probe, &mut observer);
            assert_eq!(locate(&mut session, SearchRange::new(100, 200)), Some(150));
            assert_eq!(session.probes_sent(), 6);
        }
        assert_eq!(observer.events[0], Recorded::Phase(Phase::Coarse));
        assert_eq!(
            observer.events[1],
            Recorded::Probe(Phase::Coarse, 150, Outcome::Accepted)
        );
        assert_eq!(observer.events.len(), 1 + probe.calls.len());
    }
}

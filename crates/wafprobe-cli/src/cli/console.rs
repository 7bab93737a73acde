//! Console output: per-probe progress lines, phase banners, final summary.

use wafprobe_core::outcome::Outcome;
use wafprobe_core::pipeline::{KindReport, RunSummary};
use wafprobe_core::probe::ProbeKind;
use wafprobe_core::report::{kib, mib};
use wafprobe_core::search::{Phase, SearchEvent, SearchObserver};

const RULE_WIDTH: usize = 60;

/// Prints search progress to stdout; transport errors go to stderr.
pub struct ConsoleObserver {
    url: String,
}

impl ConsoleObserver {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

impl SearchObserver for ConsoleObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        match event {
            SearchEvent::PhaseStarted { kind, phase } => print_banner(*kind, *phase, &self.url),
            SearchEvent::Probed {
                kind,
                size,
                outcome,
                result,
                ..
            } => {
                if let Some(err) = &result.transport_error {
                    eprintln!("Error: {}", err);
                }
                println!(
                    "Testing {} size: {} bytes... {}",
                    kind,
                    group_thousands(*size),
                    verdict(*outcome, result.status)
                );
            }
            SearchEvent::BoundaryFound { boundary, .. } => {
                println!();
                match boundary.rejected_at {
                    Some(_) => {
                        println!("Byte-precise boundary found!");
                        println!("Last OK size: {} bytes", group_thousands(boundary.size));
                        println!(
                            "First blocked size: {} bytes",
                            group_thousands(boundary.size + 1)
                        );
                    }
                    None => {
                        println!("No rejection seen while overshooting.");
                        println!(
                            "Largest size tried: {} bytes (still accepted)",
                            group_thousands(boundary.size)
                        );
                    }
                }
            }
        }
    }
}

fn print_banner(kind: ProbeKind, phase: Phase, url: &str) {
    println!();
    match phase {
        Phase::Coarse => {
            println!("Testing maximum {} size for {}", kind, url);
            println!("Using binary search algorithm...");
            println!("Note: HTTP 501 = OK, HTTP 400 = WAF blocked");
            println!();
        }
        Phase::Overshoot => {
            println!("Refining boundary to byte-precise accuracy...");
            println!();
            println!("Finding upper bound where WAF blocks...");
        }
        Phase::Fine => {
            println!("Using binary search for byte-precise boundary...");
        }
    }
}

fn verdict(outcome: Outcome, status: u32) -> String {
    match outcome {
        Outcome::Accepted => format!("✓ OK (HTTP {})", status),
        Outcome::Blocked => format!("✗ WAF BLOCKED (HTTP {})", status),
        Outcome::Error => format!("✗ FAILED (HTTP {})", status),
    }
}

pub fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        print_report(report);
    }
}

fn print_report(report: &KindReport) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule);
    let Some(size) = report.last_accepted() else {
        println!("No successful {} size found", report.kind);
        println!("{}", rule);
        return;
    };

    println!(
        "Maximum {} size (HTTP 501): {} bytes",
        report.kind,
        group_thousands(size)
    );
    match report.kind {
        ProbeKind::Header => println!("Approximately: {:.2} KB", kib(size)),
        ProbeKind::Payload => {
            println!("Approximately: {:.2} KB ({:.2} MB)", kib(size), mib(size))
        }
    }
    match report.first_blocked() {
        Some(blocked) => println!(
            "First blocked size: {} bytes",
            group_thousands(blocked)
        ),
        None => println!("No blocked size observed; the limit may be higher"),
    }
    if let Some(guess) = &report.guess {
        println!("Limit guess: {}", guess.label);
    }
    println!("Probes sent: {}", report.probes);
    println!("{}", rule);

    if !report.metadata.is_empty() {
        let thin = "-".repeat(RULE_WIDTH);
        println!();
        println!("Edge metadata:");
        println!("{}", thin);
        for (key, value) in &report.metadata {
            println!("  {}: {}", key, value);
        }
        println!("{}", thin);
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

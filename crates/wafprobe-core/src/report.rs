//! Limit reporting: match a boundary against well-known limits and pull
//! vendor metadata out of the boundary response's headers.

use serde::Serialize;

use crate::probe::ResponseHeaders;

/// Relative tolerance for matching a size against a known limit.
pub const LIMIT_TOLERANCE: f64 = 0.05;

/// Limits commonly configured on proxies, CDNs and WAFs.
pub const COMMON_LIMITS: &[(&str, u64)] = &[
    ("8 KB", 8 * 1024),
    ("16 KB", 16 * 1024),
    ("32 KB", 32 * 1024),
    ("64 KB", 64 * 1024),
    ("128 KB", 128 * 1024),
    ("256 KB", 256 * 1024),
    ("512 KB", 512 * 1024),
    ("1 MB", 1024 * 1024),
    ("2 MB", 2 * 1024 * 1024),
    ("4 MB", 4 * 1024 * 1024),
    ("8 MB", 8 * 1024 * 1024),
    ("10 MB", 10 * 1024 * 1024),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitGuess {
    pub label: String,
    /// Table entry the size matched, if any.
    pub matched_bytes: Option<u64>,
}

/// Classify `size` against [`COMMON_LIMITS`]; first entry within tolerance wins.
pub fn guess_limit(size: u64) -> LimitGuess {
    for &(label, bytes) in COMMON_LIMITS {
        let diff = size.abs_diff(bytes) as f64;
        if diff / bytes as f64 <= LIMIT_TOLERANCE {
            return LimitGuess {
                label: format!("~{} (common limit)", label),
                matched_bytes: Some(bytes),
            };
        }
    }
    LimitGuess {
        label: format!("{:.2} KB (custom limit)", kib(size)),
        matched_bytes: None,
    }
}

/// Headers whose lowercased name starts with one of `prefixes`, in response order.
pub fn extract_metadata(headers: &ResponseHeaders, prefixes: &[String]) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            prefixes
                .iter()
                .any(|p| lower.starts_with(&p.to_ascii_lowercase()))
        })
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn kib(size: u64) -> f64 {
    size as f64 / 1024.0
}

pub fn mib(size: u64) -> f64 {
    size as f64 / (1024.0 * 1024.0)
}

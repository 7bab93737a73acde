//! Probe model: what one sized request looks like and what came back.
//!
//! The search code only sees the [`Probe`] trait; [`CurlProbe`] is the real
//! executor, test mocks are others.

mod executor;
mod parse;

pub use executor::CurlProbe;
pub use parse::{parse_headers, ResponseHeaders};

use serde::Serialize;
use std::fmt;

/// Which part of the request is inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// One custom request header carries `size` bytes.
    Header,
    /// The form-encoded body's single field carries `size` bytes.
    Payload,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::Header => "header",
            ProbeKind::Payload => "payload",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of one probe.
///
/// A transport failure (connect error, DNS, timeout) has status 0, no headers,
/// and the error text in `transport_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: u32,
    pub headers: ResponseHeaders,
    pub transport_error: Option<String>,
}

impl ProbeResult {
    pub fn response(status: u32, headers: ResponseHeaders) -> Self {
        Self {
            status,
            headers,
            transport_error: None,
        }
    }

    /// Status-only result; handy for mocks.
    pub fn status(status: u32) -> Self {
        Self::response(status, ResponseHeaders::default())
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            headers: ResponseHeaders::default(),
            transport_error: Some(message.into()),
        }
    }

    pub fn transport_failed(&self) -> bool {
        self.transport_error.is_some()
    }
}

/// Sends one request of a given kind and size.
///
/// Implementations must not fail: network errors are reported as
/// [`ProbeResult::transport_failure`].
pub trait Probe {
    fn send(&mut self, kind: ProbeKind, size: u64) -> ProbeResult;
}

impl<F> Probe for F
where
    F: FnMut(ProbeKind, u64) -> ProbeResult,
{
    fn send(&mut self, kind: ProbeKind, size: u64) -> ProbeResult {
        self(kind, size)
    }
}

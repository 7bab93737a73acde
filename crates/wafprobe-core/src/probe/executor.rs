//! Probe executor backed by one reused libcurl Easy handle.
//!
//! Every probe is a POST to the configured URL. Payload probes send a
//! form-encoded body whose single field holds `size` bytes; header probes send
//! a short fixed body and put `size` bytes into one custom header.

use anyhow::{Context, Result};
use curl::easy::{Easy, List};
use std::str;
use std::time::Duration;

use super::{parse_headers, Probe, ProbeKind, ProbeResult};
use crate::config::ProbeConfig;

/// Name of the single form field carried by payload probes.
const FORM_FIELD: &str = "data";
/// Body sent with header probes.
const HEADER_PROBE_BODY: &[u8] = b"data=header-probe";
/// Byte used to fill probe values.
const FILL: u8 = b'A';

/// Real HTTP executor. Holds one curl handle for the whole run so the
/// connection is reused between probes; dropping it releases the connection.
pub struct CurlProbe {
    easy: Easy,
    url: String,
    pragma: String,
    header_name: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl CurlProbe {
    /// Build an executor for `cfg.url`. Fails only on an unusable URL or handle setup.
    pub fn new(cfg: &ProbeConfig) -> Result<Self> {
        let mut easy = Easy::new();
        easy.url(&cfg.url).context("invalid URL")?;
        easy.follow_location(false)?;
        Ok(Self {
            easy,
            url: cfg.url.clone(),
            pragma: cfg.pragma.clone(),
            header_name: cfg.header_name.trim().to_string(),
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn perform(&mut self, kind: ProbeKind, size: u64) -> Result<ProbeResult, curl::Error> {
        let mut list = List::new();
        // No 100-continue round trip; the edge should judge the whole request.
        list.append("Expect:")?;
        list.append("Content-Type: application/x-www-form-urlencoded")?;
        list.append(&format!("Pragma: {}", self.pragma))?;

        let body = match kind {
            ProbeKind::Payload => form_body(size),
            ProbeKind::Header => {
                list.append(&header_line(&self.header_name, size))?;
                HEADER_PROBE_BODY.to_vec()
            }
        };

        self.easy.url(&self.url)?;
        self.easy.connect_timeout(self.connect_timeout)?;
        self.easy.timeout(self.timeout)?;
        self.easy.http_headers(list)?;
        self.easy.post(true)?;
        self.easy.post_field_size(body.len() as u64)?;
        self.easy.post_fields_copy(&body)?;

        let mut lines: Vec<String> = Vec::new();
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    lines.push(s.trim_end().to_string());
                }
                true
            })?;
            // Response bodies are irrelevant; swallow them instead of letting curl print to stdout.
            transfer.write_function(|data| Ok(data.len()))?;
            transfer.perform()?;
        }

        let status = self.easy.response_code()?;
        Ok(ProbeResult::response(status, parse_headers(&lines)))
    }
}

impl Probe for CurlProbe {
    fn send(&mut self, kind: ProbeKind, size: u64) -> ProbeResult {
        match self.perform(kind, size) {
            Ok(result) => {
                tracing::debug!(%kind, size, status = result.status, "probe answered");
                result
            }
            Err(e) => {
                if e.is_operation_timedout() {
                    tracing::warn!(%kind, size, "probe timed out after {:?}", self.timeout);
                } else {
                    tracing::warn!(%kind, size, "probe transport failure: {}", e);
                }
                ProbeResult::transport_failure(e.to_string())
            }
        }
    }
}

/// `data=AAAA...` with exactly `size` bytes in the field value.
fn form_body(size: u64) -> Vec<u8> {
    let size = size as usize;
    let mut body = Vec::with_capacity(FORM_FIELD.len() + 1 + size);
    body.extend_from_slice(FORM_FIELD.as_bytes());
    body.push(b'=');
    body.resize(body.len() + size, FILL);
    body
}

/// `Name: AAAA...` with exactly `size` bytes in the value.
fn header_line(name: &str, size: u64) -> String {
    let mut line = String::with_capacity(name.len() + 2 + size as usize);
    line.push_str(name);
    line.push_str(": ");
    line.extend(std::iter::repeat(FILL as char).take(size as usize));
    line
}

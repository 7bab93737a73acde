//! Minimal HTTP/1.1 edge for integration tests.
//!
//! Reads the whole request, then answers 501 (origin reached) when the probe
//! header value and the body's `data` field are within the configured limits,
//! and 400 (WAF block) otherwise. Accepted answers carry Azion-style headers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct WafServerOptions {
    /// Largest accepted value length of the probe header.
    pub header_limit: usize,
    /// Largest accepted length of the `data` form field.
    pub payload_limit: usize,
    /// Status for an oversized header (400 or 431).
    pub header_reject_status: u16,
}

impl Default for WafServerOptions {
    fn default() -> Self {
        Self {
            header_limit: 8_192,
            payload_limit: 73_000,
            header_reject_status: 431,
        }
    }
}

pub struct WafServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl WafServer {
    /// Number of requests answered so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts the server in a background thread. It runs until the process exits.
pub fn start(opts: WafServerOptions) -> WafServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, opts, &counter));
        }
    });
    WafServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

/// Serves one request. The counter is bumped before the response goes out so
/// a client that has its answer always sees the request counted.
fn handle(mut stream: TcpStream, opts: WafServerOptions, counter: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let mut data = Vec::new();
    let mut buf = [0u8; 16 * 1024];
    let head_end = loop {
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).to_string();
    let (content_length, probe_header_len) = parse_head(&head);
    while data.len() < head_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    let body = &data[head_end..head_end + content_length];
    let field_len = body
        .strip_prefix(b"data=")
        .map(|v| v.len())
        .unwrap_or(0);

    let response = if probe_header_len > opts.header_limit {
        format!(
            "HTTP/1.1 {} Rejected\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            opts.header_reject_status
        )
    } else if field_len > opts.payload_limit {
        "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
    } else {
        let body = "not implemented";
        format!(
            "HTTP/1.1 501 Not Implemented\r\nServer: azion\r\nX-Azion-Edge: test-pop\r\n\
             X-Cache: MISS\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        )
    };
    counter.fetch_add(1, Ordering::SeqCst);
    let _ = stream.write_all(response.as_bytes());
}

/// Returns (Content-Length, value length of the x-waf-probe header).
fn parse_head(head: &str) -> (usize, usize) {
    let mut content_length = 0;
    let mut probe_len = 0;
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("x-waf-probe") {
                probe_len = value.trim().len();
            }
        }
    }
    (content_length, probe_len)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

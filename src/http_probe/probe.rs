use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use super::prelude::*;
use super::report;

/// Builds the client shared by all probes of one session. Redirects are not
/// followed so the measured latency stays tied to the first hop, and invalid
/// certificates are accepted because panels commonly run self-signed.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .danger_accept_invalid_certs(true)
        .user_agent(user_agent)
        .build()
}

/// Performs exactly one reachability attempt: a HEAD request with no body in
/// either direction, bounded by `timeout`.
///
/// Never fails from its caller's point of view. A received status — any
/// status — is reachable; DNS failures, refused connections, TLS faults and
/// timeouts become the attempt's error text. The connection is released on
/// every path when the response is dropped without reading a body.
pub async fn probe_url(client: &Client, url: &str, timeout: Duration) -> ProbeAttempt {
    let start = Instant::now();
    let result = client.head(url).timeout(timeout).send().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            debug!(url, status, latency_ms, "probe answered");
            ProbeAttempt {
                url: url.to_string(),
                latency_ms,
                http_status: Some(status),
                error: None,
            }
        }
        Err(err) => {
            let error = report(&err);
            debug!(url, latency_ms, %error, "probe failed");
            ProbeAttempt {
                url: url.to_string(),
                latency_ms,
                http_status: None,
                error: Some(error),
            }
        }
    }
}

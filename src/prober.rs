use reqwest::Client;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::http_probe::prelude::*;
use crate::session::{ProbeOutcome, ProbeSession, SessionSummary};
use crate::sink::ResultSink;

/// Runs one session to its end: up to `count` sequential probes with an
/// interruptible pause in between, each outcome handed to the sink as soon
/// as it exists, and exactly one summary after the loop — cancelled runs
/// included.
///
/// Cancellation is cooperative. It is observed before each iteration and
/// during the inter-probe wait; a request already in flight runs to its own
/// completion or timeout, so cancellation latency is bounded by the
/// per-probe timeout.
pub async fn run_session(
    client: &Client,
    session: &mut ProbeSession,
    sink: &dyn ResultSink,
    token: &CancellationToken,
) -> SessionSummary {
    session.begin();
    let config = session.config.clone();
    info!(url = %config.url, count = config.count, "probe session started");

    let mut outcomes: Vec<ProbeOutcome> = Vec::with_capacity(config.count as usize);

    for iteration in 1..=config.count {
        if token.is_cancelled() {
            debug!(iteration, "session cancelled before probe");
            break;
        }

        let attempt = probe_url(client, &config.url, config.per_probe_timeout()).await;
        let outcome = ProbeOutcome::from_attempt(iteration, attempt);
        sink.on_outcome(outcome.clone());
        outcomes.push(outcome);

        // Individual failures never stop the loop; only cancellation does.
        if iteration < config.count && !token.is_cancelled() {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = sleep(config.inter_probe_delay()) => {}
            }
        }
    }

    let cancelled = token.is_cancelled();
    session.finish(cancelled);
    info!(
        url = %config.url,
        emitted = outcomes.len(),
        cancelled,
        "probe session finished"
    );

    let summary = SessionSummary::from_outcomes(&outcomes, config.count);
    sink.on_summary(summary.clone());
    summary
}

use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use panelprobe::config::load_config;
use panelprobe::controller::SessionController;
use panelprobe::http_probe::report;
use panelprobe::session::{ProbeOutcome, SessionSummary};
use panelprobe::sink::{ChannelSink, SessionEvent};

fn print_outcome(outcome: &ProbeOutcome, planned: u32) {
    match (&outcome.latency_ms, &outcome.error) {
        (Some(latency), _) => {
            let status = outcome.http_status.unwrap_or_default();
            println!(
                "  ✅ probe {}/{planned}: {latency}ms (HTTP {status})",
                outcome.iteration
            );
        }
        (None, Some(error)) => {
            println!("  ❌ probe {}/{planned}: {error}", outcome.iteration);
        }
        (None, None) => {}
    }
}

fn print_summary(summary: &SessionSummary, planned: u32) {
    println!(
        "  reachable {}/{planned} ({}%), lost {}",
        summary.success_count, summary.success_rate_percent, summary.fail_count
    );
    if let (Some(min), Some(avg), Some(max)) = (
        summary.min_latency_ms,
        summary.avg_latency_ms,
        summary.max_latency_ms,
    ) {
        println!("  min/avg/max = {min}/{avg}/{max} ms");
    }
}

/// Drains the sink until the session's summary arrives. This task is the
/// only place observer code runs; the probe worker just sends.
async fn drain_session(events: &mut UnboundedReceiver<SessionEvent>, planned: u32) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Outcome(outcome) => print_outcome(&outcome, planned),
            SessionEvent::Summary(summary) => {
                print_summary(&summary, planned);
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("panelprobe: {}", report(&err));
            return ExitCode::FAILURE;
        }
    };
    if config.is_empty() {
        eprintln!("panelprobe: no targets configured");
        return ExitCode::FAILURE;
    }

    let (sink, mut events) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));
    let mut failed = false;

    for (name, target) in config {
        println!("[{name}] probing {}", target.url);
        let planned = target.count;
        match controller.start(target).await {
            // Each start supersedes the last, so wait for the summary
            // before moving to the next target.
            Ok(()) => drain_session(&mut events, planned).await,
            Err(err) => {
                eprintln!("[{name}] {}", report(&err));
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

//! End-to-end session flows through the controller and the channel sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use panelprobe::controller::SessionController;
use panelprobe::session::SessionConfig;
use panelprobe::sink::{ChannelSink, SessionEvent};

async fn mock_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn fast_config(url: String, count: u32) -> SessionConfig {
    SessionConfig {
        count,
        per_probe_timeout_ms: 2000,
        inter_probe_delay_ms: 10,
        ..SessionConfig::new(url)
    }
}

/// Collects events until (and including) the next summary.
async fn collect_session(rx: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(event, SessionEvent::Summary(_));
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[tokio::test]
async fn completed_session_streams_ordered_outcomes_then_one_summary() {
    let server = mock_server(200).await;
    let (sink, mut rx) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));

    controller
        .start(fast_config(server.uri(), 5))
        .await
        .expect("start");
    let events = collect_session(&mut rx).await;

    assert_eq!(events.len(), 6);
    for (i, event) in events.iter().take(5).enumerate() {
        match event {
            SessionEvent::Outcome(o) => {
                assert_eq!(o.iteration, i as u32 + 1);
                assert!(o.success);
            }
            SessionEvent::Summary(_) => panic!("summary arrived before the last outcome"),
        }
    }
    let SessionEvent::Summary(summary) = &events[5] else {
        panic!("last event must be the summary");
    };
    assert_eq!(summary.success_count, 5);
    assert_eq!(summary.fail_count, 0);
    assert_eq!(summary.success_rate_percent, 100);

    // The run is over; nothing else may arrive.
    controller.cancel().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn http_500_counts_as_reachable() {
    let server = mock_server(500).await;
    let (sink, mut rx) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));

    controller
        .start(fast_config(server.uri(), 3))
        .await
        .expect("start");
    let events = collect_session(&mut rx).await;

    let SessionEvent::Outcome(first) = &events[0] else {
        panic!("expected an outcome first");
    };
    assert!(first.success);
    assert_eq!(first.http_status, Some(500));

    let SessionEvent::Summary(summary) = events.last().unwrap() else {
        panic!("expected a summary last");
    };
    assert_eq!(summary.success_count, 3);
}

#[tokio::test]
async fn cancel_after_two_outcomes_stops_the_sequence() {
    let server = mock_server(200).await;
    let (sink, mut rx) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));

    // A long inter-probe delay leaves a wide window to cancel in.
    let config = SessionConfig {
        inter_probe_delay_ms: 30_000,
        ..fast_config(server.uri(), 5)
    };
    controller.start(config).await.expect("start");

    let mut outcomes_seen: u32 = 0;
    while outcomes_seen < 2 {
        match rx.recv().await.expect("event") {
            SessionEvent::Outcome(_) => outcomes_seen += 1,
            SessionEvent::Summary(_) => panic!("premature summary"),
        }
    }
    controller.cancel().await;

    // cancel() joined the worker, so the remaining stream is complete.
    let mut trailing = Vec::new();
    while let Ok(event) = rx.try_recv() {
        trailing.push(event);
    }
    // At most the in-flight third outcome, then the summary.
    assert!(trailing.len() <= 2, "unexpected events: {}", trailing.len());
    let SessionEvent::Summary(summary) = trailing.last().expect("summary must still arrive") else {
        panic!("last event must be the summary");
    };
    let emitted = outcomes_seen + (trailing.len() as u32 - 1);
    assert_eq!(summary.success_count + summary.fail_count, emitted);
    assert!(summary.success_count < 5);
    // Rate denominator is the planned count, not the emitted count.
    assert_eq!(summary.success_rate_percent, summary.success_count * 100 / 5);
}

#[tokio::test]
async fn cancel_during_in_flight_probe_terminates_within_the_probe_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;
    let (sink, mut rx) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));

    let config = SessionConfig {
        per_probe_timeout_ms: 1000,
        ..fast_config(server.uri(), 5)
    };
    controller.start(config).await.expect("start");

    // Let the first request get in flight, then cancel.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let start = Instant::now();
    controller.cancel().await;
    let elapsed = start.elapsed();

    // Bounded by the per-probe timeout (the in-flight request is not torn
    // down), far below the server's 30 s delay.
    assert!(elapsed < Duration::from_secs(5), "cancel took {elapsed:?}");

    let events = collect_session(&mut rx).await;
    let SessionEvent::Summary(summary) = events.last().unwrap() else {
        panic!("expected a summary last");
    };
    assert_eq!(summary.success_count, 0);
    assert!(summary.fail_count <= 1);
    assert_eq!(summary.min_latency_ms, None);
}

#[tokio::test]
async fn starting_a_new_session_supersedes_the_old_one() {
    let old_server = mock_server(200).await;
    let new_server = mock_server(301).await;
    let (sink, mut rx) = ChannelSink::new();
    let mut controller = SessionController::new(Arc::new(sink));

    let old_config = SessionConfig {
        inter_probe_delay_ms: 30_000,
        ..fast_config(old_server.uri(), 5)
    };
    controller.start(old_config).await.expect("start old");

    // Wait for the old session's first outcome, then supersede it.
    let SessionEvent::Outcome(first) = rx.recv().await.expect("event") else {
        panic!("expected an outcome first");
    };
    assert_eq!(first.http_status, Some(200));

    controller
        .start(fast_config(new_server.uri(), 3))
        .await
        .expect("start new");
    controller.cancel().await;

    // The old session must close (summary) before the new one opens, and
    // no old-session outcome may appear after the new session's first event.
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    let old_summary_at = events
        .iter()
        .position(|e| matches!(e, SessionEvent::Summary(_)))
        .expect("old session summary");
    for event in &events[..old_summary_at] {
        let SessionEvent::Outcome(o) = event else {
            panic!("only outcomes expected before the old summary");
        };
        assert_eq!(o.http_status, Some(200));
    }
    let new_events = &events[old_summary_at + 1..];
    assert!(!new_events.is_empty(), "new session produced no events");
    for event in &new_events[..new_events.len() - 1] {
        let SessionEvent::Outcome(o) = event else {
            panic!("summary must come last in the new session");
        };
        assert_eq!(o.http_status, Some(301), "stale outcome after supersede");
    }
    assert!(matches!(new_events.last(), Some(SessionEvent::Summary(_))));
}

use tokio::sync::mpsc;

use crate::session::{ProbeOutcome, SessionSummary};

/// Consumer of a session's streamed results. Implemented by whatever faces
/// the user (the CLI here, a UI when embedded); the prober only ever calls
/// it sequentially, outcomes in iteration order, summary last.
pub trait ResultSink: Send + Sync {
    fn on_outcome(&self, outcome: ProbeOutcome);
    fn on_summary(&self, summary: SessionSummary);
}

/// Everything a session can emit, in the order it emits it.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Outcome(ProbeOutcome),
    Summary(SessionSummary),
}

/// Channel-backed sink: the probe worker sends, the observer drains the
/// receiver on its own task. This is the single crossing point between the
/// worker and the UI-facing context; the worker never runs observer code.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResultSink for ChannelSink {
    fn on_outcome(&self, outcome: ProbeOutcome) {
        // A closed receiver means the observer went away; nothing to do.
        let _ = self.tx.send(SessionEvent::Outcome(outcome));
    }

    fn on_summary(&self, summary: SessionSummary) {
        let _ = self.tx.send(SessionEvent::Summary(summary));
    }
}

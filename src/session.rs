use std::time::Duration;

use serde::Deserialize;

use crate::http_probe::result::ProbeAttempt;

fn default_count() -> u32 {
    5
}

fn default_per_probe_timeout_ms() -> u64 {
    5000
}

fn default_inter_probe_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    concat!("panelprobe/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Configuration of one probe session.
/// The target URL is required; everything else falls back to the defaults
/// used by the original panel app (5 probes, 5 s timeout, 1 s in between).
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// The URL whose reachability is probed. Must be http or https;
    /// well-formedness is checked by the controller before a session starts.
    pub url: String,

    /// Number of probes planned for the session.
    #[serde(default = "default_count")]
    pub count: u32,

    /// Upper bound on a single HTTP attempt, in milliseconds.
    #[serde(default = "default_per_probe_timeout_ms")]
    pub per_probe_timeout_ms: u64,

    /// Pause between probes, in milliseconds. Not applied after the last one.
    #[serde(default = "default_inter_probe_delay_ms")]
    pub inter_probe_delay_ms: u64,

    /// User-Agent header attached to every probe request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            count: default_count(),
            per_probe_timeout_ms: default_per_probe_timeout_ms(),
            inter_probe_delay_ms: default_inter_probe_delay_ms(),
            user_agent: default_user_agent(),
        }
    }

    pub fn per_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.per_probe_timeout_ms)
    }

    pub fn inter_probe_delay(&self) -> Duration {
        Duration::from_millis(self.inter_probe_delay_ms)
    }
}

/// Lifecycle of a session. Only Idle→Running→{Completed,Cancelled} is legal;
/// a finished session never runs again, a new one is created instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Cancelled,
    Completed,
}

/// One session: its configuration plus where it is in its lifecycle.
#[derive(Debug)]
pub struct ProbeSession {
    pub config: SessionConfig,
    state: SessionState,
}

impl ProbeSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Idle → Running.
    pub(crate) fn begin(&mut self) {
        debug_assert_eq!(self.state, SessionState::Idle);
        self.state = SessionState::Running;
    }

    /// Running → Cancelled or Completed.
    pub(crate) fn finish(&mut self, cancelled: bool) {
        debug_assert_eq!(self.state, SessionState::Running);
        self.state = if cancelled {
            SessionState::Cancelled
        } else {
            SessionState::Completed
        };
    }
}

/// Result of one probe iteration. Emitted once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// 1-based iteration number, strictly increasing within a session.
    pub iteration: u32,
    pub success: bool,
    /// Wall time from send to response headers; present iff `success`.
    pub latency_ms: Option<u64>,
    /// Present iff any HTTP response was received at all.
    pub http_status: Option<u16>,
    /// Transport fault description; present iff `!success`.
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn from_attempt(iteration: u32, attempt: ProbeAttempt) -> Self {
        let success = attempt.is_reachable();
        Self {
            iteration,
            success,
            latency_ms: success.then_some(attempt.latency_ms),
            http_status: attempt.http_status,
            error: attempt.error,
        }
    }
}

/// Aggregate statistics of one session, computed once after the last outcome.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub success_count: u32,
    pub fail_count: u32,
    /// Latency aggregates over successful probes only; `None` (not zero)
    /// when nothing succeeded.
    pub min_latency_ms: Option<u64>,
    pub avg_latency_ms: Option<u64>,
    pub max_latency_ms: Option<u64>,
    /// Success rate against the *planned* probe count, so a cancelled run
    /// reports a reduced rate.
    pub success_rate_percent: u32,
}

impl SessionSummary {
    pub fn from_outcomes(outcomes: &[ProbeOutcome], planned_count: u32) -> Self {
        let latencies: Vec<u64> = outcomes.iter().filter_map(|o| o.latency_ms).collect();
        let success_count = outcomes.iter().filter(|o| o.success).count() as u32;
        let fail_count = outcomes.len() as u32 - success_count;

        let (min, avg, max) = if latencies.is_empty() {
            (None, None, None)
        } else {
            let sum: u64 = latencies.iter().sum();
            (
                latencies.iter().min().copied(),
                Some(sum / latencies.len() as u64),
                latencies.iter().max().copied(),
            )
        };

        let success_rate_percent = if planned_count == 0 {
            0
        } else {
            success_count * 100 / planned_count
        };

        Self {
            success_count,
            fail_count,
            min_latency_ms: min,
            avg_latency_ms: avg,
            max_latency_ms: max,
            success_rate_percent,
        }
    }
}

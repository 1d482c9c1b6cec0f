/// Raw result of a single timed HTTP attempt, before it is numbered and
/// wrapped into a session outcome.
#[derive(Debug, Clone)]
pub struct ProbeAttempt {
    pub url: String,
    /// Wall time around the network call only, send to response headers.
    pub latency_ms: u64,
    pub http_status: Option<u16>,
    pub error: Option<String>,
}

impl ProbeAttempt {
    /// Reachability policy: any HTTP response at all counts, 4xx and 5xx
    /// included. This measures whether the endpoint answers, not whether it
    /// is healthy.
    pub fn is_reachable(&self) -> bool {
        self.http_status.is_some()
    }
}

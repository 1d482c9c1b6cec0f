use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::http_probe::prelude::*;
use crate::prober::run_session;
use crate::session::{ProbeSession, SessionConfig};
use crate::sink::ResultSink;

/// Contract violations only. Network faults during a run are never errors;
/// they surface as failed outcomes through the sink.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid target url {url:?}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme {scheme:?} for target {url:?}, expected http or https")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("failed to build http client")]
    Client(#[from] reqwest::Error),
}

struct ActiveSession {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Serializes probe sessions: at most one worker exists per controller, and
/// a new session only starts after the previous worker has been cancelled
/// and joined, so two sessions can never interleave on the sink.
pub struct SessionController {
    sink: Arc<dyn ResultSink>,
    active: Option<ActiveSession>,
}

impl SessionController {
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self { sink, active: None }
    }

    /// Starts a session against `config.url`, superseding any session still
    /// running: the old one is cancelled and fully joined first, so its last
    /// callback has fired before the new session's first one.
    pub async fn start(&mut self, config: SessionConfig) -> Result<(), StartError> {
        let parsed = Url::parse(&config.url).map_err(|source| StartError::InvalidTarget {
            url: config.url.clone(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(StartError::UnsupportedScheme {
                    url: config.url.clone(),
                    scheme: scheme.to_string(),
                });
            }
        }

        self.cancel().await;

        let client = build_client(&config.user_agent, config.per_probe_timeout())?;
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let sink = Arc::clone(&self.sink);

        let handle = tokio::spawn(async move {
            let mut session = ProbeSession::new(config);
            run_session(&client, &mut session, sink.as_ref(), &worker_token).await;
        });

        self.active = Some(ActiveSession { token, handle });
        Ok(())
    }

    /// Cancels the active session, if any, and returns only once its worker
    /// has terminated — its summary has been delivered by then. Idempotent;
    /// a no-op when nothing is running.
    pub async fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            if !active.handle.is_finished() {
                info!("cancelling active probe session");
            }
            active.token.cancel();
            if let Err(err) = active.handle.await {
                // Worker panics must not poison the controller.
                warn!(%err, "probe worker did not shut down cleanly");
            }
        }
    }

    /// True while a worker is still running its loop.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }
}

//! HTTP reachability probing for web panel targets.
//!
//! A session is a bounded run of sequential, header-only HTTP requests
//! against one URL. Each probe produces an immutable [`session::ProbeOutcome`]
//! that is streamed to a [`sink::ResultSink`] the moment it exists, and every
//! session ends with exactly one [`session::SessionSummary`]. Sessions are
//! started and cancelled through a [`controller::SessionController`], which
//! guarantees that at most one session is ever talking to the sink.
//!
//! This is an application-layer check, not an ICMP ping: a target that
//! answers with *any* HTTP status — including 4xx and 5xx — is reachable.
//! Only transport faults (DNS, connection refused, TLS, timeout) count as
//! failures.

pub mod config;
pub mod controller;
pub mod http_probe;
pub mod prober;
pub mod session;
pub mod sink;

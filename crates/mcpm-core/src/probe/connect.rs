//! Raw TCP connectivity attempts
//!
//! No bytes are exchanged: a successful connect is dropped immediately.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpStream;

use super::ProbeResult;
use crate::config::settings::{DEFAULT_PROBE_HOST, DEFAULT_PROBE_TIMEOUT_MS};

/// Message reported when there was nothing to try
pub const NO_PORT_REACHABLE: &str = "Failed to connect to any port";

/// Result of one connect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected,
    TimedOut,
    /// Refused, unreachable, resolution failure, ...
    Failed(String),
}

impl AttemptOutcome {
    /// Diagnostic recorded for a failed attempt
    pub fn diagnostic(&self, port: u16) -> Option<String> {
        match self {
            Self::Connected => None,
            Self::TimedOut => Some(format!("Connection to port {} timed out", port)),
            Self::Failed(message) => Some(message.clone()),
        }
    }
}

/// Socket layer used by the probe
pub trait Connector: Send + Sync {
    fn attempt(&self, port: u16) -> impl Future<Output = AttemptOutcome> + Send;
}

/// Connects over TCP to `host:port` with a per-attempt timeout
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROBE_HOST,
            Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        )
    }
}

impl Connector for TcpConnector {
    fn attempt(&self, port: u16) -> impl Future<Output = AttemptOutcome> + Send {
        let addr = format!("{}:{}", self.host, port);
        let timeout = self.timeout;
        async move {
            // Dropping the pending connect on timeout closes the socket.
            match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
                Ok(Ok(stream)) => {
                    drop(stream);
                    AttemptOutcome::Connected
                }
                Ok(Err(err)) => AttemptOutcome::Failed(err.to_string()),
                Err(_) => AttemptOutcome::TimedOut,
            }
        }
    }
}

/// Try each port in order, stopping at the first that accepts a connection.
///
/// Attempts never overlap. When every port fails, the diagnostic of the
/// last attempt is reported.
pub async fn probe_ports<C: Connector>(connector: &C, ports: &[u16]) -> ProbeResult {
    let mut last_error: Option<String> = None;

    for &port in ports {
        tracing::debug!("Trying port {}", port);
        let outcome = connector.attempt(port).await;
        match outcome.diagnostic(port) {
            None => {
                tracing::debug!("Successfully connected to port {}", port);
                return ProbeResult::reachable(port);
            }
            Some(diagnostic) => {
                tracing::debug!("Port {} failed: {}", port, diagnostic);
                last_error = Some(diagnostic);
            }
        }
    }

    ProbeResult::unreachable(last_error.unwrap_or_else(|| NO_PORT_REACHABLE.to_string()))
}

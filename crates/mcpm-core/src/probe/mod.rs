//! Port-guessing status probe
//!
//! A probe answers "is this configured server listening?" without speaking
//! any protocol:
//!
//! 1. Check that the launch command resolves on this host.
//! 2. Derive candidate ports from env vars and args ([`ports`]).
//! 3. Connect to each candidate in turn until one accepts ([`connect`]).
//!
//! A probe never fails: every problem ends up in [`ProbeResult::error`].

pub mod connect;
pub mod ports;
pub mod resolver;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use connect::{AttemptOutcome, Connector, NO_PORT_REACHABLE, TcpConnector, probe_ports};
pub use ports::{FALLBACK_PORTS, candidate_ports, derive_ports};
pub use resolver::{CommandResolver, SystemResolver};

use crate::config::ProbeSettings;
use crate::mcp::McpServer;

pub const COMMAND_NOT_AVAILABLE: &str = "Command not available";

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn reachable(port: u16) -> Self {
        Self {
            reachable: true,
            port: Some(port),
            error: None,
        }
    }

    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            port: None,
            error: Some(error.into()),
        }
    }
}

/// Runs probes with an injectable command resolver and socket layer
#[derive(Debug, Clone, Default)]
pub struct Prober<R = SystemResolver, C = TcpConnector> {
    resolver: R,
    connector: C,
}

impl Prober {
    pub fn from_settings(settings: &ProbeSettings) -> Self {
        Self::with_parts(
            SystemResolver,
            TcpConnector::new(settings.host.clone(), settings.timeout()),
        )
    }
}

impl<R: CommandResolver, C: Connector> Prober<R, C> {
    pub fn with_parts(resolver: R, connector: C) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Probe one server: availability check, then sequential port attempts.
    pub async fn probe(&self, server: &McpServer) -> ProbeResult {
        if !self.resolver.is_available(&server.command).await {
            tracing::warn!("Command not available: {}", server.command);
            return ProbeResult::unreachable(COMMAND_NOT_AVAILABLE);
        }

        let ports = candidate_ports(server);
        tracing::info!(
            "Checking server on ports: {}",
            ports
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        probe_ports(&self.connector, &ports).await
    }

    pub async fn probe_ports(&self, ports: &[u16]) -> ProbeResult {
        probe_ports(&self.connector, ports).await
    }
}

/// Race a whole probe against an outer deadline.
///
/// The probe itself cannot be interrupted part way; losing the race drops
/// it and reports a timeout instead.
pub async fn probe_with_deadline<F>(probe: F, deadline: Duration) -> ProbeResult
where
    F: Future<Output = ProbeResult>,
{
    match tokio::time::timeout(deadline, probe).await {
        Ok(result) => result,
        Err(_) => ProbeResult::unreachable(format!(
            "Probe did not finish within {} ms",
            deadline.as_millis()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serialization_omits_absent_fields() {
        let online = serde_json::to_value(ProbeResult::reachable(8080)).unwrap();
        assert_eq!(online, serde_json::json!({"reachable": true, "port": 8080}));

        let offline = serde_json::to_value(ProbeResult::unreachable("nope")).unwrap();
        assert_eq!(
            offline,
            serde_json::json!({"reachable": false, "error": "nope"})
        );
    }

    #[test]
    fn attempt_diagnostics() {
        assert_eq!(AttemptOutcome::Connected.diagnostic(1), None);
        assert_eq!(
            AttemptOutcome::TimedOut.diagnostic(3000).as_deref(),
            Some("Connection to port 3000 timed out")
        );
        assert_eq!(
            AttemptOutcome::Failed("refused".to_string())
                .diagnostic(1)
                .as_deref(),
            Some("refused")
        );
    }

    #[tokio::test]
    async fn deadline_reports_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ProbeResult::reachable(1)
        };
        let result = probe_with_deadline(slow, Duration::from_millis(20)).await;

        assert!(!result.reachable);
        assert_eq!(result.error.as_deref(), Some("Probe did not finish within 20 ms"));
    }
}

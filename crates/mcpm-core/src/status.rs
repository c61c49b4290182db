//! Per-server reachability status for the frontends.
//!
//! Status is UI state only and is never written to the registry file.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::mcp::McpConfig;
use crate::probe::{CommandResolver, Connector, ProbeResult, Prober};

// =============================================================================
// Data Structures
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    #[default]
    Unknown,
    Online,
    Offline,
    Checking,
}

impl ServerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Checking => "Checking...",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Checking => "checking",
        };
        f.write_str(name)
    }
}

impl From<&ProbeResult> for ServerStatus {
    fn from(result: &ProbeResult) -> Self {
        if result.reachable {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ServerStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_result: Option<ProbeResult>,
}

/// Status of every server currently shown
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    entries: BTreeMap<String, StatusEntry>,
}

// =============================================================================
// Status Board
// =============================================================================

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track exactly `ids`, keeping the known status of servers that remain.
    pub fn sync_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for id in ids {
            let id = id.into();
            let entry = self.entries.remove(&id).unwrap_or_default();
            entries.insert(id, entry);
        }
        self.entries = entries;
    }

    pub fn status(&self, id: &str) -> ServerStatus {
        self.entries
            .get(id)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    pub fn entry(&self, id: &str) -> Option<&StatusEntry> {
        self.entries.get(id)
    }

    pub fn is_checking_any(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.status == ServerStatus::Checking)
    }

    /// Mark one server as checking; `false` if a check is already running for it.
    pub fn begin_check(&mut self, id: &str) -> bool {
        let entry = self.entries.entry(id.to_string()).or_default();
        if entry.status == ServerStatus::Checking {
            tracing::debug!("Status check already in progress for {}", id);
            return false;
        }
        entry.status = ServerStatus::Checking;
        true
    }

    /// Mark every server as checking and return their IDs.
    ///
    /// Returns nothing when any check is already in flight.
    pub fn begin_check_all(&mut self) -> Vec<String> {
        if self.is_checking_any() {
            tracing::debug!("Status check already in progress");
            return Vec::new();
        }
        for entry in self.entries.values_mut() {
            entry.status = ServerStatus::Checking;
        }
        self.entries.keys().cloned().collect()
    }

    pub fn finish(&mut self, id: &str, result: ProbeResult) {
        self.finish_at(id, result, Utc::now());
    }

    /// Record a result for a tracked server.
    ///
    /// Results for servers removed since the check started are dropped.
    pub fn finish_at(&mut self, id: &str, result: ProbeResult, checked_at: DateTime<Utc>) {
        let Some(entry) = self.entries.get_mut(id) else {
            tracing::debug!("Dropping status result for removed server {}", id);
            return;
        };
        entry.status = ServerStatus::from(&result);
        entry.last_checked = Some(checked_at);
        entry.last_result = Some(result);
    }

    /// Apply a batch of results, then clear any check that produced none.
    pub fn finish_all(&mut self, results: BTreeMap<String, ProbeResult>) {
        let checked_at = Utc::now();
        for (id, result) in results {
            self.finish_at(&id, result, checked_at);
        }
        self.reset_checking();
    }

    /// Turn leftover `Checking` entries back into `Unknown`.
    pub fn reset_checking(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.status == ServerStatus::Checking {
                entry.status = ServerStatus::Unknown;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatusEntry)> {
        self.entries.iter()
    }
}

// =============================================================================
// Batch Probing
// =============================================================================

/// Probe every server concurrently; each probe stays sequential internally.
pub async fn ping_all<R, C>(
    prober: Arc<Prober<R, C>>,
    config: &McpConfig,
) -> BTreeMap<String, ProbeResult>
where
    R: CommandResolver + 'static,
    C: Connector + 'static,
{
    let mut tasks = JoinSet::new();
    for (id, server) in config.servers() {
        let prober = Arc::clone(&prober);
        tasks.spawn(async move {
            tracing::info!("Pinging MCP server {}...", id);
            let result = prober.probe(&server).await;
            (id, result)
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, result)) => {
                if result.reachable {
                    tracing::info!("Server {} is ONLINE", id);
                } else {
                    tracing::info!(
                        "Server {} is OFFLINE. Reason: {}",
                        id,
                        result.error.as_deref().unwrap_or("Connection failed")
                    );
                }
                results.insert(id, result);
            }
            Err(err) => tracing::error!("Status probe task failed: {}", err),
        }
    }
    results
}

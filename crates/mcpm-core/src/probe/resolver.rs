//! Command availability check via the host's `which`/`where`.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

/// Decides whether a launch command exists on this host
pub trait CommandResolver: Send + Sync {
    fn is_available(&self, command: &str) -> impl Future<Output = bool> + Send;
}

/// Asks the operating system through `which` (POSIX) or `where` (Windows)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn lookup_program() -> &'static str {
        if cfg!(windows) { "where" } else { "which" }
    }
}

impl CommandResolver for SystemResolver {
    fn is_available(&self, command: &str) -> impl Future<Output = bool> + Send {
        let command = command.trim().to_string();
        async move {
            if command.is_empty() {
                return false;
            }
            let status = Command::new(Self::lookup_program())
                .arg(&command)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .status()
                .await;
            // Spawn failures count as "not available".
            matches!(status, Ok(status) if status.success())
        }
    }
}

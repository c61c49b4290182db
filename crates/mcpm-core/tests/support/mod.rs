//! Fakes for the probe's command resolver and socket layer.

#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use mcpm_core::probe::{AttemptOutcome, CommandResolver, Connector};

/// Resolver with a fixed answer that counts lookups
pub struct FakeResolver {
    available: bool,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub fn available() -> Self {
        Self {
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommandResolver for FakeResolver {
    fn is_available(&self, _command: &str) -> impl Future<Output = bool> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let available = self.available;
        async move { available }
    }
}

/// Connector that records every attempted port
pub struct RecordingConnector {
    open: HashSet<u16>,
    timing_out: HashSet<u16>,
    attempts: Mutex<Vec<u16>>,
}

impl RecordingConnector {
    pub fn with_open(open: &[u16]) -> Self {
        Self {
            open: open.iter().copied().collect(),
            timing_out: HashSet::new(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out(mut self, ports: &[u16]) -> Self {
        self.timing_out = ports.iter().copied().collect();
        self
    }

    pub fn attempts(&self) -> Vec<u16> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Connector for RecordingConnector {
    fn attempt(&self, port: u16) -> impl Future<Output = AttemptOutcome> + Send {
        self.attempts.lock().unwrap().push(port);
        let outcome = if self.open.contains(&port) {
            AttemptOutcome::Connected
        } else if self.timing_out.contains(&port) {
            AttemptOutcome::TimedOut
        } else {
            AttemptOutcome::Failed(format!("connect ECONNREFUSED 127.0.0.1:{}", port))
        };
        async move { outcome }
    }
}

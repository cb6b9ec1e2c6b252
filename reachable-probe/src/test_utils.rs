//! Test helpers: a scripted [`Connector`] with in-flight accounting.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::services::Connector;

/// Scripted behaviour for one port.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Report success after the delay.
    Succeed(Duration),
    /// Report a refused connection after the delay.
    Fail(Duration),
    /// Never complete.
    Hang,
}

/// Decrements the in-flight counter when the attempt future is dropped,
/// whether it completed or was abandoned.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Connector whose per-port behaviour is fixed up front.
///
/// Ports without a script fail immediately.
#[derive(Default)]
pub struct ScriptedConnector {
    steps: HashMap<u16, Step>,
    calls: Mutex<HashMap<u16, usize>>,
    started: AtomicUsize,
    finished: AtomicUsize,
    in_flight: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, port: u16, step: Step) -> Self {
        self.steps.insert(port, step);
        self
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, port: u16) -> usize {
        self.calls.lock().unwrap().get(&port).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _host: &str, port: u16) -> Result<(), ProbeError> {
        let _guard = InFlightGuard::enter(&self.in_flight);
        self.started.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(port).or_insert(0) += 1;

        let step = self
            .steps
            .get(&port)
            .copied()
            .unwrap_or(Step::Fail(Duration::ZERO));
        let result = match step {
            Step::Succeed(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Step::Fail(delay) => {
                tokio::time::sleep(delay).await;
                Err(ProbeError::Connect("connection refused".to_string()))
            }
            Step::Hang => std::future::pending().await,
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

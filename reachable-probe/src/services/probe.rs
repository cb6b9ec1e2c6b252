//! Concurrent race-to-first-signal probing.
//!
//! One task is spawned per configured port. Each reports its outcome into a
//! channel sized for every attempt, so a loser never blocks on a send after
//! the race has been decided. The first outcome to arrive, success or
//! failure, is the verdict; if none arrives before the deadline the host is
//! unreachable. Losing tasks are not aborted. They finish on their own,
//! bounded by the per-attempt timeout, and drop their socket.

use std::sync::Arc;

use log::{debug, trace};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

use super::connector::Connector;
use crate::types::{NormalizedHost, ProbeConfig, ProbeOutcome, Verdict};

/// Races one attempt per port against a fixed deadline.
#[derive(Clone)]
pub struct Prober {
    connector: Arc<dyn Connector>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(connector: Arc<dyn Connector>, config: ProbeConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe `host` on every configured port and return the first signal.
    pub async fn probe(&self, host: &NormalizedHost) -> Verdict {
        let attempts = self.config.ports.len();
        if attempts == 0 {
            return Verdict::Unreachable;
        }

        let start = Instant::now();
        let (tx, mut rx) = mpsc::channel::<(u16, ProbeOutcome)>(attempts);

        for &port in &self.config.ports {
            let tx = tx.clone();
            let connector = Arc::clone(&self.connector);
            let host = host.as_str().to_string();
            let attempt_timeout = self.config.attempt_timeout;

            tokio::spawn(async move {
                let outcome = match timeout(attempt_timeout, connector.connect(&host, port)).await
                {
                    Ok(Ok(())) => ProbeOutcome::Success,
                    Ok(Err(e)) => ProbeOutcome::Failure(e.to_string()),
                    Err(_) => ProbeOutcome::Failure(format!(
                        "Attempt timed out ({}s)",
                        attempt_timeout.as_secs()
                    )),
                };
                trace!("[PROBE] {host}:{port} finished: {outcome:?}");
                // Capacity covers every attempt; a closed receiver just means we lost.
                let _ = tx.try_send((port, outcome));
            });
        }
        drop(tx);

        match timeout(self.config.deadline, rx.recv()).await {
            Ok(Some((port, outcome))) => {
                debug!(
                    "[PROBE] {host}: first signal from port {port} after {:?}: {outcome:?}",
                    start.elapsed()
                );
                outcome.verdict()
            }
            Ok(None) => {
                debug!("[PROBE] {host}: every attempt ended without reporting");
                Verdict::Unreachable
            }
            Err(_) => {
                debug!(
                    "[PROBE] {host}: no signal within {}s",
                    self.config.deadline.as_secs()
                );
                Verdict::Unreachable
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::normalize::normalize;
    use crate::test_utils::{ScriptedConnector, Step};

    fn host() -> NormalizedHost {
        normalize("example.com").unwrap()
    }

    fn prober(connector: &Arc<ScriptedConnector>) -> Prober {
        Prober::new(connector.clone(), ProbeConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_wins_over_later_success() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Succeed(Duration::from_millis(10)))
                .on(443, Step::Fail(Duration::from_millis(5))),
        );
        assert_eq!(prober(&connector).probe(&host()).await, Verdict::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_wins_over_later_failure() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Succeed(Duration::from_millis(5)))
                .on(443, Step::Fail(Duration::from_millis(10))),
        );
        assert_eq!(prober(&connector).probe(&host()).await, Verdict::Reachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_while_other_port_hangs() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Hang)
                .on(443, Step::Succeed(Duration::from_millis(200))),
        );
        assert_eq!(prober(&connector).probe(&host()).await, Verdict::Reachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_when_nothing_completes() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Hang)
                .on(443, Step::Hang),
        );
        let start = Instant::now();
        let verdict = prober(&connector).probe(&host()).await;
        let elapsed = start.elapsed();

        assert_eq!(verdict, Verdict::Unreachable);
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_deadline_is_ignored() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Succeed(Duration::from_secs(5)))
                .on(443, Step::Succeed(Duration::from_secs(5))),
        );
        assert_eq!(prober(&connector).probe(&host()).await, Verdict::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ports_is_unreachable() {
        let connector = Arc::new(ScriptedConnector::new());
        let config = ProbeConfig {
            ports: vec![],
            ..ProbeConfig::default()
        };
        let verdict = Prober::new(connector.clone(), config).probe(&host()).await;
        assert_eq!(verdict, Verdict::Unreachable);
        assert_eq!(connector.started(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_port_gets_exactly_one_attempt() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Fail(Duration::from_millis(1)))
                .on(443, Step::Fail(Duration::from_millis(2))),
        );
        prober(&connector).probe(&host()).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(connector.started(), 2);
        assert_eq!(connector.calls_for(80), 1);
        assert_eq!(connector.calls_for(443), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_losers_complete_after_race_without_leaking() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Fail(Duration::from_millis(50)))
                .on(443, Step::Succeed(Duration::from_secs(6))),
        );
        let prober = prober(&connector);

        for _ in 0..5 {
            assert_eq!(prober.probe(&host()).await, Verdict::Unreachable);
        }
        assert!(connector.in_flight() > 0);

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(connector.in_flight(), 0);
        assert_eq!(connector.finished(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempts_are_released_by_attempt_timeout() {
        let connector = Arc::new(
            ScriptedConnector::new()
                .on(80, Step::Hang)
                .on(443, Step::Hang),
        );
        let prober = prober(&connector);

        for _ in 0..3 {
            assert_eq!(prober.probe(&host()).await, Verdict::Unreachable);
        }

        tokio::time::sleep(ProbeConfig::default().attempt_timeout + Duration::from_secs(1)).await;
        assert_eq!(connector.in_flight(), 0);
        assert_eq!(connector.started(), 6);
    }
}

//! Service façade wiring the normalizer to the prober.

mod connector;
mod normalize;
mod probe;

use std::sync::Arc;

use log::debug;
use tokio::time::Instant;

use crate::error::ReachabilityResult;
use crate::types::{CheckResult, ProbeConfig, ProbeStrategy};

pub use connector::{Connector, HttpHeadConnector, TcpConnector};
pub use normalize::normalize;
pub use probe::Prober;

/// Entry point for reachability checks.
///
/// Holds no per-request state; clone it freely across workers.
///
/// ```rust,no_run
/// use reachable_probe::{ProbeConfig, ProbeStrategy, ReachabilityService};
/// # async fn demo() -> reachable_probe::ReachabilityResult<()> {
/// let service = ReachabilityService::with_strategy(ProbeStrategy::Tcp, ProbeConfig::default());
/// let result = service.check("https://example.com/some/page").await?;
/// println!("{} is {}", result.host, result.verdict);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ReachabilityService {
    prober: Prober,
}

impl ReachabilityService {
    pub fn new(connector: Arc<dyn Connector>, config: ProbeConfig) -> Self {
        Self {
            prober: Prober::new(connector, config),
        }
    }

    /// Build a service around one of the bundled connectors.
    pub fn with_strategy(strategy: ProbeStrategy, config: ProbeConfig) -> Self {
        let connector: Arc<dyn Connector> = match strategy {
            ProbeStrategy::Tcp => Arc::new(TcpConnector::new(config.attempt_timeout)),
            ProbeStrategy::HttpHead => Arc::new(HttpHeadConnector::new(config.attempt_timeout)),
        };
        Self::new(connector, config)
    }

    pub fn config(&self) -> &ProbeConfig {
        self.prober.config()
    }

    /// Normalize `raw` and, if it is accepted, probe the resulting host.
    ///
    /// No network operation happens for rejected input.
    pub async fn check(&self, raw: &str) -> ReachabilityResult<CheckResult> {
        let host = normalize(raw)?;

        let start = Instant::now();
        let verdict = self.prober.probe(&host).await;
        // u128 -> u64: bounded by the probe deadline
        #[allow(clippy::cast_possible_truncation)]
        let elapsed_ms = start.elapsed().as_millis() as u64;

        debug!("[CHECK] {host} is {verdict} ({elapsed_ms}ms)");

        Ok(CheckResult {
            host,
            verdict,
            elapsed_ms,
            checked_at: chrono::Utc::now(),
        })
    }
}

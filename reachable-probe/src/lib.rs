//! Reachability probe engine.
//!
//! Turns an untrusted host or URL string into a validated host and decides
//! whether it answers on ports 80/443 within a fixed deadline. The first
//! attempt to report, success or failure, decides the verdict.
//! All operations are stateless per request.

mod error;
mod services;
#[cfg(test)]
mod test_utils;
mod types;

pub use error::{ProbeError, ReachabilityError, ReachabilityResult};
pub use services::{
    Connector, HttpHeadConnector, Prober, ReachabilityService, TcpConnector, normalize,
};
pub use types::{
    ATTEMPT_TIMEOUT, CheckResult, DEFAULT_PORTS, NormalizedHost, PROBE_DEADLINE, ProbeConfig,
    ProbeOutcome, ProbeStrategy, Verdict,
};

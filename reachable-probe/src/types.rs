//! Public types returned by reachability operations.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ports probed for every request.
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Deadline applied at the race point.
pub const PROBE_DEADLINE: Duration = Duration::from_secs(3);

/// Network timeout of a single attempt. Bounds how long a losing attempt lives.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated host, safe to splice into a connection target or URI.
///
/// Holds either a hostname made of `[A-Za-z0-9.-]` (1..=255 chars) or a
/// global unicast IP literal. Only [`normalize`](crate::normalize) creates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedHost(String);

impl NormalizedHost {
    pub(crate) fn new(host: String) -> Self {
        Self(host)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Aggregate reachability verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Reachable,
    Unreachable,
}

impl Verdict {
    pub fn is_reachable(self) -> bool {
        self == Self::Reachable
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => write!(f, "reachable"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Outcome of a single attempt as reported on the result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    /// Cause is kept for logging only.
    Failure(String),
}

impl ProbeOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Success => Verdict::Reachable,
            Self::Failure(_) => Verdict::Unreachable,
        }
    }
}

/// How an attempt talks to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeStrategy {
    /// Plain TCP connect.
    #[default]
    Tcp,
    /// HTTP `HEAD /`, `https://` on 443, certificate errors ignored.
    HttpHead,
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::HttpHead => write!(f, "http-head"),
        }
    }
}

impl FromStr for ProbeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "http-head" | "http_head" | "head" => Ok(Self::HttpHead),
            _ => Err(format!("Unsupported probe strategy: {s}")),
        }
    }
}

/// Probe parameters, passed explicitly to the prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// One attempt is launched per port.
    pub ports: Vec<u16>,
    /// Race-point deadline.
    pub deadline: Duration,
    /// Per-attempt network timeout.
    pub attempt_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            deadline: PROBE_DEADLINE,
            attempt_timeout: ATTEMPT_TIMEOUT,
        }
    }
}

/// Result of a full check: normalized host plus verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Host that was probed.
    pub host: NormalizedHost,
    /// Aggregate verdict.
    pub verdict: Verdict,
    /// Wall-clock time spent in the probe, in milliseconds.
    pub elapsed_ms: u64,
    /// When the check completed.
    pub checked_at: DateTime<Utc>,
}

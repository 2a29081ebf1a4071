//! Backend connection and job-polling configuration.

use std::time::Duration;

/// Environment variable consulted for the backend host.
pub const BASE_URL_ENV: &str = "SCRIBE_API_URL";

/// Fixed-interval polling policy for one asynchronous backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two consecutive polls (milliseconds)
    pub interval_ms: u64,
    /// Upper bound on poll calls before the job is declared timed out
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const fn new(interval_ms: u64, max_attempts: u32) -> Self {
        Self {
            interval_ms,
            max_attempts,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Worst-case wall time spent waiting between polls.
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.interval_ms.saturating_mul(self.max_attempts as u64))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        BACKEND.poll
    }
}

/// Route layout of the backend HTTP surface.
pub struct Routes {
    /// Prefix for the AI routes (forecast jobs, task polling, chat)
    pub ai_prefix: &'static str,
}

/// HTTP client defaults
pub struct HttpDefaults {
    pub connect_timeout_ms: u64,
    /// Per-request timeout. Chat completions can take minutes on a cold model.
    pub request_timeout_ms: u64,
}

/// The Master Backend Configuration
pub struct BackendConfig {
    pub default_base_url: &'static str,
    pub routes: Routes,
    pub http: HttpDefaults,
    pub poll: PollPolicy,
}

pub const BACKEND: BackendConfig = BackendConfig {
    default_base_url: "http://localhost:8000",
    routes: Routes { ai_prefix: "/ai" },
    http: HttpDefaults {
        connect_timeout_ms: 5_000,
        request_timeout_ms: 300_000,
    },
    poll: PollPolicy::new(2_000, 30),
};

/// Resolve the backend host: explicit value first, then the environment, then the local default.
pub fn resolve_base_url(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| BACKEND.default_base_url.to_string())
}

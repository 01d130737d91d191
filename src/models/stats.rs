//! Persisted system counters surfaced by the monitor API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate counters persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SystemStats {
    /// Total `/api` calls served.
    #[serde(default)]
    pub api_calls: u64,
    /// Total requests that ended in an error response.
    #[serde(default)]
    pub errors: u64,
    /// First-ever process start; basis for the uptime figure.
    pub started_at: DateTime<Utc>,
}

impl Default for SystemStats {
    fn default() -> Self {
        Self {
            api_calls: 0,
            errors: 0,
            started_at: Utc::now(),
        }
    }
}

impl SystemStats {
    /// Seconds elapsed since `started_at`.
    #[must_use]
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

//! Sliding-window admission control keyed by client identity.
//!
//! The ledger is an injected service object with process lifetime: built
//! once at startup, shared by reference, never persisted. It is advisory —
//! a demo-cost control, not a security boundary.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct RateLimiter {
    /// Admitted requests per hour per identity.
    max_requests: usize,
    /// Trailing retention window.
    window: Duration,
    /// client identity → admission timestamps, pruned lazily per lookup.
    /// One lock over the whole map; the read-prune-append sequence for a
    /// key must not interleave with a concurrent check for the same key,
    /// and the map stays small enough that a single mutex is fine.
    ledger: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: i64) -> Self {
        Self {
            max_requests,
            window: Duration::seconds(window_secs),
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Admission check with lazy pruning.
    ///
    /// Entries older than the window are dropped first, so the kept count is
    /// the true number of admitted requests in the trailing window. A
    /// rejected attempt is not recorded — a client sitting at the ceiling is
    /// re-checked on every request instead of being locked out forever.
    pub fn admit(&self, client_id: &str, now: DateTime<Utc>) -> bool {
        let mut ledger = self.ledger.lock().expect("rate ledger poisoned");
        let entries = ledger.entry(client_id.to_string()).or_default();

        let cutoff = now - self.window;
        entries.retain(|t| *t > cutoff);

        if entries.len() >= self.max_requests {
            return false;
        }

        entries.push(now);
        true
    }

    /// Canned over-limit answer, rendered from the same ceiling the check
    /// uses so the message cannot drift from the configuration.
    pub fn limit_message(&self) -> String {
        format!(
            "You've reached the demo limit of {} questions per hour. This helps manage \
             API costs. If you'd like a higher limit, get in touch with the club office.",
            self.max_requests
        )
    }
}

//! In-process fixed-window rate limiting.
//!
//! State is process-local: restarts reset all windows and multiple server
//! instances do not share counts. The limiter is advisory, not a security
//! boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-call budget: `max_requests` per `window` for one identifier.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window,
            max_requests: max_requests.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, at least 1 for a denial.
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        self.reset_at
            .saturating_duration_since(now)
            .as_secs()
            .max(1)
    }
}

/// Capability consulted by rate-limited endpoints. Held in app state as a
/// trait object so a shared backing store can replace the in-memory map
/// without touching call sites.
pub trait RateLimiter: Send + Sync {
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision;
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter map. Windows reset at discrete boundaries; a burst
/// straddling the boundary can see up to 2x the budget, which is accepted
/// for the endpoints this guards.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

const SWEEP_PROBABILITY: f64 = 0.001;

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Core transition, with the clock injected for tests.
    pub fn check_at(
        &self,
        identifier: &str,
        policy: RateLimitPolicy,
        now: Instant,
    ) -> RateLimitDecision {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(identifier) {
            Some(entry) if now < entry.reset_at => {
                if entry.count < policy.max_requests {
                    entry.count += 1;
                    RateLimitDecision {
                        allowed: true,
                        remaining: policy.max_requests - entry.count,
                        reset_at: entry.reset_at,
                    }
                } else {
                    // Over budget: deny without incrementing further.
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: entry.reset_at,
                    }
                }
            }
            _ => {
                // First request for this identifier, or its window expired.
                let reset_at = now + policy.window;
                entries.insert(
                    identifier.to_string(),
                    WindowEntry { count: 1, reset_at },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_requests.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Drops entries whose window has passed. Invoked opportunistically
    /// from `check`; callable directly when prompt cleanup matters.
    pub fn prune_expired_at(&self, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.reset_at > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let now = Instant::now();
        // Low-probability sweep keeps the map bounded without a timer.
        if rand::random::<f64>() < SWEEP_PROBABILITY {
            self.prune_expired_at(now);
        }
        self.check_at(identifier, policy, now)
    }
}

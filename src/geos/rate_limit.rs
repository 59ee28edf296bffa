// src/geos/rate_limit.rs

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic-clock gate enforcing a minimum spacing between successive
/// calls to one remote service. Each provider owns its own gate; the limit
/// is a property of the service, not of any one caller, so whatever issues
/// the calls must funnel them through the same gate.
pub struct RateGate {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Blocks until at least `min_interval` has passed since the previous
    /// `wait` returned, then stamps the clock.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}

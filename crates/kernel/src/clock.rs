use std::time::Instant;

/// Seconds since construction, from a monotonic source.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

//! Slew-rate limiter: bounds `dy/dt` to `±max_rate_per_sec`.

/// Rate limiter with first-call latching.
///
/// The first call latches the input so the limiter starts on the signal.
/// Afterwards the output moves toward the input by at most
/// `max_rate_per_sec · dt` per call. With a non-positive rate or `dt`,
/// the limiter is a passthrough (the latch still updates).
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_rate: f64,
    last_output: f64,
    initialized: bool,
}

impl RateLimiter {
    /// Create a limiter with the given maximum rate per second.
    pub fn new(max_rate_per_sec: f64) -> Self {
        Self {
            max_rate: max_rate_per_sec,
            last_output: 0.0,
            initialized: false,
        }
    }

    /// Apply to one sample.
    pub fn apply(&mut self, input: f64, dt: f64) -> f64 {
        if !self.initialized {
            self.last_output = input;
            self.initialized = true;
            return self.last_output;
        }

        if self.max_rate <= 0.0 || dt <= 0.0 {
            self.last_output = input;
            return self.last_output;
        }

        let max_change = self.max_rate * dt;
        let delta = (input - self.last_output).clamp(-max_change, max_change);
        self.last_output += delta;
        self.last_output
    }

    /// Drop the latched output; the next call re-initializes.
    pub fn reset(&mut self) {
        self.last_output = 0.0;
        self.initialized = false;
    }
}

//! The [`Transform`] sum type over the closed set of transform kinds.

use crate::{
    Deadband, Delay, FirstOrderLag, Linear, MovingAverage, Noise, RateLimiter, Saturation,
};

/// A stateful scalar operator, one variant per known kind.
///
/// `Clone` is a deep copy: ring buffers, latched outputs, and the noise
/// RNG state all ride along, so a clone continues the exact sequence the
/// original would have produced.
#[derive(Clone, Debug)]
pub enum Transform {
    /// `y = clamp(scale·x + offset, clamp_min, clamp_max)`.
    Linear(Linear),
    /// Exponential approach to the input with time constant `tau_s`.
    FirstOrderLag(FirstOrderLag),
    /// Pure time delay via a sample ring buffer.
    Delay(Delay),
    /// Additive Gaussian noise from a seeded RNG.
    Noise(Noise),
    /// `y = clamp(x, min, max)`.
    Saturation(Saturation),
    /// Zero inside the threshold band, passthrough outside.
    Deadband(Deadband),
    /// Slew-rate limit on the output.
    RateLimiter(RateLimiter),
    /// Mean over a fixed-size sample window.
    MovingAverage(MovingAverage),
}

impl Transform {
    /// Apply the transform to one input sample.
    pub fn apply(&mut self, input: f64, dt: f64) -> f64 {
        match self {
            Self::Linear(t) => t.apply(input),
            Self::FirstOrderLag(t) => t.apply(input, dt),
            Self::Delay(t) => t.apply(input, dt),
            Self::Noise(t) => t.apply(input),
            Self::Saturation(t) => t.apply(input),
            Self::Deadband(t) => t.apply(input),
            Self::RateLimiter(t) => t.apply(input, dt),
            Self::MovingAverage(t) => t.apply(input),
        }
    }

    /// Reset internal state to initial conditions.
    pub fn reset(&mut self) {
        match self {
            Self::Linear(_) | Self::Saturation(_) | Self::Deadband(_) => {}
            Self::FirstOrderLag(t) => t.reset(),
            Self::Delay(t) => t.reset(),
            Self::Noise(t) => t.reset(),
            Self::RateLimiter(t) => t.reset(),
            Self::MovingAverage(t) => t.reset(),
        }
    }

    /// Kind name as it appears in graph specifications.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::FirstOrderLag(_) => "first_order_lag",
            Self::Delay(_) => "delay",
            Self::Noise(_) => "noise",
            Self::Saturation(_) => "saturation",
            Self::Deadband(_) => "deadband",
            Self::RateLimiter(_) => "rate_limiter",
            Self::MovingAverage(_) => "moving_average",
        }
    }

    /// Whether this is a delay transform (excluded from cycle checks).
    pub fn is_delay(&self) -> bool {
        matches!(self, Self::Delay(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_spec_strings() {
        let kinds = [
            Transform::Linear(Linear::new(1.0, 0.0)),
            Transform::FirstOrderLag(FirstOrderLag::new(1.0)),
            Transform::Delay(Delay::new(0.1)),
            Transform::Noise(Noise::new(0.0, 0)),
            Transform::Saturation(Saturation::new(0.0, 1.0)),
            Transform::Deadband(Deadband::new(0.5)),
            Transform::RateLimiter(RateLimiter::new(1.0)),
            Transform::MovingAverage(MovingAverage::new(3)),
        ];
        let names: Vec<&str> = kinds.iter().map(Transform::kind).collect();
        assert_eq!(
            names,
            vec![
                "linear",
                "first_order_lag",
                "delay",
                "noise",
                "saturation",
                "deadband",
                "rate_limiter",
                "moving_average",
            ]
        );
    }

    #[test]
    fn only_delay_reports_is_delay() {
        assert!(Transform::Delay(Delay::new(0.1)).is_delay());
        assert!(!Transform::Linear(Linear::new(1.0, 0.0)).is_delay());
    }

    #[test]
    fn clone_carries_state() {
        let mut lag = Transform::FirstOrderLag(FirstOrderLag::new(1.0));
        lag.apply(5.0, 0.1); // latches 5.0
        let mut copy = lag.clone();

        // Both continue from the same latched output.
        let a = lag.apply(6.0, 0.1);
        let b = copy.apply(6.0, 0.1);
        assert_eq!(a, b);
    }

    #[test]
    fn reset_reestablishes_initial_output() {
        let mut lag = Transform::FirstOrderLag(FirstOrderLag::new(2.0));
        let first = lag.apply(3.0, 0.1);
        lag.apply(9.0, 0.1);
        lag.reset();
        assert_eq!(lag.apply(3.0, 0.1), first);
    }
}

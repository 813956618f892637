//! First-order lag (low-pass filter): `dy/dt = (x − y) / τ`.

/// Exponential approach to the input with time constant `tau_s`.
///
/// The first call latches the input as the output, so the filter starts
/// on the signal rather than decaying from zero. With `tau_s <= 0` the
/// filter is a passthrough.
#[derive(Clone, Debug)]
pub struct FirstOrderLag {
    tau_s: f64,
    output: f64,
    initialized: bool,
}

impl FirstOrderLag {
    /// Create a lag with the given time constant in seconds.
    pub fn new(tau_s: f64) -> Self {
        Self {
            tau_s,
            output: 0.0,
            initialized: false,
        }
    }

    /// Apply to one sample.
    pub fn apply(&mut self, input: f64, dt: f64) -> f64 {
        if !self.initialized {
            self.output = input;
            self.initialized = true;
            return self.output;
        }

        if self.tau_s <= 0.0 {
            self.output = input;
            return self.output;
        }

        // Exact discretization: y += (x - y) * (1 - e^(-dt/tau))
        let alpha = 1.0 - (-dt / self.tau_s).exp();
        self.output += alpha * (input - self.output);
        self.output
    }

    /// Drop the latched output; the next call re-initializes.
    pub fn reset(&mut self) {
        self.output = 0.0;
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_latches_input() {
        let mut t = FirstOrderLag::new(1.0);
        assert_eq!(t.apply(5.0, 0.01), 5.0);
    }

    #[test]
    fn step_response_reaches_one_minus_e_inverse() {
        // S2: initialize at 0, step to 1, dt = 0.01; after t = tau = 1s
        // the output should be within 1e-3 of 1 - e^-1.
        let mut t = FirstOrderLag::new(1.0);
        t.apply(0.0, 0.01);
        let mut y = 0.0;
        for _ in 0..100 {
            y = t.apply(1.0, 0.01);
        }
        let expected = 1.0 - (-1.0f64).exp();
        assert!(
            (y - expected).abs() < 1e-3,
            "expected ~{expected}, got {y}"
        );
    }

    #[test]
    fn exact_discretization_is_stable_for_large_dt() {
        // With dt >> tau the exponential form converges to the input
        // instead of oscillating as naive Euler would.
        let mut t = FirstOrderLag::new(0.1);
        t.apply(0.0, 1.0);
        let y = t.apply(1.0, 10.0);
        assert!(y > 0.999 && y <= 1.0, "got {y}");
    }

    #[test]
    fn nonpositive_tau_is_passthrough() {
        let mut t = FirstOrderLag::new(0.0);
        t.apply(0.0, 0.1);
        assert_eq!(t.apply(42.0, 0.1), 42.0);

        let mut t = FirstOrderLag::new(-1.0);
        t.apply(0.0, 0.1);
        assert_eq!(t.apply(7.0, 0.1), 7.0);
    }

    #[test]
    fn reset_relatches_on_next_call() {
        let mut t = FirstOrderLag::new(1.0);
        t.apply(3.0, 0.1);
        t.apply(100.0, 0.1);
        t.reset();
        assert_eq!(t.apply(3.0, 0.1), 3.0);
    }
}

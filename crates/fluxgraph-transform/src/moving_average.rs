//! Moving average over a fixed-size sample window.

use std::collections::VecDeque;

/// `y = mean(x[t−N+1] ... x[t])` with window size `N >= 1`.
///
/// The average is taken over however many samples have arrived until the
/// window fills. `dt` plays no role; the window is counted in samples.
#[derive(Clone, Debug)]
pub struct MovingAverage {
    window_size: usize,
    samples: VecDeque<f64>,
}

impl MovingAverage {
    /// Create an averager over the given window size.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            samples: VecDeque::with_capacity(window_size),
        }
    }

    /// Apply to one sample.
    pub fn apply(&mut self, input: f64) -> f64 {
        self.samples.push_back(input);
        if self.samples.len() > self.window_size {
            self.samples.pop_front();
        }

        let sum: f64 = self.samples.iter().sum();
        sum / self.samples.len() as f64
    }

    /// Empty the window.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

//! Rolling window statistics with O(1) updates.
//!
//! Keeps a running sum and sum of squares over the last `capacity` values.
//! MEAN = sum / n
//! VAR  = (sum_sq - n * mean^2) / (n - 1)   (sample, Bessel's correction)
//! VAR  = (sum_sq - n * mean^2) / n         (population)
//! Statistics are only reported once the window is full.

use std::collections::VecDeque;

use crate::domain::error::SignalbookError;

#[derive(Debug, Clone)]
pub struct StatAccumulator {
    window: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    sum_of_squares: f64,
}

impl StatAccumulator {
    pub fn new(capacity: usize) -> Result<Self, SignalbookError> {
        if capacity == 0 {
            return Err(SignalbookError::invalid_parameter(
                "capacity",
                "window capacity must be at least 1",
            ));
        }
        Ok(StatAccumulator {
            window: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            sum_of_squares: 0.0,
        })
    }

    /// Append a value, evicting the oldest one first when the window is full.
    pub fn push(&mut self, value: f64) {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
                self.sum_of_squares -= old * old;
            }
        }
        self.window.push_back(value);
        self.sum += value;
        self.sum_of_squares += value * value;
    }

    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.sum / self.capacity as f64)
    }

    /// Variance of the full window, floored at zero.
    pub fn variance(&self, sample: bool) -> Option<f64> {
        let mean = self.mean()?;
        let n = self.capacity as f64;
        let divisor = if sample {
            if self.capacity == 1 {
                return Some(0.0);
            }
            n - 1.0
        } else {
            n
        };
        let var = (self.sum_of_squares - n * mean * mean) / divisor;
        // Cancellation can push var slightly below zero; NaN also lands here.
        Some(if var > 0.0 { var } else { 0.0 })
    }

    pub fn stddev(&self, sample: bool) -> Option<f64> {
        self.variance(sample).map(f64::sqrt)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Window contents, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }
}

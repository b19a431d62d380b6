//! Rolling statistics over the daily series.

use std::collections::VecDeque;

/// Width of the volatility window, in observations.
pub const VOLATILITY_WINDOW: usize = 7;

/// Rolling sample standard deviation over a fixed number of observations.
///
/// Uses Bessel's correction and only reports a value once the window is full.
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: VecDeque<f64>,
    period: usize,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(period),
            period: period.max(2),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.get()
    }

    pub fn get(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        let n = self.window.len() as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let m2 = self.window.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        Some((m2 / (n - 1.0)).sqrt())
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }
}

/// Applies [`RollingStd`] across `values`, one output per input.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut std = RollingStd::new(period);
    values.iter().map(|v| std.update(*v)).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

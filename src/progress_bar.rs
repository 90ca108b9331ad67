//! Progress reporting for long dataset builds (feature `progress`).
//!
//! [`BuildProgress`] drives an `indicatif` bar over the grid instants. After each chunk the
//! bar message shows the build throughput in instants per second, smoothed with an
//! exponential moving average:
//!
//! ```text
//! rate ← α·(instants / elapsed) + (1 − α)·rate,   α = 0.2
//! ```
//!
//! The first chunk sets the rate directly.
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const RATE_SMOOTHING: f64 = 0.2;

/// Next smoothed throughput after a chunk of `instants` took `elapsed`.
fn smoothed_rate(previous: Option<f64>, instants: usize, elapsed: Duration) -> f64 {
    let current = instants as f64 / elapsed.as_secs_f64().max(1e-9);
    match previous {
        None => current,
        Some(rate) => RATE_SMOOTHING * current + (1.0 - RATE_SMOOTHING) * rate,
    }
}

/// Progress bar counting grid instants.
pub struct BuildProgress {
    bar: ProgressBar,
    chunk_started: Instant,
    rate: Option<f64>,
}

impl BuildProgress {
    pub fn new(total_instants: usize) -> Self {
        let bar = ProgressBar::new(total_instants.max(1) as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}",
        ) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(200));
        BuildProgress {
            bar,
            chunk_started: Instant::now(),
            rate: None,
        }
    }

    /// Record a finished chunk of `n` instants.
    pub fn chunk_done(&mut self, n: usize) {
        let now = Instant::now();
        let rate = smoothed_rate(self.rate, n, now.duration_since(self.chunk_started));
        self.chunk_started = now;
        self.rate = Some(rate);
        self.bar.set_message(format!("{rate:.0} instants/s"));
        self.bar.inc(n as u64);
    }

    pub fn interrupted(&self) {
        self.bar.set_message("cancelled");
        self.bar.disable_steady_tick();
        self.bar.abandon();
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod progress_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_chunk_sets_the_rate() {
        let rate = smoothed_rate(None, 256, Duration::from_millis(500));
        assert_relative_eq!(rate, 512.0);
    }

    #[test]
    fn test_rate_is_smoothed() {
        // 1000/s, then a chunk at 2000/s moves the rate a fifth of the way
        let rate = smoothed_rate(Some(1000.0), 200, Duration::from_millis(100));
        assert_relative_eq!(rate, 1200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_elapsed_stays_finite() {
        assert!(smoothed_rate(None, 10, Duration::ZERO).is_finite());
    }
}

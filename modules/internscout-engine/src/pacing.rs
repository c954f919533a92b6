//! Randomized human-like delays between remote actions.
//!
//! Every wait draws uniformly from a named window: short within a result
//! scan, longer between role scans, longest between companies. A fixed
//! seed makes the whole schedule reproducible.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use internscout_common::{DelayRange, DelayRanges};

pub struct PacingPolicy {
    rng: StdRng,
    ranges: DelayRanges,
}

impl PacingPolicy {
    pub fn new(ranges: DelayRanges, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, ranges }
    }

    /// A policy that never sleeps. Used by tests and dry runs.
    pub fn unpaced() -> Self {
        let zero = DelayRange::new(0.0, 0.0);
        Self::new(
            DelayRanges {
                default: zero,
                within_scan: zero,
                after_search: zero,
                between_roles: zero,
                after_send: zero,
                between_entities: zero,
            },
            Some(0),
        )
    }

    /// Swap in new delay windows (apply-configuration).
    pub fn set_ranges(&mut self, ranges: DelayRanges) {
        self.ranges = ranges;
    }

    /// Draw a delay from a window without sleeping. Pure given the RNG
    /// state; inverted or negative windows are clamped.
    pub fn sample(&mut self, range: DelayRange) -> Duration {
        let min = range.min_secs.min(range.max_secs).max(0.0);
        let max = range.min_secs.max(range.max_secs).max(0.0);
        if max == 0.0 {
            return Duration::ZERO;
        }
        let secs = if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        };
        Duration::from_secs_f64(secs)
    }

    pub async fn pause(&mut self, range: DelayRange) {
        let delay = self.sample(range);
        if delay.is_zero() {
            return;
        }
        info!(wait_secs = format!("{:.1}", delay.as_secs_f64()).as_str(), "Pacing wait");
        tokio::time::sleep(delay).await;
    }

    pub async fn default_wait(&mut self) {
        let range = self.ranges.default;
        self.pause(range).await;
    }

    pub async fn within_scan(&mut self) {
        let range = self.ranges.within_scan;
        self.pause(range).await;
    }

    pub async fn after_search(&mut self) {
        let range = self.ranges.after_search;
        self.pause(range).await;
    }

    pub async fn between_roles(&mut self) {
        let range = self.ranges.between_roles;
        self.pause(range).await;
    }

    pub async fn after_send(&mut self) {
        let range = self.ranges.after_send;
        self.pause(range).await;
    }

    pub async fn between_entities(&mut self) {
        let range = self.ranges.between_entities;
        self.pause(range).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_inside_the_window() {
        let mut pacing = PacingPolicy::new(DelayRanges::default(), Some(42));
        let range = DelayRange::new(3.0, 5.0);
        for _ in 0..100 {
            let d = pacing.sample(range).as_secs_f64();
            assert!((3.0..=5.0).contains(&d), "delay {d} escaped the window");
        }
    }

    #[test]
    fn fixed_seed_reproduces_the_schedule() {
        let range = DelayRange::new(10.0, 20.0);
        let mut a = PacingPolicy::new(DelayRanges::default(), Some(7));
        let mut b = PacingPolicy::new(DelayRanges::default(), Some(7));
        let schedule_a: Vec<_> = (0..10).map(|_| a.sample(range)).collect();
        let schedule_b: Vec<_> = (0..10).map(|_| b.sample(range)).collect();
        assert_eq!(schedule_a, schedule_b);
    }

    #[test]
    fn zero_window_never_waits() {
        let mut pacing = PacingPolicy::unpaced();
        assert_eq!(pacing.sample(DelayRange::new(0.0, 0.0)), Duration::ZERO);
    }

    #[test]
    fn inverted_window_is_clamped() {
        let mut pacing = PacingPolicy::new(DelayRanges::default(), Some(1));
        let d = pacing.sample(DelayRange::new(5.0, 3.0)).as_secs_f64();
        assert!((3.0..=5.0).contains(&d));
    }
}

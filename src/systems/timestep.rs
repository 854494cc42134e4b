//! Fixed-timestep accumulator.
//!
//! Converts the variable gaps between host frames into a whole number of
//! fixed simulation ticks plus an interpolation factor for drawing. Each
//! tick is handed `accumulator / tick_rate` measured *before* the tick's
//! share is subtracted, so a frame that owes several ticks produces a
//! shrinking sequence (2.5, 1.5 for a 125 ms gap at 50 ms).

use smallvec::SmallVec;

/// Default tick length: 50 ms, i.e. 20 ticks per second.
pub const DEFAULT_TICK_RATE_MS: f64 = 50.0;

/// What one host frame must do.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    /// Milliseconds since the previous frame (never negative).
    pub frame_time: f64,
    /// Tick values to pass to the world, in order.
    pub ticks: SmallVec<[f64; 4]>,
    /// Interpolation factor for the draw pass, in `[0, 1)`.
    pub alpha: f64,
    /// Whole ticks discarded by the catch-up limit.
    pub dropped: u64,
}

#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_rate: f64,
    max_ticks: u32,
    last: f64,
    accumulator: f64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_MS, 0)
    }
}

impl FixedTimestep {
    /// `max_ticks` limits ticks per frame; 0 leaves catch-up unbounded.
    /// A tick rate that is not a positive number falls back to the default.
    pub fn new(tick_rate_ms: f64, max_ticks: u32) -> Self {
        let tick_rate = if tick_rate_ms.is_finite() && tick_rate_ms > 0.0 {
            tick_rate_ms
        } else {
            DEFAULT_TICK_RATE_MS
        };
        Self {
            tick_rate,
            max_ticks,
            last: 0.0,
            accumulator: 0.0,
        }
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Measure the next frame from `now`. The accumulator is kept.
    pub fn reset_clock(&mut self, now: f64) {
        self.last = now;
    }

    /// Account for a frame at timestamp `now` and plan its ticks.
    pub fn advance(&mut self, now: f64) -> FramePlan {
        let frame_time = (now - self.last).max(0.0);
        self.last = now;
        self.accumulator += frame_time;

        let mut ticks = SmallVec::new();
        let mut dropped = 0;
        while self.accumulator >= self.tick_rate {
            if self.max_ticks > 0 && ticks.len() >= self.max_ticks as usize {
                dropped = (self.accumulator / self.tick_rate).floor() as u64;
                self.accumulator %= self.tick_rate;
                break;
            }
            ticks.push(self.accumulator / self.tick_rate);
            self.accumulator -= self.tick_rate;
        }

        FramePlan {
            frame_time,
            ticks,
            alpha: self.accumulator / self.tick_rate,
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_125ms_frame_runs_two_shrinking_ticks() {
        let mut step = FixedTimestep::default();
        step.reset_clock(1000.0);
        let plan = step.advance(1125.0);

        assert_eq!(plan.ticks.len(), 2);
        assert!(approx_eq(plan.ticks[0], 2.5));
        assert!(approx_eq(plan.ticks[1], 1.5));
        assert!(approx_eq(plan.alpha, 0.5));
        assert!(approx_eq(plan.frame_time, 125.0));
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut step = FixedTimestep::default();
        assert!(step.advance(20.0).ticks.is_empty());
        assert!(step.advance(40.0).ticks.is_empty());
        let plan = step.advance(60.0);
        assert_eq!(plan.ticks.len(), 1);
        assert!(approx_eq(plan.ticks[0], 1.2));
        assert!(approx_eq(plan.alpha, 0.2));
    }

    #[test]
    fn test_exact_tick_boundary() {
        let mut step = FixedTimestep::default();
        let plan = step.advance(50.0);
        assert_eq!(plan.ticks.len(), 1);
        assert!(approx_eq(plan.ticks[0], 1.0));
        assert!(approx_eq(plan.alpha, 0.0));
    }

    #[test]
    fn test_backwards_clock_counts_as_zero() {
        let mut step = FixedTimestep::default();
        step.reset_clock(500.0);
        let plan = step.advance(400.0);
        assert!(approx_eq(plan.frame_time, 0.0));
        assert!(plan.ticks.is_empty());
        assert!(approx_eq(step.last(), 400.0));
    }

    #[test]
    fn test_catch_up_limit_drops_whole_ticks() {
        let mut step = FixedTimestep::new(50.0, 2);
        let plan = step.advance(260.0);
        assert_eq!(plan.ticks.len(), 2);
        assert!(approx_eq(plan.ticks[0], 5.2));
        assert!(approx_eq(plan.ticks[1], 4.2));
        assert_eq!(plan.dropped, 3);
        assert!(approx_eq(plan.alpha, 0.2));
    }

    #[test]
    fn test_invalid_tick_rate_falls_back() {
        assert!(approx_eq(FixedTimestep::new(0.0, 0).tick_rate(), DEFAULT_TICK_RATE_MS));
        assert!(approx_eq(FixedTimestep::new(-5.0, 0).tick_rate(), DEFAULT_TICK_RATE_MS));
        assert!(approx_eq(FixedTimestep::new(f64::NAN, 0).tick_rate(), DEFAULT_TICK_RATE_MS));
        assert!(approx_eq(FixedTimestep::new(16.0, 0).tick_rate(), 16.0));
    }
}

//! Frame clock feeding elapsed time to the animation engines.
//!
//! Every engine is a pure function of elapsed seconds, so the clock is the
//! only place time accumulates. A render loop calls [`FrameClock::tick`] once
//! per displayed frame and passes the result to `advance`. Headless drivers
//! and tests use [`FrameClock::manual`] and set time explicitly.
//!
//! # Example
//!
//! ```ignore
//! use atomscope::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! loop {
//!     let elapsed = clock.tick();
//!     let state = renderer.advance(elapsed, settings.settings());
//!     // hand `state` to the backend
//! }
//! ```

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Source {
    Wall { last_frame: Instant },
    Manual,
}

/// Monotonic elapsed-time source.
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
    /// Total elapsed seconds, scaled.
    elapsed_secs: f32,
    /// Seconds added by the last tick.
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    /// Replaces the measured delta when set.
    fixed_delta: Option<f32>,
    time_scale: f32,
}

impl FrameClock {
    /// A clock driven by wall time, starting now.
    pub fn new() -> Self {
        Self::with_source(Source::Wall {
            last_frame: Instant::now(),
        })
    }

    /// A clock that only moves through [`set_elapsed`](Self::set_elapsed),
    /// [`advance_by`](Self::advance_by) or a fixed delta.
    pub fn manual() -> Self {
        Self::with_source(Source::Manual)
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance one frame and return elapsed seconds.
    ///
    /// While paused the elapsed value holds still and the delta is 0.
    pub fn tick(&mut self) -> f32 {
        let raw_delta = match &mut self.source {
            Source::Wall { last_frame } => {
                let now = Instant::now();
                let d = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;
                d
            }
            Source::Manual => 0.0,
        };
        self.frame_count += 1;

        if self.paused {
            self.delta_secs = 0.0;
            return self.elapsed_secs;
        }

        self.delta_secs = self.fixed_delta.unwrap_or(raw_delta) * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.elapsed_secs
    }

    /// Move a manual clock forward by `seconds` (scaled). Ignored while paused.
    pub fn advance_by(&mut self, seconds: f32) -> f32 {
        if !self.paused && seconds.is_finite() {
            self.delta_secs = seconds.max(0.0) * self.time_scale;
            self.elapsed_secs += self.delta_secs;
            self.frame_count += 1;
        }
        self.elapsed_secs
    }

    /// Jump straight to `seconds`. Negative or non-finite input becomes 0.
    pub fn set_elapsed(&mut self, seconds: f32) {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.delta_secs = seconds - self.elapsed_secs;
        self.elapsed_secs = seconds;
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_manual(&self) -> bool {
        matches!(self.source, Source::Manual)
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after [`pause`](Self::pause). The paused interval is skipped.
    pub fn resume(&mut self) {
        if self.paused {
            if let Source::Wall { last_frame } = &mut self.source {
                *last_frame = Instant::now();
            }
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a constant step per tick instead of measured wall time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.filter(|d| d.is_finite() && *d >= 0.0);
    }

    /// Negative scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn reset(&mut self) {
        if let Source::Wall { last_frame } = &mut self.source {
            *last_frame = Instant::now();
        }
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.paused = false;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
        assert!(!clock.is_manual());
    }

    #[test]
    fn test_wall_tick_is_monotonic() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        let a = clock.tick();
        thread::sleep(Duration::from_millis(5));
        let b = clock.tick();
        assert!(a > 0.0);
        assert!(b > a);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_pause_holds_elapsed() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        clock.tick();
        clock.pause();
        let held = clock.elapsed();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.tick(), held);
        assert_eq!(clock.delta(), 0.0);

        clock.resume();
        let after = clock.tick();
        assert!(after - held < 0.015);
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = FrameClock::manual();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.advance_by(0.5), 0.5);
        clock.set_elapsed(3.0);
        assert_eq!(clock.elapsed(), 3.0);
        assert_eq!(clock.delta(), 2.5);
        clock.set_elapsed(f32::NAN);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_fixed_delta_and_scale() {
        let mut clock = FrameClock::manual();
        clock.set_fixed_delta(Some(0.25));
        clock.set_time_scale(2.0);
        clock.tick();
        assert!((clock.tick() - 1.0).abs() < 1e-6);

        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
        clock.set_fixed_delta(Some(-1.0));
        clock.set_time_scale(1.0);
        assert_eq!(clock.tick(), 1.0);
    }
}

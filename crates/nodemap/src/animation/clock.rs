//! Frame clocks for the animation loop.

use std::{
    thread,
    time::{Duration, Instant},
};

/// A monotonic millisecond time source with a way to wait for the next
/// frame.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> f64;

    /// Blocks (or simulates blocking) until the next frame, `frame_ms` later.
    fn wait_frame(&mut self, frame_ms: f64);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wait_frame(&mut self, frame_ms: f64) {
        thread::sleep(Duration::from_secs_f64(frame_ms.max(0.0) / 1000.0));
    }
}

/// Simulated clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    pub fn set(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn wait_frame(&mut self, frame_ms: f64) {
        self.advance(frame_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_advanced() {
        let mut clock = ManualClock::new(10.0);
        assert_eq!(clock.now_ms(), 10.0);

        clock.wait_frame(16.0);
        assert_eq!(clock.now_ms(), 26.0);

        clock.set(0.0);
        assert_eq!(clock.now_ms(), 0.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let first = clock.now_ms();
        clock.wait_frame(1.0);
        assert!(clock.now_ms() >= first);
    }
}

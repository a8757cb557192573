//! Time-driven rotation with seamless pause and resume
//!
//! A layer's angle is a pure function of wall-clock time and a small state
//! record. Nothing is integrated per frame, so the angle is identical no
//! matter how often (or how irregularly) it is sampled.

use serde::{Deserialize, Serialize};
use crate::math::normalize_degrees;

/// Which way a layer spins on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn multiplier(&self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Run/pause transition fed to a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSignal {
    Start,
    Stop,
}

/// Persistent rotation state for one layer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Angle banked by previous runs, always in [0, 360)
    pub accumulated_angle: f64,
    /// Wall-clock second at which the current run began
    pub run_start: Option<f64>,
}

impl RotationState {
    pub fn is_running(&self) -> bool {
        self.run_start.is_some()
    }

    /// Display angle at time `t` for a signed rate in degrees per second
    pub fn angle(&self, t: f64, rate: f64) -> f64 {
        match self.run_start {
            Some(start) => normalize_degrees(self.accumulated_angle + rate * (t - start)),
            None => self.accumulated_angle,
        }
    }

    /// Next state after `signal` arrives at time `t`.
    ///
    /// Stopping banks the exact current angle; starting only records the
    /// start time, so a resumed run continues from the frozen angle.
    pub fn apply(self, signal: RotationSignal, t: f64, rate: f64) -> Self {
        match (signal, self.run_start) {
            (RotationSignal::Start, None) => Self {
                run_start: Some(t),
                ..self
            },
            (RotationSignal::Stop, Some(_)) => Self {
                accumulated_angle: self.angle(t, rate),
                run_start: None,
            },
            // Start while running or stop while stopped changes nothing
            _ => self,
        }
    }
}

/// Converts wall-clock time into a rotation angle for one layer
#[derive(Debug, Clone)]
pub struct RotationClock {
    speed: f64,
    direction: Direction,
    state: RotationState,
}

impl RotationClock {
    /// A stopped clock at 0 degrees; `speed` is in degrees per second
    pub fn new(speed: f64, direction: Direction) -> Self {
        Self {
            speed,
            direction,
            state: RotationState::default(),
        }
    }

    /// Signed angular rate in degrees per second
    pub fn rate(&self) -> f64 {
        self.direction.multiplier() * self.speed
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn angle(&self, t: f64) -> f64 {
        self.state.angle(t, self.rate())
    }

    pub fn start(&mut self, t: f64) {
        self.signal(RotationSignal::Start, t);
    }

    pub fn stop(&mut self, t: f64) {
        self.signal(RotationSignal::Stop, t);
    }

    pub fn set_running(&mut self, t: f64, running: bool) {
        if running {
            self.start(t);
        } else {
            self.stop(t);
        }
    }

    pub fn signal(&mut self, signal: RotationSignal, t: f64) {
        self.state = self.state.apply(signal, t, self.rate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = normalize_degrees(a - b);
        d.min(360.0 - d)
    }

    #[test]
    fn test_stopped_clock_holds_angle() {
        let clock = RotationClock::new(60.0, Direction::Clockwise);
        assert!(!clock.is_running());
        assert_eq!(clock.angle(0.0), 0.0);
        assert_eq!(clock.angle(100.0), 0.0);
    }

    #[test]
    fn test_rate_is_linear_in_elapsed_time() {
        let mut clock = RotationClock::new(37.5, Direction::Clockwise);
        clock.start(3.0);

        for (t1, t2) in [(3.0, 4.0), (3.25, 10.5), (7.0, 7.001), (5.0, 500.0)] {
            let expected = normalize_degrees(clock.rate() * (t2 - t1));
            let actual = normalize_degrees(clock.angle(t2) - clock.angle(t1));
            assert!(angular_distance(actual, expected) < 1e-6, "{} -> {}", t1, t2);
        }
    }

    #[test]
    fn test_counter_clockwise_wraps_forward() {
        let mut clock = RotationClock::new(45.0, Direction::CounterClockwise);
        clock.start(0.0);
        assert!((clock.angle(1.0) - 315.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_always_in_range() {
        for direction in [Direction::Clockwise, Direction::CounterClockwise] {
            let mut clock = RotationClock::new(180.0, direction);
            clock.start(0.0);
            for t in [0.0, 0.5, 1.0, 2.0, 1.0e3, 1.0e6, 1.0e9, 123_456.789] {
                let angle = clock.angle(t);
                assert!((0.0..360.0).contains(&angle), "{:?} at {}: {}", direction, t, angle);
            }
        }
    }

    #[test]
    fn test_pause_resume_has_no_jump() {
        let mut clock = RotationClock::new(60.0, Direction::Clockwise);
        clock.start(0.0);

        let before_pause = clock.angle(1.5);
        clock.stop(1.5);
        assert!((clock.angle(1.5) - before_pause).abs() < 1e-9);
        assert!((clock.angle(2.7) - before_pause).abs() < 1e-9);

        clock.start(3.5);
        assert!((clock.angle(3.5) - before_pause).abs() < 1e-9);

        // Continues at the same rate from the frozen angle
        let after = clock.angle(4.5);
        assert!(angular_distance(after, before_pause + 60.0) < 1e-9);
    }

    #[test]
    fn test_redundant_signals_are_noops() {
        let mut clock = RotationClock::new(10.0, Direction::Clockwise);
        clock.start(0.0);
        clock.start(5.0);
        assert_eq!(clock.state().run_start, Some(0.0));

        clock.stop(2.0);
        let frozen = clock.state();
        clock.stop(9.0);
        assert_eq!(clock.state(), frozen);
    }

    #[test]
    fn test_pure_transition() {
        let state = RotationState::default();
        let running = state.apply(RotationSignal::Start, 10.0, -30.0);
        assert!(running.is_running());
        assert_eq!(running.accumulated_angle, 0.0);

        let stopped = running.apply(RotationSignal::Stop, 11.0, -30.0);
        assert!(!stopped.is_running());
        assert!((stopped.accumulated_angle - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_sampling_order_does_not_matter() {
        let mut clock = RotationClock::new(90.0, Direction::Clockwise);
        clock.start(0.0);
        let forward: Vec<f64> = [0.1, 0.2, 0.3].iter().map(|&t| clock.angle(t)).collect();
        let mut backward: Vec<f64> = [0.3, 0.2, 0.1].iter().map(|&t| clock.angle(t)).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        for (angle, expected) in forward.iter().zip([9.0, 18.0, 27.0]) {
            assert!((angle - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sampling_between_signals_is_stable() {
        let mut clock = RotationClock::new(90.0, Direction::Clockwise);
        clock.start(0.0);
        clock.stop(1.0);
        clock.start(3.0);
        let late = clock.angle(4.0);
        let early = clock.angle(3.5);
        assert_eq!(early, 135.0);
        assert_eq!(late, 180.0);
        assert_eq!(clock.angle(4.0), late);
    }
}

//! Wavy blob silhouette used to mask glow layers into organic shapes
//!
//! The outline is a star-shaped polar curve whose radius ripples with a few
//! sine harmonics. Each harmonic advances a whole number of cycles per loop,
//! so the shape at the end of a loop is exactly the shape at its start.

use std::f32::consts::TAU;
use crate::animation::{ease, Direction, Easing, RotationClock};
use crate::math::Vec2;
use super::soft_disc;

/// `(lobes, amplitude, cycles per loop, phase offset)` for each ripple
pub const BLOB_HARMONICS: [[f32; 4]; 3] = [
    [3.0, 0.07, 1.0, 0.0],
    [2.0, 0.05, -1.0, 1.3],
    [5.0, 0.03, 2.0, 2.1],
];

/// Share of the placement width the resting blob fills
const BLOB_FILL: f32 = 0.8;

/// Where a blob sits inside the orb, in orb-size fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobPlacement {
    /// Width of the frame the blob is fitted into
    pub width: f32,
    /// Vertical offset of the blob center; positive moves it down
    pub offset_y: f32,
    /// Static rotation of the silhouette in degrees
    pub rotation: f32,
}

/// Animated blob silhouette with a fixed loop duration
#[derive(Debug, Clone)]
pub struct BlobMask {
    loop_duration: f64,
    placement: BlobPlacement,
    softness: f32,
    /// Sweeps 360 degrees per loop; pausing it pauses the ripple
    clock: RotationClock,
}

impl BlobMask {
    /// `loop_duration` in seconds; zero, negative or non-finite durations
    /// collapse to a static shape
    pub fn new(loop_duration: f64, placement: BlobPlacement) -> Self {
        let degrees_per_second = if loop_duration.is_finite() && loop_duration > 0.0 {
            360.0 / loop_duration
        } else {
            0.0
        };
        Self {
            loop_duration,
            placement,
            softness: 0.0,
            clock: RotationClock::new(degrees_per_second, Direction::Clockwise),
        }
    }

    /// Loop duration derived from the orb's base speed: `60 / speed × multiplier`
    pub fn loop_duration_for(speed: f64, multiplier: f64) -> f64 {
        if speed > 0.0 {
            60.0 / speed * multiplier
        } else {
            f64::INFINITY
        }
    }

    pub fn with_softness(mut self, softness: f32) -> Self {
        self.softness = softness.max(0.0);
        self
    }

    pub fn loop_duration(&self) -> f64 {
        self.loop_duration
    }

    pub fn placement(&self) -> BlobPlacement {
        self.placement
    }

    pub fn set_running(&mut self, t: f64, running: bool) {
        self.clock.set_running(t, running);
    }

    /// Position within the current loop, in [0, 1)
    pub fn phase(&self, t: f64) -> f32 {
        (self.clock.angle(t) / 360.0) as f32
    }

    /// Shape parameters at time `t`
    pub fn shape(&self, t: f64) -> BlobShape {
        BlobShape {
            center: Vec2::new(0.0, self.placement.offset_y),
            radius: self.placement.width * 0.5 * BLOB_FILL,
            rotation: self.placement.rotation,
            phase: ease(self.phase(t), Easing::Sine),
            softness: self.softness,
        }
    }
}

/// One frame of a blob outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobShape {
    pub center: Vec2,
    /// Resting radius before ripples
    pub radius: f32,
    pub rotation: f32,
    /// Eased loop phase in [0, 1]
    pub phase: f32,
    pub softness: f32,
}

impl BlobShape {
    /// Outline radius along polar angle `theta` (radians, shape-local)
    pub fn radius_at(&self, theta: f32) -> f32 {
        let ripple: f32 = BLOB_HARMONICS
            .iter()
            .map(|[lobes, amplitude, cycles, offset]| {
                amplitude * (lobes * theta + TAU * cycles * self.phase + offset).sin()
            })
            .sum();
        self.radius * (1.0 + ripple)
    }

    /// Mask coverage at an orb-space point
    pub fn coverage(&self, point: Vec2) -> f32 {
        let local = (point - self.center).rotate(-self.rotation);
        let edge = self.radius_at(local.angle());
        soft_disc(local.length(), edge, self.softness)
    }
}

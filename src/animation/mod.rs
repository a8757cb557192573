//! Continuous-time animation primitives
//!
//! Rotation clocks, keyframe curves and easing. Everything here is a pure
//! function of elapsed wall-clock time, never of frame count.

mod rotation;
mod keyframe;
mod easing;

pub use rotation::{Direction, RotationClock, RotationSignal, RotationState};
pub use keyframe::{KeyframeCurve, KeyframeTimes};
pub use easing::{Easing, ease};

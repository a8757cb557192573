//! Easing functions for looping shape animation

/// Easing function types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    /// Linear interpolation
    Linear,
    /// Smooth ease-in-out
    #[default]
    EaseInOut,
    /// Half-cosine; slope is equal at both ends so loops join smoothly
    Sine,
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::Linear => t,
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::Sine => 0.5 - 0.5 * (t * std::f32::consts::PI).cos(),
    }
}

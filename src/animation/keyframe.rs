//! Piecewise-linear keyframe curves over a normalized [0, 1] timeline

use crate::error::{OrbError, Result};

/// Validated keyframe times: strictly increasing, from exactly 0 to exactly 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeTimes<const N: usize>([f32; N]);

impl<const N: usize> KeyframeTimes<N> {
    pub fn new(times: [f32; N]) -> Result<Self> {
        if N < 2 {
            return Err(OrbError::InvalidKeyframes(format!(
                "need at least two keyframes, got {}",
                N
            )));
        }
        if times[0] != 0.0 || times[N - 1] != 1.0 {
            return Err(OrbError::InvalidKeyframes(format!(
                "times must span 0..1, got {:?}",
                times
            )));
        }
        if times.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(OrbError::InvalidKeyframes(format!(
                "times must be strictly increasing, got {:?}",
                times
            )));
        }
        Ok(Self(times))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A curve of `N` control points, linearly interpolated between them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeCurve<const N: usize> {
    times: KeyframeTimes<N>,
    values: [f32; N],
}

impl<const N: usize> KeyframeCurve<N> {
    pub fn new(times: KeyframeTimes<N>, values: [f32; N]) -> Self {
        Self { times, values }
    }

    pub fn values(&self) -> &[f32; N] {
        &self.values
    }

    pub fn times(&self) -> &[f32] {
        self.times.as_slice()
    }

    /// Value at `fraction` of the timeline, clamped to [0, 1]
    pub fn sample(&self, fraction: f32) -> f32 {
        let times = &self.times.0;
        let t = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };

        // Control points come back exactly
        if let Some(i) = times.iter().position(|&k| k == t) {
            return self.values[i];
        }

        let upper = times.iter().position(|&k| k > t).unwrap_or(N - 1);
        let lower = upper.saturating_sub(1);
        let (t0, t1) = (times[lower], times[upper]);
        let (v0, v1) = (self.values[lower], self.values[upper]);

        let u = (t - t0) / (t1 - t0);
        let value = v0 + (v1 - v0) * u;
        // Keep rounding from stepping outside the segment
        value.clamp(v0.min(v1), v0.max(v1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_curve() -> KeyframeCurve<4> {
        let times = KeyframeTimes::new([0.0, 0.2, 0.8, 1.0]).unwrap();
        KeyframeCurve::new(times, [0.0, 0.6, 0.4, 0.1])
    }

    #[test]
    fn test_invalid_times_rejected() {
        assert!(KeyframeTimes::new([0.0, 0.5, 0.4, 1.0]).is_err());
        assert!(KeyframeTimes::new([0.1, 0.5, 1.0]).is_err());
        assert!(KeyframeTimes::new([0.0, 0.5, 0.9]).is_err());
        assert!(KeyframeTimes::new([0.0, 0.5, 0.5, 1.0]).is_err());
        assert!(KeyframeTimes::new([0.0]).is_err());
        assert!(KeyframeTimes::new([0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_exact_at_control_points() {
        let curve = alpha_curve();
        for (t, v) in curve.times().iter().zip(curve.values().iter()) {
            assert_eq!(curve.sample(*t), *v);
        }
    }

    #[test]
    fn test_between_neighbors_without_overshoot() {
        let curve = alpha_curve();
        let times = curve.times().to_vec();
        let values = *curve.values();

        for seg in 0..3 {
            let (lo, hi) = (values[seg].min(values[seg + 1]), values[seg].max(values[seg + 1]));
            for step in 1..100 {
                let t = times[seg] + (times[seg + 1] - times[seg]) * step as f32 / 100.0;
                let v = curve.sample(t);
                assert!(v >= lo && v <= hi, "t={} v={} not in [{}, {}]", t, v, lo, hi);
            }
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let curve = alpha_curve();
        assert!((curve.sample(0.1) - 0.3).abs() < 1e-6);
        assert!((curve.sample(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_input_clamped() {
        let curve = alpha_curve();
        assert_eq!(curve.sample(-3.0), 0.0);
        assert_eq!(curve.sample(7.0), 0.1);
        assert_eq!(curve.sample(f32::NAN), 0.0);
    }
}

//! Rotating glow layers and the organic masks that shape them
//!
//! Shapes are described analytically so the CPU rasterizer and the GLSL
//! shaders evaluate exactly the same silhouettes.

pub mod blend;
pub mod glow;
pub mod blob;

pub use blend::BlendMode;
pub use glow::{GlowDraw, GlowGeometry, GlowLayer, LayerSpec, MASK_BLUR, MASK_CUT_OFFSET, MASK_CUT_SCALE};
pub use blob::{BlobMask, BlobPlacement, BlobShape, BLOB_HARMONICS};

use crate::math::smoothstep;

/// Coverage of a disc of `radius` softened by `blur`, at distance `dist`
/// from its center. A zero blur gives a hard edge.
pub fn soft_disc(dist: f32, radius: f32, blur: f32) -> f32 {
    if blur <= 0.0 {
        return if dist <= radius { 1.0 } else { 0.0 };
    }
    smoothstep(radius + blur, radius - blur, dist)
}

/// Combined softness of two stacked gaussian-like blurs
pub fn combine_blur(a: f32, b: f32) -> f32 {
    (a * a + b * b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_disc_edges() {
        assert_eq!(soft_disc(0.0, 0.5, 0.1), 1.0);
        assert_eq!(soft_disc(1.0, 0.5, 0.1), 0.0);
        assert!((soft_disc(0.5, 0.5, 0.1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hard_disc() {
        assert_eq!(soft_disc(0.49, 0.5, 0.0), 1.0);
        assert_eq!(soft_disc(0.51, 0.5, 0.0), 0.0);
    }

    #[test]
    fn test_combine_blur() {
        assert!((combine_blur(0.3, 0.4) - 0.5).abs() < 1e-6);
        assert_eq!(combine_blur(0.2, 0.0), 0.2);
    }
}

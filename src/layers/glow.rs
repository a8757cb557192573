//! Rotating radial glow layers
//!
//! A glow layer is a filled disc masked by two blurred circles: the disc
//! itself, minus a larger circle pushed downward (destination-out). What is
//! left is a soft crescent that the layer's own clock spins around the orb
//! center.

use crate::animation::{Direction, RotationClock};
use crate::math::{Rgba, Vec2};
use super::{combine_blur, soft_disc, BlendMode, BlobShape};

/// Diameter of the cutting circle relative to the layer diameter
pub const MASK_CUT_SCALE: f32 = 1.31;
/// Downward offset of the cutting circle relative to the layer diameter
pub const MASK_CUT_OFFSET: f32 = 0.31;
/// Blur applied to both mask circles relative to the layer diameter
pub const MASK_BLUR: f32 = 0.16;

/// Static color and motion of a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub color: Rgba,
    /// Degrees per second
    pub rotation_speed: f64,
    pub direction: Direction,
}

/// Placement and finishing of a layer, in orb-size fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowGeometry {
    pub diameter: f32,
    /// Extra blur applied to the whole layer after masking
    pub blur: f32,
    pub opacity: f32,
    /// Fixed rotation in degrees added on top of the clock angle
    pub base_rotation: f32,
    pub blend: BlendMode,
}

impl Default for GlowGeometry {
    fn default() -> Self {
        Self {
            diameter: 1.0,
            blur: 0.0,
            opacity: 1.0,
            base_rotation: 0.0,
            blend: BlendMode::Normal,
        }
    }
}

/// One rotating glow, owning its own clock
#[derive(Debug, Clone)]
pub struct GlowLayer {
    spec: LayerSpec,
    geometry: GlowGeometry,
    clock: RotationClock,
}

impl GlowLayer {
    pub fn new(spec: LayerSpec, geometry: GlowGeometry) -> Self {
        let clock = RotationClock::new(spec.rotation_speed, spec.direction);
        Self { spec, geometry, clock }
    }

    pub fn spec(&self) -> &LayerSpec {
        &self.spec
    }

    pub fn geometry(&self) -> &GlowGeometry {
        &self.geometry
    }

    pub fn clock(&self) -> &RotationClock {
        &self.clock
    }

    /// Clock angle in [0, 360), excluding the fixed base rotation
    pub fn angle(&self, t: f64) -> f64 {
        self.clock.angle(t)
    }

    pub fn set_running(&mut self, t: f64, running: bool) {
        self.clock.set_running(t, running);
    }

    pub fn draw(&self, t: f64) -> GlowDraw {
        GlowDraw {
            color: self.spec.color.with_opacity(self.geometry.opacity),
            diameter: self.geometry.diameter,
            blur: self.geometry.blur,
            rotation: (self.angle(t) as f32 + self.geometry.base_rotation) % 360.0,
            blend: self.geometry.blend,
            mask: None,
        }
    }
}

/// One frame of a glow layer, ready to rasterize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowDraw {
    /// Fill color with layer opacity folded into alpha
    pub color: Rgba,
    pub diameter: f32,
    pub blur: f32,
    /// Total rotation in degrees
    pub rotation: f32,
    pub blend: BlendMode,
    /// Optional organic mask, evaluated in unrotated orb space
    pub mask: Option<BlobShape>,
}

impl GlowDraw {
    pub fn with_mask(mut self, mask: BlobShape) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Silhouette coverage at an orb-space point, before color.
    ///
    /// The cutting circle is composited destination-out onto the kept disc.
    pub fn coverage(&self, point: Vec2) -> f32 {
        let local = point.rotate(-self.rotation);
        let d = self.diameter;

        let mask_blur = combine_blur(d * MASK_BLUR, self.blur);
        let keep = soft_disc(local.length(), d * 0.5, mask_blur);
        let cut_center = Vec2::new(0.0, d * MASK_CUT_OFFSET);
        let cut = soft_disc(local.distance(&cut_center), d * MASK_CUT_SCALE * 0.5, mask_blur);
        let fill = soft_disc(local.length(), d * 0.5, self.blur);

        let disc = fill * keep;
        let mut coverage = BlendMode::DestinationOut.apply([disc; 4], [cut; 4])[3];
        if let Some(mask) = &self.mask {
            coverage *= mask.coverage(point);
        }
        coverage
    }

    /// Premultiplied source color at an orb-space point
    pub fn shade(&self, point: Vec2) -> [f32; 4] {
        let coverage = self.coverage(point);
        let [r, g, b, a] = self.color.premultiplied();
        [r * coverage, g * coverage, b * coverage, a * coverage]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(direction: Direction) -> GlowLayer {
        GlowLayer::new(
            LayerSpec { color: Rgba::WHITE, rotation_speed: 45.0, direction },
            GlowGeometry::default(),
        )
    }

    #[test]
    fn test_layer_starts_stopped_at_zero() {
        let layer = layer(Direction::Clockwise);
        assert!(!layer.clock().is_running());
        assert_eq!(layer.angle(10.0), 0.0);
    }

    #[test]
    fn test_counter_clockwise_after_one_second() {
        let mut layer = layer(Direction::CounterClockwise);
        layer.set_running(0.0, true);
        assert!((layer.angle(1.0) - 315.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_adds_base_rotation_and_opacity() {
        let mut layer = GlowLayer::new(
            LayerSpec { color: Rgba::WHITE, rotation_speed: 90.0, direction: Direction::Clockwise },
            GlowGeometry { base_rotation: 180.0, opacity: 0.5, ..GlowGeometry::default() },
        );
        layer.set_running(0.0, true);
        let draw = layer.draw(1.0);
        assert!((draw.rotation - 270.0).abs() < 1e-4);
        assert_eq!(draw.color.a, 0.5);
    }

    #[test]
    fn test_crescent_is_carved_from_below() {
        let draw = layer(Direction::Clockwise).draw(0.0);

        // Upper rim survives, lower half is cut away by the offset circle
        let top = draw.coverage(Vec2::new(0.0, -0.4));
        let bottom = draw.coverage(Vec2::new(0.0, 0.4));
        assert!(top > 0.2, "top {}", top);
        assert!(bottom < 0.05, "bottom {}", bottom);

        // Nothing outside the disc
        assert_eq!(draw.coverage(Vec2::new(0.0, -0.9)), 0.0);
    }

    #[test]
    fn test_cut_matches_destination_out_layers() {
        let draw = layer(Direction::Clockwise).draw(0.0);
        let d = draw.diameter;
        let mask_blur = combine_blur(d * MASK_BLUR, draw.blur);

        for point in [Vec2::new(0.0, -0.4), Vec2::new(0.3, 0.1), Vec2::new(-0.2, 0.35), Vec2::ZERO] {
            // Kept disc drawn first, cutting circle composited over it
            let disc = soft_disc(point.length(), d * 0.5, draw.blur) * soft_disc(point.length(), d * 0.5, mask_blur);
            let cut_center = Vec2::new(0.0, d * MASK_CUT_OFFSET);
            let cut = soft_disc(point.distance(&cut_center), d * MASK_CUT_SCALE * 0.5, mask_blur);
            let layered = BlendMode::DestinationOut.apply([disc; 4], [cut; 4]);
            assert!((draw.coverage(point) - layered[3]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rotation_moves_the_crescent() {
        let mut draw = layer(Direction::Clockwise).draw(0.0);
        let before = draw.coverage(Vec2::new(0.0, -0.4));
        draw.rotation = 180.0;
        let after = draw.coverage(Vec2::new(0.0, 0.4));
        assert!((before - after).abs() < 1e-5);
    }

    #[test]
    fn test_mask_limits_coverage() {
        let draw = layer(Direction::Clockwise).draw(0.0).with_mask(BlobShape {
            center: Vec2::new(0.0, 0.5),
            radius: 0.1,
            rotation: 0.0,
            phase: 0.0,
            softness: 0.0,
        });
        assert_eq!(draw.coverage(Vec2::new(0.0, -0.4)), 0.0);
    }

    #[test]
    fn test_shade_is_premultiplied() {
        let draw = GlowLayer::new(
            LayerSpec { color: Rgba::new(1.0, 0.5, 0.0, 1.0), rotation_speed: 0.0, direction: Direction::Clockwise },
            GlowGeometry { opacity: 0.5, ..GlowGeometry::default() },
        )
        .draw(0.0);
        let p = Vec2::new(0.0, -0.4);
        let c = draw.coverage(p);
        let [r, g, b, a] = draw.shade(p);
        assert!((a - 0.5 * c).abs() < 1e-6);
        assert!((r - 0.5 * c).abs() < 1e-6);
        assert!((g - 0.25 * c).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }
}

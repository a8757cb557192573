//! CPU reference rasterizer
//!
//! Executes an [`OrbFrame`] with the same shape and blend math as the GLSL
//! pipeline, into a square premultiplied float buffer. Used for snapshots
//! and for pixel-level tests on targets without WebGL.

use crate::compositor::{DrawCommand, GradientDraw, OrbFrame, OutlineDraw, ShadowDraw};
use crate::layers::{soft_disc, BlendMode, GlowDraw};
use crate::math::Vec2;
use crate::particles::{ParticleDraw, ParticleSprite, SpriteTexture};

pub struct Rasterizer {
    size: usize,
    /// Premultiplied RGBA, row-major from the top-left
    buffer: Vec<[f32; 4]>,
}

impl Rasterizer {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self { size, buffer: vec![[0.0; 4]; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Orb-space center of pixel `(x, y)`
    fn point(&self, x: usize, y: usize) -> Vec2 {
        let s = self.size as f32;
        Vec2::new((x as f32 + 0.5) / s - 0.5, (y as f32 + 0.5) / s - 0.5)
    }

    /// Render `frame` and return straight-alpha RGBA8 pixels
    pub fn render(&mut self, frame: &OrbFrame) -> Vec<u8> {
        self.buffer.iter_mut().for_each(|px| *px = [0.0; 4]);

        for command in &frame.commands {
            match command {
                DrawCommand::Background(gradient) => self.draw_gradient(gradient),
                DrawCommand::Glow { draw, .. } => self.draw_glow(draw),
                DrawCommand::Particles(draw) => self.draw_particles(draw),
                DrawCommand::Outline(outline) => self.draw_outline(outline),
                DrawCommand::CircleMask { radius } => {
                    let radius = *radius;
                    self.composite(BlendMode::DestinationIn, |p| {
                        let keep = soft_disc(p.length(), radius, 0.0);
                        [keep; 4]
                    });
                }
                DrawCommand::Shadow(shadow) => self.draw_shadow(shadow),
            }
        }

        self.to_rgba8()
    }

    /// Blend a shaded layer over every pixel
    fn composite(&mut self, blend: BlendMode, shade: impl Fn(Vec2) -> [f32; 4]) {
        for y in 0..self.size {
            for x in 0..self.size {
                let src = shade(self.point(x, y));
                let px = &mut self.buffer[y * self.size + x];
                *px = blend.apply(*px, src);
            }
        }
    }

    fn draw_gradient(&mut self, gradient: &GradientDraw) {
        self.composite(BlendMode::Normal, |p| gradient.color_at(p).premultiplied());
    }

    fn draw_glow(&mut self, draw: &GlowDraw) {
        self.composite(draw.blend, |p| draw.shade(p));
    }

    fn draw_outline(&mut self, outline: &OutlineDraw) {
        for stroke in &outline.strokes {
            self.composite(stroke.blend, |p| {
                let coverage = stroke.coverage(p);
                let [r, g, b, a] = outline.color_at(p).premultiplied();
                [r * coverage, g * coverage, b * coverage, a * coverage]
            });
        }
    }

    fn draw_shadow(&mut self, shadow: &ShadowDraw) {
        for layer in &shadow.layers {
            self.composite(BlendMode::DestinationOver, |p| {
                let coverage = layer.coverage(p, shadow.orb_radius);
                let [r, g, b, a] = layer.color.premultiplied();
                [r * coverage, g * coverage, b * coverage, a * coverage]
            });
        }
    }

    /// Sprites are blended one at a time inside their bounding boxes
    fn draw_particles(&mut self, draw: &ParticleDraw) {
        let [r, g, b, a] = draw.color.premultiplied();
        let s = self.size as f32;

        for sprite in &draw.sprites {
            let extent = sprite.diameter * 0.5 + draw.blur;
            let lo_x = (((sprite.center.x - extent + 0.5) * s).floor().max(0.0)) as usize;
            let lo_y = (((sprite.center.y - extent + 0.5) * s).floor().max(0.0)) as usize;
            let hi_x = (((sprite.center.x + extent + 0.5) * s).ceil().max(0.0) as usize).min(self.size);
            let hi_y = (((sprite.center.y + extent + 0.5) * s).ceil().max(0.0) as usize).min(self.size);

            for y in lo_y..hi_y {
                for x in lo_x..hi_x {
                    let p = self.point(x, y);
                    let k = sprite.alpha * sprite_coverage(sprite, p, draw.blur, &draw.texture);
                    if k <= 0.0 {
                        continue;
                    }
                    let px = &mut self.buffer[y * self.size + x];
                    *px = draw.blend.apply(*px, [r * k, g * k, b * k, a * k]);
                }
            }
        }
    }

    fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffer.len() * 4);
        for [r, g, b, a] in &self.buffer {
            let a = a.clamp(0.0, 1.0);
            let unpremultiply = |c: f32| {
                if a > 0.0 {
                    ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8
                } else {
                    0
                }
            };
            out.extend_from_slice(&[unpremultiply(*r), unpremultiply(*g), unpremultiply(*b), (a * 255.0).round() as u8]);
        }
        out
    }
}

/// Sprite coverage at an orb-space point. Blurred sprites are drawn as a
/// soft disc; sharp ones sample the sprite texture.
fn sprite_coverage(sprite: &ParticleSprite, point: Vec2, blur: f32, texture: &SpriteTexture) -> f32 {
    let offset = point - sprite.center;
    if blur > 0.0 {
        return soft_disc(offset.length(), sprite.diameter * 0.5, blur);
    }
    if sprite.diameter <= 0.0 {
        return 0.0;
    }
    let u = offset.x / sprite.diameter + 0.5;
    let v = offset.y / sprite.diameter + 0.5;
    texture.sample_alpha(u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::OrbCompositor;
    use crate::config::OrbConfiguration;
    use crate::visual::{analyze_pixels, check_visual_criteria, generate_visual_report, VisualCriteria};

    const SIZE: usize = 64;

    fn render(config: OrbConfiguration, t: f64) -> Vec<u8> {
        let mut compositor = OrbCompositor::new(config.with_seed(3), 0.0).unwrap();
        let frame = compositor.frame(t);
        Rasterizer::new(SIZE).render(&frame)
    }

    fn alpha_at(pixels: &[u8], x: usize, y: usize) -> u8 {
        pixels[(y * SIZE + x) * 4 + 3]
    }

    #[test]
    fn test_output_layout() {
        let pixels = render(OrbConfiguration::default(), 1.0);
        assert_eq!(pixels.len(), SIZE * SIZE * 4);
    }

    #[test]
    fn test_circle_mask_clears_corners() {
        let pixels = render(OrbConfiguration::default(), 1.0);
        let metrics = analyze_pixels(&pixels, SIZE as u32, SIZE as u32);
        assert_eq!(metrics.corner_alpha, 0.0);
        assert!(metrics.coverage > 0.6 && metrics.coverage < 0.95, "coverage {}", metrics.coverage);
    }

    #[test]
    fn test_orb_center_is_opaque_and_lit() {
        let pixels = render(OrbConfiguration::default(), 1.0);
        assert_eq!(alpha_at(&pixels, SIZE / 2, SIZE / 2), 255);
        let metrics = analyze_pixels(&pixels, SIZE as u32, SIZE as u32);
        assert!(metrics.avg_brightness > 0.3, "brightness {}", metrics.avg_brightness);
    }

    #[test]
    fn test_default_orb_meets_criteria() {
        let pixels = render(OrbConfiguration::default(), 1.0);
        let metrics = analyze_pixels(&pixels, SIZE as u32, SIZE as u32);
        let failures = check_visual_criteria(&metrics, &VisualCriteria::default());
        assert!(failures.is_empty(), "{:?}\n{}", failures, generate_visual_report(&metrics));
    }

    #[test]
    fn test_particles_toggle_changes_pixels() {
        let base = OrbConfiguration::default().with_wavy_blobs(false).with_glow_effects(false);
        let with = render(base.clone(), 2.5);
        let without = render(base.with_particles(false), 2.5);

        let changed = with.chunks(4).zip(without.chunks(4)).filter(|(a, b)| a != b).count();
        assert!(changed > 0);
        assert!(changed < SIZE * SIZE / 2, "{} pixels changed", changed);
    }

    #[test]
    fn test_shadow_reaches_past_rim() {
        // On the diagonal, just outside the silhouette
        let (x, y) = (55, 55);

        let shadowed = render(OrbConfiguration::default(), 0.0);
        let plain = render(OrbConfiguration::default().with_shadow(false), 0.0);
        assert!(alpha_at(&shadowed, x, y) > 0);
        assert_eq!(alpha_at(&plain, x, y), 0);
    }

    #[test]
    fn test_paused_frames_identical() {
        let config = OrbConfiguration::default().with_animating(false).with_seed(3);
        let mut compositor = OrbCompositor::new(config, 0.0).unwrap();
        let mut raster = Rasterizer::new(SIZE);
        let a = raster.render(&compositor.frame(1.0));
        let b = raster.render(&compositor.frame(4.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_animation_moves_pixels() {
        let a = render(OrbConfiguration::default().with_particles(false), 0.0);
        let b = render(OrbConfiguration::default().with_particles(false), 0.5);
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_palette_renders_without_background() {
        let config = OrbConfiguration::default()
            .with_background_colors(Vec::new())
            .with_wavy_blobs(false)
            .with_glow_effects(false)
            .with_particles(false);
        let pixels = render(config, 0.0);
        let metrics = analyze_pixels(&pixels, SIZE as u32, SIZE as u32);
        assert_eq!(metrics.corner_alpha, 0.0);
        // Only the glow crescents and outline remain, so much of the disc is see-through
        let full = OrbConfiguration::default()
            .with_wavy_blobs(false)
            .with_glow_effects(false)
            .with_particles(false);
        let full = analyze_pixels(&render(full, 0.0), SIZE as u32, SIZE as u32);
        assert!(metrics.coverage < full.coverage);
    }

    #[test]
    fn test_sharp_sprite_uses_texture() {
        let sprite = ParticleSprite { center: Vec2::ZERO, diameter: 0.1, alpha: 1.0 };
        let texture = SpriteTexture::default();
        assert_eq!(sprite_coverage(&sprite, Vec2::ZERO, 0.0, &texture), 1.0);
        assert_eq!(sprite_coverage(&sprite, Vec2::new(0.049, 0.049), 0.0, &texture), 0.0);
        assert_eq!(sprite_coverage(&sprite, Vec2::new(0.2, 0.0), 0.0, &texture), 0.0);
    }

    #[test]
    fn test_blurred_sprite_is_soft() {
        let sprite = ParticleSprite { center: Vec2::ZERO, diameter: 0.1, alpha: 1.0 };
        let texture = SpriteTexture::default();
        let edge = sprite_coverage(&sprite, Vec2::new(0.05, 0.0), 0.01, &texture);
        assert!((edge - 0.5).abs() < 1e-5);
    }
}

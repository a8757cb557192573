//! Orb compositor
//!
//! Owns every animated element of one orb and turns the host clock into an
//! [`OrbFrame`]. All lengths are fractions of the orb's bounding square, so
//! the composition looks the same at any pixel size.

use std::rc::Rc;
use crate::animation::Direction;
use crate::config::OrbConfiguration;
use crate::error::Result;
use crate::layers::{BlendMode, BlobMask, BlobPlacement, GlowGeometry, GlowLayer, LayerSpec};
use crate::math::Rgba;
use crate::particles::{ParticleClassSpec, ParticleSystem, SCENE_EXTENT};
use super::frame::{
    DrawCommand, GradientDraw, LayerRole, OrbFrame, OutlineDraw, OutlineStroke, ShadowDraw,
    ShadowLayer,
};

/// One point of the reference scene, as a fraction of the orb size
const POINT: f32 = 1.0 / SCENE_EXTENT;

const OUTER_GLOW_INSET: f32 = 0.03;
const OUTER_GLOW_BLUR: f32 = 0.06;
const OUTER_RING_MAX_DIAMETER: f32 = 0.94;
const OUTER_RING_PADDING: f32 = 8.0 * POINT;
const OUTER_RING_BLUR: f32 = 0.032;
const CORE_INSET: f32 = 0.08;
const PRIMARY_CORE_BLUR: f32 = 0.08;
const SECONDARY_CORE_BLUR: f32 = 0.06;
const BLOB_BLUR: f32 = POINT;
const SHADOW_RADIUS: f32 = 0.08;

/// Speed multiplier and direction of each layer, relative to the base speed
fn layer_motion(role: LayerRole) -> (f64, Direction) {
    match role {
        LayerRole::OuterGlow => (0.75, Direction::CounterClockwise),
        LayerRole::OuterRing => (0.25, Direction::Clockwise),
        LayerRole::LowerBlob => (1.5, Direction::Clockwise),
        LayerRole::UpperBlob => (0.75, Direction::CounterClockwise),
        LayerRole::PrimaryCore => (3.0, Direction::Clockwise),
        LayerRole::SecondaryCore => (2.3, Direction::Clockwise),
    }
}

/// A glow layer shaped by a wavy blob
#[derive(Debug, Clone)]
struct BlobLayer {
    role: LayerRole,
    glow: GlowLayer,
    mask: BlobMask,
}

/// Builds and animates the full layer stack of one orb
#[derive(Debug)]
pub struct OrbCompositor {
    config: Rc<OrbConfiguration>,
    outer_glow: GlowLayer,
    outer_ring: GlowLayer,
    blobs: [BlobLayer; 2],
    cores: [GlowLayer; 2],
    /// Empty when particles are disabled
    particles: Vec<ParticleSystem>,
    animating: bool,
}

impl OrbCompositor {
    /// Build every layer from `config`. Clocks start at `now` (seconds)
    /// when the configuration asks for animation.
    pub fn new(config: impl Into<Rc<OrbConfiguration>>, now: f64) -> Result<Self> {
        // Fields are public, so values that skipped `from_yaml` are clamped here too
        let config = Rc::new(OrbConfiguration::clone(&config.into()).sanitized());
        let glow_color = config.glow_color;
        let speed = config.speed;
        let layer = |role: LayerRole, color: Rgba, geometry: GlowGeometry| {
            let (multiplier, direction) = layer_motion(role);
            GlowLayer::new(
                LayerSpec { color, rotation_speed: speed * multiplier, direction },
                geometry,
            )
        };

        let outer_glow = layer(
            LayerRole::OuterGlow,
            glow_color,
            GlowGeometry {
                diameter: 1.0 - 2.0 * OUTER_GLOW_INSET,
                blur: OUTER_GLOW_BLUR,
                base_rotation: 180.0,
                blend: BlendMode::DestinationOver,
                ..GlowGeometry::default()
            },
        );
        let outer_ring = layer(
            LayerRole::OuterRing,
            glow_color.with_opacity(0.5),
            GlowGeometry {
                diameter: OUTER_RING_MAX_DIAMETER.min(1.0 - 2.0 * OUTER_RING_PADDING),
                blur: OUTER_RING_BLUR,
                base_rotation: 180.0,
                ..GlowGeometry::default()
            },
        );

        let blob_geometry = |opacity: f32| GlowGeometry {
            blur: BLOB_BLUR,
            opacity,
            blend: BlendMode::PlusLighter,
            ..GlowGeometry::default()
        };
        let blobs = [
            BlobLayer {
                role: LayerRole::LowerBlob,
                glow: layer(LayerRole::LowerBlob, Rgba::WHITE.with_opacity(0.75), blob_geometry(1.0)),
                mask: BlobMask::new(
                    BlobMask::loop_duration_for(speed, 1.75),
                    BlobPlacement { width: 1.875, offset_y: 0.31, rotation: 0.0 },
                ),
            },
            BlobLayer {
                role: LayerRole::UpperBlob,
                glow: layer(LayerRole::UpperBlob, Rgba::WHITE, blob_geometry(0.5)),
                mask: BlobMask::new(
                    BlobMask::loop_duration_for(speed, 2.25),
                    BlobPlacement { width: 1.25, offset_y: -0.31, rotation: 90.0 },
                ),
            },
        ];

        let intensity = config.core_glow_intensity.clamp(0.0, 1.0) as f32;
        let core_geometry = |blur: f32, blend: BlendMode| GlowGeometry {
            diameter: 1.0 - 2.0 * CORE_INSET,
            blur,
            opacity: intensity,
            blend,
            ..GlowGeometry::default()
        };
        let cores = [
            layer(LayerRole::PrimaryCore, glow_color, core_geometry(PRIMARY_CORE_BLUR, BlendMode::Normal)),
            layer(
                LayerRole::SecondaryCore,
                glow_color,
                core_geometry(SECONDARY_CORE_BLUR, BlendMode::PlusLighter),
            ),
        ];

        let particles = if config.show_particles {
            let seed = config.seed.unwrap_or(0);
            let color = config.particle_color;
            vec![
                ParticleSystem::new(
                    ParticleClassSpec::new(color, (10.0, 20.0), (0.5, 1.0), (0.0, 0.3), 10)
                        .with_blur(POINT),
                    seed,
                )?,
                ParticleSystem::new(
                    ParticleClassSpec::new(color, (20.0, 30.0), (0.2, 1.0), (0.3, 0.8), 10),
                    seed.wrapping_add(1),
                )?,
            ]
        } else {
            Vec::new()
        };

        let mut compositor = Self {
            config,
            outer_glow,
            outer_ring,
            blobs,
            cores,
            particles,
            animating: false,
        };
        for system in &mut compositor.particles {
            system.set_running(now, false);
        }
        if compositor.config.is_animating {
            compositor.set_animating(now, true);
        }
        log::info!(
            "orb compositor ready: speed {}, {} particle systems, animating {}",
            compositor.config.speed,
            compositor.particles.len(),
            compositor.animating
        );
        Ok(compositor)
    }

    pub fn config(&self) -> &OrbConfiguration {
        &self.config
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Pause or resume every clock and emitter at once
    pub fn set_animating(&mut self, now: f64, animating: bool) {
        if animating == self.animating {
            return;
        }
        self.animating = animating;
        self.outer_glow.set_running(now, animating);
        self.outer_ring.set_running(now, animating);
        for blob in &mut self.blobs {
            blob.glow.set_running(now, animating);
            blob.mask.set_running(now, animating);
        }
        for core in &mut self.cores {
            core.set_running(now, animating);
        }
        for system in &mut self.particles {
            system.set_running(now, animating);
        }
        log::debug!("orb {} at t={:.3}", if animating { "animating" } else { "paused" }, now);
    }

    fn glow_layer(&self, role: LayerRole) -> &GlowLayer {
        match role {
            LayerRole::OuterGlow => &self.outer_glow,
            LayerRole::OuterRing => &self.outer_ring,
            LayerRole::LowerBlob => &self.blobs[0].glow,
            LayerRole::UpperBlob => &self.blobs[1].glow,
            LayerRole::PrimaryCore => &self.cores[0],
            LayerRole::SecondaryCore => &self.cores[1],
        }
    }

    /// Clock angle of one layer in [0, 360), before its fixed base rotation
    pub fn layer_angle(&self, role: LayerRole, now: f64) -> f64 {
        self.glow_layer(role).angle(now)
    }

    pub fn particle_systems(&self) -> &[ParticleSystem] {
        &self.particles
    }

    /// Advance the particle simulation and describe the orb at `now`
    pub fn frame(&mut self, now: f64) -> OrbFrame {
        for system in &mut self.particles {
            system.update(now);
        }

        let config = &self.config;
        let mut commands = Vec::new();

        if config.show_background {
            commands.push(DrawCommand::Background(GradientDraw {
                stops: config.background_colors.clone(),
            }));
        }

        commands.push(self.glow_command(LayerRole::OuterGlow, now));
        commands.push(self.glow_command(LayerRole::OuterRing, now));

        if config.show_wavy_blobs {
            for blob in &self.blobs {
                let mask = blob.mask.shape(now);
                commands.push(DrawCommand::Glow {
                    role: blob.role,
                    draw: blob.glow.draw(now).with_mask(mask),
                });
            }
        }

        if config.show_glow_effects {
            commands.push(self.glow_command(LayerRole::PrimaryCore, now));
            commands.push(self.glow_command(LayerRole::SecondaryCore, now));
        }

        for system in &self.particles {
            commands.push(DrawCommand::Particles(system.draw()));
        }

        commands.push(DrawCommand::Outline(OutlineDraw {
            strokes: vec![
                OutlineStroke {
                    radius: 0.5 - POINT,
                    width: 6.0 * POINT,
                    blur: 12.0 * POINT,
                    blend: BlendMode::Normal,
                },
                OutlineStroke {
                    radius: 0.5 - POINT,
                    width: 4.0 * POINT,
                    blur: 8.0 * POINT,
                    blend: BlendMode::PlusLighter,
                },
            ],
            bottom: Rgba::WHITE,
            top: Rgba::CLEAR,
        }));

        commands.push(DrawCommand::CircleMask { radius: 0.5 });
        commands.push(DrawCommand::Shadow(self.shadow()));

        OrbFrame { time: now, commands }
    }

    fn glow_command(&self, role: LayerRole, now: f64) -> DrawCommand {
        DrawCommand::Glow { role, draw: self.glow_layer(role).draw(now) }
    }

    /// One shadow per palette color: tight and strong first, wide and faint last
    fn shadow(&self) -> ShadowDraw {
        let palette: &[Rgba] = if self.config.show_shadow {
            &self.config.background_colors
        } else {
            &[Rgba::CLEAR]
        };
        let n = palette.len() as f32;
        let layers = palette
            .iter()
            .enumerate()
            .map(|(i, color)| {
                let i = i as f32;
                ShadowLayer {
                    color: color.with_opacity(1.0 - i / n),
                    radius: SHADOW_RADIUS * (i + 1.0) / n,
                }
            })
            .collect();
        ShadowDraw { orb_radius: 0.5, layers }
    }
}

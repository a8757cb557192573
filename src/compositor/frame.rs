//! Render-ready description of one orb frame
//!
//! A frame is an ordered list of draw commands, back to front. Both the
//! WebGL pipeline and the CPU rasterizer consume the same list.

use crate::layers::{soft_disc, BlendMode, GlowDraw};
use crate::math::{Rgba, Vec2};
use crate::particles::ParticleDraw;

/// Identifies one of the rotating glow layers of an orb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    OuterGlow,
    OuterRing,
    LowerBlob,
    UpperBlob,
    PrimaryCore,
    SecondaryCore,
}

impl LayerRole {
    pub const ALL: [LayerRole; 6] = [
        LayerRole::OuterGlow,
        LayerRole::OuterRing,
        LayerRole::LowerBlob,
        LayerRole::UpperBlob,
        LayerRole::PrimaryCore,
        LayerRole::SecondaryCore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayerRole::OuterGlow => "outer_glow",
            LayerRole::OuterRing => "outer_ring",
            LayerRole::LowerBlob => "lower_blob",
            LayerRole::UpperBlob => "upper_blob",
            LayerRole::PrimaryCore => "primary_core",
            LayerRole::SecondaryCore => "secondary_core",
        }
    }
}

/// Evenly spaced vertical gradient, first stop at the bottom edge
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDraw {
    pub stops: Vec<Rgba>,
}

impl GradientDraw {
    /// Straight-alpha color at an orb-space point; clear with no stops
    pub fn color_at(&self, point: Vec2) -> Rgba {
        match self.stops.len() {
            0 => Rgba::CLEAR,
            1 => self.stops[0],
            n => {
                // Bottom edge is y = +0.5
                let t = (0.5 - point.y).clamp(0.0, 1.0) * (n - 1) as f32;
                let i = (t.floor() as usize).min(n - 2);
                self.stops[i].lerp(&self.stops[i + 1], t - i as f32)
            }
        }
    }
}

/// One blurred circular stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStroke {
    pub radius: f32,
    pub width: f32,
    pub blur: f32,
    pub blend: BlendMode,
}

impl OutlineStroke {
    pub fn coverage(&self, point: Vec2) -> f32 {
        let from_ring = (point.length() - self.radius).abs();
        soft_disc(from_ring, self.width * 0.5, self.blur)
    }
}

/// Depth outline: concentric strokes sharing a bottom-to-top gradient
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineDraw {
    pub strokes: Vec<OutlineStroke>,
    pub bottom: Rgba,
    pub top: Rgba,
}

impl OutlineDraw {
    pub fn color_at(&self, point: Vec2) -> Rgba {
        let t = (0.5 - point.y).clamp(0.0, 1.0);
        self.bottom.lerp(&self.top, t)
    }
}

/// A single soft shadow ring around the orb silhouette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowLayer {
    pub color: Rgba,
    pub radius: f32,
}

/// Layered shadow drawn behind the masked orb
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowDraw {
    /// Silhouette radius the shadows spread from
    pub orb_radius: f32,
    /// Tightest and brightest first
    pub layers: Vec<ShadowLayer>,
}

impl ShadowLayer {
    pub fn coverage(&self, point: Vec2, orb_radius: f32) -> f32 {
        soft_disc(point.length(), orb_radius, self.radius)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(GradientDraw),
    Glow { role: LayerRole, draw: GlowDraw },
    Particles(ParticleDraw),
    Outline(OutlineDraw),
    /// Keep only what lies inside a disc of this radius
    CircleMask { radius: f32 },
    Shadow(ShadowDraw),
}

impl DrawCommand {
    pub fn blend(&self) -> BlendMode {
        match self {
            DrawCommand::Background(_) | DrawCommand::Outline(_) => BlendMode::Normal,
            DrawCommand::Glow { draw, .. } => draw.blend,
            DrawCommand::Particles(draw) => draw.blend,
            DrawCommand::CircleMask { .. } => BlendMode::DestinationIn,
            DrawCommand::Shadow(_) => BlendMode::DestinationOver,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Background(_) => "background",
            DrawCommand::Glow { role, .. } => role.name(),
            DrawCommand::Particles(_) => "particles",
            DrawCommand::Outline(_) => "outline",
            DrawCommand::CircleMask { .. } => "circle_mask",
            DrawCommand::Shadow(_) => "shadow",
        }
    }
}

/// Everything needed to draw the orb at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct OrbFrame {
    /// Seconds, on the host clock
    pub time: f64,
    pub commands: Vec<DrawCommand>,
}

impl OrbFrame {
    pub fn glow(&self, role: LayerRole) -> Option<&GlowDraw> {
        self.commands.iter().find_map(|command| match command {
            DrawCommand::Glow { role: r, draw } if *r == role => Some(draw),
            _ => None,
        })
    }

    /// Particle draw commands in this frame
    pub fn particle_draws(&self) -> impl Iterator<Item = &ParticleDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Particles(draw) => Some(draw),
            _ => None,
        })
    }

    /// Total particle sprites across all particle commands
    pub fn particle_count(&self) -> usize {
        self.particle_draws().map(|draw| draw.sprites.len()).sum()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.commands.iter().map(DrawCommand::kind).collect()
    }
}

//! Orb layer stack and the per-frame draw list it produces

pub mod frame;
pub mod orb;

pub use frame::{
    DrawCommand, GradientDraw, LayerRole, OrbFrame, OutlineDraw, OutlineStroke, ShadowDraw,
    ShadowLayer,
};
pub use orb::OrbCompositor;

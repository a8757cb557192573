//! Ambient particle emitters drawn over the orb core

pub mod sprite;
pub mod system;

pub use sprite::{SpriteTexture, SPRITE_PIXELS};
pub use system::{
    Particle, ParticleClassSpec, ParticleDraw, ParticleSprite, ParticleSystem, Slot, SCENE_EXTENT,
};

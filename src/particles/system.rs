//! Continuous particle emitter
//!
//! Particles rise from anywhere inside a square emitter scene, fade in,
//! linger and fade out along keyframed alpha and scale tracks. The emitter
//! runs on its own simulated clock: wall-clock gaps advance it, pauses do
//! not, and births are placed at their exact moment inside each frame
//! interval, so the stream looks the same at any frame rate.

use std::rc::Rc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use crate::animation::{KeyframeCurve, KeyframeTimes};
use crate::error::Result;
use crate::layers::BlendMode;
use crate::math::{Rgba, Vec2};
use super::sprite::{SpriteTexture, SPRITE_PIXELS};

/// Edge length of the emitter scene in scene units
pub const SCENE_EXTENT: f32 = 300.0;

const BASE_LIFETIME: f64 = 2.0;
const LIFETIME_RANGE: f64 = 1.0;
/// Straight up, in degrees counter-clockwise from +x with y up
const EMISSION_ANGLE: f32 = 90.0;
const EMISSION_ANGLE_RANGE: f32 = 30.0;
/// Upward drift in scene units per second squared
const Y_ACCELERATION: f32 = 20.0;

const ALPHA_TIMES: [f32; 4] = [0.0, 0.2, 0.8, 1.0];
const SCALE_TIMES: [f32; 4] = [0.0, 0.4, 0.7, 1.0];

/// Static description of one class of particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleClassSpec {
    pub color: Rgba,
    /// Scene units per second
    pub speed_range: (f32, f32),
    /// Sprite scale factors
    pub size_range: (f32, f32),
    pub opacity_range: (f32, f32),
    pub count: usize,
    /// Softening applied when drawn, in orb-size fractions
    pub blur: f32,
}

impl ParticleClassSpec {
    pub fn new(
        color: Rgba,
        speed_range: (f32, f32),
        size_range: (f32, f32),
        opacity_range: (f32, f32),
        count: usize,
    ) -> Self {
        let opacity = ordered(opacity_range);
        Self {
            color,
            speed_range: ordered(speed_range),
            size_range: ordered(size_range),
            opacity_range: (opacity.0.clamp(0.0, 1.0), opacity.1.clamp(0.0, 1.0)),
            count,
            blur: 0.0,
        }
    }

    pub fn with_blur(mut self, blur: f32) -> Self {
        self.blur = blur.max(0.0);
        self
    }

    /// Births per simulated second
    pub fn birth_rate(&self) -> f64 {
        self.count as f64 / 2.0
    }
}

fn ordered((a, b): (f32, f32)) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn uniform(rng: &mut SmallRng, (lo, hi): (f32, f32)) -> f32 {
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// A single live particle. Every random attribute is drawn once at birth.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    birth_time: f64,
    lifetime: f64,
    /// Spawn point in scene units, origin at the emitter center, y up
    position: Vec2,
    /// Degrees counter-clockwise from +x
    velocity_angle: f32,
    base_speed: f32,
    base_size: f32,
    alpha: KeyframeCurve<4>,
    scale: KeyframeCurve<4>,
}

impl Particle {
    pub fn birth_time(&self) -> f64 {
        self.birth_time
    }

    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn velocity_angle(&self) -> f32 {
        self.velocity_angle
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn alpha_track(&self) -> &KeyframeCurve<4> {
        &self.alpha
    }

    pub fn scale_track(&self) -> &KeyframeCurve<4> {
        &self.scale
    }

    pub fn age(&self, now: f64) -> f64 {
        now - self.birth_time
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.lifetime
    }

    /// Fraction of the lifetime elapsed, in [0, 1]
    pub fn progress(&self, now: f64) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age(now) / self.lifetime).clamp(0.0, 1.0) as f32
    }

    /// Scene-space position under constant velocity plus upward drift
    pub fn position_at(&self, now: f64) -> Vec2 {
        let age = self.age(now).max(0.0) as f32;
        let (sin, cos) = self.velocity_angle.to_radians().sin_cos();
        Vec2::new(
            self.position.x + cos * self.base_speed * age,
            self.position.y + sin * self.base_speed * age + 0.5 * Y_ACCELERATION * age * age,
        )
    }

    pub fn alpha_at(&self, now: f64) -> f32 {
        self.alpha.sample(self.progress(now))
    }

    pub fn scale_at(&self, now: f64) -> f32 {
        self.scale.sample(self.progress(now))
    }
}

/// Emitter slot lifecycle. An expired particle is replaced in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Unborn,
    Alive(Particle),
}

/// Renderable state of one particle, in orb-size fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    /// Orb-space center, y down
    pub center: Vec2,
    pub diameter: f32,
    pub alpha: f32,
}

/// One frame of a particle system
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDraw {
    pub color: Rgba,
    pub blur: f32,
    pub blend: BlendMode,
    pub sprites: Vec<ParticleSprite>,
    pub texture: Rc<SpriteTexture>,
}

/// A closed population of particles continuously topped up at `count / 2`
/// births per second
#[derive(Debug)]
pub struct ParticleSystem {
    spec: ParticleClassSpec,
    slots: Vec<Slot>,
    rng: SmallRng,
    alpha_times: KeyframeTimes<4>,
    scale_times: KeyframeTimes<4>,
    texture: Rc<SpriteTexture>,
    /// Simulated seconds; only advances while running
    sim_time: f64,
    last_wall_time: Option<f64>,
    /// Fractional births owed to the next frame
    emit_accumulator: f64,
    running: bool,
    births: u64,
}

impl ParticleSystem {
    /// A running, empty emitter. The sprite texture is built here and
    /// shared by every frame afterwards.
    pub fn new(spec: ParticleClassSpec, seed: u64) -> Result<Self> {
        Ok(Self {
            spec,
            slots: Vec::with_capacity(Self::slot_budget(&spec)),
            rng: SmallRng::seed_from_u64(seed),
            alpha_times: KeyframeTimes::new(ALPHA_TIMES)?,
            scale_times: KeyframeTimes::new(SCALE_TIMES)?,
            texture: Rc::new(SpriteTexture::disc(SPRITE_PIXELS)),
            sim_time: 0.0,
            last_wall_time: None,
            emit_accumulator: 0.0,
            running: true,
            births: 0,
        })
    }

    /// Upper bound on simultaneously live particles
    fn slot_budget(spec: &ParticleClassSpec) -> usize {
        (spec.birth_rate() * (BASE_LIFETIME + LIFETIME_RANGE)).ceil() as usize + 1
    }

    pub fn spec(&self) -> &ParticleClassSpec {
        &self.spec
    }

    pub fn texture(&self) -> &Rc<SpriteTexture> {
        &self.texture
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Total particles born since construction
    pub fn births(&self) -> u64 {
        self.births
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Alive(p) => Some(p),
            Slot::Unborn => None,
        })
    }

    pub fn population(&self) -> usize {
        self.particles().count()
    }

    /// Pause or resume emission and aging. Paused time is skipped entirely.
    pub fn set_running(&mut self, now: f64, running: bool) {
        if running == self.running {
            return;
        }
        self.update(now);
        self.running = running;
        self.last_wall_time = Some(now);
        log::debug!("particle system {} at t={:.3}", if running { "resumed" } else { "paused" }, now);
    }

    /// Advance the simulation to wall-clock time `now` (seconds)
    pub fn update(&mut self, now: f64) {
        let elapsed = match self.last_wall_time {
            Some(previous) => (now - previous).max(0.0),
            None => 0.0,
        };
        self.last_wall_time = Some(now);
        if !self.running || elapsed <= 0.0 {
            return;
        }

        // Nothing older than one maximum lifetime can still be on screen
        let elapsed = elapsed.min(BASE_LIFETIME + LIFETIME_RANGE);
        self.sim_time += elapsed;
        let now = self.sim_time;

        for slot in &mut self.slots {
            if matches!(slot, Slot::Alive(p) if p.is_expired(now)) {
                *slot = Slot::Unborn;
            }
        }

        let rate = self.spec.birth_rate();
        if rate <= 0.0 {
            return;
        }
        self.emit_accumulator += elapsed * rate;
        while self.emit_accumulator >= 1.0 {
            self.emit_accumulator -= 1.0;
            let birth_time = now - self.emit_accumulator / rate;
            let particle = self.spawn(birth_time);
            if !particle.is_expired(now) {
                self.place(particle);
            }
        }
    }

    fn place(&mut self, particle: Particle) {
        match self.slots.iter_mut().find(|slot| matches!(slot, Slot::Unborn)) {
            Some(slot) => *slot = Slot::Alive(particle),
            None => self.slots.push(Slot::Alive(particle)),
        }
    }

    fn spawn(&mut self, birth_time: f64) -> Particle {
        let spec = self.spec;
        let rng = &mut self.rng;
        self.births += 1;

        let lifetime = BASE_LIFETIME + rng.gen_range(-LIFETIME_RANGE..=LIFETIME_RANGE);
        let half = SCENE_EXTENT * 0.5;
        let position = Vec2::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half));
        let velocity_angle = EMISSION_ANGLE
            + rng.gen_range(-EMISSION_ANGLE_RANGE..=EMISSION_ANGLE_RANGE);
        let base_speed = uniform(rng, spec.speed_range);
        let base_size = uniform(rng, spec.size_range);

        let alpha_values = [
            0.0,
            uniform(rng, spec.opacity_range),
            uniform(rng, spec.opacity_range),
            uniform(rng, spec.opacity_range),
        ];
        let (size_min, size_max) = spec.size_range;
        let scale_values = [size_min * 0.7, size_max * 0.9, size_max, size_min * 0.8];

        Particle {
            birth_time,
            lifetime,
            position,
            velocity_angle,
            base_speed,
            base_size,
            alpha: KeyframeCurve::new(self.alpha_times, alpha_values),
            scale: KeyframeCurve::new(self.scale_times, scale_values),
        }
    }

    /// Live particles mapped into orb space
    pub fn sprites(&self) -> Vec<ParticleSprite> {
        let now = self.sim_time;
        self.particles()
            .map(|p| {
                let scene = p.position_at(now);
                ParticleSprite {
                    center: Vec2::new(scene.x / SCENE_EXTENT, -scene.y / SCENE_EXTENT),
                    diameter: p.scale_at(now) * SPRITE_PIXELS as f32 / SCENE_EXTENT,
                    alpha: p.alpha_at(now),
                }
            })
            .collect()
    }

    pub fn draw(&self) -> ParticleDraw {
        ParticleDraw {
            color: self.spec.color,
            blur: self.spec.blur,
            blend: BlendMode::PlusLighter,
            sprites: self.sprites(),
            texture: Rc::clone(&self.texture),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(count: usize) -> ParticleClassSpec {
        ParticleClassSpec::new(Rgba::WHITE, (20.0, 30.0), (0.2, 1.0), (0.3, 0.8), count)
    }

    /// Step at a fixed frame rate and return the mean population after warm-up
    fn mean_population(system: &mut ParticleSystem, fps: f64, warmup: f64, duration: f64) -> f64 {
        let dt = 1.0 / fps;
        let mut t = 0.0;
        let mut total = 0usize;
        let mut samples = 0usize;
        system.update(t);
        while t < warmup + duration {
            t += dt;
            system.update(t);
            if t > warmup {
                total += system.population();
                samples += 1;
            }
        }
        total as f64 / samples as f64
    }

    #[test]
    fn test_starts_empty() {
        let system = ParticleSystem::new(spec(10), 1).unwrap();
        assert_eq!(system.population(), 0);
        assert!(system.sprites().is_empty());
    }

    #[test]
    fn test_class_ranges_normalized() {
        let s = ParticleClassSpec::new(Rgba::WHITE, (30.0, 20.0), (1.0, 0.2), (1.5, -0.5), 4);
        assert_eq!(s.speed_range, (20.0, 30.0));
        assert_eq!(s.size_range, (0.2, 1.0));
        assert_eq!(s.opacity_range, (0.0, 1.0));
        assert_eq!(s.birth_rate(), 2.0);
    }

    #[test]
    fn test_steady_state_population_near_count() {
        for count in [1usize, 4, 10, 40] {
            let mut system = ParticleSystem::new(spec(count), 42 + count as u64).unwrap();
            let mean = mean_population(&mut system, 60.0, 4.0, 200.0);
            let expected = count as f64;
            assert!(
                (mean - expected).abs() <= 0.2 * expected + 0.3,
                "count {} gave mean population {}",
                count,
                mean
            );
        }
    }

    #[test]
    fn test_population_independent_of_frame_rate() {
        let mut fast = ParticleSystem::new(spec(20), 9).unwrap();
        let mut slow = ParticleSystem::new(spec(20), 9).unwrap();
        let fast_mean = mean_population(&mut fast, 120.0, 4.0, 100.0);
        let slow_mean = mean_population(&mut slow, 12.0, 4.0, 100.0);
        assert!((fast_mean - slow_mean).abs() < 3.0, "{} vs {}", fast_mean, slow_mean);
        assert!((fast.births() as i64 - slow.births() as i64).abs() <= 2);
    }

    #[test]
    fn test_age_never_exceeds_lifetime() {
        let mut system = ParticleSystem::new(spec(30), 3).unwrap();
        let mut t = 0.0;
        system.update(t);
        for step in 0..2000 {
            // Irregular frame pacing
            t += if step % 7 == 0 { 0.11 } else { 0.013 };
            system.update(t);
            let now = system.sim_time();
            for p in system.particles() {
                assert!(p.age(now) <= p.lifetime() + 1e-9);
                assert!(p.age(now) >= -1e-9);
            }
        }
    }

    #[test]
    fn test_slots_bounded() {
        let mut system = ParticleSystem::new(spec(10), 5).unwrap();
        let mut t = 0.0;
        system.update(t);
        for _ in 0..5000 {
            t += 1.0 / 30.0;
            system.update(t);
        }
        assert!(system.slots().len() <= ParticleSystem::slot_budget(system.spec()));
    }

    #[test]
    fn test_attributes_within_ranges() {
        let mut system = ParticleSystem::new(spec(40), 11).unwrap();
        let mut t = 0.0;
        system.update(t);
        for _ in 0..180 {
            t += 1.0 / 60.0;
            system.update(t);
        }
        assert!(system.population() > 0);
        for p in system.particles() {
            assert!((1.0..=3.0).contains(&p.lifetime()));
            assert!((20.0..=30.0).contains(&p.base_speed()));
            assert!((0.2..=1.0).contains(&p.base_size()));
            assert!((60.0..=120.0).contains(&p.velocity_angle()));

            let alpha = p.alpha_track().values();
            assert_eq!(alpha[0], 0.0);
            for v in &alpha[1..] {
                assert!((0.3..=0.8).contains(v));
            }
            let scale = p.scale_track().values();
            assert!((scale[0] - 0.14).abs() < 1e-6);
            assert!((scale[1] - 0.9).abs() < 1e-6);
            assert_eq!(scale[2], 1.0);
            assert!((scale[3] - 0.16).abs() < 1e-6);
        }
    }

    #[test]
    fn test_alpha_fixed_for_particle_lifetime() {
        let mut system = ParticleSystem::new(spec(10), 21).unwrap();
        system.update(0.0);
        system.update(0.5);
        let tracked = system.particles().next().unwrap().clone();

        system.update(0.6);
        let same = system
            .particles()
            .find(|p| p.birth_time() == tracked.birth_time())
            .unwrap();
        assert_eq!(same.alpha_track(), tracked.alpha_track());
        assert_eq!(same.alpha_at(tracked.birth_time()), 0.0);
    }

    #[test]
    fn test_replacements_are_freshly_sampled() {
        let mut system = ParticleSystem::new(spec(6), 77).unwrap();
        let mut t = 0.0;
        system.update(t);

        let mut occupants: Vec<Particle> = Vec::new();
        for _ in 0..3000 {
            t += 1.0 / 60.0;
            system.update(t);
            if let Some(Slot::Alive(p)) = system.slots().first() {
                if occupants.last().map(|last| last.birth_time()) != Some(p.birth_time()) {
                    occupants.push(p.clone());
                }
            }
        }

        assert!(occupants.len() > 5);
        for pair in occupants.windows(2) {
            assert_ne!(pair[0].base_speed(), pair[1].base_speed());
            assert_ne!(pair[0].lifetime(), pair[1].lifetime());
            assert_ne!(pair[0].alpha_track(), pair[1].alpha_track());
        }
    }

    #[test]
    fn test_particles_rise() {
        let mut system = ParticleSystem::new(spec(10), 8).unwrap();
        system.update(0.0);
        system.update(0.3);
        let p = system.particles().next().unwrap().clone();
        let start = p.position_at(p.birth_time());
        let later = p.position_at(p.birth_time() + 1.0);
        assert!(later.y > start.y);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut system = ParticleSystem::new(spec(10), 4).unwrap();
        system.update(0.0);
        system.update(1.0);
        system.set_running(1.0, false);

        let frozen_time = system.sim_time();
        let frozen = system.sprites();
        system.update(3.0);
        assert_eq!(system.sim_time(), frozen_time);
        assert_eq!(system.sprites(), frozen);

        system.set_running(3.0, true);
        system.update(3.5);
        assert!((system.sim_time() - (frozen_time + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_backwards_time_is_ignored() {
        let mut system = ParticleSystem::new(spec(10), 4).unwrap();
        system.update(5.0);
        system.update(6.0);
        let sim = system.sim_time();
        system.update(4.0);
        assert_eq!(system.sim_time(), sim);
    }

    #[test]
    fn test_long_gap_is_capped() {
        let mut system = ParticleSystem::new(spec(10), 4).unwrap();
        system.update(0.0);
        system.update(10_000.0);
        assert!((system.sim_time() - 3.0).abs() < 1e-9);
        assert!(system.population() <= ParticleSystem::slot_budget(system.spec()));
    }

    #[test]
    fn test_zero_count_emits_nothing() {
        let mut system = ParticleSystem::new(spec(0), 4).unwrap();
        system.update(0.0);
        system.update(10.0);
        assert_eq!(system.population(), 0);
    }

    #[test]
    fn test_draw_is_additive_and_shares_texture() {
        let mut system = ParticleSystem::new(spec(10).with_blur(0.01), 4).unwrap();
        system.update(0.0);
        system.update(1.0);
        let draw = system.draw();
        assert_eq!(draw.blend, BlendMode::PlusLighter);
        assert_eq!(draw.blur, 0.01);
        assert_eq!(draw.sprites.len(), system.population());
        assert!(Rc::ptr_eq(&draw.texture, system.texture()));
    }
}

use serde::Deserialize;
use crate::error::Result;
use crate::math::Rgba;

/// Base angular rate (degrees per second) of the slowest layer
pub const DEFAULT_SPEED: f64 = 60.0;

/// Static parameters for one orb.
///
/// Every field is optional in YAML; missing fields take the defaults of
/// [`OrbConfiguration::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrbConfiguration {
    /// Bottom-to-top background gradient, also the shadow palette
    #[serde(alias = "background_colors")]
    pub background_colors: Vec<Rgba>,
    #[serde(alias = "glow_color")]
    pub glow_color: Rgba,
    #[serde(alias = "particle_color")]
    pub particle_color: Rgba,
    /// Opacity of the two core glows, in [0, 1]
    #[serde(alias = "core_glow_intensity")]
    pub core_glow_intensity: f64,
    #[serde(alias = "show_background")]
    pub show_background: bool,
    #[serde(alias = "show_wavy_blobs")]
    pub show_wavy_blobs: bool,
    #[serde(alias = "show_particles")]
    pub show_particles: bool,
    #[serde(alias = "show_glow_effects")]
    pub show_glow_effects: bool,
    #[serde(alias = "show_shadow")]
    pub show_shadow: bool,
    /// Whether rotation and particles run from the moment the orb mounts
    #[serde(alias = "is_animating")]
    pub is_animating: bool,
    pub speed: f64,
    /// Seed for the particle streams; random per mount when absent
    pub seed: Option<u64>,
}

impl Default for OrbConfiguration {
    fn default() -> Self {
        Self {
            background_colors: vec![Rgba::GREEN, Rgba::BLUE, Rgba::PINK],
            glow_color: Rgba::WHITE,
            particle_color: Rgba::WHITE,
            core_glow_intensity: 1.0,
            show_background: true,
            show_wavy_blobs: true,
            show_particles: true,
            show_glow_effects: true,
            show_shadow: true,
            is_animating: true,
            speed: DEFAULT_SPEED,
            seed: None,
        }
    }
}

impl OrbConfiguration {
    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: OrbConfiguration = serde_yaml::from_str(yaml)?;
        Ok(config.sanitized())
    }

    /// Clamp or replace values that cannot be animated as given
    pub fn sanitized(mut self) -> Self {
        if !self.speed.is_finite() {
            log::warn!("speed {} is not finite, using {}", self.speed, DEFAULT_SPEED);
            self.speed = DEFAULT_SPEED;
        } else if self.speed < 0.0 {
            log::warn!("negative speed {} clamped to 0", self.speed);
            self.speed = 0.0;
        }

        let intensity = if self.core_glow_intensity.is_nan() {
            1.0
        } else {
            self.core_glow_intensity.clamp(0.0, 1.0)
        };
        if intensity != self.core_glow_intensity {
            log::warn!(
                "core glow intensity {} clamped to {}",
                self.core_glow_intensity,
                intensity
            );
            self.core_glow_intensity = intensity;
        }

        if self.background_colors.is_empty() {
            log::warn!("no background colors; background and shadow render transparent");
        }
        self
    }

    pub fn with_background_colors(mut self, colors: Vec<Rgba>) -> Self {
        self.background_colors = colors;
        self
    }

    pub fn with_glow_color(mut self, color: Rgba) -> Self {
        self.glow_color = color;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self.sanitized()
    }

    pub fn with_core_glow_intensity(mut self, intensity: f64) -> Self {
        self.core_glow_intensity = intensity;
        self.sanitized()
    }

    pub fn with_particles(mut self, show: bool) -> Self {
        self.show_particles = show;
        self
    }

    pub fn with_shadow(mut self, show: bool) -> Self {
        self.show_shadow = show;
        self
    }

    pub fn with_background(mut self, show: bool) -> Self {
        self.show_background = show;
        self
    }

    pub fn with_wavy_blobs(mut self, show: bool) -> Self {
        self.show_wavy_blobs = show;
        self
    }

    pub fn with_glow_effects(mut self, show: bool) -> Self {
        self.show_glow_effects = show;
        self
    }

    pub fn with_animating(mut self, animating: bool) -> Self {
        self.is_animating = animating;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

use serde::Deserialize;
use crate::error::OrbError;

/// Straight-alpha RGBA color with normalized float channels.
///
/// This is the single color type used from configuration down to the
/// rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "ColorValue")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const CLEAR: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(52.0 / 255.0, 199.0 / 255.0, 89.0 / 255.0, 1.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 122.0 / 255.0, 1.0, 1.0);
    pub const PINK: Rgba = Rgba::new(1.0, 45.0 / 255.0, 85.0 / 255.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Same color with its alpha multiplied by `opacity`
    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..*self
        }
    }

    pub fn premultiplied(&self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Resolve a named color or `#RRGGBB` / `#RRGGBBAA` hex string
    pub fn parse(value: &str) -> Result<Self, OrbError> {
        let trimmed = value.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| OrbError::InvalidColor(value.to_string()));
        }

        let named = match trimmed.to_ascii_lowercase().as_str() {
            "clear" | "transparent" => Rgba::CLEAR,
            "white" => Rgba::WHITE,
            "black" => Rgba::BLACK,
            "green" => Rgba::GREEN,
            "blue" => Rgba::BLUE,
            "pink" => Rgba::PINK,
            "red" => Rgba::rgb8(255, 59, 48),
            "orange" => Rgba::rgb8(255, 149, 0),
            "yellow" => Rgba::rgb8(255, 204, 0),
            "purple" => Rgba::rgb8(175, 82, 222),
            "cyan" => Rgba::rgb8(50, 173, 230),
            "mint" => Rgba::rgb8(0, 199, 190),
            "indigo" => Rgba::rgb8(88, 86, 214),
            "teal" => Rgba::rgb8(48, 176, 199),
            "gray" | "grey" => Rgba::rgb8(142, 142, 147),
            _ => return Err(OrbError::InvalidColor(value.to_string())),
        };
        Ok(named)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba::new(
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
        alpha as f32 / 255.0,
    ))
}

/// Accepted spellings of a color in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Text(String),
    Components(Vec<f32>),
}

impl TryFrom<ColorValue> for Rgba {
    type Error = OrbError;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Text(text) => Rgba::parse(&text),
            ColorValue::Components(c) => {
                let unit = |v: f32| v.clamp(0.0, 1.0);
                match c.as_slice() {
                    [r, g, b] => Ok(Rgba::new(unit(*r), unit(*g), unit(*b), 1.0)),
                    [r, g, b, a] => Ok(Rgba::new(unit(*r), unit(*g), unit(*b), unit(*a))),
                    _ => Err(OrbError::InvalidColor(format!("{:?}", c))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse("white").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::parse("  Clear ").unwrap(), Rgba::CLEAR);
        assert!(Rgba::parse("not-a-color").is_err());
    }

    #[test]
    fn test_parse_hex() {
        let c = Rgba::parse("#FF8000").unwrap();
        assert!((c.r - 1.0).abs() < 0.001);
        assert!((c.g - 128.0 / 255.0).abs() < 0.001);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);

        let c = Rgba::parse("#00000080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 0.001);

        assert!(Rgba::parse("#12345").is_err());
        assert!(Rgba::parse("#GG0000").is_err());
    }

    #[test]
    fn test_hex_rejects_signs() {
        assert!(matches!(Rgba::parse("#+f+f+f"), Err(OrbError::InvalidColor(_))));
        assert!(Rgba::parse("#-1-1-1").is_err());
        assert!(Rgba::parse("#+fffff80").is_err());
    }

    #[test]
    fn test_deserialize_components() {
        let c: Rgba = serde_yaml::from_str("[0.5, 0.25, 2.0]").unwrap();
        assert_eq!(c, Rgba::new(0.5, 0.25, 1.0, 1.0));

        let bad: Result<Rgba, _> = serde_yaml::from_str("[0.5]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_with_opacity_and_premultiply() {
        let c = Rgba::WHITE.with_opacity(0.5);
        assert_eq!(c.a, 0.5);
        assert_eq!(c.premultiplied(), [0.5, 0.5, 0.5, 0.5]);
    }
}

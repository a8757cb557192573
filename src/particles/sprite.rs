//! Particle sprite texture, generated once per system

/// Edge length of the sprite in texels
pub const SPRITE_PIXELS: usize = 8;

/// A small white disc in straight-alpha RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTexture {
    size: usize,
    pixels: Vec<u8>,
}

impl SpriteTexture {
    /// White filled circle inscribed in a `size`×`size` texture, with a
    /// one-texel antialiased rim
    pub fn disc(size: usize) -> Self {
        let size = size.max(1);
        let mut pixels = vec![0u8; size * size * 4];
        let radius = size as f32 * 0.5;

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - radius;
                let dy = y as f32 + 0.5 - radius;
                let dist = (dx * dx + dy * dy).sqrt();
                let alpha = (radius - dist + 0.5).clamp(0.0, 1.0);

                let i = (y * size + x) * 4;
                pixels[i] = 255;
                pixels[i + 1] = 255;
                pixels[i + 2] = 255;
                pixels[i + 3] = (alpha * 255.0).round() as u8;
            }
        }

        Self { size, pixels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw RGBA8 texels, row-major from the top-left
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Alpha at normalized texture coordinates, nearest-neighbour
    pub fn sample_alpha(&self, u: f32, v: f32) -> f32 {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return 0.0;
        }
        let x = ((u * self.size as f32) as usize).min(self.size - 1);
        let y = ((v * self.size as f32) as usize).min(self.size - 1);
        self.pixels[(y * self.size + x) * 4 + 3] as f32 / 255.0
    }
}

impl Default for SpriteTexture {
    fn default() -> Self {
        Self::disc(SPRITE_PIXELS)
    }
}

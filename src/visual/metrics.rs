//! Visual metrics calculation for automated visual testing
//!
//! Metrics are computed from straight-alpha RGBA8 frames, the format both
//! the CPU rasterizer and a canvas `getImageData` readback produce.
//! Color statistics only consider visible pixels.

use wasm_bindgen::prelude::*;

/// Alpha at or above which a pixel counts as covered
const COVERED_ALPHA: u8 = 128;

/// Visual metrics computed from a rendered frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMetrics {
    /// Average luminance of visible pixels (0-1)
    pub avg_brightness: f32,
    /// Maximum luminance found
    pub max_brightness: f32,
    /// Fraction of all pixels that are at least half opaque
    pub coverage: f32,
    /// Mean alpha of the four corner pixels (0-1)
    pub corner_alpha: f32,
    /// Average saturation of visible pixels (0-1)
    pub avg_saturation: f32,
    /// Center of the most populated hue bin (0-360 degrees)
    pub dominant_hue: f32,
    /// Hue histogram of colored visible pixels, 12 bins of 30 degrees
    pub hue_histogram: [f32; 12],
    /// Fraction of visible pixels brighter than 0.9
    pub bright_pixels: f32,
}

/// Analyze raw pixel data (RGBA format, 4 bytes per pixel)
pub fn analyze_pixels(pixels: &[u8], width: u32, height: u32) -> FrameMetrics {
    let pixel_count = (width * height) as usize;
    if pixel_count == 0 || pixels.len() < pixel_count * 4 {
        return FrameMetrics::default();
    }

    let mut visible = 0u32;
    let mut covered = 0u32;
    let mut total_brightness = 0.0f64;
    let mut max_brightness = 0.0f32;
    let mut bright_pixels = 0u32;
    let mut total_saturation = 0.0f64;
    let mut hue_histogram = [0u32; 12];

    for px in pixels[..pixel_count * 4].chunks_exact(4) {
        let alpha = px[3];
        if alpha >= COVERED_ALPHA {
            covered += 1;
        }
        if alpha == 0 {
            continue;
        }
        visible += 1;

        let r = px[0] as f32 / 255.0;
        let g = px[1] as f32 / 255.0;
        let b = px[2] as f32 / 255.0;

        let brightness = 0.299 * r + 0.587 * g + 0.114 * b;
        total_brightness += brightness as f64;
        max_brightness = max_brightness.max(brightness);
        if brightness > 0.9 {
            bright_pixels += 1;
        }

        let (h, s, _v) = rgb_to_hsv(r, g, b);
        total_saturation += s as f64;
        if s > 0.1 && brightness > 0.05 {
            let hue_bin = ((h / 30.0).floor() as usize) % 12;
            hue_histogram[hue_bin] += 1;
        }
    }

    let w = width as usize;
    let h = height as usize;
    let corners = [0, w - 1, (h - 1) * w, h * w - 1];
    let corner_alpha = corners
        .iter()
        .map(|&i| pixels[i * 4 + 3] as f32 / 255.0)
        .sum::<f32>()
        / 4.0;

    let visible_f = visible.max(1) as f64;
    let total_colored: u32 = hue_histogram.iter().sum();
    let mut normalized_histogram = [0.0f32; 12];
    let mut peak_bin = 0;
    for (i, &count) in hue_histogram.iter().enumerate() {
        if total_colored > 0 {
            normalized_histogram[i] = count as f32 / total_colored as f32;
        }
        if normalized_histogram[i] > normalized_histogram[peak_bin] {
            peak_bin = i;
        }
    }

    FrameMetrics {
        avg_brightness: (total_brightness / visible_f) as f32,
        max_brightness,
        coverage: covered as f32 / pixel_count as f32,
        corner_alpha,
        avg_saturation: (total_saturation / visible_f) as f32,
        dominant_hue: peak_bin as f32 * 30.0 + 15.0,
        hue_histogram: normalized_histogram,
        bright_pixels: bright_pixels as f32 / visible_f as f32,
    }
}

/// Convert RGB (0-1) to HSV (hue: 0-360, saturation: 0-1, value: 0-1)
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;

    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta < 0.0001 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

/// WASM-bindgen wrapper for analyzing pixels from JavaScript
#[wasm_bindgen]
pub struct VisualAnalyzer;

#[wasm_bindgen]
impl VisualAnalyzer {
    /// Analyze pixel data and return JSON metrics
    #[wasm_bindgen]
    pub fn analyze(pixels: &[u8], width: u32, height: u32) -> String {
        let m = analyze_pixels(pixels, width, height);
        let histogram = m
            .hue_histogram
            .iter()
            .map(|v| format!("{:.3}", v))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"{{
  "avgBrightness": {:.4},
  "maxBrightness": {:.4},
  "coverage": {:.4},
  "cornerAlpha": {:.4},
  "avgSaturation": {:.4},
  "dominantHue": {:.1},
  "brightPixels": {:.4},
  "hueHistogram": [{}]
}}"#,
            m.avg_brightness,
            m.max_brightness,
            m.coverage,
            m.corner_alpha,
            m.avg_saturation,
            m.dominant_hue,
            m.bright_pixels,
            histogram
        )
    }

    /// Human-readable report for the same pixels
    #[wasm_bindgen]
    pub fn report(pixels: &[u8], width: u32, height: u32) -> String {
        super::generate_visual_report(&analyze_pixels(pixels, width, height))
    }
}

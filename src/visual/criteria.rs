//! Pass/fail thresholds for rendered orb frames

use super::metrics::FrameMetrics;

/// Test thresholds for visual metrics
#[derive(Debug, Clone, PartialEq)]
pub struct VisualCriteria {
    pub min_brightness: f32,
    pub max_brightness: f32,
    pub min_coverage: f32,
    pub max_coverage: f32,
    /// A correctly masked orb leaves its bounding square's corners empty
    pub max_corner_alpha: f32,
    pub min_saturation: f32,
}

impl Default for VisualCriteria {
    fn default() -> Self {
        Self {
            min_brightness: 0.2,
            max_brightness: 0.95,
            min_coverage: 0.5,
            max_coverage: 0.95,
            max_corner_alpha: 0.01,
            min_saturation: 0.1,
        }
    }
}

/// Check if visual metrics meet the given criteria
pub fn check_visual_criteria(metrics: &FrameMetrics, criteria: &VisualCriteria) -> Vec<String> {
    let mut failures = Vec::new();

    if metrics.avg_brightness < criteria.min_brightness {
        failures.push(format!(
            "Brightness {:.2}% below minimum {:.2}%",
            metrics.avg_brightness * 100.0,
            criteria.min_brightness * 100.0
        ));
    }

    if metrics.avg_brightness > criteria.max_brightness {
        failures.push(format!(
            "Brightness {:.2}% above maximum {:.2}%",
            metrics.avg_brightness * 100.0,
            criteria.max_brightness * 100.0
        ));
    }

    if metrics.coverage < criteria.min_coverage || metrics.coverage > criteria.max_coverage {
        failures.push(format!(
            "Coverage {:.2}% outside {:.2}%..{:.2}%",
            metrics.coverage * 100.0,
            criteria.min_coverage * 100.0,
            criteria.max_coverage * 100.0
        ));
    }

    if metrics.corner_alpha > criteria.max_corner_alpha {
        failures.push(format!(
            "Corner alpha {:.3} above maximum {:.3}",
            metrics.corner_alpha, criteria.max_corner_alpha
        ));
    }

    if metrics.avg_saturation < criteria.min_saturation {
        failures.push(format!(
            "Saturation {:.2}% below minimum {:.2}%",
            metrics.avg_saturation * 100.0,
            criteria.min_saturation * 100.0
        ));
    }

    failures
}

/// Generate a test report for visual metrics
pub fn generate_visual_report(metrics: &FrameMetrics) -> String {
    format!(
        r#"Visual Metrics Report
=====================
Brightness:    {:.2}% (avg) / {:.2}% (max)
Coverage:      {:.2}%
Corner Alpha:  {:.3}
Saturation:    {:.2}%
Bright Pixels: {:.2}%
Dominant Hue:  {:.0}°
"#,
        metrics.avg_brightness * 100.0,
        metrics.max_brightness * 100.0,
        metrics.coverage * 100.0,
        metrics.corner_alpha,
        metrics.avg_saturation * 100.0,
        metrics.bright_pixels * 100.0,
        metrics.dominant_hue,
    )
}

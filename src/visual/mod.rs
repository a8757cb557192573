//! Visual evaluation of rendered frames
//!
//! Pixel metrics and thresholds for checking rendered orbs programmatically,
//! from native tests against the CPU rasterizer or from JavaScript against
//! a canvas readback.

pub mod metrics;
pub mod criteria;

pub use metrics::{FrameMetrics, analyze_pixels, VisualAnalyzer};
pub use criteria::{VisualCriteria, check_visual_criteria, generate_visual_report};

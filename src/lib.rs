use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod animation;
pub mod compositor;
pub mod config;
pub mod error;
pub mod layers;
pub mod logging;
pub mod math;
pub mod particles;
pub mod render;
pub mod visual;

// Re-export visual analyzer for JavaScript
pub use visual::metrics::VisualAnalyzer;

pub use compositor::{OrbCompositor, OrbFrame};
pub use config::OrbConfiguration;
pub use error::OrbError;

use render::{Rasterizer, RenderPipeline};

/// Install the panic hook and console logger
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init(log::LevelFilter::Info);
}

impl From<OrbError> for JsValue {
    fn from(error: OrbError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

fn seconds(now_ms: f64) -> f64 {
    now_ms / 1000.0
}

/// An orb mounted on a canvas, driven by the host's animation frame clock.
///
/// All timestamps are milliseconds, typically `performance.now()`.
#[wasm_bindgen]
pub struct OrbView {
    pipeline: RenderPipeline,
    compositor: OrbCompositor,
}

#[wasm_bindgen]
impl OrbView {
    /// Mount an orb on `canvas`. `config_yaml` may be omitted for the
    /// default orb; a missing seed is drawn at random.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        config_yaml: Option<String>,
        now_ms: f64,
    ) -> std::result::Result<OrbView, JsValue> {
        let mut config = match config_yaml {
            Some(yaml) => OrbConfiguration::from_yaml(&yaml)?,
            None => OrbConfiguration::default(),
        };
        if config.seed.is_none() {
            config.seed = Some((js_sys::Math::random() * u32::MAX as f64) as u64);
        }

        let gl = canvas
            .get_context("webgl2")?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let pipeline = RenderPipeline::new(gl, canvas.width() as i32, canvas.height() as i32)?;
        let compositor = OrbCompositor::new(config, seconds(now_ms))?;

        Ok(Self { pipeline, compositor })
    }

    /// Draw the frame at `now_ms`
    #[wasm_bindgen]
    pub fn render(&mut self, now_ms: f64) -> std::result::Result<(), JsValue> {
        let frame = self.compositor.frame(seconds(now_ms));
        self.pipeline.render(&frame)?;
        Ok(())
    }

    /// Pause or resume rotation and particles
    #[wasm_bindgen]
    pub fn set_animating(&mut self, animating: bool, now_ms: f64) {
        self.compositor.set_animating(seconds(now_ms), animating);
    }

    #[wasm_bindgen]
    pub fn is_animating(&self) -> bool {
        self.compositor.is_animating()
    }

    /// Resize the canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: i32, height: i32) -> std::result::Result<(), JsValue> {
        self.pipeline.resize(width, height)?;
        Ok(())
    }

    /// Rasterize the frame at `now_ms` on the CPU into `size`x`size`
    /// straight-alpha RGBA pixels
    #[wasm_bindgen]
    pub fn snapshot(&mut self, now_ms: f64, size: u32) -> Vec<u8> {
        let frame = self.compositor.frame(seconds(now_ms));
        Rasterizer::new(size as usize).render(&frame)
    }

    /// Change the console log level (`"off"`, `"error"` ... `"trace"`)
    #[wasm_bindgen]
    pub fn set_log_level(&self, level: &str) -> bool {
        match logging::parse_level(level) {
            Some(filter) => {
                logging::init(filter);
                true
            }
            None => {
                log::warn!("unknown log level '{}'", level);
                false
            }
        }
    }
}

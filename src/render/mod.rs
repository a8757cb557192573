pub mod webgl;
pub mod shaders;
pub mod pipeline;
pub mod raster;

pub use webgl::WebGLContext;
pub use pipeline::RenderPipeline;
pub use raster::Rasterizer;

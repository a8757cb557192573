use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};
use crate::layers::BlendMode;

/// Thin WebGL2 helper layer. Failures come back as plain strings; the
/// pipeline wraps them into `OrbError::Render`.
pub struct WebGLContext {
    pub gl: Gl,
}

impl WebGLContext {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    /// Compile one shader stage
    pub fn compile_shader(&self, stage: u32, source: &str) -> Result<WebGlShader, String> {
        let shader = self.gl.create_shader(stage).ok_or("Failed to create shader")?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);

        let compiled = self.gl.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool() == Some(true);
        if compiled {
            return Ok(shader);
        }
        let info = self.gl.get_shader_info_log(&shader).unwrap_or_default();
        self.gl.delete_shader(Some(&shader));
        let stage = if stage == Gl::VERTEX_SHADER { "vertex" } else { "fragment" };
        Err(format!("{} shader compilation failed: {}", stage, info))
    }

    /// Compile and link a vertex/fragment pair
    pub fn create_program(&self, vertex: &str, fragment: &str) -> Result<WebGlProgram, String> {
        let vs = self.compile_shader(Gl::VERTEX_SHADER, vertex)?;
        let fs = match self.compile_shader(Gl::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(Some(&vs));
                return Err(e);
            }
        };

        let program = self.gl.create_program().ok_or("Failed to create program")?;
        self.gl.attach_shader(&program, &vs);
        self.gl.attach_shader(&program, &fs);
        self.gl.link_program(&program);
        // Shaders stay alive while attached
        self.gl.delete_shader(Some(&vs));
        self.gl.delete_shader(Some(&fs));

        let linked = self.gl.get_program_parameter(&program, Gl::LINK_STATUS).as_bool() == Some(true);
        if linked {
            return Ok(program);
        }
        let info = self.gl.get_program_info_log(&program).unwrap_or_default();
        self.gl.delete_program(Some(&program));
        Err(format!("Program linking failed: {}", info))
    }

    /// Create an empty array buffer for per-frame data
    pub fn create_dynamic_buffer(&self) -> Result<WebGlBuffer, String> {
        self.gl.create_buffer().ok_or_else(|| "Failed to create buffer".to_string())
    }

    /// Replace the whole contents of an array buffer
    pub fn upload_f32(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));

        // Safety: the view is consumed by buffer_data before any allocation
        unsafe {
            let view = js_sys::Float32Array::view(data);
            self.gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &view, Gl::DYNAMIC_DRAW);
        }

        self.gl.bind_buffer(Gl::ARRAY_BUFFER, None);
    }

    pub fn create_vao(&self) -> Result<WebGlVertexArrayObject, String> {
        self.gl.create_vertex_array().ok_or_else(|| "Failed to create vertex array".to_string())
    }

    /// Create an RGBA8 texture, optionally filled with `pixels`
    pub fn create_texture(
        &self,
        width: i32,
        height: i32,
        pixels: Option<&[u8]>,
        filter: u32,
    ) -> Result<WebGlTexture, String> {
        let texture = self.gl.create_texture().ok_or("Failed to create texture")?;
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));

        let upload = self.gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D,
            0,
            Gl::RGBA as i32,
            width,
            height,
            0,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            pixels,
        );
        if let Err(e) = upload {
            self.gl.bind_texture(Gl::TEXTURE_2D, None);
            self.gl.delete_texture(Some(&texture));
            return Err(format!("Failed to upload {}x{} texture: {:?}", width, height, e));
        }

        for (param, value) in [
            (Gl::TEXTURE_MIN_FILTER, filter),
            (Gl::TEXTURE_MAG_FILTER, filter),
            (Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE),
            (Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE),
        ] {
            self.gl.tex_parameteri(Gl::TEXTURE_2D, param, value as i32);
        }

        self.gl.bind_texture(Gl::TEXTURE_2D, None);
        Ok(texture)
    }

    /// Framebuffer rendering into `texture`
    pub fn create_framebuffer(&self, texture: &WebGlTexture) -> Result<WebGlFramebuffer, String> {
        let fbo = self.gl.create_framebuffer().ok_or("Failed to create framebuffer")?;
        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&fbo));
        self.gl.framebuffer_texture_2d(Gl::FRAMEBUFFER, Gl::COLOR_ATTACHMENT0, Gl::TEXTURE_2D, Some(texture), 0);

        let status = self.gl.check_framebuffer_status(Gl::FRAMEBUFFER);
        self.gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        if status != Gl::FRAMEBUFFER_COMPLETE {
            self.gl.delete_framebuffer(Some(&fbo));
            return Err(format!("Framebuffer incomplete: 0x{:x}", status));
        }
        Ok(fbo)
    }

    pub fn get_uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    pub fn uniform_1f(&self, location: Option<&WebGlUniformLocation>, value: f32) {
        self.gl.uniform1f(location, value);
    }

    pub fn uniform_2f(&self, location: Option<&WebGlUniformLocation>, x: f32, y: f32) {
        self.gl.uniform2f(location, x, y);
    }

    pub fn uniform_4f(&self, location: Option<&WebGlUniformLocation>, v: [f32; 4]) {
        self.gl.uniform4f(location, v[0], v[1], v[2], v[3]);
    }

    /// vec4 array uniform from packed components
    pub fn uniform_4fv(&self, location: Option<&WebGlUniformLocation>, data: &[f32]) {
        self.gl.uniform4fv_with_f32_array(location, data);
    }

    pub fn uniform_1i(&self, location: Option<&WebGlUniformLocation>, value: i32) {
        self.gl.uniform1i(location, value);
    }

    /// Clear the color attachment of the bound target
    pub fn clear(&self, color: [f32; 4]) {
        self.gl.clear_color(color[0], color[1], color[2], color[3]);
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
    }

    /// Configure premultiplied-alpha blending for a layer
    pub fn set_blend_mode(&self, mode: BlendMode) {
        let (src, dst) = blend_factors(mode);
        self.gl.enable(Gl::BLEND);
        self.gl.blend_func(src, dst);
    }

    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }
}

/// Source and destination factors reproducing [`BlendMode::apply`] on
/// premultiplied colors
pub fn blend_factors(mode: BlendMode) -> (u32, u32) {
    match mode {
        BlendMode::Normal => (Gl::ONE, Gl::ONE_MINUS_SRC_ALPHA),
        BlendMode::PlusLighter => (Gl::ONE, Gl::ONE),
        BlendMode::DestinationOver => (Gl::ONE_MINUS_DST_ALPHA, Gl::ONE),
        BlendMode::DestinationOut => (Gl::ZERO, Gl::ONE_MINUS_SRC_ALPHA),
        BlendMode::DestinationIn => (Gl::ZERO, Gl::SRC_ALPHA),
    }
}

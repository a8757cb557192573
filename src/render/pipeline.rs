use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlProgram, WebGlVertexArrayObject,
    WebGlTexture, WebGlFramebuffer, WebGlUniformLocation,
};
use crate::compositor::{DrawCommand, GradientDraw, OrbFrame, OutlineDraw, ShadowDraw};
use crate::error::{OrbError, Result};
use crate::layers::{
    combine_blur, GlowDraw, BLOB_HARMONICS, MASK_BLUR, MASK_CUT_OFFSET, MASK_CUT_SCALE,
};
use crate::math::{Rgba, Vec2};
use crate::particles::{ParticleDraw, SpriteTexture};
use super::webgl::WebGLContext;
use super::shaders::*;

/// Floats per particle vertex: center(2) + diameter(1) + alpha(1)
const PARTICLE_STRIDE: usize = 4;

/// Cached uniform locations for the layer shader
struct LayerUniforms {
    mode: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    stops: Option<WebGlUniformLocation>,
    stop_count: Option<WebGlUniformLocation>,
    diameter: Option<WebGlUniformLocation>,
    blur: Option<WebGlUniformLocation>,
    rotation: Option<WebGlUniformLocation>,
    mask_geometry: Option<WebGlUniformLocation>,
    mask_blur: Option<WebGlUniformLocation>,
    has_blob: Option<WebGlUniformLocation>,
    blob_center: Option<WebGlUniformLocation>,
    blob_radius: Option<WebGlUniformLocation>,
    blob_rotation: Option<WebGlUniformLocation>,
    blob_phase: Option<WebGlUniformLocation>,
    blob_softness: Option<WebGlUniformLocation>,
    harmonics: Option<WebGlUniformLocation>,
    radius: Option<WebGlUniformLocation>,
    width: Option<WebGlUniformLocation>,
    color_top: Option<WebGlUniformLocation>,
}

/// Cached uniform locations for the particle shader
struct ParticleUniforms {
    size: Option<WebGlUniformLocation>,
    blur: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    sprite: Option<WebGlUniformLocation>,
}

/// WebGL2 backend executing [`OrbFrame`]s
///
/// Layers are composited into a premultiplied offscreen target, then
/// presented to the canvas in one pass.
pub struct RenderPipeline {
    ctx: WebGLContext,

    layer_program: WebGlProgram,
    particle_program: WebGlProgram,
    present_program: WebGlProgram,

    layer_uniforms: LayerUniforms,
    particle_uniforms: ParticleUniforms,
    present_texture: Option<WebGlUniformLocation>,

    fullscreen_vao: WebGlVertexArrayObject,
    particle_vao: WebGlVertexArrayObject,
    particle_buffer: WebGlBuffer,

    sprite_texture: WebGlTexture,
    sprite_source: SpriteTexture,

    target_texture: Option<WebGlTexture>,
    target_fbo: Option<WebGlFramebuffer>,

    width: i32,
    height: i32,
}

impl RenderPipeline {
    pub fn new(gl: WebGl2RenderingContext, width: i32, height: i32) -> Result<Self> {
        Self::build(gl, width, height).map_err(|e| {
            log::error!("render pipeline setup failed: {}", e);
            OrbError::Render(e)
        })
    }

    fn build(gl: WebGl2RenderingContext, width: i32, height: i32) -> std::result::Result<Self, String> {
        let ctx = WebGLContext::new(gl);

        let layer_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, ORB_LAYER_SHADER)?;
        let particle_program = ctx.create_program(PARTICLE_VERTEX_SHADER, PARTICLE_FRAGMENT_SHADER)?;
        let present_program = ctx.create_program(FULLSCREEN_VERTEX_SHADER, PRESENT_SHADER)?;

        let uniform = |name: &str| ctx.get_uniform_location(&layer_program, name);
        let layer_uniforms = LayerUniforms {
            mode: uniform("u_mode"),
            color: uniform("u_color"),
            stops: uniform("u_stops"),
            stop_count: uniform("u_stop_count"),
            diameter: uniform("u_diameter"),
            blur: uniform("u_blur"),
            rotation: uniform("u_rotation"),
            mask_geometry: uniform("u_mask_geometry"),
            mask_blur: uniform("u_mask_blur"),
            has_blob: uniform("u_has_blob"),
            blob_center: uniform("u_blob_center"),
            blob_radius: uniform("u_blob_radius"),
            blob_rotation: uniform("u_blob_rotation"),
            blob_phase: uniform("u_blob_phase"),
            blob_softness: uniform("u_blob_softness"),
            harmonics: uniform("u_harmonics"),
            radius: uniform("u_radius"),
            width: uniform("u_width"),
            color_top: uniform("u_color_top"),
        };

        let particle_uniforms = ParticleUniforms {
            size: ctx.get_uniform_location(&particle_program, "u_size"),
            blur: ctx.get_uniform_location(&particle_program, "u_blur"),
            color: ctx.get_uniform_location(&particle_program, "u_color"),
            sprite: ctx.get_uniform_location(&particle_program, "u_sprite"),
        };
        let present_texture = ctx.get_uniform_location(&present_program, "u_texture");

        let fullscreen_vao = ctx.create_vao()?;

        let particle_vao = ctx.create_vao()?;
        let particle_buffer = ctx.create_dynamic_buffer()?;
        {
            let gl = &ctx.gl;
            gl.bind_vertex_array(Some(&particle_vao));
            gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&particle_buffer));
            let stride = (PARTICLE_STRIDE * 4) as i32;

            // Center
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_with_i32(0, 2, WebGl2RenderingContext::FLOAT, false, stride, 0);

            // Diameter
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_with_i32(1, 1, WebGl2RenderingContext::FLOAT, false, stride, 8);

            // Alpha
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_with_i32(2, 1, WebGl2RenderingContext::FLOAT, false, stride, 12);

            gl.bind_vertex_array(None);
            gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, None);
        }

        let sprite_source = SpriteTexture::default();
        let sprite_texture = Self::upload_sprite(&ctx, &sprite_source)?;

        let mut pipeline = Self {
            ctx,
            layer_program,
            particle_program,
            present_program,
            layer_uniforms,
            particle_uniforms,
            present_texture,
            fullscreen_vao,
            particle_vao,
            particle_buffer,
            sprite_texture,
            sprite_source,
            target_texture: None,
            target_fbo: None,
            width,
            height,
        };

        pipeline.create_target()?;

        Ok(pipeline)
    }

    fn upload_sprite(ctx: &WebGLContext, sprite: &SpriteTexture) -> std::result::Result<WebGlTexture, String> {
        let size = sprite.size() as i32;
        ctx.create_texture(size, size, Some(sprite.pixels()), WebGl2RenderingContext::LINEAR)
    }

    fn create_target(&mut self) -> std::result::Result<(), String> {
        let texture = self.ctx.create_texture(
            self.width.max(1),
            self.height.max(1),
            None,
            WebGl2RenderingContext::NEAREST,
        )?;
        let fbo = match self.ctx.create_framebuffer(&texture) {
            Ok(fbo) => fbo,
            Err(e) => {
                self.ctx.gl.delete_texture(Some(&texture));
                return Err(e);
            }
        };
        self.release_target();
        self.target_texture = Some(texture);
        self.target_fbo = Some(fbo);
        Ok(())
    }

    /// Delete the offscreen target's GL objects
    fn release_target(&mut self) {
        if let Some(fbo) = self.target_fbo.take() {
            self.ctx.gl.delete_framebuffer(Some(&fbo));
        }
        if let Some(texture) = self.target_texture.take() {
            self.ctx.gl.delete_texture(Some(&texture));
        }
    }

    pub fn gl(&self) -> &WebGl2RenderingContext {
        &self.ctx.gl
    }

    /// Offscreen texture the orb is composited into
    pub fn target_texture(&self) -> Option<&WebGlTexture> {
        self.target_texture.as_ref()
    }

    /// GPU copy of the particle sprite
    pub fn sprite_texture(&self) -> &WebGlTexture {
        &self.sprite_texture
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Orb square inside the canvas: centered, side = shorter canvas edge
    fn orb_viewport(&self) -> (i32, i32, i32) {
        let size = self.width.min(self.height).max(1);
        ((self.width - size) / 2, (self.height - size) / 2, size)
    }

    /// Draw a frame to the canvas
    pub fn render(&mut self, frame: &OrbFrame) -> Result<()> {
        let gl = &self.ctx.gl;
        let (x, y, size) = self.orb_viewport();

        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, self.target_fbo.as_ref());
        self.ctx.viewport(0, 0, self.width, self.height);
        self.ctx.clear(Rgba::CLEAR.to_array());
        self.ctx.viewport(x, y, size, size);

        for command in &frame.commands {
            self.ctx.set_blend_mode(command.blend());
            match command {
                DrawCommand::Background(gradient) => self.draw_gradient(gradient),
                DrawCommand::Glow { draw, .. } => self.draw_glow(draw),
                DrawCommand::Particles(draw) => self.draw_particles(draw, size as f32)?,
                DrawCommand::Outline(outline) => self.draw_outline(outline),
                DrawCommand::CircleMask { radius } => self.draw_circle_mask(*radius),
                DrawCommand::Shadow(shadow) => self.draw_shadow(shadow),
            }
        }

        self.present();
        Ok(())
    }

    fn begin_layer(&self, mode: i32) {
        let gl = &self.ctx.gl;
        gl.use_program(Some(&self.layer_program));
        gl.bind_vertex_array(Some(&self.fullscreen_vao));
        self.ctx.uniform_1i(self.layer_uniforms.mode.as_ref(), mode);
    }

    fn fullscreen_pass(&self) {
        self.ctx.gl.draw_arrays(WebGl2RenderingContext::TRIANGLES, 0, 3);
    }

    fn draw_gradient(&self, gradient: &GradientDraw) {
        self.begin_layer(MODE_GRADIENT);
        let stops = gradient_stops(gradient);
        let packed: Vec<f32> = stops.iter().flat_map(|c| c.to_array()).collect();
        if !packed.is_empty() {
            self.ctx.uniform_4fv(self.layer_uniforms.stops.as_ref(), &packed);
        }
        self.ctx.uniform_1i(self.layer_uniforms.stop_count.as_ref(), stops.len() as i32);
        self.fullscreen_pass();
    }

    fn draw_glow(&self, draw: &GlowDraw) {
        let u = &self.layer_uniforms;
        self.begin_layer(MODE_GLOW);
        self.ctx.uniform_4f(u.color.as_ref(), draw.color.to_array());
        self.ctx.uniform_1f(u.diameter.as_ref(), draw.diameter);
        self.ctx.uniform_1f(u.blur.as_ref(), draw.blur);
        self.ctx.uniform_1f(u.rotation.as_ref(), draw.rotation);
        self.ctx.uniform_2f(u.mask_geometry.as_ref(), MASK_CUT_SCALE, MASK_CUT_OFFSET);
        self.ctx.uniform_1f(u.mask_blur.as_ref(), combine_blur(draw.diameter * MASK_BLUR, draw.blur));

        match &draw.mask {
            Some(blob) => {
                self.ctx.uniform_1i(u.has_blob.as_ref(), 1);
                self.ctx.uniform_2f(u.blob_center.as_ref(), blob.center.x, blob.center.y);
                self.ctx.uniform_1f(u.blob_radius.as_ref(), blob.radius);
                self.ctx.uniform_1f(u.blob_rotation.as_ref(), blob.rotation);
                self.ctx.uniform_1f(u.blob_phase.as_ref(), blob.phase);
                self.ctx.uniform_1f(u.blob_softness.as_ref(), blob.softness);
                let harmonics: Vec<f32> = BLOB_HARMONICS.iter().flatten().copied().collect();
                self.ctx.uniform_4fv(u.harmonics.as_ref(), &harmonics);
            }
            None => self.ctx.uniform_1i(u.has_blob.as_ref(), 0),
        }
        self.fullscreen_pass();
    }

    fn draw_outline(&self, outline: &OutlineDraw) {
        let u = &self.layer_uniforms;
        self.begin_layer(MODE_OUTLINE);
        self.ctx.uniform_4f(u.color.as_ref(), outline.bottom.to_array());
        self.ctx.uniform_4f(u.color_top.as_ref(), outline.top.to_array());
        for stroke in &outline.strokes {
            self.ctx.set_blend_mode(stroke.blend);
            self.ctx.uniform_1f(u.radius.as_ref(), stroke.radius);
            self.ctx.uniform_1f(u.width.as_ref(), stroke.width);
            self.ctx.uniform_1f(u.blur.as_ref(), stroke.blur);
            self.fullscreen_pass();
        }
    }

    fn draw_circle_mask(&self, radius: f32) {
        self.begin_layer(MODE_CIRCLE_MASK);
        self.ctx.uniform_1f(self.layer_uniforms.radius.as_ref(), radius);
        self.fullscreen_pass();
    }

    fn draw_shadow(&self, shadow: &ShadowDraw) {
        let u = &self.layer_uniforms;
        self.begin_layer(MODE_SHADOW);
        self.ctx.uniform_1f(u.radius.as_ref(), shadow.orb_radius);
        for layer in &shadow.layers {
            self.ctx.uniform_4f(u.color.as_ref(), layer.color.to_array());
            self.ctx.uniform_1f(u.blur.as_ref(), layer.radius);
            self.fullscreen_pass();
        }
    }

    fn draw_particles(&mut self, draw: &ParticleDraw, size: f32) -> Result<()> {
        if draw.sprites.is_empty() {
            return Ok(());
        }
        if *draw.texture != self.sprite_source {
            let texture = Self::upload_sprite(&self.ctx, &draw.texture).map_err(OrbError::Render)?;
            let previous = std::mem::replace(&mut self.sprite_texture, texture);
            self.ctx.gl.delete_texture(Some(&previous));
            self.sprite_source = (*draw.texture).clone();
        }

        let data = particle_vertices(draw);
        self.ctx.upload_f32(&self.particle_buffer, &data);

        let gl = &self.ctx.gl;
        let u = &self.particle_uniforms;
        gl.use_program(Some(&self.particle_program));
        gl.bind_vertex_array(Some(&self.particle_vao));
        gl.active_texture(WebGl2RenderingContext::TEXTURE0);
        gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, Some(&self.sprite_texture));
        self.ctx.uniform_1i(u.sprite.as_ref(), 0);
        self.ctx.uniform_1f(u.size.as_ref(), size);
        self.ctx.uniform_1f(u.blur.as_ref(), draw.blur);
        self.ctx.uniform_4f(u.color.as_ref(), draw.color.to_array());

        gl.draw_arrays(WebGl2RenderingContext::POINTS, 0, draw.sprites.len() as i32);
        gl.bind_vertex_array(None);
        Ok(())
    }

    fn present(&self) {
        let gl = &self.ctx.gl;
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);
        self.ctx.viewport(0, 0, self.width, self.height);
        gl.disable(WebGl2RenderingContext::BLEND);
        self.ctx.clear(Rgba::CLEAR.to_array());

        gl.use_program(Some(&self.present_program));
        gl.bind_vertex_array(Some(&self.fullscreen_vao));
        gl.active_texture(WebGl2RenderingContext::TEXTURE0);
        gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, self.target_texture.as_ref());
        self.ctx.uniform_1i(self.present_texture.as_ref(), 0);
        self.fullscreen_pass();
        gl.bind_vertex_array(None);
    }

    /// Resize the render pipeline
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        log::info!("resizing orb canvas to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.create_target().map_err(OrbError::Render)
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.release_target();
        let gl = &self.ctx.gl;
        gl.delete_texture(Some(&self.sprite_texture));
        gl.delete_buffer(Some(&self.particle_buffer));
        gl.delete_vertex_array(Some(&self.particle_vao));
        gl.delete_vertex_array(Some(&self.fullscreen_vao));
        gl.delete_program(Some(&self.layer_program));
        gl.delete_program(Some(&self.particle_program));
        gl.delete_program(Some(&self.present_program));
    }
}

/// Stops sent to the shader, resampled when the palette is too long
fn gradient_stops(gradient: &GradientDraw) -> Vec<Rgba> {
    if gradient.stops.len() <= MAX_GRADIENT_STOPS {
        return gradient.stops.clone();
    }
    (0..MAX_GRADIENT_STOPS)
        .map(|i| {
            let t = i as f32 / (MAX_GRADIENT_STOPS - 1) as f32;
            gradient.color_at(Vec2::new(0.0, 0.5 - t))
        })
        .collect()
}

fn particle_vertices(draw: &ParticleDraw) -> Vec<f32> {
    let mut data = Vec::with_capacity(draw.sprites.len() * PARTICLE_STRIDE);
    for sprite in &draw.sprites {
        data.extend_from_slice(&[sprite.center.x, sprite.center.y, sprite.diameter, sprite.alpha]);
    }
    data
}

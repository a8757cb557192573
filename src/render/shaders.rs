//! GLSL ES 3.0 sources for the orb pipeline
//!
//! The layer shader evaluates the same analytic shapes as the CPU
//! rasterizer, in orb space (centered, y down, unit = orb size).

/// Layer shader modes, selected with `u_mode`
pub const MODE_GRADIENT: i32 = 0;
pub const MODE_GLOW: i32 = 1;
pub const MODE_OUTLINE: i32 = 2;
pub const MODE_CIRCLE_MASK: i32 = 3;
pub const MODE_SHADOW: i32 = 4;

/// Gradient stops the layer shader accepts; longer palettes are resampled
pub const MAX_GRADIENT_STOPS: usize = 8;

/// Fullscreen triangle, shared by the layer and present passes
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

out vec2 v_uv;

void main() {
    float x = float((gl_VertexID & 1) << 2);
    float y = float((gl_VertexID & 2) << 1);
    v_uv = vec2(x * 0.5, y * 0.5);
    gl_Position = vec4(x - 1.0, y - 1.0, 0.0, 1.0);
}
"#;

/// One orb layer: gradient, masked glow, outline stroke, circle mask or shadow.
/// Output is premultiplied.
pub const ORB_LAYER_SHADER: &str = r#"#version 300 es
precision highp float;

const int MODE_GRADIENT = 0;
const int MODE_GLOW = 1;
const int MODE_OUTLINE = 2;
const int MODE_CIRCLE_MASK = 3;
const int MODE_SHADOW = 4;

in vec2 v_uv;

uniform int u_mode;
uniform vec4 u_color;

// gradient
uniform vec4 u_stops[8];
uniform int u_stop_count;

// glow
uniform float u_diameter;
uniform float u_blur;
uniform float u_rotation;
uniform vec2 u_mask_geometry;

// blob mask
uniform int u_has_blob;
uniform vec2 u_blob_center;
uniform float u_blob_radius;
uniform float u_blob_rotation;
uniform float u_blob_phase;
uniform float u_blob_softness;
uniform vec4 u_harmonics[3];
uniform float u_mask_blur;

// outline, circle mask and shadow
uniform float u_radius;
uniform float u_width;
uniform vec4 u_color_top;

out vec4 fragColor;

const float TAU = 6.28318530718;

vec2 rotate_deg(vec2 p, float degrees) {
    float a = radians(degrees);
    float c = cos(a);
    float s = sin(a);
    return vec2(p.x * c - p.y * s, p.x * s + p.y * c);
}

float soft_disc(float dist, float radius, float blur) {
    if (blur <= 0.0) {
        return dist <= radius ? 1.0 : 0.0;
    }
    return 1.0 - smoothstep(radius - blur, radius + blur, dist);
}

float blob_coverage(vec2 p) {
    vec2 local = rotate_deg(p - u_blob_center, -u_blob_rotation);
    float theta = atan(local.y, local.x);
    float ripple = 0.0;
    for (int i = 0; i < 3; i++) {
        vec4 h = u_harmonics[i];
        ripple += h.y * sin(h.x * theta + TAU * h.z * u_blob_phase + h.w);
    }
    return soft_disc(length(local), u_blob_radius * (1.0 + ripple), u_blob_softness);
}

float glow_coverage(vec2 p) {
    vec2 local = rotate_deg(p, -u_rotation);
    float d = u_diameter;
    float keep = soft_disc(length(local), d * 0.5, u_mask_blur);
    vec2 cut_center = vec2(0.0, d * u_mask_geometry.y);
    float cut = soft_disc(distance(local, cut_center), d * u_mask_geometry.x * 0.5, u_mask_blur);
    float fill = soft_disc(length(local), d * 0.5, u_blur);
    float coverage = fill * keep * (1.0 - cut);
    if (u_has_blob == 1) {
        coverage *= blob_coverage(p);
    }
    return coverage;
}

vec4 gradient_color(vec2 p) {
    if (u_stop_count <= 0) {
        return vec4(0.0);
    }
    if (u_stop_count == 1) {
        return u_stops[0];
    }
    float t = clamp(0.5 - p.y, 0.0, 1.0) * float(u_stop_count - 1);
    int i = min(int(floor(t)), u_stop_count - 2);
    return mix(u_stops[i], u_stops[i + 1], t - float(i));
}

vec4 premultiply(vec4 c) {
    return vec4(c.rgb * c.a, c.a);
}

void main() {
    // Orb space: centered, y down
    vec2 p = vec2(v_uv.x - 0.5, 0.5 - v_uv.y);

    if (u_mode == MODE_GRADIENT) {
        fragColor = premultiply(gradient_color(p));
    } else if (u_mode == MODE_GLOW) {
        fragColor = premultiply(u_color) * glow_coverage(p);
    } else if (u_mode == MODE_OUTLINE) {
        float coverage = soft_disc(abs(length(p) - u_radius), u_width * 0.5, u_blur);
        vec4 color = mix(u_color, u_color_top, clamp(0.5 - p.y, 0.0, 1.0));
        fragColor = premultiply(color) * coverage;
    } else if (u_mode == MODE_CIRCLE_MASK) {
        fragColor = vec4(soft_disc(length(p), u_radius, 0.0));
    } else {
        fragColor = premultiply(u_color) * soft_disc(length(p), u_radius, u_blur);
    }
}
"#;

/// Particle point sprites; positions arrive in orb space
pub const PARTICLE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec2 a_center;
layout(location = 1) in float a_diameter;
layout(location = 2) in float a_alpha;

uniform float u_size;
uniform float u_blur;

out float v_alpha;
out float v_extent;

void main() {
    v_alpha = a_alpha;
    v_extent = a_diameter + 2.0 * u_blur;
    gl_Position = vec4(a_center.x * 2.0, -a_center.y * 2.0, 0.0, 1.0);
    gl_PointSize = max(v_extent * u_size, 1.0);
}
"#;

pub const PARTICLE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in float v_alpha;
in float v_extent;

uniform sampler2D u_sprite;
uniform vec4 u_color;
uniform float u_blur;

out vec4 fragColor;

void main() {
    float coverage;
    if (u_blur > 0.0) {
        float dist = length(gl_PointCoord - vec2(0.5)) * v_extent;
        float radius = (v_extent - 2.0 * u_blur) * 0.5;
        coverage = 1.0 - smoothstep(radius - u_blur, radius + u_blur, dist);
    } else {
        coverage = texture(u_sprite, gl_PointCoord).a;
    }
    float alpha = u_color.a * v_alpha * coverage;
    fragColor = vec4(u_color.rgb * alpha, alpha);
}
"#;

/// Copy the offscreen target to the canvas
pub const PRESENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_texture;

out vec4 fragColor;

void main() {
    fragColor = texture(u_texture, v_uv);
}
"#;

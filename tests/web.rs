//! Browser smoke tests, run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use orb_engine::compositor::DrawCommand;
use orb_engine::layers::BlendMode;
use orb_engine::math::{Rgba, Vec2};
use orb_engine::particles::{ParticleDraw, ParticleSprite, SpriteTexture};
use orb_engine::render::{Rasterizer, RenderPipeline};
use orb_engine::{OrbCompositor, OrbConfiguration, OrbFrame, VisualAnalyzer};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_init_twice() {
    orb_engine::init();
    orb_engine::init();
}

#[wasm_bindgen_test]
fn test_yaml_orb_renders_masked() {
    let config = OrbConfiguration::from_yaml(
        "backgroundColors: [\"#102030\", blue, pink]\nspeed: 45\nseed: 9\n",
    )
    .unwrap();
    let mut compositor = OrbCompositor::new(config, 0.0).unwrap();
    let frame = compositor.frame(0.75);
    assert!(frame.commands.iter().any(|c| matches!(c, DrawCommand::CircleMask { .. })));

    let pixels = Rasterizer::new(32).render(&frame);
    let json = VisualAnalyzer::analyze(&pixels, 32, 32);
    assert!(json.contains("\"cornerAlpha\": 0.0000"), "{}", json);
}

#[wasm_bindgen_test]
fn test_analyzer_report() {
    let pixels = vec![255u8; 4 * 4 * 4];
    let report = VisualAnalyzer::report(&pixels, 4, 4);
    assert!(!report.is_empty());
}

fn webgl2(size: u32) -> WebGl2RenderingContext {
    let canvas = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_width(size);
    canvas.set_height(size);
    canvas
        .get_context("webgl2")
        .unwrap()
        .unwrap()
        .dyn_into::<WebGl2RenderingContext>()
        .unwrap()
}

#[wasm_bindgen_test]
fn test_resize_deletes_previous_target() {
    let mut pipeline = RenderPipeline::new(webgl2(64), 64, 64).unwrap();
    let first = pipeline.target_texture().unwrap().clone();

    pipeline.resize(128, 96).unwrap();
    let second = pipeline.target_texture().unwrap().clone();
    assert!(!pipeline.gl().is_texture(Some(&first)));
    assert!(pipeline.gl().is_texture(Some(&second)));

    pipeline.resize(32, 32).unwrap();
    assert!(!pipeline.gl().is_texture(Some(&second)));
}

#[wasm_bindgen_test]
fn test_new_sprite_replaces_old_texture() {
    let mut pipeline = RenderPipeline::new(webgl2(64), 64, 64).unwrap();
    let old = pipeline.sprite_texture().clone();

    let frame = OrbFrame {
        time: 0.0,
        commands: vec![DrawCommand::Particles(ParticleDraw {
            color: Rgba::WHITE,
            blur: 0.0,
            blend: BlendMode::PlusLighter,
            sprites: vec![ParticleSprite { center: Vec2::ZERO, diameter: 0.05, alpha: 1.0 }],
            texture: Rc::new(SpriteTexture::disc(4)),
        })],
    };
    pipeline.render(&frame).unwrap();

    assert!(!pipeline.gl().is_texture(Some(&old)));
    assert!(pipeline.gl().is_texture(Some(pipeline.sprite_texture())));
}

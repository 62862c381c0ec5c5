//! Interactive tour: software-rasterized layers composited on the GPU, with
//! sprite and geometry batches drawn on top.

use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::Result;
use rasterkit_engine::batch::{GeometryBatch, SpriteBatch};
use rasterkit_engine::canvas::Canvas;
use rasterkit_engine::coords::{Flip, Rect, Vec2, Viewport};
use rasterkit_engine::core::{App, AppControl, FrameCtx};
use rasterkit_engine::device::GpuInit;
use rasterkit_engine::gpu::{GraphicsApi, Texture};
use rasterkit_engine::logging::{LoggingConfig, init_logging};
use rasterkit_engine::paint::{Color, PixelMode};
use rasterkit_engine::raster::{Shape, TextAlign, Vertex};
use rasterkit_engine::surface::{BoundaryMode, PixelSurface};
use rasterkit_engine::time::FpsCounter;
use rasterkit_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

const CANVAS_W: i32 = 256;
const CANVAS_H: i32 = 192;
const SKY: Color = Color::rgb(125, 255, 255);

fn checker(size: i32, a: Color, b: Color) -> PixelSurface {
    let mut s = PixelSurface::new(size, size);
    let cell = (size / 4).max(1);
    for y in 0..size {
        for x in 0..size {
            let c = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            s.set_pixel(x, y, c);
        }
    }
    s
}

struct Scene {
    canvas: Canvas,
    hud: usize,
    sprites: SpriteBatch,
    geometry: GeometryBatch,
    tile: PixelSurface,
    tile_texture: Texture,
    shapes: Vec<Shape>,
    fps: FpsCounter,
    elapsed: f32,
}

impl Scene {
    fn new(api: Rc<dyn GraphicsApi>, viewport: Viewport) -> Self {
        let mut canvas = Canvas::new(Rc::clone(&api), CANVAS_W, CANVAS_H);
        let hud = canvas.create_layer(CANVAS_W, CANVAS_H);
        let tile = checker(16, Color::rgb(200, 60, 60), Color::TRANSPARENT);
        let tile_texture = Texture::from_surface(Rc::clone(&api), &checker(32, Color::WHITE, Color::rgb(40, 40, 160)));

        let shapes = vec![
            Shape::rect(Vec2::new(60.0, 120.0), Vec2::new(40.0, 24.0), Color::rgb(240, 160, 0)),
            Shape::circle(Vec2::new(200.0, 60.0), 18.0, Color::rgb(0, 160, 60)),
            Shape::triangle(
                Vec2::new(200.0, 140.0),
                [Vec2::new(-20.0, 15.0), Vec2::new(20.0, 15.0), Vec2::new(0.0, -20.0)],
                Color::rgb(120, 0, 200),
            ),
        ];

        Self {
            canvas,
            hud,
            sprites: SpriteBatch::new(Rc::clone(&api), viewport),
            geometry: GeometryBatch::new(api, viewport),
            tile,
            tile_texture,
            shapes,
            fps: FpsCounter::default(),
            elapsed: 0.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.fps.update(dt);
        for shape in &mut self.shapes {
            shape.rotate(dt);
        }

        self.canvas.set_current_layer(0);
        self.canvas.set_pixel_mode(PixelMode::Normal);
        self.canvas.clear(SKY);
        {
            let mut r = self.canvas.raster();
            r.fill_rect(0, 150, CANVAS_W, CANVAS_H, Color::rgb(70, 140, 40));
            for shape in &self.shapes {
                shape.draw(&mut r);
            }
            r.circle_outline(128, 96, 30, Color::BLACK);
            r.line(0, 0, CANVAS_W - 1, CANVAS_H - 1, Color::rgb(255, 255, 255));
            r.set_pixel_mode(PixelMode::Mask);
            r.textured_triangle(
                &self.tile,
                Vertex::new(Vec2::new(90.0, 20.0), Vec2::new(0.0, 0.0)),
                Vertex::new(Vec2::new(150.0, 20.0), Vec2::new(1.0, 0.0)),
                Vertex::new(Vec2::new(90.0, 80.0), Vec2::new(0.0, 1.0)),
            );
            let bob = (self.elapsed * 2.0).sin() * 10.0;
            r.sprite_at(40, 50 + bob as i32, &self.tile, Vec2::splat(2.0), Flip::HORIZONTAL);
            r.with_boundary_mode(BoundaryMode::Wrap, |r| {
                let x = ((self.elapsed * 40.0) as i32).rem_euclid(CANVAS_W);
                r.fill_rect(x, 170, x + 24, 180, Color::rgb(90, 60, 30));
            });
        }

        self.canvas.set_current_layer(self.hud);
        self.canvas.set_pixel_mode(PixelMode::Mask);
        self.canvas.clear(Color::TRANSPARENT);
        let fps = format!("FPS:{}", self.fps.fps());
        self.canvas
            .raster()
            .text(2, 2, &fps, Vec2::splat(1.5), Color::BLACK, TextAlign::Left);
    }

    fn draw(&mut self, viewport: Viewport) {
        self.canvas.swap_buffers();

        self.sprites.set_viewport(viewport);
        let (cx, cy) = (viewport.width * 0.5, viewport.height * 0.5);
        for i in 0..24 {
            let angle = self.elapsed + i as f32 * TAU / 24.0;
            let (x, y) = (cx + angle.cos() * cy * 0.7, cy + angle.sin() * cy * 0.7);
            self.sprites.draw_at(&self.tile_texture, x, y, Vec2::splat(1.0), angle, Flip::NONE, Color::WHITE);
        }
        self.sprites.draw_rect(
            &self.tile_texture,
            Rect::new(8.0, viewport.height - 72.0, 64.0, 64.0),
            Rect::new(0.0, 0.0, 0.5, 0.5),
            Flip::VERTICAL,
            Color::rgba(255, 255, 255, 200),
        );
        self.sprites.flush();

        self.geometry.set_viewport(viewport);
        let pulse = 40.0 + (self.elapsed * 3.0).sin() * 10.0;
        self.geometry.draw_rect(Vec2::new(cx, cy), Vec2::splat(pulse), self.elapsed, Color::rgba(255, 0, 0, 160));
        self.geometry.draw_rect_outline(Vec2::new(cx, cy), Vec2::splat(pulse + 12.0), -self.elapsed, Color::BLACK);
        self.geometry.draw_triangle_outline(
            Vec2::new(cx - 60.0, cy + 60.0),
            Vec2::new(cx + 60.0, cy + 60.0),
            Vec2::new(cx, cy - 60.0),
            Color::BLUE,
        );
        self.geometry.flush();
    }
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let scene = self.scene.get_or_insert_with(|| {
            log::info!("building demo scene");
            Scene::new(ctx.api(), ctx.viewport())
        });
        scene.update(ctx.time.dt);
        ctx.render(Color::BLACK, |viewport| scene.draw(viewport))
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "rasterkit demo".to_string(),
        initial_size: LogicalSize::new(1024.0, 768.0),
        ..Default::default()
    };
    Runtime::run(config, GpuInit::default(), Demo::default())
}

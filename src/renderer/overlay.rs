//! 2D canvas overlay drawn on top of the camera video

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCmd, DrawList};

/// Canvas plus its 2D context, sized in device pixels
pub struct CanvasOverlay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// CSS size the draw commands are expressed in
    pub size: (f32, f32),
    dpr: f64,
}

impl CanvasOverlay {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut overlay = Self {
            canvas,
            ctx,
            size: (1.0, 1.0),
            dpr: 1.0,
        };
        overlay.fit_to_client();
        Ok(overlay)
    }

    /// Match the backing store to the element's CSS size
    pub fn fit_to_client(&mut self) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let css_w = self.canvas.client_width().max(1);
        let css_h = self.canvas.client_height().max(1);
        self.canvas.set_width((css_w as f64 * dpr) as u32);
        self.canvas.set_height((css_h as f64 * dpr) as u32);
        self.size = (css_w as f32, css_h as f32);
        self.dpr = dpr;
        log::debug!("Overlay resized to {}x{} @{}x", css_w, css_h, dpr);
    }

    /// Clear and replay a frame
    pub fn draw(&self, list: &DrawList) {
        let ctx = &self.ctx;
        let _ = ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, self.size.0 as f64, self.size.1 as f64);

        for cmd in &list.commands {
            match cmd {
                DrawCmd::Lines {
                    segments,
                    width,
                    color,
                } => {
                    ctx.begin_path();
                    for [a, b] in segments {
                        ctx.move_to(a.x as f64, a.y as f64);
                        ctx.line_to(b.x as f64, b.y as f64);
                    }
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css_color(color));
                    ctx.stroke();
                }
                DrawCmd::Outline {
                    points,
                    width,
                    color,
                } => {
                    trace(ctx, points);
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css_color(color));
                    ctx.stroke();
                }
                DrawCmd::Fill { points, color } => {
                    trace(ctx, points);
                    ctx.set_fill_style_str(&css_color(color));
                    ctx.fill();
                }
                DrawCmd::Disc {
                    center,
                    radius,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&css_color(color));
                    ctx.fill();
                }
            }
        }
    }
}

/// Closed path through `points`
fn trace(ctx: &CanvasRenderingContext2d, points: &[Vec2]) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x as f64, first.y as f64);
        for p in iter {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.close_path();
    }
}

fn css_color(c: &[f32; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (c[0] * 255.0).round() as u8,
        (c[1] * 255.0).round() as u8,
        (c[2] * 255.0).round() as u8,
        c[3]
    )
}

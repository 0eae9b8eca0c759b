//! Browser drawing surface: [`Surface`] over `CanvasRenderingContext2d`.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::doc::Text;
use crate::hit::TextMeasure;
use crate::icons::IconRegistry;
use crate::render::Surface;

/// A 2D context plus the icon images it can draw.
pub struct WebSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    icons: &'a IconRegistry<HtmlImageElement>,
}

impl<'a> WebSurface<'a> {
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, icons: &'a IconRegistry<HtmlImageElement>) -> Self {
        Self { ctx, icons }
    }
}

impl Surface for WebSurface<'_> {
    type Error = JsValue;

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), JsValue> {
        self.ctx.set_transform(a, b, c, d, e, f)
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.translate(x, y)
    }

    fn rotate(&mut self, radians: f64) -> Result<(), JsValue> {
        self.ctx.rotate(radians)
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.scale(x, y)
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ctx.set_stroke_style_str(style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), JsValue> {
        let dash = js_sys::Array::new();
        for s in segments {
            dash.push(&JsValue::from_f64(*s));
        }
        self.ctx.set_line_dash(&dash)
    }

    fn set_line_cap(&mut self, cap: &str) {
        self.ctx.set_line_cap(cap);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.rect(x, y, w, h);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) -> Result<(), JsValue> {
        self.ctx.arc_with_anticlockwise(x, y, radius, start, end, anticlockwise)
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.fill_text(text, x, y)
    }

    fn draw_icon(&mut self, key: &str, x: f64, y: f64, w: f64, h: f64) -> Result<(), JsValue> {
        match self.icons.get(key) {
            Some(img) if img.complete() && img.natural_width() > 0 => {
                self.ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)
            }
            _ => Ok(()),
        }
    }
}

/// Text measurement through the browser's font engine.
pub struct CanvasTextMeasure {
    ctx: CanvasRenderingContext2d,
}

impl CanvasTextMeasure {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasTextMeasure {
    fn text_width(&self, text: &Text) -> f64 {
        self.ctx.save();
        self.ctx.set_font(&text.font());
        let width = match self.ctx.measure_text(&text.text) {
            Ok(metrics) => metrics.width(),
            Err(_) => crate::hit::ApproxTextMeasure.text_width(text),
        };
        self.ctx.restore();
        width
    }
}

//! Rendering: draws the plan to a 2D drawing surface.
//!
//! This module never touches the browser directly. It draws through the
//! [`Surface`] trait, which the browser build implements over
//! `CanvasRenderingContext2d` (see [`crate::surface`]) and tests implement
//! with a recorder. It receives read-only views of document, camera and UI
//! state and produces pixels; it does not mutate any application state, so
//! redrawing any number of times is safe.
//!
//! Scene order is fixed: rooms (shapes), then wall segments split around
//! their openings, then doors and windows, then everything else.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::camera::{Camera, Point};
use crate::consts::{GUIDE_EXTENT, HANDLE_DRAW_PX, HANDLE_HITBOX_PX};
use crate::doc::{Body, Document, Element, Insertable, Object, Shape, ShapeKind, Text, Wall};
use crate::export::{self, ExportLayout, RASTER_SCALE};
use crate::geom;
use crate::hit::{self, Handle, Placement, TextMeasure};
use crate::input::{SelectionRect, UiState};
use crate::snap::Guide;

const SELECTION_COLOR: &str = "#8bc53f";
const TOGGLE_HANDLE_COLOR: &str = "#f59e0b";
const GUIDE_COLOR: &str = "rgba(255, 0, 255, 0.8)";
const LABEL_COLOR: &str = "#333";

/// A 2D drawing target with the subset of the canvas API the renderer needs.
///
/// Infallible operations return `()`; operations the browser API can reject
/// return `Result`.
pub trait Surface {
    type Error;

    fn save(&mut self);
    fn restore(&mut self);
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), Self::Error>;
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, radians: f64) -> Result<(), Self::Error>;
    fn scale(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;

    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Self::Error>;
    fn set_line_cap(&mut self, cap: &str);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) -> Result<(), Self::Error>;
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;

    /// Draw the icon registered under `key`. Missing or unloaded icons are
    /// skipped without error.
    fn draw_icon(&mut self, key: &str, x: f64, y: f64, w: f64, h: f64) -> Result<(), Self::Error>;
}

/// Viewport geometry for a full-frame draw.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub camera: Camera,
    /// CSS pixels.
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

/// One entry of the ordered scene.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem<'a> {
    Shape(&'a Shape),
    /// A wall, or the part of one between openings.
    WallSegment(Wall),
    Door(&'a Insertable, Placement),
    Window(&'a Insertable, Placement),
    Object(&'a Object),
    Text(&'a Text),
}

/// The document's elements in draw order.
///
/// Walls are split around their doors and windows so openings are left
/// blank. Doors and windows whose host does not resolve are left out.
#[must_use]
pub fn scene_items(doc: &Document) -> Vec<DrawItem<'_>> {
    let mut items = Vec::with_capacity(doc.len());

    for el in doc.elements() {
        if let Body::Shape(s) = &el.body {
            items.push(DrawItem::Shape(s));
        }
    }

    for el in doc.elements() {
        let Body::Wall(wall) = &el.body else {
            continue;
        };
        let length = wall.length();
        if length == 0.0 {
            items.push(DrawItem::WallSegment(wall.clone()));
            continue;
        }
        let mut spans: Vec<(f64, f64)> = doc
            .elements()
            .iter()
            .filter_map(Element::as_insertable)
            .filter(|ins| ins.wall_id == Some(el.id))
            .map(|ins| {
                let half = ins.width / 2.0 / length;
                (ins.position - half, ins.position + half)
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Overlapping or nested openings merge into one gap.
        let mut last: f64 = 0.0;
        for (start, end) in spans {
            if start > last {
                items.push(DrawItem::WallSegment(sub_wall(wall, last, start)));
            }
            last = last.max(end);
        }
        if last < 1.0 {
            items.push(DrawItem::WallSegment(sub_wall(wall, last, 1.0)));
        }
    }

    for el in doc.elements() {
        match &el.body {
            Body::Door(ins) => {
                if let Some(p) = hit::placement(doc, ins) {
                    items.push(DrawItem::Door(ins, p));
                }
            }
            Body::Window(ins) => {
                if let Some(p) = hit::placement(doc, ins) {
                    items.push(DrawItem::Window(ins, p));
                }
            }
            _ => {}
        }
    }

    for el in doc.elements() {
        match &el.body {
            Body::Object(o) => items.push(DrawItem::Object(o)),
            Body::Text(t) => items.push(DrawItem::Text(t)),
            _ => {}
        }
    }

    items
}

fn sub_wall(wall: &Wall, t0: f64, t1: f64) -> Wall {
    let a = wall.point_at(t0);
    let b = wall.point_at(t1);
    Wall { x1: a.x, y1: a.y, x2: b.x, y2: b.y, thickness: wall.thickness }
}

/// Draw the document in scene order, in the surface's current transform.
///
/// # Errors
///
/// Returns the first surface error encountered.
pub fn draw_scene<S: Surface>(s: &mut S, doc: &Document) -> Result<(), S::Error> {
    for item in scene_items(doc) {
        match item {
            DrawItem::Shape(shape) => draw_shape(s, shape)?,
            DrawItem::WallSegment(wall) => draw_wall(s, &wall)?,
            DrawItem::Door(door, p) => {
                s.save();
                enter_placement(s, &p)?;
                draw_door_symbol(s, door, p.thickness)?;
                s.restore();
            }
            DrawItem::Window(window, p) => {
                s.save();
                enter_placement(s, &p)?;
                draw_window_symbol(s, window, p.thickness);
                s.restore();
            }
            DrawItem::Object(obj) => draw_object(s, obj)?,
            DrawItem::Text(text) => draw_text(s, text)?,
        }
    }
    Ok(())
}

/// Draw a full frame: background, scene, guides, selection UI and marquee.
///
/// With `show_selection` off, only the background and scene are drawn; this
/// is the state exports capture.
///
/// # Errors
///
/// Returns the first surface error encountered.
pub fn draw<S: Surface>(
    s: &mut S,
    doc: &Document,
    ui: &UiState,
    view: &View,
    measure: &dyn TextMeasure,
    show_selection: bool,
) -> Result<(), S::Error> {
    let zoom = view.camera.zoom;

    s.set_transform(view.dpr, 0.0, 0.0, view.dpr, 0.0, 0.0)?;
    s.set_fill_style("white");
    s.fill_rect(0.0, 0.0, view.width, view.height);

    s.save();
    s.translate(view.camera.pan_x, view.camera.pan_y)?;
    s.scale(zoom, zoom)?;

    draw_scene(s, doc)?;

    if show_selection {
        draw_guides(s, &ui.guides, zoom)?;
        draw_selection(s, doc, ui, zoom, measure)?;
        if let Some(m) = ui.marquee {
            draw_marquee(s, m, zoom);
        }
    }

    s.restore();
    Ok(())
}

/// Draw the scene into an export raster sized by `layout`.
///
/// The target is expected to be `content_width * RASTER_SCALE` by
/// `content_height * RASTER_SCALE` pixels.
///
/// # Errors
///
/// Returns the first surface error encountered.
pub fn draw_export<S: Surface>(s: &mut S, doc: &Document, layout: &ExportLayout) -> Result<(), S::Error> {
    s.set_fill_style("white");
    s.fill_rect(0.0, 0.0, layout.content_width * RASTER_SCALE, layout.content_height * RASTER_SCALE);
    s.save();
    s.scale(RASTER_SCALE, RASTER_SCALE)?;
    s.translate(layout.origin.x, layout.origin.y)?;
    draw_scene(s, doc)?;
    s.restore();
    Ok(())
}

// =============================================================
// Element renderers
// =============================================================

fn draw_wall<S: Surface>(s: &mut S, wall: &Wall) -> Result<(), S::Error> {
    let Some(poly) = geom::wall_polygon(wall) else {
        return Ok(());
    };
    let half = wall.thickness / 2.0;
    let (a, b) = (wall.start(), wall.end());
    let angle = wall.angle();

    s.set_fill_style("#EAEAEA");
    s.set_stroke_style("#888");
    s.set_line_width(1.0);

    s.begin_path();
    trace_polygon(s, &poly);
    s.arc(a.x, a.y, half, 0.0, TAU, false)?;
    s.arc(b.x, b.y, half, 0.0, TAU, false)?;
    s.fill();

    // Outline with rounded ends.
    s.begin_path();
    s.arc(a.x, a.y, half, angle + FRAC_PI_2, angle + PI + FRAC_PI_2, false)?;
    s.arc(b.x, b.y, half, angle - FRAC_PI_2, angle + FRAC_PI_2, false)?;
    s.close_path();
    s.stroke();
    Ok(())
}

fn draw_door_symbol<S: Surface>(s: &mut S, door: &Insertable, thickness: f64) -> Result<(), S::Error> {
    let flip = door.flip.factor();
    let swing = door.swing.factor();
    let half_t = thickness / 2.0;

    s.set_stroke_style("#666");
    s.set_line_cap("round");

    // Jamb.
    s.set_line_width(3.0);
    s.begin_path();
    s.move_to(0.0, -half_t);
    s.line_to(0.0, half_t);
    s.stroke();

    // Leaf.
    let pivot_y = half_t * flip;
    s.set_line_width(1.5);
    s.begin_path();
    s.move_to(0.0, pivot_y);
    s.line_to(door.width * swing, pivot_y);
    s.stroke();

    // Swing arc.
    s.set_line_dash(&[3.0, 3.0])?;
    s.begin_path();
    if swing > 0.0 {
        s.arc(0.0, pivot_y, door.width, 0.0, -FRAC_PI_2 * flip, flip < 0.0)?;
    } else {
        s.arc(0.0, pivot_y, door.width, PI, PI + FRAC_PI_2 * flip, flip < 0.0)?;
    }
    s.stroke();
    s.set_line_dash(&[])?;
    Ok(())
}

fn draw_window_symbol<S: Surface>(s: &mut S, window: &Insertable, thickness: f64) {
    let hw = window.width / 2.0;
    s.set_fill_style("rgba(173, 216, 230, 0.7)");
    s.set_stroke_style("#888");
    s.set_line_width(1.0);
    s.fill_rect(-hw, -thickness / 2.0, window.width, thickness);
    s.stroke_rect(-hw, -thickness / 2.0, window.width, thickness);

    s.begin_path();
    s.move_to(-hw, 0.0);
    s.line_to(hw, 0.0);
    s.stroke();
}

fn draw_shape<S: Surface>(s: &mut S, shape: &Shape) -> Result<(), S::Error> {
    let f = &shape.frame;
    s.save();
    enter_box(s, f.center(), f.rotation)?;

    s.set_stroke_style(&shape.stroke_color);
    s.set_fill_style(&shape.fill_color);
    s.set_line_width(1.0);
    s.begin_path();
    match shape.kind {
        ShapeKind::Rectangle => s.rect(-f.width / 2.0, -f.height / 2.0, f.width, f.height),
        ShapeKind::Circle => s.arc(0.0, 0.0, (f.width / 2.0).max(0.0), 0.0, TAU, false)?,
        ShapeKind::Triangle => {
            s.move_to(0.0, -f.height / 2.0);
            s.line_to(f.width / 2.0, f.height / 2.0);
            s.line_to(-f.width / 2.0, f.height / 2.0);
            s.close_path();
        }
    }
    if !shape.fill_color.is_empty() && shape.fill_color != "transparent" {
        s.fill();
    }
    s.stroke();

    if !shape.name.is_empty() {
        s.set_font(&format!("bold {}px Montserrat", f.width.min(f.height) / 8.0));
        s.set_fill_style(LABEL_COLOR);
        s.set_text_align("center");
        s.set_text_baseline("middle");
        s.fill_text(&shape.name, 0.0, 0.0)?;
    }
    s.restore();
    Ok(())
}

fn draw_object<S: Surface>(s: &mut S, obj: &Object) -> Result<(), S::Error> {
    let f = &obj.frame;
    s.save();
    enter_box(s, f.center(), f.rotation)?;

    if let Some(v) = obj.vision {
        let half = (v.angle / 2.0).to_radians();
        s.set_fill_style("rgba(239, 68, 68, 0.2)");
        s.set_stroke_style("rgba(239, 68, 68, 0.4)");
        s.set_line_width(1.0);
        s.begin_path();
        s.move_to(0.0, 0.0);
        s.arc(0.0, 0.0, v.range, -half, half, false)?;
        s.close_path();
        s.fill();
        s.stroke();
    }
    s.draw_icon(&obj.sub_type, -f.width / 2.0, -f.height / 2.0, f.width, f.height)?;
    s.restore();
    Ok(())
}

fn draw_text<S: Surface>(s: &mut S, text: &Text) -> Result<(), S::Error> {
    s.save();
    enter_box(s, text.anchor(), text.rotation)?;
    s.set_font(&text.font());
    s.set_fill_style(LABEL_COLOR);
    s.set_text_align("left");
    s.set_text_baseline("top");
    s.fill_text(&text.text, 0.0, 0.0)?;
    s.restore();
    Ok(())
}

// =============================================================
// Overlays
// =============================================================

fn draw_guides<S: Surface>(s: &mut S, guides: &[Guide], zoom: f64) -> Result<(), S::Error> {
    if guides.is_empty() {
        return Ok(());
    }
    s.save();
    s.set_stroke_style(GUIDE_COLOR);
    s.set_line_width(1.0 / zoom);
    s.set_line_dash(&[4.0 / zoom, 4.0 / zoom])?;
    for g in guides {
        s.begin_path();
        match *g {
            Guide::Vertical(x) => {
                s.move_to(x, -GUIDE_EXTENT);
                s.line_to(x, GUIDE_EXTENT);
            }
            Guide::Horizontal(y) => {
                s.move_to(-GUIDE_EXTENT, y);
                s.line_to(GUIDE_EXTENT, y);
            }
        }
        s.stroke();
    }
    s.restore();
    Ok(())
}

fn draw_selection<S: Surface>(
    s: &mut S,
    doc: &Document,
    ui: &UiState,
    zoom: f64,
    measure: &dyn TextMeasure,
) -> Result<(), S::Error> {
    let selected: Vec<&Element> = ui.selection.ids().iter().filter_map(|id| doc.find(id)).collect();
    match selected.as_slice() {
        [] => Ok(()),
        [el] => draw_single_selection(s, doc, el, zoom, measure),
        many => {
            let corners = many.iter().flat_map(|el| export::element_corners(el, measure));
            let Some(b) = bounds_of(corners) else {
                return Ok(());
            };
            s.save();
            s.set_stroke_style(SELECTION_COLOR);
            s.set_line_width(2.0 / zoom);
            s.set_line_dash(&[6.0 / zoom, 3.0 / zoom])?;
            s.stroke_rect(b.0.x, b.0.y, b.1.x - b.0.x, b.1.y - b.0.y);
            s.restore();
            Ok(())
        }
    }
}

fn bounds_of(points: impl Iterator<Item = Point>) -> Option<(Point, Point)> {
    points.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((Point::new(lo.x.min(p.x), lo.y.min(p.y)), Point::new(hi.x.max(p.x), hi.y.max(p.y)))),
    })
}

fn draw_single_selection<S: Surface>(
    s: &mut S,
    doc: &Document,
    el: &Element,
    zoom: f64,
    measure: &dyn TextMeasure,
) -> Result<(), S::Error> {
    let handle_size = HANDLE_DRAW_PX / zoom;
    match &el.body {
        Body::Wall(w) => {
            let size = HANDLE_HITBOX_PX / zoom;
            s.set_fill_style(SELECTION_COLOR);
            for p in [w.start(), w.end()] {
                s.fill_rect(p.x - size / 2.0, p.y - size / 2.0, size, size);
            }
            Ok(())
        }
        Body::Door(ins) | Body::Window(ins) => {
            let Some(p) = hit::placement(doc, ins) else {
                return Ok(());
            };
            s.save();
            enter_placement(s, &p)?;
            s.set_stroke_style(SELECTION_COLOR);
            s.set_line_width(2.0 / zoom);
            s.set_line_dash(&[4.0 / zoom, 2.0 / zoom])?;
            s.stroke_rect(-ins.width / 2.0, -p.thickness / 2.0, ins.width, p.thickness);
            s.set_line_dash(&[])?;
            let is_door = matches!(el.body, Body::Door(_));
            for (handle, pos) in hit::insertable_handle_positions(ins, is_door, p.thickness, zoom) {
                let color = if matches!(handle, Handle::Flip | Handle::Swing) { TOGGLE_HANDLE_COLOR } else { SELECTION_COLOR };
                round_handle(s, pos, handle_size, color, zoom)?;
            }
            s.restore();
            Ok(())
        }
        Body::Shape(Shape { frame, .. }) => box_selection(s, frame.center(), frame.rotation, frame.width, frame.height, zoom),
        Body::Object(o) => {
            let f = &o.frame;
            box_selection(s, f.center(), f.rotation, f.width, f.height, zoom)?;
            if let Some(v) = &o.vision {
                s.save();
                enter_box(s, f.center(), f.rotation)?;
                for (_, pos) in hit::vision_handle_positions(v) {
                    round_handle(s, pos, handle_size, TOGGLE_HANDLE_COLOR, zoom)?;
                }
                s.restore();
            }
            Ok(())
        }
        Body::Text(t) => {
            s.save();
            enter_box(s, t.anchor(), t.rotation)?;
            s.set_stroke_style(SELECTION_COLOR);
            s.set_line_width(2.0 / zoom);
            s.stroke_rect(0.0, 0.0, measure.text_width(t), t.font_size);
            s.restore();
            Ok(())
        }
    }
}

fn box_selection<S: Surface>(s: &mut S, center: Point, rotation: f64, w: f64, h: f64, zoom: f64) -> Result<(), S::Error> {
    let (hw, hh) = (w / 2.0, h / 2.0);
    let size = HANDLE_DRAW_PX / zoom;
    s.save();
    enter_box(s, center, rotation)?;
    s.set_stroke_style(SELECTION_COLOR);
    s.set_line_width(2.0 / zoom);
    s.stroke_rect(-hw, -hh, w, h);

    let grip = hit::rotate_handle_position(hh, zoom);
    s.begin_path();
    s.move_to(0.0, -hh);
    s.line_to(grip.x, grip.y);
    s.stroke();
    s.begin_path();
    s.arc(grip.x, grip.y, 5.0 / zoom, 0.0, TAU, false)?;
    s.set_fill_style("white");
    s.fill();
    s.stroke();

    s.set_fill_style(SELECTION_COLOR);
    for (_, p) in hit::corner_handle_positions(hw, hh) {
        s.fill_rect(p.x - size / 2.0, p.y - size / 2.0, size, size);
    }
    s.restore();
    Ok(())
}

fn round_handle<S: Surface>(s: &mut S, pos: Point, size: f64, color: &str, zoom: f64) -> Result<(), S::Error> {
    s.set_fill_style(color);
    s.set_stroke_style("white");
    s.set_line_width(1.5 / zoom);
    s.begin_path();
    s.arc(pos.x, pos.y, size / 2.0, 0.0, TAU, false)?;
    s.fill();
    s.stroke();
    Ok(())
}

fn draw_marquee<S: Surface>(s: &mut S, m: SelectionRect, zoom: f64) {
    s.save();
    s.set_fill_style("rgba(139, 197, 63, 0.2)");
    s.set_stroke_style("rgba(26, 46, 79, 0.6)");
    s.set_line_width(1.0 / zoom);
    s.fill_rect(m.x, m.y, m.width, m.height);
    s.stroke_rect(m.x, m.y, m.width, m.height);
    s.restore();
}

// =============================================================
// Helpers
// =============================================================

/// Translate to `origin` and rotate by `deg`.
fn enter_box<S: Surface>(s: &mut S, origin: Point, deg: f64) -> Result<(), S::Error> {
    s.translate(origin.x, origin.y)?;
    s.rotate(deg.to_radians())
}

fn enter_placement<S: Surface>(s: &mut S, p: &Placement) -> Result<(), S::Error> {
    enter_box(s, p.center, p.angle_deg)
}

fn trace_polygon<S: Surface>(s: &mut S, points: &[Point]) {
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        s.move_to(first.x, first.y);
    }
    for p in iter {
        s.line_to(p.x, p.y);
    }
    s.close_path();
}

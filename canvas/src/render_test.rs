#![allow(clippy::float_cmp)]

use std::convert::Infallible;

use super::*;
use crate::doc::{ElementId, Frame, Vision};
use crate::hit::ApproxTextMeasure;
use crate::input::Selection;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Save,
    Restore,
    Transform,
    FillStyle(String),
    StrokeStyle(String),
    LineDash(Vec<f64>),
    Font(String),
    MoveTo(f64, f64),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    FillText(String),
    Icon(String),
    Fill,
    Stroke,
    Other,
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl Surface for Recorder {
    type Error = Infallible;

    fn save(&mut self) {
        self.ops.push(Op::Save);
    }
    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }
    fn set_transform(&mut self, _: f64, _: f64, _: f64, _: f64, _: f64, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Transform);
        Ok(())
    }
    fn translate(&mut self, _: f64, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Transform);
        Ok(())
    }
    fn rotate(&mut self, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Transform);
        Ok(())
    }
    fn scale(&mut self, _: f64, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Transform);
        Ok(())
    }
    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(Op::FillStyle(style.into()));
    }
    fn set_stroke_style(&mut self, style: &str) {
        self.ops.push(Op::StrokeStyle(style.into()));
    }
    fn set_line_width(&mut self, _: f64) {
        self.ops.push(Op::Other);
    }
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Infallible> {
        self.ops.push(Op::LineDash(segments.to_vec()));
        Ok(())
    }
    fn set_line_cap(&mut self, _: &str) {
        self.ops.push(Op::Other);
    }
    fn set_font(&mut self, font: &str) {
        self.ops.push(Op::Font(font.into()));
    }
    fn set_text_align(&mut self, _: &str) {
        self.ops.push(Op::Other);
    }
    fn set_text_baseline(&mut self, _: &str) {
        self.ops.push(Op::Other);
    }
    fn begin_path(&mut self) {
        self.ops.push(Op::Other);
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }
    fn line_to(&mut self, _: f64, _: f64) {
        self.ops.push(Op::Other);
    }
    fn close_path(&mut self) {
        self.ops.push(Op::Other);
    }
    fn rect(&mut self, _: f64, _: f64, _: f64, _: f64) {
        self.ops.push(Op::Other);
    }
    fn arc(&mut self, _: f64, _: f64, _: f64, _: f64, _: f64, _: bool) -> Result<(), Infallible> {
        self.ops.push(Op::Other);
        Ok(())
    }
    fn fill(&mut self) {
        self.ops.push(Op::Fill);
    }
    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::FillRect(x, y, w, h));
    }
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::StrokeRect(x, y, w, h));
    }
    fn fill_text(&mut self, text: &str, _: f64, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::FillText(text.into()));
        Ok(())
    }
    fn draw_icon(&mut self, key: &str, _: f64, _: f64, _: f64, _: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Icon(key.into()));
        Ok(())
    }
}

fn wall(doc: &mut Document, x1: f64, y1: f64, x2: f64, y2: f64) -> ElementId {
    doc.add(Element::new(Body::Wall(Wall { x1, y1, x2, y2, thickness: 10.0 })))
}

fn rect_shape(name: &str) -> Element {
    Element::new(Body::Shape(Shape {
        kind: ShapeKind::Rectangle,
        frame: Frame { x: 0.0, y: 0.0, width: 100.0, height: 80.0, rotation: 0.0 },
        stroke_color: "transparent".into(),
        fill_color: "#ccc".into(),
        name: name.into(),
    }))
}

fn camera_object() -> Element {
    Element::new(Body::Object(Object {
        sub_type: "camera".into(),
        frame: Frame { x: 10.0, y: 10.0, width: 50.0, height: 50.0, rotation: 0.0 },
        name: String::new(),
        vision: Some(Vision { range: 150.0, angle: 60.0 }),
    }))
}

fn segments(items: &[DrawItem<'_>]) -> Vec<(f64, f64)> {
    items
        .iter()
        .filter_map(|item| match item {
            DrawItem::WallSegment(w) => Some((round(w.x1), round(w.x2))),
            _ => None,
        })
        .collect()
}

fn round(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn view() -> View {
    View { camera: Camera::default(), width: 800.0, height: 600.0, dpr: 1.0 }
}

// =============================================================
// Scene order
// =============================================================

#[test]
fn rooms_draw_before_walls_and_equipment_last() {
    let mut doc = Document::new();
    doc.add(camera_object());
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.5, 60.0))));
    doc.add(rect_shape("Lobby"));

    let items = scene_items(&doc);
    assert!(matches!(items[0], DrawItem::Shape(_)));
    assert!(matches!(items[1], DrawItem::WallSegment(_)));
    assert!(matches!(items[2], DrawItem::WallSegment(_)));
    assert!(matches!(items[3], DrawItem::Door(..)));
    assert!(matches!(items[4], DrawItem::Object(_)));
    assert_eq!(items.len(), 5);
}

#[test]
fn door_placement_follows_host_wall() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 0.0, 200.0);
    doc.add(Element::new(Body::Window(Insertable::new(w, 0.25, 80.0))));
    let items = scene_items(&doc);
    let Some(DrawItem::Window(_, p)) = items.iter().find(|i| matches!(i, DrawItem::Window(..))) else {
        panic!("window missing");
    };
    assert_eq!(p.center, Point::new(0.0, 50.0));
    assert!((p.angle_deg - 90.0).abs() < 1e-9);
}

// =============================================================
// Wall splitting
// =============================================================

#[test]
fn wall_is_split_around_centered_opening() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.5, 60.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 70.0), (130.0, 200.0)]);
}

#[test]
fn openings_are_sorted_by_position() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 400.0, 0.0);
    doc.add(Element::new(Body::Window(Insertable::new(w, 0.75, 40.0))));
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.25, 40.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 80.0), (120.0, 280.0), (320.0, 400.0)]);
}

#[test]
fn overlapping_openings_leave_one_gap() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 100.0, 0.0);
    doc.add(Element::new(Body::Window(Insertable::new(w, 0.4, 40.0))));
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.35, 10.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 20.0), (60.0, 100.0)]);
}

#[test]
fn nested_opening_does_not_shrink_the_gap() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Window(Insertable::new(w, 0.5, 100.0))));
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.45, 20.0))));
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.7, 20.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 50.0), (150.0, 200.0)]);
}

#[test]
fn opening_at_wall_start_leaves_single_tail_segment() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.0, 60.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(30.0, 200.0)]);
}

#[test]
fn opening_covering_wall_end_leaves_no_tail() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 100.0, 0.0);
    doc.add(Element::new(Body::Window(Insertable::new(w, 1.0, 80.0))));
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 60.0)]);
}

#[test]
fn wall_without_openings_is_one_segment() {
    let mut doc = Document::new();
    wall(&mut doc, 0.0, 0.0, 100.0, 0.0);
    assert_eq!(segments(&scene_items(&doc)), vec![(0.0, 100.0)]);
}

#[test]
fn zero_length_wall_draws_nothing() {
    let mut doc = Document::new();
    wall(&mut doc, 5.0, 5.0, 5.0, 5.0);
    assert_eq!(scene_items(&doc).len(), 1);
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    assert!(s.ops.is_empty());
}

#[test]
fn unattached_insertable_is_skipped() {
    let mut doc = Document::new();
    let mut door = Insertable::new(uuid::Uuid::new_v4(), 0.5, 60.0);
    door.wall_id = None;
    doc.add(Element::new(Body::Door(door)));
    assert!(scene_items(&doc).is_empty());
}

// =============================================================
// Element drawing
// =============================================================

#[test]
fn object_draws_cone_then_icon() {
    let mut doc = Document::new();
    doc.add(camera_object());
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    let cone = s.ops.iter().position(|op| *op == Op::FillStyle("rgba(239, 68, 68, 0.2)".into()));
    let icon = s.ops.iter().position(|op| *op == Op::Icon("camera".into()));
    assert!(cone.unwrap() < icon.unwrap());
}

#[test]
fn shape_name_is_drawn_bold_and_scaled() {
    let mut doc = Document::new();
    doc.add(rect_shape("Office"));
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    assert!(s.ops.contains(&Op::Font("bold 10px Montserrat".into())));
    assert!(s.ops.contains(&Op::FillText("Office".into())));
}

#[test]
fn transparent_shape_is_not_filled() {
    let mut doc = Document::new();
    let mut el = rect_shape("");
    if let Body::Shape(s) = &mut el.body {
        s.fill_color = "transparent".into();
    }
    doc.add(el);
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    assert!(!s.ops.contains(&Op::Fill));
    assert!(s.ops.contains(&Op::Stroke));
}

#[test]
fn text_uses_its_font() {
    let mut doc = Document::new();
    doc.add(Element::new(Body::Text(Text {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        text: "Hall".into(),
        font_family: "Arial".into(),
        font_size: 24.0,
    })));
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    assert!(s.ops.contains(&Op::Font("24px Arial".into())));
    assert!(s.ops.contains(&Op::FillText("Hall".into())));
}

#[test]
fn door_swing_arc_is_dashed_then_reset() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.5, 60.0))));
    let mut s = Recorder::default();
    draw_scene(&mut s, &doc).unwrap();
    let dashes: Vec<&Op> = s.ops.iter().filter(|op| matches!(op, Op::LineDash(_))).collect();
    assert_eq!(dashes, vec![&Op::LineDash(vec![3.0, 3.0]), &Op::LineDash(vec![])]);
}

// =============================================================
// Full frame
// =============================================================

#[test]
fn frame_starts_with_white_background() {
    let doc = Document::new();
    let mut s = Recorder::default();
    draw(&mut s, &doc, &UiState::default(), &view(), &ApproxTextMeasure, true).unwrap();
    assert_eq!(s.ops[1], Op::FillStyle("white".into()));
    assert_eq!(s.ops[2], Op::FillRect(0.0, 0.0, 800.0, 600.0));
}

#[test]
fn drawing_is_idempotent_and_read_only() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    doc.add(Element::new(Body::Door(Insertable::new(w, 0.5, 60.0))));
    doc.add(camera_object());
    let before = doc.clone();
    let mut ui = UiState::default();
    ui.selection.set_single(w);

    let mut first = Recorder::default();
    let mut second = Recorder::default();
    draw(&mut first, &doc, &ui, &view(), &ApproxTextMeasure, true).unwrap();
    draw(&mut second, &doc, &ui, &view(), &ApproxTextMeasure, true).unwrap();
    assert_eq!(first.ops, second.ops);
    assert_eq!(doc, before);
}

#[test]
fn selection_overlays_hidden_when_disabled() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    let mut ui = UiState::default();
    ui.selection.set_single(w);
    ui.guides.push(Guide::Vertical(0.0));
    ui.marquee = Some(SelectionRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 });

    let mut s = Recorder::default();
    draw(&mut s, &doc, &ui, &view(), &ApproxTextMeasure, false).unwrap();
    assert!(!s.ops.contains(&Op::FillStyle(SELECTION_COLOR.into())));
    assert!(!s.ops.contains(&Op::StrokeStyle(GUIDE_COLOR.into())));
}

#[test]
fn selected_wall_shows_endpoint_squares_sized_by_zoom() {
    let mut doc = Document::new();
    let w = wall(&mut doc, 0.0, 0.0, 200.0, 0.0);
    let mut ui = UiState::default();
    ui.selection.set_single(w);
    let mut v = view();
    v.camera.zoom = 2.0;

    let mut s = Recorder::default();
    draw(&mut s, &doc, &ui, &v, &ApproxTextMeasure, true).unwrap();
    assert!(s.ops.contains(&Op::FillRect(-2.5, -2.5, 5.0, 5.0)));
    assert!(s.ops.contains(&Op::FillRect(197.5, -2.5, 5.0, 5.0)));
}

#[test]
fn multi_selection_draws_dashed_bounding_box() {
    let mut doc = Document::new();
    let a = wall(&mut doc, 0.0, 0.0, 100.0, 0.0);
    let b = wall(&mut doc, 50.0, 20.0, 50.0, 120.0);
    let mut ui = UiState { selection: Selection::default(), ..UiState::default() };
    ui.selection.set([a, b]);

    let mut s = Recorder::default();
    draw(&mut s, &doc, &ui, &view(), &ApproxTextMeasure, true).unwrap();
    assert!(s.ops.contains(&Op::StrokeRect(0.0, 0.0, 100.0, 120.0)));
    assert!(s.ops.contains(&Op::LineDash(vec![6.0, 3.0])));
}

#[test]
fn guides_span_the_plan() {
    let doc = Document::new();
    let ui = UiState { guides: vec![Guide::Horizontal(40.0)], ..UiState::default() };
    let mut s = Recorder::default();
    draw(&mut s, &doc, &ui, &view(), &ApproxTextMeasure, true).unwrap();
    assert!(s.ops.contains(&Op::MoveTo(-GUIDE_EXTENT, 40.0)));
}

#[test]
fn marquee_is_drawn_last() {
    let doc = Document::new();
    let ui = UiState {
        marquee: Some(SelectionRect { x: 5.0, y: 5.0, width: 20.0, height: 30.0 }),
        ..UiState::default()
    };
    let mut s = Recorder::default();
    draw(&mut s, &doc, &ui, &view(), &ApproxTextMeasure, true).unwrap();
    let last_rect = s.ops.iter().rev().find(|op| matches!(op, Op::StrokeRect(..)));
    assert_eq!(last_rect, Some(&Op::StrokeRect(5.0, 5.0, 20.0, 30.0)));
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_raster_is_scaled_content_size() {
    let mut doc = Document::new();
    wall(&mut doc, 0.0, 0.0, 100.0, 0.0);
    let layout = ExportLayout::compute(&doc, &ApproxTextMeasure).unwrap();
    let mut s = Recorder::default();
    draw_export(&mut s, &doc, &layout).unwrap();
    assert_eq!(s.ops[1], Op::FillRect(0.0, 0.0, 600.0, 300.0));
    assert!(!s.ops.contains(&Op::FillStyle(SELECTION_COLOR.into())));
}

#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
    Element::new(Body::Wall(Wall { x1, y1, x2, y2, thickness: 10.0 }))
}

fn door_on(wall_id: ElementId, position: f64) -> Element {
    Element::new(Body::Door(Insertable::new(wall_id, position, 60.0)))
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(Body::Shape(Shape {
        kind: ShapeKind::Rectangle,
        frame: Frame { x, y, width: w, height: h, rotation: 0.0 },
        stroke_color: "transparent".into(),
        fill_color: "#ccc".into(),
        name: String::new(),
    }))
}

fn text(x: f64, y: f64) -> Element {
    Element::new(Body::Text(Text {
        x,
        y,
        rotation: 0.0,
        text: "Hall".into(),
        font_family: "Montserrat".into(),
        font_size: 16.0,
    }))
}

// =============================================================
// Side
// =============================================================

#[test]
fn side_factor_and_flip() {
    assert_eq!(Side::Positive.factor(), 1.0);
    assert_eq!(Side::Negative.factor(), -1.0);
    assert_eq!(Side::Positive.flipped(), Side::Negative);
    assert_eq!(Side::Negative.flipped().flipped(), Side::Negative);
}

#[test]
fn side_serializes_as_number() {
    assert_eq!(serde_json::to_value(Side::Negative).unwrap(), json!(-1.0));
    let back: Side = serde_json::from_value(json!(-1)).unwrap();
    assert_eq!(back, Side::Negative);
    let back: Side = serde_json::from_value(json!(1)).unwrap();
    assert_eq!(back, Side::Positive);
}

// =============================================================
// Wall geometry
// =============================================================

#[test]
fn wall_length_angle_and_point_at() {
    let Body::Wall(w) = wall(0.0, 0.0, 0.0, 100.0).body else {
        panic!("expected wall");
    };
    assert_eq!(w.length(), 100.0);
    assert!((w.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert_eq!(w.point_at(0.25), Point::new(0.0, 25.0));
}

#[test]
fn wall_project_is_unclamped() {
    let w = Wall { x1: 0.0, y1: 0.0, x2: 100.0, y2: 0.0, thickness: 10.0 };
    assert_eq!(w.project(Point::new(50.0, 30.0)), Some(0.5));
    assert_eq!(w.project(Point::new(-50.0, 0.0)), Some(-0.5));
}

#[test]
fn zero_length_wall_has_no_direction() {
    let w = Wall { x1: 5.0, y1: 5.0, x2: 5.0, y2: 5.0, thickness: 10.0 };
    assert!(w.direction().is_none());
    assert!(w.project(Point::new(0.0, 0.0)).is_none());
}

// =============================================================
// Serde
// =============================================================

#[test]
fn wall_serializes_with_type_tag() {
    let el = wall(0.0, 0.0, 100.0, 0.0);
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["type"], "wall");
    assert_eq!(v["x2"], 100.0);
    assert_eq!(v["thickness"], 10.0);
    assert_eq!(v["id"], el.id.to_string());
}

#[test]
fn door_uses_camel_case_wall_id() {
    let host = uuid::Uuid::new_v4();
    let el = door_on(host, 0.5);
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["type"], "door");
    assert_eq!(v["wallId"], host.to_string());
    assert_eq!(v["flip"], 1.0);
}

#[test]
fn shape_parses_sub_type_and_defaults() {
    let v = json!({
        "id": uuid::Uuid::new_v4(),
        "type": "shape",
        "subType": "triangle",
        "x": 10, "y": 20, "width": 200, "height": 100
    });
    let el: Element = serde_json::from_value(v).unwrap();
    let Body::Shape(shape) = el.body else {
        panic!("expected shape");
    };
    assert_eq!(shape.kind, ShapeKind::Triangle);
    assert_eq!(shape.frame.rotation, 0.0);
    assert_eq!(shape.fill_color, DEFAULT_SHAPE_FILL);
    assert!(shape.name.is_empty());
}

#[test]
fn object_vision_is_optional() {
    let v = json!({
        "id": uuid::Uuid::new_v4(),
        "type": "object",
        "subType": "siren",
        "x": 0, "y": 0, "width": 50, "height": 50
    });
    let el: Element = serde_json::from_value(v).unwrap();
    let Body::Object(obj) = &el.body else {
        panic!("expected object");
    };
    assert!(obj.vision.is_none());
    let out = serde_json::to_value(&el).unwrap();
    assert!(out.get("vision").is_none());
}

#[test]
fn unknown_type_is_rejected() {
    let v = json!({ "id": uuid::Uuid::new_v4(), "type": "stairs" });
    assert!(serde_json::from_value::<Element>(v).is_err());
}

// =============================================================
// Document store
// =============================================================

#[test]
fn new_document_is_untitled_portrait() {
    let doc = Document::new();
    assert!(doc.is_empty());
    assert_eq!(doc.project_name, "Untitled Project");
    assert_eq!(doc.orientation, Orientation::Portrait);
}

#[test]
fn add_keeps_insertion_order() {
    let mut doc = Document::new();
    let a = doc.add(rect(0.0, 0.0, 10.0, 10.0));
    let b = doc.add(text(5.0, 5.0));
    let ids: Vec<_> = doc.elements().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn add_reassigns_colliding_id() {
    let mut doc = Document::new();
    let el = rect(0.0, 0.0, 10.0, 10.0);
    let dup = el.clone();
    let first = doc.add(el);
    let second = doc.add(dup);
    assert_ne!(first, second);
    assert_eq!(doc.len(), 2);
}

#[test]
fn add_clamps_insertable_position() {
    let mut doc = Document::new();
    let w = doc.add(wall(0.0, 0.0, 100.0, 0.0));
    let mut d = door_on(w, 0.5);
    if let Some(ins) = d.as_insertable_mut() {
        ins.position = 1.7;
    }
    let id = doc.add(d);
    assert_eq!(doc.find(&id).and_then(Element::as_insertable).map(|i| i.position), Some(1.0));
}

#[test]
fn find_missing_returns_none() {
    let doc = Document::new();
    assert!(doc.find(&uuid::Uuid::new_v4()).is_none());
}

#[test]
fn of_type_filters_by_kind() {
    let mut doc = Document::new();
    doc.add(wall(0.0, 0.0, 100.0, 0.0));
    doc.add(rect(0.0, 0.0, 10.0, 10.0));
    doc.add(wall(0.0, 0.0, 0.0, 100.0));
    assert_eq!(doc.of_type(ElementKind::Wall).count(), 2);
    assert_eq!(doc.of_type(ElementKind::Text).count(), 0);
}

#[test]
fn host_wall_resolves_only_walls() {
    let mut doc = Document::new();
    let w = doc.add(wall(0.0, 0.0, 100.0, 0.0));
    let r = doc.add(rect(0.0, 0.0, 10.0, 10.0));
    let on_wall = Insertable::new(w, 0.5, 60.0);
    let on_rect = Insertable::new(r, 0.5, 60.0);
    assert!(doc.host_wall(&on_wall).is_some());
    assert!(doc.host_wall(&on_rect).is_none());
}

// =============================================================
// Removal
// =============================================================

#[test]
fn remove_wall_cascades_to_hosted_insertables() {
    let mut doc = Document::new();
    let w = doc.add(wall(0.0, 0.0, 100.0, 0.0));
    let other = doc.add(wall(0.0, 50.0, 100.0, 50.0));
    let d = doc.add(door_on(w, 0.5));
    let keep = doc.add(door_on(other, 0.5));

    let removed = doc.remove(&[w]);
    assert_eq!(removed, vec![w, d]);
    assert!(doc.contains(&other));
    assert!(doc.contains(&keep));
    assert_eq!(doc.len(), 2);
}

#[test]
fn remove_door_leaves_wall() {
    let mut doc = Document::new();
    let w = doc.add(wall(0.0, 0.0, 100.0, 0.0));
    let d = doc.add(door_on(w, 0.5));
    assert_eq!(doc.remove(&[d]), vec![d]);
    assert!(doc.contains(&w));
}

#[test]
fn remove_unknown_id_is_noop() {
    let mut doc = Document::new();
    doc.add(rect(0.0, 0.0, 10.0, 10.0));
    assert!(doc.remove(&[uuid::Uuid::new_v4()]).is_empty());
    assert_eq!(doc.len(), 1);
}

// =============================================================
// Patches
// =============================================================

#[test]
fn update_applies_only_to_listed_ids() {
    let mut doc = Document::new();
    let a = doc.add(rect(0.0, 0.0, 10.0, 10.0));
    let b = doc.add(rect(0.0, 0.0, 10.0, 10.0));
    let patch = ElementPatch { name: Some("Kitchen".into()), ..Default::default() };
    assert_eq!(doc.update(&[a], &patch), 1);

    let name_of = |id| match &doc.find(&id).map(|e| &e.body) {
        Some(Body::Shape(s)) => s.name.clone(),
        _ => String::from("?"),
    };
    assert_eq!(name_of(a), "Kitchen");
    assert_eq!(name_of(b), "");
}

#[test]
fn patch_ignores_irrelevant_fields() {
    let mut el = wall(0.0, 0.0, 100.0, 0.0);
    let patch = ElementPatch { fill_color: Some("red".into()), ..Default::default() };
    assert!(!patch.apply(&mut el));
}

#[test]
fn patch_wall_thickness() {
    let mut el = wall(0.0, 0.0, 100.0, 0.0);
    let patch = ElementPatch { thickness: Some(25.0), ..Default::default() };
    assert!(patch.apply(&mut el));
    assert_eq!(el.as_wall().map(|w| w.thickness), Some(25.0));
}

#[test]
fn patch_box_size_respects_minimum() {
    let mut el = rect(0.0, 0.0, 100.0, 100.0);
    let patch = ElementPatch { width: Some(2.0), height: Some(40.0), ..Default::default() };
    assert!(patch.apply(&mut el));
    let frame = el.frame().cloned().unwrap();
    assert_eq!(frame.width, MIN_BOX_SIZE);
    assert_eq!(frame.height, 40.0);
}

#[test]
fn patch_door_width_respects_minimum() {
    let mut el = door_on(uuid::Uuid::new_v4(), 0.5);
    let patch = ElementPatch { width: Some(5.0), ..Default::default() };
    assert!(patch.apply(&mut el));
    assert_eq!(el.as_insertable().map(|i| i.width), Some(MIN_INSERTABLE_WIDTH));
}

#[test]
fn patch_text_fields() {
    let mut el = text(0.0, 0.0);
    let patch = ElementPatch {
        text: Some("Lobby".into()),
        font_size: Some(24.0),
        font_family: Some("Arial".into()),
        ..Default::default()
    };
    assert!(patch.apply(&mut el));
    let Body::Text(t) = &el.body else {
        panic!("expected text");
    };
    assert_eq!(t.text, "Lobby");
    assert_eq!(t.font(), "24px Arial");
}

#[test]
fn patch_same_value_reports_unchanged() {
    let mut el = wall(0.0, 0.0, 100.0, 0.0);
    let patch = ElementPatch { thickness: Some(10.0), ..Default::default() };
    assert!(!patch.apply(&mut el));
}

// =============================================================
// Translation
// =============================================================

#[test]
fn translate_moves_wall_endpoints_together() {
    let mut el = wall(0.0, 0.0, 100.0, 0.0);
    assert!(el.translate(5.0, -5.0));
    let w = el.as_wall().cloned().unwrap();
    assert_eq!((w.x1, w.y1, w.x2, w.y2), (5.0, -5.0, 105.0, -5.0));
}

#[test]
fn translate_refuses_insertables() {
    let mut el = door_on(uuid::Uuid::new_v4(), 0.5);
    assert!(!el.translate(5.0, 5.0));
}

// =============================================================
// Repair
// =============================================================

#[test]
fn repair_drops_dangling_insertables() {
    let mut doc = Document::new();
    let w = doc.add(wall(0.0, 0.0, 100.0, 0.0));
    doc.add(door_on(w, 0.5));
    let orphan = doc.add(door_on(uuid::Uuid::new_v4(), 0.5));
    assert_eq!(doc.dangling_insertables(), vec![orphan]);
    assert_eq!(doc.repair(), 1);
    assert!(!doc.contains(&orphan));
    assert_eq!(doc.len(), 2);
}

#[test]
fn from_parts_dedupes_ids() {
    let el = rect(0.0, 0.0, 10.0, 10.0);
    let doc = Document::from_parts(vec![el.clone(), el], "Shop".into(), Orientation::Landscape);
    assert_eq!(doc.len(), 2);
    assert_ne!(doc.elements()[0].id, doc.elements()[1].id);
    assert_eq!(doc.project_name, "Shop");
}

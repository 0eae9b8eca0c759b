use serde_json::json;

use super::*;

const WALL_A: &str = "6f1c1d44-1f8e-4a0e-9b6f-2d3c4b5a6978";
const WALL_B: &str = "0b7e5e38-5c2a-4f55-8d0e-7a1b2c3d4e5f";
const MISSING: &str = "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee";

fn plan() -> serde_json::Value {
    json!({
        "projectName": "Corner Shop",
        "orientation": "landscape",
        "elements": [
            { "id": WALL_A, "type": "wall", "x1": 0, "y1": 0, "x2": 400, "y2": 0, "thickness": 10 },
            { "id": WALL_B, "type": "wall", "x1": 400, "y1": 0, "x2": 400, "y2": 300, "thickness": 10 },
            { "id": "11111111-1111-4111-8111-111111111111", "type": "door", "wallId": WALL_A, "position": 0.5, "width": 60, "flip": 1, "swing": -1 },
            { "id": "22222222-2222-4222-8222-222222222222", "type": "window", "wallId": WALL_B, "position": 0.3, "width": 80 },
            { "id": "33333333-3333-4333-8333-333333333333", "type": "object", "subType": "camera", "x": 10, "y": 10, "width": 50, "height": 50 },
            { "id": "44444444-4444-4444-8444-444444444444", "type": "object", "subType": "siren", "x": 100, "y": 10, "width": 50, "height": 50 },
            { "id": "55555555-5555-4555-8555-555555555555", "type": "object", "subType": "camera", "x": 200, "y": 10, "width": 50, "height": 50 },
            { "id": "66666666-6666-4666-8666-666666666666", "type": "text", "x": 20, "y": 200, "text": "Stock", "fontFamily": "Arial", "fontSize": 20 }
        ]
    })
}

fn doc() -> Document {
    persist::parse_document(&plan().to_string()).unwrap()
}

// =============================================================
// info
// =============================================================

#[test]
fn info_counts_each_kind() {
    let report = info(&doc());
    assert_eq!(report.project_name, "Corner Shop");
    assert_eq!(report.orientation, Orientation::Landscape);
    assert_eq!(report.elements, 8);
    assert_eq!(
        report.counts,
        ElementCounts { walls: 2, doors: 1, windows: 1, shapes: 0, objects: 3, texts: 1 }
    );
}

#[test]
fn info_serializes_camel_case() {
    let v = serde_json::to_value(info(&doc())).unwrap();
    assert_eq!(v["projectName"], "Corner Shop");
    assert_eq!(v["orientation"], "landscape");
    assert_eq!(v["counts"]["objects"], 3);
}

// =============================================================
// bounds and legend
// =============================================================

#[test]
fn bounds_cover_walls_and_objects() {
    let layout = bounds(&doc()).unwrap();
    assert_eq!(layout.bounds.min_x, 0.0);
    assert_eq!(layout.bounds.min_y, 0.0);
    assert_eq!(layout.bounds.max_x, 400.0);
    assert_eq!(layout.bounds.max_y, 300.0);
    assert_eq!((layout.page_width_mm, layout.page_height_mm), (297.0, 210.0));
}

#[test]
fn bounds_of_empty_plan_is_an_error() {
    assert_eq!(bounds(&Document::new()), Err(ExportError::Empty));
}

#[test]
fn legend_counts_in_first_use_order() {
    let rows = legend(&doc());
    let keys: Vec<(&str, usize)> = rows.iter().map(|r| (r.key.as_str(), r.count)).collect();
    assert_eq!(keys, vec![("camera", 2), ("siren", 1)]);
}

// =============================================================
// repair
// =============================================================

#[test]
fn repair_drops_dangling_and_clamps() {
    let mut raw = plan();
    let elements = raw["elements"].as_array_mut().unwrap();
    elements.push(json!({ "id": "77777777-7777-4777-8777-777777777777", "type": "door", "wallId": MISSING, "position": 0.5, "width": 60 }));
    elements.push(json!({ "id": "88888888-8888-4888-8888-888888888888", "type": "window", "wallId": WALL_A, "position": 1.4, "width": 80 }));

    let outcome = repair(&raw.to_string()).unwrap();
    assert_eq!(outcome.dropped, 1);
    assert_eq!(outcome.clamped, 1);

    let fixed = persist::parse_document(&outcome.json).unwrap();
    assert_eq!(fixed.len(), 9);
    assert!(fixed.dangling_insertables().is_empty());
    let max_position = fixed.elements().iter().filter_map(|el| el.as_insertable()).map(|i| i.position).fold(0.0, f64::max);
    assert_eq!(max_position, 1.0);
}

#[test]
fn repair_of_clean_plan_changes_nothing() {
    let outcome = repair(&plan().to_string()).unwrap();
    assert_eq!((outcome.dropped, outcome.clamped), (0, 0));
    assert_eq!(persist::parse_document(&outcome.json).unwrap(), doc());
}

#[test]
fn repair_rejects_garbage() {
    assert!(matches!(repair("{ nope"), Err(PersistError::Malformed(_))));
}

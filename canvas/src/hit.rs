//! Hit-testing: which element, and which handle of it, lies under a point.
//!
//! All inputs are in document space. Handle hitboxes are specified in screen
//! pixels and divided by the current zoom, so their on-screen size stays
//! constant regardless of zoom. Nothing here mutates the document; absence is
//! always expressed as `None`.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::{FLIP_HANDLE_OFFSET_PX, HANDLE_HITBOX_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{Body, Document, Element, ElementId, Frame, Insertable, Object, Shape, ShapeKind, Text, Vision};
use crate::geom;

/// Which end of a wall, or of a door/window opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallEnd {
    Start,
    End,
}

/// Corner of a box element, in its unrotated local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Self; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    #[must_use]
    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// A manipulation hotspot on a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Wall endpoint drag.
    WallEndpoint(WallEnd),
    /// Door/window width resize.
    InsertableResize(WallEnd),
    /// Door leaf side toggle.
    Flip,
    /// Door hinge side toggle.
    Swing,
    /// Box corner resize.
    Corner(Corner),
    /// Box rotation grip.
    Rotate,
    /// Vision cone reach.
    VisionRange,
    /// Vision cone aperture.
    VisionAngle,
}

impl Handle {
    /// CSS cursor to show while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::WallEndpoint(_) | Self::VisionRange | Self::VisionAngle => "crosshair",
            Self::InsertableResize(_) => "ew-resize",
            Self::Flip | Self::Swing => "pointer",
            Self::Corner(Corner::TopLeft | Corner::BottomRight) => "nwse-resize",
            Self::Corner(Corner::TopRight | Corner::BottomLeft) => "nesw-resize",
            Self::Rotate => "grab",
        }
    }
}

/// Text width measurement, supplied by the host canvas in the browser.
pub trait TextMeasure {
    /// Rendered width of `text` in document units.
    fn text_width(&self, text: &Text) -> f64;
}

/// Width estimate for headless use: a fixed average glyph advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &Text) -> f64 {
        0.6 * text.font_size * text.text.chars().count() as f64
    }
}

/// Where a door or window sits: its center and the host wall's direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: Point,
    /// Host wall direction in degrees.
    pub angle_deg: f64,
    /// Host wall thickness.
    pub thickness: f64,
}

impl Placement {
    #[must_use]
    pub fn to_local(&self, p: Point) -> Point {
        geom::to_local(p, self.center, self.angle_deg)
    }

    #[must_use]
    pub fn to_world(&self, local: Point) -> Point {
        geom::to_world(local, self.center, self.angle_deg)
    }
}

/// Resolve an insertable against its host wall. Unattached insertables and
/// zero-length hosts have no placement.
#[must_use]
pub fn placement(doc: &Document, ins: &Insertable) -> Option<Placement> {
    let wall = doc.host_wall(ins)?;
    wall.direction()?;
    Some(Placement {
        center: wall.point_at(ins.position),
        angle_deg: wall.angle().to_degrees(),
        thickness: wall.thickness,
    })
}

/// Representative point of an element: box center, wall midpoint, text
/// anchor, or the insertable's position on its host.
#[must_use]
pub fn element_center(doc: &Document, el: &Element) -> Option<Point> {
    match &el.body {
        Body::Wall(w) => Some(w.point_at(0.5)),
        Body::Door(i) | Body::Window(i) => placement(doc, i).map(|p| p.center),
        Body::Shape(Shape { frame, .. }) | Body::Object(Object { frame, .. }) => Some(frame.center()),
        Body::Text(t) => Some(t.anchor()),
    }
}

// ── Handle layout ───────────────────────────────────────────────

/// Corner handle positions in the local frame of a box with the given half extents.
#[must_use]
pub fn corner_handle_positions(hw: f64, hh: f64) -> [(Corner, Point); 4] {
    Corner::ALL.map(|c| {
        let x = if c.is_left() { -hw } else { hw };
        let y = if c.is_top() { -hh } else { hh };
        (c, Point::new(x, y))
    })
}

/// Rotate grip position in the local frame: above the top edge.
#[must_use]
pub fn rotate_handle_position(hh: f64, zoom: f64) -> Point {
    Point::new(0.0, -hh - ROTATE_HANDLE_OFFSET_PX / zoom)
}

/// Handle positions for a door or window, in its placement's local frame.
/// Flip and swing only exist on doors.
#[must_use]
pub fn insertable_handle_positions(ins: &Insertable, is_door: bool, thickness: f64, zoom: f64) -> Vec<(Handle, Point)> {
    let hw = ins.width / 2.0;
    let mut handles = vec![
        (Handle::InsertableResize(WallEnd::Start), Point::new(-hw, 0.0)),
        (Handle::InsertableResize(WallEnd::End), Point::new(hw, 0.0)),
    ];
    if is_door {
        let flip = ins.flip.factor();
        handles.push((Handle::Flip, Point::new(0.0, (thickness / 2.0 + FLIP_HANDLE_OFFSET_PX / zoom) * flip)));
        handles.push((Handle::Swing, Point::new(hw / 2.0 * ins.swing.factor(), (thickness / 2.0 + hw / 2.0) * flip)));
    }
    handles
}

/// Vision cone handle positions in the object's local frame: the range grip
/// on the axis and one aperture grip on each cone edge.
#[must_use]
pub fn vision_handle_positions(vision: &Vision) -> [(Handle, Point); 3] {
    let half = (vision.angle / 2.0).to_radians();
    let (sin, cos) = half.sin_cos();
    [
        (Handle::VisionRange, Point::new(vision.range, 0.0)),
        (Handle::VisionAngle, Point::new(vision.range * cos, vision.range * sin)),
        (Handle::VisionAngle, Point::new(vision.range * cos, -vision.range * sin)),
    ]
}

// ── Element hit-testing ─────────────────────────────────────────

/// Topmost element under `pt`, walking the document in reverse order.
#[must_use]
pub fn element_at_point<'a>(doc: &'a Document, pt: Point, measure: &dyn TextMeasure) -> Option<&'a Element> {
    doc.elements().iter().rev().find(|el| element_contains(doc, el, pt, measure))
}

/// Whether `pt` lies on `el` under its type-specific test.
#[must_use]
pub fn element_contains(doc: &Document, el: &Element, pt: Point, measure: &dyn TextMeasure) -> bool {
    match &el.body {
        Body::Wall(w) => w.direction().is_some() && geom::distance_to_segment(pt, w.start(), w.end()) < w.thickness / 2.0,
        Body::Door(i) | Body::Window(i) => placement(doc, i).is_some_and(|p| {
            let local = p.to_local(pt);
            local.length() < (i.width / 2.0).max(p.thickness)
        }),
        Body::Text(t) => {
            let local = geom::to_local(pt, t.anchor(), t.rotation);
            let width = measure.text_width(t);
            (0.0..=width).contains(&local.x) && (0.0..=t.font_size).contains(&local.y)
        }
        Body::Shape(s) => {
            let local = geom::to_local(pt, s.frame.center(), s.frame.rotation);
            match s.kind {
                ShapeKind::Rectangle => geom::point_in_box(local, s.frame.width, s.frame.height),
                ShapeKind::Circle => local.length() < s.frame.width / 2.0,
                ShapeKind::Triangle => geom::point_in_triangle(local, s.frame.width, s.frame.height),
            }
        }
        Body::Object(o) => {
            let local = geom::to_local(pt, o.frame.center(), o.frame.rotation);
            geom::point_in_box(local, o.frame.width, o.frame.height)
        }
    }
}

/// Nearest wall whose centerline is strictly within `max_dist` of `pt`.
#[must_use]
pub fn nearest_wall(doc: &Document, pt: Point, max_dist: f64) -> Option<(ElementId, f64)> {
    doc.elements()
        .iter()
        .filter_map(|el| {
            let w = el.as_wall()?;
            let d = geom::distance_to_segment(pt, w.start(), w.end());
            (d < max_dist).then_some((el.id, d))
        })
        .fold(None, |best: Option<(ElementId, f64)>, cand| match best {
            Some(b) if b.1 <= cand.1 => Some(b),
            _ => Some(cand),
        })
}

// ── Handle hit-testing ──────────────────────────────────────────

/// Handle of `el` under `pt` at the given zoom, if any.
///
/// Text elements have no handles; they are moved and edited directly.
#[must_use]
pub fn handle_at_point(doc: &Document, el: &Element, pt: Point, zoom: f64) -> Option<Handle> {
    let hitbox = HANDLE_HITBOX_PX / zoom;
    match &el.body {
        Body::Wall(w) => {
            let near = |end: Point| (pt.x - end.x).abs() < hitbox && (pt.y - end.y).abs() < hitbox;
            if near(w.start()) {
                Some(Handle::WallEndpoint(WallEnd::Start))
            } else if near(w.end()) {
                Some(Handle::WallEndpoint(WallEnd::End))
            } else {
                None
            }
        }
        Body::Door(i) | Body::Window(i) => {
            let p = placement(doc, i)?;
            let local = p.to_local(pt);
            let is_door = matches!(el.body, Body::Door(_));
            insertable_handle_positions(i, is_door, p.thickness, zoom)
                .into_iter()
                .find(|(_, pos)| local.distance(*pos) < hitbox)
                .map(|(h, _)| h)
        }
        Body::Shape(Shape { frame, .. }) => box_handle_at(frame, None, pt, zoom),
        Body::Object(o) => box_handle_at(&o.frame, o.vision.as_ref(), pt, zoom),
        Body::Text(_) => None,
    }
}

fn box_handle_at(frame: &Frame, vision: Option<&Vision>, pt: Point, zoom: f64) -> Option<Handle> {
    let hitbox = HANDLE_HITBOX_PX / zoom;
    let local = geom::to_local(pt, frame.center(), frame.rotation);
    let (hw, hh) = (frame.width / 2.0, frame.height / 2.0);

    if local.distance(rotate_handle_position(hh, zoom)) < hitbox {
        return Some(Handle::Rotate);
    }
    let corner = corner_handle_positions(hw, hh)
        .into_iter()
        .find(|(_, pos)| (local.x - pos.x).abs() < hitbox / 2.0 && (local.y - pos.y).abs() < hitbox / 2.0);
    if let Some((c, _)) = corner {
        return Some(Handle::Corner(c));
    }
    vision.and_then(|v| {
        vision_handle_positions(v)
            .into_iter()
            .find(|(_, pos)| local.distance(*pos) < hitbox)
            .map(|(h, _)| h)
    })
}

//! Pure geometry helpers shared by hit-testing, snapping, rendering and export.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use crate::camera::Point;
use crate::doc::Wall;

/// Shortest distance from `p` to the segment `a`–`b`.
///
/// A degenerate segment is treated as the point `a`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a.add(ab.scale(t)))
}

/// The four corners of a wall's thickened outline, or `None` for a
/// zero-length wall.
///
/// Order: start+normal, end+normal, end-normal, start-normal.
#[must_use]
pub fn wall_polygon(wall: &Wall) -> Option<[Point; 4]> {
    let dir = wall.direction()?;
    let normal = Point::new(-dir.y, dir.x).scale(wall.thickness / 2.0);
    let (s, e) = (wall.start(), wall.end());
    Some([s.add(normal), e.add(normal), e.sub(normal), s.sub(normal)])
}

/// Rotate `p` by `deg` degrees clockwise (screen convention, y down) about the origin.
#[must_use]
pub fn rotate(p: Point, deg: f64) -> Point {
    let (sin, cos) = deg.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// Map a world point into the local frame of an element centered at
/// `center` and rotated by `deg`.
#[must_use]
pub fn to_local(p: Point, center: Point, deg: f64) -> Point {
    rotate(p.sub(center), -deg)
}

/// Inverse of [`to_local`].
#[must_use]
pub fn to_world(local: Point, center: Point, deg: f64) -> Point {
    rotate(local, deg).add(center)
}

/// Whether a local point lies strictly inside a `w`×`h` box centered on the origin.
#[must_use]
pub fn point_in_box(local: Point, w: f64, h: f64) -> bool {
    local.x.abs() < w / 2.0 && local.y.abs() < h / 2.0
}

/// Whether a local point lies inside the triangle with apex at the top
/// center and base along the bottom edge of a `w`×`h` box centered on the
/// origin. A triangle with no area contains nothing.
#[must_use]
pub fn point_in_triangle(local: Point, w: f64, h: f64) -> bool {
    if w <= 0.0 || h <= 0.0 {
        return false;
    }
    let a = Point::new(0.0, -h / 2.0);
    let b = Point::new(w / 2.0, h / 2.0);
    let c = Point::new(-w / 2.0, h / 2.0);
    let d1 = edge_sign(local, a, b);
    let d2 = edge_sign(local, b, c);
    let d3 = edge_sign(local, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn edge_sign(p: Point, a: Point, b: Point) -> f64 {
    (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}

/// Corners of a rotated `w`×`h` box centered on `center`, clockwise from top-left.
#[must_use]
pub fn box_corners(center: Point, w: f64, h: f64, deg: f64) -> [Point; 4] {
    let (hw, hh) = (w / 2.0, h / 2.0);
    [
        to_world(Point::new(-hw, -hh), center, deg),
        to_world(Point::new(hw, -hh), center, deg),
        to_world(Point::new(hw, hh), center, deg),
        to_world(Point::new(-hw, hh), center, deg),
    ]
}

/// Angle in degrees from `center` to `p`, measured with `atan2`.
#[must_use]
pub fn angle_deg(center: Point, p: Point) -> f64 {
    let d = p.sub(center);
    d.y.atan2(d.x).to_degrees()
}

/// Round `deg` to the nearest multiple of `step`.
#[must_use]
pub fn snap_angle(deg: f64, step: f64) -> f64 {
    (deg / step).round() * step
}

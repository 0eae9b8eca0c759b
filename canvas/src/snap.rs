//! Axis snapping of wall endpoints against other walls' endpoints.
//!
//! Each axis snaps independently: the first endpoint found within the
//! threshold on x locks x, and likewise for y. Every lock produces a guide
//! line for the renderer. Guides are ephemeral and recomputed per move.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::camera::Point;
use crate::doc::{Document, ElementId};

/// An infinite alignment guide in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guide {
    /// Vertical line at `x`.
    Vertical(f64),
    /// Horizontal line at `y`.
    Horizontal(f64),
}

/// Result of snapping a candidate point.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapped {
    pub point: Point,
    pub guides: Vec<Guide>,
}

/// Snap `candidate` to endpoints of every wall except `exclude`.
///
/// `threshold` is in document units; callers divide the screen-pixel
/// threshold by zoom.
#[must_use]
pub fn snap_point(doc: &Document, candidate: Point, exclude: Option<ElementId>, threshold: f64) -> Snapped {
    let mut snapped_x: Option<f64> = None;
    let mut snapped_y: Option<f64> = None;

    let endpoints = doc
        .elements()
        .iter()
        .filter(|el| Some(el.id) != exclude)
        .filter_map(|el| el.as_wall())
        .flat_map(|w| [w.start(), w.end()]);

    for p in endpoints {
        if snapped_x.is_none() && (candidate.x - p.x).abs() < threshold {
            snapped_x = Some(p.x);
        }
        if snapped_y.is_none() && (candidate.y - p.y).abs() < threshold {
            snapped_y = Some(p.y);
        }
        if snapped_x.is_some() && snapped_y.is_some() {
            break;
        }
    }

    let mut guides = Vec::new();
    if let Some(x) = snapped_x {
        guides.push(Guide::Vertical(x));
    }
    if let Some(y) = snapped_y {
        guides.push(Guide::Horizontal(y));
    }
    Snapped {
        point: Point::new(snapped_x.unwrap_or(candidate.x), snapped_y.unwrap_or(candidate.y)),
        guides,
    }
}

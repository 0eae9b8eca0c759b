//! Export framing: content bounds, page layout, and the equipment legend.
//!
//! The actual rasterization and document writing live in the host. This
//! module computes everything the host needs to do that: which region of the
//! plan to draw, at what scale, where on the page it lands, and which
//! legend rows to print.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::Serialize;

use crate::camera::Point;
use crate::doc::{Body, Document, Element, Orientation};
use crate::geom;
use crate::hit::TextMeasure;
use crate::icons;

/// A4 short side in millimetres.
pub const A4_SHORT_MM: f64 = 210.0;
/// A4 long side in millimetres.
pub const A4_LONG_MM: f64 = 297.0;
/// Page margin in millimetres.
pub const PAGE_MARGIN_MM: f64 = 10.0;
/// Blank border around the content in document units.
pub const CONTENT_PADDING: f64 = 50.0;
/// Raster scale for the exported drawing.
pub const RASTER_SCALE: f64 = 3.0;

const PROJECT_NAME_HEIGHT_MM: f64 = 7.0;
const LEGEND_TITLE_HEIGHT_MM: f64 = 6.0;
const LEGEND_ITEM_HEIGHT_MM: f64 = 7.0;
const HEADER_PADDING_MM: f64 = 5.0;

/// Failure to frame a document for export.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExportError {
    #[error("project is empty")]
    Empty,
    #[error("content has invalid extent {width}x{height}")]
    InvalidExtent { width: f64, height: f64 },
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }
}

/// Corner points used for export framing.
///
/// Walls contribute their two endpoints and doors/windows contribute
/// nothing, so insertable extents are ignored when framing the page.
#[must_use]
pub fn element_corners(el: &Element, measure: &dyn TextMeasure) -> Vec<Point> {
    match &el.body {
        Body::Wall(w) => vec![w.start(), w.end()],
        Body::Door(_) | Body::Window(_) => Vec::new(),
        Body::Shape(s) => geom::box_corners(s.frame.center(), s.frame.width, s.frame.height, s.frame.rotation).to_vec(),
        Body::Object(o) => geom::box_corners(o.frame.center(), o.frame.width, o.frame.height, o.frame.rotation).to_vec(),
        Body::Text(t) => {
            let w = measure.text_width(t);
            let anchor = t.anchor();
            [Point::new(0.0, 0.0), Point::new(w, 0.0), Point::new(w, t.font_size), Point::new(0.0, t.font_size)]
                .into_iter()
                .map(|local| geom::to_world(local, anchor, t.rotation))
                .collect()
        }
    }
}

/// Bounds of every element's corners, or `None` when nothing contributes.
#[must_use]
pub fn content_bounds(doc: &Document, measure: &dyn TextMeasure) -> Option<Bounds> {
    let mut corners = doc.elements().iter().flat_map(|el| element_corners(el, measure));
    let first = corners.next()?;
    let mut bounds = Bounds { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
    for p in corners {
        bounds.include(p);
    }
    Some(bounds)
}

/// One legend row: an equipment type in use and how many are placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub key: String,
    pub title: String,
    pub count: usize,
}

/// Equipment types in use, in order of first appearance, with counts.
#[must_use]
pub fn equipment_legend(doc: &Document) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = Vec::new();
    for el in doc.elements() {
        let Body::Object(o) = &el.body else {
            continue;
        };
        if let Some(entry) = entries.iter_mut().find(|e| e.key == o.sub_type) {
            entry.count += 1;
        } else {
            entries.push(LegendEntry {
                key: o.sub_type.clone(),
                title: icons::title_for(&o.sub_type).to_owned(),
                count: 1,
            });
        }
    }
    entries
}

/// Page size in millimetres as `(width, height)`.
#[must_use]
pub fn page_size_mm(orientation: Orientation) -> (f64, f64) {
    match orientation {
        Orientation::Portrait => (A4_SHORT_MM, A4_LONG_MM),
        Orientation::Landscape => (A4_LONG_MM, A4_SHORT_MM),
    }
}

/// Page width divided by height.
#[must_use]
pub fn page_aspect(orientation: Orientation) -> f64 {
    let (w, h) = page_size_mm(orientation);
    w / h
}

/// Largest canvas size with the page's aspect ratio that fits the container.
#[must_use]
pub fn fit_canvas(container_w: f64, container_h: f64, orientation: Orientation) -> (f64, f64) {
    let ratio = page_aspect(orientation);
    if container_h <= 0.0 {
        return (0.0, 0.0);
    }
    if container_w / container_h > ratio {
        (container_h * ratio, container_h)
    } else {
        (container_w, container_w / ratio)
    }
}

/// Everything the host needs to place the exported drawing on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Raw content bounds, before padding.
    pub bounds: Bounds,
    /// Padded content size in document units.
    pub content_width: f64,
    pub content_height: f64,
    /// Offset to apply before drawing the scene so content starts at the padding.
    pub origin: Point,
    /// Region of the page reserved for the drawing.
    pub drawing_area_mm: Rect,
    /// Where the drawing image lands, aspect-preserved and centered.
    pub image_mm: Rect,
    pub legend: Vec<LegendEntry>,
}

impl ExportLayout {
    /// Frame `doc` on an A4 page in its orientation.
    ///
    /// # Errors
    ///
    /// [`ExportError::Empty`] when there is nothing to frame, and
    /// [`ExportError::InvalidExtent`] when the padded content size is not a
    /// positive finite number.
    pub fn compute(doc: &Document, measure: &dyn TextMeasure) -> Result<Self, ExportError> {
        if doc.is_empty() {
            return Err(ExportError::Empty);
        }
        let bounds = content_bounds(doc, measure).ok_or(ExportError::Empty)?;
        let content_width = bounds.width() + CONTENT_PADDING * 2.0;
        let content_height = bounds.height() + CONTENT_PADDING * 2.0;
        if !content_width.is_finite() || content_width <= 0.0 || !content_height.is_finite() || content_height <= 0.0 {
            return Err(ExportError::InvalidExtent { width: content_width, height: content_height });
        }

        let legend = equipment_legend(doc);
        let (page_width_mm, page_height_mm) = page_size_mm(doc.orientation);
        let legend_title = if legend.is_empty() { 0.0 } else { LEGEND_TITLE_HEIGHT_MM };
        #[allow(clippy::cast_precision_loss)]
        let legend_height = legend_title + legend.len() as f64 * LEGEND_ITEM_HEIGHT_MM;
        let header = PROJECT_NAME_HEIGHT_MM + legend_height + HEADER_PADDING_MM;
        let drawing_top = PAGE_MARGIN_MM + header;
        let drawing_area_mm = Rect {
            x: PAGE_MARGIN_MM,
            y: drawing_top,
            width: page_width_mm - PAGE_MARGIN_MM * 2.0,
            height: page_height_mm - drawing_top - PAGE_MARGIN_MM,
        };

        let content_ratio = content_width / content_height;
        let area_ratio = drawing_area_mm.width / drawing_area_mm.height;
        let (image_w, image_h) = if content_ratio > area_ratio {
            (drawing_area_mm.width, drawing_area_mm.width / content_ratio)
        } else {
            (drawing_area_mm.height * content_ratio, drawing_area_mm.height)
        };
        let image_mm = Rect {
            x: drawing_area_mm.x + (drawing_area_mm.width - image_w) / 2.0,
            y: drawing_area_mm.y + (drawing_area_mm.height - image_h) / 2.0,
            width: image_w,
            height: image_h,
        };

        Ok(Self {
            page_width_mm,
            page_height_mm,
            bounds,
            content_width,
            content_height,
            origin: Point::new(CONTENT_PADDING - bounds.min_x, CONTENT_PADDING - bounds.min_y),
            drawing_area_mm,
            image_mm,
            legend,
        })
    }
}

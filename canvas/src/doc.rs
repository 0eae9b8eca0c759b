//! Document model: plan elements, their properties, and the in-memory store.
//!
//! This module defines the closed set of element variants that can appear on
//! a plan ([`Body`]), the wrapper that gives each one a stable identity
//! ([`Element`]), a sparse-update type for property-panel edits
//! ([`ElementPatch`]), and the ordered store that owns all live elements
//! ([`Document`]).
//!
//! Element order in the store is insertion order. Hit-testing walks it in
//! reverse so the most recently added element wins; the renderer partitions it
//! into its own layer order.
//!
//! Doors and windows ("insertables") have no absolute coordinates. They hold a
//! reference to a host wall and a normalized position along it, so moving or
//! stretching the wall carries them along.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{DEFAULT_PROJECT_NAME, DEFAULT_SHAPE_FILL, DEFAULT_SHAPE_STROKE, MIN_BOX_SIZE, MIN_INSERTABLE_WIDTH};

/// Unique identifier for a plan element.
pub type ElementId = Uuid;

/// Discriminant of an element's variant, used for filtering and policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Wall,
    Door,
    Window,
    Shape,
    Object,
    Text,
}

/// Page orientation used when sizing the canvas and exporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// A ±1 orientation flag. Persisted as the number `1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum Side {
    #[default]
    Positive,
    Negative,
}

impl Side {
    /// The flag as a multiplier.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl From<f64> for Side {
    fn from(value: f64) -> Self {
        if value < 0.0 { Self::Negative } else { Self::Positive }
    }
}

impl From<Side> for f64 {
    fn from(side: Side) -> Self {
        side.factor()
    }
}

/// A straight wall segment with a thickness. Walls have no width/height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub thickness: f64,
}

impl Wall {
    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[must_use]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// Vector from start to end.
    #[must_use]
    pub fn delta(&self) -> Point {
        self.end().sub(self.start())
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    /// Direction angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        let d = self.delta();
        d.y.atan2(d.x)
    }

    /// Unit direction vector, or `None` for a zero-length wall.
    #[must_use]
    pub fn direction(&self) -> Option<Point> {
        let len = self.length();
        if len == 0.0 {
            return None;
        }
        Some(self.delta().scale(1.0 / len))
    }

    /// Point at parametric position `t` (0 = start, 1 = end).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        self.start().add(self.delta().scale(t))
    }

    /// Scalar projection of `p` onto the wall's line, unclamped.
    ///
    /// Returns `None` for a zero-length wall.
    #[must_use]
    pub fn project(&self, p: Point) -> Option<f64> {
        let d = self.delta();
        let len_sq = d.dot(d);
        if len_sq == 0.0 {
            return None;
        }
        Some(p.sub(self.start()).dot(d) / len_sq)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x1 += dx;
        self.y1 += dy;
        self.x2 += dx;
        self.y2 += dy;
    }
}

/// A door or window mounted on a host wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insertable {
    /// Host wall. `None` while unattached.
    #[serde(default)]
    pub wall_id: Option<ElementId>,
    /// Normalized position of the center along the host wall, in `[0, 1]`.
    #[serde(default)]
    pub position: f64,
    /// Extent along the wall in document units.
    pub width: f64,
    /// Which side of the wall the door leaf opens towards.
    #[serde(default)]
    pub flip: Side,
    /// Which end of the opening the door hinges on.
    #[serde(default)]
    pub swing: Side,
}

impl Insertable {
    #[must_use]
    pub fn new(wall_id: ElementId, position: f64, width: f64) -> Self {
        Self {
            wall_id: Some(wall_id),
            position: position.clamp(0.0, 1.0),
            width,
            flip: Side::Positive,
            swing: Side::Positive,
        }
    }
}

/// Position, size and rotation shared by shapes and equipment objects.
///
/// `(x, y)` is the top-left corner before rotation; rotation is clockwise in
/// degrees about the box center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Frame {
    /// Box of the given size centered on `center`, unrotated.
    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
            rotation: 0.0,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Outline of a decorative shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
}

/// Decorative shape, typically a room or area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(rename = "subType", default)]
    pub kind: ShapeKind,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    /// Label drawn at the center. Empty when unnamed.
    #[serde(default)]
    pub name: String,
}

fn default_stroke() -> String {
    DEFAULT_SHAPE_STROKE.to_owned()
}

fn default_fill() -> String {
    DEFAULT_SHAPE_FILL.to_owned()
}

/// Field-of-view cone of a camera or sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    /// Reach in document units.
    pub range: f64,
    /// Full aperture in degrees.
    pub angle: f64,
}

/// Security equipment icon instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    /// Key into the icon registry, e.g. `"camera"`.
    pub sub_type: String,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<Vision>,
}

/// Free text label. Anchored at its top-left corner and rotated about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
}

impl Text {
    #[must_use]
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// CSS font shorthand for this label.
    #[must_use]
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_family)
    }
}

/// The variant-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Body {
    Wall(Wall),
    Door(Insertable),
    Window(Insertable),
    Shape(Shape),
    Object(Object),
    Text(Text),
}

/// A plan element as stored in the document and in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub body: Body,
}

impl Element {
    /// Wrap a body with a freshly generated id.
    #[must_use]
    pub fn new(body: Body) -> Self {
        Self { id: Uuid::new_v4(), body }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self.body {
            Body::Wall(_) => ElementKind::Wall,
            Body::Door(_) => ElementKind::Door,
            Body::Window(_) => ElementKind::Window,
            Body::Shape(_) => ElementKind::Shape,
            Body::Object(_) => ElementKind::Object,
            Body::Text(_) => ElementKind::Text,
        }
    }

    #[must_use]
    pub fn as_wall(&self) -> Option<&Wall> {
        match &self.body {
            Body::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_wall_mut(&mut self) -> Option<&mut Wall> {
        match &mut self.body {
            Body::Wall(w) => Some(w),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_insertable(&self) -> Option<&Insertable> {
        match &self.body {
            Body::Door(i) | Body::Window(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_insertable_mut(&mut self) -> Option<&mut Insertable> {
        match &mut self.body {
            Body::Door(i) | Body::Window(i) => Some(i),
            _ => None,
        }
    }

    /// The box frame of a shape or object.
    #[must_use]
    pub fn frame(&self) -> Option<&Frame> {
        match &self.body {
            Body::Shape(s) => Some(&s.frame),
            Body::Object(o) => Some(&o.frame),
            _ => None,
        }
    }

    pub fn frame_mut(&mut self) -> Option<&mut Frame> {
        match &mut self.body {
            Body::Shape(s) => Some(&mut s.frame),
            Body::Object(o) => Some(&mut o.frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_insertable(&self) -> bool {
        matches!(self.body, Body::Door(_) | Body::Window(_))
    }

    /// Translate by an absolute offset. Insertables cannot move this way and
    /// report `false`.
    pub fn translate(&mut self, dx: f64, dy: f64) -> bool {
        match &mut self.body {
            Body::Wall(w) => w.translate(dx, dy),
            Body::Shape(Shape { frame, .. }) | Body::Object(Object { frame, .. }) => {
                frame.x += dx;
                frame.y += dy;
            }
            Body::Text(t) => {
                t.x += dx;
                t.y += dy;
            }
            Body::Door(_) | Body::Window(_) => return false,
        }
        true
    }
}

/// Sparse property edit. Only present fields are applied, and only to
/// elements where the field is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Wall thickness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    /// Box width, or along-wall width for doors and windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<Vision>,
}

impl ElementPatch {
    /// Merge this patch into `element`. Returns whether anything changed.
    pub fn apply(&self, element: &mut Element) -> bool {
        let before = element.body.clone();
        match &mut element.body {
            Body::Wall(w) => {
                if let Some(t) = self.thickness.filter(|t| *t > 0.0) {
                    w.thickness = t;
                }
            }
            Body::Door(i) | Body::Window(i) => {
                if let Some(width) = self.width {
                    i.width = width.max(MIN_INSERTABLE_WIDTH);
                }
            }
            Body::Shape(s) => {
                self.apply_frame(&mut s.frame);
                if let Some(name) = &self.name {
                    s.name.clone_from(name);
                }
                if let Some(stroke) = &self.stroke_color {
                    s.stroke_color.clone_from(stroke);
                }
                if let Some(fill) = &self.fill_color {
                    s.fill_color.clone_from(fill);
                }
            }
            Body::Object(o) => {
                self.apply_frame(&mut o.frame);
                if let Some(name) = &self.name {
                    o.name.clone_from(name);
                }
                if let Some(vision) = self.vision {
                    o.vision = Some(vision);
                }
            }
            Body::Text(t) => {
                if let Some(family) = &self.font_family {
                    t.font_family.clone_from(family);
                }
                if let Some(size) = self.font_size.filter(|s| *s > 0.0) {
                    t.font_size = size;
                }
                if let Some(text) = &self.text {
                    t.text.clone_from(text);
                }
                if let Some(r) = self.rotation {
                    t.rotation = r;
                }
            }
        }
        element.body != before
    }

    fn apply_frame(&self, frame: &mut Frame) {
        if let Some(w) = self.width {
            frame.width = w.max(MIN_BOX_SIZE);
        }
        if let Some(h) = self.height {
            frame.height = h.max(MIN_BOX_SIZE);
        }
        if let Some(r) = self.rotation {
            frame.rotation = r;
        }
    }
}

/// Ordered in-memory store of plan elements plus project metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
    pub project_name: String,
    pub orientation: Orientation,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty, untitled portrait document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            project_name: DEFAULT_PROJECT_NAME.to_owned(),
            orientation: Orientation::Portrait,
        }
    }

    /// Build a document from already-deserialized parts.
    #[must_use]
    pub fn from_parts(elements: Vec<Element>, project_name: String, orientation: Orientation) -> Self {
        let mut doc = Self { elements: Vec::new(), project_name, orientation };
        for el in elements {
            doc.add(el);
        }
        doc
    }

    /// All elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.iter().any(|el| el.id == *id)
    }

    /// Append an element and return its id.
    ///
    /// An element whose id is already taken is given a fresh one, so ids stay
    /// unique no matter how the element was produced. Insertable positions
    /// are clamped into `[0, 1]`.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        while self.contains(&element.id) {
            element.id = Uuid::new_v4();
        }
        if let Some(ins) = element.as_insertable_mut() {
            ins.position = ins.position.clamp(0.0, 1.0);
        }
        let id = element.id;
        self.elements.push(element);
        id
    }

    #[must_use]
    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == *id)
    }

    pub fn find_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|el| el.id == *id)
    }

    /// The wall with the given id, if it exists and is a wall.
    #[must_use]
    pub fn wall(&self, id: &ElementId) -> Option<&Wall> {
        self.find(id).and_then(Element::as_wall)
    }

    /// Resolve an insertable's host wall. Unattached or dangling references
    /// resolve to `None`.
    #[must_use]
    pub fn host_wall(&self, insertable: &Insertable) -> Option<&Wall> {
        insertable.wall_id.as_ref().and_then(|id| self.wall(id))
    }

    /// Elements of a single kind, in insertion order.
    pub fn of_type(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |el| el.kind() == kind)
    }

    /// Remove elements by id. Removing a wall also removes every door and
    /// window it hosts. Returns the ids actually removed, in document order.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut doomed: HashSet<ElementId> = ids.iter().copied().filter(|id| self.contains(id)).collect();
        let removed_walls: HashSet<ElementId> = self
            .elements
            .iter()
            .filter(|el| doomed.contains(&el.id) && el.as_wall().is_some())
            .map(|el| el.id)
            .collect();
        for el in &self.elements {
            if let Some(host) = el.as_insertable().and_then(|i| i.wall_id) {
                if removed_walls.contains(&host) {
                    doomed.insert(el.id);
                }
            }
        }

        let mut removed = Vec::new();
        self.elements.retain(|el| {
            if doomed.contains(&el.id) {
                removed.push(el.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Apply a patch to each listed element. Other elements are untouched.
    /// Returns how many elements changed.
    pub fn update(&mut self, ids: &[ElementId], patch: &ElementPatch) -> usize {
        self.elements
            .iter_mut()
            .filter(|el| ids.contains(&el.id))
            .map(|el| patch.apply(el))
            .filter(|changed| *changed)
            .count()
    }

    /// Deep copy of the element collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Element> {
        self.elements.clone()
    }

    /// Remove every element. Metadata is kept.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Insertables whose host reference does not resolve to a wall.
    #[must_use]
    pub fn dangling_insertables(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|el| el.as_insertable().is_some_and(|ins| self.host_wall(ins).is_none()))
            .map(|el| el.id)
            .collect()
    }

    /// Drop dangling insertables and clamp positions. Returns the number of
    /// elements dropped.
    pub fn repair(&mut self) -> usize {
        let dangling = self.dangling_insertables();
        let dropped = self.remove(&dangling).len();
        for el in &mut self.elements {
            if let Some(ins) = el.as_insertable_mut() {
                ins.position = ins.position.clamp(0.0, 1.0);
            }
        }
        dropped
    }
}

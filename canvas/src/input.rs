//! Input model: tools, modifier keys, mouse buttons, selection, and the
//! gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. Drags carry a snapshot of the elements they affect so every
//! move event recomputes from the original geometry rather than accumulating
//! deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{Element, ElementId, ShapeKind};
use crate::hit::{Corner, Handle, WallEnd};
use crate::icons::Equipment;
use crate::snap::Guide;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Draw a wall by dragging from start to end.
    Wall,
    /// Place a door on the nearest wall.
    Door,
    /// Place a window on the nearest wall.
    Window,
    /// Place a text label.
    Text,
    /// Place a decorative shape.
    Shape(ShapeKind),
    /// Place a piece of equipment.
    Object(Equipment),
}

impl Tool {
    /// Tool bound to a single-letter keyboard shortcut.
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "v" => Some(Self::Select),
            "w" => Some(Self::Wall),
            "d" => Some(Self::Door),
            "j" => Some(Self::Window),
            "t" => Some(Self::Text),
            _ => None,
        }
    }

    /// Default canvas cursor while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Text => "text",
            _ => "crosshair",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"ArrowUp"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Ordered set of selected element ids.
///
/// Order is selection order; duplicates are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    /// The selected id when exactly one element is selected.
    #[must_use]
    pub fn single(&self) -> Option<ElementId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn set_single(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Replace the selection, dropping repeated ids.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&ElementId) -> bool) {
        self.ids.retain(keep);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Normalized marquee rectangle in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Strict containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Selected element ids.
    pub selection: Selection,
    /// Marquee rectangle while one is being dragged.
    pub marquee: Option<SelectionRect>,
    /// Snap guides for the current move event.
    pub guides: Vec<Guide>,
}

/// What a drag does to the elements it captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Translate every captured element.
    Move,
    /// Slide a door or window along its host wall.
    MoveOnWall,
    /// Move one wall endpoint.
    WallEndpoint(WallEnd),
    /// Resize a door or window symmetrically.
    ResizeInsertable(WallEnd),
    /// Resize a box element from a corner.
    ResizeCorner(Corner),
    /// Rotate a box element about its center.
    Rotate,
    /// Change a vision cone's reach.
    VisionRange,
    /// Change a vision cone's aperture.
    VisionAngle,
}

impl DragKind {
    /// Drag started from a handle. Flip and swing are clicks, not drags.
    #[must_use]
    pub fn from_handle(handle: Handle) -> Option<Self> {
        match handle {
            Handle::WallEndpoint(end) => Some(Self::WallEndpoint(end)),
            Handle::InsertableResize(end) => Some(Self::ResizeInsertable(end)),
            Handle::Corner(c) => Some(Self::ResizeCorner(c)),
            Handle::Rotate => Some(Self::Rotate),
            Handle::VisionRange => Some(Self::VisionRange),
            Handle::VisionAngle => Some(Self::VisionAngle),
            Handle::Flip | Handle::Swing => None,
        }
    }
}

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct DragAction {
    pub kind: DragKind,
    /// Document-space pointer position at pointer-down.
    pub start: Point,
    /// Deep copies of the affected elements as they were at pointer-down.
    pub originals: Vec<Element>,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Panning the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Dragging a marquee rectangle from `start`.
    Marquee {
        start: Point,
    },
    /// Sizing a freshly created wall by dragging its end.
    DrawingWall {
        id: ElementId,
    },
    /// Transforming captured elements.
    Dragging(DragAction),
}


//! Shared numeric constants for the canvas crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hitbox size in pixels for wall endpoints and element handles.
pub const HANDLE_HITBOX_PX: f64 = 10.0;

/// Distance above the top edge of a box element to its rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 20.0;

/// Gap between the wall face and a door's flip handle, in screen pixels.
pub const FLIP_HANDLE_OFFSET_PX: f64 = 10.0;

/// Drawn handle size in screen pixels.
pub const HANDLE_DRAW_PX: f64 = 8.0;

// ── Minimum sizes ───────────────────────────────────────────────

/// Smallest width/height a box element can be resized to.
pub const MIN_BOX_SIZE: f64 = 10.0;

/// Smallest along-wall width of a door or window.
pub const MIN_INSERTABLE_WIDTH: f64 = 20.0;

/// Smallest vision cone range.
pub const MIN_VISION_RANGE: f64 = 10.0;

/// Vision cone aperture limits in degrees.
pub const MIN_VISION_ANGLE: f64 = 10.0;
pub const MAX_VISION_ANGLE: f64 = 359.0;

// ── Element defaults ────────────────────────────────────────────

pub const DEFAULT_WALL_THICKNESS: f64 = 10.0;
pub const DEFAULT_DOOR_WIDTH: f64 = 60.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 80.0;
pub const DEFAULT_SHAPE_SIZE: f64 = 200.0;
pub const DEFAULT_OBJECT_SIZE: f64 = 50.0;
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_FAMILY: &str = "Montserrat";
pub const DEFAULT_TEXT: &str = "New Text";
pub const DEFAULT_SHAPE_FILL: &str = "rgba(200, 200, 200, 0.5)";
pub const DEFAULT_SHAPE_STROKE: &str = "transparent";
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

// ── Rotation ────────────────────────────────────────────────────

/// Rotation snap increment in degrees while Shift is held.
pub const ROTATION_SNAP_DEG: f64 = 45.0;

/// Half-extent of the drawn snap guide lines in document units.
pub const GUIDE_EXTENT: f64 = 100_000.0;

//! The editor engine: document, camera, selection, gestures and history in
//! one explicit context.
//!
//! [`EngineCore`] holds everything that does not need a browser and is what
//! the tests drive. [`Engine`] wraps it together with the canvas element, its
//! 2D context and the icon images, and adds the drawing entry points.
//!
//! Every handler returns a list of [`Action`]s telling the host what to do
//! next: redraw, change the cursor, persist the document, open a text editor.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{Camera, Point};
use crate::config::EditorConfig;
use crate::consts::{
    DEFAULT_DOOR_WIDTH, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_OBJECT_SIZE, DEFAULT_PROJECT_NAME,
    DEFAULT_SHAPE_FILL, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_STROKE, DEFAULT_TEXT, DEFAULT_WALL_THICKNESS,
    DEFAULT_WINDOW_WIDTH, MAX_VISION_ANGLE, MIN_BOX_SIZE, MIN_INSERTABLE_WIDTH, MIN_VISION_ANGLE, MIN_VISION_RANGE,
    ROTATION_SNAP_DEG,
};
use crate::doc::{
    Body, Document, Element, ElementId, ElementKind, ElementPatch, Frame, Insertable, Object, Orientation, Shape, Text,
    Vision, Wall,
};
use crate::export::{ExportError, ExportLayout};
use crate::geom;
use crate::hit::{self, ApproxTextMeasure, Corner, Handle, TextMeasure, WallEnd};
use crate::history::History;
use crate::icons::IconRegistry;
use crate::input::{
    Button, DragAction, DragKind, InputState, Key, Modifiers, SelectionRect, Tool, UiState, WheelDelta,
};
use crate::persist::{self, PersistError};
use crate::render::{self, DrawItem, View};
use crate::snap;
use crate::surface::{CanvasTextMeasure, WebSurface};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed and should be redrawn.
    RenderNeeded,
    SetCursor(String),
    /// The active tool changed; the toolbar should follow.
    ToolChanged(Tool),
    /// The selection changed; property panels should follow.
    SelectionChanged(Vec<ElementId>),
    /// A new history snapshot was recorded; the host should persist it.
    DocumentChanged,
    /// The user asked to edit a text label in place.
    EditTextRequested { id: ElementId, text: String },
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: Document,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub config: EditorConfig,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    history: History<Document>,
    /// Time after which pending nudges are committed.
    nudge_deadline: Option<f64>,
    measure: Box<dyn TextMeasure>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom tuning and policies. An invalid config is
    /// replaced by the defaults.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid editor config; using defaults");
                EditorConfig::default()
            }
        };
        let doc = Document::new();
        Self {
            history: History::new(doc.clone(), config.history_capacity),
            doc,
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            config,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            nudge_deadline: None,
            measure: Box::new(ApproxTextMeasure),
        }
    }

    /// Replace the text measurer used for hit-testing and bounds.
    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.measure = measure;
    }

    #[must_use]
    pub fn text_measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    // --- Data inputs ---

    /// Replace the document from a persisted snapshot and start a fresh
    /// history. Unreadable snapshots yield an empty document.
    pub fn load_document(&mut self, json: &str) -> Vec<Action> {
        self.doc = persist::load_document(json);
        self.history.reset(self.doc.clone());
        self.nudge_deadline = None;
        self.input = InputState::Idle;
        self.ui.selection.clear();
        self.ui.marquee = None;
        self.ui.guides.clear();
        vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    /// Serialize the live document.
    ///
    /// # Errors
    ///
    /// Propagates [`PersistError`] from encoding.
    pub fn to_json(&self) -> Result<String, PersistError> {
        persist::to_json(&self.doc)
    }

    // --- Tool / text ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        vec![Action::ToolChanged(tool), Action::SetCursor(tool.cursor().to_owned())]
    }

    /// Commit text from the host editor back into a label.
    pub fn set_text(&mut self, id: &ElementId, text: String) -> Vec<Action> {
        let patch = ElementPatch { text: Some(text), ..ElementPatch::default() };
        self.doc.update(&[*id], &patch);
        self.commit_actions()
    }

    /// Merge a property-panel edit into every selected element.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> Vec<Action> {
        let ids = self.ui.selection.ids().to_vec();
        if self.doc.update(&ids, patch) == 0 {
            return Vec::new();
        }
        self.commit_actions()
    }

    pub fn set_project_name(&mut self, name: String) -> Vec<Action> {
        self.doc.project_name = name;
        self.commit_actions()
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Vec<Action> {
        self.doc.orientation = orientation;
        self.commit_actions()
    }

    /// Clear every element and the project name.
    pub fn new_project(&mut self) -> Vec<Action> {
        self.doc.clear();
        DEFAULT_PROJECT_NAME.clone_into(&mut self.doc.project_name);
        self.ui.selection.clear();
        self.input = InputState::Idle;
        let mut actions = vec![Action::SelectionChanged(Vec::new())];
        actions.extend(self.commit_actions());
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    #[must_use]
    pub fn view(&self) -> View {
        View { camera: self.camera, width: self.viewport_width, height: self.viewport_height, dpr: self.dpr }
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_to(self.camera.zoom + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_to(self.camera.zoom - self.config.zoom_step)
    }

    /// Back to zoom 1 with no pan.
    pub fn fit_to_screen(&mut self) -> Vec<Action> {
        self.camera.reset();
        vec![Action::RenderNeeded]
    }

    fn zoom_to(&mut self, zoom: f64) -> Vec<Action> {
        let center = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
        self.camera.zoom_about(center, self.config.clamp_zoom(zoom));
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Middle || (button == Button::Primary && modifiers.ctrl) {
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor("grabbing".into())];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let world = self.camera.screen_to_world(screen_pt);
        match self.ui.tool {
            Tool::Select => self.select_pointer_down(world, modifiers),
            Tool::Wall => self.start_wall(world, modifiers),
            Tool::Door => self.place_insertable(world, true),
            Tool::Window => self.place_insertable(world, false),
            Tool::Text => self.place(Body::Text(Text {
                x: world.x,
                y: world.y,
                rotation: 0.0,
                text: DEFAULT_TEXT.into(),
                font_family: DEFAULT_FONT_FAMILY.into(),
                font_size: DEFAULT_FONT_SIZE,
            })),
            Tool::Shape(kind) => self.place(Body::Shape(Shape {
                kind,
                frame: Frame::centered(world, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE),
                stroke_color: DEFAULT_SHAPE_STROKE.into(),
                fill_color: DEFAULT_SHAPE_FILL.into(),
                name: String::new(),
            })),
            Tool::Object(equipment) => self.place(Body::Object(Object {
                sub_type: equipment.key().into(),
                frame: Frame::centered(world, DEFAULT_OBJECT_SIZE, DEFAULT_OBJECT_SIZE),
                name: String::new(),
                vision: equipment.default_vision(),
            })),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match std::mem::take(&mut self.input) {
            InputState::Idle => vec![Action::SetCursor(self.hover_cursor(world).into())],
            InputState::Panning { last_screen } => {
                self.camera.pan_x += screen_pt.x - last_screen.x;
                self.camera.pan_y += screen_pt.y - last_screen.y;
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Marquee { start } => {
                self.ui.marquee = Some(SelectionRect::from_corners(start, world));
                self.input = InputState::Marquee { start };
                vec![Action::RenderNeeded]
            }
            InputState::DrawingWall { id } => {
                self.drag_new_wall(id, world, modifiers);
                self.input = InputState::DrawingWall { id };
                vec![Action::RenderNeeded]
            }
            InputState::Dragging(drag) => {
                self.apply_drag(&drag, world, modifiers);
                self.input = InputState::Dragging(drag);
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Finish the active gesture. Safe to call with no gesture in progress.
    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => {}
            InputState::Panning { .. } => {
                actions.push(Action::SetCursor(self.ui.tool.cursor().into()));
            }
            InputState::Marquee { .. } => {
                if let Some(rect) = self.ui.marquee.take() {
                    let policy = self.config.marquee_policy;
                    let inside: Vec<ElementId> = self
                        .doc
                        .elements()
                        .iter()
                        .filter(|el| policy.includes(el.kind()))
                        .filter(|el| hit::element_center(&self.doc, el).is_some_and(|c| rect.contains(c)))
                        .map(|el| el.id)
                        .collect();
                    self.ui.selection.set(inside);
                }
                actions.push(self.selection_changed());
                actions.push(Action::RenderNeeded);
            }
            InputState::DrawingWall { id } => {
                self.ui.guides.clear();
                self.ui.tool = Tool::Select;
                actions.push(Action::ToolChanged(Tool::Select));
                let degenerate = self.doc.wall(&id).is_some_and(|w| w.length() == 0.0);
                if degenerate {
                    self.doc.remove(&[id]);
                    self.ui.selection.retain(|s| *s != id);
                    actions.push(self.selection_changed());
                }
                actions.extend(self.commit_actions());
                actions.push(Action::SetCursor(Tool::Select.cursor().into()));
                actions.push(Action::RenderNeeded);
            }
            InputState::Dragging(_) => {
                self.ui.guides.clear();
                actions.extend(self.commit_actions());
                actions.push(Action::SetCursor(self.ui.tool.cursor().into()));
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// Double-click on an already-selected label asks the host to edit it.
    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match hit::element_at_point(&self.doc, world, self.measure.as_ref()) {
            Some(Element { id, body: Body::Text(t) }) if self.ui.selection.contains(id) => {
                vec![Action::EditTextRequested { id: *id, text: t.text.clone() }]
            }
            _ => Vec::new(),
        }
    }

    /// Zoom about the cursor, keeping the document point under it fixed.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { self.config.wheel_zoom_factor } else { 1.0 / self.config.wheel_zoom_factor };
        let zoom = self.config.clamp_zoom(self.camera.zoom * factor);
        self.camera.zoom_about(screen_pt, zoom);
        vec![Action::RenderNeeded]
    }

    /// Keyboard bindings. `now_ms` is the host clock, used to debounce
    /// nudge commits.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        let name = key.0.as_str();
        if modifiers.command() {
            return match name.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => self.redo(),
                "z" => self.undo(),
                "y" => self.redo(),
                "d" => self.duplicate_selected(),
                _ => Vec::new(),
            };
        }

        match name {
            "Delete" | "Backspace" => self.delete_selected(),
            "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown" => {
                let step = if modifiers.shift { self.config.nudge_step_large } else { self.config.nudge_step };
                let (dx, dy) = match name {
                    "ArrowLeft" => (-step, 0.0),
                    "ArrowRight" => (step, 0.0),
                    "ArrowUp" => (0.0, -step),
                    _ => (0.0, step),
                };
                self.nudge(dx, dy, now_ms)
            }
            _ => match Tool::from_shortcut(name) {
                Some(tool) => self.set_tool(tool),
                None => Vec::new(),
            },
        }
    }

    /// Drive time-based work. Commits a pending nudge once its quiet period
    /// has elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        match self.nudge_deadline {
            Some(deadline) if now_ms >= deadline => self.commit_actions(),
            _ => Vec::new(),
        }
    }

    // --- Commands ---

    pub fn undo(&mut self) -> Vec<Action> {
        self.flush_nudge();
        let Some(doc) = self.history.undo() else {
            return Vec::new();
        };
        tracing::debug!(remaining = self.history.len(), "undo");
        self.restore(doc)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.flush_nudge();
        let Some(doc) = self.history.redo() else {
            return Vec::new();
        };
        tracing::debug!("redo");
        self.restore(doc)
    }

    /// Copy every selected element by the duplicate offset and select the
    /// copies. Walls, doors and windows cannot be duplicated; a selection
    /// containing any of them is left alone.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let selected: Vec<Element> =
            self.ui.selection.ids().iter().filter_map(|id| self.doc.find(id)).cloned().collect();
        let blocked = selected
            .iter()
            .any(|el| matches!(el.kind(), ElementKind::Wall | ElementKind::Door | ElementKind::Window));
        if selected.is_empty() || blocked {
            return Vec::new();
        }

        let offset = self.config.duplicate_offset;
        let copies: Vec<ElementId> = selected
            .into_iter()
            .map(|el| {
                let mut copy = Element::new(el.body);
                copy.translate(offset, offset);
                self.doc.add(copy)
            })
            .collect();
        self.ui.selection.set(copies);

        let mut actions = vec![self.selection_changed()];
        actions.extend(self.commit_actions());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove the selection. Walls take their doors and windows with them.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let ids = self.ui.selection.ids().to_vec();
        if self.doc.remove(&ids).is_empty() {
            return Vec::new();
        }
        let doc = &self.doc;
        self.ui.selection.retain(|id| doc.contains(id));

        let mut actions = vec![self.selection_changed()];
        actions.extend(self.commit_actions());
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Export ---

    /// The scene as drawn for export: ordered draw list, no selection UI.
    #[must_use]
    pub fn export_scene(&self) -> Vec<DrawItem<'_>> {
        render::scene_items(&self.doc)
    }

    /// Page placement for exporting the current document.
    ///
    /// # Errors
    ///
    /// Propagates [`ExportError`] when there is nothing to frame.
    pub fn export_layout(&self) -> Result<ExportLayout, ExportError> {
        ExportLayout::compute(&self.doc, self.measure.as_ref())
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        self.ui.selection.ids()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.find(id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Pointer-down helpers ---

    fn select_pointer_down(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        if let Some(actions) = self.press_handle(world) {
            return actions;
        }

        let hit = hit::element_at_point(&self.doc, world, self.measure.as_ref()).cloned();
        let Some(el) = hit else {
            if !modifiers.shift {
                self.ui.selection.clear();
                self.ui.marquee = Some(SelectionRect::from_corners(world, world));
                self.input = InputState::Marquee { start: world };
            }
            return vec![self.selection_changed(), Action::RenderNeeded];
        };

        if modifiers.shift {
            self.ui.selection.toggle(el.id);
        } else if !self.ui.selection.contains(&el.id) {
            self.ui.selection.set_single(el.id);
        }

        if el.is_insertable() && self.ui.selection.contains(&el.id) {
            self.input = InputState::Dragging(DragAction { kind: DragKind::MoveOnWall, start: world, originals: vec![el] });
        } else if !self.ui.selection.is_empty() {
            let originals: Vec<Element> =
                self.ui.selection.ids().iter().filter_map(|id| self.doc.find(id)).cloned().collect();
            self.input = InputState::Dragging(DragAction { kind: DragKind::Move, start: world, originals });
        }
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    /// Handles only exist while exactly one element is selected, and take
    /// priority over selecting whatever lies beneath them.
    fn press_handle(&mut self, world: Point) -> Option<Vec<Action>> {
        let id = self.ui.selection.single()?;
        let el = self.doc.find(&id)?;
        let handle = hit::handle_at_point(&self.doc, el, world, self.camera.zoom)?;

        if let Some(kind) = DragKind::from_handle(handle) {
            let originals = vec![el.clone()];
            self.input = InputState::Dragging(DragAction { kind, start: world, originals });
            return Some(vec![Action::SetCursor(handle.cursor().into())]);
        }

        let ins = self.doc.find_mut(&id).and_then(Element::as_insertable_mut)?;
        match handle {
            Handle::Flip => ins.flip = ins.flip.flipped(),
            Handle::Swing => ins.swing = ins.swing.flipped(),
            _ => return None,
        }
        let mut actions = self.commit_actions();
        actions.push(Action::RenderNeeded);
        Some(actions)
    }

    fn start_wall(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let start = if modifiers.shift {
            world
        } else {
            let snapped = snap::snap_point(&self.doc, world, None, self.snap_threshold());
            self.ui.guides = snapped.guides;
            snapped.point
        };
        let wall = Wall { x1: start.x, y1: start.y, x2: start.x, y2: start.y, thickness: DEFAULT_WALL_THICKNESS };
        let id = self.doc.add(Element::new(Body::Wall(wall)));
        self.ui.selection.set_single(id);
        self.input = InputState::DrawingWall { id };
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    fn drag_new_wall(&mut self, id: ElementId, world: Point, modifiers: Modifiers) {
        let Some(start) = self.doc.wall(&id).map(Wall::start) else {
            return;
        };
        let end = if modifiers.shift {
            self.ui.guides.clear();
            axis_lock(start, world)
        } else {
            let snapped = snap::snap_point(&self.doc, world, Some(id), self.snap_threshold());
            self.ui.guides = snapped.guides;
            snapped.point
        };
        if let Some(w) = self.doc.find_mut(&id).and_then(Element::as_wall_mut) {
            w.x2 = end.x;
            w.y2 = end.y;
        }
    }

    /// Attach a door or window to the nearest wall within tolerance. Nothing
    /// is created when no wall is close enough.
    fn place_insertable(&mut self, world: Point, is_door: bool) -> Vec<Action> {
        let tolerance = self.camera.screen_dist_to_world(self.config.insertable_tolerance_px);
        let Some((wall_id, _)) = hit::nearest_wall(&self.doc, world, tolerance) else {
            tracing::debug!(x = world.x, y = world.y, "no wall near insertable placement");
            return Vec::new();
        };
        let position = self.doc.wall(&wall_id).and_then(|w| w.project(world)).unwrap_or(0.5);
        let width = if is_door { DEFAULT_DOOR_WIDTH } else { DEFAULT_WINDOW_WIDTH };
        let ins = Insertable::new(wall_id, position, width);
        self.place(if is_door { Body::Door(ins) } else { Body::Window(ins) })
    }

    /// Add a new element, select it and return to the select tool.
    fn place(&mut self, body: Body) -> Vec<Action> {
        let id = self.doc.add(Element::new(body));
        self.ui.selection.set_single(id);
        self.ui.tool = Tool::Select;
        let mut actions = vec![Action::ToolChanged(Tool::Select), self.selection_changed()];
        actions.extend(self.commit_actions());
        actions.push(Action::SetCursor(Tool::Select.cursor().into()));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn hover_cursor(&self, world: Point) -> &'static str {
        if self.ui.tool != Tool::Select {
            return self.ui.tool.cursor();
        }
        let handle = self
            .ui
            .selection
            .single()
            .and_then(|id| self.doc.find(&id))
            .and_then(|el| hit::handle_at_point(&self.doc, el, world, self.camera.zoom));
        if let Some(h) = handle {
            return h.cursor();
        }
        if hit::element_at_point(&self.doc, world, self.measure.as_ref()).is_some() {
            "move"
        } else {
            Tool::Select.cursor()
        }
    }

    // --- Drag application ---

    fn apply_drag(&mut self, drag: &DragAction, world: Point, modifiers: Modifiers) {
        if drag.kind == DragKind::Move {
            let d = world.sub(drag.start);
            for orig in &drag.originals {
                let mut moved = orig.clone();
                if moved.translate(d.x, d.y) {
                    self.replace(moved);
                }
            }
            return;
        }

        let Some(orig) = drag.originals.first() else {
            return;
        };
        let updated = match drag.kind {
            DragKind::Move => None,
            DragKind::MoveOnWall => self.slide_on_wall(orig, world),
            DragKind::WallEndpoint(end) => self.drag_wall_endpoint(orig, end, world, modifiers),
            DragKind::ResizeInsertable(end) => self.resize_insertable(orig, end, drag.start, world),
            DragKind::ResizeCorner(corner) => resize_corner(orig, corner, drag.start, world),
            DragKind::Rotate => rotate_box(orig, drag.start, world, modifiers.shift),
            DragKind::VisionRange => adjust_vision(orig, world, |v, local| {
                v.range = local.x.max(MIN_VISION_RANGE);
            }),
            DragKind::VisionAngle => adjust_vision(orig, world, |v, local| {
                let half = local.y.atan2(local.x).to_degrees().abs();
                v.angle = (half * 2.0).clamp(MIN_VISION_ANGLE, MAX_VISION_ANGLE);
            }),
        };
        if let Some(el) = updated {
            self.replace(el);
        }
    }

    fn slide_on_wall(&self, orig: &Element, world: Point) -> Option<Element> {
        let t = self.doc.host_wall(orig.as_insertable()?)?.project(world)?;
        let mut el = orig.clone();
        el.as_insertable_mut()?.position = t.clamp(0.0, 1.0);
        Some(el)
    }

    fn drag_wall_endpoint(&mut self, orig: &Element, end: WallEnd, world: Point, modifiers: Modifiers) -> Option<Element> {
        let wall = orig.as_wall()?;
        let fixed = match end {
            WallEnd::Start => wall.end(),
            WallEnd::End => wall.start(),
        };
        let p = if modifiers.shift {
            axis_lock(fixed, world)
        } else {
            let snapped = snap::snap_point(&self.doc, world, Some(orig.id), self.snap_threshold());
            self.ui.guides = snapped.guides;
            snapped.point
        };

        let mut el = orig.clone();
        let w = el.as_wall_mut()?;
        match end {
            WallEnd::Start => (w.x1, w.y1) = (p.x, p.y),
            WallEnd::End => (w.x2, w.y2) = (p.x, p.y),
        }
        Some(el)
    }

    /// Grow or shrink an opening symmetrically about its center by the
    /// cursor's travel along the wall.
    fn resize_insertable(&self, orig: &Element, end: WallEnd, start: Point, world: Point) -> Option<Element> {
        let ins = orig.as_insertable()?;
        let dir = self.doc.host_wall(ins)?.direction()?;
        let mut along = world.sub(start).dot(dir);
        if end == WallEnd::Start {
            along = -along;
        }
        let mut el = orig.clone();
        el.as_insertable_mut()?.width = (ins.width + along * 2.0).max(MIN_INSERTABLE_WIDTH);
        Some(el)
    }

    // --- History ---

    /// Record the live document if it differs from the current snapshot.
    fn commit(&mut self) -> bool {
        self.nudge_deadline = None;
        if self.history.current() == Some(&self.doc) {
            return false;
        }
        self.history.commit(self.doc.clone());
        tracing::debug!(snapshots = self.history.len(), elements = self.doc.len(), "history commit");
        true
    }

    fn commit_actions(&mut self) -> Vec<Action> {
        if self.commit() { vec![Action::DocumentChanged, Action::RenderNeeded] } else { vec![Action::RenderNeeded] }
    }

    fn flush_nudge(&mut self) {
        if self.nudge_deadline.is_some() {
            self.commit();
        }
    }

    fn restore(&mut self, doc: Document) -> Vec<Action> {
        self.doc = doc;
        self.ui.selection.clear();
        self.ui.marquee = None;
        self.ui.guides.clear();
        self.input = InputState::Idle;
        vec![Action::SelectionChanged(Vec::new()), Action::DocumentChanged, Action::RenderNeeded]
    }

    fn nudge(&mut self, dx: f64, dy: f64, now_ms: f64) -> Vec<Action> {
        let policy = self.config.nudge_policy;
        let mut moved = false;
        for id in self.ui.selection.ids() {
            if let Some(el) = self.doc.find_mut(id) {
                if policy.includes(el.kind()) {
                    moved |= el.translate(dx, dy);
                }
            }
        }
        if !moved {
            return Vec::new();
        }
        self.nudge_deadline = Some(now_ms + self.config.nudge_commit_delay_ms);
        vec![Action::RenderNeeded]
    }

    // --- Misc ---

    fn replace(&mut self, el: Element) {
        if let Some(slot) = self.doc.find_mut(&el.id) {
            *slot = el;
        }
    }

    fn snap_threshold(&self) -> f64 {
        self.camera.screen_dist_to_world(self.config.snap_threshold_px)
    }

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged(self.ui.selection.ids().to_vec())
    }
}

/// Constrain `p` to the horizontal or vertical line through `anchor`,
/// whichever the pointer is closer to following.
fn axis_lock(anchor: Point, p: Point) -> Point {
    if (p.x - anchor.x).abs() > (p.y - anchor.y).abs() {
        Point::new(p.x, anchor.y)
    } else {
        Point::new(anchor.x, p.y)
    }
}

/// Resize a box from `corner`, keeping the opposite corner fixed in
/// document space whatever the rotation.
fn resize_corner(orig: &Element, corner: Corner, start: Point, world: Point) -> Option<Element> {
    let f0 = orig.frame()?;
    let local = geom::rotate(world.sub(start), -f0.rotation);

    let width = (if corner.is_left() { f0.width - local.x } else { f0.width + local.x }).max(MIN_BOX_SIZE);
    let height = (if corner.is_top() { f0.height - local.y } else { f0.height + local.y }).max(MIN_BOX_SIZE);
    let (dw, dh) = (width - f0.width, height - f0.height);
    let shift = Point::new(
        if corner.is_left() { -dw / 2.0 } else { dw / 2.0 },
        if corner.is_top() { -dh / 2.0 } else { dh / 2.0 },
    );
    let center = f0.center().add(geom::rotate(shift, f0.rotation));

    let mut el = orig.clone();
    let frame = el.frame_mut()?;
    frame.width = width;
    frame.height = height;
    frame.x = center.x - width / 2.0;
    frame.y = center.y - height / 2.0;
    Some(el)
}

fn rotate_box(orig: &Element, start: Point, world: Point, snap: bool) -> Option<Element> {
    let f0 = orig.frame()?;
    let center = f0.center();
    let mut rotation = f0.rotation + geom::angle_deg(center, world) - geom::angle_deg(center, start);
    if snap {
        rotation = geom::snap_angle(rotation, ROTATION_SNAP_DEG);
    }
    let mut el = orig.clone();
    el.frame_mut()?.rotation = rotation.rem_euclid(360.0);
    Some(el)
}

fn adjust_vision(orig: &Element, world: Point, apply: impl FnOnce(&mut Vision, Point)) -> Option<Element> {
    let mut el = orig.clone();
    let Body::Object(o) = &mut el.body else {
        return None;
    };
    let local = geom::to_local(world, o.frame.center(), o.frame.rotation);
    apply(o.vision.as_mut()?, local);
    Some(el)
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    icons: IconRegistry<HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Fails when the canvas cannot provide a 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut core = EngineCore::new();
        core.set_text_measure(Box::new(CanvasTextMeasure::new(ctx.clone())));
        Ok(Self { canvas, ctx, icons: IconRegistry::new(), core })
    }

    /// Make an equipment icon available for drawing.
    pub fn register_icon(&mut self, key: impl Into<String>, image: HtmlImageElement) {
        self.icons.insert(key, image);
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the
    /// canvas backing store to match.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * self.core.dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * self.core.dpr).round().max(0.0) as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_double_click(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_double_click(screen_pt)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        self.core.on_key_down(key, modifiers, now_ms)
    }

    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.core.tick(now_ms)
    }

    // --- Render ---

    /// Draw the current state to the canvas. Failures are logged, not raised.
    pub fn render(&self) {
        let mut surface = WebSurface::new(&self.ctx, &self.icons);
        let view = self.core.view();
        if let Err(e) = render::draw(&mut surface, &self.core.doc, &self.core.ui, &view, self.core.text_measure(), true) {
            tracing::warn!(error = ?e, "render failed");
        }
    }

    /// Draw the document without selection UI onto an export canvas sized
    /// from the returned layout.
    ///
    /// # Errors
    ///
    /// Fails when the document is empty or a drawing call is rejected.
    pub fn render_for_export(&self, target: &CanvasRenderingContext2d) -> Result<ExportLayout, JsValue> {
        let layout = self.core.export_layout().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut surface = WebSurface::new(target, &self.icons);
        render::draw_export(&mut surface, &self.core.doc, &layout)?;
        Ok(layout)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.core.element(id)
    }
}

//! Floor plan editor engine for security-equipment layouts.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and also
//! builds natively for the `floorplan` command-line tool. It owns the editing
//! model: the plan document, pan/zoom camera, selection and gesture state,
//! hit-testing, wall endpoint snapping, undo/redo, scene rendering and export
//! framing. The host JavaScript layer wires DOM events to the engine, acts on
//! the returned [`engine::Action`]s, persists snapshots and produces the PDF.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Element types and the in-memory document store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`geom`] | Rotation, polygon and distance helpers |
//! | [`input`] | Tools, modifiers, selection and the gesture state machine |
//! | [`hit`] | Element and handle hit-testing |
//! | [`snap`] | Wall endpoint snapping and alignment guides |
//! | [`history`] | Bounded snapshot undo/redo |
//! | [`render`] | Scene ordering and drawing over a [`render::Surface`] |
//! | [`surface`] | `CanvasRenderingContext2d` surface and text measurement |
//! | [`export`] | Content bounds, page layout and equipment legend |
//! | [`persist`] | Project snapshot encoding |
//! | [`icons`] | Equipment catalogue and icon registry |
//! | [`config`] | Editor tuning and policies |
//! | [`consts`] | Shared numeric constants and defaults |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod geom;
pub mod hit;
pub mod history;
pub mod icons;
pub mod input;
pub mod persist;
pub mod render;
pub mod snap;
pub mod surface;

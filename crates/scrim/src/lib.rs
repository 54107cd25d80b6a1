//! scrim: bridges egui into a host application's per-frame render/input loop.
//!
//! scrim manages one egui context per logical scope (editor, standalone
//! game, individual worlds), multiplexes host input into each context exactly
//! once per frame, broadcasts draw callbacks at the right point of the frame,
//! and captures the tessellated output into renderer-agnostic vertex/index
//! buffers any host renderer can consume.
//!
//! # Quick Start
//!
//! ```no_run
//! use glam::Vec2;
//! use scrim::{ContextManager, ScreenRect, ViewportOverlay, WorldId};
//!
//! let mut manager = ContextManager::new("saved");
//!
//! // One context per world; draw callbacks add widgets each frame.
//! let (scope, proxy) = manager.world_proxy(WorldId(1));
//! proxy.add_draw_callback(|ctx| {
//!     egui::Window::new("hello").show(ctx, |ui| {
//!         ui.label("hello from scrim");
//!     });
//! });
//!
//! // One overlay per viewport presents that context.
//! let mut overlay = ViewportOverlay::new(&mut manager, scope);
//! overlay.set_size(Vec2::new(1280.0, 720.0));
//!
//! // Per host frame: feed input, tick, paint, clear.
//! overlay.update_focus(true, true);
//! overlay.on_mouse_move(Vec2::new(640.0, 360.0));
//! overlay.tick(&mut manager, 1, 1.0 / 60.0);
//! let clip = ScreenRect::from_size(Vec2::ZERO, Vec2::new(1280.0, 720.0));
//! let batches = overlay.paint(&manager, Vec2::ZERO, clip);
//! // upload each batch's vertices, then issue one draw per PaintDraw entry
//! overlay.post_update();
//! ```
//!
//! # Architecture
//!
//! - [`ContextProxy`] owns one egui context and its frame state machine
//! - [`ContextManager`] keys proxies by [`ScopeIndex`] and owns the
//!   multi-context draw-callback list
//! - [`ViewportOverlay`] is the per-viewport glue: input intake and paint
//!   batch emission
//! - `scrim-core` (re-exported here) holds the input accumulator, the
//!   draw-list capture, and the runtime [`switches`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

mod context;
mod demo;
mod manager;
mod overlay;
mod settings;

pub use context::ContextProxy;
pub use manager::{ContextManager, ScopeIndex, WorldId};
pub use overlay::{InputMode, PaintBatch, PaintDraw, ViewportOverlay};

// Re-export the core data layer
pub use scrim_core::{
    switches, CallbackHandle, DirtyRange, DrawCommand, DrawList, FrameInput, InputState, KeyMap,
    RenderVertex, Result, ScreenRect, ScrimError, Vec2, MAX_CHARACTERS, MAX_KEYS,
    MAX_MOUSE_BUTTONS,
};

// Re-export egui so callback authors match the bridge's version
pub use egui;

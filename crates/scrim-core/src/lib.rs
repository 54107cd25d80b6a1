//! Core abstractions for scrim.
//!
//! This crate provides the data and state layer of the bridge:
//! - [`InputState`] accumulates host input between frames, with dirty-range
//!   bookkeeping so per-frame consumption copies only what changed
//! - [`DrawList`] captures tessellated draw output into renderer-agnostic
//!   vertex/index/command buffers
//! - [`DrawMulticast`] holds ordered draw callbacks with stable handles
//! - [`switches`] exposes process-wide runtime toggles
//!
//! The context lifecycle and frame machinery built on top of these live in
//! the `scrim` crate.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Input state legitimately tracks many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod draw_list;
pub mod error;
pub mod input;
pub mod multicast;
pub mod switches;

pub use draw_list::{DrawCommand, DrawList, RenderVertex, ScreenRect};
pub use error::{Result, ScrimError};
pub use input::{
    DirtyRange, FrameInput, InputState, KeyMap, MAX_CHARACTERS, MAX_KEYS, MAX_MOUSE_BUTTONS,
};
pub use multicast::{Broadcast, CallbackHandle, DrawMulticast};

// Re-export the math type used throughout public APIs
pub use glam::Vec2;

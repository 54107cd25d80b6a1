//! Context proxy: one egui context and its frame state machine.
//!
//! All updates to a context go through its proxy. Once per host frame the
//! proxy applies pending input, broadcasts draw callbacks, ends the pass and
//! captures the tessellated output, so consumers can paint last frame's data
//! while the context is already in the middle of the next frame.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use egui::epaint::ClippedPrimitive;
use glam::Vec2;
use scrim_core::{
    switches, Broadcast, CallbackHandle, DrawList, DrawMulticast, FrameInput, InputState, KeyMap,
    Result,
};

use crate::demo;
use crate::settings;

/// Canvas size used before any widget reports its real size.
const DEFAULT_CANVAS_SIZE: Vec2 = Vec2::new(3840.0, 2160.0);

/// Callback list shared between all contexts of one manager.
pub(crate) type SharedDrawList = Rc<RefCell<DrawMulticast>>;

/// Wraps a single egui context.
///
/// The proxy owns the context for its entire lifetime and drives its frame
/// state machine: not-started → started → drawn → ended. Begin/end and draw
/// are guarded so redundant calls within one frame are silently absorbed.
///
/// Draw callbacks receive the `&egui::Context` to draw into; a panicking
/// callback is not isolated and unwinds to the host's own handler.
pub struct ContextProxy {
    name: String,
    ctx: egui::Context,
    layout_file: PathBuf,

    canvas_size: Vec2,
    time: f64,

    frame_started: bool,
    draw_called: bool,
    last_frame: Option<u64>,

    mouse_cursor: egui::CursorIcon,
    has_active_item: bool,

    key_map: KeyMap,
    input_source: Weak<RefCell<InputState>>,
    frame_input: FrameInput,

    draw_lists: Vec<DrawList>,
    textures_delta: egui::TexturesDelta,

    draw_event: DrawMulticast,
    shared_draw_event: SharedDrawList,
}

impl ContextProxy {
    /// Creates a proxy with a fresh context.
    ///
    /// Loads the persisted layout for `name` from `save_dir` (a missing or
    /// malformed blob degrades to the default layout) and begins the first
    /// frame immediately, so callers that reach the context before the first
    /// tick always see valid frame state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        save_dir: &Path,
        shared_draw_event: SharedDrawList,
    ) -> Self {
        let name = name.into();
        let ctx = egui::Context::default();

        let layout_file = settings::layout_file(save_dir, &name);
        match settings::load_memory(&layout_file) {
            Ok(Some(memory)) => ctx.memory_mut(|m| *m = memory),
            Ok(None) => {}
            Err(err) => {
                log::warn!("context '{name}': starting with default layout: {err}");
            }
        }

        let mut proxy = Self {
            name,
            ctx,
            layout_file,
            canvas_size: DEFAULT_CANVAS_SIZE,
            time: 0.0,
            frame_started: false,
            draw_called: false,
            last_frame: None,
            mouse_cursor: egui::CursorIcon::Default,
            has_active_item: false,
            key_map: KeyMap::default(),
            input_source: Weak::new(),
            frame_input: FrameInput::default(),
            draw_lists: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            draw_event: DrawMulticast::new(),
            shared_draw_event,
        };
        proxy.begin_frame(1.0 / 60.0);
        proxy
    }

    /// Returns the name of this context.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path of the persisted layout blob.
    #[must_use]
    pub fn layout_path(&self) -> &Path {
        &self.layout_file
    }

    /// Returns the context to draw into.
    ///
    /// Prefer registering a draw callback; direct widget calls are only valid
    /// while a frame is started.
    #[must_use]
    pub fn egui(&self) -> &egui::Context {
        &self.ctx
    }

    /// Returns the draw lists captured by the last completed frame.
    #[must_use]
    pub fn draw_lists(&self) -> &[DrawList] {
        &self.draw_lists
    }

    /// Takes the texture changes accumulated since the last call.
    ///
    /// The host renderer applies these before painting the draw lists.
    pub fn take_textures_delta(&mut self) -> egui::TexturesDelta {
        std::mem::take(&mut self.textures_delta)
    }

    /// Returns the input snapshot applied at the most recent frame begin.
    #[must_use]
    pub fn frame_input(&self) -> &FrameInput {
        &self.frame_input
    }

    /// Returns the mouse cursor requested by the last completed frame.
    #[must_use]
    pub fn mouse_cursor(&self) -> egui::CursorIcon {
        self.mouse_cursor
    }

    /// Returns whether any widget held focus or pointer capture at the end
    /// of the last completed frame.
    #[must_use]
    pub fn has_active_item(&self) -> bool {
        self.has_active_item
    }

    /// Returns whether a frame is currently started.
    #[must_use]
    pub fn is_frame_started(&self) -> bool {
        self.frame_started
    }

    /// Returns the last processed frame number, if any frame was ticked.
    #[must_use]
    pub fn last_frame_number(&self) -> Option<u64> {
        self.last_frame
    }

    /// Sets the canvas size consumed by the next frame begin.
    pub fn set_canvas_size(&mut self, size: Vec2) {
        if size.x >= 1.0 && size.y >= 1.0 {
            self.canvas_size = size;
        }
    }

    /// Returns the current canvas size.
    #[must_use]
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    /// Returns the installed key map.
    #[must_use]
    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    /// Replaces the key map used to interpret raw key indices.
    pub fn set_key_map(&mut self, key_map: KeyMap) {
        self.key_map = key_map;
    }

    /// Binds an input state to be applied at every frame begin.
    ///
    /// The proxy holds a weak back-reference only; a context reads input, it
    /// never owns it. Rebinding replaces the previous source.
    pub fn set_input_source(&mut self, source: &Rc<RefCell<InputState>>) {
        self.input_source = Rc::downgrade(source);
    }

    /// Removes the binding if `source` is the currently bound input state.
    pub fn remove_input_source(&mut self, source: &Rc<RefCell<InputState>>) {
        if let Some(bound) = self.input_source.upgrade() {
            if Rc::ptr_eq(&bound, source) {
                self.input_source = Weak::new();
            }
        }
    }

    /// Returns the currently bound input state, if it is still alive.
    #[must_use]
    pub fn input_source(&self) -> Option<Rc<RefCell<InputState>>> {
        self.input_source.upgrade()
    }

    /// Registers a draw callback for this context only.
    pub fn add_draw_callback(
        &mut self,
        callback: impl FnMut(&egui::Context) + 'static,
    ) -> CallbackHandle {
        self.draw_event.add(callback)
    }

    /// Removes a draw callback by handle.
    pub fn remove_draw_callback(&mut self, handle: CallbackHandle) -> bool {
        self.draw_event.remove(handle)
    }

    /// Advances the context to the next frame.
    ///
    /// At most one call per `frame` value is processed; repeated calls within
    /// the same host frame are no-ops. A processed tick runs outstanding draw
    /// callbacks, ends the started frame (capturing its draw output),
    /// snapshots transient UI state, and begins the next frame with
    /// `delta_seconds` and the pending input applied.
    pub fn tick(&mut self, frame: u64, delta_seconds: f32) {
        if self.last_frame.is_some_and(|last| frame <= last) {
            return;
        }
        self.last_frame = Some(frame);

        if self.frame_started {
            // Draw events must run before the frame ends, even if nobody
            // called draw() manually.
            self.draw();
            self.end_frame();
        }

        self.begin_frame(delta_seconds);
    }

    /// Broadcasts draw callbacks for the current frame.
    ///
    /// Only one call per frame is processed, and only while a frame is
    /// started; if not called manually it runs from [`Self::tick`]. The
    /// `shared_draw_first` switch decides, per call, whether the shared list
    /// fires before or after this context's own list. The built-in demo
    /// window is drawn afterwards when `show_demo` is set.
    pub fn draw(&mut self) {
        if !self.frame_started || self.draw_called {
            return;
        }
        self.draw_called = true;

        let ctx = self.ctx.clone();
        if switches::SHARED_DRAW_FIRST.get() {
            self.shared_snapshot().invoke(&ctx);
            self.draw_event.broadcast(&ctx);
        } else {
            self.draw_event.broadcast(&ctx);
            self.shared_snapshot().invoke(&ctx);
        }

        if switches::SHOW_DEMO.get() {
            demo::show(&ctx, self);
        }
    }

    /// Persists the current layout blob.
    ///
    /// Also runs automatically on drop.
    pub fn save_layout(&self) -> Result<()> {
        settings::save_memory(&self.ctx, &self.layout_file)
    }

    fn shared_snapshot(&self) -> Broadcast {
        self.shared_draw_event.borrow().snapshot()
    }

    fn begin_frame(&mut self, delta_seconds: f32) {
        if self.frame_started {
            return;
        }

        self.time += f64::from(delta_seconds);
        let mut raw = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(self.canvas_size.x, self.canvas_size.y),
            )),
            time: Some(self.time),
            predicted_dt: delta_seconds,
            ..Default::default()
        };

        self.frame_input.reset_frame_deltas();
        if switches::INPUT_ENABLED.get() {
            if let Some(source) = self.input_source.upgrade() {
                let source = source.borrow();
                source.copy_into(&mut self.frame_input, &self.key_map, &mut raw.events);
                raw.modifiers = source.modifiers();
            }
        }

        self.ctx.begin_pass(raw);
        self.frame_started = true;
        self.draw_called = false;
    }

    fn end_frame(&mut self) {
        if !self.frame_started {
            return;
        }

        let output = self.ctx.end_pass();

        // Collect transient state before the next frame clears it.
        self.mouse_cursor = output.platform_output.cursor_icon;
        self.has_active_item =
            self.ctx.memory(|m| m.focused().is_some()) || self.ctx.is_using_pointer();

        self.textures_delta.append(output.textures_delta);

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.update_draw_lists(&primitives);

        self.frame_started = false;
    }

    fn update_draw_lists(&mut self, primitives: &[ClippedPrimitive]) {
        self.draw_lists.clear();
        if !primitives.is_empty() {
            let list = DrawList::capture(primitives);
            if !list.is_empty() {
                self.draw_lists.push(list);
            }
        }
    }
}

impl Drop for ContextProxy {
    fn drop(&mut self) {
        if let Err(err) = self.save_layout() {
            log::warn!("context '{}': failed to save layout: {err}", self.name);
        }
    }
}

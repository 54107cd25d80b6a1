//! Per-viewport presentation glue.
//!
//! A [`ViewportOverlay`] sits between one host viewport and one context
//! scope: it accumulates the viewport's raw input events, ticks the scope's
//! proxy once per host frame, and turns the captured draw lists into paint
//! batches for the host renderer. Texture references in batches are opaque;
//! the host resolves them through its own texture resources.
//!
//! Per-frame flow: feed events → [`ViewportOverlay::tick`] →
//! [`ViewportOverlay::paint`] → [`ViewportOverlay::post_update`].

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use scrim_core::{switches, InputState, RenderVertex, ScreenRect};

use crate::manager::{ContextManager, ScopeIndex};

/// How much of the host's input stream the overlay currently receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// No input is routed.
    #[default]
    None,
    /// Pointer events only (hovered, but no keyboard focus).
    PointerOnly,
    /// Pointer and keyboard events.
    Full,
}

/// One indexed draw ready for the host renderer.
pub struct PaintDraw {
    /// Indices into the owning batch's vertex buffer.
    pub indices: Vec<u32>,
    /// Clip rectangle in screen space, already intersected with the
    /// overlay's own clip region.
    pub clip_rect: ScreenRect,
    /// Opaque texture reference resolved by the host.
    pub texture: egui::TextureId,
}

/// A vertex buffer shared by a group of draws.
pub struct PaintBatch {
    /// Vertices in screen space.
    pub vertices: Vec<RenderVertex>,
    /// Draws referencing the vertex buffer.
    pub draws: Vec<PaintDraw>,
}

/// Presentation glue for one viewport and one context scope.
pub struct ViewportOverlay {
    scope: ScopeIndex,
    input: Rc<RefCell<InputState>>,
    input_mode: InputMode,
    size: Vec2,
}

impl ViewportOverlay {
    /// Creates an overlay for `scope` and binds its input state to the
    /// scope's proxy.
    ///
    /// The proxy should exist already (created through the manager's
    /// get-or-create accessors); if it does not, the overlay stays unbound
    /// and ticks are skipped until it appears.
    #[must_use]
    pub fn new(manager: &mut ContextManager, scope: ScopeIndex) -> Self {
        let input = Rc::new(RefCell::new(InputState::new()));
        if let Some(proxy) = manager.proxy_mut(scope) {
            proxy.set_input_source(&input);
        } else {
            log::warn!("no context for scope {}; overlay is unbound", scope.as_u32());
        }
        Self {
            scope,
            input,
            input_mode: InputMode::None,
            size: Vec2::ZERO,
        }
    }

    /// Returns the scope this overlay presents.
    #[must_use]
    pub fn scope(&self) -> ScopeIndex {
        self.scope
    }

    /// Returns the current input mode.
    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Returns the overlay's input state.
    #[must_use]
    pub fn input(&self) -> &Rc<RefCell<InputState>> {
        &self.input
    }

    /// Sets the widget-local size, fed to the context as its canvas size.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Returns the widget-local size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Updates the input mode from the host's focus and hover state.
    ///
    /// Downgrading from full input resets keyboard state; losing the pointer
    /// as well resets everything, so no key or button stays stuck down.
    pub fn update_focus(&mut self, keyboard_focus: bool, hovered: bool) {
        let enabled = switches::INPUT_ENABLED.get();
        let new_mode = if keyboard_focus && enabled {
            InputMode::Full
        } else if hovered && enabled {
            InputMode::PointerOnly
        } else {
            InputMode::None
        };

        if new_mode != self.input_mode {
            log::trace!(
                "overlay {}: input mode {:?} -> {new_mode:?}",
                self.scope.as_u32(),
                self.input_mode
            );
            let mut input = self.input.borrow_mut();
            if new_mode == InputMode::None {
                input.reset_state();
            } else if self.input_mode == InputMode::Full {
                input.reset_keyboard_state();
            }
            self.input_mode = new_mode;
        }

        self.input.borrow_mut().set_mouse_pointer(hovered && new_mode != InputMode::None);
    }

    /// Records a key transition by raw index.
    pub fn on_key_event(&mut self, index: usize, down: bool) {
        if self.accepts_keyboard() {
            self.input.borrow_mut().set_key_down(index, down);
        }
    }

    /// Records a typed character.
    pub fn on_character(&mut self, character: char) {
        if self.accepts_keyboard() {
            self.input.borrow_mut().add_character(character);
        }
    }

    /// Records the modifier key state.
    pub fn on_modifiers(&mut self, control: bool, shift: bool, alt: bool) {
        if self.accepts_keyboard() {
            let mut input = self.input.borrow_mut();
            input.set_control_down(control);
            input.set_shift_down(shift);
            input.set_alt_down(alt);
        }
    }

    /// Records a mouse button transition by raw index.
    pub fn on_mouse_button(&mut self, index: usize, down: bool) {
        if self.accepts_pointer() {
            self.input.borrow_mut().set_mouse_down(index, down);
        }
    }

    /// Records the pointer position in widget-local space.
    pub fn on_mouse_move(&mut self, position: Vec2) {
        if self.accepts_pointer() {
            self.input.borrow_mut().set_mouse_position(position);
        }
    }

    /// Records wheel movement.
    pub fn on_mouse_wheel(&mut self, delta: f32) {
        if self.accepts_pointer() {
            self.input.borrow_mut().add_mouse_wheel_delta(delta);
        }
    }

    /// Advances the scope's context for this host frame.
    ///
    /// Pushes the overlay size as the canvas size first, so the frame begun
    /// by this tick lays out against the real viewport. A missing proxy is
    /// skipped.
    pub fn tick(&mut self, manager: &mut ContextManager, frame: u64, delta_seconds: f32) {
        if let Some(proxy) = manager.proxy_mut(self.scope) {
            if self.size.x >= 1.0 && self.size.y >= 1.0 {
                proxy.set_canvas_size(self.size);
            }
            proxy.tick(frame, delta_seconds);
        }
    }

    /// Clears the input update state after draw callbacks observed it.
    ///
    /// Call once per host frame, after every context ticked.
    pub fn post_update(&mut self) {
        if self.input_mode != InputMode::None {
            self.input.borrow_mut().clear_update_state();
        }
    }

    /// Emits paint batches for the scope's captured draw lists.
    ///
    /// `origin` is the widget's top-left in screen space (rounded to whole
    /// pixels to avoid half-pixel offsets); `clip` is the widget's own clip
    /// region. Commands whose clip intersection is empty are dropped.
    #[must_use]
    pub fn paint(
        &self,
        manager: &ContextManager,
        origin: Vec2,
        clip: ScreenRect,
    ) -> Vec<PaintBatch> {
        let Some(proxy) = manager.proxy(self.scope) else {
            return Vec::new();
        };
        let origin = origin.round();

        let mut batches = Vec::new();
        for list in proxy.draw_lists() {
            let mut vertices = Vec::new();
            list.emit_vertices(&mut vertices, origin);

            let mut draws = Vec::new();
            let mut index_offset = 0usize;
            for command in list.commands() {
                let count = command.element_count as usize;
                let clip_rect = command.clip_rect.translate(origin).intersect(clip);
                if clip_rect.is_empty() {
                    index_offset += count;
                    continue;
                }
                let mut indices = Vec::new();
                list.emit_indices(&mut indices, index_offset, count);
                index_offset += count;
                draws.push(PaintDraw {
                    indices,
                    clip_rect,
                    texture: command.texture,
                });
            }

            if !draws.is_empty() {
                batches.push(PaintBatch { vertices, draws });
            }
        }
        batches
    }

    /// Unbinds the overlay's input state from the scope's proxy.
    ///
    /// Call on widget teardown; the proxy must not keep reading an input
    /// state whose producer is gone.
    pub fn detach(&mut self, manager: &mut ContextManager) {
        if let Some(proxy) = manager.proxy_mut(self.scope) {
            proxy.remove_input_source(&self.input);
        }
        self.input_mode = InputMode::None;
    }

    fn accepts_keyboard(&self) -> bool {
        self.input_mode == InputMode::Full && switches::INPUT_ENABLED.get()
    }

    fn accepts_pointer(&self) -> bool {
        self.input_mode != InputMode::None && switches::INPUT_ENABLED.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::WorldId;

    fn world_overlay() -> (tempfile::TempDir, ContextManager, ViewportOverlay) {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = ContextManager::new(dir.path());
        let (scope, _) = manager.world_proxy(WorldId(1));
        let mut overlay = ViewportOverlay::new(&mut manager, scope);
        overlay.set_size(Vec2::new(1280.0, 720.0));
        (dir, manager, overlay)
    }

    #[test]
    fn test_events_ignored_without_focus() {
        let (_dir, _manager, mut overlay) = world_overlay();
        overlay.on_mouse_move(Vec2::new(10.0, 10.0));
        overlay.on_key_event(4, true);
        let input = overlay.input().borrow();
        assert_eq!(input.mouse_position(), Vec2::ZERO);
        assert!(!input.keys()[4]);
    }

    #[test]
    fn test_full_input_flow_reaches_context() {
        let (_dir, mut manager, mut overlay) = world_overlay();
        overlay.update_focus(true, true);
        assert_eq!(overlay.input_mode(), InputMode::Full);

        overlay.on_mouse_move(Vec2::new(100.0, 200.0));
        overlay.on_key_event(5, true);
        overlay.on_mouse_wheel(1.0);
        overlay.tick(&mut manager, 1, 1.0 / 60.0);

        let proxy = manager.proxy(overlay.scope()).unwrap();
        assert!(proxy.frame_input().is_key_down(5));
        assert_eq!(proxy.frame_input().mouse_position, Vec2::new(100.0, 200.0));
        assert_eq!(proxy.frame_input().mouse_wheel, 1.0);
        assert_eq!(proxy.canvas_size(), Vec2::new(1280.0, 720.0));

        overlay.post_update();
        overlay.tick(&mut manager, 2, 1.0 / 60.0);
        let proxy = manager.proxy(overlay.scope()).unwrap();
        assert!(proxy.frame_input().is_key_down(5));
        assert_eq!(proxy.frame_input().mouse_wheel, 0.0);
    }

    #[test]
    fn test_downgrade_from_full_resets_keyboard_only() {
        let (_dir, _manager, mut overlay) = world_overlay();
        overlay.update_focus(true, true);
        overlay.on_key_event(7, true);
        overlay.on_mouse_button(0, true);
        overlay.post_update();

        overlay.update_focus(false, true);
        assert_eq!(overlay.input_mode(), InputMode::PointerOnly);
        let input = overlay.input().borrow();
        assert!(!input.keys()[7]);
        assert!(input.mouse_buttons()[0]);
        assert!(input.keys_update_range().contains(7));
    }

    #[test]
    fn test_losing_everything_resets_all_input() {
        let (_dir, _manager, mut overlay) = world_overlay();
        overlay.update_focus(true, true);
        overlay.on_key_event(7, true);
        overlay.on_mouse_button(1, true);

        overlay.update_focus(false, false);
        assert_eq!(overlay.input_mode(), InputMode::None);
        let input = overlay.input().borrow();
        assert!(!input.keys()[7]);
        assert!(!input.mouse_buttons()[1]);
        assert!(!input.has_mouse_pointer());
    }

    #[test]
    fn test_paint_emits_batches_within_clip() {
        let (_dir, mut manager, mut overlay) = world_overlay();
        manager
            .proxy_mut(overlay.scope())
            .unwrap()
            .add_draw_callback(|ctx| {
                egui::Window::new("paint probe")
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        ui.label("content");
                    });
            });

        overlay.tick(&mut manager, 1, 1.0 / 60.0);

        let clip = ScreenRect::from_size(Vec2::new(50.0, 40.0), Vec2::new(1280.0, 720.0));
        let batches = overlay.paint(&manager, Vec2::new(50.0, 40.0), clip);
        assert!(!batches.is_empty());
        for batch in &batches {
            assert!(!batch.vertices.is_empty());
            for draw in &batch.draws {
                assert!(!draw.indices.is_empty());
                assert!(!draw.clip_rect.is_empty());
                let within = draw.clip_rect.intersect(clip);
                assert_eq!(within, draw.clip_rect);
                let max_index = *draw.indices.iter().max().unwrap() as usize;
                assert!(max_index < batch.vertices.len());
            }
        }
    }

    #[test]
    fn test_paint_unknown_scope_is_empty() {
        let (_dir, mut manager, overlay) = world_overlay();
        manager.destroy(overlay.scope());
        let batches = overlay.paint(
            &manager,
            Vec2::ZERO,
            ScreenRect::from_size(Vec2::ZERO, Vec2::new(100.0, 100.0)),
        );
        assert!(batches.is_empty());
    }

    #[test]
    fn test_detach_unbinds_input() {
        let (_dir, mut manager, mut overlay) = world_overlay();
        assert!(manager
            .proxy(overlay.scope())
            .unwrap()
            .input_source()
            .is_some());
        overlay.detach(&mut manager);
        assert!(manager
            .proxy(overlay.scope())
            .unwrap()
            .input_source()
            .is_none());
        assert_eq!(overlay.input_mode(), InputMode::None);
    }
}

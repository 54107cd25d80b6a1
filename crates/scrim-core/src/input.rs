//! Input accumulation between host events and per-frame consumption.
//!
//! An [`InputState`] collects raw host events (keys, mouse buttons, pointer
//! position, wheel, characters, modifiers) between frames. A context applies
//! it once per frame into a [`FrameInput`] snapshot, emitting the matching
//! egui events, and the owner clears the per-frame deltas afterwards with
//! [`InputState::clear_update_state`]. Key and mouse-button arrays track a
//! [`DirtyRange`] so consumption copies only the entries that changed.

use glam::Vec2;

/// Size of the raw host key space.
pub const MAX_KEYS: usize = 512;

/// Number of tracked mouse buttons.
pub const MAX_MOUSE_BUTTONS: usize = 5;

/// Maximum queued input characters per frame; overflow is discarded.
pub const MAX_CHARACTERS: usize = 16;

/// Minimal index span of a fixed-size state array changed since last clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyRange {
    span: Option<(usize, usize)>,
}

impl DirtyRange {
    /// An empty range.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A range spanning `lo..=hi`.
    #[must_use]
    pub fn spanning(lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi);
        Self {
            span: Some((lo, hi)),
        }
    }

    /// Expands the range to include `index`.
    pub fn mark(&mut self, index: usize) {
        self.span = match self.span {
            None => Some((index, index)),
            Some((lo, hi)) => Some((lo.min(index), hi.max(index))),
        };
    }

    /// Empties the range.
    pub fn clear(&mut self) {
        self.span = None;
    }

    /// Returns true if nothing is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span.is_none()
    }

    /// Returns true if `index` falls inside the marked span.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.span
            .is_some_and(|(lo, hi)| lo <= index && index <= hi)
    }

    /// Returns the inclusive bounds of the marked span, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.span
    }

    /// Returns the marked span as an iterable index range.
    #[must_use]
    pub fn indices(&self) -> std::ops::Range<usize> {
        match self.span {
            Some((lo, hi)) => lo..hi + 1,
            None => 0..0,
        }
    }
}

/// Maps raw host key indices to egui keys.
///
/// Hosts resolve their own key identifiers to stable integer indices; this
/// table tells a context which egui key each index stands for. The default
/// table assigns egui's key list to the low indices, which suits hosts that
/// feed egui-native key numbers. Raw indices with no mapping still reach the
/// per-frame snapshot but produce no key event.
pub struct KeyMap {
    to_key: [Option<egui::Key>; MAX_KEYS],
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (index, &key) in egui::Key::ALL.iter().enumerate() {
            map.map(index, key);
        }
        map
    }
}

impl KeyMap {
    /// Creates a table with no mappings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            to_key: [None; MAX_KEYS],
        }
    }

    /// Maps a raw index to a key, replacing any previous mapping.
    pub fn map(&mut self, index: usize, key: egui::Key) {
        assert!(index < MAX_KEYS, "key index out of range: {index}");
        self.to_key[index] = Some(key);
    }

    /// Returns the key mapped at `index`, if any.
    #[must_use]
    pub fn key_at(&self, index: usize) -> Option<egui::Key> {
        self.to_key.get(index).copied().flatten()
    }

    /// Returns the first raw index mapped to `key`, if any.
    #[must_use]
    pub fn index_of(&self, key: egui::Key) -> Option<usize> {
        self.to_key.iter().position(|&slot| slot == Some(key))
    }
}

/// Per-frame input snapshot applied to a context at frame start.
///
/// Mirrors the GUI library's IO input fields: persistent key/button/pointer
/// state survives across frames, while the wheel total and character queue
/// are frame deltas reset at every frame begin.
#[derive(Clone, Debug)]
pub struct FrameInput {
    /// Raw-indexed key down states.
    pub keys_down: [bool; MAX_KEYS],
    /// Mouse button down states.
    pub mouse_down: [bool; MAX_MOUSE_BUTTONS],
    /// Pointer position in the consumer's local space.
    pub mouse_position: Vec2,
    /// Whether a pointer is over the consumer.
    pub has_mouse_pointer: bool,
    /// Wheel delta accumulated for this frame.
    pub mouse_wheel: f32,
    /// Control modifier state.
    pub control_down: bool,
    /// Shift modifier state.
    pub shift_down: bool,
    /// Alt modifier state.
    pub alt_down: bool,
    /// Characters queued for this frame.
    pub characters: Vec<char>,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            keys_down: [false; MAX_KEYS],
            mouse_down: [false; MAX_MOUSE_BUTTONS],
            mouse_position: Vec2::ZERO,
            has_mouse_pointer: false,
            mouse_wheel: 0.0,
            control_down: false,
            shift_down: false,
            alt_down: false,
            characters: Vec::new(),
        }
    }
}

impl FrameInput {
    /// Returns whether the key at `index` is down.
    #[must_use]
    pub fn is_key_down(&self, index: usize) -> bool {
        self.keys_down.get(index).copied().unwrap_or(false)
    }

    /// Returns whether the mouse button at `index` is down.
    #[must_use]
    pub fn is_mouse_down(&self, index: usize) -> bool {
        self.mouse_down.get(index).copied().unwrap_or(false)
    }

    /// Resets the frame-delta fields (wheel total and character queue).
    ///
    /// Called at frame begin, before the pending input is applied, so deltas
    /// never leak from one frame into the next.
    pub fn reset_frame_deltas(&mut self) {
        self.mouse_wheel = 0.0;
        self.characters.clear();
    }
}

/// Accumulates pending input between frames.
pub struct InputState {
    mouse_position: Vec2,
    mouse_wheel_delta: f32,

    mouse_buttons_down: [bool; MAX_MOUSE_BUTTONS],
    mouse_buttons_dirty: DirtyRange,

    characters: Vec<char>,

    keys_down: [bool; MAX_KEYS],
    keys_dirty: DirtyRange,

    has_mouse_pointer: bool,

    control_down: bool,
    shift_down: bool,
    alt_down: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Creates an empty state with the whole update range marked dirty, so
    /// the first consumption copies everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mouse_position: Vec2::ZERO,
            mouse_wheel_delta: 0.0,
            mouse_buttons_down: [false; MAX_MOUSE_BUTTONS],
            mouse_buttons_dirty: DirtyRange::spanning(0, MAX_MOUSE_BUTTONS - 1),
            characters: Vec::new(),
            keys_down: [false; MAX_KEYS],
            keys_dirty: DirtyRange::spanning(0, MAX_KEYS - 1),
            has_mouse_pointer: false,
            control_down: false,
            shift_down: false,
            alt_down: false,
        }
    }

    /// Sets the down state of the key at `index`.
    pub fn set_key_down(&mut self, index: usize, down: bool) {
        assert!(index < MAX_KEYS, "key index out of range: {index}");
        if self.keys_down[index] != down {
            self.keys_down[index] = down;
            self.keys_dirty.mark(index);
        }
    }

    /// Sets the down state of the mouse button at `index`.
    pub fn set_mouse_down(&mut self, index: usize, down: bool) {
        assert!(index < MAX_MOUSE_BUTTONS, "mouse index out of range: {index}");
        if self.mouse_buttons_down[index] != down {
            self.mouse_buttons_down[index] = down;
            self.mouse_buttons_dirty.mark(index);
        }
    }

    /// Sets the pointer position (absolute, in the consumer's local space).
    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = position;
    }

    /// Adds to the accumulated wheel delta.
    pub fn add_mouse_wheel_delta(&mut self, delta: f32) {
        self.mouse_wheel_delta += delta;
    }

    /// Queues an input character. Characters beyond [`MAX_CHARACTERS`] per
    /// frame are discarded.
    pub fn add_character(&mut self, character: char) {
        if self.characters.len() < MAX_CHARACTERS {
            self.characters.push(character);
        }
    }

    /// Sets whether the consumer currently has an active pointer.
    pub fn set_mouse_pointer(&mut self, has_pointer: bool) {
        self.has_mouse_pointer = has_pointer;
    }

    /// Sets the Control modifier state.
    pub fn set_control_down(&mut self, down: bool) {
        self.control_down = down;
    }

    /// Sets the Shift modifier state.
    pub fn set_shift_down(&mut self, down: bool) {
        self.shift_down = down;
    }

    /// Sets the Alt modifier state.
    pub fn set_alt_down(&mut self, down: bool) {
        self.alt_down = down;
    }

    /// Returns the key down states.
    #[must_use]
    pub fn keys(&self) -> &[bool; MAX_KEYS] {
        &self.keys_down
    }

    /// Returns the dirty span of the key array.
    #[must_use]
    pub fn keys_update_range(&self) -> DirtyRange {
        self.keys_dirty
    }

    /// Returns the mouse button down states.
    #[must_use]
    pub fn mouse_buttons(&self) -> &[bool; MAX_MOUSE_BUTTONS] {
        &self.mouse_buttons_down
    }

    /// Returns the dirty span of the mouse button array.
    #[must_use]
    pub fn mouse_buttons_update_range(&self) -> DirtyRange {
        self.mouse_buttons_dirty
    }

    /// Returns the accumulated wheel delta.
    #[must_use]
    pub fn mouse_wheel_delta(&self) -> f32 {
        self.mouse_wheel_delta
    }

    /// Returns the pointer position.
    #[must_use]
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Returns whether the consumer has an active pointer.
    #[must_use]
    pub fn has_mouse_pointer(&self) -> bool {
        self.has_mouse_pointer
    }

    /// Returns the Control modifier state.
    #[must_use]
    pub fn is_control_down(&self) -> bool {
        self.control_down
    }

    /// Returns the Shift modifier state.
    #[must_use]
    pub fn is_shift_down(&self) -> bool {
        self.shift_down
    }

    /// Returns the Alt modifier state.
    #[must_use]
    pub fn is_alt_down(&self) -> bool {
        self.alt_down
    }

    /// Returns the queued characters.
    #[must_use]
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    /// Returns the current modifier flags as egui modifiers.
    #[must_use]
    pub fn modifiers(&self) -> egui::Modifiers {
        egui::Modifiers {
            alt: self.alt_down,
            ctrl: self.control_down,
            shift: self.shift_down,
            mac_cmd: false,
            command: self.control_down,
        }
    }

    /// Applies this state into a per-frame snapshot, emitting egui events.
    ///
    /// Keys and mouse buttons copy only their dirty spans; a press/release
    /// event is emitted for every entry whose value actually changes. The
    /// character queue is appended, the wheel delta is added to the
    /// snapshot's running total, and pointer position/visibility plus
    /// modifier flags copy unconditionally.
    pub fn copy_into(
        &self,
        io: &mut FrameInput,
        keys: &KeyMap,
        events: &mut Vec<egui::Event>,
    ) {
        let modifiers = self.modifiers();
        let pointer_pos = egui::pos2(self.mouse_position.x, self.mouse_position.y);

        // Pointer visibility and position copy unconditionally.
        if self.has_mouse_pointer {
            if !io.has_mouse_pointer || io.mouse_position != self.mouse_position {
                events.push(egui::Event::PointerMoved(pointer_pos));
            }
        } else if io.has_mouse_pointer {
            events.push(egui::Event::PointerGone);
        }
        io.mouse_position = self.mouse_position;
        io.has_mouse_pointer = self.has_mouse_pointer;

        // Modifier flags copy unconditionally.
        io.control_down = self.control_down;
        io.shift_down = self.shift_down;
        io.alt_down = self.alt_down;

        for index in self.mouse_buttons_dirty.indices() {
            let down = self.mouse_buttons_down[index];
            if io.mouse_down[index] != down {
                io.mouse_down[index] = down;
                if let Some(button) = pointer_button(index) {
                    events.push(egui::Event::PointerButton {
                        pos: pointer_pos,
                        button,
                        pressed: down,
                        modifiers,
                    });
                }
            }
        }

        for index in self.keys_dirty.indices() {
            let down = self.keys_down[index];
            if io.keys_down[index] != down {
                io.keys_down[index] = down;
                if let Some(key) = keys.key_at(index) {
                    events.push(egui::Event::Key {
                        key,
                        physical_key: None,
                        pressed: down,
                        repeat: false,
                        modifiers,
                    });
                }
            }
        }

        if self.mouse_wheel_delta != 0.0 {
            io.mouse_wheel += self.mouse_wheel_delta;
            events.push(egui::Event::MouseWheel {
                unit: egui::MouseWheelUnit::Line,
                delta: egui::vec2(0.0, self.mouse_wheel_delta),
                modifiers,
            });
        }

        for &character in &self.characters {
            io.characters.push(character);
            if !character.is_control() {
                events.push(egui::Event::Text(character.to_string()));
            }
        }
    }

    /// Clears the per-frame update state: character queue, wheel delta and
    /// dirty spans. Persistent key/button/pointer state is untouched.
    ///
    /// Must run once per frame, after draw callbacks had a chance to observe
    /// the deltas; it is deliberately decoupled from frame begin.
    pub fn clear_update_state(&mut self) {
        self.characters.clear();
        self.mouse_wheel_delta = 0.0;
        self.keys_dirty.clear();
        self.mouse_buttons_dirty.clear();
    }

    /// Resets all input state and marks the cleared spans dirty.
    pub fn reset_state(&mut self) {
        self.reset(true, true);
    }

    /// Resets keyboard state (keys and keyboard modifiers) only.
    ///
    /// Used when downgrading from full input focus to pointer-only input.
    pub fn reset_keyboard_state(&mut self) {
        self.reset(true, false);
    }

    /// Resets mouse state (buttons, wheel, pointer visibility) only.
    pub fn reset_mouse_state(&mut self) {
        self.reset(false, true);
    }

    fn reset(&mut self, keyboard: bool, mouse: bool) {
        if keyboard {
            self.keys_down = [false; MAX_KEYS];
            self.keys_dirty = DirtyRange::spanning(0, MAX_KEYS - 1);
            self.control_down = false;
            self.shift_down = false;
            self.alt_down = false;
        }
        if mouse {
            self.mouse_buttons_down = [false; MAX_MOUSE_BUTTONS];
            self.mouse_buttons_dirty = DirtyRange::spanning(0, MAX_MOUSE_BUTTONS - 1);
            self.mouse_wheel_delta = 0.0;
            self.has_mouse_pointer = false;
        }
    }
}

/// Maps a mouse button index to the egui button, if representable.
fn pointer_button(index: usize) -> Option<egui::PointerButton> {
    match index {
        0 => Some(egui::PointerButton::Primary),
        1 => Some(egui::PointerButton::Secondary),
        2 => Some(egui::PointerButton::Middle),
        3 => Some(egui::PointerButton::Extra1),
        4 => Some(egui::PointerButton::Extra2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn consumed(state: &InputState) -> (FrameInput, Vec<egui::Event>) {
        let mut io = FrameInput::default();
        let mut events = Vec::new();
        state.copy_into(&mut io, &KeyMap::default(), &mut events);
        (io, events)
    }

    #[test]
    fn test_dirty_range_marks_and_clears() {
        let mut range = DirtyRange::empty();
        assert!(range.is_empty());
        range.mark(7);
        range.mark(3);
        assert_eq!(range.bounds(), Some((3, 7)));
        assert!(range.contains(5));
        assert!(!range.contains(8));
        range.clear();
        assert!(range.is_empty());
        assert_eq!(range.indices().len(), 0);
    }

    #[test]
    fn test_new_state_is_fully_dirty() {
        let state = InputState::new();
        assert_eq!(state.keys_update_range().bounds(), Some((0, MAX_KEYS - 1)));
        assert_eq!(
            state.mouse_buttons_update_range().bounds(),
            Some((0, MAX_MOUSE_BUTTONS - 1))
        );
    }

    #[test]
    fn test_key_consume_updates_target_and_dirty_range() {
        let mut state = InputState::new();
        state.clear_update_state();

        state.set_key_down(3, true);
        assert!(state.keys_update_range().contains(3));

        let (io, _) = consumed(&state);
        assert!(io.is_key_down(3));
    }

    #[test]
    fn test_cleared_state_copies_no_keys_but_position_still_copies() {
        let mut state = InputState::new();
        state.set_key_down(3, true);
        state.set_mouse_position(Vec2::new(10.0, 20.0));
        state.clear_update_state();
        assert!(state.keys_update_range().is_empty());

        // With the dirty range empty nothing copies for keys, even if the
        // target disagrees with the accumulated value.
        let mut io = FrameInput::default();
        let mut events = Vec::new();
        state.copy_into(&mut io, &KeyMap::default(), &mut events);
        assert!(!io.is_key_down(3));
        assert_eq!(io.mouse_position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_consume_emits_key_event_for_mapped_index() {
        let keys = KeyMap::default();
        let index = keys.index_of(egui::Key::A).unwrap();

        let mut state = InputState::new();
        state.clear_update_state();
        state.set_key_down(index, true);

        let (io, events) = consumed(&state);
        assert!(io.is_key_down(index));
        assert!(events.iter().any(|event| matches!(
            event,
            egui::Event::Key {
                key: egui::Key::A,
                pressed: true,
                ..
            }
        )));
    }

    #[test]
    fn test_unmapped_index_reaches_snapshot_without_event() {
        let mut keys = KeyMap::empty();
        keys.map(0, egui::Key::Escape);

        let mut state = InputState::new();
        state.clear_update_state();
        state.set_key_down(400, true);

        let mut io = FrameInput::default();
        let mut events = Vec::new();
        state.copy_into(&mut io, &keys, &mut events);
        assert!(io.is_key_down(400));
        assert!(!events
            .iter()
            .any(|event| matches!(event, egui::Event::Key { .. })));
    }

    #[test]
    fn test_wheel_accumulates_then_clears() {
        let mut state = InputState::new();
        state.clear_update_state();
        state.add_mouse_wheel_delta(1.5);
        state.add_mouse_wheel_delta(-0.5);
        assert_eq!(state.mouse_wheel_delta(), 1.0);

        let (io, events) = consumed(&state);
        assert_eq!(io.mouse_wheel, 1.0);
        assert!(events
            .iter()
            .any(|event| matches!(event, egui::Event::MouseWheel { .. })));

        state.clear_update_state();
        assert_eq!(state.mouse_wheel_delta(), 0.0);
        let (io, events) = consumed(&state);
        assert_eq!(io.mouse_wheel, 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_character_queue_is_capped() {
        let mut state = InputState::new();
        for _ in 0..MAX_CHARACTERS + 4 {
            state.add_character('x');
        }
        assert_eq!(state.characters().len(), MAX_CHARACTERS);
    }

    #[test]
    fn test_pointer_events() {
        let mut state = InputState::new();
        state.clear_update_state();
        state.set_mouse_pointer(true);
        state.set_mouse_position(Vec2::new(100.0, 200.0));
        state.set_mouse_down(0, true);

        let (io, events) = consumed(&state);
        assert!(io.has_mouse_pointer);
        assert!(io.is_mouse_down(0));
        assert!(events
            .iter()
            .any(|event| matches!(event, egui::Event::PointerMoved(_))));
        assert!(events.iter().any(|event| matches!(
            event,
            egui::Event::PointerButton {
                button: egui::PointerButton::Primary,
                pressed: true,
                ..
            }
        )));

        // Pointer leaving produces a gone event against the previous state.
        let mut io = io;
        state.set_mouse_pointer(false);
        let mut events = Vec::new();
        state.copy_into(&mut io, &KeyMap::default(), &mut events);
        assert!(!io.has_mouse_pointer);
        assert!(events
            .iter()
            .any(|event| matches!(event, egui::Event::PointerGone)));
    }

    #[test]
    fn test_keyboard_reset_preserves_mouse() {
        let mut state = InputState::new();
        state.clear_update_state();
        state.set_key_down(5, true);
        state.set_shift_down(true);
        state.set_mouse_down(1, true);
        state.set_mouse_pointer(true);
        state.clear_update_state();

        state.reset_keyboard_state();
        assert!(!state.keys()[5]);
        assert!(!state.is_shift_down());
        assert!(state.mouse_buttons()[1]);
        assert!(state.has_mouse_pointer());
        // The cleared span is dirty so the next consumption propagates it.
        assert!(state.keys_update_range().contains(5));
        assert!(state.mouse_buttons_update_range().is_empty());
    }

    #[test]
    #[should_panic(expected = "key index out of range")]
    fn test_key_index_out_of_range_is_fatal() {
        let mut state = InputState::new();
        state.set_key_down(MAX_KEYS, true);
    }

    proptest! {
        #[test]
        fn prop_dirty_range_bounds_are_minimal(indices in proptest::collection::vec(0usize..MAX_KEYS, 1..32)) {
            let mut range = DirtyRange::empty();
            for &index in &indices {
                range.mark(index);
            }
            let lo = *indices.iter().min().unwrap();
            let hi = *indices.iter().max().unwrap();
            prop_assert_eq!(range.bounds(), Some((lo, hi)));
        }

        #[test]
        fn prop_consume_reflects_accumulated_keys(down in proptest::collection::vec(0usize..MAX_KEYS, 0..16)) {
            let mut state = InputState::new();
            state.clear_update_state();
            for &index in &down {
                state.set_key_down(index, true);
            }
            let mut io = FrameInput::default();
            let mut events = Vec::new();
            state.copy_into(&mut io, &KeyMap::empty(), &mut events);
            for &index in &down {
                prop_assert!(io.is_key_down(index));
            }
        }
    }
}

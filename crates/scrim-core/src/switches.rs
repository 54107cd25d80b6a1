//! Process-wide runtime switches.
//!
//! Switches are named boolean settings that hosts flip from console commands
//! or debug menus. They are stored in atomics so they can be read from any
//! thread, and they are consulted at tick/draw time rather than cached, so a
//! change takes effect on the next frame.

use std::sync::atomic::{AtomicBool, Ordering};

/// A named boolean switch with atomic storage.
pub struct BoolSwitch {
    name: &'static str,
    help: &'static str,
    value: AtomicBool,
}

impl BoolSwitch {
    const fn new(name: &'static str, help: &'static str, default: bool) -> Self {
        Self {
            name,
            help,
            value: AtomicBool::new(default),
        }
    }

    /// Returns the switch name used for lookup.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the one-line description of the switch.
    #[must_use]
    pub fn help(&self) -> &'static str {
        self.help
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    /// Sets the value.
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Flips the value and returns the new one.
    pub fn toggle(&self) -> bool {
        !self.value.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Whether host input events are routed into contexts.
pub static INPUT_ENABLED: BoolSwitch = BoolSwitch::new(
    "scrim.input_enabled",
    "Route host input events into contexts.",
    true,
);

/// Whether the built-in diagnostics window is drawn.
pub static SHOW_DEMO: BoolSwitch = BoolSwitch::new(
    "scrim.show_demo",
    "Show the built-in diagnostics window in every context.",
    false,
);

/// Whether multi-context draw callbacks fire before per-context ones.
pub static SHARED_DRAW_FIRST: BoolSwitch = BoolSwitch::new(
    "scrim.shared_draw_first",
    "Fire multi-context draw callbacks before per-context ones.",
    false,
);

/// Returns every registered switch.
#[must_use]
pub fn all() -> [&'static BoolSwitch; 3] {
    [&INPUT_ENABLED, &SHOW_DEMO, &SHARED_DRAW_FIRST]
}

/// Looks up a switch by name.
#[must_use]
pub fn find_bool(name: &str) -> Option<&'static BoolSwitch> {
    all().into_iter().find(|switch| switch.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(INPUT_ENABLED.get());
        assert!(!SHOW_DEMO.get());
        assert!(!SHARED_DRAW_FIRST.get());
    }

    #[test]
    fn test_find_bool() {
        for switch in all() {
            let found = find_bool(switch.name()).expect("registered switch must be findable");
            assert_eq!(found.name(), switch.name());
        }
        assert!(find_bool("scrim.no_such_switch").is_none());
    }

    #[test]
    fn test_toggle_round_trip() {
        let switch = find_bool("scrim.show_demo").unwrap();
        let before = switch.get();
        assert_eq!(switch.toggle(), !before);
        assert_eq!(switch.toggle(), before);
    }
}

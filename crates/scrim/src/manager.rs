//! Registry of context proxies keyed by logical scope.
//!
//! One proxy exists per scope: the reserved editor and standalone scopes,
//! plus a dynamic scope per host world, created and destroyed as worlds come
//! and go. The manager also owns the shared draw-callback list that every
//! context's draw broadcast consults.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use scrim_core::{CallbackHandle, DrawMulticast};

use crate::context::{ContextProxy, SharedDrawList};

/// Index identifying one context scope.
///
/// Indices are stable for the lifetime of the scope they denote. Dynamic
/// indices are assigned monotonically and never reused, so a stale index can
/// never alias a newer scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeIndex(u32);

impl ScopeIndex {
    /// The editor-wide context.
    pub const EDITOR: Self = Self(0);
    /// The headless/standalone game context.
    pub const STANDALONE: Self = Self(1);

    const FIRST_DYNAMIC: u32 = 2;

    /// Returns the raw index value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier of a host world owning a dynamic scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldId(pub u64);

/// Owns every context proxy and the shared draw-callback list.
pub struct ContextManager {
    save_dir: PathBuf,
    shared_draw_event: SharedDrawList,
    proxies: HashMap<ScopeIndex, ContextProxy>,
    world_scopes: HashMap<WorldId, ScopeIndex>,
    next_dynamic: u32,
}

impl ContextManager {
    /// Creates a manager persisting layouts under `save_dir`.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            shared_draw_event: Rc::new(RefCell::new(DrawMulticast::new())),
            proxies: HashMap::new(),
            world_scopes: HashMap::new(),
            next_dynamic: ScopeIndex::FIRST_DYNAMIC,
        }
    }

    /// Returns the editor proxy, creating it on first use.
    pub fn editor_proxy(&mut self) -> &mut ContextProxy {
        self.get_or_create(ScopeIndex::EDITOR, "editor")
    }

    /// Returns the standalone game proxy, creating it on first use.
    pub fn standalone_proxy(&mut self) -> &mut ContextProxy {
        self.get_or_create(ScopeIndex::STANDALONE, "game")
    }

    /// Returns the proxy for a world, creating scope and proxy on first use.
    pub fn world_proxy(&mut self, world: WorldId) -> (ScopeIndex, &mut ContextProxy) {
        let scope = if let Some(&scope) = self.world_scopes.get(&world) {
            scope
        } else {
            let scope = ScopeIndex(self.next_dynamic);
            self.next_dynamic += 1;
            self.world_scopes.insert(world, scope);
            scope
        };
        let name = format!("world-{}", world.0);
        (scope, self.get_or_create(scope, &name))
    }

    /// Returns the scope assigned to a world, if one exists.
    #[must_use]
    pub fn world_scope(&self, world: WorldId) -> Option<ScopeIndex> {
        self.world_scopes.get(&world).copied()
    }

    /// Returns the proxy for `scope`, or `None` for unknown scopes.
    #[must_use]
    pub fn proxy(&self, scope: ScopeIndex) -> Option<&ContextProxy> {
        self.proxies.get(&scope)
    }

    /// Returns the proxy for `scope` mutably, or `None` for unknown scopes.
    pub fn proxy_mut(&mut self, scope: ScopeIndex) -> Option<&mut ContextProxy> {
        self.proxies.get_mut(&scope)
    }

    /// Destroys the proxy for `scope`, persisting its layout.
    ///
    /// Returns false if the scope had no proxy. A destroyed dynamic index is
    /// retired, never reassigned.
    pub fn destroy(&mut self, scope: ScopeIndex) -> bool {
        let removed = self.proxies.remove(&scope).is_some();
        self.world_scopes.retain(|_, &mut s| s != scope);
        removed
    }

    /// Destroys the proxy owned by `world`, if any.
    pub fn destroy_world(&mut self, world: WorldId) -> bool {
        match self.world_scopes.remove(&world) {
            Some(scope) => self.proxies.remove(&scope).is_some(),
            None => false,
        }
    }

    /// Registers a draw callback that fires for every context's draw.
    ///
    /// Interleaving with per-context callbacks follows the
    /// `shared_draw_first` switch.
    pub fn add_multi_context_draw_callback(
        &self,
        callback: impl FnMut(&egui::Context) + 'static,
    ) -> CallbackHandle {
        self.shared_draw_event.borrow_mut().add(callback)
    }

    /// Removes a multi-context draw callback by handle.
    pub fn remove_multi_context_draw_callback(&self, handle: CallbackHandle) -> bool {
        self.shared_draw_event.borrow_mut().remove(handle)
    }

    /// Advances every context to the next frame.
    pub fn tick_all(&mut self, frame: u64, delta_seconds: f32) {
        for proxy in self.proxies.values_mut() {
            proxy.tick(frame, delta_seconds);
        }
    }

    /// Returns the number of live contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Returns true if no contexts exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Returns the live scope indices.
    pub fn scopes(&self) -> impl Iterator<Item = ScopeIndex> + '_ {
        self.proxies.keys().copied()
    }

    fn get_or_create(&mut self, scope: ScopeIndex, name: &str) -> &mut ContextProxy {
        let save_dir = &self.save_dir;
        let shared = &self.shared_draw_event;
        self.proxies.entry(scope).or_insert_with(|| {
            log::debug!("creating context '{name}' for scope {}", scope.as_u32());
            ContextProxy::new(name, save_dir, Rc::clone(shared))
        })
    }
}

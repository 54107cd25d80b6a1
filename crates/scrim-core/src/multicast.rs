//! Ordered draw-callback lists with stable removal handles.
//!
//! A context broadcasts its draw event once per frame to let listeners add
//! their widgets. Callbacks are invoked in registration order and removed by
//! the opaque handle returned at registration, independent of order.

use std::cell::RefCell;
use std::rc::Rc;

type DrawFn = dyn FnMut(&egui::Context);

/// Opaque handle identifying a registered draw callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

/// An ordered list of draw callbacks.
#[derive(Default)]
pub struct DrawMulticast {
    next_handle: u64,
    slots: Vec<(CallbackHandle, Rc<RefCell<DrawFn>>)>,
}

/// A borrow-free snapshot of a multicast's callbacks.
///
/// Invoking a snapshot does not hold any borrow of the originating list, so
/// callbacks are free to register or remove callbacks on it while the
/// broadcast runs; such changes take effect from the next broadcast.
pub struct Broadcast(Vec<Rc<RefCell<DrawFn>>>);

impl Broadcast {
    /// Invokes every callback in the snapshot, in registration order.
    pub fn invoke(self, ctx: &egui::Context) {
        for callback in self.0 {
            (&mut *callback.borrow_mut())(ctx);
        }
    }

    /// Returns true if the snapshot holds no callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl DrawMulticast {
    /// Creates an empty callback list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns the handle that removes it.
    pub fn add(&mut self, callback: impl FnMut(&egui::Context) + 'static) -> CallbackHandle {
        self.next_handle += 1;
        let handle = CallbackHandle(self.next_handle);
        self.slots.push((handle, Rc::new(RefCell::new(callback))));
        handle
    }

    /// Removes a callback by handle. Returns false if the handle is unknown.
    pub fn remove(&mut self, handle: CallbackHandle) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(h, _)| *h != handle);
        self.slots.len() != before
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Takes a borrow-free snapshot of the current callbacks.
    #[must_use]
    pub fn snapshot(&self) -> Broadcast {
        Broadcast(self.slots.iter().map(|(_, f)| Rc::clone(f)).collect())
    }

    /// Invokes every registered callback in registration order.
    pub fn broadcast(&self, ctx: &egui::Context) {
        self.snapshot().invoke(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut list = DrawMulticast::new();
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            list.add(move |_| order.borrow_mut().push(tag));
        }

        let ctx = egui::Context::default();
        list.broadcast(&ctx);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_by_handle_is_order_independent() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut list = DrawMulticast::new();
        let mut handles = Vec::new();
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            handles.push(list.add(move |_| order.borrow_mut().push(tag)));
        }

        assert!(list.remove(handles[1]));
        assert!(!list.remove(handles[1]));
        assert_eq!(list.len(), 2);

        let ctx = egui::Context::default();
        list.broadcast(&ctx);
        assert_eq!(*order.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut list = DrawMulticast::new();
        let a = list.add(|_| {});
        let b = list.add(|_| {});
        assert_ne!(a, b);
    }

    #[test]
    fn test_snapshot_tolerates_reentrant_registration() {
        let list = Rc::new(RefCell::new(DrawMulticast::new()));
        let fired = Rc::new(RefCell::new(0));

        {
            let list = Rc::clone(&list);
            let fired = Rc::clone(&fired);
            list.clone().borrow_mut().add(move |_| {
                *fired.borrow_mut() += 1;
                // Registering during a broadcast must not fire this round.
                let fired = Rc::clone(&fired);
                list.borrow_mut().add(move |_| {
                    *fired.borrow_mut() += 10;
                });
            });
        }

        let ctx = egui::Context::default();
        let snapshot = list.borrow().snapshot();
        snapshot.invoke(&ctx);
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(list.borrow().len(), 2);
    }
}

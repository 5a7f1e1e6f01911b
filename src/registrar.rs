use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

/// The logical button identifier a driver's transitions are reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct VirtualKey(pub u16);

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {}", self.0)
    }
}

/// Controller-supplied callback interface for key events.
pub trait KeyHandler {
    /// A key went down. `repeat_count` is 0 for a fresh press and increments
    /// for consecutive downs without an intervening up.
    fn on_key_down(&mut self, key: VirtualKey, repeat_count: u32);

    /// A key went up.
    fn on_key_up(&mut self, key: VirtualKey);
}

#[derive(Debug)]
enum QueuedEvent {
    Down(VirtualKey, u32),
    Up(VirtualKey),
}

#[derive(Debug, Default)]
struct Inner {
    registered: HashSet<VirtualKey>,
    queue: VecDeque<QueuedEvent>,
    down_streak: HashMap<VirtualKey, u32>,
}

/// Input registrar collaborator.
///
/// Drivers report their accepted output flips here as key transitions; the
/// controller drains them with [`Registrar::dispatch`]. Events for keys
/// nobody registered are dropped. The handle is a cheap clone sharing one
/// queue; everything runs on the single event-processing thread, so there is
/// no locking.
#[derive(Debug, Clone, Default)]
pub struct Registrar {
    inner: Rc<RefCell<Inner>>,
}

impl Registrar {
    pub fn new() -> Self {
        Registrar::default()
    }

    pub(crate) fn register(&self, key: VirtualKey) {
        self.inner.borrow_mut().registered.insert(key);
        debug!("registered {key}");
    }

    pub(crate) fn unregister(&self, key: VirtualKey) {
        let inner = &mut *self.inner.borrow_mut();
        inner.registered.remove(&key);
        inner.down_streak.remove(&key);
        debug!("unregistered {key}");
    }

    pub fn is_registered(&self, key: VirtualKey) -> bool {
        self.inner.borrow().registered.contains(&key)
    }

    /// Report a key transition: `pressed` is true for down, false for up.
    pub(crate) fn report(&self, key: VirtualKey, pressed: bool) {
        let inner = &mut *self.inner.borrow_mut();
        if !inner.registered.contains(&key) {
            trace!("dropping event for unregistered {key}");
            return;
        }
        if pressed {
            let streak = inner.down_streak.entry(key).or_insert(0);
            let repeat_count = *streak;
            *streak += 1;
            info!("{key} down (repeat {repeat_count})");
            inner.queue.push_back(QueuedEvent::Down(key, repeat_count));
        } else {
            inner.down_streak.remove(&key);
            info!("{key} up");
            inner.queue.push_back(QueuedEvent::Up(key));
        }
    }

    /// Drain all queued events into the handler, returning how many were
    /// delivered.
    ///
    /// The queue is detached before the handler runs, so the handler is free
    /// to call back into drivers that report further events; those are
    /// delivered on the next dispatch.
    pub fn dispatch(&self, handler: &mut dyn KeyHandler) -> usize {
        let drained: Vec<QueuedEvent> = self.inner.borrow_mut().queue.drain(..).collect();
        let count = drained.len();
        for event in drained {
            match event {
                QueuedEvent::Down(key, repeat_count) => handler.on_key_down(key, repeat_count),
                QueuedEvent::Up(key) => handler.on_key_up(key),
            }
        }
        count
    }
}

//! Queue of [`KioskEvent`]s flowing from the session controller to the screens.
//!
//! The controller pushes screen changes, chat turns, validation messages and
//! farewell ticks as they happen, including from inside spawned futures. The
//! egui frame drains the queue once per repaint and folds it into `UiState`,
//! so events arrive at the UI in the order the controller produced them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use kairos_types::event::KioskEvent;

/// Handle to the kiosk's pending-event queue. Clones share one queue.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<KioskEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next frame.
    pub fn emit(&self, event: KioskEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<KioskEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// True while the UI still has events to apply; the app repaints on it.
    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

//! Typed application events.
//!
//! A single-threaded broadcast bus: every subscriber owns a queue and sees
//! the events published after it subscribed. Queues are drained with
//! [`EventReceiver::poll_events`].

use crate::frame::Color;
use crate::tools::ToolKind;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Events exchanged between editor components.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Show a notification banner with the given content.
    ShowNotification { content: String },
    /// Hide the current notification banner.
    HideNotification,
    /// The active frame index changed.
    CurrentFrameChanged { index: usize },
    /// Frame content or frame list changed through an edit.
    FrameSheetUpdated,
    /// The whole sheet was replaced (deserialize, restore, undo/redo).
    FrameSheetReset,
    /// A tool was selected.
    ToolSelected(ToolKind),
    /// The primary drawing color changed.
    PrimaryColorChanged(Color),
    /// The selection rectangle changed or was cleared.
    SelectionChanged,
}

type Queue = Rc<RefCell<VecDeque<AppEvent>>>;

/// Broadcast bus handle. Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Rc<RefCell<Vec<Weak<RefCell<VecDeque<AppEvent>>>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> EventReceiver {
        let queue: Queue = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.borrow_mut().push(Rc::downgrade(&queue));
        EventReceiver { queue }
    }

    /// Publish an event to every live subscriber.
    pub fn publish(&self, event: AppEvent) {
        log::debug!("event: {:?}", event);
        let mut subscribers = self.subscribers.borrow_mut();
        // Dropped receivers are pruned lazily
        subscribers.retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(event.clone());
                true
            }
            None => false,
        });
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct EventReceiver {
    queue: Queue,
}

impl EventReceiver {
    /// Drain pending events (non-blocking), oldest first.
    pub fn poll_events(&mut self) -> Vec<AppEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

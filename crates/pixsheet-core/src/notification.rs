//! Notification banner state.

use crate::events::{AppEvent, EventBus, EventReceiver};

/// Follows show/hide notification events and keeps the visible message.
#[derive(Debug)]
pub struct NotificationService {
    receiver: EventReceiver,
    current: Option<String>,
}

impl NotificationService {
    pub fn new(events: &EventBus) -> Self {
        Self {
            receiver: events.subscribe(),
            current: None,
        }
    }

    /// Apply pending events. Returns true if the visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for event in self.receiver.poll_events() {
            match event {
                AppEvent::ShowNotification { content } => {
                    log::info!("notification: {}", content);
                    self.current = Some(content);
                    changed = true;
                }
                AppEvent::HideNotification => {
                    changed |= self.current.take().is_some();
                }
                _ => {}
            }
        }
        changed
    }

    /// Currently displayed content, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

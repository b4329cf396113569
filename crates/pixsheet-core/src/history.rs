//! Snapshot-based undo/redo for the frame sheet.

use crate::events::{AppEvent, EventBus, EventReceiver};
use crate::frame::Frame;
use crate::framesheet::FrameSheet;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of the sheet for undo/redo.
#[derive(Debug, Clone, PartialEq)]
struct SheetSnapshot {
    frames: Vec<Frame>,
    current_index: usize,
}

impl SheetSnapshot {
    fn capture(sheet: &FrameSheet) -> Self {
        Self {
            frames: sheet.frames().to_vec(),
            current_index: sheet.current_frame_index(),
        }
    }
}

/// Records a snapshot after every sheet update and walks back and forth
/// through them.
#[derive(Debug)]
pub struct HistoryManager {
    receiver: EventReceiver,
    /// State the sheet is currently in.
    current: Option<SheetSnapshot>,
    undo_stack: Vec<SheetSnapshot>,
    redo_stack: Vec<SheetSnapshot>,
    /// Resets published by our own undo/redo, still to be seen in the queue.
    own_resets: usize,
}

impl HistoryManager {
    pub fn new(events: &EventBus) -> Self {
        Self {
            receiver: events.subscribe(),
            current: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            own_resets: 0,
        }
    }

    /// Capture the starting state.
    pub fn init(&mut self, sheet: &FrameSheet) {
        self.current = Some(SheetSnapshot::capture(sheet));
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Process pending events: updates push history, resets restart it.
    pub fn poll(&mut self, sheet: &FrameSheet) {
        for event in self.receiver.poll_events() {
            match event {
                AppEvent::FrameSheetUpdated => self.record(sheet),
                AppEvent::FrameSheetReset if self.own_resets > 0 => self.own_resets -= 1,
                AppEvent::FrameSheetReset => self.init(sheet),
                _ => {}
            }
        }
    }

    fn record(&mut self, sheet: &FrameSheet) {
        let snapshot = SheetSnapshot::capture(sheet);
        if self.current.as_ref() == Some(&snapshot) {
            return;
        }
        if let Some(previous) = self.current.replace(snapshot) {
            self.undo_stack.push(previous);
        }
        // Clear redo stack when new changes are made
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change. Returns true if undo was performed.
    pub fn undo(&mut self, sheet: &mut FrameSheet) -> bool {
        // Edits not yet seen through events still count
        self.poll(sheet);
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.current.replace(snapshot.clone()) {
            self.redo_stack.push(current);
        }
        self.own_resets += 1;
        sheet.restore_frames(snapshot.frames, snapshot.current_index);
        true
    }

    /// Redo the last undone change. Returns true if redo was performed.
    pub fn redo(&mut self, sheet: &mut FrameSheet) -> bool {
        self.poll(sheet);
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        if let Some(current) = self.current.replace(snapshot.clone()) {
            self.undo_stack.push(current);
        }
        self.own_resets += 1;
        sheet.restore_frames(snapshot.frames, snapshot.current_index);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

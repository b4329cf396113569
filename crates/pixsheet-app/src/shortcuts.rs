//! Keyboard shortcuts and the key manager resolving them.

use pixsheet_core::ToolKind;

/// Something the editor can do in response to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    SelectTool(ToolKind),
    AddFrame,
    DuplicateFrame,
    RemoveFrame,
    PreviousFrame,
    NextFrame,
    /// Upload the sheet to the service.
    Store,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub action: Action,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        action: Action,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.ctrl == ctrl && self.shift == shift && self.key.eq_ignore_ascii_case(key)
    }
}

/// Maps key presses to editor actions.
#[derive(Debug, Clone)]
pub struct KeyManager {
    shortcuts: Vec<Shortcut>,
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            shortcuts: vec![
                Shortcut::new("Z", true, false, "Undo", Action::Undo),
                Shortcut::new("Y", true, false, "Redo", Action::Redo),
                Shortcut::new("Z", true, true, "Redo", Action::Redo),
                Shortcut::new("C", true, false, "Copy selection", Action::Copy),
                Shortcut::new("X", true, false, "Cut selection", Action::Cut),
                Shortcut::new("V", true, false, "Paste", Action::Paste),
                Shortcut::new("P", false, false, "Pen", Action::SelectTool(ToolKind::Pen)),
                Shortcut::new("E", false, false, "Eraser", Action::SelectTool(ToolKind::Eraser)),
                Shortcut::new("B", false, false, "Paint bucket", Action::SelectTool(ToolKind::PaintBucket)),
                Shortcut::new("S", false, false, "Rectangle selection", Action::SelectTool(ToolKind::Select)),
                Shortcut::new("O", false, false, "Color picker", Action::SelectTool(ToolKind::ColorPicker)),
                Shortcut::new("N", false, false, "New frame", Action::AddFrame),
                Shortcut::new("D", false, false, "Duplicate frame", Action::DuplicateFrame),
                Shortcut::new("Delete", false, false, "Remove frame", Action::RemoveFrame),
                Shortcut::new("ArrowUp", false, false, "Previous frame", Action::PreviousFrame),
                Shortcut::new("ArrowDown", false, false, "Next frame", Action::NextFrame),
                Shortcut::new("S", true, false, "Store on the server", Action::Store),
            ],
        }
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Action bound to a key press. `key` is the DOM `KeyboardEvent.key`
    /// value; letters match regardless of case.
    pub fn resolve(&self, key: &str, ctrl: bool, shift: bool) -> Option<Action> {
        self.shortcuts
            .iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.action)
    }

    /// Whether key presses aimed at an element with this tag name are
    /// shortcuts. Keys typed into form fields are left to the field.
    pub fn accepts_target(tag_name: &str) -> bool {
        !["INPUT", "TEXTAREA", "SELECT"]
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(tag_name))
    }
}

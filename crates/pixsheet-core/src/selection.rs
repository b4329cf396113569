//! Rectangular pixel selection with copy/cut/paste.

use crate::events::{AppEvent, EventBus, EventReceiver};
use crate::frame::{Color, Frame};
use crate::framesheet::FrameSheet;

/// Marquee color drawn into the overlay frame.
pub const SELECTION_COLOR: Color = Color::rgba(59, 130, 246, 255);

/// An inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Normalized rectangle spanning two corners, clipped to `frame`.
    /// Returns `None` if the rectangle lies entirely outside.
    pub fn from_corners(a: (i32, i32), b: (i32, i32), frame: &Frame) -> Option<Self> {
        let max_x = frame.width() as i32 - 1;
        let max_y = frame.height() as i32 - 1;
        let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
        let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
        if x1 < 0 || y1 < 0 || x0 > max_x || y0 > max_y {
            return None;
        }
        let (x0, x1) = (x0.max(0), x1.min(max_x));
        let (y0, y1) = (y0.max(0), y1.min(max_y));
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Pixels on the rectangle border.
    pub fn is_border(&self, x: u32, y: u32) -> bool {
        self.contains(x, y)
            && (x == self.x
                || y == self.y
                || x == self.x + self.width - 1
                || y == self.y + self.height - 1)
    }
}

/// Pixels copied out of a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Clipboard {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

/// Tracks the active frame and an optional rectangular selection on it.
#[derive(Debug)]
pub struct SelectionManager {
    receiver: EventReceiver,
    events: EventBus,
    current_frame: Option<usize>,
    selection: Option<PixelRect>,
    /// Corner where an in-progress drag started.
    drag_origin: Option<(i32, i32)>,
    clipboard: Option<Clipboard>,
}

impl SelectionManager {
    /// Subscribes immediately: the active frame is learned from the next
    /// `CurrentFrameChanged` event.
    pub fn new(events: &EventBus) -> Self {
        Self {
            receiver: events.subscribe(),
            events: events.clone(),
            current_frame: None,
            selection: None,
            drag_origin: None,
            clipboard: None,
        }
    }

    /// Process pending events. Frame changes and resets drop the selection.
    pub fn poll(&mut self) {
        for event in self.receiver.poll_events() {
            match event {
                AppEvent::CurrentFrameChanged { index } => {
                    if self.current_frame != Some(index) {
                        self.clear();
                    }
                    self.current_frame = Some(index);
                }
                AppEvent::FrameSheetReset => self.clear(),
                _ => {}
            }
        }
    }

    /// Frame index the selection applies to.
    pub fn current_frame(&self) -> Option<usize> {
        self.current_frame
    }

    pub fn selection(&self) -> Option<PixelRect> {
        self.selection
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn begin_drag(&mut self, x: i32, y: i32) {
        self.drag_origin = Some((x, y));
    }

    pub fn update_drag(&mut self, x: i32, y: i32, frame: &Frame) {
        if let Some(origin) = self.drag_origin {
            self.set_selection(PixelRect::from_corners(origin, (x, y), frame));
        }
    }

    pub fn end_drag(&mut self, x: i32, y: i32, frame: &Frame) {
        self.update_drag(x, y, frame);
        self.drag_origin = None;
    }

    pub fn select_all(&mut self, frame: &Frame) {
        self.set_selection(Some(PixelRect {
            x: 0,
            y: 0,
            width: frame.width(),
            height: frame.height(),
        }));
    }

    pub fn clear(&mut self) {
        self.drag_origin = None;
        self.set_selection(None);
    }

    fn set_selection(&mut self, selection: Option<PixelRect>) {
        if self.selection != selection {
            self.selection = selection;
            self.events.publish(AppEvent::SelectionChanged);
        }
    }

    /// Copy the selected pixels of the current frame.
    pub fn copy(&mut self, sheet: &FrameSheet) -> bool {
        let (Some(rect), Some(frame)) = (self.selection, self.frame(sheet)) else {
            return false;
        };
        let mut pixels = Vec::with_capacity((rect.width * rect.height) as usize);
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                pixels.push(frame.get_pixel(x, y).unwrap_or(Color::TRANSPARENT));
            }
        }
        self.clipboard = Some(Clipboard {
            width: rect.width,
            height: rect.height,
            pixels,
        });
        true
    }

    /// Copy then erase the selected pixels.
    pub fn cut(&mut self, sheet: &mut FrameSheet) -> bool {
        if !self.copy(sheet) {
            return false;
        }
        let Some(rect) = self.selection else {
            return false;
        };
        let Some(frame) = self.frame_mut(sheet) else {
            return false;
        };
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                frame.set_pixel(x, y, Color::TRANSPARENT);
            }
        }
        sheet.mark_updated();
        true
    }

    /// Paste the clipboard at the selection origin (or the top-left corner).
    /// Transparent clipboard pixels leave the target untouched.
    pub fn paste(&mut self, sheet: &mut FrameSheet) -> bool {
        let Some(clipboard) = self.clipboard.clone() else {
            return false;
        };
        let (ox, oy) = self.selection.map(|r| (r.x, r.y)).unwrap_or((0, 0));
        let Some(frame) = self.frame_mut(sheet) else {
            return false;
        };
        for cy in 0..clipboard.height {
            for cx in 0..clipboard.width {
                let color = clipboard.pixels[(cy * clipboard.width + cx) as usize];
                if !color.is_transparent() {
                    frame.set_pixel(ox + cx, oy + cy, color);
                }
            }
        }
        sheet.mark_updated();
        true
    }

    /// Draw the selection marquee into an overlay frame.
    pub fn render_overlay(&self, overlay: &mut Frame) {
        overlay.clear();
        if let Some(rect) = self.selection {
            for y in rect.y..rect.y + rect.height {
                for x in rect.x..rect.x + rect.width {
                    if rect.is_border(x, y) {
                        overlay.set_pixel(x, y, SELECTION_COLOR);
                    }
                }
            }
        }
    }

    fn frame<'a>(&self, sheet: &'a FrameSheet) -> Option<&'a Frame> {
        sheet.frame(self.current_frame?)
    }

    fn frame_mut<'a>(&self, sheet: &'a mut FrameSheet) -> Option<&'a mut Frame> {
        sheet.frame_mut(self.current_frame?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (FrameSheet, SelectionManager) {
        let bus = EventBus::new();
        let mut sheet = FrameSheet::new(4, 4, bus.clone());
        sheet.add_empty_frame();
        sheet.add_empty_frame();
        let selection = SelectionManager::new(&bus);
        sheet.set_current_frame_index(0);
        (sheet, selection)
    }

    #[test]
    fn test_captures_initial_frame() {
        let (_sheet, mut selection) = setup();
        assert_eq!(selection.current_frame(), None);
        selection.poll();
        assert_eq!(selection.current_frame(), Some(0));
    }

    #[test]
    fn test_created_late_misses_initial_frame() {
        let bus = EventBus::new();
        let mut sheet = FrameSheet::new(4, 4, bus.clone());
        sheet.add_empty_frame();
        sheet.set_current_frame_index(0);
        let mut selection = SelectionManager::new(&bus);
        selection.poll();
        assert_eq!(selection.current_frame(), None);
    }

    #[test]
    fn test_drag_selection_is_clipped() {
        let (sheet, mut selection) = setup();
        selection.poll();
        let frame = sheet.frame(0).unwrap();
        selection.begin_drag(2, 3);
        selection.end_drag(-5, 1, frame);
        assert_eq!(
            selection.selection(),
            Some(PixelRect { x: 0, y: 1, width: 3, height: 3 })
        );

        selection.begin_drag(10, 10);
        selection.end_drag(20, 20, frame);
        assert_eq!(selection.selection(), None);
    }

    #[test]
    fn test_cut_and_paste() {
        let (mut sheet, mut selection) = setup();
        selection.poll();
        sheet.frame_mut(0).unwrap().set_pixel(0, 0, Color::WHITE);
        sheet.frame_mut(0).unwrap().set_pixel(1, 0, Color::BLACK);

        let frame = sheet.frame(0).unwrap().clone();
        selection.begin_drag(0, 0);
        selection.end_drag(1, 0, &frame);
        assert!(selection.cut(&mut sheet));
        assert!(sheet.frame(0).unwrap().is_empty());

        // Paste on the second frame at its top-left corner
        sheet.set_current_frame_index(1);
        selection.poll();
        assert_eq!(selection.selection(), None);
        assert!(selection.paste(&mut sheet));
        let second = sheet.frame(1).unwrap();
        assert_eq!(second.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(second.get_pixel(1, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_overlay_draws_border_only() {
        let (sheet, mut selection) = setup();
        selection.poll();
        selection.select_all(sheet.frame(0).unwrap());

        let mut overlay = Frame::new(4, 4);
        selection.render_overlay(&mut overlay);
        assert_eq!(overlay.get_pixel(0, 0), Some(SELECTION_COLOR));
        assert_eq!(overlay.get_pixel(3, 2), Some(SELECTION_COLOR));
        assert_eq!(overlay.get_pixel(1, 1), Some(Color::TRANSPARENT));

        selection.clear();
        selection.render_overlay(&mut overlay);
        assert!(overlay.is_empty());
    }
}

//! Frame sheet: the ordered list of frames making up an animated sprite.

use crate::events::{AppEvent, EventBus};
use crate::frame::{Color, Frame};
use thiserror::Error;

/// Frame sheet errors.
#[derive(Debug, Error, PartialEq)]
pub enum FrameSheetError {
    #[error("Invalid frame sheet data: {0}")]
    InvalidData(String),
    #[error("Frame sheet contains no frames")]
    Empty,
    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("Frame index {index} out of range (frame count {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Cannot remove the last frame")]
    LastFrame,
}

/// An animated sprite: equally sized frames plus the active frame index.
#[derive(Debug)]
pub struct FrameSheet {
    width: u32,
    height: u32,
    frames: Vec<Frame>,
    current_index: usize,
    events: EventBus,
}

impl FrameSheet {
    /// Create an empty sheet (no frames yet) publishing on `events`.
    pub fn new(width: u32, height: u32, events: EventBus) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
            current_index: 0,
            events,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_index
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.current_index)
    }

    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.get_mut(self.current_index)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Append a transparent frame.
    pub fn add_empty_frame(&mut self) {
        self.frames.push(Frame::new(self.width, self.height));
    }

    /// Append an existing frame. Its size must match the sheet.
    pub fn add_frame(&mut self, frame: Frame) -> Result<(), FrameSheetError> {
        self.check_size(self.frames.len(), &frame)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Insert a copy of frame `index` right after it.
    pub fn duplicate_frame(&mut self, index: usize) -> Result<(), FrameSheetError> {
        let frame = self.checked(index)?.clone();
        self.frames.insert(index + 1, frame);
        Ok(())
    }

    /// Remove frame `index`. The last remaining frame cannot be removed.
    pub fn remove_frame(&mut self, index: usize) -> Result<Frame, FrameSheetError> {
        self.checked(index)?;
        if self.frames.len() == 1 {
            return Err(FrameSheetError::LastFrame);
        }
        let removed = self.frames.remove(index);
        let current = if index < self.current_index {
            self.current_index - 1
        } else {
            self.current_index
        };
        self.set_current_frame_index(current);
        Ok(removed)
    }

    /// Move a frame to a new position.
    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), FrameSheetError> {
        self.checked(from)?;
        self.checked(to)?;
        let frame = self.frames.remove(from);
        self.frames.insert(to, frame);
        Ok(())
    }

    /// Set the active frame and notify listeners.
    ///
    /// Indices past the end are clamped to the last frame.
    pub fn set_current_frame_index(&mut self, index: usize) {
        self.current_index = index.min(self.frames.len().saturating_sub(1));
        self.events.publish(AppEvent::CurrentFrameChanged {
            index: self.current_index,
        });
    }

    /// Announce that frame content changed through an edit.
    pub fn mark_updated(&self) {
        self.events.publish(AppEvent::FrameSheetUpdated);
    }

    /// Serialize to the legacy JSON layout: `frames[i][x][y]` color strings.
    pub fn serialize(&self) -> String {
        let layout: Vec<Vec<Vec<Color>>> = self.frames.iter().map(Frame::to_columns).collect();
        // Colors always serialize as strings
        serde_json::to_string(&layout).unwrap_or_else(|_| "[]".to_string())
    }

    /// Replace the sheet content from serialized data.
    ///
    /// On failure the sheet is left untouched.
    pub fn deserialize(&mut self, data: &str) -> Result<(), FrameSheetError> {
        let frames = parse_frames(data)?;
        let first = &frames[0];
        self.width = first.width();
        self.height = first.height();
        self.frames = frames;
        self.current_index = 0;
        self.events.publish(AppEvent::FrameSheetReset);
        self.set_current_frame_index(0);
        Ok(())
    }

    /// Replace all frames with a snapshot, keeping the active index in range.
    pub fn restore_frames(&mut self, frames: Vec<Frame>, current_index: usize) {
        if let Some(first) = frames.first() {
            self.width = first.width();
            self.height = first.height();
        }
        self.frames = frames;
        self.events.publish(AppEvent::FrameSheetReset);
        self.set_current_frame_index(current_index);
    }

    /// Distinct opaque colors used across all frames.
    pub fn colors(&self) -> Vec<Color> {
        let mut seen: Vec<Color> = Vec::new();
        for color in self.frames.iter().flat_map(Frame::colors) {
            if !seen.contains(&color) {
                seen.push(color);
            }
        }
        seen
    }

    fn checked(&self, index: usize) -> Result<&Frame, FrameSheetError> {
        self.frames.get(index).ok_or(FrameSheetError::IndexOutOfRange {
            index,
            count: self.frames.len(),
        })
    }

    fn check_size(&self, index: usize, frame: &Frame) -> Result<(), FrameSheetError> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(FrameSheetError::SizeMismatch {
                index,
                width: frame.width(),
                height: frame.height(),
                expected_width: self.width,
                expected_height: self.height,
            });
        }
        Ok(())
    }
}

fn parse_frames(data: &str) -> Result<Vec<Frame>, FrameSheetError> {
    let layout: Vec<Vec<Vec<Color>>> =
        serde_json::from_str(data).map_err(|e| FrameSheetError::InvalidData(e.to_string()))?;
    if layout.is_empty() {
        return Err(FrameSheetError::Empty);
    }

    let mut frames: Vec<Frame> = Vec::with_capacity(layout.len());
    for (index, columns) in layout.iter().enumerate() {
        let frame = Frame::from_columns(columns).ok_or_else(|| {
            FrameSheetError::InvalidData(format!("frame {index} is empty or ragged"))
        })?;
        if let Some(first) = frames.first() {
            if !first.is_same_size(&frame) {
                return Err(FrameSheetError::SizeMismatch {
                    index,
                    width: frame.width(),
                    height: frame.height(),
                    expected_width: first.width(),
                    expected_height: first.height(),
                });
            }
        }
        frames.push(frame);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sheet() -> (FrameSheet, crate::events::EventReceiver) {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let mut sheet = FrameSheet::new(4, 4, bus);
        sheet.add_empty_frame();
        (sheet, rx)
    }

    #[test]
    fn test_set_current_frame_publishes() {
        let (mut sheet, mut rx) = new_sheet();
        sheet.add_empty_frame();
        sheet.set_current_frame_index(1);
        assert_eq!(sheet.current_frame_index(), 1);
        assert_eq!(rx.poll_events(), vec![AppEvent::CurrentFrameChanged { index: 1 }]);

        // Clamped to the last frame
        sheet.set_current_frame_index(10);
        assert_eq!(sheet.current_frame_index(), 1);
    }

    #[test]
    fn test_serialize_deserialize() {
        let (mut sheet, _rx) = new_sheet();
        sheet.add_empty_frame();
        sheet.frame_mut(1).unwrap().set_pixel(2, 3, Color::rgb(0x12, 0x34, 0x56));
        let data = sheet.serialize();

        let (mut other, mut rx) = new_sheet();
        other.deserialize(&data).unwrap();
        assert_eq!(other.frame_count(), 2);
        assert_eq!(other.frame(1).unwrap().get_pixel(2, 3), Some(Color::rgb(0x12, 0x34, 0x56)));
        assert_eq!(other.serialize(), data);
        assert_eq!(
            rx.poll_events(),
            vec![AppEvent::FrameSheetReset, AppEvent::CurrentFrameChanged { index: 0 }]
        );
    }

    #[test]
    fn test_serialized_layout_is_columns() {
        let bus = EventBus::new();
        let mut sheet = FrameSheet::new(2, 1, bus);
        sheet.add_empty_frame();
        sheet.frame_mut(0).unwrap().set_pixel(0, 0, Color::BLACK);
        assert_eq!(sheet.serialize(), r##"[[["#000000"],["TRANSPARENT"]]]"##);
    }

    #[test]
    fn test_deserialize_adopts_size() {
        let (mut sheet, _rx) = new_sheet();
        sheet.deserialize(r##"[[["#000000"],["#ffffff"]]]"##).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (2, 1));
    }

    #[test]
    fn test_deserialize_rejects_bad_input() {
        let (mut sheet, _rx) = new_sheet();
        let before = sheet.serialize();

        assert!(matches!(sheet.deserialize("not json"), Err(FrameSheetError::InvalidData(_))));
        assert_eq!(sheet.deserialize("[]"), Err(FrameSheetError::Empty));
        assert!(matches!(
            sheet.deserialize(r##"[[["#000000"]],[["#000000","#000000"]]]"##),
            Err(FrameSheetError::SizeMismatch { index: 1, .. })
        ));
        assert!(sheet.deserialize(r##"[[["blue"]]]"##).is_err());

        assert_eq!(sheet.serialize(), before);
    }

    #[test]
    fn test_remove_frame_keeps_index_in_range() {
        let (mut sheet, _rx) = new_sheet();
        sheet.add_empty_frame();
        sheet.add_empty_frame();
        sheet.set_current_frame_index(2);

        sheet.remove_frame(2).unwrap();
        assert_eq!(sheet.current_frame_index(), 1);

        sheet.remove_frame(0).unwrap();
        assert_eq!(sheet.current_frame_index(), 0);
        assert_eq!(sheet.remove_frame(0), Err(FrameSheetError::LastFrame));
    }

    #[test]
    fn test_duplicate_and_move() {
        let (mut sheet, _rx) = new_sheet();
        sheet.frame_mut(0).unwrap().set_pixel(0, 0, Color::WHITE);
        sheet.add_empty_frame();
        sheet.duplicate_frame(0).unwrap();
        assert_eq!(sheet.frame_count(), 3);
        assert_eq!(sheet.frame(1).unwrap().get_pixel(0, 0), Some(Color::WHITE));

        sheet.move_frame(0, 2).unwrap();
        assert!(sheet.frame(0).unwrap().get_pixel(0, 0) == Some(Color::WHITE));
        assert!(sheet.frame(1).unwrap().is_empty());
        assert!(sheet.move_frame(0, 5).is_err());
    }

    #[test]
    fn test_add_frame_checks_size() {
        let (mut sheet, _rx) = new_sheet();
        assert!(matches!(
            sheet.add_frame(Frame::new(2, 2)),
            Err(FrameSheetError::SizeMismatch { .. })
        ));
        sheet.add_frame(Frame::new(4, 4)).unwrap();
        assert_eq!(sheet.frame_count(), 2);
    }
}

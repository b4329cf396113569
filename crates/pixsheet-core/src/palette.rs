//! Drawing colors and the palette of colors used by the sheet.

use crate::events::{AppEvent, EventBus, EventReceiver};
use crate::frame::Color;
use crate::framesheet::FrameSheet;

/// Primary/secondary colors plus the colors found in the sheet.
#[derive(Debug)]
pub struct Palette {
    primary: Color,
    secondary: Color,
    used_colors: Vec<Color>,
    events: EventBus,
    receiver: EventReceiver,
}

impl Palette {
    pub fn new(events: EventBus) -> Self {
        let receiver = events.subscribe();
        Self {
            primary: Color::BLACK,
            secondary: Color::TRANSPARENT,
            used_colors: Vec::new(),
            events,
            receiver,
        }
    }

    /// Collect the sheet colors.
    pub fn init(&mut self, sheet: &FrameSheet) {
        self.refresh(sheet);
    }

    /// Refresh used colors after sheet updates or resets.
    pub fn poll(&mut self, sheet: &FrameSheet) {
        let stale = self
            .receiver
            .poll_events()
            .iter()
            .any(|e| matches!(e, AppEvent::FrameSheetUpdated | AppEvent::FrameSheetReset));
        if stale {
            self.refresh(sheet);
        }
    }

    fn refresh(&mut self, sheet: &FrameSheet) {
        self.used_colors = sheet.colors();
    }

    pub fn primary(&self) -> Color {
        self.primary
    }

    pub fn secondary(&self) -> Color {
        self.secondary
    }

    pub fn set_primary(&mut self, color: Color) {
        if self.primary != color {
            self.primary = color;
            self.events.publish(AppEvent::PrimaryColorChanged(color));
        }
    }

    pub fn set_secondary(&mut self, color: Color) {
        self.secondary = color;
    }

    pub fn swap(&mut self) {
        let primary = self.primary;
        let secondary = self.secondary;
        self.secondary = primary;
        self.set_primary(secondary);
    }

    pub fn used_colors(&self) -> &[Color] {
        &self.used_colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_sheet_colors() {
        let bus = EventBus::new();
        let mut sheet = FrameSheet::new(2, 2, bus.clone());
        sheet.add_empty_frame();
        let mut palette = Palette::new(bus);
        palette.init(&sheet);
        assert!(palette.used_colors().is_empty());

        sheet.frame_mut(0).unwrap().set_pixel(0, 0, Color::WHITE);
        // No event yet, stays stale
        palette.poll(&sheet);
        assert!(palette.used_colors().is_empty());

        sheet.mark_updated();
        palette.poll(&sheet);
        assert_eq!(palette.used_colors(), &[Color::WHITE]);
    }

    #[test]
    fn test_swap_colors() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut palette = Palette::new(bus);
        palette.set_secondary(Color::WHITE);
        palette.swap();
        assert_eq!(palette.primary(), Color::WHITE);
        assert_eq!(palette.secondary(), Color::BLACK);
        assert_eq!(rx.poll_events(), vec![AppEvent::PrimaryColorChanged(Color::WHITE)]);
    }
}

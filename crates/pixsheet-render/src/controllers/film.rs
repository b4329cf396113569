//! Filmstrip of frame thumbnails.

use super::RenderController;
use crate::renderer::{PixelBuffer, RenderResult, Surface};
use pixsheet_core::{AppEvent, EventBus, EventReceiver, FrameSheet};

/// Gap between thumbnails, in frame pixels.
pub const TILE_GAP: u32 = 1;

/// Border drawn around the current frame's thumbnail.
pub const HIGHLIGHT_COLOR: [u8; 4] = [255, 196, 0, 255];

pub struct PreviewFilmController {
    surface: Box<dyn Surface>,
    buffer: PixelBuffer,
    dpi: u32,
    receiver: EventReceiver,
    dirty: bool,
    frame_count: usize,
    tile_height: u32,
}

impl PreviewFilmController {
    pub fn new(surface: Box<dyn Surface>, dpi: u32, events: &EventBus) -> Self {
        Self {
            surface,
            buffer: PixelBuffer::default(),
            dpi: dpi.max(1),
            receiver: events.subscribe(),
            dirty: true,
            frame_count: 0,
            tile_height: 0,
        }
    }

    pub fn init(&mut self, sheet: &FrameSheet) {
        self.frame_count = sheet.frame_count();
        self.tile_height = sheet.height() * self.dpi;
        self.dirty = true;
    }

    fn stride(&self) -> u32 {
        self.tile_height + TILE_GAP * self.dpi
    }

    /// Index of the thumbnail at vertical position `y`, if any. Gaps hit nothing.
    pub fn frame_at(&self, y: f64) -> Option<usize> {
        if y < 0.0 || self.stride() == 0 {
            return None;
        }
        let y = y.floor() as u32;
        let index = (y / self.stride()) as usize;
        (index < self.frame_count && y % self.stride() < self.tile_height).then_some(index)
    }

    fn draw(&mut self, sheet: &FrameSheet) -> RenderResult<()> {
        self.init(sheet);
        let dpi = self.dpi;
        let tile_width = sheet.width() * dpi;
        let count = self.frame_count as u32;
        let height = (count * self.stride()).saturating_sub(TILE_GAP * dpi);
        self.buffer.resize(tile_width, height);

        let current = sheet.current_frame_index();
        for (i, frame) in sheet.frames().iter().enumerate() {
            let top = i as u32 * self.stride();
            self.buffer.draw_checkerboard(0, top, tile_width, self.tile_height, dpi);
            self.buffer.draw_frame(frame, 0, top, dpi);
            if i == current {
                let thickness = (dpi / 2).max(1);
                self.buffer
                    .stroke_rect(0, top, tile_width, self.tile_height, thickness, HIGHLIGHT_COLOR);
            }
        }
        self.surface.present(&self.buffer)
    }
}

impl RenderController for PreviewFilmController {
    fn render(&mut self, _delta_ms: f64, sheet: &FrameSheet) -> RenderResult<()> {
        let stale = self.receiver.poll_events().iter().any(|event| {
            matches!(
                event,
                AppEvent::FrameSheetUpdated
                    | AppEvent::FrameSheetReset
                    | AppEvent::CurrentFrameChanged { .. }
            )
        });
        if !(stale || self.dirty) || sheet.frame_count() == 0 {
            return Ok(());
        }
        self.draw(sheet)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MemorySurface;
    use pixsheet_core::Color;

    fn setup() -> (FrameSheet, MemorySurface, PreviewFilmController) {
        let events = EventBus::new();
        let mut sheet = FrameSheet::new(2, 2, events.clone());
        sheet.add_empty_frame();
        sheet.add_empty_frame();
        let surface = MemorySurface::new();
        let mut film = PreviewFilmController::new(Box::new(surface.clone()), 4, &events);
        film.init(&sheet);
        (sheet, surface, film)
    }

    #[test]
    fn test_thumbnails_are_stacked_with_gap() {
        let (mut sheet, surface, mut film) = setup();
        sheet.frame_mut(1).unwrap().set_pixel(1, 1, Color::rgb(0, 128, 0));
        film.render(0.0, &sheet).unwrap();

        let image = surface.last().unwrap();
        // 2 tiles of 8px with a 4px gap
        assert_eq!((image.width(), image.height()), (8, 20));
        assert_eq!(image.pixel(0, 9), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(5, 17), Some([0, 128, 0, 255]));
        assert_eq!(image.pixel(0, 0), Some(HIGHLIGHT_COLOR));
        assert_ne!(image.pixel(0, 12), Some(HIGHLIGHT_COLOR));
    }

    #[test]
    fn test_rerenders_only_on_change() {
        let (mut sheet, surface, mut film) = setup();
        film.render(0.0, &sheet).unwrap();
        film.render(16.0, &sheet).unwrap();
        assert_eq!(surface.presents(), 1);

        sheet.set_current_frame_index(1);
        film.render(16.0, &sheet).unwrap();
        assert_eq!(surface.presents(), 2);
        let image = surface.last().unwrap();
        assert_eq!(image.pixel(0, 12), Some(HIGHLIGHT_COLOR));
    }

    #[test]
    fn test_frame_at() {
        let (sheet, _, mut film) = setup();
        film.render(0.0, &sheet).unwrap();
        assert_eq!(film.frame_at(0.0), Some(0));
        assert_eq!(film.frame_at(7.5), Some(0));
        assert_eq!(film.frame_at(9.0), None);
        assert_eq!(film.frame_at(12.0), Some(1));
        assert_eq!(film.frame_at(19.0), Some(1));
        assert_eq!(film.frame_at(24.0), None);
        assert_eq!(film.frame_at(-1.0), None);
    }
}

//! Animated preview: loops over the frames at a fixed rate.

use super::RenderController;
use crate::renderer::{PixelBuffer, RenderResult, Surface};
use pixsheet_core::{AppEvent, EventBus, EventReceiver, FrameSheet};

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

pub struct AnimatedPreviewController {
    surface: Box<dyn Surface>,
    buffer: PixelBuffer,
    dpi: u32,
    fps: u32,
    elapsed_ms: f64,
    index: usize,
    receiver: EventReceiver,
    dirty: bool,
}

impl AnimatedPreviewController {
    pub fn new(surface: Box<dyn Surface>, dpi: u32, fps: u32, events: &EventBus) -> Self {
        Self {
            surface,
            buffer: PixelBuffer::default(),
            dpi: dpi.max(1),
            fps: fps.clamp(MIN_FPS, MAX_FPS),
            elapsed_ms: 0.0,
            index: 0,
            receiver: events.subscribe(),
            dirty: true,
        }
    }

    /// Restart playback from the first frame.
    pub fn init(&mut self, sheet: &FrameSheet) {
        self.index = 0;
        self.elapsed_ms = 0.0;
        self.dirty = true;
        log::debug!("Animated preview: {} frame(s) at {} fps", sheet.frame_count(), self.fps);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
    }

    /// Index of the frame currently shown.
    pub fn current_index(&self) -> usize {
        self.index
    }

    fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }
}

impl RenderController for AnimatedPreviewController {
    fn render(&mut self, delta_ms: f64, sheet: &FrameSheet) -> RenderResult<()> {
        for event in self.receiver.poll_events() {
            match event {
                AppEvent::FrameSheetReset => {
                    self.index = 0;
                    self.elapsed_ms = 0.0;
                    self.dirty = true;
                }
                AppEvent::FrameSheetUpdated => self.dirty = true,
                _ => {}
            }
        }

        let count = sheet.frame_count();
        if count == 0 {
            return Ok(());
        }
        if self.index >= count {
            self.index = 0;
            self.dirty = true;
        }

        self.elapsed_ms += delta_ms.max(0.0);
        let duration = self.frame_duration_ms();
        if self.elapsed_ms >= duration {
            let steps = (self.elapsed_ms / duration).floor();
            self.elapsed_ms -= steps * duration;
            let next = (self.index + steps as usize) % count;
            if next != self.index {
                self.index = next;
                self.dirty = true;
            }
        }

        if !self.dirty {
            return Ok(());
        }
        let Some(frame) = sheet.frame(self.index) else {
            return Ok(());
        };
        let (width, height) = (sheet.width() * self.dpi, sheet.height() * self.dpi);
        if self.buffer.width() != width || self.buffer.height() != height {
            self.buffer.resize(width, height);
        }
        self.buffer.draw_checkerboard(0, 0, width, height, self.dpi);
        self.buffer.draw_frame(frame, 0, 0, self.dpi);
        self.surface.present(&self.buffer)?;
        self.dirty = false;
        Ok(())
    }
}

//! Pixel buffers and the surface abstraction.

use pixsheet_core::{Color, Frame};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Light checkerboard square for transparent pixels.
pub const CHECKER_LIGHT: [u8; 4] = [255, 255, 255, 255];
/// Dark checkerboard square for transparent pixels.
pub const CHECKER_DARK: [u8; 4] = [204, 204, 204, 255];

/// An RGBA8 image in screen pixels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Resize, clearing the content.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize((width as usize) * (height as usize) * 4, 0);
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[i..i + 4]);
        Some(rgba)
    }

    /// Fill a rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y.min(y_end)..y_end {
            let row = (py as usize) * (self.width as usize);
            for px in x.min(x_end)..x_end {
                let i = (row + px as usize) * 4;
                self.data[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }

    /// Outline a rectangle with a border of `thickness` pixels.
    pub fn stroke_rect(&mut self, x: u32, y: u32, width: u32, height: u32, thickness: u32, rgba: [u8; 4]) {
        let t = thickness.min(width).min(height);
        self.fill_rect(x, y, width, t, rgba);
        self.fill_rect(x, y + height - t, width, t, rgba);
        self.fill_rect(x, y, t, height, rgba);
        self.fill_rect(x + width - t, y, t, height, rgba);
    }

    /// Checkerboard where each square covers half a sprite pixel at `scale`.
    pub fn draw_checkerboard(&mut self, x: u32, y: u32, width: u32, height: u32, scale: u32) {
        let square = (scale / 2).max(1);
        let mut sy = 0;
        while sy < height {
            let mut sx = 0;
            while sx < width {
                let dark = ((sx / square) + (sy / square)) % 2 == 1;
                let color = if dark { CHECKER_DARK } else { CHECKER_LIGHT };
                let w = square.min(width - sx);
                let h = square.min(height - sy);
                self.fill_rect(x + sx, y + sy, w, h, color);
                sx += square;
            }
            sy += square;
        }
    }

    /// Draw the opaque pixels of `frame`, each as a `scale` x `scale` block.
    pub fn draw_frame(&mut self, frame: &Frame, x: u32, y: u32, scale: u32) {
        for fy in 0..frame.height() {
            for fx in 0..frame.width() {
                if let Some(color) = frame.get_pixel(fx, fy).filter(|c| !c.is_transparent()) {
                    self.fill_rect(x + fx * scale, y + fy * scale, scale, scale, rgba(color));
                }
            }
        }
    }
}

fn rgba(color: Color) -> [u8; 4] {
    color.to_rgba8()
}

/// Destination of rendered images: a canvas element, a window, or memory.
pub trait Surface {
    /// Display `image`, resizing the target to the image size if needed.
    fn present(&mut self, image: &PixelBuffer) -> RenderResult<()>;
}

#[derive(Debug, Default)]
struct MemorySurfaceState {
    last: Option<PixelBuffer>,
    presents: usize,
}

/// Surface keeping the last presented image in memory.
///
/// Clones share the same state, so a clone can be handed to a controller
/// and the other inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    state: Rc<RefCell<MemorySurfaceState>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented image.
    pub fn last(&self) -> Option<PixelBuffer> {
        self.state.borrow().last.clone()
    }

    /// Number of presents so far.
    pub fn presents(&self) -> usize {
        self.state.borrow().presents
    }
}

impl Surface for MemorySurface {
    fn present(&mut self, image: &PixelBuffer) -> RenderResult<()> {
        let mut state = self.state.borrow_mut();
        state.last = Some(image.clone());
        state.presents += 1;
        Ok(())
    }
}

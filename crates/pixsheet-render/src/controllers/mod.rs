//! Canvas controllers driven by the drawing loop.

mod animation;
mod drawing;
mod film;

pub use animation::{AnimatedPreviewController, MAX_FPS, MIN_FPS};
pub use drawing::{DrawingController, ToolContext};
pub use film::{HIGHLIGHT_COLOR, PreviewFilmController, TILE_GAP};

use crate::renderer::RenderResult;
use pixsheet_core::FrameSheet;

/// A controller that draws part of the sheet on each loop tick.
pub trait RenderController {
    /// Redraw if needed. `delta_ms` is the time since the previous tick.
    fn render(&mut self, delta_ms: f64, sheet: &FrameSheet) -> RenderResult<()>;
}

//! Pixsheet Render Library
//!
//! Software rasterizer and the canvas controllers for Pixsheet. Controllers
//! draw into a [`PixelBuffer`] and hand it to a [`Surface`]; the app maps
//! surfaces onto canvas elements.

pub mod controllers;
pub mod export;
mod renderer;

pub use controllers::{
    AnimatedPreviewController, DrawingController, PreviewFilmController, RenderController,
    ToolContext,
};
pub use export::{encode_png, export_current_frame_png, export_sheet_png};
pub use renderer::{MemorySurface, PixelBuffer, RenderError, RenderResult, Surface};

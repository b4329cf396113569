//! PNG export of frames and sheets.

use crate::renderer::{PixelBuffer, RenderError, RenderResult};
use pixsheet_core::{Frame, FrameSheet};

/// Rasterize a frame at `scale` without the checkerboard, so transparent
/// pixels stay transparent in the output.
pub fn frame_to_buffer(frame: &Frame, scale: u32) -> PixelBuffer {
    let scale = scale.max(1);
    let mut buffer = PixelBuffer::new(frame.width() * scale, frame.height() * scale);
    buffer.draw_frame(frame, 0, 0, scale);
    buffer
}

/// All frames side by side, left to right.
pub fn sheet_to_strip(sheet: &FrameSheet, scale: u32) -> PixelBuffer {
    let scale = scale.max(1);
    let tile_width = sheet.width() * scale;
    let mut buffer = PixelBuffer::new(tile_width * sheet.frame_count() as u32, sheet.height() * scale);
    for (i, frame) in sheet.frames().iter().enumerate() {
        buffer.draw_frame(frame, i as u32 * tile_width, 0, scale);
    }
    buffer
}

/// Encode a buffer as an RGBA8 PNG.
pub fn encode_png(buffer: &PixelBuffer) -> RenderResult<Vec<u8>> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(RenderError::Encode("empty image".to_string()));
    }
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, buffer.width(), buffer.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        writer
            .write_image_data(buffer.data())
            .map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// PNG of the current frame.
pub fn export_current_frame_png(sheet: &FrameSheet, scale: u32) -> RenderResult<Vec<u8>> {
    let frame = sheet
        .current_frame()
        .ok_or_else(|| RenderError::Encode("no current frame".to_string()))?;
    encode_png(&frame_to_buffer(frame, scale))
}

/// PNG of the whole sheet as a horizontal strip.
pub fn export_sheet_png(sheet: &FrameSheet, scale: u32) -> RenderResult<Vec<u8>> {
    if sheet.frame_count() == 0 {
        return Err(RenderError::Encode("sheet has no frames".to_string()));
    }
    encode_png(&sheet_to_strip(sheet, scale))
}

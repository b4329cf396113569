//! Main drawing canvas: renders the current frame and turns pointer input
//! into tool applications.

use super::RenderController;
use crate::renderer::{PixelBuffer, RenderResult, Surface};
use pixsheet_core::tools::{ToolEffect, apply_tool, line_points};
use pixsheet_core::{
    AppEvent, EventBus, EventReceiver, Frame, FrameSheet, Palette, SelectionManager, ToolKind,
};

/// Collaborators a pointer event may touch.
pub struct ToolContext<'a> {
    pub tool: ToolKind,
    pub sheet: &'a mut FrameSheet,
    pub palette: &'a mut Palette,
    pub selection: &'a mut SelectionManager,
}

impl ToolContext<'_> {
    fn reborrow(&mut self) -> ToolContext<'_> {
        ToolContext {
            tool: self.tool,
            sheet: &mut *self.sheet,
            palette: &mut *self.palette,
            selection: &mut *self.selection,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    tool: ToolKind,
    last: (i32, i32),
    modified: bool,
}

pub struct DrawingController {
    surface: Box<dyn Surface>,
    buffer: PixelBuffer,
    overlay: Frame,
    dpi: u32,
    receiver: EventReceiver,
    dirty: bool,
    stroke: Option<Stroke>,
}

impl DrawingController {
    pub fn new(sheet: &FrameSheet, surface: Box<dyn Surface>, dpi: u32, events: &EventBus) -> Self {
        Self {
            surface,
            buffer: PixelBuffer::default(),
            overlay: Frame::new(sheet.width(), sheet.height()),
            dpi: dpi.max(1),
            receiver: events.subscribe(),
            dirty: true,
            stroke: None,
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Apply a new scale. Zero is raised to 1.
    pub fn update_dpi(&mut self, dpi: u32) {
        let dpi = dpi.max(1);
        if dpi != self.dpi {
            log::debug!("Drawing scale changed: {} -> {}", self.dpi, dpi);
            self.dpi = dpi;
            self.dirty = true;
        }
    }

    /// Canvas position to frame coordinates. May fall outside the frame.
    pub fn to_frame_coords(&self, x: f64, y: f64) -> (i32, i32) {
        let dpi = self.dpi as f64;
        ((x / dpi).floor() as i32, (y / dpi).floor() as i32)
    }

    pub fn overlay(&self) -> &Frame {
        &self.overlay
    }

    /// Redraw the selection marquee into the overlay frame.
    pub fn update_overlay(&mut self, sheet: &FrameSheet, selection: &SelectionManager) {
        let mut overlay = Frame::new(sheet.width(), sheet.height());
        selection.render_overlay(&mut overlay);
        if overlay != self.overlay {
            self.overlay = overlay;
            self.dirty = true;
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, ctx: ToolContext<'_>) {
        let pos = self.to_frame_coords(x, y);
        let mut stroke = Stroke {
            tool: ctx.tool,
            last: pos,
            modified: false,
        };
        match ctx.tool {
            ToolKind::Select => {
                ctx.selection.begin_drag(pos.0, pos.1);
                if let Some(frame) = ctx.sheet.current_frame() {
                    ctx.selection.update_drag(pos.0, pos.1, frame);
                }
            }
            tool => stroke.modified = self.apply_at(tool, pos, ctx.sheet, ctx.palette),
        }
        self.stroke = Some(stroke);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, ctx: ToolContext<'_>) {
        let Some(mut stroke) = self.stroke else {
            return;
        };
        let pos = self.to_frame_coords(x, y);
        if pos == stroke.last {
            return;
        }
        match stroke.tool {
            ToolKind::Select => {
                if let Some(frame) = ctx.sheet.current_frame() {
                    ctx.selection.update_drag(pos.0, pos.1, frame);
                }
            }
            tool if tool.is_continuous() => {
                let (lx, ly) = stroke.last;
                for point in line_points(lx, ly, pos.0, pos.1).into_iter().skip(1) {
                    stroke.modified |= self.apply_at(tool, point, ctx.sheet, ctx.palette);
                }
            }
            _ => {}
        }
        stroke.last = pos;
        self.stroke = Some(stroke);
    }

    /// Finish the stroke. The sheet is marked updated once if any pixel changed.
    pub fn pointer_up(&mut self, x: f64, y: f64, mut ctx: ToolContext<'_>) {
        let Some(stroke) = self.stroke else {
            return;
        };
        let pos = self.to_frame_coords(x, y);
        if stroke.tool == ToolKind::Select {
            if let Some(frame) = ctx.sheet.current_frame() {
                ctx.selection.end_drag(pos.0, pos.1, frame);
            }
            self.stroke = None;
            return;
        }
        self.pointer_move(x, y, ctx.reborrow());
        let modified = self.stroke.map_or(stroke.modified, |s| s.modified);
        self.stroke = None;
        if modified {
            ctx.sheet.mark_updated();
        }
    }

    fn apply_at(&mut self, tool: ToolKind, (x, y): (i32, i32), sheet: &mut FrameSheet, palette: &mut Palette) -> bool {
        let Some(frame) = sheet.current_frame_mut() else {
            return false;
        };
        match apply_tool(tool, frame, x, y, palette.primary()) {
            ToolEffect::Modified => {
                self.dirty = true;
                true
            }
            ToolEffect::Picked(color) => {
                palette.set_primary(color);
                false
            }
            ToolEffect::None => false,
        }
    }

    fn draw(&mut self, sheet: &FrameSheet) -> RenderResult<()> {
        let dpi = self.dpi;
        let (width, height) = (sheet.width() * dpi, sheet.height() * dpi);
        if self.buffer.width() != width || self.buffer.height() != height {
            self.buffer.resize(width, height);
        }
        self.buffer.draw_checkerboard(0, 0, width, height, dpi);
        if let Some(frame) = sheet.current_frame() {
            self.buffer.draw_frame(frame, 0, 0, dpi);
        }
        if self.overlay.width() == sheet.width() && self.overlay.height() == sheet.height() {
            self.buffer.draw_frame(&self.overlay, 0, 0, dpi);
        }
        self.surface.present(&self.buffer)
    }
}

impl RenderController for DrawingController {
    fn render(&mut self, _delta_ms: f64, sheet: &FrameSheet) -> RenderResult<()> {
        let stale = self.receiver.poll_events().iter().any(|event| {
            matches!(
                event,
                AppEvent::FrameSheetUpdated
                    | AppEvent::FrameSheetReset
                    | AppEvent::CurrentFrameChanged { .. }
            )
        });
        if stale {
            self.dirty = true;
        }
        if !self.dirty {
            return Ok(());
        }
        self.draw(sheet)?;
        self.dirty = false;
        Ok(())
    }
}

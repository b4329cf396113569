//! Drawing tools and the tool selector.

use crate::events::{AppEvent, EventBus};
use crate::frame::{Color, Frame};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    PaintBucket,
    Select,
    ColorPicker,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::PaintBucket,
        ToolKind::Select,
        ToolKind::ColorPicker,
    ];

    /// Display name for this tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::PaintBucket => "Paint bucket",
            ToolKind::Select => "Rectangle selection",
            ToolKind::ColorPicker => "Color picker",
        }
    }

    /// Whether dragging keeps applying the tool to each visited pixel.
    pub fn is_continuous(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Eraser)
    }
}

/// Outcome of applying a tool to a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    /// Nothing changed.
    None,
    /// Frame pixels were modified.
    Modified,
    /// A color was sampled from the frame.
    Picked(Color),
}

/// Holds the active tool.
#[derive(Debug)]
pub struct ToolSelector {
    current: ToolKind,
    events: EventBus,
}

impl ToolSelector {
    pub fn new(events: EventBus) -> Self {
        Self {
            current: ToolKind::default(),
            events,
        }
    }

    /// Announce the default tool.
    pub fn init(&mut self) {
        self.select_tool(self.current);
    }

    pub fn current(&self) -> ToolKind {
        self.current
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.current = tool;
        self.events.publish(AppEvent::ToolSelected(tool));
    }
}

/// Apply a pixel tool at `(x, y)`. Selection is handled by the selection
/// manager and has no pixel effect here.
pub fn apply_tool(tool: ToolKind, frame: &mut Frame, x: i32, y: i32, color: Color) -> ToolEffect {
    if !frame.contains(x, y) {
        return ToolEffect::None;
    }
    let (x, y) = (x as u32, y as u32);
    match tool {
        ToolKind::Pen => set_if_changed(frame, x, y, color),
        ToolKind::Eraser => set_if_changed(frame, x, y, Color::TRANSPARENT),
        ToolKind::PaintBucket => {
            if flood_fill(frame, x, y, color) > 0 {
                ToolEffect::Modified
            } else {
                ToolEffect::None
            }
        }
        ToolKind::ColorPicker => match frame.get_pixel(x, y) {
            Some(picked) => ToolEffect::Picked(picked),
            None => ToolEffect::None,
        },
        ToolKind::Select => ToolEffect::None,
    }
}

fn set_if_changed(frame: &mut Frame, x: u32, y: u32, color: Color) -> ToolEffect {
    if frame.get_pixel(x, y) == Some(color) {
        ToolEffect::None
    } else {
        frame.set_pixel(x, y, color);
        ToolEffect::Modified
    }
}

/// 4-connected flood fill. Returns the number of pixels painted.
pub fn flood_fill(frame: &mut Frame, x: u32, y: u32, color: Color) -> usize {
    let Some(target) = frame.get_pixel(x, y) else {
        return 0;
    };
    if target == color {
        return 0;
    }

    let mut painted = 0;
    let mut stack = vec![(x, y)];
    while let Some((px, py)) = stack.pop() {
        if frame.get_pixel(px, py) != Some(target) {
            continue;
        }
        frame.set_pixel(px, py, color);
        painted += 1;

        if px > 0 {
            stack.push((px - 1, py));
        }
        if py > 0 {
            stack.push((px, py - 1));
        }
        if px + 1 < frame.width() {
            stack.push((px + 1, py));
        }
        if py + 1 < frame.height() {
            stack.push((px, py + 1));
        }
    }
    painted
}

/// Pixels on the line between two points (Bresenham), endpoints included.
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);

    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

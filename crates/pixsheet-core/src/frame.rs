//! Pixel colors and single animation frames.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Serialized name of a transparent pixel.
pub const TRANSPARENT_NAME: &str = "TRANSPARENT";

/// An RGBA8 pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse `"#rrggbb"` or `"TRANSPARENT"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(TRANSPARENT_NAME) {
            return Some(Self::TRANSPARENT);
        }
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// RGBA bytes in canvas order.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_transparent() {
            f.write_str(TRANSPARENT_NAME)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

/// A single fixed-size frame of pixels, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Frame {
    /// Create a fully transparent frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; (width * height) as usize],
        }
    }

    /// Build a frame from columns (`columns[x][y]`), the serialized layout.
    pub fn from_columns(columns: &[Vec<Color>]) -> Option<Self> {
        let width = columns.len() as u32;
        let height = columns.first().map(|c| c.len())? as u32;
        if width == 0 || height == 0 || columns.iter().any(|c| c.len() as u32 != height) {
            return None;
        }
        let mut frame = Self::new(width, height);
        for (x, column) in columns.iter().enumerate() {
            for (y, color) in column.iter().enumerate() {
                frame.set_pixel(x as u32, y as u32, *color);
            }
        }
        Some(frame)
    }

    /// Pixels as columns (`columns[x][y]`).
    pub fn to_columns(&self) -> Vec<Vec<Color>> {
        (0..self.width)
            .map(|x| (0..self.height).map(|y| self.pixels[self.index(x, y)]).collect())
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Set a pixel. Out-of-bounds writes are ignored and return false.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i] = color;
            true
        } else {
            false
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.iter().all(Color::is_transparent)
    }

    pub fn is_same_size(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Distinct opaque colors, in first-seen order.
    pub fn colors(&self) -> Vec<Color> {
        let mut seen = Vec::new();
        for color in self.pixels.iter().filter(|c| !c.is_transparent()) {
            if !seen.contains(color) {
                seen.push(*color);
            }
        }
        seen
    }
}

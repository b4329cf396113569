//! Editor configuration.

use crate::service::DEFAULT_SERVICE_URL;
use crate::storage::DEFAULT_AUTOSAVE_INTERVAL_MS;
use serde::{Deserialize, Serialize};

/// Frames per second used by the animated preview when nothing else is set.
pub const DEFAULT_FPS: u32 = 12;

/// Editor configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Frame size in sprite pixels (not screen pixels). The drawing scale is
    /// always fitted to the viewport.
    pub frame_width: u32,
    pub frame_height: u32,
    /// Scale of the filmstrip thumbnails.
    pub preview_tile_dpi: u32,
    /// Scale of the animated preview.
    pub preview_animation_dpi: u32,
    pub default_fps: u32,
    /// Base URL of the sheet service.
    pub service_url: String,
    pub autosave_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            frame_width: 32,
            frame_height: 32,
            preview_tile_dpi: 4,
            preview_animation_dpi: 8,
            default_fps: DEFAULT_FPS,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }
}

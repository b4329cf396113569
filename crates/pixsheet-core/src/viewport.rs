//! Fitting the drawing canvas into the editor viewport.

/// Vertical space reserved above the drawing canvas in the main panel.
pub const VIEWPORT_HEIGHT_OFFSET: f64 = 50.0;

/// Measured space available to the drawing canvas and the preview panel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub available_height: f64,
    pub available_width: f64,
    pub preview_height: f64,
    pub preview_width: f64,
}

impl ViewportMetrics {
    pub fn new(
        available_height: f64,
        available_width: f64,
        preview_height: f64,
        preview_width: f64,
    ) -> Self {
        Self {
            available_height,
            available_width,
            preview_height,
            preview_width,
        }
    }

    /// Build metrics from raw panel measurements, reserving
    /// [`VIEWPORT_HEIGHT_OFFSET`] from the main panel height.
    pub fn from_panels(
        main_width: f64,
        main_height: f64,
        preview_width: f64,
        preview_height: f64,
    ) -> Self {
        Self::new(
            main_height - VIEWPORT_HEIGHT_OFFSET,
            main_width,
            preview_height,
            preview_width,
        )
    }
}

/// Largest integer scale at which a `frame_width` x `frame_height` frame
/// fits the viewport.
///
/// When the scaled canvas would overlap the preview panel in *both*
/// dimensions, the scale is reduced by the smaller of the two per-axis
/// corrections. An overlap in a single dimension is left alone. The result
/// never goes below zero.
pub fn fit_drawing_dpi(metrics: &ViewportMetrics, frame_width: u32, frame_height: u32) -> u32 {
    if frame_width == 0 || frame_height == 0 {
        return 0;
    }
    let frame_w = f64::from(frame_width);
    let frame_h = f64::from(frame_height);

    let height_bound_dpi = (metrics.available_height / frame_h).floor();
    let width_bound_dpi = (metrics.available_width / frame_w).floor();
    let mut dpi = height_bound_dpi.min(width_bound_dpi);

    let drawing_height = dpi * frame_h;
    let drawing_width = dpi * frame_w;

    let height_gap = drawing_height + metrics.preview_height - metrics.available_height;
    let width_gap = drawing_width + metrics.preview_width - metrics.available_width;
    if height_gap > 0.0 && width_gap > 0.0 {
        let height_gap_dpi = (height_gap / frame_h).ceil();
        let width_gap_dpi = (width_gap / frame_w).ceil();
        dpi -= height_gap_dpi.min(width_gap_dpi);
    }

    if dpi.is_finite() && dpi > 0.0 {
        dpi as u32
    } else {
        0
    }
}

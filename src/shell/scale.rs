//! Icon scale factor
//!
//! Icons are rasterised at `logical size × render scale` physical pixels,
//! where the render scale is the larger of the toolkit scale and a coarse
//! DPI bucket.

/// DPI assumed when the display reports none
pub const DEFAULT_DPI: f32 = 96.0;

/// Bucket a DPI value into 1.0, 1.5 or 2.0
pub fn dpi_scale(dpi: Option<f32>) -> f32 {
    let dpi = dpi.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(DEFAULT_DPI);
    if dpi >= 192.0 {
        2.0
    } else if dpi >= 144.0 {
        1.5
    } else {
        1.0
    }
}

/// Combine the toolkit scale factor with the DPI bucket
pub fn render_scale(toolkit_scale: f32, dpi: Option<f32>) -> f32 {
    let toolkit_scale = if toolkit_scale.is_finite() && toolkit_scale > 0.0 {
        toolkit_scale
    } else {
        1.0
    };
    toolkit_scale.max(dpi_scale(dpi))
}

/// Physical edge length for a logical size at `scale`
pub fn pixel_size(logical: u32, scale: f32) -> u32 {
    ((logical as f32 * scale).round() as u32).max(1)
}

pub use kurbo::Point;

/// CSS-pixel display geometry of a drawing surface plus the device pixel
/// ratio, and the mapping from pointer coordinates to backing-buffer
/// coordinates derived from it.
///
/// Pointer events arrive in CSS pixels; the backing buffer is allocated at
/// `css × dpr` physical pixels so strokes stay sharp on high-DPI displays.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayMetrics {
    pub display_width: f64,
    pub display_height: f64,
    pub device_pixel_ratio: f64,
}

impl DisplayMetrics {
    pub fn new(display_width: f64, display_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            display_width,
            display_height,
            device_pixel_ratio,
        }
    }

    pub fn buffer_width(&self) -> u32 {
        (self.display_width * self.device_pixel_ratio).round().max(0.0) as u32
    }

    pub fn buffer_height(&self) -> u32 {
        (self.display_height * self.device_pixel_ratio).round().max(0.0) as u32
    }

    /// Scale a CSS-pixel pointer position into backing-buffer pixels.
    ///
    /// Uses `buffer / display` per axis rather than the raw DPR, so the
    /// mapping stays exact after the buffer dimensions are rounded.
    pub fn to_buffer(&self, css: Point) -> Point {
        let sx = if self.display_width > 0.0 {
            f64::from(self.buffer_width()) / self.display_width
        } else {
            0.0
        };
        let sy = if self.display_height > 0.0 {
            f64::from(self.buffer_height()) / self.display_height
        } else {
            0.0
        };
        Point::new(css.x * sx, css.y * sy)
    }

    /// Per-axis scale factor of a stroke width drawn in CSS pixels.
    pub fn stroke_scale(&self) -> f64 {
        self.device_pixel_ratio
    }
}

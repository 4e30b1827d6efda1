use kurbo::Point;

use crate::{
    composite::{BLACK, Rgba8, WHITE},
    error::{DuudlError, DuudlResult},
    geom::DisplayMetrics,
    raster::Raster,
};

/// Pen settings applied to strokes begun after the change; closed strokes
/// are immutable and keep the brush they were drawn with.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Brush {
    /// Stroke width in CSS pixels.
    pub width: f64,
    pub color: Rgba8,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            width: 3.0,
            color: BLACK,
        }
    }
}

/// One continuous pointer-down-to-pointer-up path, in buffer coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    width: f64,
    color: Rgba8,
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    fn rescaled(&self, rx: f64, ry: f64) -> Stroke {
        Stroke {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x * rx, p.y * ry))
                .collect(),
            width: self.width * (rx + ry) * 0.5,
            color: self.color,
        }
    }
}

/// Freehand input capture surface.
///
/// Owns the backing pixel buffer exclusively; pointer coordinates arrive in
/// CSS pixels and are mapped into buffer pixels before painting, so strokes
/// stay accurate under any device pixel ratio or CSS scaling. Snapshots are
/// copies of a fully painted frame, never views into the live buffer.
pub struct StrokeSurface {
    metrics: DisplayMetrics,
    background: Rgba8,
    buffer: Raster,
    strokes: Vec<Stroke>,
    open: Option<Stroke>,
    brush: Brush,
    enabled: bool,
    revision: u64,
}

impl StrokeSurface {
    pub fn new(metrics: DisplayMetrics) -> DuudlResult<Self> {
        if metrics.buffer_width() == 0 || metrics.buffer_height() == 0 {
            return Err(DuudlError::validation(
                "surface display size must map to a non-empty buffer",
            ));
        }
        Ok(Self {
            metrics,
            background: WHITE,
            buffer: Raster::filled(metrics.buffer_width(), metrics.buffer_height(), WHITE),
            strokes: Vec::new(),
            open: None,
            brush: Brush::default(),
            enabled: false,
            revision: 0,
        })
    }

    pub fn metrics(&self) -> DisplayMetrics {
        self.metrics
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Applies to strokes begun after this call.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Input gate, flipped by the session controller on phase changes.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Bumped every time a new complete frame is exportable (`end_stroke`,
    /// `clear`, `resize`). Listeners compare revisions to learn when to
    /// pull a fresh snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Start a stroke at a CSS-pixel position. No-op while disabled.
    pub fn begin_stroke(&mut self, css: Point) {
        if !self.enabled {
            return;
        }
        if self.open.is_some() {
            // A missed pointer-up; close the dangling stroke first.
            self.end_stroke();
        }
        let p = self.metrics.to_buffer(css);
        let width = self.brush.width * self.metrics.stroke_scale();
        let color = self.brush.color;
        self.buffer.stamp_segment(p, p, width, color);
        self.open = Some(Stroke {
            points: vec![p],
            width,
            color,
        });
    }

    /// Extend the open stroke and paint the new segment immediately.
    /// No-op if no stroke is open.
    pub fn extend_stroke(&mut self, css: Point) {
        let p = self.metrics.to_buffer(css);
        let Some(open) = self.open.as_mut() else {
            return;
        };
        let last = *open.points.last().unwrap_or(&p);
        let (width, color) = (open.width, open.color);
        open.points.push(p);
        self.buffer.stamp_segment(last, p, width, color);
    }

    /// Close the open stroke. No-op if none is open.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.open.take() {
            self.strokes.push(stroke);
            self.revision += 1;
        }
    }

    /// Reset to the solid background. Any open stroke is discarded.
    pub fn clear(&mut self) {
        self.open = None;
        self.strokes.clear();
        self.buffer.fill(self.background);
        self.revision += 1;
    }

    /// Re-acquire the backing buffer at a new display size, re-rendering
    /// every stroke at the new scale so the drawing is preserved.
    ///
    /// An in-progress stroke is closed first; its already painted segments
    /// re-render like any other, nothing is left half-painted.
    pub fn resize(&mut self, metrics: DisplayMetrics) -> DuudlResult<()> {
        if metrics.buffer_width() == 0 || metrics.buffer_height() == 0 {
            return Err(DuudlError::validation(
                "surface display size must map to a non-empty buffer",
            ));
        }
        self.end_stroke();

        let rx = f64::from(metrics.buffer_width()) / f64::from(self.buffer.width());
        let ry = f64::from(metrics.buffer_height()) / f64::from(self.buffer.height());
        self.strokes = self.strokes.iter().map(|s| s.rescaled(rx, ry)).collect();
        self.metrics = metrics;

        self.buffer = Raster::filled(
            metrics.buffer_width(),
            metrics.buffer_height(),
            self.background,
        );
        for stroke in &self.strokes {
            paint_stroke(&mut self.buffer, stroke);
        }
        self.revision += 1;
        Ok(())
    }

    /// Immutable copy of the current buffer contents.
    pub fn export_snapshot(&self) -> Raster {
        self.buffer.clone()
    }
}

fn paint_stroke(buffer: &mut Raster, stroke: &Stroke) {
    match stroke.points.as_slice() {
        [] => {}
        [p] => buffer.stamp_segment(*p, *p, stroke.width, stroke.color),
        pts => {
            for pair in pts.windows(2) {
                buffer.stamp_segment(pair[0], pair[1], stroke.width, stroke.color);
            }
        }
    }
}

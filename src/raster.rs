use kurbo::{Point, Vec2};

use crate::{
    composite::{Rgba8, over_opaque},
    error::{DuudlError, DuudlResult},
};

/// An owned straight-alpha RGBA8 pixel grid.
///
/// This is both the live drawing buffer of a
/// [`StrokeSurface`](crate::surface::StrokeSurface) and the immutable
/// snapshot type handed to the normalizer; snapshots are deep copies, never
/// aliases of the live buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Allocate a raster filled with a solid color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap raw straight-alpha RGBA8 bytes, row-major.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> DuudlResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(DuudlError::validation(format!(
                "expected {expected} bytes for {width}x{height} RGBA8, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw straight-alpha RGBA8 bytes, row-major.
    pub fn as_rgba8(&self) -> &[u8] {
        &self.pixels
    }

    /// Read one pixel. Coordinates must stay within `width()`/`height()`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn fill(&mut self, color: Rgba8) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Paint a round-capped line segment of the given width (buffer pixels).
    ///
    /// Coverage falls off linearly over one pixel at the edge of the
    /// stamped capsule, matching the soft edge a 2D canvas stroke has.
    pub fn stamp_segment(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        if self.is_empty() || width <= 0.0 {
            return;
        }
        let radius = width * 0.5;

        let x0 = ((a.x.min(b.x) - radius - 1.0).floor().max(0.0)) as u32;
        let y0 = ((a.y.min(b.y) - radius - 1.0).floor().max(0.0)) as u32;
        let x1 = ((a.x.max(b.x) + radius + 1.0).ceil()).min(f64::from(self.width)) as u32;
        let y1 = ((a.y.max(b.y) + radius + 1.0).ceil()).min(f64::from(self.height)) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let dist = dist_to_segment(center, a, b);
                let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
                    let dst = [
                        self.pixels[i],
                        self.pixels[i + 1],
                        self.pixels[i + 2],
                        self.pixels[i + 3],
                    ];
                    let out = over_opaque(dst, color, coverage as f32);
                    self.pixels[i..i + 4].copy_from_slice(&out);
                }
            }
        }
    }

    /// Count pixels that differ from `background` (test/diagnostic helper).
    pub fn ink_pixels(&self, background: Rgba8) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| *px != background)
            .count()
    }
}

fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab: Vec2 = b - a;
    let len2 = ab.dot(ab);
    if len2 <= f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    let proj = a + ab * t;
    (p - proj).hypot()
}

use std::io::Cursor;

use image::{Rgb, RgbImage, imageops};

use crate::{
    composite::on_white,
    error::{DuudlError, DuudlResult},
    raster::Raster,
};

/// Default classifier input edge, matching common small-image models.
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 224;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A raster resampled into the exact contract a recognition backend
/// expects: fixed square size, RGB composited over opaque white, encoded
/// as PNG. Produced fresh on every normalization, never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedImage {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// PNG-encoded bytes, suitable for posting to a backend verbatim.
    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    /// Check that this image still satisfies the backend contract.
    ///
    /// Backends call this before issuing a request so a wrong-encoding or
    /// wrong-size image surfaces as `InvalidImage` rather than a confusing
    /// remote rejection.
    pub fn verify(&self, expected_size: u32) -> DuudlResult<()> {
        if self.png.len() < PNG_MAGIC.len() || self.png[..PNG_MAGIC.len()] != PNG_MAGIC {
            return Err(DuudlError::invalid_image("buffer is not PNG-encoded"));
        }
        if self.width != expected_size || self.height != expected_size {
            return Err(DuudlError::invalid_image(format!(
                "expected {expected_size}x{expected_size}, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Decode back to raw RGB8 rows (used by in-process models and tests).
    pub fn to_rgb8(&self) -> DuudlResult<Vec<u8>> {
        let img = image::load_from_memory(&self.png)
            .map_err(|e| DuudlError::invalid_image(format!("png decode failed: {e}")))?;
        Ok(img.into_rgb8().into_raw())
    }
}

/// Deterministic resampler from arbitrary-size rasters to the fixed model
/// input contract. Identical input always yields byte-identical output.
#[derive(Clone, Copy, Debug)]
pub struct Normalizer {
    target: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            target: DEFAULT_MODEL_INPUT_SIZE,
        }
    }
}

impl Normalizer {
    pub fn new(target: u32) -> DuudlResult<Self> {
        if target == 0 {
            return Err(DuudlError::validation("model input size must be > 0"));
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Composite onto white, aspect-fit scale, center, rasterize at the
    /// target resolution, PNG-encode.
    #[tracing::instrument(skip(self, raster), fields(w = raster.width(), h = raster.height()))]
    pub fn normalize(&self, raster: &Raster) -> DuudlResult<NormalizedImage> {
        if raster.is_empty() {
            return Err(DuudlError::invalid_image("source raster has zero area"));
        }

        let src = RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
            Rgb(on_white(raster.pixel(x, y)))
        });

        let scale = (f64::from(self.target) / f64::from(raster.width()))
            .min(f64::from(self.target) / f64::from(raster.height()));
        let fit_w = ((f64::from(raster.width()) * scale).round() as u32).max(1);
        let fit_h = ((f64::from(raster.height()) * scale).round() as u32).max(1);
        let scaled = imageops::resize(&src, fit_w, fit_h, imageops::FilterType::Triangle);

        let mut canvas = RgbImage::from_pixel(self.target, self.target, Rgb([255, 255, 255]));
        let dx = i64::from((self.target - fit_w.min(self.target)) / 2);
        let dy = i64::from((self.target - fit_h.min(self.target)) / 2);
        imageops::overlay(&mut canvas, &scaled, dx, dy);

        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| DuudlError::invalid_image(format!("png encode failed: {e}")))?;

        Ok(NormalizedImage {
            width: self.target,
            height: self.target,
            png,
        })
    }
}

//! High-resolution export and alpha-bounding-box cropping.
//!
//! Scaled exports render the whole stroke list into a fresh surface and can
//! block for a while on large canvases; hosts should not call them once per
//! frame.

use image::{RgbaImage, imageops};
use log::debug;

use crate::error::{CanvasError, CanvasResult};
use crate::renderer;
use crate::stroke::Stroke;
use crate::surface::{allocate, image_to_pixmap, pixmap_to_image};

/// Pixel rectangle inside an image. `width` and `height` are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Limits applied to scaled exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub min_scale: u32,
    pub max_pixels: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            min_scale: 4,
            max_pixels: 64 * 1024 * 1024,
        }
    }
}

/// Integer scale for an export of a `canvas_width` wide canvas: at least
/// `min_scale`, and wide enough to hold `mask` at its native resolution.
pub fn export_scale(canvas_width: u32, mask: Option<&RgbaImage>, min_scale: u32) -> u32 {
    let min_scale = min_scale.max(1);
    match mask {
        Some(mask) => min_scale.max(mask.width().div_ceil(canvas_width.max(1))),
        None => min_scale,
    }
}

/// Render `strokes` at an automatically chosen scale onto a copy of `mask`
/// (stretched to the output size) or onto transparency.
pub fn export_scaled_composite(
    strokes: &[Stroke],
    canvas_width: u32,
    canvas_height: u32,
    mask: Option<&RgbaImage>,
    options: ExportOptions,
) -> CanvasResult<RgbaImage> {
    let scale = export_scale(canvas_width, mask, options.min_scale);
    let too_large = || CanvasError::SurfaceAllocation {
        width: canvas_width.saturating_mul(scale),
        height: canvas_height.saturating_mul(scale),
    };
    let width = canvas_width.checked_mul(scale).ok_or_else(too_large)?;
    let height = canvas_height.checked_mul(scale).ok_or_else(too_large)?;
    if u64::from(width) * u64::from(height) > options.max_pixels {
        return Err(too_large());
    }

    debug!(
        "exporting {} strokes at {scale}x ({width}x{height})",
        strokes.len()
    );
    let mut pixmap = allocate(width, height)?;
    if let Some(mask) = mask {
        let mask = image_to_pixmap(mask)?;
        renderer::draw_background(&mut pixmap, &mask);
    }
    for stroke in strokes {
        renderer::draw_stroke(&mut pixmap, stroke, scale as f32);
    }
    Ok(pixmap_to_image(&pixmap))
}

/// Tightest rectangle holding every pixel with non-zero alpha, or `None`
/// when the image is fully transparent. Bounds are inclusive, so a single
/// visible pixel gives a 1x1 rectangle.
pub fn content_bounds(image: &RgbaImage) -> Option<CropRect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| CropRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop `image` to [`content_bounds`], failing with
/// [`CanvasError::NothingToCrop`] on a fully transparent image.
pub fn crop_to_content(image: &RgbaImage) -> CanvasResult<(RgbaImage, CropRect)> {
    let rect = content_bounds(image).ok_or(CanvasError::NothingToCrop)?;
    let cropped = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
    Ok((cropped, rect))
}

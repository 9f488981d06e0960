//! Off-screen pixel buffer holding the rendered drawing.
//!
//! All writes go through a [`SurfaceFrame`] obtained from
//! [`RasterSurface::begin`]. Dropping the frame ends the compose pass and
//! bumps the surface generation, which hosts use to know when to re-upload
//! the pixels.

use image::{Rgba, RgbaImage};
use tiny_skia::{Color, ColorU8, Pixmap};

use crate::error::{CanvasError, CanvasResult};

#[derive(Debug)]
pub struct RasterSurface {
    pixmap: Pixmap,
    scale: f32,
    generation: u64,
}

impl RasterSurface {
    /// Create a transparent surface for a `width` x `height` logical canvas
    /// rendered at `scale` device pixels per logical unit.
    pub fn new(width: u32, height: u32, scale: f32) -> CanvasResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "surface scale must be positive, got {scale}"
            )));
        }
        let (pixel_width, pixel_height) = pixel_size(width, height, scale);
        Ok(Self {
            pixmap: allocate(pixel_width, pixel_height)?,
            scale,
            generation: 0,
        })
    }

    /// Width in device pixels
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in device pixels
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Number of compose passes finished so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Start a compose pass
    pub fn begin(&mut self) -> SurfaceFrame<'_> {
        SurfaceFrame { surface: self }
    }

    /// Copy of the current pixels, for restoring later
    pub fn snapshot(&self) -> Pixmap {
        self.pixmap.clone()
    }

    /// Immutable, unpremultiplied copy of the current pixels
    pub fn to_image(&self) -> RgbaImage {
        pixmap_to_image(&self.pixmap)
    }
}

/// A single begin/compose/end pass over a [`RasterSurface`].
pub struct SurfaceFrame<'a> {
    surface: &'a mut RasterSurface,
}

impl SurfaceFrame<'_> {
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.surface.pixmap
    }

    pub fn scale(&self) -> f32 {
        self.surface.scale
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.surface.pixmap.fill(Color::TRANSPARENT);
    }

    /// Put back pixels taken with [`RasterSurface::snapshot`]
    pub fn restore(&mut self, snapshot: &Pixmap) {
        debug_assert_eq!(snapshot.width(), self.surface.pixmap.width());
        debug_assert_eq!(snapshot.height(), self.surface.pixmap.height());
        self.surface
            .pixmap
            .data_mut()
            .copy_from_slice(snapshot.data());
    }

    /// Finish the pass. Dropping the frame does the same.
    pub fn end(self) {}
}

impl Drop for SurfaceFrame<'_> {
    fn drop(&mut self) {
        self.surface.generation += 1;
    }
}

/// Device pixel size of a logical canvas at `scale`, never smaller than 1x1
pub fn pixel_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scaled = |v: u32| ((v as f32 * scale).ceil() as u32).max(1);
    (scaled(width), scaled(height))
}

pub(crate) fn allocate(width: u32, height: u32) -> CanvasResult<Pixmap> {
    Pixmap::new(width, height).ok_or(CanvasError::SurfaceAllocation { width, height })
}

/// Convert premultiplied surface pixels into a straight-alpha image
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// Convert a straight-alpha image into a premultiplied pixmap
pub fn image_to_pixmap(image: &RgbaImage) -> CanvasResult<Pixmap> {
    let mut pixmap = allocate(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_follows_scale() {
        let surface = RasterSurface::new(100, 50, 2.0).unwrap();
        assert_eq!(surface.width(), 200);
        assert_eq!(surface.height(), 100);

        let surface = RasterSurface::new(10, 10, 1.5).unwrap();
        assert_eq!((surface.width(), surface.height()), (15, 15));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        assert!(RasterSurface::new(10, 10, 0.0).is_err());
        assert!(RasterSurface::new(10, 10, f32::INFINITY).is_err());
    }

    #[test]
    fn test_frame_bumps_generation() {
        let mut surface = RasterSurface::new(4, 4, 1.0).unwrap();
        assert_eq!(surface.generation(), 0);
        surface.begin().end();
        {
            let mut frame = surface.begin();
            frame.clear();
        }
        assert_eq!(surface.generation(), 2);
    }

    #[test]
    fn test_restore_snapshot() {
        let mut surface = RasterSurface::new(4, 4, 1.0).unwrap();
        let blank = surface.snapshot();
        {
            let mut frame = surface.begin();
            frame.pixmap_mut().fill(Color::from_rgba8(255, 0, 0, 255));
        }
        assert_ne!(surface.pixmap().data(), blank.data());
        surface.begin().restore(&blank);
        assert_eq!(surface.pixmap().data(), blank.data());
    }

    #[test]
    fn test_image_conversion() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([10, 200, 30, 255]));
        let pixmap = image_to_pixmap(&image).unwrap();
        let back = pixmap_to_image(&pixmap);
        assert_eq!(back.get_pixel(0, 0), &Rgba([10, 200, 30, 255]));
        assert_eq!(back.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_zero_sized_image_fails_allocation() {
        let image = RgbaImage::new(0, 5);
        assert!(matches!(
            image_to_pixmap(&image),
            Err(CanvasError::SurfaceAllocation { .. })
        ));
    }
}

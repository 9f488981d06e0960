use std::sync::Arc;

use image::RgbaImage;
use parking_lot::{Mutex, MutexGuard};

use crate::canvas::DrawingCanvas;
use crate::error::CanvasResult;

/// A canvas shared between threads.
///
/// Mutations and exports take the same lock, so an export never observes a
/// half-applied edit.
#[derive(Debug, Clone)]
pub struct SharedCanvas {
    inner: Arc<Mutex<DrawingCanvas>>,
}

impl SharedCanvas {
    pub fn new(canvas: DrawingCanvas) -> Self {
        Self {
            inner: Arc::new(Mutex::new(canvas)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, DrawingCanvas> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the canvas
    pub fn with<R>(&self, f: impl FnOnce(&mut DrawingCanvas) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn export_flat_image(&self) -> RgbaImage {
        self.inner.lock().export_flat_image()
    }

    /// Scaled export under the lock. Blocks other users of the canvas until
    /// the render completes.
    pub fn export_scaled_composite(&self, mask: Option<&RgbaImage>) -> CanvasResult<RgbaImage> {
        self.inner.lock().export_scaled_composite(mask)
    }
}

use thiserror::Error;

/// Errors surfaced by the drawing core.
///
/// Undo/redo with nothing to apply is not an error; those calls are no-ops.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A stroke with no points cannot be committed
    #[error("stroke has no points")]
    EmptyStroke,

    #[error("stroke width must be positive, got {0}")]
    InvalidWidth(f32),

    /// The handle does not belong to the stroke currently being captured
    #[error("stroke handle {0} does not match the stroke in progress")]
    StaleStrokeHandle(u64),

    /// Alpha crop over an image without a single visible pixel
    #[error("image is fully transparent, nothing to crop")]
    NothingToCrop,

    #[error("failed to allocate a {width}x{height} raster surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to (de)serialize drawing data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for drawing operations
pub type CanvasResult<T> = Result<T, CanvasError>;

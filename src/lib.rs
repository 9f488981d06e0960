#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod persistence;
pub mod renderer;
pub mod shared;
pub mod stack;
pub mod stroke;
pub mod surface;

pub use app::PaintApp;
pub use canvas::{DrawingCanvas, StrokeHandle};
pub use command::{CommandHistory, StackCommand};
pub use config::CanvasConfig;
pub use error::{CanvasError, CanvasResult};
pub use event::{Availability, CanvasEvent, EventHandler};
pub use export::{CropRect, content_bounds, crop_to_content};
pub use shared::SharedCanvas;
pub use stack::StrokeStack;
pub use stroke::{Stroke, StrokeRecord, StrokeSettings};
pub use surface::RasterSurface;

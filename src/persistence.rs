use std::fs;
use std::path::Path;

use image::RgbaImage;
use log::debug;

use crate::error::CanvasResult;
use crate::stroke::{Stroke, StrokeRecord};

/// Serialize strokes to their JSON exchange layout
pub fn strokes_to_json(strokes: &[Stroke]) -> CanvasResult<String> {
    let records: Vec<StrokeRecord> = strokes.iter().map(Stroke::to_record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parse strokes from JSON, failing on the first malformed stroke
pub fn strokes_from_json(json: &str) -> CanvasResult<Vec<Stroke>> {
    let records: Vec<StrokeRecord> = serde_json::from_str(json)?;
    records.into_iter().map(Stroke::try_from).collect()
}

pub fn save_strokes(path: impl AsRef<Path>, strokes: &[Stroke]) -> CanvasResult<()> {
    let path = path.as_ref();
    debug!("saving {} strokes to {}", strokes.len(), path.display());
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, strokes_to_json(strokes)?)?;
    Ok(())
}

pub fn load_strokes(path: impl AsRef<Path>) -> CanvasResult<Vec<Stroke>> {
    let path = path.as_ref();
    debug!("loading strokes from {}", path.display());
    let json = fs::read_to_string(path)?;
    strokes_from_json(&json)
}

/// Write an exported image; the format follows the file extension
pub fn save_image(path: impl AsRef<Path>, image: &RgbaImage) -> CanvasResult<()> {
    let path = path.as_ref();
    debug!(
        "saving {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    image.save(path)?;
    Ok(())
}

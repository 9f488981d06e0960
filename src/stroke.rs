use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};

/// Ink used by a stroke: a color, or `None` to erase, and a line width.
///
/// Settings are plain values. A stroke copies them when it starts, so later
/// changes to the live settings never reach strokes already on the canvas.
///
/// The color is kept as straight (unmultiplied) sRGBA bytes and only
/// premultiplied when drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSettings {
    rgba: Option<[u8; 4]>,
    width: f32,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            rgba: Some([0, 0, 0, 255]),
            width: 5.0,
        }
    }
}

impl StrokeSettings {
    pub fn new(color: Option<Color32>, width: f32) -> CanvasResult<Self> {
        Self::from_rgba(color.map(|c| c.to_srgba_unmultiplied()), width)
    }

    /// Settings from straight sRGBA bytes, as found in the exchange layout
    pub fn from_rgba(rgba: Option<[u8; 4]>, width: f32) -> CanvasResult<Self> {
        validate_width(width)?;
        Ok(Self { rgba, width })
    }

    /// Settings that punch transparency into the surface instead of painting
    pub fn eraser(width: f32) -> CanvasResult<Self> {
        Self::from_rgba(None, width)
    }

    pub fn color(&self) -> Option<Color32> {
        self.rgba
            .map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a))
    }

    pub fn rgba(&self) -> Option<[u8; 4]> {
        self.rgba
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_eraser(&self) -> bool {
        self.rgba.is_none()
    }

    pub fn set_color(&mut self, color: Option<Color32>) {
        self.rgba = color.map(|c| c.to_srgba_unmultiplied());
    }

    pub fn set_rgba(&mut self, rgba: Option<[u8; 4]>) {
        self.rgba = rgba;
    }

    pub fn set_width(&mut self, width: f32) -> CanvasResult<()> {
        validate_width(width)?;
        self.width = width;
        Ok(())
    }

    /// Copy of these settings painted with `color`, keeping the width
    pub fn with_color(self, color: Color32) -> Self {
        Self {
            rgba: Some(color.to_srgba_unmultiplied()),
            ..self
        }
    }
}

fn validate_width(width: f32) -> CanvasResult<()> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(CanvasError::InvalidWidth(width))
    }
}

/// A committed stroke. Always holds at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    settings: StrokeSettings,
}

impl Stroke {
    /// Create a stroke from captured points, rejecting an empty point list
    pub fn new(points: Vec<Pos2>, settings: StrokeSettings) -> CanvasResult<Self> {
        if points.is_empty() {
            return Err(CanvasError::EmptyStroke);
        }
        Ok(Self { points, settings })
    }

    /// A single-point stroke, drawn as a round dot
    pub fn dot(point: Pos2, settings: StrokeSettings) -> Self {
        Self {
            points: vec![point],
            settings,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn settings(&self) -> StrokeSettings {
        self.settings
    }

    pub fn color(&self) -> Option<Color32> {
        self.settings.color()
    }

    pub fn width(&self) -> f32 {
        self.settings.width
    }

    pub fn to_record(&self) -> StrokeRecord {
        StrokeRecord {
            points: self.points.iter().map(|p| [p.x, p.y]).collect(),
            color: self.settings.rgba,
            width: self.settings.width,
        }
    }
}

/// The stroke being captured between pointer down and pointer up.
///
/// It starts with the touch-down point, so a stroke without points can
/// never come out of the capture path.
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    settings: StrokeSettings,
}

impl MutableStroke {
    pub fn begin(point: Pos2, settings: StrokeSettings) -> Self {
        Self {
            points: vec![point],
            settings,
        }
    }

    /// Append a point, returning the segment it extends the stroke with
    pub fn add_point(&mut self, point: Pos2) -> (Pos2, Pos2) {
        // begin() seeds one point and points are never removed
        let previous = self.points[self.points.len() - 1];
        self.points.push(point);
        (previous, point)
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn settings(&self) -> StrokeSettings {
        self.settings
    }

    pub fn finish(self) -> Stroke {
        Stroke {
            points: self.points,
            settings: self.settings,
        }
    }
}

/// Exchange layout of a stroke: `{points: [[x,y],...], color: [r,g,b,a] | null, width}`.
///
/// Colors are straight sRGBA and pass through [`StrokeSettings`] unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
    pub points: Vec<[f32; 2]>,
    pub color: Option<[u8; 4]>,
    pub width: f32,
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = CanvasError;

    fn try_from(record: StrokeRecord) -> CanvasResult<Self> {
        let settings = StrokeSettings::from_rgba(record.color, record.width)?;
        let points = record.points.into_iter().map(|[x, y]| Pos2::new(x, y)).collect();
        Stroke::new(points, settings)
    }
}

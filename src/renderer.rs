//! Pure drawing functions shared by the on-screen surface and exports.
//!
//! Every stroke is drawn one segment at a time, in the same order whether
//! it is rendered live, incrementally on commit, or as part of a full
//! redraw. That keeps the three paths pixel-identical.

use egui::Pos2;
use log::trace;
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke as SkiaStroke, Transform,
};

use crate::stroke::{Stroke, StrokeSettings};

/// Map a logical point to device space and snap it to the nearest whole pixel
pub fn snap(point: Pos2, scale: f32) -> (f32, f32) {
    ((point.x * scale).round(), (point.y * scale).round())
}

fn paint_for(settings: &StrokeSettings) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    match settings.rgba() {
        Some([r, g, b, a]) => paint.set_color_rgba8(r, g, b, a),
        // Erasing: clear whatever lies under the pen
        None => paint.blend_mode = BlendMode::Clear,
    }
    paint
}

/// Draw one round-capped segment from `from` to `to`.
///
/// A segment whose ends snap to the same pixel is drawn as a filled dot of
/// the stroke width, which is exactly what its round caps would cover.
pub fn draw_segment(
    pixmap: &mut Pixmap,
    from: Pos2,
    to: Pos2,
    settings: &StrokeSettings,
    scale: f32,
) {
    let (x0, y0) = snap(from, scale);
    let (x1, y1) = snap(to, scale);
    let width = settings.width() * scale;
    let paint = paint_for(settings);
    trace!("segment ({x0}, {y0}) -> ({x1}, {y1}) width {width}");

    if x0 == x1 && y0 == y1 {
        if let Some(path) = PathBuilder::from_circle(x0, y0, width / 2.0) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y1);
    if let Some(path) = pb.finish() {
        let stroke = SkiaStroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Draw a point sequence as connected segments; a single point becomes a dot
pub fn draw_points(pixmap: &mut Pixmap, points: &[Pos2], settings: &StrokeSettings, scale: f32) {
    match points {
        [] => {}
        [only] => draw_segment(pixmap, *only, *only, settings, scale),
        _ => {
            for pair in points.windows(2) {
                draw_segment(pixmap, pair[0], pair[1], settings, scale);
            }
        }
    }
}

pub fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke, scale: f32) {
    draw_points(pixmap, stroke.points(), &stroke.settings(), scale);
}

/// Paint `background` stretched over the whole of `pixmap`
pub fn draw_background(pixmap: &mut Pixmap, background: &Pixmap) {
    let sx = pixmap.width() as f32 / background.width() as f32;
    let sy = pixmap.height() as f32 / background.height() as f32;
    let quality = if sx == 1.0 && sy == 1.0 {
        FilterQuality::Nearest
    } else {
        FilterQuality::Bilinear
    };
    let paint = PixmapPaint {
        quality,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        background.as_ref(),
        &paint,
        Transform::from_scale(sx, sy),
        None,
    );
}

/// Rebuild `pixmap` from scratch: background, then every stroke in order.
///
/// Cost is proportional to the total number of points in `strokes`.
pub fn render_all(
    pixmap: &mut Pixmap,
    background: Option<&Pixmap>,
    strokes: &[Stroke],
    scale: f32,
) {
    pixmap.fill(Color::TRANSPARENT);
    if let Some(background) = background {
        draw_background(pixmap, background);
    }
    for stroke in strokes {
        draw_stroke(pixmap, stroke, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn alpha_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).map(|p| p.alpha()).unwrap_or(0)
    }

    fn red(width: f32) -> StrokeSettings {
        StrokeSettings::new(Some(Color32::RED), width).unwrap()
    }

    #[test]
    fn test_single_point_draws_round_dot() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        let stroke = Stroke::dot(Pos2::new(10.0, 10.0), red(5.0));
        draw_stroke(&mut pixmap, &stroke, 1.0);

        // Dot spans 7.5..12.5 on both axes
        assert!(alpha_at(&pixmap, 10, 10) > 250);
        assert!(alpha_at(&pixmap, 9, 9) > 250);
        assert_eq!(alpha_at(&pixmap, 5, 10), 0);
        assert_eq!(alpha_at(&pixmap, 14, 10), 0);
        assert_eq!(alpha_at(&pixmap, 10, 14), 0);

        let center = pixmap.pixel(10, 10).unwrap().demultiply();
        assert!(center.red() > 250 && center.green() < 5 && center.blue() < 5);
    }

    #[test]
    fn test_segment_has_round_caps_and_width() {
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        draw_segment(&mut pixmap, Pos2::new(10.0, 10.0), Pos2::new(30.0, 10.0), &red(4.0), 1.0);

        assert!(alpha_at(&pixmap, 20, 9) > 250);
        assert!(alpha_at(&pixmap, 20, 10) > 250);
        assert_eq!(alpha_at(&pixmap, 20, 14), 0);
        // Round cap extends past the endpoint by half the width
        assert!(alpha_at(&pixmap, 31, 10) > 0);
        assert_eq!(alpha_at(&pixmap, 34, 10), 0);
    }

    #[test]
    fn test_eraser_clears_pixels() {
        let mut pixmap = Pixmap::new(20, 20).unwrap();
        pixmap.fill(Color::from_rgba8(0, 0, 255, 255));
        let eraser = StrokeSettings::eraser(6.0).unwrap();
        draw_points(&mut pixmap, &[Pos2::new(10.0, 10.0)], &eraser, 1.0);

        assert_eq!(alpha_at(&pixmap, 10, 10), 0);
        assert_eq!(alpha_at(&pixmap, 1, 1), 255);
    }

    #[test]
    fn test_scale_multiplies_coordinates_and_width() {
        let mut pixmap = Pixmap::new(40, 40).unwrap();
        let stroke = Stroke::dot(Pos2::new(10.0, 10.0), red(4.0));
        draw_stroke(&mut pixmap, &stroke, 2.0);

        // Dot of diameter 8 centred on (20, 20)
        assert!(alpha_at(&pixmap, 20, 20) > 250);
        assert!(alpha_at(&pixmap, 17, 20) > 250);
        assert_eq!(alpha_at(&pixmap, 10, 10), 0);
        assert_eq!(alpha_at(&pixmap, 26, 20), 0);
    }

    #[test]
    fn test_snap_rounds_to_nearest_pixel() {
        assert_eq!(snap(Pos2::new(1.4, 2.6), 1.0), (1.0, 3.0));
        assert_eq!(snap(Pos2::new(1.3, 2.2), 2.0), (3.0, 4.0));
    }

    #[test]
    fn test_render_all_matches_incremental_draws() {
        let a = Stroke::new(vec![Pos2::new(2.0, 2.0), Pos2::new(15.0, 12.0)], red(3.0)).unwrap();
        let b = Stroke::new(
            vec![Pos2::new(10.0, 2.0), Pos2::new(4.0, 16.0), Pos2::new(18.0, 18.0)],
            StrokeSettings::eraser(2.0).unwrap(),
        )
        .unwrap();

        let mut incremental = Pixmap::new(20, 20).unwrap();
        draw_stroke(&mut incremental, &a, 1.0);
        draw_stroke(&mut incremental, &b, 1.0);

        let mut full = Pixmap::new(20, 20).unwrap();
        full.fill(Color::from_rgba8(1, 2, 3, 4));
        render_all(&mut full, None, &[a, b], 1.0);

        assert_eq!(incremental.data(), full.data());
    }

    #[test]
    fn test_background_stretched_to_fill() {
        let mut background = Pixmap::new(2, 2).unwrap();
        background.fill(Color::from_rgba8(0, 255, 0, 255));
        let mut pixmap = Pixmap::new(8, 8).unwrap();
        render_all(&mut pixmap, Some(&background), &[], 1.0);

        assert_eq!(alpha_at(&pixmap, 0, 0), 255);
        assert_eq!(alpha_at(&pixmap, 7, 7), 255);
    }
}

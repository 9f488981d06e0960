use std::sync::Arc;
use std::thread;

use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions};
use parking_lot::Mutex;

use crate::canvas::DrawingCanvas;
use crate::config::CanvasConfig;
use crate::error::CanvasResult;
use crate::event::{Availability, CanvasEvent};
use crate::export::crop_to_content;
use crate::persistence;
use crate::shared::SharedCanvas;

const EXPORT_PATH: &str = "inkpad-export.png";
const STROKES_PATH: &str = "inkpad-strokes.json";

/// Brush choices remembered between runs
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BrushPrefs {
    color: [u8; 4],
    eraser: bool,
    width: f32,
}

impl Default for BrushPrefs {
    fn default() -> Self {
        Self {
            color: [0, 0, 0, 255],
            eraser: false,
            width: 5.0,
        }
    }
}

impl BrushPrefs {
    fn color32(&self) -> Color32 {
        let [r, g, b, a] = self.color;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    fn apply(&self, canvas: &mut DrawingCanvas) {
        canvas.set_rgba((!self.eraser).then_some(self.color));
        if let Err(err) = canvas.set_width(self.width) {
            log::warn!("ignoring brush width: {err}");
        }
    }
}

/// Everything that only lives while the window is open
struct Session {
    canvas: SharedCanvas,
    /// Toolbar enablement, kept current by canvas events
    toolbar: Arc<Mutex<Availability>>,
    status: Arc<Mutex<String>>,
    texture: Option<TextureHandle>,
    uploaded_generation: Option<u64>,
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintApp {
    brush: BrushPrefs,
    #[serde(skip)]
    session: Option<Session>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, mut config: CanvasConfig) -> CanvasResult<Self> {
        let mut app: PaintApp = match cc.storage {
            Some(storage) => eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default(),
            None => PaintApp::default(),
        };

        config.pixel_scale = cc.egui_ctx.pixels_per_point();
        let mut canvas = DrawingCanvas::new(config)?;
        app.brush.apply(&mut canvas);

        let toolbar = Arc::new(Mutex::new(canvas.availability()));
        let sink = Arc::clone(&toolbar);
        canvas.subscribe(move |event: &CanvasEvent| {
            let mut flags = sink.lock();
            match event {
                CanvasEvent::UndoEnabled => flags.can_undo = true,
                CanvasEvent::UndoDisabled => flags.can_undo = false,
                CanvasEvent::RedoEnabled => flags.can_redo = true,
                CanvasEvent::RedoDisabled => flags.can_redo = false,
                CanvasEvent::ClearEnabled => flags.can_clear = true,
                CanvasEvent::ClearDisabled => flags.can_clear = false,
                CanvasEvent::StrokeFinished => {}
            }
        });

        app.session = Some(Session {
            canvas: SharedCanvas::new(canvas),
            toolbar,
            status: Arc::new(Mutex::new(String::new())),
            texture: None,
            uploaded_generation: None,
        });
        Ok(app)
    }
}

impl Session {
    fn toolbar_ui(&mut self, ui: &mut egui::Ui, brush: &mut BrushPrefs) {
        let flags = *self.toolbar.lock();
        ui.horizontal(|ui| {
            if ui.add_enabled(flags.can_undo, egui::Button::new("⟲ Undo")).clicked() {
                self.canvas.lock().undo();
            }
            if ui.add_enabled(flags.can_redo, egui::Button::new("⟳ Redo")).clicked() {
                self.canvas.lock().redo();
            }
            if ui.add_enabled(flags.can_clear, egui::Button::new("🗑 Clear")).clicked() {
                self.canvas.lock().clear();
            }
            if ui.button("Reset").clicked() {
                self.canvas.lock().reset();
            }

            ui.separator();

            let mut changed = false;
            let mut color = brush.color32();
            ui.add_enabled_ui(!brush.eraser, |ui| {
                if egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::OnlyBlend,
                )
                .changed()
                {
                    brush.color = color.to_srgba_unmultiplied();
                    changed = true;
                }
            });
            changed |= ui.checkbox(&mut brush.eraser, "⌫ Eraser").changed();
            changed |= ui
                .add(egui::Slider::new(&mut brush.width, 1.0..=50.0).text("Width"))
                .changed();
            if changed {
                brush.apply(&mut self.canvas.lock());
            }

            ui.separator();

            if ui.button("Export PNG").clicked() {
                self.spawn_export(ui.ctx().clone());
            }
            if ui.button("Save strokes").clicked() {
                let result = persistence::save_strokes(STROKES_PATH, self.canvas.lock().strokes());
                self.report(result.map(|()| format!("Saved strokes to {STROKES_PATH}")));
            }
            if ui.button("Load strokes").clicked() {
                let result = persistence::load_strokes(STROKES_PATH).map(|strokes| {
                    let count = strokes.len();
                    self.canvas.lock().import_strokes(strokes);
                    format!("Loaded {count} strokes")
                });
                self.report(result);
            }
        });

        let status = self.status.lock();
        if !status.is_empty() {
            ui.label(status.as_str());
        }
    }

    fn report(&self, result: CanvasResult<String>) {
        let message = match result {
            Ok(message) => message,
            Err(err) => {
                log::warn!("{err}");
                format!("Error: {err}")
            }
        };
        *self.status.lock() = message;
    }

    /// Scaled exports can take a while, so they run off the UI thread
    fn spawn_export(&self, ctx: egui::Context) {
        let canvas = self.canvas.clone();
        let status = Arc::clone(&self.status);
        *status.lock() = "Exporting…".to_owned();
        thread::spawn(move || {
            let result = canvas.export_scaled_composite(None).and_then(|image| {
                let (cropped, rect) = crop_to_content(&image)?;
                persistence::save_image(EXPORT_PATH, &cropped)?;
                Ok(rect)
            });
            *status.lock() = match result {
                Ok(rect) => format!("Exported {}x{} to {EXPORT_PATH}", rect.width, rect.height),
                Err(err) => {
                    log::warn!("export failed: {err}");
                    format!("Export failed: {err}")
                }
            };
            ctx.request_repaint();
        });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let (width, height) = {
            let canvas = self.canvas.lock();
            (canvas.config().width, canvas.config().height)
        };
        let (response, painter) = ui.allocate_painter(
            egui::vec2(width as f32, height as f32),
            Sense::click_and_drag(),
        );
        let rect = response.rect;
        let to_canvas = |pos: Pos2| (pos - rect.min).to_pos2();

        let (pressed, moving, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.is_moving(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });

        let mut canvas = self.canvas.lock();
        match pointer {
            Some(pos) if pressed && rect.contains(pos) => canvas.on_pointer_down(to_canvas(pos)),
            Some(pos) if released && canvas.is_drawing() => canvas.on_pointer_up(to_canvas(pos)),
            Some(pos) if moving && canvas.is_drawing() => canvas.on_pointer_move(to_canvas(pos)),
            // A lifted touch may report the release without a position
            None if released && canvas.is_drawing() => canvas.on_pointer_release(),
            _ => {}
        }

        if self.uploaded_generation != Some(canvas.generation()) {
            let surface = canvas.surface();
            let image = ColorImage::from_rgba_premultiplied(
                [surface.width() as usize, surface.height() as usize],
                surface.pixmap().data(),
            );
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ui.ctx().load_texture("canvas", image, TextureOptions::LINEAR));
                }
            }
            self.uploaded_generation = Some(canvas.generation());
        }
        drop(canvas);

        painter.rect_filled(rect, 0.0, Color32::WHITE);
        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(session) = &mut self.session else {
            return;
        };

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            session.toolbar_ui(ui, &mut self.brush);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            session.canvas_ui(ui);
        });
    }
}

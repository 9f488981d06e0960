//! The drawing engine: stroke capture, the committed stroke stack, its
//! undo/redo history and the raster surface that mirrors it.
//!
//! # Rendering paths
//!
//! - While a gesture is in progress each new segment is drawn on top of the
//!   surface in the configured ink color. The surface contents from before
//!   the gesture are kept aside.
//! - Committing a stroke puts those contents back and draws the stroke once
//!   in its own settings, so the surface is identical to a full redraw.
//! - Undo, redo, clear, reset, import and background changes redraw the
//!   whole stack.
//!
//! # Notifications
//!
//! Availability flags (`can_undo`, `can_redo`, `can_clear`) are derived from
//! the history cursor and the stack. Every operation compares the flags
//! before and after and emits one [`CanvasEvent`] per flag that changed.

use egui::{Color32, Pos2};
use image::RgbaImage;
use log::{debug, trace, warn};
use tiny_skia::Pixmap;

use crate::command::{CommandHistory, StackCommand};
use crate::config::CanvasConfig;
use crate::error::{CanvasError, CanvasResult};
use crate::event::{Availability, CanvasEvent, EventBus, EventHandler};
use crate::export::{self, ExportOptions};
use crate::renderer;
use crate::stack::StrokeStack;
use crate::stroke::{MutableStroke, Stroke, StrokeRecord, StrokeSettings};
use crate::surface::{RasterSurface, image_to_pixmap, pixmap_to_image};

/// Proof that a stroke is being captured. Returned by
/// [`DrawingCanvas::begin_stroke`] and consumed by [`DrawingCanvas::end_stroke`].
#[derive(Debug, PartialEq, Eq)]
pub struct StrokeHandle {
    id: u64,
}

impl StrokeHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
struct InProgress {
    id: u64,
    stroke: MutableStroke,
    /// Surface contents before any live segment was drawn
    snapshot: Pixmap,
}

#[derive(Debug)]
pub struct DrawingCanvas {
    config: CanvasConfig,
    /// Live settings; each stroke copies them when it starts
    settings: StrokeSettings,
    stack: StrokeStack,
    history: CommandHistory,
    surface: RasterSurface,
    background: Option<Pixmap>,
    in_progress: Option<InProgress>,
    pointer_stroke: Option<StrokeHandle>,
    next_stroke_id: u64,
    events: EventBus,
}

impl DrawingCanvas {
    pub fn new(config: CanvasConfig) -> CanvasResult<Self> {
        config.validate()?;
        let settings = config.default_settings()?;
        let surface = RasterSurface::new(config.width, config.height, config.pixel_scale)?;
        debug!(
            "created {}x{} canvas at {}x ({}x{} pixels)",
            config.width,
            config.height,
            config.pixel_scale,
            surface.width(),
            surface.height()
        );
        Ok(Self {
            config,
            settings,
            stack: StrokeStack::new(),
            history: CommandHistory::new(),
            surface,
            background: None,
            in_progress: None,
            pointer_stroke: None,
            next_stroke_id: 1,
            events: EventBus::new(),
        })
    }

    /// Canvas of the given logical size with default settings
    pub fn with_size(width: u32, height: u32) -> CanvasResult<Self> {
        Self::new(CanvasConfig::with_size(width, height))
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    // ---- observers -------------------------------------------------------

    /// Register an observer for availability and stroke events
    pub fn subscribe(&self, handler: impl EventHandler + 'static) {
        self.events.subscribe(Box::new(handler));
    }

    pub fn availability(&self) -> Availability {
        Availability {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            can_clear: !self.stack.is_empty(),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_clear(&self) -> bool {
        !self.stack.is_empty()
    }

    fn notify_changes(&self, before: Availability) {
        self.events.emit_all(before.transitions_to(self.availability()));
    }

    // ---- settings --------------------------------------------------------

    pub fn settings(&self) -> StrokeSettings {
        self.settings
    }

    /// Color for strokes started from now on; `None` erases
    pub fn set_color(&mut self, color: Option<Color32>) {
        self.settings.set_color(color);
    }

    /// Like [`set_color`](Self::set_color), from straight sRGBA bytes
    pub fn set_rgba(&mut self, rgba: Option<[u8; 4]>) {
        self.settings.set_rgba(rgba);
    }

    pub fn set_width(&mut self, width: f32) -> CanvasResult<()> {
        self.settings.set_width(width)
    }

    // ---- surface ---------------------------------------------------------

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Changes whenever the surface pixels may have changed
    pub fn generation(&self) -> u64 {
        self.surface.generation()
    }

    /// Replace the image drawn beneath all strokes. Leaves the stack and
    /// history untouched.
    pub fn set_background(&mut self, background: Option<&RgbaImage>) -> CanvasResult<()> {
        self.background = background.map(image_to_pixmap).transpose()?;
        self.render_all();
        Ok(())
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Rebuild the surface from the background and the whole stroke stack.
    ///
    /// A gesture in progress is drawn again on top.
    pub fn render_all(&mut self) {
        debug!(
            "full redraw: {} strokes, {} points",
            self.stack.len(),
            self.stack.point_count()
        );
        let mut frame = self.surface.begin();
        let scale = frame.scale();
        renderer::render_all(
            frame.pixmap_mut(),
            self.background.as_ref(),
            self.stack.strokes(),
            scale,
        );
        frame.end();
        self.redraw_live_stroke();
    }

    /// Repaint only the background, leaving committed strokes off the surface
    /// until the next full redraw or commit. The stack is not changed.
    pub fn redraw_from_background(&mut self) {
        debug!("redrawing background only");
        let mut frame = self.surface.begin();
        frame.clear();
        if let Some(background) = &self.background {
            renderer::draw_background(frame.pixmap_mut(), background);
        }
        frame.end();
        self.redraw_live_stroke();
    }

    fn redraw_live_stroke(&mut self) {
        let Some(live) = &mut self.in_progress else {
            return;
        };
        live.snapshot = self.surface.snapshot();
        if live.stroke.points().len() > 1 {
            let ink = live.stroke.settings().with_color(self.config.ink_color());
            let mut frame = self.surface.begin();
            let scale = frame.scale();
            renderer::draw_points(frame.pixmap_mut(), live.stroke.points(), &ink, scale);
            frame.end();
        }
    }

    // ---- stroke capture --------------------------------------------------

    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Start capturing a stroke at `point` with a copy of `settings`.
    ///
    /// A stroke still in progress is committed first.
    pub fn begin_stroke(&mut self, point: Pos2, settings: StrokeSettings) -> StrokeHandle {
        if let Some(previous) = self.in_progress.take() {
            warn!("stroke {} was never ended, committing it", previous.id);
            self.commit(previous.stroke.finish(), Some(previous.snapshot));
        }

        let id = self.next_stroke_id;
        self.next_stroke_id += 1;
        trace!("begin stroke {id} at {point:?}");
        self.in_progress = Some(InProgress {
            id,
            stroke: MutableStroke::begin(point, settings),
            snapshot: self.surface.snapshot(),
        });
        StrokeHandle { id }
    }

    fn live_stroke(&mut self, handle: &StrokeHandle) -> CanvasResult<&mut InProgress> {
        match &mut self.in_progress {
            Some(live) if live.id == handle.id => Ok(live),
            _ => Err(CanvasError::StaleStrokeHandle(handle.id)),
        }
    }

    /// Extend the stroke in progress, drawing only the new segment
    pub fn append_point(&mut self, handle: &StrokeHandle, point: Pos2) -> CanvasResult<()> {
        let ink_color = self.config.ink_color();
        let live = self.live_stroke(handle)?;
        let (from, to) = live.stroke.add_point(point);
        let ink = live.stroke.settings().with_color(ink_color);

        let mut frame = self.surface.begin();
        let scale = frame.scale();
        renderer::draw_segment(frame.pixmap_mut(), from, to, &ink, scale);
        frame.end();
        Ok(())
    }

    /// Finish the stroke in progress and commit it to the stack
    pub fn end_stroke(&mut self, handle: StrokeHandle) -> CanvasResult<()> {
        self.live_stroke(&handle)?;
        if let Some(live) = self.in_progress.take() {
            trace!("end stroke {} with {} points", live.id, live.stroke.points().len());
            self.commit(live.stroke.finish(), Some(live.snapshot));
        }
        Ok(())
    }

    /// Abandon the stroke in progress without touching the stack or history
    pub fn cancel_stroke(&mut self) {
        self.pointer_stroke = None;
        if let Some(live) = self.in_progress.take() {
            debug!("cancelled stroke {}", live.id);
            let mut frame = self.surface.begin();
            frame.restore(&live.snapshot);
            frame.end();
        }
    }

    // ---- pointer lifecycle -----------------------------------------------

    pub fn on_pointer_down(&mut self, point: Pos2) {
        let handle = self.begin_stroke(point, self.settings);
        self.pointer_stroke = Some(handle);
    }

    pub fn on_pointer_move(&mut self, point: Pos2) {
        let Some(handle) = self.pointer_stroke.take() else {
            warn!("pointer move at {point:?} without a stroke in progress");
            return;
        };
        match self.append_point(&handle, point) {
            Ok(()) => self.pointer_stroke = Some(handle),
            Err(err) => warn!("dropping pointer move: {err}"),
        }
    }

    /// Finish the pointer gesture. `point` is added when it differs from the
    /// last captured point.
    pub fn on_pointer_up(&mut self, point: Pos2) {
        let Some(handle) = self.pointer_stroke.take() else {
            warn!("pointer up at {point:?} without a stroke in progress");
            return;
        };
        let moved = self
            .in_progress
            .as_ref()
            .and_then(|live| live.stroke.points().last())
            .is_some_and(|last| *last != point);
        let result = if moved {
            self.append_point(&handle, point)
                .and_then(|()| self.end_stroke(handle))
        } else {
            self.end_stroke(handle)
        };
        if let Err(err) = result {
            warn!("dropping pointer up: {err}");
        }
    }

    /// Finish the pointer gesture at its last captured point. For hosts that
    /// report a release without a position, e.g. a lifted touch.
    pub fn on_pointer_release(&mut self) {
        let last = self
            .in_progress
            .as_ref()
            .and_then(|live| live.stroke.points().last().copied());
        match last {
            Some(point) => self.on_pointer_up(point),
            None => self.pointer_stroke = None,
        }
    }

    // ---- stack operations ------------------------------------------------

    pub fn strokes(&self) -> &[Stroke] {
        self.stack.strokes()
    }

    /// Commit `stroke` on top of the stack, drawing it incrementally
    pub fn push_stroke(&mut self, stroke: Stroke) {
        self.commit(stroke, None);
    }

    fn commit(&mut self, stroke: Stroke, snapshot: Option<Pixmap>) {
        let before = self.availability();
        if let Err(err) = self
            .history
            .execute(StackCommand::Push(stroke), &mut self.stack)
        {
            warn!("failed to commit stroke: {err}");
            return;
        }

        if self.in_progress.is_some() {
            // Another gesture's live ink is on the surface
            self.render_all();
        } else if let Some(stroke) = self.stack.last() {
            let mut frame = self.surface.begin();
            if let Some(snapshot) = &snapshot {
                frame.restore(snapshot);
            }
            let scale = frame.scale();
            renderer::draw_stroke(frame.pixmap_mut(), stroke, scale);
            frame.end();
        }

        debug!("committed stroke, stack size {}", self.stack.len());
        self.notify_changes(before);
        self.events.emit(CanvasEvent::StrokeFinished);
    }

    /// Remove the top stroke as an undoable edit
    pub fn pop_stroke(&mut self) -> Option<Stroke> {
        let popped = self.stack.last().cloned()?;
        self.record(StackCommand::Pop);
        Some(popped)
    }

    /// Replace every stroke as a single undoable edit
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.record(StackCommand::ReplaceAll(strokes));
    }

    /// Remove every stroke. Undo restores all of them in one step.
    ///
    /// Always recorded, even on an empty stack, so it drops the redo branch
    /// like any other edit.
    pub fn clear(&mut self) {
        debug!("clearing {} strokes", self.stack.len());
        self.replace_all(Vec::new());
    }

    fn record(&mut self, command: StackCommand) {
        let before = self.availability();
        if let Err(err) = self.history.execute(command, &mut self.stack) {
            warn!("stack edit rejected: {err}");
            return;
        }
        self.render_all();
        self.notify_changes(before);
    }

    // ---- undo / redo -----------------------------------------------------

    /// Revert the last edit. Returns `false`, doing nothing, when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let before = self.availability();
        let Some(entry) = self.history.undo(&mut self.stack) else {
            trace!("nothing to undo");
            return false;
        };
        debug!("undo {:?}", entry.forward);
        self.render_all();
        // Undo makes a redo available before it can run out of undos
        let after = self.availability();
        self.events.emit_all(
            [
                before.redo_event(after),
                before.undo_event(after),
                before.clear_event(after),
            ]
            .into_iter()
            .flatten(),
        );
        true
    }

    /// Re-apply the last undone edit. Returns `false`, doing nothing, when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let before = self.availability();
        let Some(entry) = self.history.redo(&mut self.stack) else {
            trace!("nothing to redo");
            return false;
        };
        let additive = entry.forward.is_additive();
        debug!("redo {:?}", entry.forward);
        match (additive, self.stack.last()) {
            (true, Some(stroke)) if self.in_progress.is_none() => {
                let mut frame = self.surface.begin();
                let scale = frame.scale();
                renderer::draw_stroke(frame.pixmap_mut(), stroke, scale);
                frame.end();
            }
            _ => self.render_all(),
        }
        self.notify_changes(before);
        true
    }

    /// Drop all strokes and all history. Not undoable.
    ///
    /// Always reports undo, redo and clear as disabled.
    pub fn reset(&mut self) {
        debug!(
            "reset: dropping {} strokes and {} history entries",
            self.stack.len(),
            self.history.len()
        );
        self.history.clear();
        self.stack.replace_all(Vec::new());
        self.render_all();
        self.events.emit_all([
            CanvasEvent::UndoDisabled,
            CanvasEvent::RedoDisabled,
            CanvasEvent::ClearDisabled,
        ]);
    }

    // ---- import / export -------------------------------------------------

    /// Load a drawing, replacing the stack and discarding all history
    pub fn import_strokes(&mut self, strokes: Vec<Stroke>) {
        let before = self.availability();
        debug!("importing {} strokes", strokes.len());
        self.history.clear();
        self.stack.replace_all(strokes);
        self.render_all();
        self.notify_changes(before);
    }

    /// Load a drawing from its exchange layout. Nothing changes if any
    /// record is malformed.
    pub fn import_records(&mut self, records: Vec<StrokeRecord>) -> CanvasResult<()> {
        let strokes = records
            .into_iter()
            .map(Stroke::try_from)
            .collect::<CanvasResult<Vec<_>>>()?;
        self.import_strokes(strokes);
        Ok(())
    }

    pub fn export_strokes(&self) -> Vec<Stroke> {
        self.stack.strokes().to_vec()
    }

    pub fn export_records(&self) -> Vec<StrokeRecord> {
        self.stack.strokes().iter().map(Stroke::to_record).collect()
    }

    /// The surface as a standalone image: background plus committed strokes.
    /// Live ink of a gesture in progress is left out.
    pub fn export_flat_image(&self) -> RgbaImage {
        match &self.in_progress {
            Some(live) => pixmap_to_image(&live.snapshot),
            None => self.surface.to_image(),
        }
    }

    /// Render the stack at export resolution over `mask`. See
    /// [`export::export_scaled_composite`]; this can block on large canvases.
    pub fn export_scaled_composite(&self, mask: Option<&RgbaImage>) -> CanvasResult<RgbaImage> {
        export::export_scaled_composite(
            self.stack.strokes(),
            self.config.width,
            self.config.height,
            mask,
            ExportOptions {
                min_scale: self.config.min_export_scale,
                max_pixels: self.config.max_export_pixels,
            },
        )
    }
}

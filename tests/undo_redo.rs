use std::sync::Arc;

use egui::{Color32, Pos2};
use inkpad::{CanvasEvent, DrawingCanvas, Stroke, StrokeSettings};
use parking_lot::Mutex;

type EventLog = Arc<Mutex<Vec<CanvasEvent>>>;

fn record_events(canvas: &DrawingCanvas) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    canvas.subscribe(move |event: &CanvasEvent| sink.lock().push(*event));
    log
}

fn take(log: &EventLog) -> Vec<CanvasEvent> {
    std::mem::take(&mut *log.lock())
}

fn line(from: (f32, f32), to: (f32, f32)) -> Stroke {
    Stroke::new(
        vec![Pos2::new(from.0, from.1), Pos2::new(to.0, to.1)],
        StrokeSettings::default(),
    )
    .unwrap()
}

fn assert_flags_consistent(canvas: &DrawingCanvas) {
    assert_eq!(canvas.can_clear(), !canvas.strokes().is_empty());
    let flags = canvas.availability();
    assert_eq!(flags.can_undo, canvas.can_undo());
    assert_eq!(flags.can_redo, canvas.can_redo());
}

#[test]
fn test_undo_redo_two_strokes() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    let events = record_events(&canvas);
    let a = line((5.0, 5.0), (20.0, 5.0));
    let b = line((5.0, 30.0), (20.0, 30.0));

    canvas.push_stroke(a.clone());
    assert_eq!(
        take(&events),
        vec![
            CanvasEvent::UndoEnabled,
            CanvasEvent::ClearEnabled,
            CanvasEvent::StrokeFinished
        ]
    );
    assert_flags_consistent(&canvas);

    canvas.push_stroke(b.clone());
    assert_eq!(take(&events), vec![CanvasEvent::StrokeFinished]);
    assert_eq!(canvas.strokes(), &[a.clone(), b.clone()]);

    assert!(canvas.undo());
    assert_eq!(canvas.strokes(), &[a.clone()]);
    assert_eq!(take(&events), vec![CanvasEvent::RedoEnabled]);
    assert_flags_consistent(&canvas);

    assert!(canvas.undo());
    assert!(canvas.strokes().is_empty());
    assert_eq!(
        take(&events),
        vec![CanvasEvent::UndoDisabled, CanvasEvent::ClearDisabled]
    );
    assert_flags_consistent(&canvas);

    assert!(canvas.redo());
    assert_eq!(canvas.strokes(), &[a.clone()]);
    assert_eq!(
        take(&events),
        vec![CanvasEvent::UndoEnabled, CanvasEvent::ClearEnabled]
    );

    assert!(canvas.redo());
    assert_eq!(canvas.strokes(), &[a, b]);
    assert_eq!(take(&events), vec![CanvasEvent::RedoDisabled]);
    assert_flags_consistent(&canvas);
}

#[test]
fn test_undo_of_only_stroke_enables_redo_first() {
    let mut canvas = DrawingCanvas::with_size(32, 32).unwrap();
    canvas.push_stroke(line((1.0, 1.0), (10.0, 10.0)));
    let events = record_events(&canvas);

    canvas.undo();
    assert_eq!(
        take(&events),
        vec![
            CanvasEvent::RedoEnabled,
            CanvasEvent::UndoDisabled,
            CanvasEvent::ClearDisabled
        ]
    );
}

#[test]
fn test_clear_is_undone_in_one_step() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    let a = line((5.0, 5.0), (20.0, 5.0));
    let b = line((5.0, 30.0), (20.0, 30.0));
    canvas.push_stroke(a.clone());
    canvas.push_stroke(b.clone());
    let events = record_events(&canvas);

    canvas.clear();
    assert!(canvas.strokes().is_empty());
    assert!(canvas.can_undo());
    assert_eq!(take(&events), vec![CanvasEvent::ClearDisabled]);

    assert!(canvas.undo());
    assert_eq!(canvas.strokes(), &[a, b]);
    assert_eq!(
        take(&events),
        vec![CanvasEvent::RedoEnabled, CanvasEvent::ClearEnabled]
    );
    assert_flags_consistent(&canvas);
}

#[test]
fn test_clear_on_empty_stack_drops_redo_branch() {
    let mut canvas = DrawingCanvas::with_size(16, 16).unwrap();
    canvas.push_stroke(Stroke::dot(Pos2::new(4.0, 4.0), StrokeSettings::default()));
    canvas.undo();
    assert!(canvas.can_redo());
    let events = record_events(&canvas);

    canvas.clear();
    assert!(canvas.strokes().is_empty());
    assert!(canvas.can_undo());
    assert!(!canvas.can_redo());
    assert_eq!(
        take(&events),
        vec![CanvasEvent::UndoEnabled, CanvasEvent::RedoDisabled]
    );
    assert_flags_consistent(&canvas);

    // The undone stroke is gone for good; undoing the clear keeps it empty
    assert!(canvas.undo());
    assert!(canvas.strokes().is_empty());
    assert!(!canvas.can_undo());
    assert!(canvas.redo());
    assert!(canvas.strokes().is_empty());
}

#[test]
fn test_clear_on_fresh_canvas_is_undoable() {
    let mut canvas = DrawingCanvas::with_size(16, 16).unwrap();
    let events = record_events(&canvas);
    canvas.clear();
    assert!(canvas.can_undo());
    assert_eq!(take(&events), vec![CanvasEvent::UndoEnabled]);
}

#[test]
fn test_new_stroke_discards_redo() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    let a = line((5.0, 5.0), (20.0, 5.0));
    let b = line((5.0, 30.0), (20.0, 30.0));
    let c = line((40.0, 40.0), (50.0, 50.0));
    canvas.push_stroke(a.clone());
    canvas.push_stroke(b);
    canvas.undo();
    let events = record_events(&canvas);

    canvas.push_stroke(c.clone());
    assert_eq!(canvas.strokes(), &[a, c]);
    assert!(!canvas.can_redo());
    assert_eq!(
        take(&events),
        vec![CanvasEvent::RedoDisabled, CanvasEvent::StrokeFinished]
    );
    assert!(!canvas.redo());
}

#[test]
fn test_undo_redo_with_empty_history_are_no_ops() {
    let mut canvas = DrawingCanvas::with_size(16, 16).unwrap();
    let events = record_events(&canvas);
    let generation = canvas.generation();

    assert!(!canvas.undo());
    assert!(!canvas.redo());
    assert!(take(&events).is_empty());
    assert_eq!(canvas.generation(), generation);
}

#[test]
fn test_pop_and_replace_are_undoable() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    let a = line((5.0, 5.0), (20.0, 5.0));
    let b = line((5.0, 30.0), (20.0, 30.0));
    canvas.push_stroke(a.clone());
    canvas.push_stroke(b.clone());

    assert_eq!(canvas.pop_stroke(), Some(b.clone()));
    assert_eq!(canvas.strokes(), &[a.clone()]);
    canvas.undo();
    assert_eq!(canvas.strokes(), &[a.clone(), b.clone()]);

    let replacement = vec![line((0.0, 0.0), (63.0, 63.0))];
    canvas.replace_all(replacement.clone());
    assert_eq!(canvas.strokes(), replacement.as_slice());
    canvas.undo();
    assert_eq!(canvas.strokes(), &[a, b]);
    canvas.redo();
    assert_eq!(canvas.strokes(), replacement.as_slice());
}

#[test]
fn test_pop_on_empty_stack_records_nothing() {
    let mut canvas = DrawingCanvas::with_size(16, 16).unwrap();
    assert_eq!(canvas.pop_stroke(), None);
    assert!(!canvas.can_undo());
}

#[test]
fn test_reset_always_reports_everything_disabled() {
    let mut canvas = DrawingCanvas::with_size(32, 32).unwrap();
    let events = record_events(&canvas);
    canvas.reset();
    assert_eq!(
        take(&events),
        vec![
            CanvasEvent::UndoDisabled,
            CanvasEvent::RedoDisabled,
            CanvasEvent::ClearDisabled
        ]
    );

    canvas.push_stroke(line((1.0, 1.0), (8.0, 8.0)));
    canvas.push_stroke(line((1.0, 9.0), (8.0, 9.0)));
    canvas.undo();
    take(&events);

    canvas.reset();
    assert!(canvas.strokes().is_empty());
    assert!(!canvas.can_undo());
    assert!(!canvas.can_redo());
    assert_eq!(
        take(&events),
        vec![
            CanvasEvent::UndoDisabled,
            CanvasEvent::RedoDisabled,
            CanvasEvent::ClearDisabled
        ]
    );
}

#[test]
fn test_import_replaces_stack_and_history() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    canvas.push_stroke(line((1.0, 1.0), (8.0, 8.0)));
    let events = record_events(&canvas);

    let imported = vec![
        line((10.0, 10.0), (20.0, 20.0)),
        Stroke::dot(
            Pos2::new(30.0, 30.0),
            StrokeSettings::new(Some(Color32::RED), 4.0).unwrap(),
        ),
    ];
    canvas.import_strokes(imported.clone());

    assert_eq!(canvas.export_strokes(), imported);
    assert!(!canvas.can_undo());
    assert!(!canvas.can_redo());
    assert_eq!(take(&events), vec![CanvasEvent::UndoDisabled]);
    assert_flags_consistent(&canvas);

    canvas.import_strokes(Vec::new());
    assert_eq!(take(&events), vec![CanvasEvent::ClearDisabled]);
}

#[test]
fn test_stroke_settings_are_copied_at_start() {
    let mut canvas = DrawingCanvas::with_size(64, 64).unwrap();
    canvas.set_color(Some(Color32::RED));
    canvas.set_width(3.0).unwrap();
    canvas.on_pointer_down(Pos2::new(5.0, 5.0));
    canvas.set_color(Some(Color32::GREEN));
    canvas.set_width(9.0).unwrap();
    canvas.on_pointer_move(Pos2::new(20.0, 5.0));
    canvas.on_pointer_up(Pos2::new(20.0, 5.0));

    let stroke = &canvas.strokes()[0];
    assert_eq!(stroke.color(), Some(Color32::RED));
    assert_eq!(stroke.width(), 3.0);
    assert_eq!(stroke.points().len(), 2);
}

/// Notifications emitted by the canvas when its state changes.
///
/// Availability events fire exactly once per transition of the matching
/// flag, except for reset, which always reports all three flags as disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasEvent {
    UndoEnabled,
    UndoDisabled,
    RedoEnabled,
    RedoDisabled,
    ClearEnabled,
    ClearDisabled,
    /// A stroke was committed to the stack
    StrokeFinished,
}

/// Derived flags driving undo/redo/clear enablement in a host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    pub can_undo: bool,
    pub can_redo: bool,
    pub can_clear: bool,
}

impl Availability {
    /// Events describing the flag changes from `self` to `after`, in
    /// undo, redo, clear order
    pub fn transitions_to(self, after: Availability) -> Vec<CanvasEvent> {
        [
            self.undo_event(after),
            self.redo_event(after),
            self.clear_event(after),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn undo_event(self, after: Availability) -> Option<CanvasEvent> {
        flag_event(
            self.can_undo,
            after.can_undo,
            CanvasEvent::UndoEnabled,
            CanvasEvent::UndoDisabled,
        )
    }

    pub fn redo_event(self, after: Availability) -> Option<CanvasEvent> {
        flag_event(
            self.can_redo,
            after.can_redo,
            CanvasEvent::RedoEnabled,
            CanvasEvent::RedoDisabled,
        )
    }

    /// Fires on empty <-> non-empty changes of the stack
    pub fn clear_event(self, after: Availability) -> Option<CanvasEvent> {
        flag_event(
            self.can_clear,
            after.can_clear,
            CanvasEvent::ClearEnabled,
            CanvasEvent::ClearDisabled,
        )
    }
}

fn flag_event(
    was: bool,
    now: bool,
    enabled: CanvasEvent,
    disabled: CanvasEvent,
) -> Option<CanvasEvent> {
    match (was, now) {
        (false, true) => Some(enabled),
        (true, false) => Some(disabled),
        _ => None,
    }
}

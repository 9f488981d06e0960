use super::{CommandError, CommandResult, StackCommand};
use crate::stack::StrokeStack;

/// A recorded edit: the command that was applied and the one that reverts it
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub forward: StackCommand,
    pub inverse: StackCommand,
}

/// Linear undo/redo history over a [`StrokeStack`].
///
/// Entries before the cursor have been applied and can be undone; entries
/// at or after it were undone and can be redone.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` to `stack` and record it, dropping any redo entries
    pub fn execute(&mut self, command: StackCommand, stack: &mut StrokeStack) -> CommandResult {
        let inverse = command.inverse(stack).ok_or(CommandError::InvalidState)?;
        command.apply(stack)?;

        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry {
            forward: command,
            inverse,
        });
        self.cursor = self.entries.len();
        Ok(())
    }

    /// Revert the entry before the cursor. Returns it, or `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self, stack: &mut StrokeStack) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        let index = self.cursor - 1;
        let entry = &self.entries[index];
        if let Err(err) = entry.inverse.apply(stack) {
            panic!("history out of sync with stroke stack on undo of {entry:?}: {err}");
        }
        self.cursor = index;
        Some(entry)
    }

    /// Re-apply the entry at the cursor. Returns it, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self, stack: &mut StrokeStack) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        let index = self.cursor;
        let entry = &self.entries[index];
        if let Err(err) = entry.forward.apply(stack) {
            panic!("history out of sync with stroke stack on redo of {entry:?}: {err}");
        }
        self.cursor = index + 1;
        Some(entry)
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry, both undoable and redoable
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

use super::{CommandError, CommandResult};
use crate::stack::StrokeStack;
use crate::stroke::Stroke;

/// Edits that can be made to the stroke stack and recorded for undo/redo
#[derive(Debug, Clone, PartialEq)]
pub enum StackCommand {
    /// Append a stroke on top of the stack
    Push(Stroke),

    /// Remove the topmost stroke
    Pop,

    /// Swap the whole stack for the given strokes
    ReplaceAll(Vec<Stroke>),
}

impl StackCommand {
    /// Build the command that restores `stack` after this one is applied to it.
    ///
    /// Must be called before [`StackCommand::apply`], against the same stack.
    pub fn inverse(&self, stack: &StrokeStack) -> Option<StackCommand> {
        match self {
            StackCommand::Push(_) => Some(StackCommand::Pop),
            StackCommand::Pop => stack.last().cloned().map(StackCommand::Push),
            StackCommand::ReplaceAll(_) => Some(StackCommand::ReplaceAll(stack.strokes().to_vec())),
        }
    }

    /// Apply the command to `stack`
    pub fn apply(&self, stack: &mut StrokeStack) -> CommandResult {
        match self {
            StackCommand::Push(stroke) => {
                stack.push(stroke.clone());
                Ok(())
            }
            StackCommand::Pop => match stack.pop() {
                Some(_) => Ok(()),
                None => Err(CommandError::InvalidState),
            },
            StackCommand::ReplaceAll(strokes) => {
                stack.replace_all(strokes.clone());
                Ok(())
            }
        }
    }

    /// Whether the surface can be updated by drawing on top of it instead of
    /// a full redraw after this command is applied
    pub fn is_additive(&self) -> bool {
        matches!(self, StackCommand::Push(_))
    }
}

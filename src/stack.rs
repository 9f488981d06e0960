use crate::stroke::Stroke;

/// The committed strokes in paint order: later strokes draw over earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeStack {
    strokes: Vec<Stroke>,
}

impl StrokeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove the most recently committed stroke
    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Swap in a whole new stack, returning the previous contents
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) -> Vec<Stroke> {
        std::mem::replace(&mut self.strokes, strokes)
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of points across all strokes, the cost of a full redraw
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::StrokeSettings;
    use egui::Pos2;

    fn dot(x: f32) -> Stroke {
        Stroke::dot(Pos2::new(x, x), StrokeSettings::default())
    }

    #[test]
    fn test_push_pop_order() {
        let mut stack = StrokeStack::new();
        stack.push(dot(1.0));
        stack.push(dot(2.0));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(dot(2.0)));
        assert_eq!(stack.strokes(), &[dot(1.0)]);
        assert_eq!(stack.pop(), Some(dot(1.0)));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_replace_all_returns_previous() {
        let mut stack = StrokeStack::new();
        stack.push(dot(1.0));
        let old = stack.replace_all(vec![dot(5.0), dot(6.0)]);
        assert_eq!(old, vec![dot(1.0)]);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.point_count(), 2);
    }
}

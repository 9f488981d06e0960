mod bus;
mod events;

pub use bus::EventBus;
pub use events::{Availability, CanvasEvent};

/// Observer of canvas state changes
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &CanvasEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&CanvasEvent) + Send,
{
    fn handle_event(&mut self, event: &CanvasEvent) {
        self(event)
    }
}

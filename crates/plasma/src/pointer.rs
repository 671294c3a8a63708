use std::cell::Cell;
use std::rc::Rc;

use crate::signal::SignalCell;

/// Latest pointer position in surface-local pixels.
///
/// Written at input-event rate, read once per frame. When the engine is not
/// interactive the tracker stays inert and reports `(0, 0)`.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Rc<SignalCell<(f32, f32)>>,
    origin: Rc<Cell<(f64, f64)>>,
}

/// Host-facing handle that forwards pointer moves into the tracker.
#[derive(Debug, Clone)]
pub struct PointerObserver {
    position: Rc<SignalCell<(f32, f32)>>,
    origin: Rc<Cell<(f64, f64)>>,
    interactive: bool,
}

impl PointerTracker {
    pub fn new(interactive: bool) -> (Self, PointerObserver) {
        let position = SignalCell::new((0.0, 0.0));
        let origin = Rc::new(Cell::new((0.0, 0.0)));
        let observer = PointerObserver {
            position: position.clone(),
            origin: origin.clone(),
            interactive,
        };
        (Self { position, origin }, observer)
    }

    pub fn position(&self) -> (f32, f32) {
        self.position.get()
    }

    /// Records where the surface sits in the host's client coordinates.
    pub(crate) fn set_origin(&self, left: f64, top: f64) {
        self.origin.set((left, top));
    }

    pub(crate) fn detach(&self) {
        self.position.detach();
    }
}

impl PointerObserver {
    /// Pointer position relative to the host's client area.
    pub fn moved_client(&self, x: f64, y: f64) {
        let (left, top) = self.origin.get();
        self.moved_local(x - left, y - top);
    }

    /// Pointer position already relative to the surface.
    pub fn moved_local(&self, x: f64, y: f64) {
        if !self.interactive {
            return;
        }
        self.position.set((x as f32, y as f32));
    }

    pub fn is_attached(&self) -> bool {
        self.position.is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_coordinates_are_translated_by_origin() {
        let (tracker, observer) = PointerTracker::new(true);
        tracker.set_origin(100.0, 40.0);
        observer.moved_client(150.0, 90.0);
        assert_eq!(tracker.position(), (50.0, 50.0));
        observer.moved_local(3.0, 4.0);
        assert_eq!(tracker.position(), (3.0, 4.0));
    }

    #[test]
    fn last_value_wins() {
        let (tracker, observer) = PointerTracker::new(true);
        for step in 0..10 {
            observer.moved_local(f64::from(step), f64::from(step * 2));
        }
        assert_eq!(tracker.position(), (9.0, 18.0));
    }

    #[test]
    fn inert_when_not_interactive() {
        let (tracker, observer) = PointerTracker::new(false);
        observer.moved_client(10.0, 20.0);
        assert_eq!(tracker.position(), (0.0, 0.0));
    }

    #[test]
    fn detached_tracker_keeps_last_position() {
        let (tracker, observer) = PointerTracker::new(true);
        observer.moved_local(5.0, 6.0);
        tracker.detach();
        observer.moved_local(7.0, 8.0);
        assert_eq!(tracker.position(), (5.0, 6.0));
        assert!(!observer.is_attached());
    }
}

use std::rc::Rc;

use crate::signal::SignalCell;

/// Visible fraction above which the surface counts as on screen.
pub const VISIBILITY_THRESHOLD: f64 = 0.05;

/// Read side of the visibility signal, consulted once per tick.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    cell: Rc<SignalCell<bool>>,
}

/// Write side of the visibility signal, owned by the host's intersection source.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    cell: Rc<SignalCell<bool>>,
}

impl VisibilityGate {
    /// Creates a gate that starts out visible, together with its observer.
    pub fn new() -> (Self, VisibilityObserver) {
        let cell = SignalCell::new(true);
        (
            Self { cell: cell.clone() },
            VisibilityObserver { cell },
        )
    }

    pub fn is_visible(&self) -> bool {
        self.cell.get()
    }

    pub(crate) fn detach(&self) {
        self.cell.detach();
    }
}

impl VisibilityObserver {
    pub fn set_visible(&self, visible: bool) {
        if self.cell.set(visible) {
            tracing::trace!(visible, "visibility changed");
        }
    }

    /// Feeds an intersection ratio in `[0, 1]`, e.g. from a viewport observer.
    pub fn set_intersection_ratio(&self, ratio: f64) {
        self.set_visible(ratio > VISIBILITY_THRESHOLD);
    }

    pub fn is_attached(&self) -> bool {
        self.cell.is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_visible_and_follows_observer() {
        let (gate, observer) = VisibilityGate::new();
        assert!(gate.is_visible());
        observer.set_visible(false);
        assert!(!gate.is_visible());
        observer.set_visible(true);
        assert!(gate.is_visible());
    }

    #[test]
    fn ratio_uses_threshold() {
        let (gate, observer) = VisibilityGate::new();
        observer.set_intersection_ratio(0.01);
        assert!(!gate.is_visible());
        observer.set_intersection_ratio(0.2);
        assert!(gate.is_visible());
    }

    #[test]
    fn detached_observer_is_ignored() {
        let (gate, observer) = VisibilityGate::new();
        gate.detach();
        observer.set_visible(false);
        assert!(gate.is_visible());
        assert!(!observer.is_attached());
    }
}

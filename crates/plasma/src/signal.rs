use std::cell::Cell;
use std::rc::Rc;

/// Last-value-wins cell shared between one host-side writer and the engine.
///
/// Everything runs on the host UI thread, so a `Cell` replace is the whole
/// synchronisation story. Once detached, writes are dropped.
#[derive(Debug)]
pub(crate) struct SignalCell<T: Copy> {
    value: Cell<T>,
    attached: Cell<bool>,
}

impl<T: Copy> SignalCell<T> {
    pub(crate) fn new(initial: T) -> Rc<Self> {
        Rc::new(Self {
            value: Cell::new(initial),
            attached: Cell::new(true),
        })
    }

    pub(crate) fn get(&self) -> T {
        self.value.get()
    }

    /// Returns false when the write was dropped because the cell is detached.
    pub(crate) fn set(&self, value: T) -> bool {
        if self.attached.get() {
            self.value.set(value);
            true
        } else {
            false
        }
    }

    pub(crate) fn detach(&self) {
        self.attached.set(false);
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_cell_keeps_last_value() {
        let cell = SignalCell::new(1_u32);
        assert!(cell.set(2));
        cell.detach();
        assert!(!cell.set(3));
        assert_eq!(cell.get(), 2);
        assert!(!cell.is_attached());
    }
}

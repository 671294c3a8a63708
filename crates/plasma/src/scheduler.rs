//! Frame scheduling capability.
//!
//! The render loop never talks to a display-refresh API directly. It asks a
//! [`Scheduler`] for the next frame and receives a [`FrameToken`]; the host
//! hands that token back when the frame fires. A token that is no longer the
//! pending one (cancelled, or delivered after `stop`) is ignored by the loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host capability that delivers "next displayable frame" callbacks.
pub trait Scheduler {
    /// Requests one callback on the next frame.
    fn schedule(&mut self) -> FrameToken;
    /// Withdraws a pending request. Unknown tokens are ignored.
    fn cancel(&mut self, token: FrameToken);
}

/// Deterministic scheduler that only advances when the caller drains it.
///
/// Clones share the same queue, so a test (or a headless host) keeps one
/// handle while the render loop owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualQueue>>,
}

#[derive(Debug, Default)]
struct ManualQueue {
    next_id: u64,
    pending: VecDeque<FrameToken>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every frame requested so far, oldest first.
    pub fn take_due(&self) -> Vec<FrameToken> {
        self.inner.borrow_mut().pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Number of requests withdrawn through [`Scheduler::cancel`].
    pub fn cancelled(&self) -> usize {
        self.inner.borrow().cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameToken {
        let mut queue = self.inner.borrow_mut();
        queue.next_id += 1;
        let token = FrameToken(queue.next_id);
        queue.pending.push_back(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        let mut queue = self.inner.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|pending| *pending != token);
        if queue.pending.len() != before {
            queue.cancelled += 1;
        }
    }
}

//! Per-frame driver.
//!
//! ```text
//!   start(now) ──▶ Running ──▶ tick(token, now) ──▶ visible? ──▶ session.render
//!                    │                 │                 └─ no ──▶ skip
//!                    │                 └──────────────▶ reschedule
//!                    └─ stop() ──▶ Stopped (terminal, session disposed)
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::pointer::PointerTracker;
use crate::scheduler::{FrameToken, Scheduler};
use crate::surface::{SessionError, SurfaceSession};
use crate::timeline::TimeEvolution;
use crate::types::FrameUniforms;
use crate::visibility::VisibilityGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed but not started yet.
    Idle,
    Running,
    /// Terminal; the session has been disposed.
    Stopped,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// One frame was drawn with these uniforms.
    Rendered(FrameUniforms),
    /// The surface was hidden; nothing was uploaded or drawn.
    Hidden,
    /// Stale token or the loop is not running.
    Inactive,
}

/// Rolling frame counters, logged once per second.
#[derive(Debug, Clone)]
pub struct FrameStats {
    rendered: u64,
    skipped: u64,
    last_fps_update: Option<Instant>,
    frames_since_last_update: u32,
    frames_per_second: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            rendered: 0,
            skipped: 0,
            last_fps_update: None,
            frames_since_last_update: 0,
            frames_per_second: 0.0,
        }
    }
}

impl FrameStats {
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    fn record_skip(&mut self) {
        self.skipped += 1;
    }

    fn record_frame(&mut self, now: Instant, time: f32) {
        self.rendered += 1;
        self.frames_since_last_update += 1;
        let last = *self.last_fps_update.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = Some(now);
            debug!(
                fps = self.frames_per_second.round(),
                rendered = self.rendered,
                skipped = self.skipped,
                time,
                "render stats"
            );
        }
    }
}

/// Drives one session from scheduled frame callbacks.
pub struct RenderLoop<S: SurfaceSession, Sch: Scheduler> {
    session: S,
    scheduler: Sch,
    evolution: TimeEvolution,
    visibility: VisibilityGate,
    pointer: PointerTracker,
    resolution: Rc<Cell<(u32, u32)>>,
    state: LoopState,
    started_at: Option<Instant>,
    pending: Option<FrameToken>,
    stats: FrameStats,
}

impl<S: SurfaceSession, Sch: Scheduler> RenderLoop<S, Sch> {
    pub(crate) fn new(
        session: S,
        scheduler: Sch,
        evolution: TimeEvolution,
        visibility: VisibilityGate,
        pointer: PointerTracker,
        resolution: Rc<Cell<(u32, u32)>>,
    ) -> Self {
        Self {
            session,
            scheduler,
            evolution,
            visibility,
            pointer,
            resolution,
            state: LoopState::Idle,
            started_at: None,
            pending: None,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Token the loop is waiting for, if any.
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Mutable session access while the loop has not been stopped.
    pub(crate) fn session_mut(&mut self) -> Option<&mut S> {
        match self.state {
            LoopState::Stopped => None,
            LoopState::Idle | LoopState::Running => Some(&mut self.session),
        }
    }

    /// Starts the clock and requests the first frame. Only valid from `Idle`.
    pub fn start(&mut self, now: Instant) {
        if self.state != LoopState::Idle {
            debug!(state = ?self.state, "ignoring start on a loop that already ran");
            return;
        }
        self.state = LoopState::Running;
        self.started_at = Some(now);
        self.pending = Some(self.scheduler.schedule());
        debug!(direction = %self.evolution.direction(), "render loop started");
    }

    /// Handles one frame callback.
    ///
    /// A fatal session error is returned without requesting another frame;
    /// the caller is expected to stop the loop.
    pub fn tick(&mut self, token: FrameToken, now: Instant) -> Result<TickOutcome, SessionError> {
        if self.state != LoopState::Running || self.pending != Some(token) {
            trace!(token = token.id(), "ignoring stale frame callback");
            return Ok(TickOutcome::Inactive);
        }
        self.pending = None;

        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at).as_secs_f32();
        let phase = self.evolution.sample(elapsed);

        if !self.visibility.is_visible() {
            self.stats.record_skip();
            self.pending = Some(self.scheduler.schedule());
            return Ok(TickOutcome::Hidden);
        }

        let uniforms = FrameUniforms {
            resolution: self.resolution.get(),
            time: phase.time,
            mouse: self.pointer.position(),
            direction_sign: phase.direction_sign,
        };
        self.session.render(&uniforms)?;
        self.stats.record_frame(now, phase.time);
        self.pending = Some(self.scheduler.schedule());
        Ok(TickOutcome::Rendered(uniforms))
    }

    /// Cancels the pending frame, disposes the session and detaches observers.
    ///
    /// Idempotent. No render call happens after this returns, including for
    /// tokens the host already dequeued.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
        self.session.dispose();
        self.visibility.detach();
        self.pointer.detach();
        debug!(
            rendered = self.stats.rendered,
            skipped = self.stats.skipped,
            "render loop stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::surface::testing::{FakeContainer, RecordingSession, SessionLog};
    use crate::types::{Direction, RenderConfig};
    use crate::visibility::VisibilityObserver;
    use crate::pointer::PointerObserver;

    struct Harness {
        render_loop: RenderLoop<RecordingSession, ManualScheduler>,
        scheduler: ManualScheduler,
        log: Rc<RefCell<SessionLog>>,
        visibility: VisibilityObserver,
        pointer: PointerObserver,
    }

    fn harness(direction: Direction, speed: f32) -> Harness {
        let container = FakeContainer::default();
        let log = container.log.clone();
        let session = RecordingSession::create(container, &RenderConfig::default()).expect("session");
        let scheduler = ManualScheduler::new();
        let (gate, visibility) = VisibilityGate::new();
        let (tracker, pointer) = PointerTracker::new(true);
        let render_loop = RenderLoop::new(
            session,
            scheduler.clone(),
            TimeEvolution::new(direction, speed),
            gate,
            tracker,
            Rc::new(Cell::new((640, 360))),
        );
        Harness {
            render_loop,
            scheduler,
            log,
            visibility,
            pointer,
        }
    }

    impl Harness {
        fn pump(&mut self, now: Instant) -> Vec<TickOutcome> {
            self.scheduler
                .take_due()
                .into_iter()
                .map(|token| self.render_loop.tick(token, now).expect("tick"))
                .collect()
        }
    }

    #[test]
    fn renders_once_per_scheduled_frame() {
        let mut h = harness(Direction::Forward, 1.0);
        let start = Instant::now();
        h.render_loop.start(start);
        for frame in 1..=5 {
            let outcomes = h.pump(start + Duration::from_millis(16 * frame));
            assert_eq!(outcomes.len(), 1);
            assert!(matches!(outcomes[0], TickOutcome::Rendered(_)));
        }
        assert_eq!(h.log.borrow().renders.len(), 5);
        assert_eq!(h.render_loop.stats().rendered(), 5);
        assert_eq!(h.scheduler.pending(), 1);
    }

    #[test]
    fn hidden_surface_skips_rendering_but_keeps_scheduling() {
        let mut h = harness(Direction::Forward, 1.0);
        let start = Instant::now();
        h.render_loop.start(start);
        h.visibility.set_visible(false);

        for frame in 1..=20 {
            let outcomes = h.pump(start + Duration::from_millis(16 * frame));
            assert_eq!(outcomes, vec![TickOutcome::Hidden]);
        }
        assert!(h.log.borrow().renders.is_empty());
        assert_eq!(h.render_loop.stats().skipped(), 20);

        h.visibility.set_visible(true);
        let outcomes = h.pump(start + Duration::from_secs(1));
        assert!(matches!(outcomes[0], TickOutcome::Rendered(_)));
        assert_eq!(h.log.borrow().renders.len(), 1);
    }

    #[test]
    fn stop_blocks_already_dequeued_tick() {
        let mut h = harness(Direction::Forward, 1.0);
        let start = Instant::now();
        h.render_loop.start(start);
        let due = h.scheduler.take_due();
        assert_eq!(due.len(), 1);

        h.render_loop.stop();
        let outcome = h.render_loop.tick(due[0], start + Duration::from_millis(16)).expect("tick");

        assert_eq!(outcome, TickOutcome::Inactive);
        assert!(h.log.borrow().renders.is_empty());
        assert_eq!(h.log.borrow().disposals, 1);
    }

    #[test]
    fn stop_cancels_pending_frame_and_is_idempotent() {
        let mut h = harness(Direction::Forward, 1.0);
        h.render_loop.start(Instant::now());
        assert_eq!(h.scheduler.pending(), 1);

        h.render_loop.stop();
        h.render_loop.stop();

        assert_eq!(h.scheduler.pending(), 0);
        assert_eq!(h.scheduler.cancelled(), 1);
        assert_eq!(h.log.borrow().disposals, 1);
        assert_eq!(h.render_loop.state(), LoopState::Stopped);
        assert!(h.render_loop.session_mut().is_none());
    }

    #[test]
    fn stop_detaches_observers() {
        let mut h = harness(Direction::Forward, 1.0);
        h.render_loop.start(Instant::now());
        h.render_loop.stop();
        assert!(!h.visibility.is_attached());
        assert!(!h.pointer.is_attached());
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut h = harness(Direction::Forward, 1.0);
        let start = Instant::now();
        h.render_loop.start(start);
        let outcome = h
            .render_loop
            .tick(FrameToken::new(42), start + Duration::from_millis(16))
            .expect("tick");
        assert_eq!(outcome, TickOutcome::Inactive);
        assert!(h.log.borrow().renders.is_empty());
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut h = harness(Direction::Forward, 1.0);
        let outcome = h.render_loop.tick(FrameToken::new(1), Instant::now()).expect("tick");
        assert_eq!(outcome, TickOutcome::Inactive);
    }

    #[test]
    fn uniforms_carry_phase_pointer_and_resolution() {
        let mut h = harness(Direction::Reverse, 1.0);
        let start = Instant::now();
        h.render_loop.start(start);
        h.pointer.moved_local(12.0, 34.0);

        h.pump(start + Duration::from_secs(1));
        h.pump(start + Duration::from_secs(2));

        let log = h.log.borrow();
        let last = log.renders.last().expect("frame");
        assert!((last.time - 2.0).abs() < 1e-3);
        assert!(last.time > log.renders[0].time);
        assert_eq!(last.direction_sign, -1.0);
        assert_eq!(last.mouse, (12.0, 34.0));
        assert_eq!(last.resolution, (640, 360));
    }
}

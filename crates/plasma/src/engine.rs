//! Public lifecycle of one mounted plasma surface.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::pointer::{PointerObserver, PointerTracker};
use crate::render_loop::{LoopState, RenderLoop, TickOutcome};
use crate::resize::{ResizeCoordinator, ResizeOutcome};
use crate::scheduler::{FrameToken, Scheduler};
use crate::surface::{SessionError, SurfaceSession};
use crate::timeline::TimeEvolution;
use crate::types::{RenderConfig, SurfaceRect};
use crate::visibility::{VisibilityGate, VisibilityObserver};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("engine has been unmounted")]
    Stopped,
}

/// Host-side handles for routing visibility and pointer events directly.
#[derive(Debug, Clone)]
pub struct Observers {
    pub visibility: VisibilityObserver,
    pub pointer: PointerObserver,
}

/// A mounted engine: one session, one render loop, one resize coordinator.
pub struct Engine<S: SurfaceSession, Sch: Scheduler> {
    render_loop: RenderLoop<S, Sch>,
    resize: ResizeCoordinator,
    observers: Observers,
    config: RenderConfig,
}

impl<S: SurfaceSession, Sch: Scheduler> Engine<S, Sch> {
    /// Creates the session, applies the initial geometry and starts the loop.
    ///
    /// Nothing is left running when this fails; the half-built session is
    /// released when it drops.
    pub fn mount(
        container: S::Container,
        config: RenderConfig,
        scheduler: Sch,
        initial: SurfaceRect,
        now: Instant,
    ) -> Result<Self, EngineError> {
        let config = config.sanitized();
        let mut session = S::create(container, &config)?;

        let (gate, visibility) = VisibilityGate::new();
        let (tracker, pointer) = PointerTracker::new(config.mouse_interactive);
        let resolution = Rc::new(Cell::new((1, 1)));

        let mut resize = ResizeCoordinator::new(config.quality_override, resolution.clone(), tracker.clone());
        resize.apply(initial, &mut session);

        let mut render_loop = RenderLoop::new(
            session,
            scheduler,
            TimeEvolution::new(config.direction, config.speed),
            gate,
            tracker,
            resolution,
        );
        render_loop.start(now);

        tracing::info!(
            direction = %config.direction,
            speed = config.speed,
            scale = config.scale,
            interactive = config.mouse_interactive,
            "plasma engine mounted"
        );

        Ok(Self {
            render_loop,
            resize,
            observers: Observers { visibility, pointer },
            config,
        })
    }

    /// The sanitized configuration this engine runs with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn observers(&self) -> Observers {
        self.observers.clone()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn render_loop(&self) -> &RenderLoop<S, Sch> {
        &self.render_loop
    }

    pub fn last_resize(&self) -> Option<ResizeOutcome> {
        self.resize.last()
    }

    /// Re-measures the surface. Ignored once unmounted.
    pub fn notify_resize(&mut self, rect: SurfaceRect) -> Option<ResizeOutcome> {
        let session = self.render_loop.session_mut()?;
        Some(self.resize.apply(rect, session))
    }

    pub fn notify_visibility(&self, visible: bool) {
        self.observers.visibility.set_visible(visible);
    }

    /// Pointer position in host client coordinates.
    pub fn notify_pointer(&self, x: f64, y: f64) {
        self.observers.pointer.moved_client(x, y);
    }

    /// Delivers a scheduled frame.
    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> Result<TickOutcome, EngineError> {
        if self.render_loop.state() == LoopState::Stopped {
            return Err(EngineError::Stopped);
        }
        match self.render_loop.tick(token, now) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(error = %err, "fatal render error; unmounting");
                self.unmount();
                Err(err.into())
            }
        }
    }

    /// Stops the loop and releases the session. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if self.render_loop.state() == LoopState::Stopped {
            return;
        }
        self.render_loop.stop();
        tracing::info!("plasma engine unmounted");
    }
}

impl<S: SurfaceSession, Sch: Scheduler> Drop for Engine<S, Sch> {
    fn drop(&mut self) {
        self.unmount();
    }
}

//! Desktop host: mounts an [`Engine`] in a winit window and routes events to it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info, trace};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::engine::{Engine, EngineError};
use crate::gpu::{GpuSession, SessionTarget};
use crate::scheduler::{FrameToken, Scheduler};
use crate::types::{GpuPowerPreference, RenderConfig, SurfaceAlpha, SurfaceRect};

/// Window-level settings that sit outside the engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub size: (u32, u32),
    pub title: String,
    pub alpha: SurfaceAlpha,
    /// Frame rate cap; `None` follows the display refresh.
    pub max_fps: Option<f32>,
    pub power: GpuPowerPreference,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            title: "plasmawall".to_string(),
            alpha: SurfaceAlpha::Opaque,
            max_fps: None,
            power: GpuPowerPreference::Low,
        }
    }
}

/// Opens a window, runs the plasma engine in it and returns when the window closes.
pub fn run_window(options: WindowOptions, config: RenderConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(options.title.as_str())
        .with_inner_size(PhysicalSize::new(options.size.0.max(1), options.size.1.max(1)))
        .with_transparent(options.alpha == SurfaceAlpha::Transparent)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let scheduler = WindowScheduler::new();
    let size = window.inner_size();
    let target = SessionTarget {
        window: window.clone(),
        alpha: options.alpha,
        power: options.power,
    };
    let mut engine: Engine<GpuSession, WindowScheduler> = Engine::mount(
        target,
        config,
        scheduler.clone(),
        SurfaceRect::from_size(size.width, size.height),
        Instant::now(),
    )
    .context("failed to mount plasma engine")?;
    info!(
        width = size.width,
        height = size.height,
        max_fps = ?options.max_fps,
        "plasma window ready"
    );

    let mut pacer = FramePacer::new(options.max_fps);
    let mut exposure = Exposure::default();
    let mut result = Ok(());

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                engine.unmount();
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                exposure.minimized = new_size.width == 0 || new_size.height == 0;
                engine.notify_visibility(exposure.visible());
                if !exposure.minimized {
                    engine.notify_resize(SurfaceRect::from_size(new_size.width, new_size.height));
                }
            }
            WindowEvent::Occluded(occluded) => {
                exposure.occluded = occluded;
                engine.notify_visibility(exposure.visible());
                debug!(occluded, "window occlusion changed");
            }
            WindowEvent::CursorMoved { position, .. } => {
                engine.notify_pointer(position.x, position.y);
            }
            WindowEvent::RedrawRequested => {
                let Some(token) = scheduler.take_pending() else {
                    return;
                };
                match engine.on_frame(token, Instant::now()) {
                    Ok(outcome) => trace!(?outcome, "frame delivered"),
                    Err(EngineError::Stopped) => {}
                    Err(err) => {
                        error!(error = %err, "plasma engine stopped");
                        result = Err(anyhow!(err).context("render failed"));
                        elwt.exit();
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if !scheduler.wants_redraw() {
                elwt.set_control_flow(ControlFlow::Wait);
                return;
            }
            let now = Instant::now();
            if pacer.should_render(now) {
                scheduler.mark_requested();
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = pacer.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
        }
        Event::LoopExiting => {
            engine.unmount();
        }
        _ => {}
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("window event loop error: {err}"));
    }

    result
}

/// Tracks the two ways a desktop window stops being visible.
#[derive(Debug, Default, Clone, Copy)]
struct Exposure {
    occluded: bool,
    minimized: bool,
}

impl Exposure {
    fn visible(self) -> bool {
        !self.occluded && !self.minimized
    }
}

/// [`Scheduler`] backed by winit redraw requests.
///
/// The render loop holds one pending frame at a time; the event loop asks
/// for a redraw while one is wanted and hands the token back on
/// `RedrawRequested`.
#[derive(Debug, Clone, Default)]
pub struct WindowScheduler {
    queue: Rc<RefCell<RedrawQueue>>,
}

#[derive(Debug, Default)]
struct RedrawQueue {
    next_id: u64,
    pending: Option<FrameToken>,
    requested: bool,
}

impl WindowScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a frame is pending and no redraw has been requested for it.
    pub fn wants_redraw(&self) -> bool {
        let queue = self.queue.borrow();
        queue.pending.is_some() && !queue.requested
    }

    pub fn mark_requested(&self) {
        self.queue.borrow_mut().requested = true;
    }

    /// Removes the pending token so it can be delivered.
    pub fn take_pending(&self) -> Option<FrameToken> {
        let mut queue = self.queue.borrow_mut();
        queue.requested = false;
        queue.pending.take()
    }
}

impl Scheduler for WindowScheduler {
    fn schedule(&mut self) -> FrameToken {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        let token = FrameToken::new(queue.next_id);
        queue.pending = Some(token);
        queue.requested = false;
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        let mut queue = self.queue.borrow_mut();
        if queue.pending == Some(token) {
            queue.pending = None;
            queue.requested = false;
        }
    }
}

/// Caps the redraw rate when a target FPS is configured.
#[derive(Debug)]
struct FramePacer {
    target_interval: Option<Duration>,
    accumulator: Duration,
    last_tick: Option<Instant>,
}

impl FramePacer {
    fn new(target_fps: Option<f32>) -> Self {
        let target_interval = target_fps.and_then(|fps| {
            if fps.is_finite() && fps > 0.0 {
                Some(Duration::from_secs_f64(1.0 / f64::from(fps)))
            } else {
                None
            }
        });
        Self {
            target_interval,
            accumulator: Duration::ZERO,
            last_tick: None,
        }
    }

    fn should_render(&mut self, now: Instant) -> bool {
        match (self.target_interval, self.last_tick) {
            (Some(interval), Some(last)) => {
                let delta = now.saturating_duration_since(last);
                self.last_tick = Some(now);
                self.accumulator = self.accumulator.saturating_add(delta);
                if self.accumulator + Duration::from_micros(250) < interval {
                    false
                } else {
                    // Drop whole missed intervals instead of bursting to catch up.
                    self.accumulator = Duration::from_nanos(
                        (self.accumulator.as_nanos() % interval.as_nanos().max(1)) as u64,
                    );
                    true
                }
            }
            (_, _) => {
                self.last_tick = Some(now);
                true
            }
        }
    }

    /// When the next capped frame becomes due, if capped.
    fn next_deadline(&self) -> Option<Instant> {
        let interval = self.target_interval?;
        let last = self.last_tick?;
        Some(last + interval.saturating_sub(self.accumulator))
    }
}

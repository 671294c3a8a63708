//! Real-time procedural plasma background.
//!
//! One fixed fragment kernel is drawn over a full-surface triangle, once per
//! displayable frame, into a render target sized from the surface area and
//! then stretched over the presented surface. The flow is:
//!
//! ```text
//!   host events ──▶ Engine ──┬─▶ ResizeCoordinator ──▶ SurfaceSession (target + surface size)
//!                            ├─▶ VisibilityObserver / PointerObserver
//!                            └─▶ RenderLoop::tick ──▶ TimeEvolution ──▶ FrameUniforms ──▶ render
//!                                     ▲                                                  │
//!                                     └──────────────── Scheduler ◀──────────────────────┘
//! ```
//!
//! [`Engine`] is generic over the session and the scheduler so the lifecycle
//! can be driven deterministically in tests; [`gpu::GpuSession`] and
//! [`window::run_window`] provide the wgpu and winit implementations.

mod color;
mod compile;
mod engine;
pub mod gpu;
mod pointer;
mod quality;
mod render_loop;
mod resize;
mod scheduler;
mod signal;
mod surface;
mod timeline;
mod types;
mod visibility;
pub mod window;

pub use color::{parse_hex_color, Rgb, FALLBACK_COLOR};
pub use compile::KERNEL_RATE;
pub use engine::{Engine, EngineError, Observers};
pub use pointer::{PointerObserver, PointerTracker};
pub use quality::{choose_downscale, internal_resolution, BASE_DOWNSCALE};
pub use render_loop::{FrameStats, LoopState, RenderLoop, TickOutcome};
pub use resize::{ResizeCoordinator, ResizeOutcome};
pub use scheduler::{FrameToken, ManualScheduler, Scheduler};
pub use surface::{SessionError, SurfaceSession};
pub use timeline::{Phase, TimeEvolution, PINGPONG_PERIOD};
pub use types::{
    Direction, FrameUniforms, GpuPowerPreference, RenderConfig, SurfaceAlpha, SurfaceRect,
};
pub use visibility::{VisibilityGate, VisibilityObserver, VISIBILITY_THRESHOLD};
pub use window::{run_window, WindowOptions, WindowScheduler};

//! wgpu implementation of [`SurfaceSession`](crate::surface::SurfaceSession).
//!
//! - `context` owns the instance, device and surface configuration, and picks
//!   the composite alpha mode.
//! - `pipeline` builds the kernel pass and the upscale pass over one shared
//!   full-screen triangle vertex stage.
//! - `uniforms` mirrors the kernel's std140 parameter block.
//! - `target` is the offscreen texture sized to the internal resolution.
//! - `state` glues everything together as [`GpuSession`].

mod context;
mod pipeline;
mod state;
mod target;
mod uniforms;

pub use state::{GpuSession, SessionTarget};

use bytemuck::{Pod, Zeroable};

use crate::compile::KERNEL_RATE;
use crate::types::{FrameUniforms, RenderConfig};

/// std140 mirror of the kernel's `PlasmaParams` block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PlasmaUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub custom_color: [f32; 3],
    pub use_custom_color: f32,
    pub mouse: [f32; 2],
    pub direction_sign: f32,
    pub scale: f32,
    pub opacity: f32,
    pub mouse_interactive: f32,
    pub padding: [f32; 2],
}

impl PlasmaUniforms {
    /// Seeds the fields that stay fixed for the lifetime of a session.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            resolution: [1.0, 1.0],
            time: 0.0,
            speed: KERNEL_RATE,
            custom_color: config.color.to_array(),
            use_custom_color: flag(config.use_custom_color),
            mouse: [0.0, 0.0],
            direction_sign: config.direction.sign(),
            scale: config.scale,
            opacity: config.opacity,
            mouse_interactive: flag(config.mouse_interactive),
            padding: [0.0; 2],
        }
    }

    /// Copies the per-frame values in.
    pub fn apply_frame(&mut self, frame: &FrameUniforms) {
        self.resolution = [frame.resolution.0 as f32, frame.resolution.1 as f32];
        self.time = frame.time;
        self.mouse = [frame.mouse.0, frame.mouse.1];
        self.direction_sign = frame.direction_sign;
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

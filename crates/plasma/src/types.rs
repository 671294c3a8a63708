use std::fmt;

use crate::color::{parse_hex_color, Rgb};

/// How the kernel phase evolves with wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Phase grows with elapsed time.
    #[default]
    Forward,
    /// Phase grows with elapsed time, spatial evolution runs backwards.
    Reverse,
    /// Phase oscillates with eased turning points.
    PingPong,
}

impl Direction {
    /// Sign handed to the kernel alongside the phase.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Reverse => -1.0,
            Direction::Forward | Direction::PingPong => 1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Reverse => f.write_str("reverse"),
            Direction::PingPong => f.write_str("pingpong"),
        }
    }
}

/// Declares how the compositor should treat the presented alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Frames are composited over black.
    #[default]
    Opaque,
    /// Frames carry premultiplied alpha for the compositor to blend.
    Transparent,
}

/// Adapter selection hint forwarded to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Immutable configuration supplied when the engine is mounted.
///
/// Values outside their documented ranges are accepted as-is; only a
/// non-positive `scale` is replaced, see [`RenderConfig::sanitized`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Tint applied to the kernel output when `use_custom_color` is set.
    pub color: Rgb,
    /// Replace the kernel palette with `intensity * color`.
    pub use_custom_color: bool,
    /// Multiplier on elapsed time; zero freezes the pattern.
    pub speed: f32,
    pub direction: Direction,
    /// Zoom factor around the surface center.
    pub scale: f32,
    /// Alpha multiplier in `[0, 1]`.
    pub opacity: f32,
    /// Track the pointer and let the kernel bend toward it.
    pub mouse_interactive: bool,
    /// Fixed downscale factor bypassing the area thresholds.
    pub quality_override: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: parse_hex_color("#ffffff"),
            use_custom_color: true,
            speed: 1.0,
            direction: Direction::Forward,
            scale: 1.0,
            opacity: 1.0,
            mouse_interactive: true,
            quality_override: None,
        }
    }
}

impl RenderConfig {
    /// Returns a copy with configuration errors replaced by fallbacks.
    ///
    /// A zero, negative, or non-finite scale would collapse the kernel's
    /// coordinate mapping, so it falls back to `1.0`.
    pub fn sanitized(mut self) -> Self {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            tracing::warn!(scale = self.scale, "invalid plasma scale; falling back to 1.0");
            self.scale = 1.0;
        }
        self
    }
}

/// Per-frame values assembled by the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Allocated render-target size in device pixels.
    pub resolution: (u32, u32),
    /// Phase for this frame.
    pub time: f32,
    /// Last pointer position in surface-local pixels.
    pub mouse: (f32, f32),
    /// `-1.0` for reverse evolution, `+1.0` otherwise.
    pub direction_sign: f32,
}

/// Geometry of the drawable area as reported by the host layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect anchored at the origin, as reported by a window's inner size.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    /// Whole-pixel external size, never smaller than 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (floor_pixels(self.width), floor_pixels(self.height))
    }
}

fn floor_pixels(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.floor().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

use std::path::PathBuf;

use clap::Parser;
use plasma::{Direction, GpuPowerPreference};

#[derive(Parser, Debug, Default)]
#[command(
    name = "plasmawall",
    author,
    version,
    about = "Animated plasma background rendered on the GPU"
)]
pub struct Cli {
    /// Configuration file; defaults to `plasma.toml` in the config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Tint as `#rrggbb`; malformed values fall back to warm orange.
    #[arg(long, value_name = "HEX")]
    pub color: Option<String>,

    /// Animation speed multiplier (0 freezes the pattern).
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    pub speed: Option<f32>,

    /// Time evolution: `forward`, `reverse`, or `pingpong`.
    #[arg(long, value_name = "MODE", value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// Zoom around the surface center.
    #[arg(long, value_name = "FACTOR")]
    pub scale: Option<f32>,

    /// Output alpha multiplier in [0, 1].
    #[arg(long, value_name = "ALPHA")]
    pub opacity: Option<f32>,

    /// Ignore pointer movement.
    #[arg(long)]
    pub no_mouse: bool,

    /// Fixed render downscale factor instead of the area-based policy.
    #[arg(long, value_name = "FACTOR", value_parser = parse_positive)]
    pub quality: Option<f32>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Window title.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Ask the compositor to blend the plasma over the desktop.
    #[arg(long)]
    pub transparent: bool,

    /// GPU adapter preference: `low` or `high`.
    #[arg(long, value_name = "POWER", value_parser = parse_power)]
    pub power: Option<GpuPowerPreference>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_direction(value: &str) -> Result<Direction, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("direction must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "forward" | "fwd" => Ok(Direction::Forward),
        "reverse" | "rev" | "backward" => Ok(Direction::Reverse),
        "pingpong" | "ping-pong" | "ping_pong" => Ok(Direction::PingPong),
        other => Err(format!(
            "unknown direction '{other}'; expected forward, reverse, or pingpong"
        )),
    }
}

pub fn parse_power(value: &str) -> Result<GpuPowerPreference, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" => Ok(GpuPowerPreference::Low),
        "high" | "high-performance" => Ok(GpuPowerPreference::High),
        other => Err(format!("unknown power preference '{other}'; expected low or high")),
    }
}

pub fn parse_positive(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err("value must be greater than zero".to_string())
    }
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

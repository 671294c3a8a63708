use plasma::{
    parse_hex_color, Direction, GpuPowerPreference, RenderConfig, SurfaceAlpha, WindowOptions,
};
use plasmaconfig::{DirectionSetting, PlasmaFile, PowerSetting};

use crate::cli::Cli;

/// Everything needed to open the window and mount the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub render: RenderConfig,
    pub window: WindowOptions,
}

/// Writes command-line overrides into the loaded file.
pub fn apply_cli(file: &mut PlasmaFile, args: &Cli) {
    let plasma = &mut file.plasma;
    if let Some(color) = &args.color {
        plasma.color = Some(color.clone());
    }
    if let Some(speed) = args.speed {
        plasma.speed = Some(speed);
    }
    if let Some(direction) = args.direction {
        plasma.direction = Some(direction_setting(direction));
    }
    if let Some(scale) = args.scale {
        plasma.scale = Some(scale);
    }
    if let Some(opacity) = args.opacity {
        plasma.opacity = Some(opacity);
    }
    if args.no_mouse {
        plasma.mouse_interactive = Some(false);
    }
    if let Some(quality) = args.quality {
        plasma.quality_downscale = Some(quality);
    }

    let window = &mut file.window;
    if let Some((width, height)) = args.size {
        window.width = Some(width);
        window.height = Some(height);
    }
    if let Some(title) = &args.title {
        window.title = Some(title.clone());
    }
    if let Some(fps) = args.fps {
        window.max_fps = Some(fps);
    }
    if args.transparent {
        window.transparent = Some(true);
    }
    if let Some(power) = args.power {
        window.power = Some(power_setting(power));
    }
}

/// Fills every unset value with its default.
pub fn resolve(file: &PlasmaFile) -> Settings {
    let defaults = RenderConfig::default();
    let plasma = &file.plasma;
    let render = RenderConfig {
        color: plasma
            .color
            .as_deref()
            .map(parse_hex_color)
            .unwrap_or(defaults.color),
        use_custom_color: plasma.use_custom_color.unwrap_or(defaults.use_custom_color),
        speed: plasma.speed.unwrap_or(defaults.speed),
        direction: plasma
            .direction
            .map(direction_from_setting)
            .unwrap_or(defaults.direction),
        scale: plasma.scale.unwrap_or(defaults.scale),
        opacity: plasma.opacity.unwrap_or(defaults.opacity),
        mouse_interactive: plasma.mouse_interactive.unwrap_or(defaults.mouse_interactive),
        quality_override: plasma.quality_downscale,
    };

    let window_defaults = WindowOptions::default();
    let section = &file.window;
    let window = WindowOptions {
        size: (
            section.width.unwrap_or(window_defaults.size.0),
            section.height.unwrap_or(window_defaults.size.1),
        ),
        title: section.title.clone().unwrap_or(window_defaults.title),
        alpha: if section.transparent.unwrap_or(false) {
            SurfaceAlpha::Transparent
        } else {
            SurfaceAlpha::Opaque
        },
        max_fps: section.max_fps.filter(|fps| *fps > 0.0),
        power: section
            .power
            .map(power_from_setting)
            .unwrap_or(window_defaults.power),
    };

    Settings { render, window }
}

/// Converts resolved settings back into a fully populated file.
pub fn describe(settings: &Settings) -> PlasmaFile {
    let mut file = PlasmaFile::default();
    let render = &settings.render;
    file.plasma.color = Some(render.color.to_hex());
    file.plasma.use_custom_color = Some(render.use_custom_color);
    file.plasma.speed = Some(render.speed);
    file.plasma.direction = Some(direction_setting(render.direction));
    file.plasma.scale = Some(render.scale);
    file.plasma.opacity = Some(render.opacity);
    file.plasma.mouse_interactive = Some(render.mouse_interactive);
    file.plasma.quality_downscale = render.quality_override;

    let window = &settings.window;
    file.window.width = Some(window.size.0);
    file.window.height = Some(window.size.1);
    file.window.title = Some(window.title.clone());
    file.window.transparent = Some(window.alpha == SurfaceAlpha::Transparent);
    file.window.max_fps = Some(window.max_fps.unwrap_or(0.0));
    file.window.power = Some(power_setting(window.power));
    file
}

fn direction_setting(direction: Direction) -> DirectionSetting {
    match direction {
        Direction::Forward => DirectionSetting::Forward,
        Direction::Reverse => DirectionSetting::Reverse,
        Direction::PingPong => DirectionSetting::Pingpong,
    }
}

fn direction_from_setting(setting: DirectionSetting) -> Direction {
    match setting {
        DirectionSetting::Forward => Direction::Forward,
        DirectionSetting::Reverse => Direction::Reverse,
        DirectionSetting::Pingpong => Direction::PingPong,
    }
}

fn power_setting(power: GpuPowerPreference) -> PowerSetting {
    match power {
        GpuPowerPreference::Low => PowerSetting::Low,
        GpuPowerPreference::High => PowerSetting::High,
    }
}

fn power_from_setting(setting: PowerSetting) -> GpuPowerPreference {
    match setting {
        PowerSetting::Low => GpuPowerPreference::Low,
        PowerSetting::High => GpuPowerPreference::High,
    }
}

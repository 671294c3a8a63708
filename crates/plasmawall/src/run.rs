use anyhow::{Context, Result};
use plasmaconfig::PlasmaFile;
use tracing_subscriber::EnvFilter;

use crate::bindings::{apply_cli, describe, resolve};
use crate::cli::Cli;
use crate::paths::AppPaths;

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved plasmawall paths");

    let config_path = args.config.clone().or_else(|| paths.existing_config_file());
    let mut file = match &config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading plasma configuration");
            PlasmaFile::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => {
            tracing::debug!("no configuration file found; using defaults");
            PlasmaFile::default()
        }
    };

    apply_cli(&mut file, &args);
    file.validate().context("invalid command-line override")?;
    for warning in file.warnings() {
        tracing::warn!("{warning}");
    }

    let settings = resolve(&file);

    if args.print_config {
        let rendered = describe(&settings)
            .to_toml_string()
            .context("failed to render effective configuration")?;
        print!("{rendered}");
        return Ok(());
    }

    tracing::info!(
        color = %settings.render.color.to_hex(),
        direction = %settings.render.direction,
        speed = settings.render.speed,
        width = settings.window.size.0,
        height = settings.window.size.1,
        "starting plasmawall"
    );
    plasma::run_window(settings.window, settings.render)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::types::{GpuPowerPreference, SurfaceAlpha};

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub surface_format: wgpu::TextureFormat,
    pub max_dimension: u32,
}

impl GpuContext {
    /// Creates the instance, surface, adapter and device for one drawable.
    ///
    /// The caller keeps `target` alive for as long as the returned context.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        alpha: SurfaceAlpha,
        gpu_power: GpuPowerPreference,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        // SAFETY: the session owning this context also owns the window and drops it last.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let power_preference = match gpu_power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        tracing::info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        if surface_format.is_srgb() {
            tracing::warn!(
                ?surface_format,
                "no linear (non-sRGB) surface format available; colors will look washed out"
            );
        }

        let alpha_mode = choose_alpha_mode(alpha, &surface_caps.alpha_modes);
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .or_else(|| surface_caps.present_modes.first().copied())
            .unwrap_or(wgpu::PresentMode::Fifo);
        tracing::debug!(?present_mode, ?alpha_mode, ?surface_format, "surface configuration");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("plasma device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let max_dimension = limits.max_texture_dimension_2d;
        let size = clamp_surface_size(initial_size, max_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            surface_format,
            max_dimension,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let new_size = clamp_surface_size(new_size, self.max_dimension);
        if new_size == self.size {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the surface was lost.
    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn clamp_surface_size(size: PhysicalSize<u32>, max_dimension: u32) -> PhysicalSize<u32> {
    let max_dimension = max_dimension.max(1);
    PhysicalSize::new(
        size.width.clamp(1, max_dimension),
        size.height.clamp(1, max_dimension),
    )
}

/// Premultiplied output when transparency is requested and supported,
/// otherwise opaque (the compositor sees the frame over black).
fn choose_alpha_mode(alpha: SurfaceAlpha, supported: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    let preferred = match alpha {
        SurfaceAlpha::Transparent => wgpu::CompositeAlphaMode::PreMultiplied,
        SurfaceAlpha::Opaque => wgpu::CompositeAlphaMode::Opaque,
    };
    if supported.contains(&preferred) {
        return preferred;
    }
    if alpha == SurfaceAlpha::Transparent {
        tracing::warn!(?supported, "surface cannot blend premultiplied alpha; presenting opaque");
    }
    if supported.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        supported
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_prefers_premultiplied() {
        let modes = [wgpu::CompositeAlphaMode::Opaque, wgpu::CompositeAlphaMode::PreMultiplied];
        assert_eq!(
            choose_alpha_mode(SurfaceAlpha::Transparent, &modes),
            wgpu::CompositeAlphaMode::PreMultiplied
        );
        assert_eq!(
            choose_alpha_mode(SurfaceAlpha::Opaque, &modes),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn transparent_falls_back_to_opaque() {
        let modes = [wgpu::CompositeAlphaMode::Opaque];
        assert_eq!(
            choose_alpha_mode(SurfaceAlpha::Transparent, &modes),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(
            choose_alpha_mode(SurfaceAlpha::Opaque, &[wgpu::CompositeAlphaMode::Inherit]),
            wgpu::CompositeAlphaMode::Inherit
        );
    }

    #[test]
    fn surface_size_is_clamped() {
        assert_eq!(
            clamp_surface_size(PhysicalSize::new(0, 20_000), 16_384),
            PhysicalSize::new(1, 16_384)
        );
    }
}

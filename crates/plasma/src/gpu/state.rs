use std::sync::Arc;

use tracing::{debug, trace, warn};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::compile::compile_vertex_shader;
use crate::surface::{SessionError, SurfaceSession};
use crate::types::{FrameUniforms, GpuPowerPreference, RenderConfig, SurfaceAlpha};

use super::context::GpuContext;
use super::pipeline::{KernelPipeline, UpscalePipeline};
use super::target::{clamp_size, RenderTarget};
use super::uniforms::PlasmaUniforms;

/// What a [`GpuSession`] binds to.
#[derive(Clone, Debug)]
pub struct SessionTarget {
    pub window: Arc<Window>,
    pub alpha: SurfaceAlpha,
    pub power: GpuPowerPreference,
}

struct GpuResources {
    context: GpuContext,
    kernel: KernelPipeline,
    upscale: UpscalePipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: PlasmaUniforms,
    target: RenderTarget,
    target_bind_group: wgpu::BindGroup,
}

/// wgpu-backed [`SurfaceSession`] drawing into a winit window.
pub struct GpuSession {
    // Dropped before `window` so the surface never outlives its handle.
    resources: Option<GpuResources>,
    window: Arc<Window>,
}

impl GpuSession {
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Current internal render target size, if the session is live.
    pub fn internal_size(&self) -> Option<(u32, u32)> {
        self.resources.as_ref().map(|resources| resources.target.size)
    }
}

impl SurfaceSession for GpuSession {
    type Container = SessionTarget;

    fn create(target: SessionTarget, config: &RenderConfig) -> Result<Self, SessionError> {
        let size = target.window.inner_size();
        let context = GpuContext::new(target.window.as_ref(), size, target.alpha, target.power)
            .map_err(SessionError::Context)?;
        let device = &context.device;

        let vertex_module = validated(device, "vertex", || compile_vertex_shader(device))?;
        let kernel = validated(device, "kernel", || KernelPipeline::new(device, &vertex_module))?;
        let upscale = validated(device, "upscale", || {
            UpscalePipeline::new(device, &vertex_module, context.surface_format)
        })?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plasma uniform buffer"),
            size: std::mem::size_of::<PlasmaUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plasma uniform bind group"),
            layout: &kernel.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let uniforms = PlasmaUniforms::new(config);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let render_target = RenderTarget::new(device, 1, 1, context.max_dimension);
        let target_bind_group = upscale.bind_target(device, &render_target);

        debug!(
            width = size.width,
            height = size.height,
            format = ?context.surface_format,
            "GPU session created"
        );

        Ok(Self {
            resources: Some(GpuResources {
                context,
                kernel,
                upscale,
                uniform_buffer,
                uniform_bind_group,
                uniforms,
                target: render_target,
                target_bind_group,
            }),
            window: target.window,
        })
    }

    fn set_internal_resolution(&mut self, width: u32, height: u32) -> (u32, u32) {
        let Some(resources) = self.resources.as_mut() else {
            return clamp_size(width, height, u32::MAX);
        };
        let device = &resources.context.device;
        let target = RenderTarget::new(device, width, height, resources.context.max_dimension);
        resources.target_bind_group = resources.upscale.bind_target(device, &target);
        resources.target = target;
        resources.target.size
    }

    fn set_presentation_size(&mut self, width: u32, height: u32) {
        if let Some(resources) = self.resources.as_mut() {
            resources.context.resize(PhysicalSize::new(width, height));
        }
    }

    fn render(&mut self, frame: &FrameUniforms) -> Result<(), SessionError> {
        let Some(resources) = self.resources.as_mut() else {
            return Ok(());
        };

        let surface_frame = match resources.context.surface.get_current_texture() {
            Ok(surface_frame) => surface_frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated; reconfiguring");
                resources.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(SessionError::OutOfMemory),
            Err(other) => {
                warn!(error = ?other, "surface error; retrying next frame");
                return Ok(());
            }
        };

        resources.uniforms.apply_frame(frame);
        resources.context.queue.write_buffer(
            &resources.uniform_buffer,
            0,
            bytemuck::bytes_of(&resources.uniforms),
        );

        let surface_view = surface_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = resources
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("plasma encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plasma kernel pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &resources.target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&resources.kernel.pipeline);
            pass.set_bind_group(0, &resources.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plasma upscale pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&resources.upscale.pipeline);
            pass.set_bind_group(0, &resources.target_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        resources.context.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_frame.present();
        trace!(time = frame.time, "presented frame");
        Ok(())
    }

    fn dispose(&mut self) {
        if self.resources.take().is_some() {
            debug!("GPU session disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.resources.is_none()
    }
}

/// Device side of a validation error scope.
trait ValidationScope {
    fn push_validation(&self);
    fn pop_validation(&self) -> Option<String>;
}

impl ValidationScope for wgpu::Device {
    fn push_validation(&self) {
        self.push_error_scope(wgpu::ErrorFilter::Validation);
    }

    fn pop_validation(&self) -> Option<String> {
        pollster::block_on(self.pop_error_scope()).map(|err| err.to_string())
    }
}

/// Runs `build` inside its own validation scope so a bad program surfaces
/// as [`SessionError::Compile`] instead of reaching the uncaptured handler.
fn validated<D, T>(device: &D, stage: &'static str, build: impl FnOnce() -> T) -> Result<T, SessionError>
where
    D: ValidationScope + ?Sized,
{
    device.push_validation();
    let built = build();
    match device.pop_validation() {
        Some(message) => Err(SessionError::Compile { stage, message }),
        None => Ok(built),
    }
}

impl Drop for GpuSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct ScriptedScope {
        log: RefCell<Vec<String>>,
        failure: Option<&'static str>,
    }

    impl ValidationScope for ScriptedScope {
        fn push_validation(&self) {
            self.log.borrow_mut().push("push".into());
        }

        fn pop_validation(&self) -> Option<String> {
            self.log.borrow_mut().push("pop".into());
            self.failure.map(str::to_string)
        }
    }

    #[test]
    fn build_runs_inside_the_scope() {
        let scope = ScriptedScope::default();
        let value = validated(&scope, "vertex", || {
            scope.log.borrow_mut().push("build".into());
            7
        })
        .expect("clean scope");
        assert_eq!(value, 7);
        assert_eq!(*scope.log.borrow(), ["push", "build", "pop"]);
    }

    #[test]
    fn scope_error_becomes_compile_error_for_its_stage() {
        let scope = ScriptedScope {
            failure: Some("entry point main not found"),
            ..ScriptedScope::default()
        };
        match validated(&scope, "vertex", || ()) {
            Err(SessionError::Compile { stage, message }) => {
                assert_eq!(stage, "vertex");
                assert_eq!(message, "entry point main not found");
            }
            other => panic!("expected a compile error, got {other:?}"),
        }
    }
}

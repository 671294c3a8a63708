/// Offscreen texture the kernel renders into at the internal resolution.
pub(crate) struct RenderTarget {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl RenderTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Allocates a target, clamping each edge to `[1, max_dimension]`.
    pub fn new(device: &wgpu::Device, width: u32, height: u32, max_dimension: u32) -> Self {
        let size = clamp_size(width, height, max_dimension);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("plasma render target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
            size,
        }
    }
}

pub(crate) fn clamp_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (width.clamp(1, max_dimension), height.clamp(1, max_dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_device_limit_and_minimum() {
        assert_eq!(clamp_size(0, 9000, 8192), (1, 8192));
        assert_eq!(clamp_size(1010, 568, 8192), (1010, 568));
    }
}

use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::loader::DecodedSlide;

use super::context::SurfaceColorSpace;

/// GPU copy of one slide image plus the sampler used to read it.
pub(crate) struct SlideTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub native_size: [u32; 2],
}

impl SlideTexture {
    pub(crate) fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slide: &DecodedSlide,
        color_space: SurfaceColorSpace,
    ) -> Self {
        let label = format!("slide texture #{}", slide.index);
        Self::from_rgba(
            device,
            queue,
            &label,
            [slide.width, slide.height],
            &slide.rgba,
            color_space,
        )
    }

    /// Opaque black 1x1 texture bound while no slide is resident.
    pub(crate) fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_space: SurfaceColorSpace,
    ) -> Self {
        Self::from_rgba(
            device,
            queue,
            "slide placeholder",
            [1, 1],
            &[0, 0, 0, 255],
            color_space,
        )
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        size: [u32; 2],
        rgba: &[u8],
        color_space: SurfaceColorSpace,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size[0],
                    height: size[1],
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: color_space.texture_format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            _texture: texture,
            view,
            sampler,
            native_size: size,
        }
    }
}

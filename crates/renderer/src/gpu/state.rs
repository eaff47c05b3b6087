use std::time::{Duration, Instant};

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use sequencer::{FrameParams, TextureSlots};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::ShaderLibrary;
use crate::deps::GpuBackend;
use crate::loader::{DecodedSlide, TextureLoadError};
use crate::types::{Antialiasing, ColorSpaceMode};

use super::context::{GpuContext, GpuContextError};
use super::pipeline::{slide_bind_group, PipelineLayouts, SlidePipeline};
use super::textures::SlideTexture;
use super::uniforms::SlideUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Slides currently bound to the texture group, `None` meaning the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundSlides {
    outgoing: Option<usize>,
    incoming: Option<usize>,
}

pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    pipeline: SlidePipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: SlideUniforms,
    textures: Vec<Option<SlideTexture>>,
    placeholder: SlideTexture,
    slide_bind_group: wgpu::BindGroup,
    bound: Option<BoundSlides>,
    multisample_target: Option<MultisampleTarget>,
    frame_count: u32,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        backend: &GpuBackend,
        shaders: &ShaderLibrary,
        target: &T,
        initial_size: PhysicalSize<u32>,
        slide_count: usize,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
    ) -> Result<Self, GpuContextError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(backend, target, initial_size, antialiasing, color_space)?;
        let device = &context.device;

        let layouts = PipelineLayouts::new(device);
        let pipeline = SlidePipeline::new(
            device,
            &layouts,
            shaders,
            context.surface_format,
            context.sample_count,
        );

        let uniforms = SlideUniforms::new(context.size.width, context.size.height);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slide uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let placeholder = SlideTexture::placeholder(device, &context.queue, context.color_space);
        let slide_bind_group = slide_bind_group(device, &layouts, &placeholder, &placeholder);

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        let mut textures = Vec::with_capacity(slide_count);
        textures.resize_with(slide_count, || None);

        Ok(Self {
            context,
            layouts,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            textures,
            placeholder,
            slide_bind_group,
            bound: None,
            multisample_target,
            frame_count: 0,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn is_resident(&self, index: usize) -> bool {
        matches!(self.textures.get(index), Some(Some(_)))
    }

    /// Moves a decoded slide onto the GPU. Images larger than the device
    /// allows are rejected instead of panicking inside wgpu.
    pub(crate) fn upload_slide(&mut self, slide: &DecodedSlide) -> Result<(), TextureLoadError> {
        let reject = |reason: String| TextureLoadError {
            index: slide.index,
            media_ref: slide.media_ref.clone(),
            reason,
        };
        if slide.index >= self.textures.len() {
            return Err(reject(format!(
                "slide index out of range ({} slides)",
                self.textures.len()
            )));
        }
        let max = self.context.device.limits().max_texture_dimension_2d;
        if slide.width == 0 || slide.height == 0 || slide.width > max || slide.height > max {
            return Err(reject(format!(
                "image is {}x{}, GPU accepts 1..={max} per side",
                slide.width, slide.height
            )));
        }

        let texture = SlideTexture::upload(
            &self.context.device,
            &self.context.queue,
            slide,
            self.context.color_space,
        );
        self.textures[slide.index] = Some(texture);
        // A slot may already point at this index while showing the placeholder.
        self.bound = None;
        debug!(
            slide = slide.index,
            width = slide.width,
            height = slide.height,
            "slide texture uploaded"
        );
        Ok(())
    }

    /// Points the texture group at the slides in `slots`. Rebuilds the bind
    /// group only when the pairing changes.
    pub(crate) fn bind_slides(&mut self, slots: TextureSlots) {
        let resident = |index: usize| self.is_resident(index).then_some(index);
        let wanted = BoundSlides {
            outgoing: resident(slots.texture1),
            incoming: resident(slots.texture2),
        };
        if self.bound == Some(wanted) {
            return;
        }

        let (group, sizes) = {
            let outgoing = self.texture_or_placeholder(wanted.outgoing);
            let incoming = self.texture_or_placeholder(wanted.incoming);
            (
                slide_bind_group(&self.context.device, &self.layouts, outgoing, incoming),
                (outgoing.native_size, incoming.native_size),
            )
        };
        self.slide_bind_group = group;
        self.uniforms.set_texture_sizes(sizes.0, sizes.1);
        self.bound = Some(wanted);
    }

    fn texture_or_placeholder(&self, index: Option<usize>) -> &SlideTexture {
        index
            .and_then(|index| self.textures.get(index))
            .and_then(Option::as_ref)
            .unwrap_or(&self.placeholder)
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.uniforms
            .set_resolution(new_size.width as f32, new_size.height as f32);
        if self.context.sample_count > 1 {
            self.multisample_target = Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            ));
        }
    }

    pub(crate) fn render(
        &mut self,
        params: &FrameParams,
        hovered_marker: Option<usize>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let now = Instant::now();
        self.frame_count = self.frame_count.wrapping_add(1);
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                progress = params.transition.progress,
                "render stats"
            );
        }

        self.bind_slides(params.transition.slots);
        self.uniforms.apply_frame(params, hovered_marker);
        self.uniforms.set_resolution(
            self.context.size.width as f32,
            self.context.size.height as f32,
        );
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("slide pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.slide_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

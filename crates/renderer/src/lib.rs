//! Renderer crate for heroslide.
//!
//! Glues the winit window, the `wgpu` slide pipeline and the GPU-free
//! [`sequencer`] engine together. The overall flow is:
//!
//! ```text
//!   CLI / heroslide
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ EngineContext (gpu, shaders) ──▶ TextureLoader threads
//!          │                                                  │ DecodedSlide
//!          ▼                                                  ▼
//!   winit event loop ──▶ SlideEngine::frame() ──▶ GpuState::render() ─▶ UBO + draw
//! ```
//!
//! `GpuState` owns every GPU resource (surface, device, pipeline, slide
//! textures), the engine owns timing and input state, and the window loop
//! only routes events between them.

mod compile;
mod deps;
mod gpu;
mod loader;
mod markers;
mod runtime;
mod text;
mod types;
mod window;

use anyhow::Result;

pub use compile::{validate_glsl, ShaderError, ShaderLibrary};
pub use deps::{DependencyLoadError, DependencySlot, EngineContext, GpuBackend};
pub use gpu::{cover_fit_scale, cover_uv, GpuContextError, SlideUniforms};
pub use loader::{decode_slide, DecodedSlide, SlideLoadResult, TextureLoadError, TextureLoader};
pub use markers::MarkerLayout;
pub use runtime::FramePacer;
pub use text::{compose_caption, TitleTextSurface};
pub use types::{AdapterProfile, Antialiasing, ColorSpaceMode, RendererConfig};

/// Entry point that owns the configuration and drives the window loop.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the hero window and blocks until it closes.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            slides = self.config.slides.len(),
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            "starting hero renderer"
        );
        window::run(self.config)
    }
}

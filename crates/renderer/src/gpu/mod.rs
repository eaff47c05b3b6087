//! GPU side of the slide renderer.
//!
//! - `context` owns surface and device wiring and reconfigures the swapchain
//!   on resize.
//! - `textures` uploads decoded slides and keeps a black placeholder for
//!   slots whose image has not arrived.
//! - `pipeline` builds the single full-screen pipeline and the two-slide
//!   bind group.
//! - `uniforms` mirrors the `SlideParams` block written once per frame.
//! - `state` glues everything together behind `GpuState`.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub use context::GpuContextError;
pub(crate) use state::GpuState;
pub use uniforms::{cover_fit_scale, cover_uv, SlideUniforms};

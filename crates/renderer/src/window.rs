use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use sequencer::{Direction, SlideEngine};
use tracing::{debug, error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::deps::{EngineContext, DEFAULT_LOAD_TIMEOUT};
use crate::gpu::GpuState;
use crate::loader::{SlideLoadResult, TextureLoader};
use crate::markers::MarkerLayout;
use crate::runtime::{FramePacer, SOFTWARE_FPS_CAP};
use crate::text::TitleTextSurface;
use crate::types::RendererConfig;

/// Number of slides decoded before the window opens, enough for one transition.
const INITIAL_SLIDES: usize = 2;

struct HeroWindow {
    window: Arc<Window>,
    gpu: Option<GpuState>,
    engine: SlideEngine<TitleTextSurface>,
    loader: TextureLoader,
    pacer: FramePacer,
    layout: MarkerLayout,
    cursor: Option<PhysicalPosition<f64>>,
}

impl HeroWindow {
    fn size(&self) -> PhysicalSize<u32> {
        self.gpu
            .as_ref()
            .map_or_else(|| self.window.inner_size(), GpuState::size)
    }

    fn hovered_marker(&self, marker_count: usize) -> Option<usize> {
        let cursor = self.cursor?;
        let size = self.size();
        self.layout
            .hit_test(marker_count, [size.width, size.height], [cursor.x, cursor.y])
    }

    /// Uploads decoded slides and tells the engine they are resident.
    fn absorb(&mut self, results: Vec<SlideLoadResult>, now: Instant) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        for result in results {
            let uploaded = result.and_then(|slide| gpu.upload_slide(&slide).map(|()| slide.index));
            match uploaded {
                Ok(index) => {
                    if let Err(err) = self.engine.mark_available(index, now) {
                        debug!(slide = index, error = %err, "slide arrived after teardown");
                    }
                }
                Err(err) => warn!(
                    slide = err.index,
                    media_ref = %err.media_ref,
                    reason = %err.reason,
                    "slide unavailable; skipping"
                ),
            }
        }
    }

    fn handle_pointer_press(&mut self, now: Instant) {
        let count = self.engine.navigation().len();
        let Some(marker) = self.hovered_marker(count) else {
            return;
        };
        match self.engine.click_marker(marker, now) {
            Ok(outcome) => debug!(marker, ?outcome, "marker clicked"),
            Err(err) => debug!(marker, error = %err, "marker click ignored"),
        }
    }

    fn handle_key(&mut self, event: &KeyEvent, now: Instant) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let direction = match &event.logical_key {
            Key::Named(NamedKey::ArrowRight) | Key::Named(NamedKey::Space) => Direction::Next,
            Key::Named(NamedKey::ArrowLeft) => Direction::Previous,
            _ => return,
        };
        match self.engine.step(direction, now) {
            Ok(outcome) => debug!(?direction, ?outcome, "keyboard navigation"),
            Err(err) => debug!(error = %err, "keyboard navigation ignored"),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(size);
        }
        if let Err(err) = self.engine.resize(size.width, size.height) {
            debug!(error = %err, "resize after teardown");
        }
    }

    fn redraw(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        if !self.loader.is_finished() {
            let results = self.loader.try_drain();
            if !results.is_empty() {
                self.absorb(results, now);
            }
        }

        let output = match self.engine.frame(now) {
            Ok(output) => output,
            Err(err) => {
                debug!(error = %err, "skipping frame");
                return Ok(());
            }
        };
        for event in &output.events {
            debug!(?event, "engine event");
        }
        if let Some(caption) = self.engine.surface_mut().take_caption() {
            self.window.set_title(caption);
        }

        let hovered = self.hovered_marker(output.params.markers.len());
        match self.gpu.as_mut() {
            Some(gpu) => {
                gpu.render(&output.params, hovered)?;
                self.pacer.mark_rendered(now);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn teardown(&mut self) {
        match self.engine.unmount() {
            Ok(report) => info!(
                displayed = report.displayed_index,
                interrupted = report.interrupted_transition,
                "hero torn down"
            ),
            Err(err) => debug!(error = %err, "teardown repeated"),
        }
        // Release the surface before the window goes away.
        self.gpu = None;
    }
}

pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let context = EngineContext::new(DEFAULT_LOAD_TIMEOUT);
    let backend = context.gpu()?;
    let shaders = context.shaders()?;

    let mut loader = TextureLoader::spawn(&config.slides);
    let initial = loader.wait_for_first(
        INITIAL_SLIDES.min(config.slides.len()),
        DEFAULT_LOAD_TIMEOUT,
    );
    debug!(
        initial = initial.len(),
        pending = loader.pending(),
        "initial slides decoded"
    );

    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let gpu = GpuState::new(
        &backend,
        &shaders,
        window.as_ref(),
        size,
        config.slides.len(),
        config.antialiasing,
        config.color_space,
    )
    .context("failed to initialise GPU state")?;

    let target_fps = match config.target_fps {
        Some(fps) => Some(fps),
        None if backend.profile.is_software() => {
            warn!(
                adapter = %backend.profile.name,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping frame rate (override with --fps)"
            );
            Some(SOFTWARE_FPS_CAP)
        }
        None => None,
    };

    let engine = SlideEngine::new(
        config.slides.clone(),
        config.timings,
        config.effects,
        TitleTextSurface::new(config.title.clone()),
    );
    let mut hero = HeroWindow {
        window: Arc::clone(&window),
        gpu: Some(gpu),
        engine,
        loader,
        pacer: FramePacer::new(target_fps),
        layout: MarkerLayout::default(),
        cursor: None,
    };

    let now = Instant::now();
    hero.resize(size);
    hero.absorb(initial, now);
    hero.engine.mount(now)?;
    hero.window.request_redraw();

    let mut failure: Option<anyhow::Error> = None;
    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == hero.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                hero.teardown();
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if matches!(event.logical_key, Key::Named(NamedKey::Escape))
                    && event.state == ElementState::Pressed
                {
                    hero.teardown();
                    elwt.exit();
                } else {
                    hero.handle_key(&event, Instant::now());
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                hero.cursor = Some(position);
                if let Err(err) = hero.engine.pointer_moved(position.x, position.y) {
                    debug!(error = %err, "pointer move ignored");
                }
            }
            WindowEvent::CursorEntered { .. } => {
                if let Err(err) = hero.engine.pointer_entered() {
                    debug!(error = %err, "pointer enter ignored");
                }
            }
            WindowEvent::CursorLeft { .. } => {
                hero.cursor = None;
                if let Err(err) = hero.engine.pointer_left() {
                    debug!(error = %err, "pointer leave ignored");
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => hero.handle_pointer_press(Instant::now()),
            WindowEvent::Resized(new_size) => hero.resize(new_size),
            WindowEvent::Occluded(occluded) => {
                if !occluded {
                    hero.pacer.reset();
                }
                if let Err(err) = hero.engine.set_visible(!occluded, Instant::now()) {
                    debug!(error = %err, "visibility change ignored");
                }
            }
            WindowEvent::RedrawRequested => match hero.redraw(Instant::now()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = hero.size();
                    hero.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("surface out of memory; exiting");
                    failure = Some(anyhow!("surface out of memory"));
                    hero.teardown();
                    elwt.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    debug!("surface timeout; retrying next frame");
                }
                Err(other) => {
                    warn!(error = ?other, "surface error; retrying next frame");
                }
            },
            _ => {}
        },
        Event::AboutToWait => {
            if !hero.engine.is_running() {
                return;
            }
            let now = Instant::now();
            if hero.pacer.ready(now) {
                hero.window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = hero.pacer.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))?;
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

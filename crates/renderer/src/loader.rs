use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use image::imageops::flip_vertical_in_place;
use sequencer::Slide;

/// Pixels of one slide, decoded to RGBA8 with the bottom row first.
#[derive(Debug, Clone)]
pub struct DecodedSlide {
    pub index: usize,
    pub media_ref: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load slide {index} from '{media_ref}': {reason}")]
pub struct TextureLoadError {
    pub index: usize,
    pub media_ref: String,
    pub reason: String,
}

pub type SlideLoadResult = Result<DecodedSlide, TextureLoadError>;

/// Decodes every slide image on its own thread and reports results as they land.
pub struct TextureLoader {
    results: Receiver<SlideLoadResult>,
    pending: usize,
}

impl TextureLoader {
    pub fn spawn(slides: &[Slide]) -> Self {
        let (tx, rx) = unbounded();
        for (index, slide) in slides.iter().enumerate() {
            spawn_decode(index, slide.media_ref.clone(), tx.clone());
        }
        Self {
            results: rx,
            pending: slides.len(),
        }
    }

    /// Slides that have not reported yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_finished(&self) -> bool {
        self.pending == 0
    }

    /// Collects whatever has finished without blocking.
    pub fn try_drain(&mut self) -> Vec<SlideLoadResult> {
        let drained: Vec<_> = self.results.try_iter().collect();
        self.pending = self.pending.saturating_sub(drained.len());
        drained
    }

    /// Blocks until `wanted` slides decoded successfully, every slide has
    /// reported, or `timeout` elapses.
    pub fn wait_for_first(&mut self, wanted: usize, timeout: Duration) -> Vec<SlideLoadResult> {
        let deadline = Instant::now() + timeout;
        let mut collected = Vec::new();
        let mut successes = 0;
        while self.pending > 0 && successes < wanted {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(result) => {
                    self.pending -= 1;
                    if result.is_ok() {
                        successes += 1;
                    }
                    collected.push(result);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        pending = self.pending,
                        "timed out waiting for initial slides"
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.pending = 0;
                    break;
                }
            }
        }
        collected
    }
}

fn spawn_decode(index: usize, media_ref: String, tx: Sender<SlideLoadResult>) {
    let fallback_tx = tx.clone();
    let fallback_ref = media_ref.clone();
    let spawned = thread::Builder::new()
        .name(format!("decode-slide-{index}"))
        .spawn(move || {
            let _ = tx.send(decode_slide(index, &media_ref));
        });
    if let Err(err) = spawned {
        let _ = fallback_tx.send(Err(TextureLoadError {
            index,
            media_ref: fallback_ref,
            reason: format!("failed to spawn decode thread: {err}"),
        }));
    }
}

pub fn decode_slide(index: usize, media_ref: &str) -> SlideLoadResult {
    let image = image::open(Path::new(media_ref)).map_err(|err| TextureLoadError {
        index,
        media_ref: media_ref.to_owned(),
        reason: err.to_string(),
    })?;
    let mut rgba = image.to_rgba8();
    flip_vertical_in_place(&mut rgba);
    let (width, height) = rgba.dimensions();
    tracing::debug!(slide = index, media_ref, width, height, "slide decoded");
    Ok(DecodedSlide {
        index,
        media_ref: media_ref.to_owned(),
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

//! Title-bar presentation of the slide text block.
//!
//! The window caption stands in for the overlay text: glyphs of the title
//! appear as their staggered reveal passes the halfway mark, and the
//! description follows the block opacity.

use sequencer::{TextFrame, TextPhase, TextSurface};

const REVEAL_THRESHOLD: f32 = 0.5;

#[derive(Debug, Default)]
pub struct TitleTextSurface {
    prefix: String,
    title: String,
    description: String,
    caption: String,
    dirty: bool,
}

impl TitleTextSurface {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            caption: prefix.clone(),
            prefix,
            dirty: true,
            ..Self::default()
        }
    }

    /// Returns the caption if it changed since the last call.
    pub fn take_caption(&mut self) -> Option<&str> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.caption)
    }
}

impl TextSurface for TitleTextSurface {
    fn set_content(&mut self, title: &str, description: &str) {
        self.title = title.to_owned();
        self.description = description.to_owned();
    }

    fn present(&mut self, frame: &TextFrame) {
        let caption = compose_caption(&self.prefix, &self.title, &self.description, frame);
        if caption != self.caption {
            tracing::trace!(phase = ?frame.phase, opacity = frame.opacity, %caption, "caption");
            self.caption = caption;
            self.dirty = true;
        }
    }
}

pub fn compose_caption(prefix: &str, title: &str, description: &str, frame: &TextFrame) -> String {
    let visible_title: String = match frame.phase {
        TextPhase::Settled => title.to_owned(),
        TextPhase::Exit if frame.opacity >= REVEAL_THRESHOLD => title.to_owned(),
        TextPhase::Exit => String::new(),
        TextPhase::Enter => title
            .chars()
            .zip(frame.glyph_opacity.iter())
            .filter(|(_, opacity)| **opacity >= REVEAL_THRESHOLD)
            .map(|(ch, _)| ch)
            .collect(),
    };
    let show_description = !description.is_empty()
        && (frame.phase == TextPhase::Settled || frame.opacity >= REVEAL_THRESHOLD);

    let mut caption = prefix.to_owned();
    if !visible_title.is_empty() {
        if !caption.is_empty() {
            caption.push_str(": ");
        }
        caption.push_str(&visible_title);
    }
    if show_description && !visible_title.is_empty() {
        caption.push_str(" · ");
        caption.push_str(description);
    }
    caption
}

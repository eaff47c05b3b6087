use crate::transition::IgnoreReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub slide: usize,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Started { target: usize },
    Ignored(IgnoreReason),
    UnknownMarker,
}

/// Maps navigation markers to the slides that can be selected.
///
/// Slides whose texture failed to load never get a marker, so marker indices
/// and slide indices diverge once a slide is missing.
#[derive(Debug, Clone, Default)]
pub struct NavigationIndicator {
    slides: Vec<usize>,
}

impl NavigationIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, available: impl IntoIterator<Item = usize>) {
        self.slides = available.into_iter().collect();
        self.slides.sort_unstable();
        self.slides.dedup();
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide_for(&self, marker: usize) -> Option<usize> {
        self.slides.get(marker).copied()
    }

    pub fn marker_for(&self, slide: usize) -> Option<usize> {
        self.slides.iter().position(|candidate| *candidate == slide)
    }

    /// Exactly one marker is active when `displayed` is selectable.
    pub fn markers(&self, displayed: usize) -> Vec<Marker> {
        self.slides
            .iter()
            .map(|slide| Marker {
                slide: *slide,
                active: *slide == displayed,
            })
            .collect()
    }
}

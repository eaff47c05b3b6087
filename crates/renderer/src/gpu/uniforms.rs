use bytemuck::{Pod, Zeroable};
use sequencer::FrameParams;

use crate::markers::MarkerLayout;

/// CPU mirror of the `SlideParams` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SlideUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub texture1_size: [f32; 2],
    pub texture2_size: [f32; 2],
    pub progress: f32,
    pub zoom1: f32,
    pub zoom2: f32,
    pub grain: f32,
    pub brightness: f32,
    pub time: f32,
    pub activity: f32,
    pub marker_count: f32,
    pub active_marker: f32,
    pub hovered_marker: f32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub wave_speed: f32,
    pub ripple_radius: f32,
    pub ripple_frequency: f32,
    pub ripple_speed: f32,
    pub ripple_strength: f32,
    pub marker_radius: f32,
    pub marker_spacing: f32,
    pub marker_margin: f32,
}

impl SlideUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let layout = MarkerLayout::default();
        Self {
            resolution: [width as f32, height as f32],
            pointer: [0.5, 0.5],
            texture1_size: [1.0, 1.0],
            texture2_size: [1.0, 1.0],
            zoom1: 1.0,
            zoom2: 1.0,
            brightness: 1.0,
            active_marker: -1.0,
            hovered_marker: -1.0,
            marker_radius: layout.radius,
            marker_spacing: layout.spacing,
            marker_margin: layout.bottom_margin,
            ..Self::zeroed()
        }
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height];
    }

    pub fn set_texture_sizes(&mut self, texture1: [u32; 2], texture2: [u32; 2]) {
        self.texture1_size = [texture1[0] as f32, texture1[1] as f32];
        self.texture2_size = [texture2[0] as f32, texture2[1] as f32];
    }

    /// Copies the per-frame engine output. `hovered` is a marker index.
    pub fn apply_frame(&mut self, params: &FrameParams, hovered: Option<usize>) {
        let transition = &params.transition;
        self.pointer = params.pointer.position;
        self.activity = params.pointer.smoothed_activity;
        self.time = params.time;
        self.progress = transition.progress;
        self.zoom1 = transition.zoom1;
        self.zoom2 = transition.zoom2;
        self.grain = transition.grain;
        self.brightness = transition.brightness;

        self.marker_count = params.markers.len() as f32;
        self.active_marker = params
            .markers
            .iter()
            .position(|marker| marker.active)
            .map_or(-1.0, |index| index as f32);
        self.hovered_marker = hovered.map_or(-1.0, |index| index as f32);

        let effects = &params.effects;
        self.wave_amplitude = effects.wave_amplitude;
        self.wave_frequency = effects.wave_frequency;
        self.wave_speed = effects.wave_speed;
        self.ripple_radius = effects.ripple_radius;
        self.ripple_frequency = effects.ripple_frequency;
        self.ripple_speed = effects.ripple_speed;
        self.ripple_strength = effects.ripple_strength;
    }
}

/// Scale applied to a texture so it covers the surface, mirroring `coverUv`.
pub fn cover_fit_scale(resolution: [f32; 2], texture: [f32; 2], zoom: f32) -> f32 {
    let res = [resolution[0].max(1.0), resolution[1].max(1.0)];
    let tex = [texture[0].max(1.0), texture[1].max(1.0)];
    (res[0] / tex[0]).max(res[1] / tex[1]) * zoom
}

/// Maps a surface UV to texture UV the way the fragment shader does.
pub fn cover_uv(uv: [f32; 2], resolution: [f32; 2], texture: [f32; 2], zoom: f32) -> [f32; 2] {
    let scale = cover_fit_scale(resolution, texture, zoom);
    let res = [resolution[0].max(1.0), resolution[1].max(1.0)];
    let tex = [texture[0].max(1.0), texture[1].max(1.0)];
    [
        (uv[0] - 0.5) * res[0] / (tex[0] * scale) + 0.5,
        (uv[1] - 0.5) * res[1] / (tex[1] * scale) + 0.5,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_struct_matches_std140_block_size() {
        assert_eq!(std::mem::size_of::<SlideUniforms>(), 112);
        assert_eq!(std::mem::size_of::<SlideUniforms>() % 16, 0);
    }

    #[test]
    fn cover_fit_fills_wider_surface() {
        let scale = cover_fit_scale([800.0, 600.0], [1600.0, 900.0], 1.0);
        assert!((scale - 0.6667).abs() < 1e-3);

        let center = cover_uv([0.5, 0.5], [800.0, 600.0], [1600.0, 900.0], 1.0);
        assert!((center[0] - 0.5).abs() < 1e-6);
        assert!((center[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn cover_fit_crops_the_overflowing_axis_only() {
        let left = cover_uv([0.0, 0.0], [800.0, 600.0], [1600.0, 900.0], 1.0);
        assert!(left[0] > 0.0, "horizontal overflow is cropped");
        assert!(left[1].abs() < 1e-5, "vertical axis fits exactly");
    }

    #[test]
    fn zoom_shrinks_visible_region() {
        let edge = cover_uv([1.0, 1.0], [1000.0, 1000.0], [1000.0, 1000.0], 2.0);
        assert!((edge[0] - 0.75).abs() < 1e-6);
        assert!((edge[1] - 0.75).abs() < 1e-6);
    }
}

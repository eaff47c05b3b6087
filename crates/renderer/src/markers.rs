//! Geometry of the navigation markers drawn along the bottom edge.
//!
//! The shader draws the same layout from the uniform values, so hit testing
//! here lines up with what is on screen.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLayout {
    pub radius: f32,
    pub spacing: f32,
    pub bottom_margin: f32,
    pub hit_radius: f32,
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            radius: 6.0,
            spacing: 24.0,
            bottom_margin: 36.0,
            hit_radius: 12.0,
        }
    }
}

impl MarkerLayout {
    /// Marker centres in window pixels with a top-left origin.
    pub fn centers(&self, count: usize, size: [u32; 2]) -> Vec<[f32; 2]> {
        if count == 0 {
            return Vec::new();
        }
        let width = size[0] as f32;
        let height = size[1] as f32;
        let first_x = width * 0.5 - (count as f32 - 1.0) * 0.5 * self.spacing;
        let y = height - self.bottom_margin;
        (0..count)
            .map(|index| [first_x + index as f32 * self.spacing, y])
            .collect()
    }

    pub fn hit_test(&self, count: usize, size: [u32; 2], position: [f64; 2]) -> Option<usize> {
        let px = position[0] as f32;
        let py = position[1] as f32;
        self.centers(count, size)
            .into_iter()
            .enumerate()
            .map(|(index, [cx, cy])| (index, (px - cx).hypot(py - cy)))
            .filter(|(_, dist)| *dist <= self.hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_centred_horizontally() {
        let layout = MarkerLayout::default();
        let centers = layout.centers(3, [800, 600]);
        assert_eq!(centers, vec![[376.0, 564.0], [400.0, 564.0], [424.0, 564.0]]);
    }

    #[test]
    fn hit_test_picks_nearest_marker() {
        let layout = MarkerLayout::default();
        assert_eq!(layout.hit_test(3, [800, 600], [425.0, 560.0]), Some(2));
        assert_eq!(layout.hit_test(3, [800, 600], [386.0, 564.0]), Some(0));
        assert_eq!(layout.hit_test(3, [800, 600], [400.0, 300.0]), None);
        assert_eq!(layout.hit_test(0, [800, 600], [400.0, 564.0]), None);
    }
}

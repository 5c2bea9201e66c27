//! Axis-aware footprint math: interval overlap and slice resizing.
//!
//! Everything here is pure. Only the active horizontal axis is ever looked at;
//! the cross axis and the vertical component pass through untouched.

use glam::Vec3;

/// Horizontal axis a block moves along and is trimmed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    /// World X.
    #[default]
    Horizontal,
    /// World Z.
    Depth,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Depth,
            Self::Depth => Self::Horizontal,
        }
    }

    /// Component of `v` along this axis.
    #[inline]
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Self::Horizontal => v.x,
            Self::Depth => v.z,
        }
    }

    #[inline]
    pub fn set_component(self, v: &mut Vec3, value: f32) {
        match self {
            Self::Horizontal => v.x = value,
            Self::Depth => v.z = value,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Horizontal => "X",
            Self::Depth => "Z",
        }
    }
}

/// Horizontal extent of a block: `width` along X, `depth` along Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    #[inline]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Depth => self.depth,
        }
    }

    #[inline]
    pub fn set_along(&mut self, axis: Axis, size: f32) {
        match axis {
            Axis::Horizontal => self.width = size,
            Axis::Depth => self.depth = size,
        }
    }
}

/// Closed 1D interval `[left, right]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    pub fn centered(center: f32, size: f32) -> Self {
        let half = size * 0.5;
        Self {
            left: center - half,
            right: center + half,
        }
    }

    /// Signed length of the intersection; negative when the spans are apart.
    #[inline]
    pub fn intersection(self, other: Self) -> f32 {
        self.right.min(other.right) - self.left.max(other.left)
    }
}

/// Position plus footprint: the part of a block geometry cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    pub position: Vec3,
    pub footprint: Footprint,
}

impl Slab {
    pub fn new(position: Vec3, footprint: Footprint) -> Self {
        Self { position, footprint }
    }

    /// Projection of this slab onto `axis`.
    pub fn span(&self, axis: Axis) -> Span {
        Span::centered(axis.component(self.position), self.footprint.along(axis))
    }
}

/// Signed overlap of `current` and `previous` along `axis`.
///
/// `<= 0` means the slabs miss each other entirely.
pub fn overlap(current: &Slab, previous: &Slab, axis: Axis) -> f32 {
    current.span(axis).intersection(previous.span(axis))
}

/// Trim `slab` to `overlap` on `axis` and pin its center to `reference` on that axis.
pub fn resize(slab: &mut Slab, overlap: f32, reference: Vec3, axis: Axis) {
    slab.footprint.set_along(axis, overlap);
    axis.set_component(&mut slab.position, axis.component(reference));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slab_at(x: f32, width: f32) -> Slab {
        Slab::new(Vec3::new(x, 0.0, 0.0), Footprint::new(width, 3.0))
    }

    #[test]
    fn centered_equal_slabs_fully_overlap() {
        let a = slab_at(0.0, 3.0);
        let b = slab_at(0.0, 3.0);
        assert_eq!(overlap(&a, &b, Axis::Horizontal), 3.0);
    }

    #[test]
    fn offset_reduces_overlap() {
        let falling = slab_at(1.0, 3.0);
        let below = slab_at(0.0, 3.0);
        assert_eq!(overlap(&falling, &below, Axis::Horizontal), 2.0);
    }

    #[test]
    fn full_miss_is_negative() {
        let falling = slab_at(1.0, 0.6);
        let below = slab_at(0.0, 0.6);
        let o = overlap(&falling, &below, Axis::Horizontal);
        assert!((o - (-0.4)).abs() < 1e-6, "overlap {o}");
    }

    #[test]
    fn overlap_ignores_cross_axis() {
        let a = Slab::new(Vec3::new(0.0, 0.0, 5.0), Footprint::new(3.0, 1.0));
        let b = Slab::new(Vec3::new(0.0, 2.0, -5.0), Footprint::new(3.0, 1.0));
        assert_eq!(overlap(&a, &b, Axis::Horizontal), 3.0);
        assert!(overlap(&a, &b, Axis::Depth) < 0.0);
    }

    #[test]
    fn resize_pins_to_reference_center() {
        let mut falling = Slab::new(Vec3::new(1.0, 0.5, 0.25), Footprint::new(3.0, 2.0));
        resize(&mut falling, 2.0, Vec3::new(0.0, 0.0, 0.0), Axis::Horizontal);
        assert_eq!(falling.footprint, Footprint::new(2.0, 2.0));
        assert_eq!(falling.position, Vec3::new(0.0, 0.5, 0.25));
    }

    #[test]
    fn resize_depth_leaves_width_alone() {
        let mut falling = Slab::new(Vec3::new(0.3, 1.0, -0.7), Footprint::new(2.5, 3.0));
        resize(&mut falling, 2.3, Vec3::new(9.0, 9.0, 0.0), Axis::Depth);
        assert_eq!(falling.footprint, Footprint::new(2.5, 2.3));
        assert_eq!(falling.position, Vec3::new(0.3, 1.0, 0.0));
    }

    #[test]
    fn axis_other_round_trips() {
        assert_eq!(Axis::Horizontal.other(), Axis::Depth);
        assert_eq!(Axis::Horizontal.other().other(), Axis::Horizontal);
    }

    fn axis() -> impl Strategy<Value = Axis> {
        prop_oneof![Just(Axis::Horizontal), Just(Axis::Depth)]
    }

    fn slab() -> impl Strategy<Value = Slab> {
        (-5.0f32..5.0, -5.0f32..5.0, 0.1f32..4.0, 0.1f32..4.0).prop_map(|(x, z, w, d)| {
            Slab::new(Vec3::new(x, 0.0, z), Footprint::new(w, d))
        })
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in slab(), b in slab(), axis in axis()) {
            prop_assert_eq!(overlap(&a, &b, axis), overlap(&b, &a, axis));
        }

        #[test]
        fn positive_overlap_never_exceeds_either_size(a in slab(), b in slab(), axis in axis()) {
            let o = overlap(&a, &b, axis);
            prop_assume!(o > 0.0);
            let mut trimmed = a;
            resize(&mut trimmed, o, b.position, axis);
            let size = trimmed.footprint.along(axis);
            prop_assert!(size <= a.footprint.along(axis) + 1e-5);
            prop_assert!(size <= b.footprint.along(axis) + 1e-5);
            prop_assert_eq!(trimmed.footprint.along(axis.other()), a.footprint.along(axis.other()));
        }
    }
}

//! Axis-aligned bounding boxes for placed items.

use nalgebra::{RealField, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AABB3D<S> {
    /// Minimum x coordinate.
    pub min_x: S,
    /// Minimum y coordinate.
    pub min_y: S,
    /// Minimum z coordinate.
    pub min_z: S,
    /// Maximum x coordinate.
    pub max_x: S,
    /// Maximum y coordinate.
    pub max_y: S,
    /// Maximum z coordinate.
    pub max_z: S,
}

impl<S: RealField + Copy> AABB3D<S> {
    /// Creates a new AABB from min/max coordinates.
    pub fn new(min_x: S, min_y: S, min_z: S, max_x: S, max_y: S, max_z: S) -> Self {
        Self {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }

    /// Creates an AABB from its min corner and its extents.
    pub fn from_corner(corner: &Vector3<S>, size: &Vector3<S>) -> Self {
        let max = corner + size;
        Self::new(corner.x, corner.y, corner.z, max.x, max.y, max.z)
    }

    /// Returns the extent along x.
    pub fn length(&self) -> S {
        self.max_x - self.min_x
    }

    /// Returns the extent along y.
    pub fn width(&self) -> S {
        self.max_y - self.min_y
    }

    /// Returns the extent along z.
    pub fn height(&self) -> S {
        self.max_z - self.min_z
    }

    /// Returns the volume of the AABB.
    pub fn volume(&self) -> S {
        self.length() * self.width() * self.height()
    }

    /// Returns the base area.
    pub fn base_area(&self) -> S {
        self.length() * self.width()
    }

    /// Checks whether the interiors of two boxes intersect.
    ///
    /// Boxes that only share a face, edge or corner do not overlap.
    pub fn overlaps(&self, other: &Self, epsilon: S) -> bool {
        self.min_x < other.max_x - epsilon
            && other.min_x < self.max_x - epsilon
            && self.min_y < other.max_y - epsilon
            && other.min_y < self.max_y - epsilon
            && self.min_z < other.max_z - epsilon
            && other.min_z < self.max_z - epsilon
    }

    /// Checks whether `inner`'s footprint lies within this box's footprint.
    pub fn footprint_contains(&self, inner: &Self, epsilon: S) -> bool {
        inner.min_x >= self.min_x - epsilon
            && inner.max_x <= self.max_x + epsilon
            && inner.min_y >= self.min_y - epsilon
            && inner.max_y <= self.max_y + epsilon
    }

    /// Checks whether this box lies within `[0, length] × [0, width] × [0, height]`.
    pub fn within(&self, length: S, width: S, height: S, epsilon: S) -> bool {
        self.min_x >= -epsilon
            && self.min_y >= -epsilon
            && self.min_z >= -epsilon
            && self.max_x <= length + epsilon
            && self.max_y <= width + epsilon
            && self.max_z <= height + epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb3d_volume() {
        let aabb = AABB3D::new(0.0, 0.0, 0.0, 10.0, 20.0, 30.0);
        assert_relative_eq!(aabb.volume(), 6000.0);
        assert_relative_eq!(aabb.base_area(), 200.0);
    }

    #[test]
    fn test_from_corner() {
        let aabb = AABB3D::from_corner(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(aabb.max_x, 2.0);
        assert_relative_eq!(aabb.max_y, 3.0);
        assert_relative_eq!(aabb.max_z, 4.0);
    }

    #[test]
    fn test_touching_faces_do_not_overlap() {
        let a = AABB3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b = AABB3D::new(1.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let above = AABB3D::new(0.0, 0.0, 1.0, 1.0, 1.0, 2.0);
        assert!(!a.overlaps(&b, 1e-9));
        assert!(!a.overlaps(&above, 1e-9));
    }

    #[test]
    fn test_overlap() {
        let a = AABB3D::new(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let b = AABB3D::new(5.0, 5.0, 5.0, 15.0, 15.0, 15.0);
        let c = AABB3D::new(10.0, 10.0, 10.0, 20.0, 20.0, 20.0);
        assert!(a.overlaps(&b, 1e-9));
        assert!(b.overlaps(&a, 1e-9));
        assert!(!a.overlaps(&c, 1e-9));
    }

    #[test]
    fn test_footprint_contains() {
        let lower = AABB3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 0.5);
        let upper = AABB3D::new(0.2, 0.2, 0.5, 0.8, 1.0, 0.9);
        let overhang = AABB3D::new(0.5, 0.5, 0.5, 1.5, 1.0, 0.9);
        assert!(lower.footprint_contains(&upper, 1e-9));
        assert!(!lower.footprint_contains(&overhang, 1e-9));
    }

    #[test]
    fn test_within() {
        let a = AABB3D::new(0.0, 0.0, 0.0, 1.2, 1.0, 1.8);
        assert!(a.within(1.2, 1.0, 1.8, 1e-9));
        assert!(!a.within(1.0, 1.0, 1.8, 1e-9));
    }
}

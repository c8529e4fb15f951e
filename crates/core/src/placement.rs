//! Placement representation for positioned items.

use crate::geometry::{CarrierId, Dimensions, ItemId, Orientation};
use crate::transform::AABB3D;
use nalgebra::Vector3;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the placement of an item on a carrier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// The placed item.
    pub item: ItemId,

    /// The carrier the item is loaded on.
    pub carrier: CarrierId,

    /// The chosen orientation.
    pub orientation: Orientation,

    /// Min corner of the oriented box, relative to the carrier's origin.
    pub position: Vector3<f64>,

    /// Oriented dimensions (after applying `orientation`).
    pub dimensions: Dimensions,

    /// The item this one rests on, or `None` for the carrier floor.
    pub supported_by: Option<ItemId>,
}

impl Placement {
    /// Creates a new placement resting on the carrier floor.
    pub fn new(
        item: ItemId,
        carrier: CarrierId,
        orientation: Orientation,
        position: Vector3<f64>,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            item,
            carrier,
            orientation,
            position,
            dimensions,
            supported_by: None,
        }
    }

    /// Sets the supporting item.
    pub fn with_support(mut self, support: Option<ItemId>) -> Self {
        self.supported_by = support;
        self
    }

    /// Returns the x coordinate.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Returns the y coordinate.
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Returns the z coordinate.
    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Returns the z coordinate of the top face.
    pub fn top(&self) -> f64 {
        self.position.z + self.dimensions.height
    }

    /// Returns true if the item rests on the carrier floor.
    pub fn is_on_floor(&self) -> bool {
        self.supported_by.is_none()
    }

    /// Returns the oriented bounding box at the placed position.
    pub fn aabb(&self) -> AABB3D<f64> {
        AABB3D::from_corner(
            &self.position,
            &Vector3::new(
                self.dimensions.length,
                self.dimensions.width,
                self.dimensions.height,
            ),
        )
    }
}

/// Placement statistics for a set of placements.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementStats {
    /// Total number of placements.
    pub count: usize,
    /// Number of items resting on another item.
    pub stacked_count: usize,
    /// Highest top face over all placements.
    pub max_height: f64,
    /// Distribution of orientations used.
    pub orientation_distribution: HashMap<Orientation, usize>,
    /// Distribution of placements per carrier.
    pub carrier_distribution: HashMap<CarrierId, usize>,
}

impl PlacementStats {
    /// Computes statistics from a set of placements.
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut stats = Self {
            count: placements.len(),
            ..Default::default()
        };

        for p in placements {
            if !p.is_on_floor() {
                stats.stacked_count += 1;
            }
            stats.max_height = stats.max_height.max(p.top());
            *stats
                .orientation_distribution
                .entry(p.orientation)
                .or_insert(0) += 1;
            *stats.carrier_distribution.entry(p.carrier).or_insert(0) += 1;
        }

        stats
    }
}

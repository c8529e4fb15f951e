//! Carrier (pallet) type.

use pallet_core::{CarrierId, Dimensions, Error, RecordKind, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard stacking height used by the pallet presets.
pub const PRESET_MAX_HEIGHT: f64 = 1.8;

/// A capacity-bounded load carrier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Carrier {
    /// Unique identifier.
    id: CarrierId,

    /// Maximum total mass.
    max_mass: f64,

    /// Maximum total item volume.
    max_volume: f64,

    /// Usable space: footprint length and width, maximum load height.
    space: Dimensions,
}

impl Carrier {
    /// Creates a new carrier.
    pub fn new(
        id: CarrierId,
        max_mass: f64,
        max_volume: f64,
        footprint_length: f64,
        footprint_width: f64,
        max_height: f64,
    ) -> Self {
        Self {
            id,
            max_mass,
            max_volume,
            space: Dimensions::new(footprint_length, footprint_width, max_height),
        }
    }

    /// Creates a carrier whose volume capacity is its full usable space.
    pub fn with_space(
        id: CarrierId,
        max_mass: f64,
        footprint_length: f64,
        footprint_width: f64,
        max_height: f64,
    ) -> Self {
        let volume = footprint_length * footprint_width * max_height;
        Self::new(
            id,
            max_mass,
            volume,
            footprint_length,
            footprint_width,
            max_height,
        )
    }

    /// Brazilian PBR pallet: 1.20 × 1.00 m, 1.8 m load height, 1000 kg.
    pub fn pbr(id: CarrierId) -> Self {
        Self::with_space(id, 1000.0, 1.2, 1.0, PRESET_MAX_HEIGHT)
    }

    /// Euro pallet: 1.20 × 0.80 m, 1.8 m load height, 800 kg.
    pub fn euro(id: CarrierId) -> Self {
        Self::with_space(id, 800.0, 1.2, 0.8, PRESET_MAX_HEIGHT)
    }

    /// Sets the mass capacity.
    pub fn with_max_mass(mut self, mass: f64) -> Self {
        self.max_mass = mass;
        self
    }

    /// Sets the volume capacity.
    pub fn with_max_volume(mut self, volume: f64) -> Self {
        self.max_volume = volume;
        self
    }

    /// Returns the ID.
    pub fn id(&self) -> CarrierId {
        self.id
    }

    /// Returns the mass capacity.
    pub fn max_mass(&self) -> f64 {
        self.max_mass
    }

    /// Returns the volume capacity.
    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    /// Returns the usable space as dimensions.
    pub fn space(&self) -> &Dimensions {
        &self.space
    }

    /// Returns the footprint length (x).
    pub fn footprint_length(&self) -> f64 {
        self.space.length
    }

    /// Returns the footprint width (y).
    pub fn footprint_width(&self) -> f64 {
        self.space.width
    }

    /// Returns the maximum load height (z).
    pub fn max_height(&self) -> f64 {
        self.space.height
    }

    /// Returns true if an oriented box fits inside the usable space.
    pub fn fits(&self, oriented: &Dimensions) -> bool {
        oriented.fits_within(self.space.length, self.space.width, self.space.height)
    }

    /// Returns true if both carriers are interchangeable for packing.
    pub fn same_class(&self, other: &Carrier) -> bool {
        self.max_mass == other.max_mass
            && self.max_volume == other.max_volume
            && self.space == other.space
    }

    /// Validates the carrier.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::Validation {
            kind: RecordKind::Carrier,
            id: self.id,
            reason,
        };

        if !self.space.is_valid() {
            return Err(invalid(format!(
                "footprint and height must be finite and positive, got {}x{}x{}",
                self.space.length, self.space.width, self.space.height
            )));
        }

        if !self.max_mass.is_finite() || self.max_mass <= 0.0 {
            return Err(invalid(format!(
                "maximum mass must be positive, got {}",
                self.max_mass
            )));
        }

        if !self.max_volume.is_finite() || self.max_volume <= 0.0 {
            return Err(invalid(format!(
                "maximum volume must be positive, got {}",
                self.max_volume
            )));
        }

        Ok(())
    }
}

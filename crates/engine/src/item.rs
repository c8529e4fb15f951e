//! Item type.

use pallet_core::{Dimensions, Error, ItemId, RecordKind, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A discrete item that can be loaded on a carrier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Unique identifier.
    id: ItemId,

    /// Dimensions (length, width, height).
    dimensions: Dimensions,

    /// Mass of the item.
    mass: f64,

    /// Whether nothing may rest on this item.
    fragile: bool,

    /// Whether the item may be turned into any of the six orientations.
    rotatable: bool,

    /// Priority weight (higher = more valuable to load).
    priority: u32,

    /// Destination tag, passed through unmodified.
    destination: Option<String>,

    /// Display name.
    name: Option<String>,

    /// Product category.
    category: Option<String>,
}

impl Item {
    /// Creates a new item with the given ID, dimensions and mass.
    ///
    /// The item is not fragile, rotatable, and has priority 1.
    pub fn new(id: ItemId, length: f64, width: f64, height: f64, mass: f64) -> Self {
        Self {
            id,
            dimensions: Dimensions::new(length, width, height),
            mass,
            fragile: false,
            rotatable: true,
            priority: 1,
            destination: None,
            name: None,
            category: None,
        }
    }

    /// Sets the fragile flag.
    pub fn with_fragile(mut self, fragile: bool) -> Self {
        self.fragile = fragile;
        self
    }

    /// Sets whether the item may be rotated.
    pub fn with_rotatable(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Sets the priority weight.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the destination tag.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns the ID.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the dimensions.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// Returns the mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Returns whether the item is fragile.
    pub fn is_fragile(&self) -> bool {
        self.fragile
    }

    /// Returns whether the item may be rotated.
    pub fn is_rotatable(&self) -> bool {
        self.rotatable
    }

    /// Returns the priority weight.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Returns the destination tag.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the category.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Objective contribution when loaded: priority × volume.
    pub fn value(&self) -> f64 {
        self.priority as f64 * self.volume()
    }

    /// Returns true if `self` may rest directly on `lower`.
    pub fn may_rest_on(&self, lower: &Item) -> bool {
        self.id != lower.id && !lower.fragile && self.mass <= lower.mass
    }

    /// Validates the item.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::Validation {
            kind: RecordKind::Item,
            id: self.id,
            reason,
        };

        if !self.dimensions.is_valid() {
            return Err(invalid(format!(
                "dimensions must be finite and positive, got {}x{}x{}",
                self.dimensions.length, self.dimensions.width, self.dimensions.height
            )));
        }

        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(invalid(format!("mass must be positive, got {}", self.mass)));
        }

        if self.priority == 0 {
            return Err(invalid("priority must be at least 1".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_item_volume_and_value() {
        let item = Item::new(0, 0.5, 0.3, 0.4, 20.0).with_priority(3);
        assert_relative_eq!(item.volume(), 0.06, epsilon = 1e-12);
        assert_relative_eq!(item.value(), 0.18, epsilon = 1e-12);
    }

    #[test]
    fn test_builder() {
        let item = Item::new(4, 1.0, 1.0, 1.0, 5.0)
            .with_fragile(true)
            .with_rotatable(false)
            .with_destination("Salvador")
            .with_name("Item_5")
            .with_category("Electronics");

        assert!(item.is_fragile());
        assert!(!item.is_rotatable());
        assert_eq!(item.destination(), Some("Salvador"));
        assert_eq!(item.name(), Some("Item_5"));
        assert_eq!(item.category(), Some("Electronics"));
    }

    #[test]
    fn test_may_rest_on() {
        let heavy = Item::new(0, 1.0, 1.0, 1.0, 30.0);
        let light = Item::new(1, 1.0, 1.0, 1.0, 10.0);
        let fragile = Item::new(2, 1.0, 1.0, 1.0, 50.0).with_fragile(true);

        assert!(light.may_rest_on(&heavy));
        assert!(!heavy.may_rest_on(&light));
        assert!(!light.may_rest_on(&fragile));
        assert!(!heavy.may_rest_on(&heavy));
    }

    #[test]
    fn test_validation() {
        assert!(Item::new(0, 1.0, 1.0, 1.0, 1.0).validate().is_ok());
        assert!(Item::new(1, -1.0, 1.0, 1.0, 1.0).validate().is_err());
        assert!(Item::new(2, 1.0, 1.0, 1.0, 0.0).validate().is_err());
        assert!(Item::new(3, 1.0, 1.0, 1.0, 1.0)
            .with_priority(0)
            .validate()
            .is_err());
        assert!(Item::new(4, 1.0, f64::INFINITY, 1.0, 1.0).validate().is_err());
    }
}

//! Validated item/carrier catalog and raw input records.

use crate::carrier::Carrier;
use crate::item::Item;
use pallet_core::{CarrierId, Error, ItemId, RecordKind, Result, ValidationMode};
use std::collections::{BTreeSet, HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An item record as delivered by an ingestion layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemRecord {
    /// Unique identifier.
    pub id: ItemId,
    /// Length.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Mass.
    pub mass: f64,
    /// Fragile flag.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fragile: bool,
    /// Rotatable flag.
    #[cfg_attr(feature = "serde", serde(default = "default_rotatable"))]
    pub rotatable: bool,
    /// Priority weight; must be a positive integer.
    #[cfg_attr(feature = "serde", serde(default = "default_priority"))]
    pub priority: i64,
    /// Destination tag.
    #[cfg_attr(feature = "serde", serde(default))]
    pub destination: Option<String>,
}

#[cfg(feature = "serde")]
fn default_rotatable() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_priority() -> i64 {
    1
}

impl ItemRecord {
    /// Converts the record into a validated item.
    pub fn into_item(self) -> Result<Item> {
        let priority = u32::try_from(self.priority)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| Error::Validation {
                kind: RecordKind::Item,
                id: self.id,
                reason: format!("priority must be a positive integer, got {}", self.priority),
            })?;

        let mut item = Item::new(self.id, self.length, self.width, self.height, self.mass)
            .with_fragile(self.fragile)
            .with_rotatable(self.rotatable)
            .with_priority(priority);
        if let Some(destination) = self.destination {
            item = item.with_destination(destination);
        }
        item.validate()?;
        Ok(item)
    }
}

/// A carrier record as delivered by an ingestion layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CarrierRecord {
    /// Unique identifier.
    pub id: CarrierId,
    /// Maximum total mass.
    pub max_mass: f64,
    /// Maximum total volume.
    pub max_volume: f64,
    /// Footprint length.
    pub footprint_length: f64,
    /// Footprint width.
    pub footprint_width: f64,
    /// Maximum load height.
    pub max_height: f64,
}

impl CarrierRecord {
    /// Converts the record into a validated carrier.
    pub fn into_carrier(self) -> Result<Carrier> {
        let carrier = Carrier::new(
            self.id,
            self.max_mass,
            self.max_volume,
            self.footprint_length,
            self.footprint_width,
            self.max_height,
        );
        carrier.validate()?;
        Ok(carrier)
    }
}

/// Result of ingesting raw records.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// The validated catalog.
    pub catalog: Catalog,
    /// Records rejected in lenient mode.
    pub rejected: Vec<Error>,
}

/// Aggregate figures over a catalog.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogStats {
    /// Number of items.
    pub item_count: usize,
    /// Number of carriers.
    pub carrier_count: usize,
    /// Σ item volume.
    pub total_volume: f64,
    /// Σ item mass.
    pub total_mass: f64,
    /// Number of fragile items.
    pub fragile_count: usize,
    /// Number of distinct destination tags.
    pub destination_count: usize,
}

/// Normalized, validated items and carriers.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    carriers: Vec<Carrier>,
    item_index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Builds a catalog from already-constructed items and carriers.
    ///
    /// Every item and carrier is validated; the first invalid one or a
    /// duplicate id fails the whole call.
    pub fn new(items: Vec<Item>, carriers: Vec<Carrier>) -> Result<Self> {
        for item in &items {
            item.validate()?;
        }
        for carrier in &carriers {
            carrier.validate()?;
        }
        check_unique(RecordKind::Item, items.iter().map(Item::id))?;
        check_unique(RecordKind::Carrier, carriers.iter().map(Carrier::id))?;
        Self::assemble(items, carriers)
    }

    /// Validates raw records and builds a catalog from the accepted ones.
    ///
    /// In [`ValidationMode::Lenient`] each malformed record is excluded and
    /// returned in [`Ingested::rejected`]; in [`ValidationMode::Strict`] the
    /// first malformed record fails the batch.
    pub fn ingest(
        item_records: Vec<ItemRecord>,
        carrier_records: Vec<CarrierRecord>,
        mode: ValidationMode,
    ) -> Result<Ingested> {
        let mut rejected = Vec::new();

        let mut items = Vec::with_capacity(item_records.len());
        let mut seen_items = HashSet::new();
        for record in item_records {
            let id = record.id;
            let outcome = if seen_items.insert(id) {
                record.into_item()
            } else {
                Err(duplicate(RecordKind::Item, id))
            };
            match outcome {
                Ok(item) => items.push(item),
                Err(e) => reject(e, mode, &mut rejected)?,
            }
        }

        let mut carriers = Vec::with_capacity(carrier_records.len());
        let mut seen_carriers = HashSet::new();
        for record in carrier_records {
            let id = record.id;
            let outcome = if seen_carriers.insert(id) {
                record.into_carrier()
            } else {
                Err(duplicate(RecordKind::Carrier, id))
            };
            match outcome {
                Ok(carrier) => carriers.push(carrier),
                Err(e) => reject(e, mode, &mut rejected)?,
            }
        }

        let catalog = Self::assemble(items, carriers)?;
        Ok(Ingested { catalog, rejected })
    }

    fn assemble(items: Vec<Item>, carriers: Vec<Carrier>) -> Result<Self> {
        if carriers.is_empty() {
            return Err(Error::InfeasibleInput("catalog has no valid carriers".into()));
        }
        if items.is_empty() {
            return Err(Error::InfeasibleInput("catalog has no valid items".into()));
        }

        let item_index = items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id(), idx))
            .collect();

        Ok(Self {
            items,
            carriers,
            item_index,
        })
    }

    /// Returns the items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the carriers in input order.
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Looks up an item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.item_index.get(&id).map(|&idx| &self.items[idx])
    }

    /// Returns the position of an item in [`Catalog::items`].
    pub fn item_index(&self, id: ItemId) -> Option<usize> {
        self.item_index.get(&id).copied()
    }

    /// Looks up a carrier by id.
    pub fn carrier(&self, id: CarrierId) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.id() == id)
    }

    /// Computes aggregate figures.
    pub fn stats(&self) -> CatalogStats {
        let destinations: BTreeSet<&str> =
            self.items.iter().filter_map(Item::destination).collect();

        CatalogStats {
            item_count: self.items.len(),
            carrier_count: self.carriers.len(),
            total_volume: self.items.iter().map(Item::volume).sum(),
            total_mass: self.items.iter().map(Item::mass).sum(),
            fragile_count: self.items.iter().filter(|i| i.is_fragile()).count(),
            destination_count: destinations.len(),
        }
    }
}

fn duplicate(kind: RecordKind, id: u32) -> Error {
    Error::Validation {
        kind,
        id,
        reason: "duplicate id".into(),
    }
}

fn reject(error: Error, mode: ValidationMode, rejected: &mut Vec<Error>) -> Result<()> {
    match mode {
        ValidationMode::Lenient if error.is_recoverable() => {
            log::warn!("Rejecting record: {}", error);
            rejected.push(error);
            Ok(())
        }
        _ => Err(error),
    }
}

fn check_unique(kind: RecordKind, ids: impl Iterator<Item = u32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(duplicate(kind, id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item_record(id: ItemId, mass: f64) -> ItemRecord {
        ItemRecord {
            id,
            length: 0.5,
            width: 0.4,
            height: 0.3,
            mass,
            fragile: false,
            rotatable: true,
            priority: 2,
            destination: Some("Rio de Janeiro".into()),
        }
    }

    fn carrier_record(id: CarrierId) -> CarrierRecord {
        CarrierRecord {
            id,
            max_mass: 1000.0,
            max_volume: 2.16,
            footprint_length: 1.2,
            footprint_width: 1.0,
            max_height: 1.8,
        }
    }

    #[test]
    fn test_ingest_lenient_rejects_individually() {
        let items = vec![item_record(0, 10.0), item_record(1, -5.0), item_record(0, 3.0)];
        let carriers = vec![carrier_record(0)];

        let ingested = Catalog::ingest(items, carriers, ValidationMode::Lenient).unwrap();
        assert_eq!(ingested.catalog.items().len(), 1);
        assert_eq!(ingested.rejected.len(), 2);
        assert!(matches!(
            ingested.rejected[0],
            Error::Validation {
                kind: RecordKind::Item,
                id: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_ingest_strict_fails_batch() {
        let items = vec![item_record(0, 10.0), item_record(1, -5.0)];
        let carriers = vec![carrier_record(0)];

        let result = Catalog::ingest(items, carriers, ValidationMode::Strict);
        assert!(matches!(result, Err(Error::Validation { id: 1, .. })));
    }

    #[test]
    fn test_ingest_bad_priority() {
        let mut record = item_record(3, 1.0);
        record.priority = -2;
        assert!(record.clone().into_item().is_err());
        record.priority = i64::from(u32::MAX) + 1;
        assert!(record.into_item().is_err());
    }

    #[test]
    fn test_empty_catalog_is_fatal() {
        let result = Catalog::ingest(vec![], vec![carrier_record(0)], ValidationMode::Lenient);
        assert!(matches!(result, Err(Error::InfeasibleInput(_))));

        let mut bad_carrier = carrier_record(0);
        bad_carrier.max_mass = 0.0;
        let result = Catalog::ingest(
            vec![item_record(0, 1.0)],
            vec![bad_carrier],
            ValidationMode::Lenient,
        );
        assert!(matches!(result, Err(Error::InfeasibleInput(_))));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let items = vec![
            Item::new(0, 1.0, 1.0, 1.0, 1.0),
            Item::new(0, 1.0, 1.0, 1.0, 1.0),
        ];
        assert!(Catalog::new(items, vec![Carrier::pbr(0)]).is_err());
    }

    #[test]
    fn test_lookup_and_stats() {
        let items = vec![
            Item::new(10, 0.5, 0.5, 0.5, 20.0).with_destination("Salvador"),
            Item::new(11, 0.5, 0.5, 0.4, 10.0)
                .with_fragile(true)
                .with_destination("Salvador"),
            Item::new(12, 0.2, 0.2, 0.2, 1.0).with_destination("Belo Horizonte"),
        ];
        let catalog = Catalog::new(items, vec![Carrier::pbr(0), Carrier::euro(1)]).unwrap();

        assert_eq!(catalog.item(11).map(|i| i.mass()), Some(10.0));
        assert_eq!(catalog.item_index(12), Some(2));
        assert!(catalog.carrier(1).is_some());
        assert!(catalog.item(99).is_none());

        let stats = catalog.stats();
        assert_eq!(stats.item_count, 3);
        assert_eq!(stats.carrier_count, 2);
        assert_eq!(stats.fragile_count, 1);
        assert_eq!(stats.destination_count, 2);
        assert_relative_eq!(stats.total_mass, 31.0);
        assert_relative_eq!(stats.total_volume, 0.125 + 0.1 + 0.008, epsilon = 1e-12);
    }
}

//! Constraint model builder.
//!
//! Compiles a [`Catalog`] into decision variables and clauses for the search
//! engine without searching:
//!
//! - `x[i][c]`: the carriers item `i` may be assigned to ([`ModelItem::domain`])
//! - `r[i]`: the orientations item `i` may take on each carrier
//! - `s[a][b]`: whether item `a` may rest directly on item `b`
//!
//! Items that no carrier can ever hold are excluded up front and reported as
//! [`Error::Model`].

use crate::carrier::Carrier;
use crate::catalog::Catalog;
use crate::item::Item;
use crate::orientation::fitting_orientations;
use crate::skyline::Candidate;
use pallet_core::{CarrierId, Error, ItemId, Orientation, Placement, UnassignedPolicy, EPSILON};

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A constraint of the loading model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Clause {
    /// Item is assigned to at most one carrier, or exactly one when
    /// unassigned items are forbidden.
    Uniqueness {
        /// The item.
        item: ItemId,
        /// Whether the item must be assigned.
        exactly_one: bool,
    },
    /// Σ mass on the carrier ≤ its maximum mass.
    MassCapacity(CarrierId),
    /// Σ volume on the carrier ≤ its maximum volume.
    VolumeCapacity(CarrierId),
    /// An assigned item takes exactly one orientation.
    OrientationCardinality {
        /// The item.
        item: ItemId,
        /// Whether the orientation is pinned to the identity.
        pinned: bool,
    },
    /// Nothing rests on this fragile item.
    Fragility(ItemId),
    /// `upper` may not rest on `lower` because it is heavier.
    WeightOrdering {
        /// The heavier item.
        upper: ItemId,
        /// The lighter item.
        lower: ItemId,
    },
}

/// Decision variables of one loadable item.
#[derive(Debug, Clone)]
pub struct ModelItem {
    /// Item id.
    pub id: ItemId,
    /// Position in [`Catalog::items`].
    pub catalog_index: usize,
    /// Objective contribution when assigned (priority × volume).
    pub value: f64,
    /// Mass.
    pub mass: f64,
    /// Volume.
    pub volume: f64,
    /// Fragile flag.
    pub fragile: bool,
    /// Carrier indices the item can be assigned to, ascending.
    pub domain: Vec<usize>,
    /// Fitting orientations, indexed by carrier index (empty outside the
    /// domain).
    pub orientations: Vec<Vec<Orientation>>,
}

impl ModelItem {
    /// Returns true if the item may go on the carrier.
    pub fn allows(&self, carrier: usize) -> bool {
        self.domain.binary_search(&carrier).is_ok()
    }
}

/// The compiled loading model.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    items: Vec<ModelItem>,
    carriers: Vec<Carrier>,
    excluded: Vec<Error>,
    stacking: Vec<bool>,
    symmetry_class: Vec<usize>,
    policy: UnassignedPolicy,
}

impl ConstraintModel {
    /// Builds the model for a catalog.
    pub fn build(catalog: &Catalog, policy: UnassignedPolicy) -> Self {
        let carriers = catalog.carriers().to_vec();
        let mut items = Vec::with_capacity(catalog.items().len());
        let mut excluded = Vec::new();

        for (catalog_index, item) in catalog.items().iter().enumerate() {
            match Self::compile_item(catalog_index, item, &carriers) {
                Ok(model_item) => items.push(model_item),
                Err(e) => {
                    log::warn!("Excluding item from search: {}", e);
                    excluded.push(e);
                }
            }
        }

        let n = items.len();
        let mut stacking = vec![false; n * n];
        for (a, upper) in items.iter().enumerate() {
            let upper_item = &catalog.items()[upper.catalog_index];
            for (b, lower) in items.iter().enumerate() {
                let lower_item = &catalog.items()[lower.catalog_index];
                stacking[a * n + b] = upper_item.may_rest_on(lower_item);
            }
        }

        let symmetry_class = carriers
            .iter()
            .enumerate()
            .map(|(idx, carrier)| {
                carriers[..idx]
                    .iter()
                    .position(|other| other.same_class(carrier))
                    .unwrap_or(idx)
            })
            .collect();

        log::debug!(
            "Model built: {} loadable items, {} excluded, {} carriers",
            items.len(),
            excluded.len(),
            carriers.len()
        );

        Self {
            items,
            carriers,
            excluded,
            stacking,
            symmetry_class,
            policy,
        }
    }

    fn compile_item(
        catalog_index: usize,
        item: &Item,
        carriers: &[Carrier],
    ) -> Result<ModelItem, Error> {
        let mut domain = Vec::new();
        let mut orientations = vec![Vec::new(); carriers.len()];
        let mut any_geometry = false;
        let mut any_mass = false;
        let mut any_volume = false;

        for (c, carrier) in carriers.iter().enumerate() {
            let fitting = fitting_orientations(item, carrier);
            let geometry_ok = !fitting.is_empty();
            let mass_ok = item.mass() <= carrier.max_mass() + EPSILON;
            let volume_ok = item.volume() <= carrier.max_volume() + EPSILON;

            any_geometry |= geometry_ok;
            any_mass |= mass_ok;
            any_volume |= volume_ok;

            if geometry_ok && mass_ok && volume_ok {
                domain.push(c);
                orientations[c] = fitting;
            }
        }

        if domain.is_empty() {
            let reason = if !any_geometry {
                "exceeds every carrier's footprint or height in all orientations"
            } else if !any_mass {
                "mass exceeds every carrier's capacity"
            } else if !any_volume {
                "volume exceeds every carrier's capacity"
            } else {
                "no single carrier satisfies geometry, mass and volume together"
            };
            return Err(Error::Model {
                item: item.id(),
                reason: reason.into(),
            });
        }

        Ok(ModelItem {
            id: item.id(),
            catalog_index,
            value: item.value(),
            mass: item.mass(),
            volume: item.volume(),
            fragile: item.is_fragile(),
            domain,
            orientations,
        })
    }

    /// Returns the loadable items in catalog order.
    pub fn items(&self) -> &[ModelItem] {
        &self.items
    }

    /// Returns the carriers.
    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Returns the [`Error::Model`] entries of excluded items.
    pub fn excluded(&self) -> &[Error] {
        &self.excluded
    }

    /// Returns true if no item can be loaded at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the unassigned-item policy the objective uses.
    pub fn policy(&self) -> UnassignedPolicy {
        self.policy
    }

    /// Returns true if model item `upper` may rest directly on `lower`.
    pub fn may_stack(&self, upper: usize, lower: usize) -> bool {
        self.stacking[upper * self.items.len() + lower]
    }

    /// Returns the symmetry class of a carrier: the index of the first
    /// carrier with identical capacities and geometry.
    pub fn symmetry_class(&self, carrier: usize) -> usize {
        self.symmetry_class[carrier]
    }

    /// Builds resolver candidates for model items loaded on a carrier.
    pub fn candidates<'a>(
        &'a self,
        catalog: &'a Catalog,
        items: &[usize],
        carrier: usize,
    ) -> Vec<Candidate<'a>> {
        items
            .iter()
            .map(|&i| {
                let model_item = &self.items[i];
                Candidate {
                    item: &catalog.items()[model_item.catalog_index],
                    orientations: &model_item.orientations[carrier],
                }
            })
            .collect()
    }

    /// Item indices in search order: descending priority·volume, ties by
    /// ascending id.
    pub fn search_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| {
            let (ia, ib) = (&self.items[a], &self.items[b]);
            ib.value
                .total_cmp(&ia.value)
                .then_with(|| ia.id.cmp(&ib.id))
        });
        order
    }

    /// Objective of a solution given the loaded value and the number of
    /// loadable items left unassigned.
    pub fn objective(&self, loaded_value: f64, unassigned: usize) -> f64 {
        loaded_value - self.policy.penalty() * unassigned as f64
    }

    /// Enumerates the clauses of the model.
    pub fn clauses(&self) -> Vec<Clause> {
        let exactly_one = self.policy.is_forbidden();
        let mut clauses = Vec::new();

        for item in &self.items {
            clauses.push(Clause::Uniqueness {
                item: item.id,
                exactly_one,
            });
            let pinned = item
                .orientations
                .iter()
                .filter(|o| !o.is_empty())
                .all(|o| o.len() == 1 && o[0].is_identity());
            clauses.push(Clause::OrientationCardinality {
                item: item.id,
                pinned,
            });
        }

        for carrier in &self.carriers {
            clauses.push(Clause::MassCapacity(carrier.id()));
            clauses.push(Clause::VolumeCapacity(carrier.id()));
        }

        for item in self.items.iter().filter(|i| i.fragile) {
            clauses.push(Clause::Fragility(item.id));
        }

        for (a, upper) in self.items.iter().enumerate() {
            for (b, lower) in self.items.iter().enumerate() {
                if a != b && !lower.fragile && !self.may_stack(a, b) {
                    clauses.push(Clause::WeightOrdering {
                        upper: upper.id,
                        lower: lower.id,
                    });
                }
            }
        }

        clauses
    }

    /// Returns the assignment-level clauses violated by `assignment`, which
    /// maps each model item to an optional (carrier index, orientation).
    ///
    /// Stacking clauses depend on positions and are checked by the placement
    /// resolver instead.
    pub fn violations(&self, assignment: &[Option<(usize, Orientation)>]) -> Vec<Clause> {
        let mut violated = Vec::new();
        let mut mass = vec![0.0; self.carriers.len()];
        let mut volume = vec![0.0; self.carriers.len()];

        for (item, slot) in self.items.iter().zip(assignment) {
            match slot {
                Some((c, orientation)) => {
                    let in_domain = item.allows(*c);
                    if !in_domain {
                        violated.push(Clause::Uniqueness {
                            item: item.id,
                            exactly_one: self.policy.is_forbidden(),
                        });
                    } else if !item.orientations[*c].contains(orientation) {
                        violated.push(Clause::OrientationCardinality {
                            item: item.id,
                            pinned: item.orientations[*c].len() == 1,
                        });
                    }
                    if let Some(m) = mass.get_mut(*c) {
                        *m += item.mass;
                    }
                    if let Some(v) = volume.get_mut(*c) {
                        *v += item.volume;
                    }
                }
                None if self.policy.is_forbidden() => {
                    violated.push(Clause::Uniqueness {
                        item: item.id,
                        exactly_one: true,
                    });
                }
                None => {}
            }
        }

        for (c, carrier) in self.carriers.iter().enumerate() {
            if mass[c] > carrier.max_mass() + EPSILON {
                violated.push(Clause::MassCapacity(carrier.id()));
            }
            if volume[c] > carrier.max_volume() + EPSILON {
                violated.push(Clause::VolumeCapacity(carrier.id()));
            }
        }

        violated
    }

    /// Returns every clause a resolved layout violates: the assignment-level
    /// clauses of [`ConstraintModel::violations`] plus fragility and weight
    /// ordering along the support edges of the placements.
    pub fn layout_violations(&self, placements: &[Placement]) -> Vec<Clause> {
        let index: HashMap<ItemId, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();
        let carrier_index: HashMap<CarrierId, usize> = self
            .carriers
            .iter()
            .enumerate()
            .map(|(c, carrier)| (carrier.id(), c))
            .collect();

        let mut assignment = vec![None; self.items.len()];
        for p in placements {
            if let (Some(&i), Some(&c)) = (index.get(&p.item), carrier_index.get(&p.carrier)) {
                assignment[i] = Some((c, p.orientation));
            }
        }
        let mut violated = self.violations(&assignment);

        for p in placements {
            let Some(below) = p.supported_by else {
                continue;
            };
            let (Some(&upper), Some(&lower)) = (index.get(&p.item), index.get(&below)) else {
                continue;
            };
            if self.may_stack(upper, lower) {
                continue;
            }
            violated.push(if self.items[lower].fragile {
                Clause::Fragility(below)
            } else {
                Clause::WeightOrdering {
                    upper: p.item,
                    lower: below,
                }
            });
        }

        violated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use pallet_core::Dimensions;

    fn catalog() -> Catalog {
        let items = vec![
            Item::new(0, 0.5, 0.3, 0.4, 20.0)
                .with_fragile(true)
                .with_rotatable(false)
                .with_priority(2),
            Item::new(1, 0.6, 0.2, 0.3, 15.0).with_priority(5),
            Item::new(2, 0.3, 0.3, 2.5, 5.0).with_rotatable(false),
            Item::new(3, 0.4, 0.4, 0.4, 2000.0),
        ];
        let carriers = vec![Carrier::pbr(0), Carrier::pbr(1), Carrier::euro(2)];
        Catalog::new(items, carriers).unwrap()
    }

    #[test]
    fn test_excludes_impossible_items() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Allow);
        assert_eq!(model.items().len(), 2);
        assert_eq!(model.excluded().len(), 2);
        assert!(matches!(model.excluded()[0], Error::Model { item: 2, .. }));
        assert!(matches!(model.excluded()[1], Error::Model { item: 3, .. }));
    }

    #[test]
    fn test_domains_and_orientations() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Allow);
        let fragile = &model.items()[0];
        assert_eq!(fragile.domain, vec![0, 1, 2]);
        assert_eq!(fragile.orientations[0], vec![Orientation::Lwh]);
        assert!(model.items()[1].orientations[2].len() > 1);
    }

    #[test]
    fn test_stacking_matrix() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Allow);
        // 0 is fragile: 1 may not rest on it; 0 is heavier than 1.
        assert!(!model.may_stack(1, 0));
        assert!(!model.may_stack(0, 1));
        assert!(!model.may_stack(0, 0));
    }

    #[test]
    fn test_symmetry_classes() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Allow);
        assert_eq!(model.symmetry_class(0), 0);
        assert_eq!(model.symmetry_class(1), 0);
        assert_eq!(model.symmetry_class(2), 2);
    }

    #[test]
    fn test_search_order_and_objective() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Penalty(0.01));
        // value(0) = 2 * 0.06 = 0.12; value(1) = 5 * 0.036 = 0.18
        assert_eq!(model.search_order(), vec![1, 0]);
        assert_relative_eq!(model.objective(0.18, 1), 0.17, epsilon = 1e-12);
    }

    #[test]
    fn test_clauses() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Forbid);
        let clauses = model.clauses();
        assert!(clauses.contains(&Clause::Uniqueness {
            item: 0,
            exactly_one: true
        }));
        assert!(clauses.contains(&Clause::OrientationCardinality {
            item: 0,
            pinned: true
        }));
        assert!(clauses.contains(&Clause::Fragility(0)));
        assert!(clauses.contains(&Clause::MassCapacity(2)));
        // 0 is fragile, so no weight-ordering clause with 0 below.
        assert!(!clauses
            .iter()
            .any(|c| matches!(c, Clause::WeightOrdering { lower: 0, .. })));
    }

    #[test]
    fn test_violations() {
        let items = vec![
            Item::new(0, 0.5, 0.5, 0.5, 600.0),
            Item::new(1, 0.5, 0.5, 0.5, 600.0),
        ];
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let model = ConstraintModel::build(&catalog, UnassignedPolicy::Forbid);

        let both = [Some((0, Orientation::Lwh)), Some((0, Orientation::Lwh))];
        assert_eq!(model.violations(&both), vec![Clause::MassCapacity(0)]);

        let one = [Some((0, Orientation::Lwh)), None];
        assert_eq!(
            model.violations(&one),
            vec![Clause::Uniqueness {
                item: 1,
                exactly_one: true
            }]
        );
    }

    #[test]
    fn test_layout_violations() {
        let model = ConstraintModel::build(&catalog(), UnassignedPolicy::Allow);
        let floor = |item, dims| {
            Placement::new(item, 0, Orientation::Lwh, Vector3::new(0.0, 0.0, 0.0), dims)
        };
        let fragile = floor(0, Dimensions::new(0.5, 0.3, 0.4));
        let light = floor(1, Dimensions::new(0.6, 0.2, 0.3));
        assert!(model.layout_violations(&[fragile.clone(), light.clone()]).is_empty());

        // 1 on the fragile 0.
        let on_fragile = Placement::new(
            1,
            0,
            Orientation::Lwh,
            Vector3::new(0.0, 0.0, 0.4),
            Dimensions::new(0.6, 0.2, 0.3),
        )
        .with_support(Some(0));
        assert_eq!(
            model.layout_violations(&[fragile, on_fragile]),
            vec![Clause::Fragility(0)]
        );

        // The heavier 0 on 1.
        let on_light = Placement::new(
            0,
            0,
            Orientation::Lwh,
            Vector3::new(0.0, 0.0, 0.3),
            Dimensions::new(0.5, 0.3, 0.4),
        )
        .with_support(Some(1));
        assert_eq!(
            model.layout_violations(&[light, on_light]),
            vec![Clause::WeightOrdering { upper: 0, lower: 1 }]
        );
    }
}

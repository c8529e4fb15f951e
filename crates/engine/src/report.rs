//! Solution report.
//!
//! The report is the read-only product of a solve: status, objective and gap,
//! the 3D placements, the stacking forest, per-carrier utilization, the items
//! that were not loaded and why, and the input records that were rejected.

use crate::catalog::Catalog;
use crate::model::ConstraintModel;
use crate::search::SearchOutcome;
use pallet_core::{
    CarrierId, Error, ItemId, Orientation, Placement, PlacementStats, RecordKind, SolutionStatus,
    SolveSummary,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decision for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Assignment {
    /// Loaded on a carrier in an orientation.
    Assigned {
        /// The carrier.
        carrier: CarrierId,
        /// The chosen orientation.
        orientation: Orientation,
    },
    /// Not loaded.
    Unassigned,
}

/// Why an item is not loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnassignedReason {
    /// No carrier can ever hold the item.
    Model(String),
    /// The item was left out of the best solution found.
    NotSelected,
}

/// An item that is not loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnassignedItem {
    /// The item.
    pub item: ItemId,
    /// Why it is not loaded.
    pub reason: UnassignedReason,
}

/// An input record excluded during ingestion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RejectedRecord {
    /// Which record list it came from.
    pub kind: RecordKind,
    /// Its id.
    pub id: u32,
    /// Why it was rejected.
    pub reason: String,
}

impl RejectedRecord {
    fn from_error(error: Error) -> Self {
        match error {
            Error::Validation { kind, id, reason } => Self { kind, id, reason },
            other => Self {
                kind: RecordKind::Item,
                id: u32::MAX,
                reason: other.to_string(),
            },
        }
    }
}

/// Load of a single carrier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CarrierUtilization {
    /// The carrier.
    pub carrier: CarrierId,
    /// Number of items loaded.
    pub items: usize,
    /// Σ mass loaded.
    pub mass: f64,
    /// Σ volume loaded.
    pub volume: f64,
    /// Mass as a percentage of the carrier's capacity.
    pub mass_percent: f64,
    /// Volume as a percentage of the carrier's capacity.
    pub volume_percent: f64,
}

/// "`upper` rests directly on `lower`".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StackingEdge {
    /// The resting item.
    pub upper: ItemId,
    /// The supporting item.
    pub lower: ItemId,
    /// The carrier both are on.
    pub carrier: CarrierId,
}

/// Aggregate load figures over the carriers in use.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadMetrics {
    /// Carriers holding at least one item.
    pub carriers_used: usize,
    /// Items loaded.
    pub items_loaded: usize,
    /// Items in the catalog.
    pub items_total: usize,
    /// Items loaded as a percentage of all items.
    pub item_load_rate: f64,
    /// Σ volume loaded.
    pub volume_used: f64,
    /// Σ volume capacity of the carriers in use.
    pub volume_available: f64,
    /// Volume used as a percentage of the capacity in use.
    pub volume_utilization: f64,
    /// Σ mass loaded.
    pub mass_used: f64,
    /// Σ mass capacity of the carriers in use.
    pub mass_available: f64,
    /// Mass used as a percentage of the capacity in use.
    pub mass_utilization: f64,
}

/// Logistics indicators derived from a solution.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogisticsKpis {
    /// Loaded mass per loaded volume (kg/m³).
    pub load_density: f64,
    /// Volume utilization of the carriers in use (%).
    pub spatial_efficiency: f64,
    /// Items loaded over items total (%).
    pub load_rate: f64,
    /// Carriers in use over carriers available (%).
    pub resource_utilization: f64,
    /// Fragile items over items total (%).
    pub fragility_index: f64,
    /// Number of distinct destinations in the catalog.
    pub destinations: usize,
}

/// Cost parameters for a rough logistics estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostModel {
    /// Cost per pallet used.
    pub pallet_cost: f64,
    /// Transport cost per pallet and kilometre.
    pub transport_cost_per_km: f64,
    /// Average transport distance in kilometres.
    pub distance_km: f64,
    /// Handling labour cost per pallet.
    pub labour_cost_per_pallet: f64,
    /// Storage cost per cubic metre and day.
    pub storage_cost_per_m3_day: f64,
    /// Days in storage.
    pub storage_days: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            pallet_cost: 15.0,
            transport_cost_per_km: 2.5,
            distance_km: 100.0,
            labour_cost_per_pallet: 8.0,
            storage_cost_per_m3_day: 0.5,
            storage_days: 7.0,
        }
    }
}

/// Cost split produced by [`CostModel::estimate`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostEstimate {
    /// Pallet cost.
    pub pallets: f64,
    /// Transport cost.
    pub transport: f64,
    /// Labour cost.
    pub labour: f64,
    /// Storage cost.
    pub storage: f64,
    /// Sum of all parts.
    pub total: f64,
}

impl CostModel {
    /// Sets the average transport distance.
    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = km;
        self
    }

    /// Sets the storage duration.
    pub fn with_storage_days(mut self, days: f64) -> Self {
        self.storage_days = days;
        self
    }

    /// Estimates the cost of shipping a load.
    pub fn estimate(&self, metrics: &LoadMetrics) -> CostEstimate {
        let pallets_used = metrics.carriers_used as f64;
        let pallets = pallets_used * self.pallet_cost;
        let transport = pallets_used * self.transport_cost_per_km * self.distance_km;
        let labour = pallets_used * self.labour_cost_per_pallet;
        let storage = metrics.volume_used * self.storage_cost_per_m3_day * self.storage_days;

        CostEstimate {
            pallets,
            transport,
            labour,
            storage,
            total: pallets + transport + labour + storage,
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// The result of a solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolutionReport {
    status: SolutionStatus,
    objective: f64,
    upper_bound: f64,
    gap: f64,
    placements: Vec<Placement>,
    unassigned: Vec<UnassignedItem>,
    rejected: Vec<RejectedRecord>,
    utilization: Vec<CarrierUtilization>,
    stacking: Vec<StackingEdge>,
    metrics: LoadMetrics,
    kpis: LogisticsKpis,
    nodes_explored: u64,
    nogoods: usize,
    elapsed_ms: u64,
}

impl SolutionReport {
    /// Assembles the report of a finished search.
    ///
    /// `placements` must hold the resolver output of every loaded carrier.
    pub(crate) fn assemble(
        catalog: &Catalog,
        model: &ConstraintModel,
        outcome: &SearchOutcome,
        placements: Vec<Placement>,
        rejected: Vec<Error>,
        elapsed_ms: u64,
    ) -> Self {
        let status = match (outcome.exhausted, outcome.has_solution()) {
            (true, true) => SolutionStatus::Optimal,
            (true, false) => SolutionStatus::Infeasible,
            (false, true) => SolutionStatus::Feasible,
            (false, false) => SolutionStatus::Timeout,
        };

        let mut unassigned: Vec<UnassignedItem> = model
            .excluded()
            .iter()
            .filter_map(|e| match e {
                Error::Model { item, reason } => Some(UnassignedItem {
                    item: *item,
                    reason: UnassignedReason::Model(reason.clone()),
                }),
                _ => None,
            })
            .collect();
        for (idx, item) in model.items().iter().enumerate() {
            let loaded = outcome
                .assignment
                .as_ref()
                .is_some_and(|a| a[idx].is_some());
            if !loaded {
                unassigned.push(UnassignedItem {
                    item: item.id,
                    reason: UnassignedReason::NotSelected,
                });
            }
        }
        unassigned.sort_by_key(|u| u.item);

        let stacking = placements
            .iter()
            .filter_map(|p| {
                p.supported_by.map(|lower| StackingEdge {
                    upper: p.item,
                    lower,
                    carrier: p.carrier,
                })
            })
            .collect();

        let utilization: Vec<CarrierUtilization> = catalog
            .carriers()
            .iter()
            .map(|carrier| {
                let mut items = 0;
                let mut mass = 0.0;
                let mut volume = 0.0;
                for p in placements.iter().filter(|p| p.carrier == carrier.id()) {
                    if let Some(item) = catalog.item(p.item) {
                        items += 1;
                        mass += item.mass();
                        volume += item.volume();
                    }
                }
                CarrierUtilization {
                    carrier: carrier.id(),
                    items,
                    mass,
                    volume,
                    mass_percent: percent(mass, carrier.max_mass()),
                    volume_percent: percent(volume, carrier.max_volume()),
                }
            })
            .collect();

        let metrics = Self::load_metrics(catalog, &utilization);
        let stats = catalog.stats();
        let kpis = LogisticsKpis {
            load_density: if metrics.volume_used > 0.0 {
                metrics.mass_used / metrics.volume_used
            } else {
                0.0
            },
            spatial_efficiency: metrics.volume_utilization,
            load_rate: metrics.item_load_rate,
            resource_utilization: percent(
                metrics.carriers_used as f64,
                catalog.carriers().len() as f64,
            ),
            fragility_index: percent(stats.fragile_count as f64, stats.item_count as f64),
            destinations: stats.destination_count,
        };

        Self {
            status,
            objective: outcome.objective,
            upper_bound: outcome.upper_bound,
            gap: outcome.gap(),
            placements,
            unassigned,
            rejected: rejected.into_iter().map(RejectedRecord::from_error).collect(),
            utilization,
            stacking,
            metrics,
            kpis,
            nodes_explored: outcome.nodes_explored,
            nogoods: outcome.nogoods,
            elapsed_ms,
        }
    }

    fn load_metrics(catalog: &Catalog, utilization: &[CarrierUtilization]) -> LoadMetrics {
        let mut metrics = LoadMetrics {
            items_total: catalog.items().len(),
            ..Default::default()
        };

        for (u, carrier) in utilization.iter().zip(catalog.carriers()) {
            if u.items == 0 {
                continue;
            }
            metrics.carriers_used += 1;
            metrics.items_loaded += u.items;
            metrics.volume_used += u.volume;
            metrics.mass_used += u.mass;
            metrics.volume_available += carrier.max_volume();
            metrics.mass_available += carrier.max_mass();
        }

        metrics.item_load_rate =
            percent(metrics.items_loaded as f64, metrics.items_total as f64);
        metrics.volume_utilization = percent(metrics.volume_used, metrics.volume_available);
        metrics.mass_utilization = percent(metrics.mass_used, metrics.mass_available);
        metrics
    }

    /// Termination status.
    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    /// Objective value: Σ priority·volume of loaded items minus penalties.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Best known upper bound on the optimum.
    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Relative optimality gap.
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Placements of every loaded item, grouped by carrier.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placement of an item, if loaded.
    pub fn placement(&self, item: ItemId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.item == item)
    }

    /// Decision for an item.
    pub fn assignment(&self, item: ItemId) -> Assignment {
        match self.placement(item) {
            Some(p) => Assignment::Assigned {
                carrier: p.carrier,
                orientation: p.orientation,
            },
            None => Assignment::Unassigned,
        }
    }

    /// Placements on a carrier.
    pub fn items_on(&self, carrier: CarrierId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.carrier == carrier)
            .collect()
    }

    /// The item `item` rests on, `None` if it rests on the floor or is not
    /// loaded.
    pub fn parent(&self, item: ItemId) -> Option<ItemId> {
        self.placement(item).and_then(|p| p.supported_by)
    }

    /// Items not loaded, by ascending id.
    pub fn unassigned(&self) -> &[UnassignedItem] {
        &self.unassigned
    }

    /// Input records rejected during ingestion.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Per-carrier utilization, in carrier order.
    pub fn utilization(&self) -> &[CarrierUtilization] {
        &self.utilization
    }

    /// The stacking forest.
    pub fn stacking_edges(&self) -> &[StackingEdge] {
        &self.stacking
    }

    /// Aggregate load figures.
    pub fn metrics(&self) -> &LoadMetrics {
        &self.metrics
    }

    /// Logistics indicators.
    pub fn kpis(&self) -> &LogisticsKpis {
        &self.kpis
    }

    /// Placement statistics.
    pub fn placement_stats(&self) -> PlacementStats {
        PlacementStats::from_placements(&self.placements)
    }

    /// Nodes expanded by the search.
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored
    }

    /// Nogoods recorded by the search.
    pub fn nogoods(&self) -> usize {
        self.nogoods
    }

    /// Wall-clock time of the solve in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Condensed summary.
    pub fn summary(&self) -> SolveSummary {
        SolveSummary {
            total_items: self.metrics.items_total,
            total_placed: self.metrics.items_loaded,
            carriers_used: self.metrics.carriers_used,
            objective: self.objective,
            gap: self.gap,
            volume_utilization_percent: self.metrics.volume_utilization,
            time_ms: self.elapsed_ms,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::Carrier;
    use crate::item::Item;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use pallet_core::{Dimensions, UnassignedPolicy};

    fn report() -> SolutionReport {
        let items = vec![
            Item::new(0, 0.5, 0.5, 0.4, 40.0).with_destination("Recife"),
            Item::new(1, 0.5, 0.5, 0.4, 20.0)
                .with_fragile(true)
                .with_destination("Recife"),
            Item::new(2, 0.5, 0.5, 2.5, 5.0).with_rotatable(false),
            Item::new(3, 0.2, 0.2, 0.2, 1.0).with_destination("Natal"),
        ];
        let carriers = vec![Carrier::pbr(0), Carrier::pbr(1)];
        let catalog = Catalog::new(items, carriers).unwrap();
        let model = ConstraintModel::build(&catalog, UnassignedPolicy::Allow);

        let outcome = SearchOutcome {
            assignment: Some(vec![Some(0), Some(0), None]),
            objective: 0.2,
            upper_bound: 0.208,
            nodes_explored: 42,
            nogoods: 1,
            exhausted: false,
            cancelled: false,
        };
        let dims = Dimensions::new(0.5, 0.5, 0.4);
        let placements = vec![
            Placement::new(0, 0, Orientation::Lwh, Vector3::new(0.0, 0.0, 0.0), dims),
            Placement::new(1, 0, Orientation::Lwh, Vector3::new(0.0, 0.0, 0.4), dims)
                .with_support(Some(0)),
        ];
        let rejected = vec![Error::Validation {
            kind: RecordKind::Carrier,
            id: 9,
            reason: "maximum mass must be positive".into(),
        }];

        SolutionReport::assemble(&catalog, &model, &outcome, placements, rejected, 12)
    }

    #[test]
    fn test_status_and_gap() {
        let report = report();
        assert_eq!(report.status(), SolutionStatus::Feasible);
        assert_relative_eq!(report.gap(), 0.008 / 0.208, epsilon = 1e-12);
        assert_eq!(report.nodes_explored(), 42);
    }

    #[test]
    fn test_unassigned_reasons() {
        let report = report();
        assert_eq!(report.unassigned().len(), 2);
        assert!(matches!(
            report.unassigned()[0].reason,
            UnassignedReason::Model(_)
        ));
        assert_eq!(report.unassigned()[0].item, 2);
        assert_eq!(report.unassigned()[1].item, 3);
        assert_eq!(report.unassigned()[1].reason, UnassignedReason::NotSelected);
        assert_eq!(report.rejected()[0].id, 9);
    }

    #[test]
    fn test_queries() {
        let report = report();
        assert_eq!(report.parent(1), Some(0));
        assert_eq!(report.parent(0), None);
        assert_eq!(report.items_on(0).len(), 2);
        assert!(report.items_on(1).is_empty());
        assert_eq!(report.assignment(3), Assignment::Unassigned);
        assert_eq!(
            report.assignment(1),
            Assignment::Assigned {
                carrier: 0,
                orientation: Orientation::Lwh
            }
        );
        assert_eq!(
            report.stacking_edges(),
            &[StackingEdge {
                upper: 1,
                lower: 0,
                carrier: 0
            }]
        );
    }

    #[test]
    fn test_metrics_and_kpis() {
        let report = report();
        let metrics = report.metrics();
        assert_eq!(metrics.carriers_used, 1);
        assert_eq!(metrics.items_loaded, 2);
        assert_relative_eq!(metrics.item_load_rate, 50.0);
        assert_relative_eq!(metrics.volume_used, 0.2, epsilon = 1e-12);
        assert_relative_eq!(metrics.mass_utilization, 6.0, epsilon = 1e-9);

        let kpis = report.kpis();
        assert_relative_eq!(kpis.load_density, 300.0, epsilon = 1e-9);
        assert_relative_eq!(kpis.resource_utilization, 50.0);
        assert_relative_eq!(kpis.fragility_index, 25.0);
        assert_eq!(kpis.destinations, 2);

        let util = &report.utilization()[0];
        assert_eq!(util.items, 2);
        assert_relative_eq!(util.mass_percent, 6.0, epsilon = 1e-9);
        assert_eq!(report.utilization()[1].items, 0);

        let summary = report.summary();
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.total_placed, 2);
    }

    #[test]
    fn test_cost_estimate() {
        let metrics = LoadMetrics {
            carriers_used: 2,
            volume_used: 3.0,
            ..Default::default()
        };
        let estimate = CostModel::default().estimate(&metrics);
        assert_relative_eq!(estimate.pallets, 30.0);
        assert_relative_eq!(estimate.transport, 500.0);
        assert_relative_eq!(estimate.labour, 16.0);
        assert_relative_eq!(estimate.storage, 10.5);
        assert_relative_eq!(estimate.total, 556.5);

        let short = CostModel::default().with_distance(10.0).with_storage_days(0.0);
        assert_relative_eq!(short.estimate(&metrics).total, 96.0);
    }
}

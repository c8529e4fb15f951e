//! # Pallet Engine
//!
//! Priority-weighted pallet loading: decides which items go on which carrier
//! to maximize Σ priority·volume, then derives a non-overlapping 3D layout and
//! a stacking forest for every loaded carrier.
//!
//! ## Pipeline
//!
//! 1. [`Catalog`]: validated items and carriers
//! 2. [`admissible_orientations`]: the axis permutations an item may take
//! 3. [`ConstraintModel`]: assignment domains, stacking permissions, clauses
//! 4. [`SearchEngine`]: anytime branch-and-bound with nogood learning
//! 5. [`SkylineResolver`]: deterministic placement per carrier
//! 6. [`SolutionReport`]: status, gap, placements, utilization, KPIs
//!
//! [`Palletizer`] runs the whole pipeline.
//!
//! ## Example
//!
//! ```rust
//! use pallet_engine::{Carrier, Catalog, Item, Palletizer};
//! use pallet_core::{Config, Solver};
//!
//! let items = vec![
//!     Item::new(0, 0.5, 0.3, 0.4, 20.0).with_fragile(true).with_priority(3),
//!     Item::new(1, 0.6, 0.2, 0.3, 15.0).with_priority(5),
//! ];
//! let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
//!
//! let report = Palletizer::new(Config::new().with_time_limit(1000))
//!     .solve(&catalog)
//!     .unwrap();
//! assert_eq!(report.placements().len(), 2);
//! ```

pub mod carrier;
pub mod catalog;
pub mod item;
pub mod model;
pub mod orientation;
pub mod palletizer;
pub mod report;
pub mod search;
pub mod skyline;

// Re-exports
pub use carrier::{Carrier, PRESET_MAX_HEIGHT};
pub use catalog::{Catalog, CatalogStats, CarrierRecord, Ingested, ItemRecord};
pub use item::Item;
pub use model::{Clause, ConstraintModel, ModelItem};
pub use orientation::{admissible_orientations, fitting_orientations};
pub use palletizer::Palletizer;
pub use report::{
    Assignment, CarrierUtilization, CostEstimate, CostModel, LoadMetrics, LogisticsKpis,
    RejectedRecord, SolutionReport, StackingEdge, UnassignedItem, UnassignedReason,
};
pub use search::{SearchEngine, SearchOutcome};
pub use skyline::{validate_layout, Candidate, SkylineResolver};
pub use pallet_core::{Config, Error, Placement, Result, SolutionStatus};

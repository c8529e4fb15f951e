//! # Pallet Core
//!
//! Core types and abstractions for the palletizer optimizer.
//!
//! This crate provides the types shared between the search engine, the
//! placement resolver and the tools built on top of them.
//!
//! ## Core Components
//!
//! - **Geometry**: [`Dimensions`], [`Orientation`] (the six axis permutations)
//! - **Bounding boxes**: [`AABB3D`] with touching-face aware overlap tests
//! - **Placement**: [`Placement`] of an item on a carrier, [`PlacementStats`]
//! - **Solver trait**: [`Solver`], [`Config`] and its policies
//! - **Results**: [`SolutionStatus`], [`relative_gap`], [`SolveSummary`]
//!
//! ## Configuration
//!
//! ```rust
//! use pallet_core::{Config, UnassignedPolicy};
//!
//! let config = Config::new()
//!     .with_time_limit(5000)
//!     .with_threads(4)
//!     .with_unassigned_policy(UnassignedPolicy::Penalty(10.0));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod placement;
pub mod result;
pub mod solver;
pub mod transform;

// Re-exports
pub use error::{Error, RecordKind, Result};
pub use geometry::{CarrierId, Dimensions, ItemId, Orientation, EPSILON};
pub use placement::{Placement, PlacementStats};
pub use result::{relative_gap, SolutionStatus, SolveSummary};
pub use solver::{
    Config, ProgressCallback, ProgressInfo, Solver, TieBreakPolicy, UnassignedPolicy,
    ValidationMode,
};
pub use transform::AABB3D;

//! # Palletizer
//!
//! Priority-weighted pallet loading optimizer.
//!
//! This crate bundles:
//! - **Core types**: configuration, placements, statuses and errors
//! - **Engine**: catalog validation, constraint model, branch-and-bound search
//!   and skyline placement
//!
//! ## Quick Start
//!
//! ```rust
//! use palletizer::engine::{Carrier, Catalog, Item, Palletizer};
//! use palletizer::{Config, Solver};
//!
//! let items = vec![
//!     Item::new(0, 0.4, 0.3, 0.3, 12.0).with_priority(2),
//!     Item::new(1, 0.5, 0.4, 0.2, 8.0),
//! ];
//! let catalog = Catalog::new(items, vec![Carrier::euro(0)])?;
//! let report = Palletizer::new(Config::default()).solve(&catalog)?;
//! println!("{:?}", report.summary());
//! # Ok::<(), palletizer::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support

/// Core traits and abstractions.
pub use pallet_core as core;

/// Loading engine.
pub use pallet_engine as engine;

// Re-export commonly used types at root level
pub use pallet_core::{Config, Error, Placement, Result, SolutionStatus, Solver};
pub use pallet_engine::{Palletizer, SolutionReport};

//! Scenario benchmarks for the palletizer optimizer.
//!
//! This crate provides:
//! - Synthetic item generators for typical shipment profiles
//! - A runner that solves scenarios on pallet setups
//! - Side-by-side comparison of two setups with a recommendation

mod runner;
mod scenario;

pub use runner::{
    load_items, save_json, BenchmarkConfig, BenchmarkRunner, Comparison, PalletPreset,
    PalletSetup, Recommendation, RunResult,
};
pub use scenario::{Profile, Scenario, DESTINATIONS};

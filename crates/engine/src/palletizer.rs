//! Pallet loading solver.

use crate::catalog::{Catalog, CarrierRecord, ItemRecord};
use crate::model::ConstraintModel;
use crate::report::SolutionReport;
use crate::search::{SearchEngine, SearchOutcome};
use crate::skyline::{validate_layout, SkylineResolver};
use pallet_core::{
    Config, Error, Placement, ProgressCallback, ProgressInfo, Result, SolutionStatus, Solver,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Priority-weighted pallet loading solver.
///
/// Builds the constraint model, runs the branch-and-bound search and resolves
/// the final 3D layout of every loaded carrier.
pub struct Palletizer {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl Palletizer {
    /// Creates a new solver with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a solver with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a handle that cancels a running solve when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Validates raw records and solves the resulting catalog.
    ///
    /// Records rejected in lenient mode are carried into the report.
    pub fn solve_records(
        &self,
        items: Vec<ItemRecord>,
        carriers: Vec<CarrierRecord>,
    ) -> Result<SolutionReport> {
        let ingested = Catalog::ingest(items, carriers, self.config.validation_mode)?;
        self.run(&ingested.catalog, ingested.rejected, None)
    }

    fn run(
        &self,
        catalog: &Catalog,
        rejected: Vec<Error>,
        progress: Option<&ProgressCallback>,
    ) -> Result<SolutionReport> {
        self.config.validate()?;
        self.cancelled.store(false, Ordering::Relaxed);
        let start = Instant::now();

        let model = ConstraintModel::build(catalog, self.config.unassigned_policy);
        if model.is_empty() {
            return Err(Error::InfeasibleInput(format!(
                "none of the {} items fits any carrier",
                catalog.items().len()
            )));
        }

        let mut engine =
            SearchEngine::new(catalog, &model, &self.config).with_cancel(&self.cancelled);
        if let Some(callback) = progress {
            engine = engine.with_progress(callback);
        }
        let outcome = engine.run()?;

        let placements = Self::layout(catalog, &model, &outcome)?;
        if outcome.has_solution() {
            let violated = model.layout_violations(&placements);
            if let Some(clause) = violated.first() {
                return Err(Error::Internal(format!(
                    "final layout violates {} clauses, first {:?}",
                    violated.len(),
                    clause
                )));
            }
            log::debug!("Layout satisfies all {} model clauses", model.clauses().len());
        }
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let report =
            SolutionReport::assemble(catalog, &model, &outcome, placements, rejected, elapsed_ms);

        if report.status() == SolutionStatus::Timeout || outcome.cancelled {
            log::warn!(
                "Search stopped early after {} nodes (status {})",
                outcome.nodes_explored,
                report.status()
            );
        }
        log::info!(
            "Solved: status {}, {} of {} items on {} carriers, objective {:.6}, gap {:.2}%, {} ms",
            report.status(),
            report.metrics().items_loaded,
            report.metrics().items_total,
            report.metrics().carriers_used,
            report.objective(),
            report.gap() * 100.0,
            elapsed_ms
        );

        if let Some(callback) = progress {
            callback(
                ProgressInfo::new()
                    .with_nodes(report.nodes_explored())
                    .with_objective(report.objective(), report.upper_bound())
                    .with_items(report.metrics().items_loaded, report.metrics().items_total)
                    .with_elapsed(elapsed_ms)
                    .with_phase("done")
                    .finished(),
            );
        }

        Ok(report)
    }

    /// Resolves the final layout of every loaded carrier.
    fn layout(
        catalog: &Catalog,
        model: &ConstraintModel,
        outcome: &SearchOutcome,
    ) -> Result<Vec<Placement>> {
        let Some(assignment) = &outcome.assignment else {
            return Ok(Vec::new());
        };

        let mut placements = Vec::new();
        for (c, carrier) in model.carriers().iter().enumerate() {
            let items: Vec<usize> = assignment
                .iter()
                .enumerate()
                .filter(|(_, slot)| **slot == Some(c))
                .map(|(i, _)| i)
                .collect();
            if items.is_empty() {
                continue;
            }

            let candidates = model.candidates(catalog, &items, c);
            let layout = SkylineResolver::new(carrier)
                .resolve(&candidates)
                .map_err(|e| {
                    Error::Internal(format!("accepted carrier set lost its layout: {}", e))
                })?;
            debug_assert!(validate_layout(catalog, carrier, &layout).is_ok());
            placements.extend(layout);
        }

        Ok(placements)
    }
}

impl Solver for Palletizer {
    type Input = Catalog;
    type Output = SolutionReport;

    fn solve(&self, catalog: &Catalog) -> Result<SolutionReport> {
        self.run(catalog, Vec::new(), None)
    }

    fn solve_with_progress(
        &self,
        catalog: &Catalog,
        callback: ProgressCallback,
    ) -> Result<SolutionReport> {
        self.run(catalog, Vec::new(), Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

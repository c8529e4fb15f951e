//! Runs scenarios against carrier configurations and compares them.

use crate::scenario::Scenario;
use pallet_core::{Config, SolutionStatus};
use pallet_engine::{
    CarrierRecord, CostEstimate, CostModel, ItemRecord, LogisticsKpis, Palletizer,
    SolutionReport, PRESET_MAX_HEIGHT,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Standard pallet footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PalletPreset {
    /// 1.20 × 1.00 m.
    Pbr,
    /// 1.20 × 0.80 m.
    Euro,
}

impl PalletPreset {
    /// Footprint length and width in metres.
    pub fn footprint(&self) -> (f64, f64) {
        match self {
            Self::Pbr => (1.2, 1.0),
            Self::Euro => (1.2, 0.8),
        }
    }

    /// Default mass limit in kg.
    pub fn max_mass(&self) -> f64 {
        match self {
            Self::Pbr => 1000.0,
            Self::Euro => 800.0,
        }
    }
}

/// A homogeneous fleet of pallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalletSetup {
    /// Footprint preset.
    pub preset: PalletPreset,
    /// Number of pallets.
    pub count: u32,
    /// Mass limit per pallet; the preset's when absent.
    pub max_mass: Option<f64>,
    /// Load height limit per pallet.
    pub max_height: f64,
}

impl PalletSetup {
    /// Creates a setup of `count` pallets with the preset limits.
    pub fn new(preset: PalletPreset, count: u32) -> Self {
        Self {
            preset,
            count,
            max_mass: None,
            max_height: PRESET_MAX_HEIGHT,
        }
    }

    /// Overrides the per-pallet mass limit.
    pub fn with_max_mass(mut self, max_mass: f64) -> Self {
        self.max_mass = Some(max_mass);
        self
    }

    /// Overrides the per-pallet height limit.
    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max_height = max_height;
        self
    }

    /// Carrier records for this setup.
    pub fn carriers(&self) -> Vec<CarrierRecord> {
        let (length, width) = self.preset.footprint();
        let max_mass = self.max_mass.unwrap_or_else(|| self.preset.max_mass());
        (0..self.count)
            .map(|id| CarrierRecord {
                id,
                max_mass,
                max_volume: length * width * self.max_height,
                footprint_length: length,
                footprint_width: width,
                max_height: self.max_height,
            })
            .collect()
    }
}

/// Benchmark configuration.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkConfig {
    /// Solver configuration.
    pub solver: Config,
    /// Cost parameters for the estimate.
    pub costs: CostModel,
}

impl BenchmarkConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit per run in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.solver = self.solver.with_time_limit(ms);
        self
    }

    /// Sets the number of search workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.solver = self.solver.with_threads(threads);
        self
    }

    /// Replaces the solver configuration.
    pub fn with_solver(mut self, solver: Config) -> Self {
        self.solver = solver;
        self
    }

    /// Replaces the cost model.
    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Scenario name, or "file" for external records.
    pub scenario: String,
    /// Pallet setup.
    pub setup: PalletSetup,
    /// Termination status.
    pub status: SolutionStatus,
    /// Objective value.
    pub objective: f64,
    /// Relative optimality gap.
    pub gap: f64,
    /// Items loaded.
    pub items_loaded: usize,
    /// Items offered.
    pub items_total: usize,
    /// Pallets holding at least one item.
    pub carriers_used: usize,
    /// Loaded items resting on another item.
    pub items_stacked: usize,
    /// Highest top face over all pallets in metres.
    pub load_height: f64,
    /// Volume utilization over used pallets, in [0, 1].
    pub volume_utilization: f64,
    /// Mass utilization over used pallets, in [0, 1].
    pub mass_utilization: f64,
    /// Logistics indicators.
    pub kpis: LogisticsKpis,
    /// Cost estimate.
    pub costs: CostEstimate,
    /// Nodes explored by the search.
    pub nodes_explored: u64,
    /// Wall time in milliseconds.
    pub time_ms: u64,
}

impl RunResult {
    fn from_report(
        scenario: &str,
        setup: &PalletSetup,
        report: &SolutionReport,
        costs: &CostModel,
    ) -> Self {
        let metrics = report.metrics();
        let stats = report.placement_stats();
        Self {
            scenario: scenario.to_string(),
            setup: setup.clone(),
            status: report.status(),
            objective: report.objective(),
            gap: report.gap(),
            items_loaded: metrics.items_loaded,
            items_total: metrics.items_total,
            carriers_used: metrics.carriers_used,
            items_stacked: stats.stacked_count,
            load_height: stats.max_height,
            volume_utilization: metrics.volume_utilization,
            mass_utilization: metrics.mass_utilization,
            kpis: report.kpis().clone(),
            costs: costs.estimate(metrics),
            nodes_explored: report.nodes_explored(),
            time_ms: report.elapsed_ms(),
        }
    }

    /// Prints a one-block summary.
    pub fn print_summary(&self) {
        println!("Scenario: {} on {} x {:?}", self.scenario, self.setup.count, self.setup.preset);
        println!("{:-<60}", "");
        println!("  Status:        {}", self.status);
        println!("  Objective:     {:.6} (gap {:.2}%)", self.objective, self.gap * 100.0);
        println!("  Items loaded:  {}/{}", self.items_loaded, self.items_total);
        println!("  Pallets used:  {}", self.carriers_used);
        println!("  Stacked:       {} (top {:.2}m)", self.items_stacked, self.load_height);
        println!("  Volume util:   {:.1}%", self.volume_utilization * 100.0);
        println!("  Mass util:     {:.1}%", self.mass_utilization * 100.0);
        println!("  Est. cost:     {:.2}", self.costs.total);
        println!("  Nodes / time:  {} / {}ms", self.nodes_explored, self.time_ms);
    }
}

/// Which configuration a comparison favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// B loads more items.
    PreferB,
    /// A uses volume better.
    PreferA,
    /// Neither is clearly better.
    Equivalent,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferB => write!(f, "B is superior: it loads more items"),
            Self::PreferA => write!(f, "A has better volume utilization"),
            Self::Equivalent => write!(f, "equivalent: consider other factors"),
        }
    }
}

/// Two runs on the same items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// First configuration.
    pub a: RunResult,
    /// Second configuration.
    pub b: RunResult,
    /// Verdict.
    pub recommendation: Recommendation,
}

impl Comparison {
    /// Compares two runs: more items loaded wins, then higher volume
    /// utilization of A, otherwise equivalent.
    pub fn new(a: RunResult, b: RunResult) -> Self {
        let recommendation = recommend(&a, &b);
        Self { a, b, recommendation }
    }

    /// Prints a side-by-side table.
    pub fn print_summary(&self) {
        println!("{:<24} {:>14} {:>14}", "Metric", "A", "B");
        println!("{:-<54}", "");
        println!(
            "{:<24} {:>14} {:>14}",
            "Pallets used", self.a.carriers_used, self.b.carriers_used
        );
        println!(
            "{:<24} {:>14} {:>14}",
            "Items loaded", self.a.items_loaded, self.b.items_loaded
        );
        println!(
            "{:<24} {:>13.1}% {:>13.1}%",
            "Volume utilization",
            self.a.volume_utilization * 100.0,
            self.b.volume_utilization * 100.0
        );
        println!(
            "{:<24} {:>13.1}% {:>13.1}%",
            "Mass utilization",
            self.a.mass_utilization * 100.0,
            self.b.mass_utilization * 100.0
        );
        println!(
            "{:<24} {:>14.2} {:>14.2}",
            "Estimated cost", self.a.costs.total, self.b.costs.total
        );
        println!("\nRecommendation: {}", self.recommendation);
    }
}

fn recommend(a: &RunResult, b: &RunResult) -> Recommendation {
    if b.items_loaded > a.items_loaded {
        Recommendation::PreferB
    } else if a.volume_utilization > b.volume_utilization {
        Recommendation::PreferA
    } else {
        Recommendation::Equivalent
    }
}

/// Runs the optimizer on generated or external item sets.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Creates a new runner.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Solves `items` on `setup`.
    pub fn run_records(
        &self,
        label: &str,
        items: Vec<ItemRecord>,
        setup: &PalletSetup,
    ) -> pallet_core::Result<(RunResult, SolutionReport)> {
        log::info!("Running {} ({} items) on {} pallets", label, items.len(), setup.count);
        let solver = Palletizer::new(self.config.solver.clone());
        let report = solver.solve_records(items, setup.carriers())?;
        let result = RunResult::from_report(label, setup, &report, &self.config.costs);
        Ok((result, report))
    }

    /// Generates a scenario and solves it on `setup`.
    pub fn run_scenario(
        &self,
        scenario: Scenario,
        count: usize,
        seed: u64,
        setup: &PalletSetup,
    ) -> pallet_core::Result<(RunResult, SolutionReport)> {
        self.run_records(scenario.name(), scenario.generate(count, seed), setup)
    }

    /// Solves the same items on two setups.
    pub fn compare(
        &self,
        label: &str,
        items: Vec<ItemRecord>,
        a: &PalletSetup,
        b: &PalletSetup,
    ) -> pallet_core::Result<Comparison> {
        let (result_a, _) = self.run_records(label, items.clone(), a)?;
        let (result_b, _) = self.run_records(label, items, b)?;
        Ok(Comparison::new(result_a, result_b))
    }
}

/// Reads item records from a JSON array.
pub fn load_items(path: &Path) -> anyhow::Result<Vec<ItemRecord>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes any serializable value as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

//! Palletizer scenario runner CLI

use clap::{Args, Parser, Subcommand, ValueEnum};
use pallet_bench::{
    load_items, save_json, BenchmarkConfig, BenchmarkRunner, PalletPreset, PalletSetup, Scenario,
};
use pallet_engine::{CostModel, ItemRecord};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pallet-bench")]
#[command(about = "Scenario runner for the palletizer optimizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available scenarios
    List,

    /// Solve one scenario (or an item file) on one pallet setup
    Run {
        #[command(flatten)]
        source: Source,

        /// Pallet type
        #[arg(short, long, value_enum, default_value = "pbr")]
        pallet: PresetArg,

        /// Number of pallets
        #[arg(short = 'n', long, default_value = "2")]
        pallets: u32,

        /// Mass limit per pallet in kg
        #[arg(short, long)]
        max_mass: Option<f64>,

        #[command(flatten)]
        solver: SolverArgs,

        /// Output file for the full report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Solve the same items on two pallet setups and compare
    Compare {
        #[command(flatten)]
        source: Source,

        /// Pallet type for both setups
        #[arg(short, long, value_enum, default_value = "pbr")]
        pallet: PresetArg,

        /// Number of pallets in setup A
        #[arg(long, default_value = "2")]
        pallets_a: u32,

        /// Number of pallets in setup B
        #[arg(long, default_value = "3")]
        pallets_b: u32,

        /// Mass limit per pallet in setup A (kg)
        #[arg(long)]
        mass_a: Option<f64>,

        /// Mass limit per pallet in setup B (kg)
        #[arg(long)]
        mass_b: Option<f64>,

        #[command(flatten)]
        solver: SolverArgs,

        /// Output file for the comparison (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct Source {
    /// Scenario to generate
    #[arg(short, long, value_enum, default_value = "standard")]
    scenario: ScenarioArg,

    /// Number of generated items
    #[arg(short, long, default_value = "20")]
    items: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Read item records from a JSON file instead of generating them
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl Source {
    fn load(&self) -> anyhow::Result<(String, Vec<ItemRecord>)> {
        match &self.file {
            Some(path) => Ok((path.display().to_string(), load_items(path)?)),
            None => {
                let scenario = Scenario::from(self.scenario);
                Ok((scenario.to_string(), scenario.generate(self.items, self.seed)))
            }
        }
    }
}

#[derive(Args)]
struct SolverArgs {
    /// Time limit per run in seconds (0 = unlimited)
    #[arg(short, long, default_value = "30")]
    time_limit: u64,

    /// Search workers (0 = all cores)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Transport distance in km for the cost estimate
    #[arg(long, default_value = "100")]
    distance: f64,
}

impl SolverArgs {
    fn config(&self) -> BenchmarkConfig {
        BenchmarkConfig::new()
            .with_time_limit(self.time_limit * 1000)
            .with_threads(self.threads)
            .with_costs(CostModel::default().with_distance(self.distance))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    /// General cargo
    Standard,
    /// Small dense fragile boxes
    Electronics,
    /// Very dense cases
    Beverages,
    /// Large light bales
    Textile,
    /// Tiny fragile packages
    Pharmaceutical,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Standard => Scenario::Standard,
            ScenarioArg::Electronics => Scenario::Electronics,
            ScenarioArg::Beverages => Scenario::Beverages,
            ScenarioArg::Textile => Scenario::Textile,
            ScenarioArg::Pharmaceutical => Scenario::Pharmaceutical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    /// 1.20 x 1.00 m, 1000 kg
    Pbr,
    /// 1.20 x 0.80 m, 800 kg
    Euro,
}

impl From<PresetArg> for PalletPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Pbr => PalletPreset::Pbr,
            PresetArg::Euro => PalletPreset::Euro,
        }
    }
}

fn setup(preset: PresetArg, count: u32, max_mass: Option<f64>) -> PalletSetup {
    let setup = PalletSetup::new(preset.into(), count);
    match max_mass {
        Some(mass) => setup.with_max_mass(mass),
        None => setup,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            println!("Available scenarios:");
            println!("====================");
            for scenario in Scenario::ALL {
                println!("  - {:<16} {}", scenario.name(), scenario.description());
            }
            println!("\nUse 'pallet-bench run -s <SCENARIO>' to solve one");
        }

        Commands::Run {
            source,
            pallet,
            pallets,
            max_mass,
            solver,
            output,
        } => {
            let (label, items) = source.load()?;
            let setup = setup(pallet, pallets, max_mass);
            let runner = BenchmarkRunner::new(solver.config());

            let (result, report) = runner.run_records(&label, items, &setup)?;
            result.print_summary();

            for rejected in report.rejected() {
                eprintln!("  rejected {:?} {}: {}", rejected.kind, rejected.id, rejected.reason);
            }
            for item in report.unassigned() {
                println!("  unassigned item {}: {:?}", item.item, item.reason);
            }

            if let Some(path) = output {
                save_json(&report, &path)?;
                println!("Report saved to: {}", path.display());
            }
        }

        Commands::Compare {
            source,
            pallet,
            pallets_a,
            pallets_b,
            mass_a,
            mass_b,
            solver,
            output,
        } => {
            let (label, items) = source.load()?;
            let a = setup(pallet, pallets_a, mass_a);
            let b = setup(pallet, pallets_b, mass_b);
            let runner = BenchmarkRunner::new(solver.config());

            let comparison = runner.compare(&label, items, &a, &b)?;
            comparison.print_summary();

            if let Some(path) = output {
                save_json(&comparison, &path)?;
                println!("Comparison saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

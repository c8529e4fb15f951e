//! Synthetic item catalogs modelled on typical shipment profiles.

use pallet_engine::ItemRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Destinations assigned to generated items.
pub const DESTINATIONS: [&str; 4] = ["São Paulo", "Rio de Janeiro", "Belo Horizonte", "Salvador"];

/// A shipment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// General cargo.
    Standard,
    /// Small, dense and mostly fragile boxes.
    Electronics,
    /// Very dense cases that rarely rotate.
    Beverages,
    /// Large, light and freely rotatable bales.
    Textile,
    /// Tiny, mostly fragile packages.
    Pharmaceutical,
}

/// Sampling ranges of a scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    /// Density range in kg/m³.
    pub density: (f64, f64),
    /// Length range in metres.
    pub length: (f64, f64),
    /// Width range in metres.
    pub width: (f64, f64),
    /// Height range in metres.
    pub height: (f64, f64),
    /// Probability that an item is fragile.
    pub fragile_probability: f64,
    /// Probability that an item may rotate.
    pub rotatable_probability: f64,
}

impl Scenario {
    /// All scenarios.
    pub const ALL: [Scenario; 5] = [
        Scenario::Standard,
        Scenario::Electronics,
        Scenario::Beverages,
        Scenario::Textile,
        Scenario::Pharmaceutical,
    ];

    /// Short name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Electronics => "electronics",
            Self::Beverages => "beverages",
            Self::Textile => "textile",
            Self::Pharmaceutical => "pharmaceutical",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "general cargo, 200-500 kg/m³",
            Self::Electronics => "small dense boxes, 70% fragile",
            Self::Beverages => "very dense cases, 20% rotatable",
            Self::Textile => "large light bales, 90% rotatable",
            Self::Pharmaceutical => "tiny packages, 80% fragile",
        }
    }

    /// Sampling ranges.
    pub fn profile(&self) -> Profile {
        let (density, length, width, height) = match self {
            Self::Standard => ((200.0, 500.0), (0.4, 0.8), (0.3, 0.6), (0.3, 0.6)),
            Self::Electronics => ((300.0, 800.0), (0.2, 0.5), (0.2, 0.4), (0.1, 0.3)),
            Self::Beverages => ((800.0, 1200.0), (0.3, 0.4), (0.2, 0.3), (0.2, 0.3)),
            Self::Textile => ((100.0, 300.0), (0.5, 1.0), (0.4, 0.8), (0.2, 0.5)),
            Self::Pharmaceutical => ((200.0, 600.0), (0.1, 0.3), (0.1, 0.2), (0.05, 0.15)),
        };
        let fragile_probability = match self {
            Self::Electronics => 0.7,
            Self::Pharmaceutical => 0.8,
            _ => 0.3,
        };
        let rotatable_probability = match self {
            Self::Textile => 0.9,
            Self::Beverages => 0.2,
            _ => 0.5,
        };
        Profile {
            density,
            length,
            width,
            height,
            fragile_probability,
            rotatable_probability,
        }
    }

    /// Generates `count` item records, reproducible by `seed`.
    pub fn generate(&self, count: usize, seed: u64) -> Vec<ItemRecord> {
        let profile = self.profile();
        let mut rng = StdRng::seed_from_u64(seed);

        (0..count)
            .map(|i| {
                let length = centimetres(rng.gen_range(profile.length.0..=profile.length.1));
                let width = centimetres(rng.gen_range(profile.width.0..=profile.width.1));
                let height = centimetres(rng.gen_range(profile.height.0..=profile.height.1));
                let density = rng.gen_range(profile.density.0..=profile.density.1);
                let mass = length * width * height * density;

                ItemRecord {
                    id: i as u32,
                    length,
                    width,
                    height,
                    mass,
                    fragile: rng.gen_bool(profile.fragile_probability),
                    rotatable: rng.gen_bool(profile.rotatable_probability),
                    priority: rng.gen_range(1..=5),
                    destination: Some(
                        DESTINATIONS[rng.gen_range(0..DESTINATIONS.len())].to_string(),
                    ),
                }
            })
            .collect()
    }
}

fn centimetres(metres: f64) -> f64 {
    (metres * 100.0).round() / 100.0
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown scenario '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducible() {
        let a = Scenario::Electronics.generate(20, 7);
        let b = Scenario::Electronics.generate(20, 7);
        let c = Scenario::Electronics.generate(20, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ranges() {
        for scenario in Scenario::ALL {
            let profile = scenario.profile();
            for record in scenario.generate(50, 1) {
                assert!(record.length >= profile.length.0 - 0.005);
                assert!(record.length <= profile.length.1 + 0.005);
                assert!(record.height >= profile.height.0 - 0.005);
                assert!(record.height <= profile.height.1 + 0.005);
                assert!((1..=5).contains(&record.priority));
                assert!(record.mass > 0.0);
                assert!(record.into_item().is_ok());
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Textile".parse::<Scenario>(), Ok(Scenario::Textile));
        assert_eq!(Scenario::Beverages.to_string(), "beverages");
        assert!("furniture".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_ids_are_sequential() {
        let records = Scenario::Standard.generate(10, 3);
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }
}

//! Integration tests for pallet-core.

use nalgebra::Vector3;
use pallet_core::geometry::{Dimensions, Orientation};
use pallet_core::placement::{Placement, PlacementStats};
use pallet_core::result::{relative_gap, SolutionStatus};
use pallet_core::solver::{Config, ProgressInfo, TieBreakPolicy, UnassignedPolicy};
use pallet_core::transform::AABB3D;
use pallet_core::Error;

mod orientation_tests {
    use super::*;

    #[test]
    fn test_all_orientations_preserve_volume() {
        let dims = Dimensions::new(0.6, 0.4, 0.25);
        for orientation in Orientation::ALL {
            let oriented = orientation.apply(&dims);
            assert!((oriented.volume() - dims.volume()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_orientations_are_distinct_permutations() {
        let dims = Dimensions::new(1.0, 2.0, 3.0);
        let mut seen: Vec<(u64, u64, u64)> = Orientation::ALL
            .iter()
            .map(|o| {
                let d = o.apply(&dims);
                (d.length as u64, d.width as u64, d.height as u64)
            })
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, orientation) in Orientation::ALL.iter().enumerate() {
            assert_eq!(orientation.index(), i);
        }
        assert!(Orientation::default().is_identity());
    }
}

mod aabb_tests {
    use super::*;

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = AABB3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let beside = AABB3D::new(1.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let above = AABB3D::new(0.0, 0.0, 1.0, 1.0, 1.0, 2.0);

        assert!(!a.overlaps(&beside, 1e-9));
        assert!(!a.overlaps(&above, 1e-9));
        assert!(a.footprint_contains(&above, 1e-9));
    }

    #[test]
    fn test_overlap_and_bounds() {
        let a: AABB3D<f64> = AABB3D::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let b: AABB3D<f64> = AABB3D::new(0.5, 0.5, 0.5, 1.5, 1.5, 1.5);

        assert!(a.overlaps(&b, 1e-9));
        assert!((b.volume() - 1.0).abs() < 1e-12);
        assert!(b.within(1.5, 1.5, 1.5, 1e-9));
        assert!(!b.within(1.0, 1.5, 1.5, 1e-9));
    }
}

mod placement_tests {
    use super::*;

    #[test]
    fn test_placement_box() {
        let dims = Orientation::Hwl.apply(&Dimensions::new(0.6, 0.4, 0.2));
        let placement = Placement::new(
            3,
            1,
            Orientation::Hwl,
            Vector3::new(0.1, 0.2, 0.5),
            dims,
        )
        .with_support(Some(7));

        let aabb = placement.aabb();
        assert!((aabb.length() - 0.2).abs() < 1e-12);
        assert!((aabb.height() - 0.6).abs() < 1e-12);
        assert!((placement.top() - 1.1).abs() < 1e-12);
        assert!(!placement.is_on_floor());
    }

    #[test]
    fn test_placement_stats_computation() {
        let dims = Dimensions::new(0.5, 0.5, 0.5);
        let placements = vec![
            Placement::new(0, 0, Orientation::Lwh, Vector3::zeros(), dims),
            Placement::new(1, 0, Orientation::Lwh, Vector3::new(0.0, 0.0, 0.5), dims)
                .with_support(Some(0)),
            Placement::new(2, 1, Orientation::Wlh, Vector3::zeros(), dims),
        ];

        let stats = PlacementStats::from_placements(&placements);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.stacked_count, 1);
        assert!((stats.max_height - 1.0).abs() < 1e-12);
        assert_eq!(stats.orientation_distribution.get(&Orientation::Lwh), Some(&2));
        assert_eq!(stats.carrier_distribution.get(&0), Some(&2));
        assert_eq!(stats.carrier_distribution.get(&1), Some(&1));
    }
}

mod solver_config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.unassigned_policy, UnassignedPolicy::Allow);
        assert_eq!(
            config.tie_break_policy,
            TieBreakPolicy::FewestCarriersThenLowestId
        );
        assert!(config.symmetry_breaking);
        assert!(config.worker_count() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unlimited_time() {
        let config = Config::new().with_time_limit(0);
        assert!(config.time_budget().is_none());
    }

    #[test]
    fn test_invalid_penalty() {
        let config = Config::new().with_unassigned_policy(UnassignedPolicy::Penalty(f64::NAN));
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_progress_gap() {
        let info = ProgressInfo::new().with_objective(8.0, 10.0).finished();
        assert!((info.gap() - 0.2).abs() < 1e-12);
        assert!(!info.running);
    }
}

mod result_tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(SolutionStatus::Optimal.has_solution());
        assert!(SolutionStatus::Feasible.has_solution());
        assert!(!SolutionStatus::Timeout.has_solution());
        assert!(!SolutionStatus::Infeasible.has_solution());
        assert_eq!(SolutionStatus::Feasible.to_string(), "Feasible");
    }

    #[test]
    fn test_gap_never_negative() {
        assert_eq!(relative_gap(12.0, 10.0), 0.0);
        assert!(relative_gap(5.0, 10.0) > 0.0);
        assert!(relative_gap(-100.0, 10.0) <= 1.0);
    }
}

//! Orientation generator.
//!
//! Produces the admissible orientations of an item and filters them against a
//! carrier's usable space.

use crate::carrier::Carrier;
use crate::item::Item;
use pallet_core::{Dimensions, Orientation, EPSILON};

/// Returns the admissible orientations of an item.
///
/// Non-rotatable items only admit the identity. For rotatable items every
/// permutation is returned once per distinct oriented box, so a cube yields a
/// single orientation.
pub fn admissible_orientations(item: &Item) -> Vec<Orientation> {
    if !item.is_rotatable() {
        return vec![Orientation::Lwh];
    }

    let dims = item.dimensions();
    let mut seen: Vec<Dimensions> = Vec::with_capacity(6);
    let mut result = Vec::with_capacity(6);

    for orientation in Orientation::ALL {
        let oriented = orientation.apply(dims);
        if seen.iter().any(|d| same_box(d, &oriented)) {
            continue;
        }
        seen.push(oriented);
        result.push(orientation);
    }

    result
}

/// Returns the admissible orientations whose oriented box fits the carrier's
/// footprint and maximum height.
pub fn fitting_orientations(item: &Item, carrier: &Carrier) -> Vec<Orientation> {
    admissible_orientations(item)
        .into_iter()
        .filter(|o| carrier.fits(&o.apply(item.dimensions())))
        .collect()
}

fn same_box(a: &Dimensions, b: &Dimensions) -> bool {
    (a.length - b.length).abs() < EPSILON
        && (a.width - b.width).abs() < EPSILON
        && (a.height - b.height).abs() < EPSILON
}

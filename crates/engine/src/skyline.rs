//! Skyline placement resolver.
//!
//! Places the items assigned to one carrier on top surfaces: the carrier floor
//! and the top face of every item placed so far. Each item rests either on the
//! floor or entirely inside the top face of exactly one other item, so the
//! supporting relation is a forest by construction.
//!
//! # Algorithm
//!
//! Items are taken in descending order of their largest footprint area, then
//! descending mass, then ascending id. For each item every surface, candidate
//! corner and orientation is tried and the lowest position wins (z, then x,
//! then y, then orientation index). Candidate corners on a surface are its own
//! min corner and the max faces of already placed boxes.
//!
//! If an item cannot be placed, the whole carrier is retried once with fragile
//! items last before the carrier is reported as infeasible.

use crate::carrier::Carrier;
use crate::catalog::Catalog;
use crate::item::Item;
use nalgebra::Vector3;
use pallet_core::{
    CarrierId, Dimensions, Error, ItemId, Orientation, Placement, Result, AABB3D, EPSILON,
};
use std::cmp::Ordering;

/// An item to place together with the orientations it may take.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The item.
    pub item: &'a Item,
    /// Allowed orientations, never empty.
    pub orientations: &'a [Orientation],
}

impl Candidate<'_> {
    fn best_area(&self) -> f64 {
        self.orientations
            .iter()
            .map(|o| o.apply(self.item.dimensions()).base_area())
            .fold(0.0, f64::max)
    }
}

/// A horizontal surface items can rest on.
#[derive(Debug, Clone, Copy)]
struct Surface {
    z: f64,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    /// Index of the supporting box in the layout, `None` for the floor.
    support: Option<usize>,
}

/// Position chosen for an item: ordering key plus what to record.
#[derive(Debug, Clone, Copy)]
struct Spot {
    position: Vector3<f64>,
    orientation: Orientation,
    dimensions: Dimensions,
    support: Option<usize>,
}

impl Spot {
    fn cmp_key(&self, other: &Spot) -> Ordering {
        self.position
            .z
            .total_cmp(&other.position.z)
            .then_with(|| self.position.x.total_cmp(&other.position.x))
            .then_with(|| self.position.y.total_cmp(&other.position.y))
            .then_with(|| self.orientation.cmp(&other.orientation))
    }
}

/// Incremental layout of one carrier.
struct Layout<'a> {
    carrier: &'a Carrier,
    placed: Vec<(Placement, &'a Item)>,
    boxes: Vec<AABB3D<f64>>,
    surfaces: Vec<Surface>,
}

impl<'a> Layout<'a> {
    fn new(carrier: &'a Carrier) -> Self {
        let floor = Surface {
            z: 0.0,
            min_x: 0.0,
            min_y: 0.0,
            max_x: carrier.footprint_length(),
            max_y: carrier.footprint_width(),
            support: None,
        };
        Self {
            carrier,
            placed: Vec::new(),
            boxes: Vec::new(),
            surfaces: vec![floor],
        }
    }

    fn find_spot(&self, candidate: &Candidate<'_>) -> Option<Spot> {
        let mut best: Option<Spot> = None;

        for surface in &self.surfaces {
            if let Some(b) = &best {
                if surface.z > b.position.z + EPSILON {
                    break;
                }
            }

            if let Some(idx) = surface.support {
                if !candidate.item.may_rest_on(self.placed[idx].1) {
                    continue;
                }
            }

            for &orientation in candidate.orientations {
                let dims = orientation.apply(candidate.item.dimensions());
                if let Some(spot) = self.first_fit(surface, orientation, dims) {
                    if best.map_or(true, |b| spot.cmp_key(&b) == Ordering::Less) {
                        best = Some(spot);
                    }
                }
            }
        }

        best
    }

    /// Lowest-x, then lowest-y legal corner of `dims` on `surface`.
    fn first_fit(
        &self,
        surface: &Surface,
        orientation: Orientation,
        dims: Dimensions,
    ) -> Option<Spot> {
        if surface.z + dims.height > self.carrier.max_height() + EPSILON
            || surface.max_x - surface.min_x + EPSILON < dims.length
            || surface.max_y - surface.min_y + EPSILON < dims.width
        {
            return None;
        }

        let xs = candidate_coords(
            surface.min_x,
            surface.max_x - dims.length,
            self.boxes.iter().map(|b| b.max_x),
        );
        let ys = candidate_coords(
            surface.min_y,
            surface.max_y - dims.width,
            self.boxes.iter().map(|b| b.max_y),
        );

        let size = Vector3::new(dims.length, dims.width, dims.height);
        for &x in &xs {
            for &y in &ys {
                let position = Vector3::new(x, y, surface.z);
                let aabb = AABB3D::from_corner(&position, &size);
                if self.boxes.iter().any(|b| b.overlaps(&aabb, EPSILON)) {
                    continue;
                }
                return Some(Spot {
                    position,
                    orientation,
                    dimensions: dims,
                    support: surface.support,
                });
            }
        }

        None
    }

    fn place(&mut self, item: &'a Item, spot: Spot) {
        let supported_by = spot.support.map(|idx| self.placed[idx].0.item);
        let placement = Placement::new(
            item.id(),
            self.carrier.id(),
            spot.orientation,
            spot.position,
            spot.dimensions,
        )
        .with_support(supported_by);

        let aabb = placement.aabb();
        let top = Surface {
            z: aabb.max_z,
            min_x: aabb.min_x,
            min_y: aabb.min_y,
            max_x: aabb.max_x,
            max_y: aabb.max_y,
            support: Some(self.placed.len()),
        };

        self.boxes.push(aabb);
        self.placed.push((placement, item));

        let at = self
            .surfaces
            .partition_point(|s| s.z <= top.z + EPSILON);
        self.surfaces.insert(at, top);
    }

    fn into_placements(self) -> Vec<Placement> {
        self.placed.into_iter().map(|(p, _)| p).collect()
    }
}

/// Sorted, deduplicated coordinates in `[lo, hi]`: `lo` plus every `extra`
/// value inside the range.
fn candidate_coords(lo: f64, hi: f64, extra: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut coords = vec![lo];
    coords.extend(extra.filter(|v| *v > lo + EPSILON && *v <= hi + EPSILON));
    coords.sort_by(f64::total_cmp);
    coords.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
    coords
}

/// Deterministic placement resolver for a single carrier.
#[derive(Debug, Clone, Copy)]
pub struct SkylineResolver<'a> {
    carrier: &'a Carrier,
}

impl<'a> SkylineResolver<'a> {
    /// Creates a resolver for a carrier.
    pub fn new(carrier: &'a Carrier) -> Self {
        Self { carrier }
    }

    /// Places every candidate on the carrier.
    ///
    /// Returns the placements in placement order (every supporting item comes
    /// before the items resting on it), or [`Error::Placement`] naming the
    /// first item that could not be placed.
    pub fn resolve(&self, candidates: &[Candidate<'_>]) -> Result<Vec<Placement>> {
        let mut primary: Vec<&Candidate<'_>> = candidates.iter().collect();
        primary.sort_by(|a, b| {
            b.best_area()
                .total_cmp(&a.best_area())
                .then_with(|| b.item.mass().total_cmp(&a.item.mass()))
                .then_with(|| a.item.id().cmp(&b.item.id()))
        });

        let failed = match self.pack(&primary) {
            Ok(placements) => return Ok(placements),
            Err(item) => item,
        };

        let mut fallback = primary.clone();
        fallback.sort_by(|a, b| {
            a.item
                .is_fragile()
                .cmp(&b.item.is_fragile())
                .then_with(|| b.item.mass().total_cmp(&a.item.mass()))
                .then_with(|| b.best_area().total_cmp(&a.best_area()))
                .then_with(|| a.item.id().cmp(&b.item.id()))
        });

        if fallback
            .iter()
            .zip(&primary)
            .any(|(a, b)| a.item.id() != b.item.id())
        {
            if let Ok(placements) = self.pack(&fallback) {
                return Ok(placements);
            }
        }

        Err(Error::Placement {
            carrier: self.carrier.id(),
            item: failed,
            reason: format!(
                "no legal position among {} items on a {:.3}x{:.3}x{:.3} space",
                candidates.len(),
                self.carrier.footprint_length(),
                self.carrier.footprint_width(),
                self.carrier.max_height()
            ),
        })
    }

    fn pack(&self, order: &[&Candidate<'_>]) -> std::result::Result<Vec<Placement>, ItemId> {
        let mut layout = Layout::new(self.carrier);
        for candidate in order {
            match layout.find_spot(candidate) {
                Some(spot) => layout.place(candidate.item, spot),
                None => return Err(candidate.item.id()),
            }
        }
        Ok(layout.into_placements())
    }
}

/// Re-checks every layout invariant of the placements on one carrier:
/// bounds, capacity, pairwise non-overlap and the stacking rules.
pub fn validate_layout(
    catalog: &Catalog,
    carrier: &Carrier,
    placements: &[Placement],
) -> Result<()> {
    let violation = |item: ItemId, reason: String| Error::Placement {
        carrier: carrier.id(),
        item,
        reason,
    };

    let mut mass = 0.0;
    let mut volume = 0.0;

    for (idx, p) in placements.iter().enumerate() {
        let item = catalog
            .item(p.item)
            .ok_or_else(|| violation(p.item, "unknown item".into()))?;

        if p.carrier != carrier.id() {
            return Err(violation(p.item, format!("placed on carrier {}", p.carrier)));
        }

        let aabb = p.aabb();
        if aabb.min_x < -EPSILON
            || aabb.min_y < -EPSILON
            || aabb.min_z < -EPSILON
            || !aabb.within(
                carrier.footprint_length(),
                carrier.footprint_width(),
                carrier.max_height(),
                EPSILON,
            )
        {
            return Err(violation(p.item, "outside the carrier space".into()));
        }

        for other in &placements[idx + 1..] {
            if aabb.overlaps(&other.aabb(), EPSILON) {
                return Err(violation(p.item, format!("overlaps item {}", other.item)));
            }
        }

        match p.supported_by {
            None if p.z().abs() > EPSILON => {
                return Err(violation(p.item, "floating above the floor".into()));
            }
            None => {}
            Some(lower_id) => {
                check_support(catalog, carrier.id(), placements, p, item, lower_id)
                    .map_err(|reason| violation(p.item, reason))?;
            }
        }

        mass += item.mass();
        volume += item.volume();
    }

    if mass > carrier.max_mass() + EPSILON {
        return Err(Error::Internal(format!(
            "carrier {} mass {:.3} exceeds {:.3}",
            carrier.id(),
            mass,
            carrier.max_mass()
        )));
    }
    if volume > carrier.max_volume() + EPSILON {
        return Err(Error::Internal(format!(
            "carrier {} volume {:.6} exceeds {:.6}",
            carrier.id(),
            volume,
            carrier.max_volume()
        )));
    }

    Ok(())
}

fn check_support(
    catalog: &Catalog,
    carrier: CarrierId,
    placements: &[Placement],
    upper: &Placement,
    upper_item: &Item,
    lower_id: ItemId,
) -> std::result::Result<(), String> {
    let lower = placements
        .iter()
        .find(|p| p.item == lower_id && p.carrier == carrier)
        .ok_or_else(|| format!("supporter {} is not on the carrier", lower_id))?;
    let lower_item = catalog
        .item(lower_id)
        .ok_or_else(|| format!("unknown supporter {}", lower_id))?;

    if lower_item.is_fragile() {
        return Err(format!("rests on fragile item {}", lower_id));
    }
    if upper_item.mass() > lower_item.mass() {
        return Err(format!("heavier than supporter {}", lower_id));
    }
    if (upper.z() - lower.top()).abs() > EPSILON {
        return Err(format!("not on the top face of {}", lower_id));
    }
    if !lower.aabb().footprint_contains(&upper.aabb(), EPSILON) {
        return Err(format!("base overhangs supporter {}", lower_id));
    }
    Ok(())
}

//! Branch-and-bound search engine.
//!
//! Items are decided one at a time in descending priority·volume order. Each
//! decision either puts the item on a carrier or leaves it unassigned, so every
//! node whose carriers all have a layout is itself a feasible solution and the
//! best one seen so far (the incumbent) can be returned whenever the search is
//! interrupted.
//!
//! # Propagation
//!
//! At every node the residual mass and volume of each carrier are known. The
//! optimistic completion is the smallest of:
//!
//! 1. the value of every remaining item that still fits some carrier,
//! 2. a fractional knapsack of those items over the pooled residual volume,
//! 3. the same over the pooled residual mass.
//!
//! # Geometry
//!
//! Adding an item to a carrier runs the [`SkylineResolver`] on the carrier's
//! new item set. A failing set becomes a nogood for its carrier class; the
//! verdict is cached for that exact set only. The resolver is not monotone, so
//! a larger set may still pack: a node with a failing carrier is expanded
//! further but never becomes the incumbent.
//!
//! # Parallelism
//!
//! The root is expanded breadth-first into a shared queue; workers then take
//! nodes from the queue and explore them depth-first on a private stack. The
//! queue and the incumbent are the only shared state.

use crate::catalog::Catalog;
use crate::model::{ConstraintModel, ModelItem};
use crate::skyline::SkylineResolver;
use pallet_core::{
    Config, Error, ItemId, ProgressCallback, ProgressInfo, Result, TieBreakPolicy, EPSILON,
};
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Queued nodes per worker before the parallel phase starts.
const NODES_PER_WORKER: usize = 4;

/// Relative tolerance for objective comparisons.
const OBJECTIVE_TOLERANCE: f64 = 1e-9;

fn tolerance(objective: f64) -> f64 {
    OBJECTIVE_TOLERANCE * objective.abs().max(1.0)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Carrier index per model item, `None` if no acceptable solution was
    /// found.
    pub assignment: Option<Vec<Option<usize>>>,
    /// Objective of the returned assignment (0 without one).
    pub objective: f64,
    /// Upper bound on the optimum.
    pub upper_bound: f64,
    /// Number of expanded nodes.
    pub nodes_explored: u64,
    /// Number of nogoods recorded.
    pub nogoods: usize,
    /// True if the whole tree was explored or pruned.
    pub exhausted: bool,
    /// True if the search stopped because of the cancel flag.
    pub cancelled: bool,
}

impl SearchOutcome {
    /// Returns true if an assignment was found.
    pub fn has_solution(&self) -> bool {
        self.assignment.is_some()
    }

    /// Relative optimality gap of the outcome.
    pub fn gap(&self) -> f64 {
        pallet_core::relative_gap(self.objective, self.upper_bound)
    }
}

/// A partial assignment: the first `depth` items of the search order are
/// decided, the rest are unassigned.
#[derive(Debug, Clone)]
struct Node {
    depth: usize,
    assignment: Vec<Option<usize>>,
    mass: Vec<f64>,
    volume: Vec<f64>,
    counts: Vec<usize>,
    value: f64,
    unassigned: usize,
    broken: Vec<bool>,
    bound: f64,
}

impl Node {
    fn root(items: usize, carriers: usize) -> Self {
        Self {
            depth: 0,
            assignment: vec![None; items],
            mass: vec![0.0; carriers],
            volume: vec![0.0; carriers],
            counts: vec![0; carriers],
            value: 0.0,
            unassigned: 0,
            broken: vec![false; carriers],
            bound: f64::INFINITY,
        }
    }

    fn items_on(&self, carrier: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Some(carrier))
            .map(|(i, _)| i)
            .collect()
    }

    fn carriers_used(&self) -> usize {
        self.counts.iter().filter(|&&n| n > 0).count()
    }

    fn assigned(&self) -> usize {
        self.assignment.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Best solution seen so far.
#[derive(Debug, Clone)]
struct Incumbent {
    objective: f64,
    carriers_used: usize,
    sequence: Vec<(ItemId, usize)>,
    assignment: Vec<Option<usize>>,
}

impl Incumbent {
    fn from_node(node: &Node, objective: f64, items: &[ModelItem]) -> Self {
        let mut sequence: Vec<(ItemId, usize)> = node
            .assignment
            .iter()
            .zip(items)
            .filter_map(|(slot, item)| slot.map(|c| (item.id, c)))
            .collect();
        sequence.sort_unstable();

        Self {
            objective,
            carriers_used: node.carriers_used(),
            sequence,
            assignment: node.assignment.clone(),
        }
    }

    /// Strict improvement under the tie-break order.
    fn beats(&self, other: &Incumbent, policy: TieBreakPolicy) -> bool {
        let tol = tolerance(other.objective);
        if self.objective > other.objective + tol {
            return true;
        }
        if self.objective < other.objective - tol {
            return false;
        }
        if policy == TieBreakPolicy::FewestCarriersThenLowestId
            && self.carriers_used != other.carriers_used
        {
            return self.carriers_used < other.carriers_used;
        }
        self.sequence < other.sequence
    }
}

/// Shared state and precomputed orderings of one search run.
struct Shared<'a> {
    catalog: &'a Catalog,
    model: &'a ConstraintModel,
    tie_break: TieBreakPolicy,
    symmetry_breaking: bool,
    forbid: bool,
    penalty: f64,
    order: Vec<usize>,
    by_volume_density: Vec<usize>,
    by_mass_density: Vec<usize>,
    incumbent: Mutex<Option<Incumbent>>,
    best_bits: AtomicU64,
    queue: Mutex<VecDeque<Node>>,
    nodes: AtomicU64,
    stop: AtomicBool,
    cancel: &'a AtomicBool,
    max_nodes: Option<u64>,
    deadline: Option<Instant>,
    start: Instant,
    root_bound: AtomicU64,
    progress: Option<&'a ProgressCallback>,
}

impl Shared<'_> {
    fn gain(&self, item: usize) -> f64 {
        self.model.items()[item].value + self.penalty
    }

    fn best_objective(&self) -> f64 {
        f64::from_bits(self.best_bits.load(Ordering::Acquire))
    }

    fn prunable(&self, bound: f64) -> bool {
        if bound == f64::NEG_INFINITY {
            return true;
        }
        let best = self.best_objective();
        best.is_finite() && bound < best - tolerance(best)
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        let exceeded = self.cancel.load(Ordering::Relaxed)
            || self
                .max_nodes
                .is_some_and(|max| self.nodes.load(Ordering::Relaxed) >= max)
            || self.deadline.is_some_and(|d| Instant::now() >= d);
        if exceeded {
            self.stop.store(true, Ordering::Relaxed);
        }
        exceeded
    }

    fn fits_somewhere(&self, node: &Node, item: &ModelItem) -> bool {
        let carriers = self.model.carriers();
        item.domain.iter().any(|&c| {
            node.mass[c] + item.mass <= carriers[c].max_mass() + EPSILON
                && node.volume[c] + item.volume <= carriers[c].max_volume() + EPSILON
        })
    }

    /// Objective so far plus an optimistic completion.
    fn bound(&self, node: &Node) -> f64 {
        let items = self.model.items();
        let remaining = self.order.len() - node.depth;
        let base = self.model.objective(node.value, node.unassigned + remaining);
        if remaining == 0 {
            return base;
        }

        let mut fitting = vec![false; items.len()];
        let mut direct = 0.0;
        for &i in &self.order[node.depth..] {
            if self.fits_somewhere(node, &items[i]) {
                fitting[i] = true;
                direct += self.gain(i);
            } else if self.forbid {
                return f64::NEG_INFINITY;
            }
        }

        let carriers = self.model.carriers();
        let pooled_volume: f64 = carriers
            .iter()
            .zip(&node.volume)
            .map(|(c, used)| (c.max_volume() - used).max(0.0))
            .sum();
        let pooled_mass: f64 = carriers
            .iter()
            .zip(&node.mass)
            .map(|(c, used)| (c.max_mass() - used).max(0.0))
            .sum();

        let by_volume =
            self.fractional(&self.by_volume_density, &fitting, pooled_volume, |i| i.volume);
        let by_mass = self.fractional(&self.by_mass_density, &fitting, pooled_mass, |i| i.mass);

        base + direct.min(by_volume).min(by_mass)
    }

    fn fractional(
        &self,
        ranked: &[usize],
        fitting: &[bool],
        mut capacity: f64,
        weight: impl Fn(&ModelItem) -> f64,
    ) -> f64 {
        let mut total = 0.0;
        for &i in ranked.iter().filter(|&&i| fitting[i]) {
            let w = weight(&self.model.items()[i]);
            if w <= capacity {
                total += self.gain(i);
                capacity -= w;
            } else {
                total += self.gain(i) * capacity / w;
                break;
            }
        }
        total
    }

    /// Computes the node's bound and offers it as a solution. Returns true if
    /// the node still needs expanding.
    fn admit(&self, node: &mut Node) -> bool {
        node.bound = self.bound(node);
        if self.prunable(node.bound) {
            return false;
        }
        self.offer(node);
        node.depth < self.order.len()
    }

    fn offer(&self, node: &Node) {
        if node.broken.iter().any(|&b| b) {
            return;
        }
        let complete = node.depth == self.order.len();
        if self.forbid && !(complete && node.unassigned == 0) {
            return;
        }

        let remaining = self.order.len() - node.depth;
        let objective = self
            .model
            .objective(node.value, node.unassigned + remaining);
        if self.prunable(objective) {
            return;
        }

        let candidate = Incumbent::from_node(node, objective, self.model.items());
        let mut guard = lock(&self.incumbent);
        let improves = match guard.as_ref() {
            None => true,
            Some(current) => candidate.beats(current, self.tie_break),
        };
        if !improves {
            return;
        }

        log::debug!(
            "New incumbent: objective {:.6}, {} items on {} carriers",
            objective,
            node.assigned(),
            candidate.carriers_used
        );
        self.best_bits.store(objective.to_bits(), Ordering::Release);
        *guard = Some(candidate);
        drop(guard);

        if let Some(callback) = self.progress {
            callback(
                ProgressInfo::new()
                    .with_nodes(self.nodes.load(Ordering::Relaxed))
                    .with_objective(
                        objective,
                        f64::from_bits(self.root_bound.load(Ordering::Relaxed)),
                    )
                    .with_items(node.assigned(), self.order.len())
                    .with_elapsed(self.start.elapsed().as_millis() as u64)
                    .with_phase("search"),
            );
        }
    }
}

/// Per-worker resolver cache.
struct Worker<'s, 'a> {
    shared: &'s Shared<'a>,
    feasible: HashMap<(usize, Vec<usize>), bool>,
    nogood_count: usize,
}

/// What a worker leaves behind.
struct WorkerReport {
    leftover: usize,
    leftover_bound: f64,
    nogoods: usize,
}

impl<'s, 'a> Worker<'s, 'a> {
    fn new(shared: &'s Shared<'a>) -> Self {
        Self {
            shared,
            feasible: HashMap::new(),
            nogood_count: 0,
        }
    }

    /// Children of `node` in branch order: carriers in domain order, then
    /// unassigned.
    fn expand(&mut self, node: &Node) -> Vec<Node> {
        let shared = self.shared;
        let model = shared.model;
        let idx = shared.order[node.depth];
        let item = &model.items()[idx];
        let mut children = Vec::new();

        for &c in &item.domain {
            let carrier = &model.carriers()[c];
            if node.mass[c] + item.mass > carrier.max_mass() + EPSILON
                || node.volume[c] + item.volume > carrier.max_volume() + EPSILON
            {
                continue;
            }

            if shared.symmetry_breaking && node.counts[c] == 0 {
                let class = model.symmetry_class(c);
                let earlier_empty = item
                    .domain
                    .iter()
                    .take_while(|&&other| other < c)
                    .any(|&other| node.counts[other] == 0 && model.symmetry_class(other) == class);
                if earlier_empty {
                    continue;
                }
            }

            let mut child = node.clone();
            child.depth += 1;
            child.assignment[idx] = Some(c);
            child.mass[c] += item.mass;
            child.volume[c] += item.volume;
            child.counts[c] += 1;
            child.value += item.value;
            child.broken[c] = !self.placeable(&child, c);

            if shared.admit(&mut child) {
                children.push(child);
            }
        }

        if !shared.forbid {
            let mut child = node.clone();
            child.depth += 1;
            child.unassigned += 1;
            if shared.admit(&mut child) {
                children.push(child);
            }
        }

        children
    }

    fn placeable(&mut self, node: &Node, carrier: usize) -> bool {
        let items = node.items_on(carrier);
        if items.len() <= 1 {
            return true;
        }

        let class = self.shared.model.symmetry_class(carrier);
        let key = (class, items);
        if let Some(&known) = self.feasible.get(&key) {
            return known;
        }

        let shared = self.shared;
        let candidates = shared
            .model
            .candidates(shared.catalog, &key.1, carrier);
        let resolver = SkylineResolver::new(&shared.model.carriers()[carrier]);
        let ok = match resolver.resolve(&candidates) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Nogood ({} items): {}", key.1.len(), e);
                self.nogood_count += 1;
                false
            }
        };
        self.feasible.insert(key, ok);
        ok
    }

    /// Depth-first exploration, refilled from the shared queue.
    fn run(mut self) -> WorkerReport {
        let shared = self.shared;
        let mut stack: Vec<Node> = Vec::new();

        loop {
            let node = match stack.pop() {
                Some(node) => node,
                None => match lock(&shared.queue).pop_front() {
                    Some(node) => node,
                    None => break,
                },
            };

            if shared.should_stop() {
                stack.push(node);
                break;
            }
            if shared.prunable(node.bound) {
                continue;
            }

            shared.nodes.fetch_add(1, Ordering::Relaxed);
            let children = self.expand(&node);
            stack.extend(children.into_iter().rev());
        }

        WorkerReport {
            leftover: stack.len(),
            leftover_bound: stack
                .iter()
                .map(|n| n.bound)
                .fold(f64::NEG_INFINITY, f64::max),
            nogoods: self.nogood_count,
        }
    }
}

/// Branch-and-bound engine over a compiled model.
pub struct SearchEngine<'a> {
    catalog: &'a Catalog,
    model: &'a ConstraintModel,
    config: &'a Config,
    cancel: Option<&'a AtomicBool>,
    progress: Option<&'a ProgressCallback>,
}

impl<'a> SearchEngine<'a> {
    /// Creates an engine for a model built from `catalog`.
    pub fn new(catalog: &'a Catalog, model: &'a ConstraintModel, config: &'a Config) -> Self {
        Self {
            catalog,
            model,
            config,
            cancel: None,
            progress: None,
        }
    }

    /// Sets the external cancellation flag.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Sets the progress callback, invoked on every new incumbent.
    pub fn with_progress(mut self, callback: &'a ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Runs the search until the tree is exhausted or a budget runs out.
    pub fn run(&self) -> Result<SearchOutcome> {
        let never = AtomicBool::new(false);
        let items = self.model.items();
        let workers = self.config.worker_count().max(1);

        let order = self.model.search_order();
        let penalty = self.model.policy().penalty();
        let ranked = |weight: fn(&ModelItem) -> f64| {
            let mut ranked: Vec<usize> = (0..items.len()).collect();
            ranked.sort_by(|&a, &b| {
                let da = (items[a].value + penalty) / weight(&items[a]);
                let db = (items[b].value + penalty) / weight(&items[b]);
                db.total_cmp(&da).then_with(|| items[a].id.cmp(&items[b].id))
            });
            ranked
        };

        let start = Instant::now();
        let shared = Shared {
            catalog: self.catalog,
            model: self.model,
            tie_break: self.config.tie_break_policy,
            symmetry_breaking: self.config.symmetry_breaking,
            forbid: self.model.policy().is_forbidden(),
            penalty,
            order,
            by_volume_density: ranked(|i: &ModelItem| i.volume),
            by_mass_density: ranked(|i: &ModelItem| i.mass),
            incumbent: Mutex::new(None),
            best_bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            queue: Mutex::new(VecDeque::new()),
            nodes: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            cancel: self.cancel.unwrap_or(&never),
            max_nodes: self.config.max_nodes,
            deadline: self.config.time_budget().map(|budget| start + budget),
            start,
            root_bound: AtomicU64::new(0),
            progress: self.progress,
        };

        let mut root = Node::root(items.len(), self.model.carriers().len());
        shared
            .root_bound
            .store(shared.bound(&root).to_bits(), Ordering::Relaxed);
        let root_expandable = shared.admit(&mut root);

        // Breadth-first seeding of the shared queue.
        let mut seed = Worker::new(&shared);
        let mut frontier = VecDeque::new();
        if root_expandable {
            frontier.push_back(root);
        }
        while frontier.len() < NODES_PER_WORKER * workers {
            let Some(node) = frontier.pop_front() else {
                break;
            };
            if shared.should_stop() {
                frontier.push_front(node);
                break;
            }
            if shared.prunable(node.bound) {
                continue;
            }
            shared.nodes.fetch_add(1, Ordering::Relaxed);
            frontier.extend(seed.expand(&node));
        }
        let mut nogoods = seed.nogood_count;
        log::debug!(
            "Seeded {} nodes for {} workers in {} ms",
            frontier.len(),
            workers,
            start.elapsed().as_millis()
        );
        *lock(&shared.queue) = frontier;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build worker pool: {}", e)))?;
        let reports: Vec<WorkerReport> = pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|_| Worker::new(&shared).run())
                .collect()
        });

        let queue = std::mem::take(&mut *lock(&shared.queue));
        let mut leftover = queue.len();
        let mut leftover_bound = queue
            .iter()
            .map(|n| n.bound)
            .fold(f64::NEG_INFINITY, f64::max);
        for report in &reports {
            leftover += report.leftover;
            leftover_bound = leftover_bound.max(report.leftover_bound);
            nogoods += report.nogoods;
        }

        let exhausted = leftover == 0;
        let cancelled = shared.cancel.load(Ordering::Relaxed);
        let nodes_explored = shared.nodes.load(Ordering::Relaxed);
        let incumbent = lock(&shared.incumbent).take();

        let (assignment, objective) = match incumbent {
            Some(best) => (Some(best.assignment), best.objective),
            None => (None, 0.0),
        };
        let upper_bound = if exhausted {
            objective
        } else {
            leftover_bound.max(objective)
        };

        log::debug!(
            "Search finished: {} nodes, {} nogoods, exhausted={}, cancelled={}",
            nodes_explored,
            nogoods,
            exhausted,
            cancelled
        );

        Ok(SearchOutcome {
            assignment,
            objective,
            upper_bound,
            nodes_explored,
            nogoods,
            exhausted,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::Carrier;
    use crate::item::Item;
    use approx::assert_relative_eq;
    use pallet_core::UnassignedPolicy;

    fn run(catalog: &Catalog, config: &Config) -> SearchOutcome {
        let model = ConstraintModel::build(catalog, config.unassigned_policy);
        SearchEngine::new(catalog, &model, config).run().unwrap()
    }

    fn config() -> Config {
        Config::new().with_threads(1).with_time_limit(0)
    }

    #[test]
    fn test_tie_break_order() {
        let a = Incumbent {
            objective: 1.0,
            carriers_used: 1,
            sequence: vec![(1, 0)],
            assignment: vec![],
        };
        let b = Incumbent {
            objective: 1.0,
            carriers_used: 2,
            sequence: vec![(0, 0)],
            assignment: vec![],
        };
        assert!(a.beats(&b, TieBreakPolicy::FewestCarriersThenLowestId));
        assert!(b.beats(&a, TieBreakPolicy::LowestId));
        assert!(!a.beats(&a, TieBreakPolicy::LowestId));
    }

    #[test]
    fn test_loads_everything_that_fits() {
        let items = (0..6)
            .map(|i| Item::new(i, 0.4, 0.4, 0.4, 10.0))
            .collect();
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let outcome = run(&catalog, &config());

        assert!(outcome.exhausted);
        let assignment = outcome.assignment.clone().unwrap();
        assert!(assignment.iter().all(|slot| *slot == Some(0)));
        assert_relative_eq!(outcome.objective, 6.0 * 0.064, epsilon = 1e-9);
        assert_eq!(outcome.gap(), 0.0);
    }

    #[test]
    fn test_mass_capacity_selects_most_valuable() {
        let items = vec![
            Item::new(0, 0.5, 0.5, 0.5, 600.0).with_priority(1),
            Item::new(1, 0.5, 0.5, 0.5, 600.0).with_priority(3),
            Item::new(2, 0.5, 0.5, 0.5, 600.0).with_priority(2),
        ];
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let outcome = run(&catalog, &config());

        let assignment = outcome.assignment.unwrap();
        assert_eq!(assignment, vec![None, Some(0), None]);
        assert_relative_eq!(outcome.objective, 0.375, epsilon = 1e-9);
    }

    #[test]
    fn test_symmetric_carriers_use_fewest() {
        let items = (0..2)
            .map(|i| Item::new(i, 0.3, 0.3, 0.3, 5.0))
            .collect();
        let carriers = vec![Carrier::pbr(0), Carrier::pbr(1), Carrier::pbr(2)];
        let catalog = Catalog::new(items, carriers).unwrap();
        let outcome = run(&catalog, &config());

        assert_eq!(outcome.assignment.unwrap(), vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_geometry_failure_becomes_nogood() {
        // Footprint holds one item per layer and nothing stacks on fragile
        // items, so only one of the two fits.
        let items = vec![
            Item::new(0, 1.0, 1.0, 0.5, 5.0)
                .with_fragile(true)
                .with_rotatable(false),
            Item::new(1, 1.0, 1.0, 0.5, 5.0)
                .with_fragile(true)
                .with_rotatable(false)
                .with_priority(2),
        ];
        let carrier = Carrier::with_space(0, 1000.0, 1.0, 1.0, 2.0);
        let catalog = Catalog::new(items, vec![carrier]).unwrap();
        let outcome = run(&catalog, &config());

        assert!(outcome.nogoods >= 1);
        assert_eq!(outcome.assignment.unwrap(), vec![None, Some(0)]);
    }

    #[test]
    fn test_failing_subset_does_not_reject_superset() {
        // The full set packs even where a subset met on the way does not.
        let items = vec![
            Item::new(0, 0.5, 0.8, 0.3, 4.0).with_priority(1),
            Item::new(1, 0.2, 0.9, 0.3, 2.0).with_priority(5),
            Item::new(2, 0.4, 0.8, 0.4, 3.0)
                .with_priority(5)
                .with_rotatable(false),
            Item::new(3, 0.8, 0.3, 0.7, 3.0).with_priority(5),
        ];
        let carrier = Carrier::with_space(0, 1000.0, 1.0, 1.0, 1.0);
        let catalog = Catalog::new(items, vec![carrier.clone()]).unwrap();
        let config = config();
        let model = ConstraintModel::build(&catalog, config.unassigned_policy);

        let candidates = model.candidates(&catalog, &[0, 1, 2, 3], 0);
        assert!(SkylineResolver::new(&carrier).resolve(&candidates).is_ok());

        let outcome = SearchEngine::new(&catalog, &model, &config).run().unwrap();
        assert!(outcome.exhausted);
        assert_eq!(outcome.assignment.clone().unwrap(), vec![Some(0); 4]);
        assert_relative_eq!(outcome.objective, 1.87, epsilon = 1e-9);
        assert_eq!(outcome.gap(), 0.0);
    }

    #[test]
    fn test_forbid_without_complete_solution() {
        let items = vec![
            Item::new(0, 0.5, 0.5, 0.5, 600.0),
            Item::new(1, 0.5, 0.5, 0.5, 600.0),
        ];
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let config = config().with_unassigned_policy(UnassignedPolicy::Forbid);
        let outcome = run(&catalog, &config);

        assert!(outcome.exhausted);
        assert!(!outcome.has_solution());
    }

    #[test]
    fn test_penalty_shifts_objective() {
        let items = vec![
            Item::new(0, 0.5, 0.5, 0.5, 600.0),
            Item::new(1, 0.5, 0.5, 0.5, 600.0),
        ];
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let config = config().with_unassigned_policy(UnassignedPolicy::Penalty(1.0));
        let outcome = run(&catalog, &config);

        assert_relative_eq!(outcome.objective, 0.125 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_node_budget_returns_incumbent() {
        let items = (0..20)
            .map(|i| Item::new(i, 0.3, 0.2, 0.25, 10.0 + i as f64).with_priority(1 + i % 5))
            .collect();
        let carriers = vec![Carrier::euro(0), Carrier::euro(1)];
        let catalog = Catalog::new(items, carriers).unwrap();
        let outcome = run(&catalog, &config().with_max_nodes(5));

        assert!(!outcome.exhausted);
        assert!(outcome.has_solution());
        assert!(outcome.upper_bound >= outcome.objective);
    }

    #[test]
    fn test_cancel_flag_stops_search() {
        let items = (0..10)
            .map(|i| Item::new(i, 0.3, 0.2, 0.25, 10.0))
            .collect();
        let catalog = Catalog::new(items, vec![Carrier::pbr(0)]).unwrap();
        let config = config();
        let model = ConstraintModel::build(&catalog, config.unassigned_policy);
        let cancel = AtomicBool::new(true);

        let outcome = SearchEngine::new(&catalog, &model, &config)
            .with_cancel(&cancel)
            .run()
            .unwrap();
        assert!(outcome.cancelled);
        assert!(!outcome.exhausted);
        // The empty load is always available.
        assert!(outcome.has_solution());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let items = (0..9)
            .map(|i| {
                Item::new(i, 0.3 + 0.05 * (i % 3) as f64, 0.3, 0.4, 40.0 - i as f64)
                    .with_priority(1 + i % 4)
            })
            .collect();
        let carriers = vec![
            Carrier::with_space(0, 150.0, 1.2, 1.0, 1.8),
            Carrier::with_space(1, 150.0, 1.2, 1.0, 1.8),
        ];
        let catalog = Catalog::new(items, carriers).unwrap();

        let sequential = run(&catalog, &config());
        let parallel = run(&catalog, &config().with_threads(4));
        assert!(sequential.exhausted && parallel.exhausted);
        assert_relative_eq!(sequential.objective, parallel.objective, epsilon = 1e-9);
    }
}

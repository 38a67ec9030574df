//! This module defines the [`Pathfinder`], the query entry point over a borrowed [`GridStore`].
use bevy::log;
use smallvec::{smallvec, SmallVec};

use crate::{
    astar::{astar_tiles, QueryState, SearchEnd, SearchLimits},
    error::QueryRejection,
    grid::GridStore,
    index::Index3,
    macros::timed,
    neighbor::{minimum_cost, CardinalNeighborhood, OrdinalNeighborhood},
    node::PathNode,
    observer::{Observers, PathfindingObserver},
    path::Path,
    tile::TileKind,
    MovementCost,
};

/// Default multiple of the tile height a single step may climb or drop.
pub const DEFAULT_HEIGHT_REACH: f32 = 4.0;

/// Lifecycle of a [`Pathfinder`]. Every query ends back in `Idle`.
///
/// `search` holds `&mut self` for the whole query, so transitions are only visible to
/// observers through [`PathfindingObserver::on_state_changed`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PathfinderState {
    #[default]
    Idle,
    Searching,
    Found,
    Exhausted,
}

/// Typed result of [`Pathfinder::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A cheapest path, start and target included.
    Found(Path),
    /// The target couldn't be reached. Every analyzed tile, in analysis order.
    Reachable(Vec<Index3>),
    /// The target couldn't be reached and no reachable set was requested.
    Exhausted,
    /// The query failed validation and no search ran.
    Rejected(QueryRejection),
}

impl SearchOutcome {
    /// The flat index list [`Pathfinder::find`] hands back.
    pub fn into_indices(self) -> Vec<Index3> {
        match self {
            SearchOutcome::Found(path) => path.into_vec(),
            SearchOutcome::Reachable(reachable) => reachable,
            SearchOutcome::Exhausted | SearchOutcome::Rejected(_) => Vec::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

/// Parameters of a single query.
///
/// # Example
/// ```
/// use tactical_grid::prelude::*;
///
/// let query = PathQuery::new(Index3::new(0, 0, 0), Index3::new(4, 2, 0))
///     .diagonals(true)
///     .allowed_kinds(&[TileKind::Normal, TileKind::FlyingOnly])
///     .max_cost(12);
///
/// assert_eq!(query.target(), Index3::new(4, 2, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    start: Index3,
    target: Index3,
    include_diagonals: bool,
    allowed_kinds: SmallVec<[TileKind; 4]>,
    return_reachable: bool,
    max_cost: MovementCost,
}

impl PathQuery {
    /// An orthogonal, walk-only query with a cost budget of 1.
    pub fn new(start: Index3, target: Index3) -> Self {
        PathQuery {
            start,
            target,
            include_diagonals: false,
            allowed_kinds: smallvec![TileKind::Normal],
            return_reachable: false,
            max_cost: 1,
        }
    }

    /// Allow diagonal steps.
    pub fn diagonals(mut self, include_diagonals: bool) -> Self {
        self.include_diagonals = include_diagonals;
        self
    }

    /// Tile kinds the agent may step onto.
    pub fn allowed_kinds(mut self, allowed_kinds: &[TileKind]) -> Self {
        self.allowed_kinds = allowed_kinds.iter().copied().collect();
        self
    }

    /// When the target can't be reached, return every tile the search analyzed instead of
    /// nothing. The target checks are skipped in this mode.
    pub fn reachable_if_unreachable(mut self, return_reachable: bool) -> Self {
        self.return_reachable = return_reachable;
        self
    }

    /// Largest total cost a path may have.
    pub fn max_cost(mut self, max_cost: MovementCost) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn start(&self) -> Index3 {
        self.start
    }

    pub fn target(&self) -> Index3 {
        self.target
    }
}

/// Runs A* queries against a borrowed [`GridStore`].
///
/// The store can't be mutated while a `Pathfinder` borrows it. Working buffers are kept
/// between queries and reset at the start of each one.
///
/// # Example
/// ```
/// use tactical_grid::prelude::*;
///
/// let mut grid = GridStore::new(GridSettingsBuilder::new(3, 3).build());
/// let indices: Vec<Index3> = (0..3)
///     .flat_map(|x| (0..3).map(move |y| Index3::new(x, y, 0)))
///     .collect();
/// grid.bulk_add(&indices);
///
/// let mut pathfinder = Pathfinder::new(&grid);
/// let path = pathfinder.find_path(
///     Index3::new(0, 0, 0),
///     Index3::new(2, 2, 0),
///     true,
///     &[TileKind::Normal],
///     false,
///     10,
/// );
///
/// assert_eq!(path.len(), 3);
/// assert_eq!(pathfinder.path_cost(&path), 2);
/// ```
pub struct Pathfinder<'g> {
    grid: &'g GridStore,
    height_reach: f32,
    state: PathfinderState,
    query: QueryState,
    observers: Observers,
}

impl<'g> Pathfinder<'g> {
    pub fn new(grid: &'g GridStore) -> Self {
        Pathfinder {
            grid,
            height_reach: DEFAULT_HEIGHT_REACH,
            state: PathfinderState::Idle,
            query: QueryState::default(),
            observers: Observers::default(),
        }
    }

    /// Sets how many tile heights a single step may climb or drop.
    pub fn with_height_reach(mut self, height_reach: f32) -> Self {
        self.height_reach = height_reach;
        self
    }

    pub fn height_reach(&self) -> f32 {
        self.height_reach
    }

    pub fn grid(&self) -> &'g GridStore {
        self.grid
    }

    pub fn state(&self) -> PathfinderState {
        self.state
    }

    /// Registers an observer notified of search progress from the next query on.
    pub fn add_observer(&mut self, observer: Box<dyn PathfindingObserver + Send>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// The node recorded for `index` by the last query, if it was discovered.
    pub fn node(&self, index: Index3) -> Option<&PathNode> {
        self.query.nodes.get(&index)
    }

    /// Every node discovered by the last query, in discovery order.
    pub fn discovered(&self) -> impl Iterator<Item = &PathNode> + '_ {
        self.query.nodes.values()
    }

    /// Tiles analyzed by the last query, in analysis order.
    pub fn analyzed(&self) -> &[Index3] {
        &self.query.closed
    }

    /// Finds a path from `start` to `target`.
    ///
    /// Returns the path with both ends included, the reachable set when the target can't be
    /// reached and `return_reachable_set_if_unreachable` is set, or an empty list.
    pub fn find_path(
        &mut self,
        start: Index3,
        target: Index3,
        include_diagonals: bool,
        allowed_kinds: &[TileKind],
        return_reachable_set_if_unreachable: bool,
        max_cost: MovementCost,
    ) -> Vec<Index3> {
        let query = PathQuery::new(start, target)
            .diagonals(include_diagonals)
            .allowed_kinds(allowed_kinds)
            .reachable_if_unreachable(return_reachable_set_if_unreachable)
            .max_cost(max_cost);

        self.find(&query)
    }

    /// Runs `query` and flattens the outcome into an index list. See [`Pathfinder::find_path`].
    pub fn find(&mut self, query: &PathQuery) -> Vec<Index3> {
        self.search(query).into_indices()
    }

    /// Runs `query` and returns the typed outcome.
    pub fn search(&mut self, query: &PathQuery) -> SearchOutcome {
        self.query.clear();
        self.observers.query_state_cleared();

        if let Err(rejection) = self.validate(query) {
            log::debug!(
                "Rejected query {:?} -> {:?}: {}",
                query.start,
                query.target,
                rejection
            );
            self.observers.pathfinding_completed(&[]);
            return SearchOutcome::Rejected(rejection);
        }

        self.set_state(PathfinderState::Searching);

        let limits = SearchLimits {
            target: query.target,
            allowed_kinds: &query.allowed_kinds,
            max_cost: query.max_cost,
            max_height_step: self.grid.settings().tile_size().z * self.height_reach,
        };

        let end = timed!("astar", {
            if query.include_diagonals {
                astar_tiles(
                    &OrdinalNeighborhood,
                    self.grid,
                    &mut self.query,
                    query.start,
                    &limits,
                    &mut self.observers,
                )
            } else {
                astar_tiles(
                    &CardinalNeighborhood,
                    self.grid,
                    &mut self.query,
                    query.start,
                    &limits,
                    &mut self.observers,
                )
            }
        });

        let outcome = match end {
            SearchEnd::Found => {
                self.set_state(PathfinderState::Found);
                SearchOutcome::Found(self.query.path_to(query.target))
            }
            SearchEnd::Exhausted => {
                self.set_state(PathfinderState::Exhausted);
                if query.return_reachable {
                    SearchOutcome::Reachable(self.query.closed.clone())
                } else {
                    SearchOutcome::Exhausted
                }
            }
        };

        log::debug!(
            "Query {:?} -> {:?} ended {:?} after discovering {} nodes",
            query.start,
            query.target,
            self.state,
            self.query.nodes.len()
        );

        match &outcome {
            SearchOutcome::Found(path) => self.observers.pathfinding_completed(path.path()),
            SearchOutcome::Reachable(reachable) => self.observers.pathfinding_completed(reachable),
            _ => self.observers.pathfinding_completed(&[]),
        }

        self.set_state(PathfinderState::Idle);
        outcome
    }

    /// Sum of the entry costs of every tile after the first. Missing tiles count as 0.
    pub fn path_cost(&self, path: &[Index3]) -> MovementCost {
        path.iter()
            .skip(1)
            .map(|&index| match self.grid.get(index) {
                Some(tile) => tile.cost(),
                None => {
                    log::warn!("Path step {:?} has no tile", index);
                    0
                }
            })
            .sum()
    }

    fn set_state(&mut self, state: PathfinderState) {
        if self.state != state {
            self.state = state;
            self.observers.state_changed(state);
        }
    }

    fn validate(&self, query: &PathQuery) -> Result<(), QueryRejection> {
        if query.start == query.target {
            return Err(QueryRejection::SameStartAndTarget);
        }

        if !self.grid.is_walkable(query.start) {
            return Err(QueryRejection::StartNotWalkable);
        }

        if query.return_reachable {
            return Ok(());
        }

        let Some(target) = self.grid.get(query.target).filter(|tile| tile.is_walkable()) else {
            return Err(QueryRejection::TargetNotWalkable);
        };

        if minimum_cost(query.start, query.target, query.include_diagonals) > query.max_cost {
            return Err(QueryRejection::TargetBeyondMaxCost);
        }

        if !query.allowed_kinds.contains(&target.kind) {
            return Err(QueryRejection::TargetKindNotAllowed);
        }

        if target.is_occupied() {
            return Err(QueryRejection::TargetOccupied);
        }

        Ok(())
    }
}

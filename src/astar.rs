//! A* search over the tiles of a [`GridStore`].
use std::collections::BinaryHeap;

use indexmap::map::Entry::{Occupied, Vacant};
use smallvec::SmallVec;

use crate::{
    grid::GridStore,
    index::Index3,
    neighbor::Neighborhood,
    node::PathNode,
    observer::Observers,
    path::Path,
    tile::{Tile, TileKind},
    FxIndexMap, MovementCost, SmallestCostHolder,
};

/// How a search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchEnd {
    /// The target was discovered and its path can be rebuilt from the node table.
    Found,
    /// The open set ran dry before the target was discovered.
    Exhausted,
}

/// Per-query limits of a search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits<'a> {
    pub(crate) target: Index3,
    pub(crate) allowed_kinds: &'a [TileKind],
    pub(crate) max_cost: MovementCost,
    /// Largest world height difference a single step may climb or drop.
    pub(crate) max_height_step: f32,
}

impl SearchLimits<'_> {
    /// Can an agent step from `from` onto `to`?
    fn can_enter(&self, from: &Tile, to: &Tile) -> bool {
        to.is_walkable()
            && self.allowed_kinds.contains(&to.kind)
            && !to.is_occupied()
            && (to.placement.height() - from.placement.height()).abs() <= self.max_height_step
    }
}

/// Working state of one query. Reused between queries to keep its allocations.
#[derive(Debug, Default)]
pub(crate) struct QueryState {
    /// Every discovered node in discovery order. Open and closed nodes both live here.
    pub(crate) nodes: FxIndexMap<Index3, PathNode>,
    /// Parallel to `nodes`: has the node been analyzed?
    closed_flags: Vec<bool>,
    /// Analyzed node indices in analysis order.
    pub(crate) closed: Vec<Index3>,
    open: BinaryHeap<SmallestCostHolder>,
    sequence: u64,
}

impl QueryState {
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.closed_flags.clear();
        self.closed.clear();
        self.open.clear();
        self.sequence = 0;
    }

    /// Pushes the node at `slot` onto the open set with its current priority.
    fn open_node(&mut self, slot: usize) {
        let node = &self.nodes[slot];
        self.open.push(SmallestCostHolder {
            priority: node.priority(),
            sequence: self.sequence,
            cost: node.cost_from_start,
            index: slot,
        });
        self.sequence += 1;
    }

    /// Walks the previous pointers back from `target`. Start and target are both included.
    pub(crate) fn path_to(&self, target: Index3) -> Path {
        let mut steps = vec![];
        let mut current = Some(target);

        while let Some(index) = current {
            steps.push(index);
            current = self.nodes.get(&index).and_then(|node| node.previous);
        }

        steps.reverse();

        let cost = self
            .nodes
            .get(&target)
            .map_or(0, |node| node.cost_from_start);
        Path::new(steps, cost)
    }
}

/// A* search algorithm over the tiles of a [`GridStore`].
///
/// Neighbors are found through the height-column index: for each planar offset of the
/// [`Neighborhood`] every tile stacked in that column is a candidate, and
/// [`SearchLimits`] decides if it can be entered.
///
/// A rediscovered node is only updated when the new cost is strictly cheaper, so ties keep
/// the earlier path. The search stops as soon as the target is discovered.
///
/// # Arguments
/// * `neighborhood` - The [`Neighborhood`] to use.
/// * `grid` - The tiles to search.
/// * `state` - Working state, cleared by the caller.
/// * `start` - The starting tile. Must exist in `grid`.
/// * `limits` - Target, allowed kinds, cost budget and height reach.
/// * `observers` - Notified whenever a node is discovered, improved or analyzed.
pub(crate) fn astar_tiles<N: Neighborhood>(
    neighborhood: &N,
    grid: &GridStore,
    state: &mut QueryState,
    start: Index3,
    limits: &SearchLimits<'_>,
    observers: &mut Observers,
) -> SearchEnd {
    let Some(start_tile) = grid.get(start) else {
        return SearchEnd::Exhausted;
    };

    let mut start_node = PathNode::new(start, start_tile.cost());
    start_node.cost_from_start = 0;
    start_node.heuristic_to_target = neighborhood.heuristic(start, limits.target);

    state.nodes.insert(start, start_node);
    state.closed_flags.push(false);
    state.open_node(0);
    observers.node_discovered_or_updated(start);

    let mut neighbors: SmallVec<[(Index3, MovementCost); 8]> = SmallVec::new();

    while let Some(SmallestCostHolder { cost, index, .. }) = state.open.pop() {
        let current = state.nodes[index];

        // Superseded by a cheaper re-insertion.
        if cost > current.cost_from_start || state.closed_flags[index] {
            continue;
        }

        state.closed_flags[index] = true;
        state.closed.push(current.index);
        observers.node_discovered_or_updated(current.index);

        let Some(current_tile) = grid.get(current.index) else {
            continue;
        };

        neighbors.clear();
        for &(dx, dy) in neighborhood.directions() {
            let column = current.index.planar_offset(dx, dy);

            for tile in grid.column_tiles(column.x, column.y) {
                if limits.can_enter(current_tile, tile) {
                    neighbors.push((tile.index, tile.cost()));
                }
            }
        }

        for &(neighbor, cost_to_enter) in neighbors.iter() {
            let new_cost = current.cost_from_start.saturating_add(cost_to_enter);
            if new_cost > limits.max_cost {
                continue;
            }

            let slot = match state.nodes.entry(neighbor) {
                Vacant(e) => {
                    let slot = e.index();
                    e.insert(PathNode {
                        cost_from_start: new_cost,
                        heuristic_to_target: neighborhood.heuristic(neighbor, limits.target),
                        previous: Some(current.index),
                        ..PathNode::new(neighbor, cost_to_enter)
                    });
                    state.closed_flags.push(false);
                    slot
                }
                Occupied(mut e) => {
                    if state.closed_flags[e.index()] || e.get().cost_from_start <= new_cost {
                        continue;
                    }

                    let node = e.get_mut();
                    node.cost_from_start = new_cost;
                    node.previous = Some(current.index);
                    e.index()
                }
            };

            state.open_node(slot);
            observers.node_discovered_or_updated(neighbor);

            if neighbor == limits.target {
                return SearchEnd::Found;
            }
        }
    }

    SearchEnd::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::GridSettingsBuilder,
        neighbor::{CardinalNeighborhood, OrdinalNeighborhood},
        tile::TilePlacement,
    };

    const WALKABLE: &[TileKind] = &[TileKind::Normal];

    fn flat_grid(width: i32, height: i32) -> GridStore {
        let mut grid = GridStore::new(GridSettingsBuilder::new(width, height).build());
        let indices: Vec<Index3> = (0..width)
            .flat_map(|x| (0..height).map(move |y| Index3::new(x, y, 0)))
            .collect();
        grid.bulk_add(&indices);
        grid
    }

    fn limits(target: Index3, max_cost: MovementCost) -> SearchLimits<'static> {
        SearchLimits {
            target,
            allowed_kinds: WALKABLE,
            max_cost,
            max_height_step: 400.0,
        }
    }

    #[test]
    fn test_astar_tiles() {
        let grid = flat_grid(3, 3);
        let mut state = QueryState::default();
        let target = Index3::new(2, 2, 0);

        let end = astar_tiles(
            &OrdinalNeighborhood,
            &grid,
            &mut state,
            Index3::ZERO,
            &limits(target, 10),
            &mut Observers::default(),
        );

        assert_eq!(end, SearchEnd::Found);
        let path = state.path_to(target);
        assert_eq!(path.cost(), 2);
        assert_eq!(path.len(), 3);
        // Ensure first position is the start position
        assert_eq!(path.path()[0], Index3::ZERO);
        // Ensure last position is the goal position
        assert_eq!(path.path()[2], target);
    }

    #[test]
    fn test_astar_tiles_with_wall() {
        let mut grid = flat_grid(3, 3);
        grid.set_tile(Tile::new(Index3::new(1, 1, 0), TileKind::Obstacle, TilePlacement::default()));
        let mut state = QueryState::default();
        let target = Index3::new(2, 2, 0);

        let end = astar_tiles(
            &OrdinalNeighborhood,
            &grid,
            &mut state,
            Index3::ZERO,
            &limits(target, 10),
            &mut Observers::default(),
        );

        assert_eq!(end, SearchEnd::Found);
        let path = state.path_to(target);
        assert_eq!(path.cost(), 3);
        assert_eq!(path.len(), 4);
        assert!(!path.is_position_in_path(Index3::new(1, 1, 0)));
    }

    #[test]
    fn test_astar_tiles_cardinal() {
        let grid = flat_grid(8, 8);
        let mut state = QueryState::default();
        let target = Index3::new(7, 7, 0);

        let end = astar_tiles(
            &CardinalNeighborhood,
            &grid,
            &mut state,
            Index3::ZERO,
            &limits(target, 100),
            &mut Observers::default(),
        );

        assert_eq!(end, SearchEnd::Found);
        let path = state.path_to(target);
        assert_eq!(path.cost(), 14);
        assert_eq!(path.len(), 15);
        for pair in path.path().windows(2) {
            assert_eq!(CardinalNeighborhood.heuristic(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn test_exhausted_search_closes_component() {
        let grid = flat_grid(2, 2);
        let mut state = QueryState::default();

        let end = astar_tiles(
            &CardinalNeighborhood,
            &grid,
            &mut state,
            Index3::ZERO,
            &limits(Index3::new(9, 9, 0), 100),
            &mut Observers::default(),
        );

        assert_eq!(end, SearchEnd::Exhausted);
        assert_eq!(state.closed.len(), 4);
        assert_eq!(state.closed[0], Index3::ZERO);
    }

    #[test]
    fn test_clear_resets_state() {
        let grid = flat_grid(3, 3);
        let mut state = QueryState::default();

        astar_tiles(
            &CardinalNeighborhood,
            &grid,
            &mut state,
            Index3::ZERO,
            &limits(Index3::new(2, 2, 0), 10),
            &mut Observers::default(),
        );
        assert!(!state.nodes.is_empty());

        state.clear();
        assert!(state.nodes.is_empty());
        assert!(state.closed.is_empty());
        assert!(state.open.is_empty());
    }
}

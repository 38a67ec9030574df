//! This module defines the `PathNode` struct, the per-query record of a discovered tile.
use crate::{index::Index3, neighbor::is_diagonal_step, MovementCost};

/// Cost of a node that hasn't been reached yet.
pub(crate) const UNKNOWN_COST: MovementCost = MovementCost::MAX;

/// A tile discovered during one search. Discarded when the next query starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    pub index: Index3,
    /// Cost of stepping onto this tile.
    pub cost_to_enter: MovementCost,
    /// Best known cost from the start. [`MovementCost::MAX`] when unknown.
    pub cost_from_start: MovementCost,
    /// Lower bound on the remaining cost to the target.
    pub heuristic_to_target: MovementCost,
    /// The node this one was reached from. `None` for the start.
    pub previous: Option<Index3>,
}

impl PathNode {
    pub(crate) fn new(index: Index3, cost_to_enter: MovementCost) -> Self {
        PathNode {
            index,
            cost_to_enter,
            cost_from_start: UNKNOWN_COST,
            heuristic_to_target: UNKNOWN_COST,
            previous: None,
        }
    }

    /// Open set ordering key: twice the estimated total, plus one when the node was reached by a
    /// diagonal step so equal-cost orthogonal steps are expanded first.
    pub fn priority(&self) -> u64 {
        let estimate = self.cost_from_start as u64 + self.heuristic_to_target as u64;
        let diagonal = self
            .previous
            .is_some_and(|previous| is_diagonal_step(previous, self.index));

        2 * estimate + diagonal as u64
    }
}

//! Movement neighborhoods: which planar offsets a step may take and the matching heuristic.
use std::fmt::Debug;

use crate::{index::Index3, MovementCost};

/// Orthogonal steps, in expansion order.
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Diagonal steps, in expansion order. Only used by [`OrdinalNeighborhood`].
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

pub trait Neighborhood: Clone + Copy + Debug + Default + Sync + Send {
    /// Planar `(dx, dy)` offsets a single step may take. Height never changes with an offset.
    fn directions(&self) -> &'static [(i32, i32)];

    /// Lower bound on the cost of travelling from `pos` to `target`.
    fn heuristic(&self, pos: Index3, target: Index3) -> MovementCost;

    fn is_ordinal(&self) -> bool {
        false
    }
}

/// Four-connected movement.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardinalNeighborhood;

impl Neighborhood for CardinalNeighborhood {
    #[inline(always)]
    fn directions(&self) -> &'static [(i32, i32)] {
        &CARDINAL_OFFSETS
    }

    /// Manhattan distance on the plane.
    #[inline(always)]
    fn heuristic(&self, pos: Index3, target: Index3) -> MovementCost {
        pos.x.abs_diff(target.x) + pos.y.abs_diff(target.y)
    }
}

/// Eight-connected movement.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrdinalNeighborhood;

const ORDINAL_OFFSETS: [(i32, i32); 8] = [
    CARDINAL_OFFSETS[0],
    CARDINAL_OFFSETS[1],
    CARDINAL_OFFSETS[2],
    CARDINAL_OFFSETS[3],
    DIAGONAL_OFFSETS[0],
    DIAGONAL_OFFSETS[1],
    DIAGONAL_OFFSETS[2],
    DIAGONAL_OFFSETS[3],
];

impl Neighborhood for OrdinalNeighborhood {
    #[inline(always)]
    fn directions(&self) -> &'static [(i32, i32)] {
        &ORDINAL_OFFSETS
    }

    /// Chebyshev distance on the plane.
    #[inline(always)]
    fn heuristic(&self, pos: Index3, target: Index3) -> MovementCost {
        pos.x.abs_diff(target.x).max(pos.y.abs_diff(target.y))
    }

    #[inline(always)]
    fn is_ordinal(&self) -> bool {
        true
    }
}

/// Cheapest possible cost between two tiles: Chebyshev distance when diagonal steps are
/// allowed, Manhattan otherwise. Height is ignored.
pub fn minimum_cost(a: Index3, b: Index3, include_diagonals: bool) -> MovementCost {
    if include_diagonals {
        OrdinalNeighborhood.heuristic(a, b)
    } else {
        CardinalNeighborhood.heuristic(a, b)
    }
}

/// True when `from` and `to` differ on both planar axes.
pub fn is_diagonal_step(from: Index3, to: Index3) -> bool {
    from.x != to.x && from.y != to.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_directions() {
        let directions = CardinalNeighborhood.directions();

        assert_eq!(directions.len(), 4);
        assert!(directions.iter().all(|(dx, dy)| dx.abs() + dy.abs() == 1));
        assert!(!CardinalNeighborhood.is_ordinal());
    }

    #[test]
    fn test_ordinal_directions() {
        let directions = OrdinalNeighborhood.directions();

        assert_eq!(directions.len(), 8);
        // Orthogonal steps come first so they're expanded before diagonals.
        assert_eq!(&directions[..4], &CARDINAL_OFFSETS);
        assert!(OrdinalNeighborhood.is_ordinal());
    }

    #[test]
    fn test_minimum_cost() {
        let a = Index3::new(0, 0, 0);
        let b = Index3::new(3, -5, 7);

        assert_eq!(minimum_cost(a, b, true), 5);
        assert_eq!(minimum_cost(a, b, false), 8);
        assert_eq!(minimum_cost(b, a, false), 8);
        assert_eq!(minimum_cost(a, a, true), 0);
    }

    #[test]
    fn test_heuristic_ignores_height() {
        let a = Index3::new(1, 1, 0);
        let b = Index3::new(2, 2, 9);

        assert_eq!(OrdinalNeighborhood.heuristic(a, b), 1);
        assert_eq!(CardinalNeighborhood.heuristic(a, b), 2);
    }

    #[test]
    fn test_is_diagonal_step() {
        let origin = Index3::ZERO;

        assert!(is_diagonal_step(origin, Index3::new(1, 1, 0)));
        assert!(is_diagonal_step(origin, Index3::new(-1, 1, 3)));
        assert!(!is_diagonal_step(origin, Index3::new(1, 0, 0)));
        assert!(!is_diagonal_step(origin, Index3::new(0, 0, 2)));
    }
}

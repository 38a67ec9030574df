//! This module defines the `Path` returned by a successful search.
use std::collections::VecDeque;

use crate::{index::Index3, MovementCost};

/// The path result of a pathfinding operation.
///
/// Steps run from the start tile to the target tile, both included.
#[derive(Debug, Clone)]
pub struct Path {
    pub(crate) path: VecDeque<Index3>,
    cost: MovementCost,
}

impl Path {
    /// Create a new path from a vector of positions.
    /// # Arguments
    /// * `path` - Positions from start to target
    /// * `cost` - The total movement cost of the path
    ///
    pub fn new(path: Vec<Index3>, cost: MovementCost) -> Self {
        Path {
            path: path.into_iter().collect(),
            cost,
        }
    }

    /// Returns true if the path contains the given position
    pub fn is_position_in_path(&self, pos: Index3) -> bool {
        self.path.contains(&pos)
    }

    /// Returns the path as a slice of positions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tactical_grid::prelude::*;
    ///
    /// let path = Path::new(vec![Index3::new(1, 2, 0), Index3::new(2, 2, 0)], 1);
    /// assert_eq!(path.path(), &[Index3::new(1, 2, 0), Index3::new(2, 2, 0)]);
    /// ```
    pub fn path(&self) -> &[Index3] {
        self.path.as_slices().0
    }

    /// Returns the movement cost of the path
    pub fn cost(&self) -> MovementCost {
        self.cost
    }

    /// Returns the length of the path
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns true if the path is empty
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// First position of the path, normally where the agent stands.
    pub fn start(&self) -> Option<Index3> {
        self.path.front().copied()
    }

    /// Last position of the path.
    pub fn target(&self) -> Option<Index3> {
        self.path.back().copied()
    }

    /// Pops the first position of the path.
    pub fn pop(&mut self) -> Option<Index3> {
        self.path.pop_front()
    }

    /// Returns the next position in the path without removing it.
    pub fn next(&self) -> Option<Index3> {
        self.path.front().copied()
    }

    /// Consumes the path, returning the positions.
    pub fn into_vec(self) -> Vec<Index3> {
        self.path.into()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Path {}

impl IntoIterator for Path {
    type Item = Index3;
    type IntoIter = std::collections::vec_deque::IntoIter<Index3>;

    fn into_iter(self) -> Self::IntoIter {
        self.path.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_accessors() {
        let steps = vec![Index3::new(0, 0, 0), Index3::new(1, 0, 0), Index3::new(1, 1, 0)];
        let mut path = Path::new(steps.clone(), 2);

        assert_eq!(path.len(), 3);
        assert_eq!(path.cost(), 2);
        assert_eq!(path.start(), Some(Index3::new(0, 0, 0)));
        assert_eq!(path.target(), Some(Index3::new(1, 1, 0)));
        assert!(path.is_position_in_path(Index3::new(1, 0, 0)));
        assert!(!path.is_position_in_path(Index3::new(0, 1, 0)));

        assert_eq!(path.pop(), Some(Index3::new(0, 0, 0)));
        assert_eq!(path.next(), Some(Index3::new(1, 0, 0)));
        assert_eq!(path.into_vec(), steps[1..].to_vec());
    }
}

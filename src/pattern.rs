//! Tile selection patterns used by edit tooling to grow one coordinate into a set of tiles.
use strum::{Display, EnumIter};

use crate::{index::Index3, FxIndexSet};

/// Named selection shapes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum GridPattern {
    /// Just the origin.
    #[default]
    None,
    /// The four axis rays.
    Line,
    /// The four diagonal rays.
    Diagonal,
    /// Diagonal rays reaching half as far.
    HalfDiagonal,
    /// Line and Diagonal combined.
    Star,
    /// Rings at a fixed Manhattan distance.
    Diamond,
    /// Rings at a fixed Chebyshev distance.
    Square,
}

/// Inclusive range of ring distances, e.g. `PatternRange::new(2, 4)` selects every ring
/// between two and four tiles out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternRange {
    pub min: i32,
    pub max: i32,
}

impl PatternRange {
    pub const fn new(min: i32, max: i32) -> Self {
        PatternRange { min, max }
    }

    /// A single ring at distance `radius`.
    pub const fn ring(radius: i32) -> Self {
        PatternRange::new(radius, radius)
    }

    fn rings(self) -> std::ops::RangeInclusive<i32> {
        self.min..=self.max
    }
}

/// Relative offsets (z = 0) of `shape` over `range`.
///
/// Offsets never repeat and come out in the same order for the same inputs.
/// [`GridPattern::None`] ignores the range and yields only the origin.
pub fn pattern(shape: GridPattern, range: PatternRange) -> Vec<Index3> {
    let mut out = OffsetSet::default();

    match shape {
        GridPattern::None => out.push(0, 0),
        GridPattern::Line => line(range, &mut out),
        GridPattern::Diagonal => diagonal(range, &mut out),
        GridPattern::HalfDiagonal => {
            diagonal(PatternRange::new(range.min, range.max / 2), &mut out)
        }
        GridPattern::Star => {
            line(range, &mut out);
            diagonal(range, &mut out);
        }
        GridPattern::Diamond => diamond(range, &mut out),
        GridPattern::Square => square(range, &mut out),
    }

    out.0.into_iter().collect()
}

/// Absolute indices of `shape` around `origin`.
///
/// ```
/// use tactical_grid::prelude::*;
///
/// let selection = indexes_from_pattern(Index3::new(5, 5, 2), GridPattern::Line, PatternRange::ring(1));
/// assert_eq!(selection.len(), 4);
/// assert!(selection.contains(&Index3::new(6, 5, 2)));
/// ```
pub fn indexes_from_pattern(origin: Index3, shape: GridPattern, range: PatternRange) -> Vec<Index3> {
    pattern(shape, range)
        .into_iter()
        .map(|offset| offset + origin)
        .collect()
}

/// Offsets in first-insertion order, without repeats.
#[derive(Default)]
struct OffsetSet(FxIndexSet<Index3>);

impl OffsetSet {
    fn push(&mut self, x: i32, y: i32) {
        self.0.insert(Index3::new(x, y, 0));
    }
}

fn line(range: PatternRange, out: &mut OffsetSet) {
    for i in range.rings() {
        out.push(0, i);
        out.push(0, -i);
        out.push(i, 0);
        out.push(-i, 0);
    }
}

fn diagonal(range: PatternRange, out: &mut OffsetSet) {
    for i in range.rings() {
        out.push(i, i);
        out.push(-i, -i);
        out.push(i, -i);
        out.push(-i, i);
    }
}

fn diamond(range: PatternRange, out: &mut OffsetSet) {
    for i in range.rings() {
        for j in 0..=i {
            out.push(j, -(i - j));
            out.push(i - j, j);
            out.push(-j, i - j);
            out.push(-(i - j), -j);
        }
    }
}

fn square(range: PatternRange, out: &mut OffsetSet) {
    for i in range.rings() {
        for j in -i..=i {
            out.push(j, -i);
            out.push(i, j);
            out.push(-j, i);
            out.push(-i, -j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    fn chebyshev(i: &Index3) -> i32 {
        i.x.abs().max(i.y.abs())
    }

    fn manhattan(i: &Index3) -> i32 {
        i.x.abs() + i.y.abs()
    }

    #[test]
    fn test_square_ring() {
        let offsets = pattern(GridPattern::Square, PatternRange::ring(1));

        assert_eq!(offsets.len(), 8);
        assert!(offsets.iter().all(|o| chebyshev(o) == 1 && o.z == 0));
    }

    #[test]
    fn test_diamond_ring() {
        let offsets = pattern(GridPattern::Diamond, PatternRange::ring(1));

        assert_eq!(offsets.len(), 4);
        assert!(offsets.iter().all(|o| manhattan(o) == 1));
    }

    #[test]
    fn test_square_rings_are_filled_between_bounds() {
        let offsets = pattern(GridPattern::Square, PatternRange::new(2, 3));

        // 16 tiles on ring 2, 24 on ring 3.
        assert_eq!(offsets.len(), 40);
        assert!(offsets.iter().all(|o| (2..=3).contains(&chebyshev(o))));
    }

    #[test]
    fn test_diamond_rings() {
        let offsets = pattern(GridPattern::Diamond, PatternRange::new(1, 3));

        assert_eq!(offsets.len(), 4 + 8 + 12);
        assert!(offsets.iter().all(|o| (1..=3).contains(&manhattan(o))));
    }

    #[test]
    fn test_line_and_diagonal() {
        let line = pattern(GridPattern::Line, PatternRange::new(1, 2));
        assert_eq!(
            line,
            vec![
                Index3::new(0, 1, 0),
                Index3::new(0, -1, 0),
                Index3::new(1, 0, 0),
                Index3::new(-1, 0, 0),
                Index3::new(0, 2, 0),
                Index3::new(0, -2, 0),
                Index3::new(2, 0, 0),
                Index3::new(-2, 0, 0),
            ]
        );

        let diagonal = pattern(GridPattern::Diagonal, PatternRange::ring(3));
        assert_eq!(diagonal.len(), 4);
        assert!(diagonal.iter().all(|o| o.x.abs() == 3 && o.y.abs() == 3));
    }

    #[test]
    fn test_half_diagonal_halves_upper_bound() {
        let half = pattern(GridPattern::HalfDiagonal, PatternRange::new(1, 5));
        let full = pattern(GridPattern::Diagonal, PatternRange::new(1, 2));

        assert_eq!(half, full);
    }

    #[test]
    fn test_star_is_line_union_diagonal() {
        let star: HashSet<Index3> = pattern(GridPattern::Star, PatternRange::new(1, 2))
            .into_iter()
            .collect();
        let mut expected: HashSet<Index3> = pattern(GridPattern::Line, PatternRange::new(1, 2))
            .into_iter()
            .collect();
        expected.extend(pattern(GridPattern::Diagonal, PatternRange::new(1, 2)));

        assert_eq!(star, expected);
        assert_eq!(star.len(), 16);
    }

    #[test]
    fn test_zero_ring_collapses() {
        let offsets = pattern(GridPattern::Star, PatternRange::new(0, 1));

        // Ring 0 contributes the origin once.
        assert_eq!(offsets.iter().filter(|o| **o == Index3::ZERO).count(), 1);
        assert_eq!(offsets.len(), 9);
    }

    #[test]
    fn test_none_pattern_ignores_range() {
        assert_eq!(pattern(GridPattern::None, PatternRange::new(3, 9)), vec![Index3::ZERO]);
        assert_eq!(
            indexes_from_pattern(Index3::new(4, 4, 1), GridPattern::None, PatternRange::default()),
            vec![Index3::new(4, 4, 1)]
        );
    }

    #[test]
    fn test_patterns_are_unique_and_deterministic() {
        for shape in GridPattern::iter() {
            let range = PatternRange::new(0, 4);
            let first = pattern(shape, range);
            let second = pattern(shape, range);

            assert_eq!(first, second, "{shape} is not deterministic");

            let unique: HashSet<_> = first.iter().collect();
            assert_eq!(unique.len(), first.len(), "{shape} repeats offsets");
        }
    }

    #[test]
    fn test_large_filled_square() {
        let radius = 400;
        let offsets = pattern(GridPattern::Square, PatternRange::new(0, radius));

        assert_eq!(offsets.len(), ((2 * radius + 1) * (2 * radius + 1)) as usize);
        assert_eq!(offsets[0], Index3::ZERO);
        assert!(offsets.iter().all(|o| chebyshev(o) <= radius));
    }

    #[test]
    fn test_empty_range() {
        assert!(pattern(GridPattern::Square, PatternRange::new(3, 2)).is_empty());
    }

    #[test]
    fn test_offsets_translate_by_origin() {
        let origin = Index3::new(10, -4, 3);
        let relative = pattern(GridPattern::Diamond, PatternRange::new(1, 2));
        let absolute = indexes_from_pattern(origin, GridPattern::Diamond, PatternRange::new(1, 2));

        assert_eq!(absolute.len(), relative.len());
        for (a, r) in absolute.iter().zip(relative.iter()) {
            assert_eq!(*a - origin, *r);
        }
    }
}

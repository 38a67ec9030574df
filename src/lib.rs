use std::cmp::Ordering;
use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

mod astar;
mod macros;

pub mod error;
pub mod generation;
pub mod grid;
pub mod index;
pub mod neighbor;
pub mod node;
pub mod observer;
pub mod path;
pub mod pathfind;
pub mod pattern;
pub mod tile;

pub mod prelude {
    pub use crate::error::{GenerationError, GridError, QueryRejection};
    pub use crate::generation::{GeneratedGrid, GenerationJob, GenerationMode};
    pub use crate::grid::{GridSettings, GridSettingsBuilder, GridStore};
    pub use crate::index::Index3;
    pub use crate::neighbor::{minimum_cost, CardinalNeighborhood, Neighborhood, OrdinalNeighborhood};
    pub use crate::node::PathNode;
    pub use crate::observer::{PathfindingEvent, PathfindingObserver};
    pub use crate::path::Path;
    pub use crate::pathfind::{
        PathQuery, Pathfinder, PathfinderState, SearchOutcome, DEFAULT_HEIGHT_REACH,
    };
    pub use crate::pattern::{indexes_from_pattern, pattern, GridPattern, PatternRange};
    pub use crate::tile::{Tile, TileKind, TilePlacement, TileState};
    pub use crate::MovementCost;
}

/// Cost of moving onto a tile, and of whole paths.
pub type MovementCost = u32;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Open set entry. `BinaryHeap` is a max-heap, so the ordering is reversed: the smallest
/// priority wins, and among equal priorities the earliest pushed.
#[derive(Debug)]
pub(crate) struct SmallestCostHolder {
    priority: u64,
    sequence: u64,
    /// `cost_from_start` of the node when pushed. Lets stale entries be recognized.
    cost: MovementCost,
    /// Slot of the node in the node table.
    index: usize,
}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for SmallestCostHolder {}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.priority.cmp(&self.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            s => s,
        }
    }
}

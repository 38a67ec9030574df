//! `TileKind`, `Tile` and the data a tile carries for the search and the renderer.
use bevy::{ecs::entity::Entity, math::Vec3};
use smallvec::SmallVec;
use strum::{Display, EnumIter};

use crate::{index::Index3, MovementCost};

/// Traversability category of a tile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TileKind {
    /// Not a tile. Never stored in the grid.
    None,
    /// Ground that any agent can walk on.
    #[default]
    Normal,
    /// Solid, blocks all movement.
    Obstacle,
    /// Only agents allowed to fly may enter.
    FlyingOnly,
}

impl TileKind {
    /// Cost of entering a tile of this kind.
    ///
    /// Non-walkable kinds report 0. The search filters them out before their cost is ever used.
    pub const fn cost(self) -> MovementCost {
        match self {
            TileKind::None => 0,
            TileKind::Normal => 1,
            TileKind::Obstacle => 0,
            TileKind::FlyingOnly => 1,
        }
    }

    pub const fn is_walkable(self) -> bool {
        !matches!(self, TileKind::None | TileKind::Obstacle)
    }
}

/// Presentation tags attached to a tile. The search never reads these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TileState {
    Hovered,
    Selected,
    Neighbour,
    Path,
    Discovered,
    Analyzed,
    Reachable,
    SpellRange,
    SpellRangeAoE,
}

/// World placement of a tile, consumed by whatever draws the grid.
///
/// Only `translation.z` is read back by the crate, for the height reach check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for TilePlacement {
    fn default() -> Self {
        TilePlacement {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TilePlacement {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        TilePlacement { translation, scale }
    }

    /// World height of the tile.
    pub fn height(&self) -> f32 {
        self.translation.z
    }
}

/// A single cell stored in the [`crate::grid::GridStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub index: Index3,
    pub kind: TileKind,
    pub placement: TilePlacement,
    pub(crate) states: SmallVec<[TileState; 2]>,
    /// Agent standing on the tile. An occupied tile can't be entered.
    pub occupant: Option<Entity>,
}

impl Tile {
    pub fn new(index: Index3, kind: TileKind, placement: TilePlacement) -> Self {
        Tile {
            index,
            kind,
            placement,
            states: SmallVec::new(),
            occupant: None,
        }
    }

    /// Sets the occupant, builder style.
    pub fn with_occupant(mut self, occupant: Entity) -> Self {
        self.occupant = Some(occupant);
        self
    }

    pub fn cost(&self) -> MovementCost {
        self.kind.cost()
    }

    pub fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Presentation states currently set on the tile.
    pub fn states(&self) -> &[TileState] {
        &self.states
    }

    pub fn has_state(&self, state: TileState) -> bool {
        self.states.contains(&state)
    }

    /// Adds `state`. Returns false if it was already set.
    pub(crate) fn add_state(&mut self, state: TileState) -> bool {
        if self.has_state(state) {
            return false;
        }

        self.states.push(state);
        true
    }

    /// Removes `state`. Returns false if it wasn't set.
    pub(crate) fn remove_state(&mut self, state: TileState) -> bool {
        let before = self.states.len();
        self.states.retain(|s| *s != state);
        self.states.len() != before
    }
}

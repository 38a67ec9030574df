//! This module contains the [`GridStore`], the sparse tile map every query runs against.
use std::collections::BTreeSet;

use bevy::{
    ecs::entity::Entity,
    log,
    math::{IVec2, Vec2, Vec3},
    platform::collections::HashMap,
};

use crate::{
    error::GridError,
    generation::GeneratedGrid,
    index::Index3,
    macros::timed,
    tile::{Tile, TileKind, TilePlacement, TileState},
};

/// Height-column index: `(x, y)` to the set of occupied z-levels.
pub(crate) type ColumnIndex = HashMap<IVec2, BTreeSet<i32>>;

/// Holder for the grid layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSettings {
    pub(crate) count_x: i32,
    pub(crate) count_y: i32,
    pub(crate) tile_size: Vec3,
    pub(crate) center: Vec3,
    pub(crate) bottom_left: Vec3,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettingsBuilder::new(16, 16).build()
    }
}

impl GridSettings {
    /// Number of tiles along x.
    pub fn count_x(&self) -> i32 {
        self.count_x
    }

    /// Number of tiles along y.
    pub fn count_y(&self) -> i32 {
        self.count_y
    }

    /// World size of one tile.
    pub fn tile_size(&self) -> Vec3 {
        self.tile_size
    }

    /// Grid center after snapping to the tile size.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// World position of tile `(0, 0, 0)`.
    pub fn bottom_left(&self) -> Vec3 {
        self.bottom_left
    }

    /// Scale handed to the renderer for every tile. Meshes are authored 100 units wide.
    pub fn tile_scale(&self) -> Vec3 {
        self.tile_size / 100.0
    }

    /// Checks if an index lies within the `0..count_x` by `0..count_y` rectangle. Height is unbounded.
    pub fn in_bounds(&self, index: Index3) -> bool {
        index.x >= 0 && index.x < self.count_x && index.y >= 0 && index.y < self.count_y
    }

    /// World position of the tile at `index`.
    pub fn world_from_index(&self, index: Index3) -> Vec3 {
        self.bottom_left + self.tile_size * index.as_ivec3().as_vec3()
    }

    /// Tile index nearest to a world position.
    pub fn index_from_world(&self, location: Vec3) -> Index3 {
        let local = (location - self.bottom_left) / self.tile_size;
        Index3::from(local.round().as_ivec3())
    }

    /// The placement a freshly added tile gets at `index`.
    pub fn canonical_placement(&self, index: Index3) -> TilePlacement {
        TilePlacement::new(self.world_from_index(index), self.tile_scale())
    }
}

/// Builder for [`GridSettings`].
///
/// Example usage:
/// ```
/// use bevy::math::Vec3;
/// use tactical_grid::prelude::*;
///
/// let settings = GridSettingsBuilder::new(10, 10)
///     .tile_size(Vec3::new(100.0, 100.0, 50.0))
///     .center(Vec3::new(0.0, 0.0, 0.0))
///     .build();
///
/// let grid = GridStore::new(settings);
/// assert!(grid.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct GridSettingsBuilder {
    count_x: i32,
    count_y: i32,
    tile_size: Vec3,
    center: Vec3,
}

impl GridSettingsBuilder {
    /// Starts a grid `count_x` tiles wide and `count_y` tiles deep.
    pub fn new(count_x: i32, count_y: i32) -> Self {
        if count_x <= 0 || count_y <= 0 {
            panic!("Tile counts must be at least 1");
        }

        GridSettingsBuilder {
            count_x,
            count_y,
            tile_size: Vec3::splat(100.0),
            center: Vec3::ZERO,
        }
    }

    /// World size of each tile. The z component is the height of one layer.
    pub fn tile_size(mut self, tile_size: Vec3) -> Self {
        if tile_size.cmple(Vec3::ZERO).any() {
            panic!("Tile size must be positive on every axis");
        }

        self.tile_size = tile_size;
        self
    }

    /// World location the grid is centered on. Snapped to the tile size when built.
    pub fn center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// Builds the [`GridSettings`], snapping the center and computing the bottom left corner.
    pub fn build(self) -> GridSettings {
        let center = (self.center / self.tile_size).round() * self.tile_size;

        // Odd counts drop one tile before halving so the center tile sits on the center.
        let half = Vec2::new(
            (self.count_x - self.count_x % 2) as f32 / 2.0,
            (self.count_y - self.count_y % 2) as f32 / 2.0,
        );
        let bottom_left = center - self.tile_size * half.extend(0.0);

        GridSettings {
            count_x: self.count_x,
            count_y: self.count_y,
            tile_size: self.tile_size,
            center,
            bottom_left,
        }
    }
}

/// Sparse mapping of [`Index3`] to [`Tile`] with a secondary height-column index.
///
/// Every mutation keeps the two maps in lockstep: a tile is in the primary map if and only if
/// its z-level is listed under its `(x, y)` column, and no column is ever left empty.
///
/// # Example
/// ```
/// use tactical_grid::prelude::*;
///
/// let mut grid = GridStore::new(GridSettingsBuilder::new(4, 4).build());
/// grid.bulk_add(&[Index3::new(0, 0, 0), Index3::new(0, 0, 2)]);
///
/// assert_eq!(grid.tiles_in_column(0, 0), vec![Index3::new(0, 0, 0), Index3::new(0, 0, 2)]);
/// assert!(grid.is_walkable(Index3::new(0, 0, 2)));
/// ```
#[derive(Debug, Clone)]
pub struct GridStore {
    settings: GridSettings,
    tiles: HashMap<Index3, Tile>,
    columns: ColumnIndex,
}

impl Default for GridStore {
    fn default() -> Self {
        GridStore::new(GridSettings::default())
    }
}

impl GridStore {
    /// Creates an empty store with the given layout.
    pub fn new(settings: GridSettings) -> Self {
        GridStore {
            settings,
            tiles: HashMap::new(),
            columns: ColumnIndex::new(),
        }
    }

    /// Returns the layout settings of the grid.
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Checks if an index lies within the grid bounds.
    pub fn in_bounds(&self, index: Index3) -> bool {
        self.settings.in_bounds(index)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, index: Index3) -> bool {
        self.tiles.contains_key(&index)
    }

    pub fn get(&self, index: Index3) -> Option<&Tile> {
        self.tiles.get(&index)
    }

    /// Iterates over every stored tile in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    /// Returns all stored indices, sorted.
    pub fn indices(&self) -> Vec<Index3> {
        let mut indices: Vec<Index3> = self.tiles.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// False if there's no tile at `index`, otherwise whether its kind is walkable.
    pub fn is_walkable(&self, index: Index3) -> bool {
        self.tiles.get(&index).is_some_and(Tile::is_walkable)
    }

    /// All occupied z-levels at column `(x, y)`, lowest first.
    pub fn tiles_in_column(&self, x: i32, y: i32) -> Vec<Index3> {
        self.columns
            .get(&IVec2::new(x, y))
            .map(|levels| levels.iter().map(|&z| Index3::new(x, y, z)).collect())
            .unwrap_or_default()
    }

    /// Visits the tiles stacked at column `(x, y)` without allocating.
    pub(crate) fn column_tiles(&self, x: i32, y: i32) -> impl Iterator<Item = &Tile> + '_ {
        self.columns
            .get(&IVec2::new(x, y))
            .into_iter()
            .flat_map(move |levels| {
                levels.iter().map(move |&z| {
                    self.tiles
                        .get(&Index3::new(x, y, z))
                        .unwrap_or_else(|| panic!("Column ({x}, {y}) lists z {z} with no tile"))
                })
            })
    }

    /// Adds a `Normal` tile at each index that isn't already present.
    ///
    /// Existing tiles are preserved, duplicates in `indices` collapse, and indices outside the
    /// grid bounds are dropped. Returns the indices that were actually inserted.
    pub fn bulk_add(&mut self, indices: &[Index3]) -> Vec<Index3> {
        timed!("bulk_add", {
            let mut added = Vec::new();

            for &index in indices {
                if self.tiles.contains_key(&index) {
                    continue;
                }

                if !self.in_bounds(index) {
                    log::warn!("Skipping out of bounds tile {:?}", index);
                    continue;
                }

                let placement = self.settings.canonical_placement(index);
                self.insert(Tile::new(index, TileKind::Normal, placement));
                added.push(index);
            }

            added
        })
    }

    /// Removes every present index. Missing indices are ignored.
    /// Returns the indices that were actually removed.
    pub fn remove(&mut self, indices: &[Index3]) -> Vec<Index3> {
        indices
            .iter()
            .filter(|&&index| self.take(index).is_some())
            .copied()
            .collect()
    }

    /// Stores `tile`, replacing whatever was at its index.
    ///
    /// Tiles with kind [`TileKind::None`] or outside the bounds are dropped with a warning.
    /// Use [`GridStore::try_set_tile`] to get the reason back instead.
    pub fn set_tile(&mut self, tile: Tile) {
        if let Err(e) = self.try_set_tile(tile) {
            log::warn!("Dropped tile edit: {}", e);
        }
    }

    /// Stores `tile`, replacing whatever was at its index, and returns the replaced tile.
    pub fn try_set_tile(&mut self, tile: Tile) -> Result<Option<Tile>, GridError> {
        if tile.kind == TileKind::None {
            return Err(GridError::NoneKind(tile.index));
        }

        if !self.in_bounds(tile.index) {
            return Err(GridError::OutOfBounds {
                index: tile.index,
                count_x: self.settings.count_x,
                count_y: self.settings.count_y,
            });
        }

        let previous = self.take(tile.index);
        self.insert(tile);

        Ok(previous)
    }

    /// Removes a single tile if present.
    pub fn remove_tile(&mut self, index: Index3) -> Option<Tile> {
        self.take(index)
    }

    /// Drops every tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.columns.clear();
    }

    /// Moves the tile at `index` up `amount` layers (down when negative).
    ///
    /// The placement height shifts by the same number of tile heights. Kind, states and
    /// occupant travel with the tile, and a tile already at the destination is replaced.
    /// Returns the new index, or `None` if there was no tile to move.
    pub fn move_tile(&mut self, index: Index3, amount: i32) -> Option<Index3> {
        let mut tile = self.take(index)?;

        let destination = index.with_z(index.z + amount);
        tile.index = destination;
        tile.placement.translation.z += self.settings.tile_size.z * amount as f32;

        self.take(destination);
        self.insert(tile);

        Some(destination)
    }

    /// Puts an agent on (or, with `None`, clears) the tile at `index`.
    /// Returns false if there's no tile there.
    pub fn set_occupant(&mut self, index: Index3, occupant: Option<Entity>) -> bool {
        match self.tiles.get_mut(&index) {
            Some(tile) => {
                tile.occupant = occupant;
                true
            }
            None => false,
        }
    }

    pub fn occupant(&self, index: Index3) -> Option<Entity> {
        self.tiles.get(&index).and_then(|tile| tile.occupant)
    }

    /// Tags the tile at `index` with `state`. Returns false if there's no tile or it was already set.
    pub fn add_tile_state(&mut self, index: Index3, state: TileState) -> bool {
        self.tiles
            .get_mut(&index)
            .is_some_and(|tile| tile.add_state(state))
    }

    /// Removes `state` from the tile at `index`. Returns false if nothing changed.
    pub fn remove_tile_state(&mut self, index: Index3, state: TileState) -> bool {
        self.tiles
            .get_mut(&index)
            .is_some_and(|tile| tile.remove_state(state))
    }

    /// Removes `state` from every tile, returning how many tiles had it.
    pub fn clear_tile_state(&mut self, state: TileState) -> usize {
        self.tiles
            .values_mut()
            .filter_map(|tile| tile.remove_state(state).then_some(()))
            .count()
    }

    /// All tiles tagged with `state`, sorted.
    pub fn tiles_with_state(&self, state: TileState) -> Vec<Index3> {
        let mut indices: Vec<Index3> = self
            .tiles
            .values()
            .filter(|tile| tile.has_state(state))
            .map(|tile| tile.index)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Replaces the whole store with a grid built off-thread by a
    /// [`crate::generation::GenerationJob`].
    pub fn apply_generated(&mut self, generated: GeneratedGrid) {
        let GeneratedGrid {
            settings,
            tiles,
            columns,
        } = generated;

        log::info!("Applying generated grid with {} tiles", tiles.len());

        self.settings = settings;
        self.tiles = tiles;
        self.columns = columns;
    }

    /// Panics if the primary map and the column index disagree.
    pub fn check_invariants(&self) {
        let mut listed = 0;

        for (column, levels) in self.columns.iter() {
            assert!(!levels.is_empty(), "Column {column:?} is empty");

            for &z in levels {
                let index = Index3::new(column.x, column.y, z);
                assert!(
                    self.tiles.contains_key(&index),
                    "Column {column:?} lists {index:?} with no tile"
                );
            }

            listed += levels.len();
        }

        for (index, tile) in self.tiles.iter() {
            assert_eq!(*index, tile.index, "Tile stored under the wrong index");
            assert!(
                self.columns
                    .get(&index.column())
                    .is_some_and(|levels| levels.contains(&index.z)),
                "Tile {index:?} is missing from the column index"
            );
        }

        assert_eq!(listed, self.tiles.len());
    }

    fn insert(&mut self, tile: Tile) {
        let index = tile.index;
        self.tiles.insert(index, tile);
        self.columns.entry(index.column()).or_default().insert(index.z);
    }

    fn take(&mut self, index: Index3) -> Option<Tile> {
        let tile = self.tiles.remove(&index)?;

        let column = index.column();
        if let Some(levels) = self.columns.get_mut(&column) {
            levels.remove(&index.z);
            if levels.is_empty() {
                self.columns.remove(&column);
            }
        }

        Some(tile)
    }
}

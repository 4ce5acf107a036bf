//! Tiles and the substitution partials built from them.

use std::sync::Arc;

use crate::coord::TileCoord;

/// A loaded tile: one coordinate and the payload the loader produced
/// for it. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile<T> {
    pub coord: TileCoord,
    pub payload: T,
}

impl<T> Tile<T> {
    pub fn new(coord: TileCoord, payload: T) -> Self {
        Self { coord, payload }
    }
}

/// A stored tile standing in for a requested coord.
///
/// `target` is the coord the renderer asked for. `relative` is the coord
/// whose slot the tile is drawn into: `target` itself for exact and
/// ancestor matches, the descendant's own coord for descendant matches.
/// The triple is enough to derive a UV sub-rectangle and a screen offset
/// without walking the hierarchy again.
#[derive(Debug, Clone)]
pub struct TilePartial<T> {
    pub tile: Arc<Tile<T>>,
    pub target: TileCoord,
    pub relative: TileCoord,
}

impl<T> TilePartial<T> {
    /// The requested tile itself.
    pub fn exact(tile: Arc<Tile<T>>) -> Self {
        let target = tile.coord;
        Self {
            tile,
            target,
            relative: target,
        }
    }

    /// An ancestor tile sub-sampled over the whole target slot.
    pub fn from_ancestor(tile: Arc<Tile<T>>, target: TileCoord) -> Self {
        debug_assert!(tile.coord.is_ancestor_of(&target));
        Self {
            tile,
            target,
            relative: target,
        }
    }

    /// A descendant tile covering its own fraction of the target slot.
    pub fn from_descendant(tile: Arc<Tile<T>>, target: TileCoord) -> Self {
        debug_assert!(tile.coord.is_descendant_of(&target));
        let relative = tile.coord;
        Self {
            tile,
            target,
            relative,
        }
    }
}

//! Plot-pixel and texture-space math for LOD substitutes.

use std::sync::Arc;

use crate::coord::TileCoord;
use crate::tile::{Tile, TilePartial};

/// Sub-rectangle of a tile texture in [0, 1] UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub h: f64,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect {
        u: 0.0,
        v: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// The sub-square of ancestor `ancestor`'s texture that corresponds
    /// to descendant `descendant`.
    pub fn sub_rect(ancestor: TileCoord, descendant: TileCoord) -> UvRect {
        debug_assert!(
            ancestor == descendant || ancestor.is_ancestor_of(&descendant),
            "uv sub-rect of unrelated coords {ancestor} and {descendant}"
        );
        let scale = (-f64::from(descendant.z - ancestor.z)).exp2();
        UvRect {
            u: descendant.x as f64 * scale - ancestor.x as f64,
            v: descendant.y as f64 * scale - ancestor.y as f64,
            w: scale,
            h: scale,
        }
    }
}

/// One draw call substituting a stored tile into a target slot.
#[derive(Debug, Clone)]
pub struct Renderable<T> {
    pub tile: Arc<Tile<T>>,
    /// Magnification of the tile texture relative to the target slot:
    /// 1 for the tile itself, 2^dz for an ancestor dz levels up,
    /// 2^-dz for a descendant dz levels down.
    pub scale: f64,
    /// Top-left corner of the draw rect in plot pixels.
    pub tile_offset: [f64; 2],
    pub uv: UvRect,
}

impl<T> Renderable<T> {
    /// Realize a substitution given the layer's tile size and the
    /// current viewport offset in plot pixels.
    pub fn from_partial(partial: &TilePartial<T>, tile_size: f64, view_offset: [f64; 2]) -> Self {
        let target = partial.target;
        let relative = partial.relative;
        let tile_coord = partial.tile.coord;

        // fraction of the target slot occupied by the relative coord
        let slot = (f64::from(target.z) - f64::from(relative.z)).exp2();
        let scale = (f64::from(target.z) - f64::from(tile_coord.z)).exp2();

        let uv = if tile_coord.z < target.z {
            UvRect::sub_rect(tile_coord, target)
        } else {
            UvRect::FULL
        };

        Renderable {
            tile: Arc::clone(&partial.tile),
            scale,
            tile_offset: [
                relative.x as f64 * slot * tile_size - view_offset[0],
                relative.y as f64 * slot * tile_size - view_offset[1],
            ],
            uv,
        }
    }
}

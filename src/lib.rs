//! Slippy Core - Tile pyramid cache and LOD scheduler for tiled-map viewing.
//!
//! This crate provides:
//! - A bounded tile store with pinned low-zoom levels and LRU eviction
//! - Deduplicated, cancellable request tracking with stale-response discard
//! - Level-of-detail substitution from the closest ancestor or a covering
//!   set of descendants
//! - Synchronous lifecycle events for renderer integration
//!
//! The pyramid is loader-agnostic: the enclosing layer supplies a
//! [`TileLoader`] that resolves a [`LoadTicket`] per request, either
//! synchronously or on a later turn, and a [`ViewportQuery`] used to
//! drop responses whose coords have left the view. Lifecycle events
//! ([`TileEvent`]) are delivered to the layer's [`EventSink`].

mod coord;
mod error;
mod events;
mod loader;
mod pyramid;
mod registry;
mod render;
mod store;
mod tile;
mod viewport;
#[cfg(test)]
pub(crate) mod test_utils;

pub use coord::{TileCoord, MAX_ZOOM};
pub use error::{TileError, TileResult};
pub use events::{EventSink, TileEvent};
pub use loader::{LoadTicket, TileLoader};
pub use pyramid::{PyramidConfig, TilePyramid};
pub use render::{Renderable, UvRect};
pub use store::TileStore;
pub use tile::{Tile, TilePartial};
pub use viewport::ViewportQuery;

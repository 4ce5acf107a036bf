//! Lifecycle notifications emitted by the pyramid.

use std::sync::Arc;

use crate::coord::TileCoord;
use crate::error::TileError;
use crate::tile::Tile;

/// A pyramid lifecycle event.
///
/// Events are emitted synchronously after the state change they
/// describe; observers always see the post-change pyramid. Tiles are
/// shared read-only.
#[derive(Debug, Clone)]
pub enum TileEvent<T> {
    /// A coord was dispatched to the loader.
    Request(TileCoord),
    /// A fresh response was inserted into the store.
    Add(Arc<Tile<T>>),
    /// The loader reported an error for a fresh request.
    Failure(TileCoord, TileError),
    /// A stale response, or a fresh response whose coord left the view.
    Discard(TileCoord),
    /// A tile left the store, by eviction or by clear.
    Remove(Arc<Tile<T>>),
    /// The pending registry drained with at least one fresh completion.
    Load,
}

impl<T> TileEvent<T> {
    /// Wire name under which the enclosing layer re-emits the event.
    pub fn name(&self) -> &'static str {
        match self {
            TileEvent::Request(_) => "tile:request",
            TileEvent::Add(_) => "tile:add",
            TileEvent::Failure(..) => "tile:failure",
            TileEvent::Discard(_) => "tile:discard",
            TileEvent::Remove(_) => "tile:remove",
            TileEvent::Load => "load",
        }
    }
}

/// Receiver for pyramid events, provided by the enclosing layer.
pub trait EventSink<T>: Send + Sync {
    fn emit(&self, event: TileEvent<T>);
}

//! Loader interface and single-use completion tickets.

use std::sync::Arc;

use crate::coord::TileCoord;
use crate::error::{TileError, TileResult};
use crate::pyramid::PyramidShared;

/// Source of tile payloads, provided by the enclosing layer.
///
/// `load` receives the normalized coord and a ticket to resolve with
/// the outcome. The ticket may be completed synchronously from inside
/// `load` or handed off and completed on any later turn; the pyramid
/// supports both.
pub trait TileLoader<T>: Send + Sync {
    fn load(&self, coord: TileCoord, ticket: LoadTicket<T>);
}

/// Completion handle for one dispatched request.
///
/// Consuming `complete` enforces the exactly-once callback contract. A
/// ticket dropped without completion resolves as a failure, so a buggy
/// loader cannot leave its coord pending forever.
pub struct LoadTicket<T> {
    coord: TileCoord,
    shared: Option<Arc<PyramidShared<T>>>,
}

impl<T> LoadTicket<T> {
    pub(crate) fn new(shared: Arc<PyramidShared<T>>, coord: TileCoord) -> Self {
        Self {
            coord,
            shared: Some(shared),
        }
    }

    /// The normalized coord this ticket answers for.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Resolve the request with the loader's outcome.
    pub fn complete(mut self, result: TileResult<T>) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(self.coord, result);
        }
    }
}

impl<T> Drop for LoadTicket<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.resolve(self.coord, Err(TileError::TicketDropped));
        }
    }
}

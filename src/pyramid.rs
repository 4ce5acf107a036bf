//! Tile pyramid core: request orchestration, caching, LOD lookup.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::coord::TileCoord;
use crate::error::TileResult;
use crate::events::{EventSink, TileEvent};
use crate::loader::{LoadTicket, TileLoader};
use crate::registry::{PendingRegistry, StaleRegistry};
use crate::store::TileStore;
use crate::tile::{Tile, TilePartial};
use crate::viewport::ViewportQuery;

/// How many levels below a target the descendant search descends.
/// Three levels is 64 draws per missing tile at worst; deeper covers
/// cost more draw calls than they add detail.
const MAX_DESCENDANT_DEPTH: u32 = 3;

/// Tile pyramid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyramidConfig {
    /// Capacity of the volatile LRU region.
    pub cache_size: usize,
    /// Number of low zoom levels (z in 0..persistent_levels) whose
    /// tiles are pinned and never evict.
    pub persistent_levels: u32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            cache_size: 256,
            persistent_levels: 4,
        }
    }
}

impl PyramidConfig {
    /// Total pinned slots across the persistent levels.
    pub fn num_persistent_tiles(&self) -> usize {
        TileStore::<()>::persistent_capacity(self.persistent_levels)
    }
}

struct PyramidState<T> {
    store: TileStore<T>,
    pending: PendingRegistry,
    stale: StaleRegistry,
}

/// State shared between the pyramid and its outstanding load tickets.
pub(crate) struct PyramidShared<T> {
    state: Mutex<PyramidState<T>>,
    viewport: Arc<dyn ViewportQuery>,
    events: Arc<dyn EventSink<T>>,
}

impl<T> PyramidShared<T> {
    /// Resolve one dispatched request. Runs on the pyramid's execution
    /// context, either synchronously from inside the loader call or on
    /// a later turn.
    pub(crate) fn resolve(&self, coord: TileCoord, result: TileResult<T>) {
        let mut queued: Vec<TileEvent<T>> = Vec::new();
        {
            let mut state = self.state.lock();
            if state.stale.pop(&coord) {
                // Cancelled by a clear before this response landed.
                trace!(tile = %coord, "discarding stale response");
                queued.push(TileEvent::Discard(coord));
            } else if state.pending.remove(&coord) {
                match result {
                    Ok(payload) => {
                        if self.viewport.is_in_view(coord, true) {
                            let tile = Arc::new(Tile::new(coord, payload));
                            if let Some(evicted) = state.store.insert(Arc::clone(&tile)) {
                                queued.push(TileEvent::Remove(evicted));
                            }
                            queued.push(TileEvent::Add(tile));
                        } else {
                            trace!(tile = %coord, "discarding response that left the view");
                            queued.push(TileEvent::Discard(coord));
                        }
                    }
                    Err(err) => {
                        warn!(tile = %coord, error = %err, "loader failure");
                        queued.push(TileEvent::Failure(coord, err));
                    }
                }
                // This resolution is itself a fresh completion, so a
                // drained registry always warrants the load signal.
                if state.pending.is_empty() {
                    queued.push(TileEvent::Load);
                }
            } else {
                trace!(tile = %coord, "response for an untracked coord");
            }
        }
        for event in queued {
            self.events.emit(event);
        }
    }
}

/// Tile cache, scheduler, and LOD oracle for one tiled layer.
///
/// The pyramid decides which coords need loading, deduplicates and
/// cancels requests, retains a bounded working set with the low zoom
/// levels pinned as a permanent fallback, and answers every lookup with
/// the tile itself or the best available substitute.
///
/// All state transitions happen on the caller's execution context. The
/// loader may resolve its ticket from inside `request_tiles` or from
/// any later turn; intervening `clear` or `request_tiles` calls are
/// handled by the pending/stale bookkeeping.
pub struct TilePyramid<T> {
    shared: Arc<PyramidShared<T>>,
    loader: Arc<dyn TileLoader<T>>,
    config: PyramidConfig,
}

impl<T> TilePyramid<T> {
    pub fn new(
        config: PyramidConfig,
        loader: Arc<dyn TileLoader<T>>,
        viewport: Arc<dyn ViewportQuery>,
        events: Arc<dyn EventSink<T>>,
    ) -> Self {
        let state = PyramidState {
            store: TileStore::new(config.cache_size, config.persistent_levels),
            pending: PendingRegistry::default(),
            stale: StaleRegistry::default(),
        };
        Self {
            shared: Arc::new(PyramidShared {
                state: Mutex::new(state),
                viewport,
                events,
            }),
            loader,
            config,
        }
    }

    /// Request every coord that is not already stored or in flight.
    /// Batch duplicates and horizontal wrap duplicates collapse to one
    /// loader call; out-of-band coords are dropped.
    pub fn request_tiles(&self, coords: &[TileCoord]) {
        let mut dispatch = Vec::new();
        {
            let mut state = self.shared.state.lock();
            let mut seen = HashSet::new();
            for coord in coords {
                if !coord.is_valid() {
                    trace!(tile = %coord, "filtered out-of-band coord");
                    continue;
                }
                let normalized = coord.normalize();
                if !seen.insert(normalized) {
                    continue;
                }
                if state.store.contains(&normalized) || state.pending.contains(&normalized) {
                    continue;
                }
                state.pending.insert(normalized);
                dispatch.push(normalized);
            }
        }
        for coord in dispatch {
            debug!(tile = %coord, "requesting tile");
            self.shared.events.emit(TileEvent::Request(coord));
            let ticket = LoadTicket::new(Arc::clone(&self.shared), coord);
            self.loader.load(coord, ticket);
        }
    }

    /// Request the coords the target viewport currently needs.
    pub fn refresh(&self) {
        let coords = self.shared.viewport.target_visible_coords();
        self.request_tiles(&coords);
    }

    /// Cancel every pending request and drop every stored tile.
    ///
    /// Responses for cancelled requests are discarded when they land.
    /// As soon as this returns, `has` and `is_pending` are false for
    /// every coord, even those whose loader ticket resolves later.
    pub fn clear(&self) {
        let mut queued = Vec::new();
        {
            let mut state = self.shared.state.lock();
            let cancelled = state.pending.drain();
            for coord in cancelled {
                state.stale.push(coord);
            }
            for tile in state.store.drain() {
                queued.push(TileEvent::Remove(tile));
            }
        }
        debug!(removed = queued.len(), "cleared tile pyramid");
        for event in queued {
            self.shared.events.emit(event);
        }
    }

    /// The stored tile for `coord`, if present. Promotes volatile
    /// entries to most-recently-used.
    pub fn get(&self, coord: &TileCoord) -> Option<Arc<Tile<T>>> {
        self.shared.state.lock().store.get(&coord.normalize())
    }

    pub fn has(&self, coord: &TileCoord) -> bool {
        self.shared.state.lock().store.contains(&coord.normalize())
    }

    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.shared.state.lock().pending.contains(&coord.normalize())
    }

    /// Total capacity: volatile LRU slots plus pinned slots.
    pub fn capacity(&self) -> usize {
        self.config.cache_size + self.config.num_persistent_tiles()
    }

    /// Number of stored tiles.
    pub fn len(&self) -> usize {
        self.shared.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().store.is_empty()
    }

    /// Number of requests in flight.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// The closest stored ancestor of `coord`, walking up to the root.
    pub fn closest_ancestor(&self, coord: &TileCoord) -> Option<TileCoord> {
        let normalized = coord.normalize();
        let state = self.shared.state.lock();
        Self::closest_stored_ancestor(&state.store, &normalized)
    }

    fn closest_stored_ancestor(store: &TileStore<T>, coord: &TileCoord) -> Option<TileCoord> {
        (1..=coord.z)
            .filter_map(|offset| coord.ancestor(offset))
            .find(|candidate| store.contains(candidate))
    }

    /// The minimal set of stored descendants whose footprints cover
    /// `coord`, searching at most `MAX_DESCENDANT_DEPTH` levels down.
    /// None when no complete cover exists.
    pub fn descendants(&self, coord: &TileCoord) -> Option<Vec<Arc<Tile<T>>>> {
        let normalized = coord.normalize();
        let mut state = self.shared.state.lock();
        let mut cover = Vec::new();
        if Self::cover_descendants(&mut state.store, &normalized, MAX_DESCENDANT_DEPTH, &mut cover)
        {
            Some(cover)
        } else {
            None
        }
    }

    /// Depth-first cover in row-major child order: a stored tile covers
    /// its own quadrant, otherwise all four of its children must cover
    /// theirs.
    fn cover_descendants(
        store: &mut TileStore<T>,
        coord: &TileCoord,
        depth: u32,
        cover: &mut Vec<Arc<Tile<T>>>,
    ) -> bool {
        if depth == 0 {
            return false;
        }
        for child in coord.children() {
            if let Some(tile) = store.get(&child) {
                cover.push(tile);
            } else if !Self::cover_descendants(store, &child, depth - 1, cover) {
                return false;
            }
        }
        true
    }

    /// The substitution oracle: the tile itself, else the closest
    /// ancestor sub-sampled over the slot, else a covering set of
    /// descendants, else None.
    pub fn available_lod(&self, coord: &TileCoord) -> Option<Vec<TilePartial<T>>> {
        let normalized = coord.normalize();
        let mut state = self.shared.state.lock();

        if let Some(tile) = state.store.get(&normalized) {
            return Some(vec![TilePartial::exact(tile)]);
        }

        if let Some(ancestor) = Self::closest_stored_ancestor(&state.store, &normalized) {
            if let Some(tile) = state.store.get(&ancestor) {
                return Some(vec![TilePartial::from_ancestor(tile, normalized)]);
            }
        }

        let mut cover = Vec::new();
        if Self::cover_descendants(&mut state.store, &normalized, MAX_DESCENDANT_DEPTH, &mut cover)
        {
            return Some(
                cover
                    .into_iter()
                    .map(|tile| TilePartial::from_descendant(tile, normalized))
                    .collect(),
            );
        }

        None
    }
}

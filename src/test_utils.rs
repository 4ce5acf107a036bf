//! Test fixtures shared across module tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::coord::TileCoord;
use crate::error::TileResult;
use crate::events::{EventSink, TileEvent};
use crate::loader::{LoadTicket, TileLoader};
use crate::viewport::ViewportQuery;

/// Loader that parks tickets for manual resolution.
pub(crate) struct ManualLoader<T> {
    calls: Mutex<Vec<TileCoord>>,
    tickets: Mutex<Vec<(TileCoord, LoadTicket<T>)>>,
}

impl<T> ManualLoader<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            tickets: Mutex::new(Vec::new()),
        })
    }

    /// Coords the pyramid has dispatched so far, in order.
    pub fn calls(&self) -> Vec<TileCoord> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Resolve the oldest parked ticket.
    pub fn resolve_next(&self, result: TileResult<T>) {
        let (_, ticket) = {
            let mut tickets = self.tickets.lock();
            assert!(!tickets.is_empty(), "no parked ticket");
            tickets.remove(0)
        };
        ticket.complete(result);
    }

    /// Resolve the newest parked ticket.
    pub fn resolve_last(&self, result: TileResult<T>) {
        let (_, ticket) = {
            let mut tickets = self.tickets.lock();
            assert!(!tickets.is_empty(), "no parked ticket");
            let last = tickets.len() - 1;
            tickets.remove(last)
        };
        ticket.complete(result);
    }

    /// Resolve the oldest parked ticket for `coord`.
    pub fn resolve(&self, coord: TileCoord, result: TileResult<T>) {
        let ticket = {
            let mut tickets = self.tickets.lock();
            let pos = tickets
                .iter()
                .position(|(c, _)| *c == coord)
                .unwrap_or_else(|| panic!("no parked ticket for {coord}"));
            tickets.remove(pos).1
        };
        ticket.complete(result);
    }

    /// Drop the oldest parked ticket without completing it.
    pub fn drop_next(&self) {
        let mut tickets = self.tickets.lock();
        assert!(!tickets.is_empty(), "no parked ticket");
        let (_, ticket) = tickets.remove(0);
        drop(tickets);
        drop(ticket);
    }
}

impl<T: Send + Sync> TileLoader<T> for ManualLoader<T> {
    fn load(&self, coord: TileCoord, ticket: LoadTicket<T>) {
        debug_assert_eq!(ticket.coord(), coord);
        self.calls.lock().push(coord);
        self.tickets.lock().push((coord, ticket));
    }
}

/// Event sink that records everything it is handed.
pub(crate) struct RecordingSink<T> {
    events: Mutex<Vec<TileEvent<T>>>,
}

impl<T> RecordingSink<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TileEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().into_iter().filter(|n| *n == name).count()
    }

    pub fn take(&self) -> Vec<TileEvent<T>> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<T: Send + Sync> EventSink<T> for RecordingSink<T> {
    fn emit(&self, event: TileEvent<T>) {
        self.events.lock().push(event);
    }
}

/// Viewport stub with a settable blanket answer.
pub(crate) struct MockViewport {
    in_view: Mutex<bool>,
    checked: Mutex<Vec<TileCoord>>,
    target: Mutex<Vec<TileCoord>>,
}

impl MockViewport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            in_view: Mutex::new(true),
            checked: Mutex::new(Vec::new()),
            target: Mutex::new(Vec::new()),
        })
    }

    pub fn set_in_view(&self, in_view: bool) {
        *self.in_view.lock() = in_view;
    }

    pub fn set_target(&self, coords: Vec<TileCoord>) {
        *self.target.lock() = coords;
    }

    /// Coords the pyramid asked about, in order.
    pub fn checked(&self) -> Vec<TileCoord> {
        self.checked.lock().clone()
    }
}

impl ViewportQuery for MockViewport {
    fn is_in_view(&self, coord: TileCoord, _wraparound: bool) -> bool {
        self.checked.lock().push(coord);
        *self.in_view.lock()
    }

    fn target_visible_coords(&self) -> Vec<TileCoord> {
        self.target.lock().clone()
    }
}

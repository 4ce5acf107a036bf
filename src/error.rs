//! Error types for slippy_core.

use thiserror::Error;

/// Error types for tile operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileError {
    /// The loader reported a failure for a requested tile.
    #[error("failed to load tile: {0}")]
    Load(String),

    /// A load ticket was dropped without being completed.
    #[error("load ticket dropped before completion")]
    TicketDropped,
}

/// Result type alias for tile operations.
pub type TileResult<T> = Result<T, TileError>;

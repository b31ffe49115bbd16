//! Presentation-facing controllers
//!
//! Each controller owns its state behind watch channels and runs its work on a
//! spawned task, so callers never block while a search or page is in flight.

use tokio::sync::mpsc::{self, error::TrySendError};

pub mod detail;
pub mod pagination;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::DetailController;
pub use pagination::{PageEvents, PaginationController};
pub use search::{SearchController, SearchEvents};

/// Capacity of every controller event channel
///
/// Events are dropped once a listener falls this far behind; the watched state
/// still carries everything they announced.
pub const EVENT_BUFFER: usize = 16;

/// Queues an event without waiting on a slow or absent listener
pub(crate) fn emit<T>(tx: &mpsc::Sender<T>, event: T, channel: &'static str) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!(channel = channel, "Event listener lagging, event dropped");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(channel = channel, "No listener for events");
        }
    }
}

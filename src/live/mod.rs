//! Live subscriptions — stream store snapshots into consumer state.
//!
//! # Overview
//!
//! [`DocumentSubscriber`] and [`CollectionSubscriber`] each own at most one
//! open store subscription. The consumer drives them with a memoized target
//! (`Option<Arc<_>>` from [`Memoized`](crate::query::Memoized)):
//!
//! - Pointer-equal target → no-op.
//! - Changed target → the prior subscription is torn down, then exactly one
//!   new one opens.
//! - `None` target → idle state, no network activity.
//!
//! Every delivery closure captures the generation current at open time and
//! re-checks it under the state lock, so a snapshot arriving after teardown
//! (scope destroyed or target changed) never mutates state.
//!
//! # Modules
//!
//! - [`document`] — [`DocumentSubscriber`].
//! - [`collection`] — [`CollectionSubscriber`].

pub mod collection;
pub mod document;

pub use collection::CollectionSubscriber;
pub use document::DocumentSubscriber;

use std::sync::Arc;

use crate::error::ClientError;

// ============================================================================
// LiveState
// ============================================================================

/// The loading/error/data triple delivered to live-subscription callbacks.
#[derive(Debug, Clone)]
pub struct LiveState<T> {
    /// Latest snapshot. `None` before the first snapshot, for a null target,
    /// or for an absent document.
    pub data: Option<T>,
    /// True from subscription open until the first snapshot or error.
    pub is_loading: bool,
    /// Latest subscription error. Never cleared by a later error, only by a
    /// later successful snapshot. Errors are not retried.
    pub error: Option<ClientError>,
}

impl<T> LiveState<T> {
    /// No target: nothing loading, nothing loaded.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    /// Subscription opening: waiting on the first snapshot.
    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }
}

impl<T> Default for LiveState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Delivery callback for live state updates.
pub type LiveStateFn<T> = Arc<dyn Fn(&LiveState<T>) + Send + Sync>;

//! Consumed service contracts — the remote document store and auth gateway.
//!
//! Both services are black boxes behind traits: the application wires in a
//! concrete client (HTTP, WebSocket, an SDK binding) at startup and this
//! crate never learns the wire protocol. Mirrors the shape of a
//! user-provided transport layer: async request/response methods for reads
//! and writes, callback registration for the push half.
//!
//! # Callback discipline
//!
//! Subscription callbacks are `Arc<dyn Fn(..) + Send + Sync>` and may be
//! invoked from the store's own delivery context at any time until the
//! returned [`Unsubscribe`] closure runs. After that closure returns, the
//! store must not invoke the callbacks again.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::{ClientError, Result},
    query::{CollectionPath, DocumentPath, QueryDescriptor},
    types::Principal,
};

// ============================================================================
// Callback aliases
// ============================================================================

/// An owned one-shot closure that cancels a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Delivery callback for document snapshots. `None` means the document is
/// absent (missing or deleted).
pub type DocSnapshotFn = Arc<dyn Fn(Option<Value>) + Send + Sync>;

/// Delivery callback for query snapshots: the full matching set, each record
/// tagged with its identifier.
pub type QuerySnapshotFn = Arc<dyn Fn(Vec<(String, Value)>) + Send + Sync>;

/// Error callback for a live subscription.
pub type SubscribeErrorFn = Arc<dyn Fn(ClientError) + Send + Sync>;

/// Session callback for the auth gateway. `None` means signed out.
pub type SessionFn = Arc<dyn Fn(Option<Principal>) + Send + Sync>;

// ============================================================================
// DocumentStore
// ============================================================================

/// Write options for [`DocumentStore::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it.
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }
}

/// Application-provided client for the remote document database.
///
/// Write futures resolve on server acknowledgment and reject with a
/// [`ClientError::Store`] whose [`ErrorCode`](crate::error::ErrorCode)
/// distinguishes permission denials from other failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot read of a single document. `Ok(None)` means absent.
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>>;

    /// One-shot query execution: the matching set of `(id, data)` pairs.
    async fn run_query(&self, query: &QueryDescriptor) -> Result<Vec<(String, Value)>>;

    /// Live subscription to a single document. `on_snapshot` fires with the
    /// current value immediately on registration and again on every change.
    fn subscribe_document(
        &self,
        path: &DocumentPath,
        on_snapshot: DocSnapshotFn,
        on_error: SubscribeErrorFn,
    ) -> Unsubscribe;

    /// Live subscription to a query. Same delivery contract as
    /// [`subscribe_document`](Self::subscribe_document).
    fn subscribe_query(
        &self,
        query: &QueryDescriptor,
        on_snapshot: QuerySnapshotFn,
        on_error: SubscribeErrorFn,
    ) -> Unsubscribe;

    /// Create a document with a server-assigned id; resolves with the id.
    async fn create(&self, collection: &CollectionPath, data: Value) -> Result<String>;

    /// Write a document at a known path, replacing or merging per `opts`.
    async fn set(&self, path: &DocumentPath, data: Value, opts: SetOptions) -> Result<()>;

    /// Partial update of an existing document.
    async fn update(&self, path: &DocumentPath, data: Value) -> Result<()>;

    /// Delete a document.
    async fn delete(&self, path: &DocumentPath) -> Result<()>;
}

// ============================================================================
// AuthGateway
// ============================================================================

/// Application-provided client for the authentication service.
pub trait AuthGateway: Send + Sync {
    /// Register for session changes. `on_session` fires with the current
    /// principal (or `None`) immediately on registration and again on every
    /// sign-in/sign-out; `on_error` fires on transport failures.
    fn subscribe(&self, on_session: SessionFn, on_error: SubscribeErrorFn) -> Unsubscribe;
}

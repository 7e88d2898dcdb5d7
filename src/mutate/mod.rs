//! Non-blocking mutation dispatch.
//!
//! Writes are issued as detached tasks so the caller's control flow never
//! waits on the network. Failure visibility is asymmetric by design:
//!
//! - `set` / `update` / `delete` are strictly fire-and-forget — the only
//!   failure channel is the [`ErrorBus`].
//! - `create` is the one operation whose result the caller structurally
//!   needs (the new identifier), so it returns a [`PendingCreate`] future
//!   *and* still publishes failures on the bus (dual delivery).
//!
//! Each mutation reaches the store exactly once; there is no retry, batching,
//! or reordering. Tasks are spawned in call order; completion order depends
//! on the store and is not guaranteed.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::warn;

use crate::{
    connection::ConnectionContext,
    diag::{ErrorBus, ErrorEvent, WriteFailure, WriteKind},
    error::{ClientError, ErrorCode},
    query::{CollectionPath, DocumentPath},
    remote::{DocumentStore, SetOptions},
};

// ============================================================================
// PendingCreate
// ============================================================================

/// The eventual outcome of a dispatched create.
///
/// The write is already in flight when this handle is returned; awaiting it
/// is optional and only needed to obtain the new identifier.
pub struct PendingCreate {
    path: String,
    rx: oneshot::Receiver<Result<String, WriteFailure>>,
}

impl PendingCreate {
    /// Resolve to the new document's identifier, or the same
    /// [`WriteFailure`] that was published on the bus.
    pub async fn id(self) -> Result<String, WriteFailure> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // The dispatch task never completed (runtime shutdown mid-write).
            Err(_) => Err(WriteFailure {
                path: self.path,
                operation: WriteKind::Create,
                code: Some(ErrorCode::Internal),
                request_resource_data: None,
                timestamp: Utc::now(),
            }),
        }
    }
}

// ============================================================================
// MutationDispatcher
// ============================================================================

/// Dispatches create/set/update/delete against the store without blocking
/// the caller.
///
/// Must be used from within a tokio runtime (writes are spawned tasks).
pub struct MutationDispatcher {
    store: Arc<dyn DocumentStore>,
    bus: Arc<ErrorBus>,
}

impl MutationDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, bus: Arc<ErrorBus>) -> Self {
        Self { store, bus }
    }

    /// Convenience constructor over a connection context.
    pub fn for_context(ctx: &ConnectionContext, bus: Arc<ErrorBus>) -> Self {
        Self::new(Arc::clone(ctx.store()), bus)
    }

    /// Start a create; returns immediately with a [`PendingCreate`].
    ///
    /// On rejection the failure is published on the bus *and* rejects the
    /// returned handle, so a global listener and a local caller both see it.
    pub fn dispatch_create(&self, collection: &CollectionPath, data: Value) -> PendingCreate {
        let (tx, rx) = oneshot::channel();
        let store = Arc::clone(&self.store);
        let bus = Arc::clone(&self.bus);
        let collection = collection.clone();
        let path = collection.as_str().to_string();

        tokio::spawn(async move {
            match store.create(&collection, data.clone()).await {
                Ok(id) => {
                    let _ = tx.send(Ok(id));
                }
                Err(error) => {
                    let failure = write_failure(
                        collection.as_str(),
                        WriteKind::Create,
                        Some(data),
                        &error,
                    );
                    publish(&bus, failure.clone());
                    let _ = tx.send(Err(failure));
                }
            }
        });

        PendingCreate { path, rx }
    }

    /// Fire-and-forget set. Failures surface only on the bus.
    pub fn dispatch_set(&self, path: &DocumentPath, data: Value, opts: SetOptions) {
        let store = Arc::clone(&self.store);
        let bus = Arc::clone(&self.bus);
        let path = path.clone();

        tokio::spawn(async move {
            if let Err(error) = store.set(&path, data.clone(), opts).await {
                publish(
                    &bus,
                    write_failure(path.as_str(), WriteKind::Set, Some(data), &error),
                );
            }
        });
    }

    /// Fire-and-forget update. Failures surface only on the bus.
    pub fn dispatch_update(&self, path: &DocumentPath, data: Value) {
        let store = Arc::clone(&self.store);
        let bus = Arc::clone(&self.bus);
        let path = path.clone();

        tokio::spawn(async move {
            if let Err(error) = store.update(&path, data.clone()).await {
                publish(
                    &bus,
                    write_failure(path.as_str(), WriteKind::Update, Some(data), &error),
                );
            }
        });
    }

    /// Fire-and-forget delete. Failures surface only on the bus.
    pub fn dispatch_delete(&self, path: &DocumentPath) {
        let store = Arc::clone(&self.store);
        let bus = Arc::clone(&self.bus);
        let path = path.clone();

        tokio::spawn(async move {
            if let Err(error) = store.delete(&path).await {
                publish(
                    &bus,
                    write_failure(path.as_str(), WriteKind::Delete, None, &error),
                );
            }
        });
    }
}

fn write_failure(
    path: &str,
    operation: WriteKind,
    request_data: Option<Value>,
    error: &ClientError,
) -> WriteFailure {
    WriteFailure {
        path: path.to_string(),
        operation,
        code: error.code(),
        request_resource_data: request_data,
        timestamp: Utc::now(),
    }
}

fn publish(bus: &ErrorBus, failure: WriteFailure) {
    warn!(
        path = %failure.path,
        operation = %failure.operation,
        code = ?failure.code,
        "dispatched mutation failed"
    );
    bus.publish(ErrorEvent::Permission(failure));
}

//! CollectionSubscriber — live view of a collection query's matching set.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::ClientError,
    query::QueryDescriptor,
    remote::{DocumentStore, Unsubscribe},
    types::Document,
};

use super::{LiveState, LiveStateFn};

struct Inner {
    target: Option<Arc<QueryDescriptor>>,
    state: LiveState<Vec<Document>>,
    unsub: Option<Unsubscribe>,
    /// Bumped on every teardown; delivery closures compare against the value
    /// captured at open time and drop stale snapshots.
    generation: u64,
}

/// Live subscription slot for one collection query.
pub struct CollectionSubscriber {
    store: Arc<dyn DocumentStore>,
    inner: Arc<Mutex<Inner>>,
    callback: LiveStateFn<Vec<Document>>,
}

impl CollectionSubscriber {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        callback: impl Fn(&LiveState<Vec<Document>>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            inner: Arc::new(Mutex::new(Inner {
                target: None,
                state: LiveState::idle(),
                unsub: None,
                generation: 0,
            })),
            callback: Arc::new(callback),
        }
    }

    /// Latest delivered state.
    pub fn state(&self) -> LiveState<Vec<Document>> {
        self.inner.lock().state.clone()
    }

    /// Point the subscriber at `target`; identity semantics as
    /// [`DocumentSubscriber::set_target`](super::DocumentSubscriber::set_target).
    pub fn set_target(&self, target: Option<Arc<QueryDescriptor>>) {
        let (old_unsub, gen, query) = {
            let mut inner = self.inner.lock();

            let unchanged = match (&inner.target, &target) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            };
            if unchanged {
                return;
            }

            inner.generation += 1;
            let old_unsub = inner.unsub.take();
            inner.target = target.clone();
            inner.state = match &target {
                None => LiveState::idle(),
                Some(_) => LiveState::loading(),
            };
            (old_unsub, inner.generation, target)
        };

        if let Some(unsub) = old_unsub {
            unsub();
        }

        let query = match query {
            None => {
                (self.callback)(&LiveState::idle());
                return;
            }
            Some(query) => query,
        };

        (self.callback)(&LiveState::loading());
        debug!(collection = %query.collection, "query subscription opening");

        let on_snapshot = {
            let inner = Arc::clone(&self.inner);
            let callback = Arc::clone(&self.callback);
            let query = Arc::clone(&query);
            Arc::new(move |records: Vec<(String, Value)>| {
                let state = {
                    let mut inner = inner.lock();
                    if inner.generation != gen {
                        return;
                    }
                    match decode_all(query.collection.as_str(), records) {
                        Ok(docs) => {
                            inner.state = LiveState {
                                data: Some(docs),
                                is_loading: false,
                                error: None,
                            };
                        }
                        Err(e) => {
                            // Keep the last good data; surface the decode
                            // failure.
                            inner.state.is_loading = false;
                            inner.state.error = Some(e);
                        }
                    }
                    inner.state.clone()
                };
                callback(&state);
            })
        };

        let on_error = {
            let inner = Arc::clone(&self.inner);
            let callback = Arc::clone(&self.callback);
            let query = Arc::clone(&query);
            Arc::new(move |error: ClientError| {
                let state = {
                    let mut inner = inner.lock();
                    if inner.generation != gen {
                        return;
                    }
                    warn!(collection = %query.collection, %error, "query subscription error");
                    inner.state.is_loading = false;
                    inner.state.error = Some(error);
                    inner.state.clone()
                };
                callback(&state);
            })
        };

        let unsub = self.store.subscribe_query(&query, on_snapshot, on_error);

        let stale = {
            let mut inner = self.inner.lock();
            if inner.generation == gen {
                inner.unsub = Some(unsub);
                None
            } else {
                Some(unsub)
            }
        };
        if let Some(unsub) = stale {
            unsub();
        }
    }

    /// Tear down the subscription. No state update is delivered after this
    /// returns. Idempotent.
    pub fn stop(&self) {
        let unsub = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.target = None;
            inner.unsub.take()
        };
        if let Some(unsub) = unsub {
            unsub();
        }
    }
}

impl Drop for CollectionSubscriber {
    fn drop(&mut self) {
        self.stop();
    }
}

fn decode_all(
    collection: &str,
    records: Vec<(String, Value)>,
) -> Result<Vec<Document>, ClientError> {
    records
        .into_iter()
        .map(|(id, value)| {
            let path = format!("{collection}/{id}");
            Document::decode(&path, id, value)
        })
        .collect()
}

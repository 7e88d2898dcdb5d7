//! DocumentSubscriber — live view of a single document.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::ClientError,
    query::DocumentPath,
    remote::{DocumentStore, Unsubscribe},
    types::Document,
};

use super::{LiveState, LiveStateFn};

struct Inner {
    target: Option<Arc<DocumentPath>>,
    state: LiveState<Document>,
    unsub: Option<Unsubscribe>,
    /// Bumped on every teardown; delivery closures compare against the value
    /// captured at open time and drop stale snapshots.
    generation: u64,
}

/// Live subscription slot for one document path.
///
/// One consumer slot holds one `DocumentSubscriber`; re-renders feed it the
/// memoized target via [`set_target`](Self::set_target).
pub struct DocumentSubscriber {
    store: Arc<dyn DocumentStore>,
    inner: Arc<Mutex<Inner>>,
    callback: LiveStateFn<Document>,
}

impl DocumentSubscriber {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        callback: impl Fn(&LiveState<Document>) + Send + Sync + 'static,
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
    pub fn state(&self) -> LiveState<Document> {
        self.inner.lock().state.clone()
    }

    /// Point the subscriber at `target`.
    ///
    /// Pointer-equal target: no-op. Changed target: tears down the prior
    /// subscription, then delivers the idle state (for `None`) or the
    /// loading state followed by live snapshots (for `Some`).
    pub fn set_target(&self, target: Option<Arc<DocumentPath>>) {
        let (old_unsub, gen, path) = {
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

        // Outside the lock: detach the old subscription before opening the
        // new one, then deliver the transitional state.
        if let Some(unsub) = old_unsub {
            unsub();
        }

        let path = match path {
            None => {
                (self.callback)(&LiveState::idle());
                return;
            }
            Some(path) => path,
        };

        (self.callback)(&LiveState::loading());
        debug!(path = %path, "document subscription opening");

        let on_snapshot = {
            let inner = Arc::clone(&self.inner);
            let callback = Arc::clone(&self.callback);
            let path = Arc::clone(&path);
            Arc::new(move |value: Option<Value>| {
                let state = {
                    let mut inner = inner.lock();
                    if inner.generation != gen {
                        return;
                    }
                    match value {
                        None => {
                            inner.state = LiveState {
                                data: None,
                                is_loading: false,
                                error: None,
                            };
                        }
                        Some(value) => {
                            match Document::decode(path.as_str(), path.id(), value) {
                                Ok(doc) => {
                                    inner.state = LiveState {
                                        data: Some(doc),
                                        is_loading: false,
                                        error: None,
                                    };
                                }
                                Err(e) => {
                                    // Keep the last good data; surface the
                                    // decode failure.
                                    inner.state.is_loading = false;
                                    inner.state.error = Some(e);
                                }
                            }
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
            let path = Arc::clone(&path);
            Arc::new(move |error: ClientError| {
                let state = {
                    let mut inner = inner.lock();
                    if inner.generation != gen {
                        return;
                    }
                    warn!(path = %path, %error, "document subscription error");
                    inner.state.is_loading = false;
                    inner.state.error = Some(error);
                    inner.state.clone()
                };
                callback(&state);
            })
        };

        let unsub = self.store.subscribe_document(&path, on_snapshot, on_error);

        // Store the teardown handle only if this open is still current; a
        // concurrent set_target/stop already bumped the generation.
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

impl Drop for DocumentSubscriber {
    fn drop(&mut self) {
        self.stop();
    }
}

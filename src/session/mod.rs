//! Auth session tracking — republishes the gateway's session stream as
//! `AuthSession` snapshots.
//!
//! A consumer observes the session with a callback; the tracker delivers one
//! synchronous "loading" snapshot, then one resolved snapshot per gateway
//! event. Teardown detaches the gateway listener and flips a liveness flag
//! checked inside every delivery closure, so a late gateway callback after
//! [`SessionSubscription::stop`] is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    connection::ConnectionContext,
    error::ClientError,
    remote::Unsubscribe,
    types::Principal,
};

// ============================================================================
// AuthSession
// ============================================================================

/// Current authentication state.
///
/// `is_loading` is true only before the first gateway event; `principal` is
/// `Some` iff a user is currently authenticated. A non-null `error` means
/// the UI should treat the user as signed out.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub principal: Option<Principal>,
    pub is_loading: bool,
    pub error: Option<ClientError>,
}

impl AuthSession {
    /// Initial state, before the first gateway event.
    pub fn loading() -> Self {
        Self {
            principal: None,
            is_loading: true,
            error: None,
        }
    }

    /// A resolved session: signed in (`Some`) or signed out (`None`).
    pub fn resolved(principal: Option<Principal>) -> Self {
        Self {
            principal,
            is_loading: false,
            error: None,
        }
    }

    /// A terminal or transient failure from the auth service.
    pub fn failed(error: ClientError) -> Self {
        Self {
            principal: None,
            is_loading: false,
            error: Some(error),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.principal.is_some()
    }
}

/// Delivery callback for session snapshots.
pub type SessionObserverFn = Arc<dyn Fn(&AuthSession) + Send + Sync>;

// ============================================================================
// SessionSubscription
// ============================================================================

/// Handle to an active session observation.
///
/// Dropping the handle stops the observation.
pub struct SessionSubscription {
    state: Arc<Mutex<AuthSession>>,
    live: Arc<AtomicBool>,
    unsub: Option<Unsubscribe>,
}

impl SessionSubscription {
    /// Latest delivered session snapshot.
    pub fn current(&self) -> AuthSession {
        self.state.lock().clone()
    }

    /// Cancel the underlying gateway listener. No snapshot is delivered
    /// after this returns. Idempotent.
    pub fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(unsub) = self.unsub.take() {
            unsub();
            debug!("session observation stopped");
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// SessionTracker
// ============================================================================

/// Observes the connection's auth gateway and republishes session state.
pub struct SessionTracker;

impl SessionTracker {
    /// Start observing the session on `ctx`.
    ///
    /// `callback` fires synchronously with the loading snapshot, then once
    /// per gateway event. If the context has no auth gateway, a single
    /// terminal [`ClientError::AuthUnavailable`] snapshot is delivered and
    /// no listener is registered.
    pub fn observe(
        ctx: &ConnectionContext,
        callback: impl Fn(&AuthSession) + Send + Sync + 'static,
    ) -> SessionSubscription {
        let callback: SessionObserverFn = Arc::new(callback);
        let state = Arc::new(Mutex::new(AuthSession::loading()));
        let live = Arc::new(AtomicBool::new(true));

        callback(&AuthSession::loading());

        let gateway = match ctx.auth() {
            Some(gateway) => gateway,
            None => {
                let session = AuthSession::failed(ClientError::AuthUnavailable);
                *state.lock() = session.clone();
                callback(&session);
                return SessionSubscription {
                    state,
                    live,
                    unsub: None,
                };
            }
        };

        let on_session = {
            let state = Arc::clone(&state);
            let live = Arc::clone(&live);
            let callback = Arc::clone(&callback);
            Arc::new(move |principal: Option<Principal>| {
                if !live.load(Ordering::SeqCst) {
                    return;
                }
                let session = AuthSession::resolved(principal);
                debug!(signed_in = session.is_signed_in(), "session resolved");
                *state.lock() = session.clone();
                callback(&session);
            })
        };

        let on_error = {
            let state = Arc::clone(&state);
            let live = Arc::clone(&live);
            let callback = Arc::clone(&callback);
            Arc::new(move |error: ClientError| {
                if !live.load(Ordering::SeqCst) {
                    return;
                }
                let session = AuthSession::failed(error);
                *state.lock() = session.clone();
                callback(&session);
            })
        };

        let unsub = gateway.subscribe(on_session, on_error);

        SessionSubscription {
            state,
            live,
            unsub: Some(unsub),
        }
    }
}

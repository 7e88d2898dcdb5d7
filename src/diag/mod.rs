//! Diagnostics channel — structured write-failure events, decoupled from
//! their call sites.
//!
//! Fire-and-forget mutations have no caller to report to; their failures go
//! on the [`ErrorBus`], where a single global listener (typically a
//! diagnostics overlay) aggregates them. The bus is an explicit injectable
//! instance, not a hidden singleton, so tests construct a fresh one per
//! case.
//!
//! # Modules
//!
//! - [`event_emitter`] — Generic typed pub/sub ([`EventEmitter<T>`]).

pub mod event_emitter;

pub use event_emitter::{EventEmitter, ListenerId};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorCode;

// ============================================================================
// WriteKind / WriteFailure
// ============================================================================

/// The mutation kind recorded on a diagnostic event.
///
/// `Set` serializes as `"write"` — the wire name listeners match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Create,
    Update,
    Delete,
    #[serde(rename = "write")]
    Set,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Set => "write",
        };
        f.write_str(s)
    }
}

/// A failed write, with enough context to diagnose an authorization
/// misconfiguration: the target path, the operation, the data that was sent,
/// and when it happened.
///
/// Published once per failure; listeners must treat it as read-only. Also
/// used as the rejection payload of a pending create, so a local caller and
/// a global listener see the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub path: String,
    pub operation: WriteKind,
    /// The store-reported code, when the rejection carried one.
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_resource_data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Write failed: {} {} at {}",
            self.operation, self.path, self.timestamp
        )
    }
}

impl std::error::Error for WriteFailure {}

// ============================================================================
// ErrorEvent / ErrorBus
// ============================================================================

/// Event kinds carried on the bus. Permission failures are the only kind
/// today; the enum keeps the channel open for more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ErrorEvent {
    Permission(WriteFailure),
}

impl ErrorEvent {
    pub fn as_permission(&self) -> &WriteFailure {
        match self {
            Self::Permission(f) => f,
        }
    }
}

/// Process-wide publish/subscribe channel for [`ErrorEvent`]s.
///
/// Not persistent: a publish with no registered listeners is a silent drop,
/// and listeners registered after a publish never see it.
pub struct ErrorBus {
    emitter: EventEmitter<ErrorEvent>,
}

impl ErrorBus {
    pub fn new() -> Self {
        Self {
            emitter: EventEmitter::new(),
        }
    }

    /// Register `listener`; it runs synchronously on every publish, in
    /// registration order.
    pub fn subscribe(&self, listener: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> ListenerId {
        self.emitter.on(listener)
    }

    /// Remove a listener. Safe to call with a stale id.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.emitter.off(id);
    }

    /// Deliver `event` to all currently registered listeners.
    pub fn publish(&self, event: ErrorEvent) {
        self.emitter.emit(&event);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.emitter.size()
    }
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new()
    }
}

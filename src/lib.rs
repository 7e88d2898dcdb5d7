//! Reactive data-binding and non-blocking mutation core for the ClassHub
//! dashboards.
//!
//! The UI layer drives this crate with three moving parts per screen:
//! a [`SessionTracker`](session::SessionTracker) observation for "who am I",
//! memoized query targets feeding [`live`] subscribers for "what am I
//! looking at", and a [`MutationDispatcher`](mutate::MutationDispatcher) for
//! writes that must never block a render. Write failures converge on the
//! [`ErrorBus`](diag::ErrorBus) where one global listener aggregates them.
//!
//! The remote document database and the authentication service are
//! black-box collaborators behind the [`remote`] traits.

pub mod error;
pub mod types;

pub mod connection;
pub mod diag;
pub mod live;
pub mod mutate;
pub mod query;
pub mod remote;
pub mod session;

//! Memoized<Q> — dependency-keyed identity memoization for query targets.
//!
//! UI collaborators rebuild their query descriptors on every re-render. The
//! memoizer guarantees that as long as the dependency values are unchanged,
//! the *same* `Arc` comes back, so downstream subscribers can use pointer
//! equality as a no-op check and never resubscribe redundantly.
//!
//! All methods take `&self` (interior mutability via `parking_lot::Mutex`),
//! so a memoizer can sit behind a shared handle alongside the subscriber it
//! feeds.

use std::sync::Arc;

use parking_lot::Mutex;

// ============================================================================
// DepValue
// ============================================================================

/// A dependency value compared by content.
///
/// `OptStr(None)` and `Str` of an empty string are distinct values — an
/// absent prerequisite id is not the same dependency as a present empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepValue {
    Str(String),
    OptStr(Option<String>),
    StrList(Vec<String>),
    Int(i64),
    Bool(bool),
}

impl From<&str> for DepValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<Option<&str>> for DepValue {
    fn from(s: Option<&str>) -> Self {
        Self::OptStr(s.map(str::to_string))
    }
}

impl From<i64> for DepValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for DepValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

// ============================================================================
// Memoized
// ============================================================================

struct MemoSlot<Q> {
    deps: Vec<DepValue>,
    target: Option<Arc<Q>>,
}

/// Identity memoizer for one consumer slot.
///
/// `Q` is the query target type ([`QueryDescriptor`](super::QueryDescriptor)
/// for collections, [`DocumentPath`](super::DocumentPath) for single
/// documents).
pub struct Memoized<Q> {
    slot: Mutex<Option<MemoSlot<Q>>>,
}

impl<Q> Memoized<Q> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the memoized target, rebuilding only when `deps` changed.
    ///
    /// When `deps` equals the previously seen dependency list, `build` is
    /// not called and the previously returned `Arc` (or memoized `None`) is
    /// handed back unchanged. `build` returning `None` means "no target yet"
    /// and is memoized like any other result.
    pub fn memoize(
        &self,
        deps: Vec<DepValue>,
        build: impl FnOnce() -> Option<Q>,
    ) -> Option<Arc<Q>> {
        let mut slot = self.slot.lock();

        if let Some(prev) = slot.as_ref() {
            if prev.deps == deps {
                return prev.target.clone();
            }
        }

        let target = build().map(Arc::new);
        *slot = Some(MemoSlot {
            deps,
            target: target.clone(),
        });
        target
    }

    /// Drop the memoized state, forcing the next `memoize` to rebuild.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

impl<Q> Default for Memoized<Q> {
    fn default() -> Self {
        Self::new()
    }
}

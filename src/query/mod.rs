//! Query identity: paths, descriptors, and the dependency memoizer.
//!
//! # Modules
//!
//! - [`descriptor`] — [`QueryDescriptor`] and its filter/ordering parts.
//! - [`memo`] — [`Memoized`], the dependency-keyed identity memoizer.
//!
//! Two descriptors built from the same path and the same filter values are
//! equal regardless of when or where they were constructed; subscribers rely
//! on `Arc` pointer identity (provided by [`Memoized`]) as a cheap no-op
//! check.

pub mod descriptor;
pub mod memo;

pub use descriptor::{Filter, FilterOp, OrderBy, OrderDirection, QueryDescriptor};
pub use memo::{DepValue, Memoized};

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Paths
// ============================================================================

/// Path to a collection, e.g. `"classes"` or `"classes/c1/enrollments"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the document `id` inside this collection.
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath::new(format!("{}/{id}", self.0))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Path to a single document, e.g. `"classes/c1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment — the document id.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

//! QueryDescriptor — a value describing what to fetch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CollectionPath;

// ============================================================================
// Filters and ordering
// ============================================================================

/// Comparison operator for a single filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOp {
    Eq,
    In,
    ArrayContains,
}

/// One filter clause: `field <op> value`.
///
/// Equality is structural — two clauses with the same field, operator, and
/// JSON value compare equal regardless of where they were built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::In,
            value: Value::Array(values),
        }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// An ordering specification for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}

// ============================================================================
// QueryDescriptor
// ============================================================================

/// Complete description of a collection query: path, filters, ordering, and
/// an optional result limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub collection: CollectionPath,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl QueryDescriptor {
    /// An unfiltered query over `collection`.
    pub fn collection(path: impl Into<CollectionPath>) -> Self {
        Self {
            collection: path.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl From<&str> for QueryDescriptor {
    fn from(path: &str) -> Self {
        Self::collection(path)
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Comparison operators a query string can request.
///
/// This is the full whitelist: anything else in an operator position is
/// treated as a literal field name, never as a live operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "in" => FilterOp::In,
            _ => return None,
        })
    }

    pub fn to_sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }
}

/// A query-string value coerced to the filtered field's native type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    List(Vec<FilterValue>),
}

/// One condition of a conjunctive predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        op: FilterOp,
        value: FilterValue,
    },
    /// A filter on a field the collection does not define. Matches no rows
    /// rather than erroring, mirroring document-store semantics.
    Unmatched { field: String },
}

/// Conjunction of conditions selecting a subset of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub conditions: Vec<Condition>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Which fields of a record are returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Every field except the internal revision marker.
    Default,
    /// Exactly the named fields (plus the record id).
    Fields(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: i64,
    pub limit: i64,
}

impl PageSpec {
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// A rendered statement plus its bind parameters, in placeholder order.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<FilterValue>,
}

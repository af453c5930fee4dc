//! Sort-with-limit and distinctness configuration records.
//!
//! These are passed to operators the core does not itself execute; the core
//! only owns their shape and, for `Distinctness`, the interaction logic
//! between its three flags. Wire (de)serialization of these messages is an
//! external collaborator's concern — they are plain `serde` structs for the
//! host's own config loading, not a protobuf codec.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub attribute_name: String,
    pub column_order: ColumnOrder,
    /// Only meaningful for string-typed keys.
    pub case_sensitive: bool,
}

impl SortKey {
    pub fn new(
        attribute_name: impl Into<String>,
        column_order: ColumnOrder,
        case_sensitive: bool,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            column_order,
            case_sensitive,
        }
    }
}

/// An ordered list of sort keys (most significant first) and an optional
/// row limit. An empty key list is legal and yields the identity order.
/// Nulls sort FIRST for ascending keys, LAST for descending ones, stably
/// across keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedSortSpecification {
    pub keys: Vec<SortKey>,
    pub limit: Option<u64>,
}

impl ExtendedSortSpecification {
    pub fn new(keys: Vec<SortKey>, limit: Option<u64>) -> Self {
        Self { keys, limit }
    }

    pub fn is_identity(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Three orthogonal flags describing how an aggregation should handle
/// `DISTINCT`. `effective_mode` resolves their documented priority:
/// `is_not_distinct` dominates; otherwise `is_exact_distinct` dominates the
/// cardinality threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distinctness {
    pub is_not_distinct: bool,
    pub is_exact_distinct: bool,
    pub estimated_distinct_threshold: Option<i32>,
}

/// The resolved policy an aggregation operator should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctMode {
    /// `DISTINCT` is a no-op.
    NotDistinct,
    /// Exact dedup is forced, regardless of estimated cardinality.
    Exact,
    /// Exact dedup unless the estimated cardinality reaches `threshold`, in
    /// which case the operator may switch to an approximate algorithm.
    ThresholdApproximate { threshold: i32 },
}

impl Distinctness {
    pub fn new(
        is_not_distinct: bool,
        is_exact_distinct: bool,
        estimated_distinct_threshold: Option<i32>,
    ) -> Self {
        Self {
            is_not_distinct,
            is_exact_distinct,
            estimated_distinct_threshold,
        }
    }

    pub fn effective_mode(&self) -> DistinctMode {
        if self.is_not_distinct {
            return DistinctMode::NotDistinct;
        }
        if self.is_exact_distinct {
            return DistinctMode::Exact;
        }
        match self.estimated_distinct_threshold {
            Some(threshold) => DistinctMode::ThresholdApproximate { threshold },
            None => DistinctMode::Exact,
        }
    }
}

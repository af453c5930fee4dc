//! Fundamental, dependency-light value types shared by the Supersonic
//! execution core: the scalar type enum, attribute/schema model, the
//! error taxonomy and `FailureOr<T>` discipline, and the two
//! operator-facing configuration records (sort-with-limit, distinctness).
//!
//! This crate carries no engine logic: binding, blocks and views,
//! projectors and expression trees all live in `supersonic-core`.

pub mod config;
pub mod data_type;
pub mod error;
pub mod schema;

pub use config::{ColumnOrder, Distinctness, DistinctMode, ExtendedSortSpecification, SortKey};
pub use data_type::DataType;
pub use error::{Exception, ErrorCode, FailureOr, ResultExt};
pub use schema::{Attribute, Nullability, TupleSchema};

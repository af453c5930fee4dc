//! Bound expressions: vectorized evaluators that turn an input view into an
//! output view of the same row count.
//!
//! Expression kinds are a closed, enumerable set at the unbound-spec level —
//! the same tagged-variant-plus-dispatcher shape used for projector specs —
//! but the bound form stays an open trait object, because new evaluator
//! kinds (arithmetic, comparisons, case expressions) are exactly the
//! extension point this crate leaves to its callers.

mod attribute;
mod compound;
mod projection;
#[cfg(test)]
mod tests;
pub mod tree;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use supersonic_types::{FailureOr, TupleSchema};
use tracing::trace;

use crate::allocator::Allocator;
use crate::bitmap::BitmapView;
use crate::block::{Block, View};
use crate::projector::MultiSourceProjectorSpec;

pub use tree::BoundExpressionTree;

/// The capability every bound expression provides: a fixed result schema, the
/// set of input attribute names it reads, and a vectorized evaluation step.
///
/// Bound expressions are immutable once built; any scratch storage an
/// evaluation needs is allocated fresh inside `do_evaluate` rather than
/// cached on `self`, so `&self` is enough — only the owning
/// `BoundExpressionTree` holds mutable, reused output buffers.
pub trait BoundExpression: fmt::Debug + Send + Sync {
    fn result_schema(&self) -> &TupleSchema;

    /// The transitive union of input attribute names this expression reads,
    /// computed once at bind time.
    fn referred_attribute_names(&self) -> &HashSet<String>;

    /// Evaluates this expression over `input`, writing `input.row_count()`
    /// rows into `output` (which the caller has already cleared and sized
    /// under `result_schema()`). `skip` marks rows whose output values are
    /// allowed to be garbage but whose null bits must read as not-null.
    fn do_evaluate(
        &self,
        input: &View<'_>,
        skip: Option<BitmapView<'_>>,
        output: &mut Block,
    ) -> FailureOr<()>;
}

/// The unbound expression spec: a closed sum type a single `bind` dispatches
/// over, mirroring the projector specs.
#[derive(Debug, Clone)]
pub enum ExpressionSpec {
    /// Resolves by position in the input schema.
    AttributeAt(usize),
    /// Resolves by name in the input schema.
    NamedAttribute(String),
    /// Renames the single output attribute produced by `child`.
    Alias(String, Box<ExpressionSpec>),
    /// Concatenates children's outputs in order, without reprojecting.
    Compound(Vec<ExpressionSpec>),
    /// `Compound` followed by replacing every result name with `aliases`.
    RenameCompound(Vec<String>, Vec<ExpressionSpec>),
    /// Evaluates `children` against the same input, then routes their
    /// combined outputs through `projector` (whose sources are the
    /// children's result schemas, in order).
    Projection(Vec<ExpressionSpec>, MultiSourceProjectorSpec),
}

impl fmt::Display for ExpressionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionSpec::AttributeAt(i) => write!(f, "AttributeAt({i})"),
            ExpressionSpec::NamedAttribute(n) => write!(f, "NamedAttribute({n})"),
            ExpressionSpec::Alias(name, child) => write!(f, "Alias({name}, {child})"),
            ExpressionSpec::Compound(children) => {
                write!(f, "Compound(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            ExpressionSpec::RenameCompound(aliases, children) => {
                write!(f, "RenameCompound({aliases:?}, [")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "])")
            }
            ExpressionSpec::Projection(children, projector) => {
                write!(f, "Projection([")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "], {projector})")
            }
        }
    }
}

impl ExpressionSpec {
    /// Binds this spec against `source`, allocating any scratch buffers a
    /// composite expression needs through `allocator`.
    pub fn bind(
        &self,
        source: &TupleSchema,
        allocator: Arc<dyn Allocator>,
    ) -> FailureOr<Box<dyn BoundExpression>> {
        trace!(spec = %self, source = %source.describe(), "binding expression");
        match self {
            ExpressionSpec::AttributeAt(position) => {
                attribute::bind_positioned(source, *position, self)
            }
            ExpressionSpec::NamedAttribute(name) => attribute::bind_named(source, name, self),
            ExpressionSpec::Alias(name, child) => {
                let bound_child = child.bind(source, allocator)?;
                Ok(Box::new(attribute::Alias::new(name.clone(), bound_child)))
            }
            ExpressionSpec::Compound(children) => {
                compound::bind_compound(children, None, source, allocator, self)
            }
            ExpressionSpec::RenameCompound(aliases, children) => {
                compound::bind_compound(children, Some(aliases), source, allocator, self)
            }
            ExpressionSpec::Projection(children, projector) => {
                projection::bind_projection(children, projector, source, allocator)
            }
        }
    }
}

//! The bound expression tree: owns the root bound expression plus a
//! persistent output arena sized for a fixed maximum batch.

use std::sync::Arc;

use supersonic_types::{FailureOr, TupleSchema};

use super::{BoundExpression, ExpressionSpec};
use crate::allocator::Allocator;
use crate::bitmap::BitmapView;
use crate::block::{Block, View};
use tracing::{debug, trace};

/// Compiles a logical expression over `source` into a vectorized evaluator
/// with its own output arena, capped at `max_row_count` rows per batch.
#[derive(Debug)]
pub struct BoundExpressionTree {
    root: Box<dyn BoundExpression>,
    output: Block,
    max_row_count: usize,
}

impl BoundExpressionTree {
    pub fn new(
        spec: &ExpressionSpec,
        source: &TupleSchema,
        allocator: Arc<dyn Allocator>,
        max_row_count: usize,
    ) -> FailureOr<Self> {
        let root = spec.bind(source, allocator.clone())?;
        let output = Block::with_capacity(allocator.as_ref(), root.result_schema().clone(), max_row_count)?;
        debug!(
            %spec,
            result_schema = %root.result_schema(),
            max_row_count,
            "bound expression tree"
        );
        Ok(Self {
            root,
            output,
            max_row_count,
        })
    }

    pub fn result_schema(&self) -> &TupleSchema {
        self.root.result_schema()
    }

    pub fn referred_attribute_names(&self) -> &std::collections::HashSet<String> {
        self.root.referred_attribute_names()
    }

    pub fn max_row_count(&self) -> usize {
        self.max_row_count
    }

    /// Evaluates `input` through the bound tree. `&mut self` is the
    /// borrow-checker's expression of two invariants at once: the returned
    /// view aliases `self.output` and is only valid until the next call, and
    /// a tree is not safe for concurrent `evaluate` calls — both fall out of
    /// Rust's ordinary aliasing rules rather than needing a runtime check.
    pub fn evaluate(&mut self, input: &View<'_>) -> FailureOr<View<'_>> {
        self.evaluate_with_skip(input, None)
    }

    pub fn evaluate_with_skip(
        &mut self,
        input: &View<'_>,
        skip: Option<BitmapView<'_>>,
    ) -> FailureOr<View<'_>> {
        assert!(
            input.row_count() <= self.max_row_count,
            "evaluate called with row_count {} exceeding max_row_count {}",
            input.row_count(),
            self.max_row_count
        );
        trace!(row_count = input.row_count(), "evaluating bound expression tree");
        self.root.do_evaluate(input, skip, &mut self.output)?;
        Ok(self.output.view().subrange(0, input.row_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::HeapAllocator;
    use supersonic_types::{Attribute, DataType, Nullability};

    fn sample_schema() -> TupleSchema {
        let mut s = TupleSchema::new();
        s.add_attribute(Attribute::new("col0", DataType::String, Nullability::Nullable));
        s.add_attribute(Attribute::new("col1", DataType::Int32, Nullability::Nullable));
        s.add_attribute(Attribute::new("col2", DataType::Double, Nullability::Nullable));
        s.add_attribute(Attribute::new("col3", DataType::Int32, Nullability::NotNullable));
        s
    }

    fn sample_block(allocator: &dyn Allocator) -> Block {
        let mut b = Block::with_capacity(allocator, sample_schema(), 5).unwrap();
        for i in 0..3 {
            b.append_row(&[
                crate::block::ScalarValue::String(i.to_string()),
                crate::block::ScalarValue::Int32(i),
                crate::block::ScalarValue::Float64(i as f64),
                crate::block::ScalarValue::Int32(i),
            ])
            .unwrap();
        }
        b
    }

    #[test]
    fn zero_row_input_yields_zero_row_output() {
        let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
        let schema = sample_schema();
        let empty = Block::with_capacity(allocator.as_ref(), schema.clone(), 0).unwrap();
        let mut tree =
            BoundExpressionTree::new(&ExpressionSpec::AttributeAt(0), &schema, allocator, 8).unwrap();
        let result = tree.evaluate(&empty.view()).unwrap();
        assert_eq!(result.row_count(), 0);
    }

    #[test]
    #[should_panic]
    fn evaluate_past_max_row_count_panics() {
        let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
        let block = sample_block(allocator.as_ref());
        let mut tree =
            BoundExpressionTree::new(&ExpressionSpec::AttributeAt(0), block.schema(), allocator, 2).unwrap();
        let _ = tree.evaluate(&block.view());
    }
}

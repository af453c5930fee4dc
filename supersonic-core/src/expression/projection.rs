//! Projection expression: evaluates a list of sub-expressions against the
//! same input, then routes their combined outputs through a bound
//! multi-source projector whose sources are the children's result schemas.

use std::collections::HashSet;
use std::sync::Arc;

use supersonic_types::{FailureOr, TupleSchema};

use super::{BoundExpression, ExpressionSpec};
use crate::allocator::Allocator;
use crate::bitmap::BitmapView;
use crate::block::{Block, View};
use crate::projector::{BoundMultiSourceProjector, MultiSourceProjectorSpec};

#[derive(Debug)]
struct Projection {
    children: Vec<Box<dyn BoundExpression>>,
    projector: BoundMultiSourceProjector,
    allocator: Arc<dyn Allocator>,
    result_schema: TupleSchema,
    /// All children's referred names, regardless of whether the projector
    /// actually surfaces their outputs: compound children drag their whole
    /// input set along even when only part of it is projected.
    referred: HashSet<String>,
}

impl BoundExpression for Projection {
    fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    fn referred_attribute_names(&self) -> &HashSet<String> {
        &self.referred
    }

    fn do_evaluate(&self, input: &View<'_>, skip: Option<BitmapView<'_>>, output: &mut Block) -> FailureOr<()> {
        output.clear_rows();
        let mut scratch_blocks = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let mut scratch = Block::with_capacity(
                self.allocator.as_ref(),
                child.result_schema().clone(),
                input.row_count(),
            )?;
            child.do_evaluate(input, skip, &mut scratch)?;
            scratch_blocks.push(scratch);
        }
        let views: Vec<View<'_>> = scratch_blocks.iter().map(|b| b.view()).collect();
        let mut sources = Vec::with_capacity(self.result_schema.attribute_count());
        for result_pos in 0..self.result_schema.attribute_count() {
            let source_index = self.projector.source_index(result_pos);
            let source_position = self.projector.source_attribute_position(result_pos);
            sources.push((&views[source_index], source_position));
        }
        output.extend_from_views(&sources, input.row_count())
    }
}

pub(super) fn bind_projection(
    children: &[ExpressionSpec],
    projector: &MultiSourceProjectorSpec,
    source: &TupleSchema,
    allocator: Arc<dyn Allocator>,
) -> FailureOr<Box<dyn BoundExpression>> {
    let bound_children: Vec<Box<dyn BoundExpression>> = children
        .iter()
        .map(|c| c.bind(source, allocator.clone()))
        .collect::<FailureOr<_>>()?;
    let child_schemas: Vec<TupleSchema> = bound_children
        .iter()
        .map(|c| c.result_schema().clone())
        .collect();
    let bound_projector = projector.bind(&child_schemas)?;
    let result_schema = bound_projector.result_schema().clone();
    let referred = bound_children
        .iter()
        .flat_map(|c| c.referred_attribute_names().iter().cloned())
        .collect();
    Ok(Box::new(Projection {
        children: bound_children,
        projector: bound_projector,
        allocator,
        result_schema,
        referred,
    }))
}

//! Compound expressions: concatenate children's outputs in order, optionally
//! replacing the resulting names (`RenameCompound`).

use std::collections::HashSet;
use std::sync::Arc;

use supersonic_types::{Exception, FailureOr, TupleSchema};
use tracing::trace;

use super::{BoundExpression, ExpressionSpec};
use crate::allocator::Allocator;
use crate::bitmap::BitmapView;
use crate::block::{Block, View};

#[derive(Debug)]
pub(super) struct Compound {
    children: Vec<Box<dyn BoundExpression>>,
    allocator: Arc<dyn Allocator>,
    result_schema: TupleSchema,
    referred: HashSet<String>,
}

impl BoundExpression for Compound {
    fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    fn referred_attribute_names(&self) -> &HashSet<String> {
        &self.referred
    }

    fn do_evaluate(&self, input: &View<'_>, skip: Option<BitmapView<'_>>, output: &mut Block) -> FailureOr<()> {
        evaluate_children(&self.children, &self.allocator, input, skip, output)
    }
}

/// Shared evaluation step for `Compound` and `RenameCompound`: each child
/// gets its own fresh scratch block, then their columns are concatenated
/// into `output` in child order. Column names never factor into the copy,
/// so a rename of the final schema needs no special-casing here.
fn evaluate_children(
    children: &[Box<dyn BoundExpression>],
    allocator: &Arc<dyn Allocator>,
    input: &View<'_>,
    skip: Option<BitmapView<'_>>,
    output: &mut Block,
) -> FailureOr<()> {
    output.clear_rows();
    let mut scratch_blocks = Vec::with_capacity(children.len());
    for child in children {
        let mut scratch = Block::with_capacity(allocator.as_ref(), child.result_schema().clone(), input.row_count())?;
        child.do_evaluate(input, skip, &mut scratch)?;
        scratch_blocks.push(scratch);
    }
    let views: Vec<View<'_>> = scratch_blocks.iter().map(|b| b.view()).collect();
    let mut sources = Vec::with_capacity(output.schema().attribute_count());
    for view in &views {
        for src_pos in 0..view.schema().attribute_count() {
            sources.push((view, src_pos));
        }
    }
    output.extend_from_views(&sources, input.row_count())
}

fn bind_children(
    children: &[ExpressionSpec],
    source: &TupleSchema,
    allocator: &Arc<dyn Allocator>,
) -> FailureOr<Vec<Box<dyn BoundExpression>>> {
    children
        .iter()
        .map(|c| c.bind(source, allocator.clone()))
        .collect()
}

/// Concatenates every child's result attributes in order; fails with
/// `ATTRIBUTE_EXISTS` on a duplicate name, the same as the single-source
/// projector's `Compound` variant.
fn concatenated_schema(
    children: &[Box<dyn BoundExpression>],
    spec: &ExpressionSpec,
) -> FailureOr<TupleSchema> {
    let mut schema = TupleSchema::new();
    for child in children {
        for attribute in child.result_schema().attributes() {
            let name = attribute.name.clone();
            if !schema.add_attribute(attribute.clone()) {
                return Err(Exception::attribute_exists(format!(
                    "{spec}: result attribute `{name}` already exists"
                )));
            }
        }
    }
    Ok(schema)
}

fn union_referred(children: &[Box<dyn BoundExpression>]) -> HashSet<String> {
    children
        .iter()
        .flat_map(|c| c.referred_attribute_names().iter().cloned())
        .collect()
}

#[derive(Debug)]
struct RenameCompound {
    children: Vec<Box<dyn BoundExpression>>,
    allocator: Arc<dyn Allocator>,
    result_schema: TupleSchema,
    referred: HashSet<String>,
}

impl BoundExpression for RenameCompound {
    fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    fn referred_attribute_names(&self) -> &HashSet<String> {
        &self.referred
    }

    fn do_evaluate(&self, input: &View<'_>, skip: Option<BitmapView<'_>>, output: &mut Block) -> FailureOr<()> {
        evaluate_children(&self.children, &self.allocator, input, skip, output)
    }
}

/// Binds either `Compound` (`aliases = None`) or `RenameCompound`
/// (`aliases = Some(names)`), sharing the child-binding and
/// schema-concatenation logic between them.
pub(super) fn bind_compound(
    children: &[ExpressionSpec],
    aliases: Option<&[String]>,
    source: &TupleSchema,
    allocator: Arc<dyn Allocator>,
    spec: &ExpressionSpec,
) -> FailureOr<Box<dyn BoundExpression>> {
    let bound_children = bind_children(children, source, &allocator)?;
    let concatenated = concatenated_schema(&bound_children, spec)?;
    let referred = union_referred(&bound_children);

    match aliases {
        None => Ok(Box::new(Compound {
            children: bound_children,
            allocator,
            result_schema: concatenated,
            referred,
        })),
        Some(aliases) => {
            if aliases.len() != concatenated.attribute_count() {
                return Err(Exception::attribute_count_mismatch(format!(
                    "{spec}: {} aliases given for {} concatenated attributes",
                    aliases.len(),
                    concatenated.attribute_count()
                )));
            }
            debug_assert!(
                aliases.iter().collect::<HashSet<_>>().len() == aliases.len(),
                "RenameCompound aliases must be internally unique: {aliases:?}"
            );
            let mut result_schema = TupleSchema::new();
            for (alias, attribute) in aliases.iter().zip(concatenated.attributes().iter()) {
                let renamed = attribute.renamed(alias.clone());
                let name = renamed.name.clone();
                if !result_schema.add_attribute(renamed) {
                    return Err(Exception::attribute_exists(format!(
                        "{spec}: result attribute `{name}` already exists"
                    )));
                }
            }
            trace!(%spec, "bound rename-compound expression");
            Ok(Box::new(RenameCompound {
                children: bound_children,
                allocator,
                result_schema,
                referred,
            }))
        }
    }
}

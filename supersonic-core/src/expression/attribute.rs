//! Leaf expressions: attribute references and the alias that renames one.

use std::collections::HashSet;

use supersonic_types::{Exception, FailureOr, TupleSchema};

use super::{BoundExpression, ExpressionSpec};
use crate::bitmap::BitmapView;
use crate::block::{Block, View};

#[derive(Debug)]
pub(super) struct AttributeReference {
    source_position: usize,
    result_schema: TupleSchema,
    referred: HashSet<String>,
}

impl BoundExpression for AttributeReference {
    fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    fn referred_attribute_names(&self) -> &HashSet<String> {
        &self.referred
    }

    fn do_evaluate(&self, input: &View<'_>, skip: Option<BitmapView<'_>>, output: &mut Block) -> FailureOr<()> {
        output.clear_rows();
        output.extend_from_views(&[(input, self.source_position)], input.row_count())?;
        if let Some(skip) = skip {
            output.clear_nulls_at_skipped_rows(skip);
        }
        Ok(())
    }
}

pub(super) fn bind_positioned(
    source: &TupleSchema,
    position: usize,
    spec: &ExpressionSpec,
) -> FailureOr<Box<dyn BoundExpression>> {
    if position >= source.attribute_count() {
        return Err(Exception::attribute_count_mismatch(format!(
            "{spec}: position {position} out of range for a {}-attribute source schema",
            source.attribute_count()
        )));
    }
    let attribute = source.attribute(position).clone();
    let mut result_schema = TupleSchema::new();
    result_schema.add_attribute(attribute.clone());
    let mut referred = HashSet::new();
    referred.insert(attribute.name);
    Ok(Box::new(AttributeReference {
        source_position: position,
        result_schema,
        referred,
    }))
}

pub(super) fn bind_named(
    source: &TupleSchema,
    name: &str,
    spec: &ExpressionSpec,
) -> FailureOr<Box<dyn BoundExpression>> {
    let position = source.lookup_position(name).ok_or_else(|| {
        Exception::attribute_missing(format!(
            "{spec}: attribute `{name}` not found in source schema {}",
            source.describe()
        ))
    })?;
    bind_positioned(source, position, spec)
}

/// Renames the single output attribute of `child` without touching its values.
#[derive(Debug)]
pub(super) struct Alias {
    child: Box<dyn BoundExpression>,
    result_schema: TupleSchema,
}

impl Alias {
    pub(super) fn new(name: String, child: Box<dyn BoundExpression>) -> Self {
        let renamed = child.result_schema().attribute(0).renamed(name);
        let mut result_schema = TupleSchema::new();
        result_schema.add_attribute(renamed);
        Self { child, result_schema }
    }
}

impl BoundExpression for Alias {
    fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    fn referred_attribute_names(&self) -> &HashSet<String> {
        self.child.referred_attribute_names()
    }

    fn do_evaluate(&self, input: &View<'_>, skip: Option<BitmapView<'_>>, output: &mut Block) -> FailureOr<()> {
        self.child.do_evaluate(input, skip, output)
    }
}

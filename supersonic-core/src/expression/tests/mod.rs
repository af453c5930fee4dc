//! End-to-end scenarios over the literal five-row, four-column fixture:
//! attribute-by-position, attribute-by-name, alias, projection with
//! duplicated sources, partial-source projection and duplicate rejection.

use std::sync::Arc;

use supersonic_types::{Attribute, DataType, Nullability, TupleSchema};

use crate::allocator::{Allocator, HeapAllocator};
use crate::block::{Block, ScalarValue};
use crate::expression::{BoundExpressionTree, ExpressionSpec};
use crate::projector::{MultiSourceProjectorSpec, SingleSourceProjectorSpec};

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
    b.append_row(&[
        ScalarValue::String("1".into()),
        ScalarValue::Int32(12),
        ScalarValue::Float64(5.1),
        ScalarValue::Int32(22),
    ])
    .unwrap();
    b.append_row(&[
        ScalarValue::String("2".into()),
        ScalarValue::Int32(13),
        ScalarValue::Float64(6.2),
        ScalarValue::Int32(23),
    ])
    .unwrap();
    b.append_row(&[
        ScalarValue::String("3".into()),
        ScalarValue::Int32(14),
        ScalarValue::Float64(7.3),
        ScalarValue::Int32(23),
    ])
    .unwrap();
    b.append_row(&[
        ScalarValue::String("4".into()),
        ScalarValue::Null,
        ScalarValue::Float64(8.4),
        ScalarValue::Int32(24),
    ])
    .unwrap();
    b.append_row(&[
        ScalarValue::Null,
        ScalarValue::Int32(16),
        ScalarValue::Null,
        ScalarValue::Int32(26),
    ])
    .unwrap();
    b
}

#[test]
fn attribute_by_position() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let block = sample_block(allocator.as_ref());
    let mut tree = BoundExpressionTree::new(&ExpressionSpec::AttributeAt(2), block.schema(), allocator, 8).unwrap();
    assert_eq!(
        tree.referred_attribute_names().iter().cloned().collect::<Vec<_>>(),
        vec!["col2".to_string()]
    );
    let result = tree.evaluate(&block.view()).unwrap();
    assert_eq!(result.row_count(), 5);
    for r in 0..5 {
        assert_eq!(result.row(r), vec![block.view().row(r)[2].clone()]);
    }
}

#[test]
fn attribute_by_name() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let block = sample_block(allocator.as_ref());
    let spec = ExpressionSpec::NamedAttribute("col3".into());
    let mut tree = BoundExpressionTree::new(&spec, block.schema(), allocator, 8).unwrap();
    assert!(tree.referred_attribute_names().contains("col3"));
    let result = tree.evaluate(&block.view()).unwrap();
    for r in 0..5 {
        assert_eq!(result.row(r), vec![block.view().row(r)[3].clone()]);
    }
}

#[test]
fn alias_renames_result_attribute() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let block = sample_block(allocator.as_ref());
    let spec = ExpressionSpec::Alias(
        "Brand New Name".into(),
        Box::new(ExpressionSpec::NamedAttribute("col3".into())),
    );
    let mut tree = BoundExpressionTree::new(&spec, block.schema(), allocator, 8).unwrap();
    assert_eq!(tree.result_schema().attribute(0).name, "Brand New Name");
    assert!(tree.referred_attribute_names().contains("col3"));
    let result = tree.evaluate(&block.view()).unwrap();
    for r in 0..5 {
        assert_eq!(result.row(r), vec![block.view().row(r)[3].clone()]);
    }
}

#[test]
fn projection_permits_duplicated_source_attributes() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let block = sample_block(allocator.as_ref());
    let children: Vec<ExpressionSpec> = (0..4).map(ExpressionSpec::AttributeAt).collect();
    let projector = MultiSourceProjectorSpec::new(vec![
        (3, SingleSourceProjectorSpec::PositionedAttribute(0)),
        (0, SingleSourceProjectorSpec::PositionedAttribute(0)),
        (1, SingleSourceProjectorSpec::PositionedAttribute(0)),
        (3, SingleSourceProjectorSpec::PositionedAttribute(0)),
        (1, SingleSourceProjectorSpec::PositionedAttribute(0)),
    ]);
    let spec = ExpressionSpec::Projection(children, projector);
    let mut tree = BoundExpressionTree::new(&spec, block.schema(), allocator, 8).unwrap();
    assert_eq!(tree.result_schema().attribute_count(), 5);
    let mut names: Vec<_> = tree.referred_attribute_names().iter().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["col0", "col1", "col2", "col3"]);

    let result = tree.evaluate(&block.view()).unwrap();
    let row2 = result.row(2);
    assert_eq!(
        row2,
        vec![
            ScalarValue::Int32(23),
            ScalarValue::String("3".into()),
            ScalarValue::Int32(14),
            ScalarValue::Int32(23),
            ScalarValue::Int32(14),
        ]
    );
}

#[test]
fn projection_surfaces_referred_names_from_all_children() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let block = sample_block(allocator.as_ref());
    let left = ExpressionSpec::Compound(vec![ExpressionSpec::AttributeAt(0), ExpressionSpec::AttributeAt(1)]);
    let right = ExpressionSpec::Compound(vec![ExpressionSpec::AttributeAt(2), ExpressionSpec::AttributeAt(3)]);
    let projector = MultiSourceProjectorSpec::new(vec![
        (0, SingleSourceProjectorSpec::PositionedAttribute(1)),
        (1, SingleSourceProjectorSpec::PositionedAttribute(0)),
    ]);
    let spec = ExpressionSpec::Projection(vec![left, right], projector);
    let mut tree = BoundExpressionTree::new(&spec, block.schema(), allocator, 8).unwrap();
    assert_eq!(tree.result_schema().attribute_count(), 2);
    let mut names: Vec<_> = tree.referred_attribute_names().iter().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["col0", "col1", "col2", "col3"]);

    let result = tree.evaluate(&block.view()).unwrap();
    assert_eq!(result.row(0), vec![ScalarValue::Int32(12), ScalarValue::Float64(5.1)]);
}

#[test]
fn compound_duplicate_name_fails_at_bind_time() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let schema = sample_schema();
    let spec = ExpressionSpec::Compound(vec![
        ExpressionSpec::NamedAttribute("col1".into()),
        ExpressionSpec::NamedAttribute("col1".into()),
    ]);
    let err = BoundExpressionTree::new(&spec, &schema, allocator, 8).unwrap_err();
    assert_eq!(err.code, supersonic_types::ErrorCode::AttributeExists);
}

#[test]
fn rename_compound_rejects_duplicate_aliases_via_attribute_exists() {
    // RenameCompound is Compound-then-rename; a caller that (against the
    // documented precondition) supplies duplicate aliases still gets a
    // structural ATTRIBUTE_EXISTS failure rather than a silently truncated
    // result schema.
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator::new());
    let schema = sample_schema();
    let spec = ExpressionSpec::RenameCompound(
        vec!["dup".into(), "dup".into()],
        vec![
            ExpressionSpec::AttributeAt(0),
            ExpressionSpec::AttributeAt(1),
        ],
    );
    let err = BoundExpressionTree::new(&spec, &schema, allocator, 8).unwrap_err();
    assert_eq!(err.code, supersonic_types::ErrorCode::AttributeExists);
}

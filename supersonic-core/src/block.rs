//! Columnar storage: `Block` (owning) and `View` (a non-owning row-range
//! window over a `Block`).
//!
//! A `View`'s lifetime is tied to the `Block` it borrows from by ordinary
//! Rust lifetimes rather than reference counting: the borrow checker *is*
//! the "a `View` outlives no longer than the `Block` it came from"
//! invariant, not a convention callers must remember.

use std::fmt;

use supersonic_types::{Attribute, DataType, ErrorCode, Exception, FailureOr, Nullability, TupleSchema};

use crate::allocator::Allocator;
use crate::bitmap::{Bitmap, BitmapView};

/// An owned scalar value, used by the `append_row` test helper and
/// wherever a single literal needs to travel alongside a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Date(i32),
    DateTime(i64),
    String(String),
    Binary(Vec<u8>),
    Enum(i32),
    DataType(DataType),
    Null,
}

/// Column storage for one attribute over a row range: a typed values
/// buffer, parallel to an optional null bitmap.
#[derive(Debug, Clone)]
enum ColumnValues {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Date(Vec<i32>),
    DateTime(Vec<i64>),
    /// (offset, length) pairs into the enclosing `Block`'s string arena.
    String(Vec<(u32, u32)>),
    Binary(Vec<(u32, u32)>),
    Enum(Vec<i32>),
    DataType(Vec<DataType>),
    /// The untyped null literal column: no storage, just a row count.
    Null(usize),
}

impl ColumnValues {
    fn for_type(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Int32 => ColumnValues::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => ColumnValues::Int64(Vec::with_capacity(capacity)),
            DataType::UInt32 => ColumnValues::UInt32(Vec::with_capacity(capacity)),
            DataType::UInt64 => ColumnValues::UInt64(Vec::with_capacity(capacity)),
            DataType::Float => ColumnValues::Float32(Vec::with_capacity(capacity)),
            DataType::Double => ColumnValues::Float64(Vec::with_capacity(capacity)),
            DataType::Bool => ColumnValues::Bool(Vec::with_capacity(capacity)),
            DataType::Date => ColumnValues::Date(Vec::with_capacity(capacity)),
            DataType::DateTime => ColumnValues::DateTime(Vec::with_capacity(capacity)),
            DataType::String => ColumnValues::String(Vec::with_capacity(capacity)),
            DataType::Binary => ColumnValues::Binary(Vec::with_capacity(capacity)),
            DataType::Enum => ColumnValues::Enum(Vec::with_capacity(capacity)),
            DataType::DataType => ColumnValues::DataType(Vec::with_capacity(capacity)),
            DataType::NullType => ColumnValues::Null(0),
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::UInt32(v) => v.len(),
            ColumnValues::UInt64(v) => v.len(),
            ColumnValues::Float32(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Date(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
            ColumnValues::String(v) => v.len(),
            ColumnValues::Binary(v) => v.len(),
            ColumnValues::Enum(v) => v.len(),
            ColumnValues::DataType(v) => v.len(),
            ColumnValues::Null(n) => *n,
        }
    }

    fn clear(&mut self) {
        match self {
            ColumnValues::Int32(v) => v.clear(),
            ColumnValues::Int64(v) => v.clear(),
            ColumnValues::UInt32(v) => v.clear(),
            ColumnValues::UInt64(v) => v.clear(),
            ColumnValues::Float32(v) => v.clear(),
            ColumnValues::Float64(v) => v.clear(),
            ColumnValues::Bool(v) => v.clear(),
            ColumnValues::Date(v) => v.clear(),
            ColumnValues::DateTime(v) => v.clear(),
            ColumnValues::String(v) => v.clear(),
            ColumnValues::Binary(v) => v.clear(),
            ColumnValues::Enum(v) => v.clear(),
            ColumnValues::DataType(v) => v.clear(),
            ColumnValues::Null(n) => *n = 0,
        }
    }
}

/// Concatenated-bytes-plus-offset-table storage backing every variable
/// length column in a `Block`, rather than a `Vec<String>` per column.
#[derive(Debug, Clone, Default)]
pub struct StringArena {
    bytes: Vec<u8>,
}

impl StringArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, value: &[u8]) -> (u32, u32) {
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(value);
        (offset, value.len() as u32)
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone)]
struct Column {
    values: ColumnValues,
    nulls: Option<Bitmap>,
}

impl Column {
    fn with_capacity(attribute: &Attribute, capacity: usize) -> Self {
        Self {
            values: ColumnValues::for_type(attribute.data_type, capacity),
            nulls: attribute
                .nullability
                .is_nullable()
                .then(|| Bitmap::with_len_all_clear(0)),
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        if let Some(nulls) = &mut self.nulls {
            nulls.clear();
        }
    }

    fn set_null(&mut self, is_null: bool) {
        if let Some(nulls) = &mut self.nulls {
            nulls.push(is_null);
        }
    }
}

/// Owning, columnar storage for a fixed row count under a schema.
#[derive(Debug, Clone)]
pub struct Block {
    schema: TupleSchema,
    columns: Vec<Column>,
    arena: StringArena,
    row_count: usize,
}

fn estimated_column_bytes(attribute: &Attribute, capacity: usize) -> usize {
    let mut bytes = match attribute.data_type.fixed_width() {
        Some(w) => w * capacity,
        // variable-length columns store an (offset, length) pair per row;
        // the arena itself grows separately and is not pre-charged here.
        None => 8 * capacity,
    };
    if attribute.nullability.is_nullable() {
        bytes += capacity.div_ceil(8);
    }
    bytes
}

impl Block {
    /// Allocates one values buffer per attribute, plus null bitmaps for
    /// nullable ones. `capacity` is checked against `allocator` before any
    /// storage is reserved, so a ceiling violation surfaces as
    /// `MEMORY_EXCEEDED` rather than an uncontrolled process-wide grow.
    pub fn with_capacity(
        allocator: &dyn Allocator,
        schema: TupleSchema,
        capacity: usize,
    ) -> FailureOr<Block> {
        let total_bytes: usize = schema
            .attributes()
            .iter()
            .map(|a| estimated_column_bytes(a, capacity))
            .sum();
        // Admission check against the arena's estimated footprint. The
        // actual storage is the growable `Vec`-backed columns below, not
        // this `Buffer`, which releases its charge back to `allocator` as
        // soon as it drops at the end of this function.
        let _ceiling_check = allocator.allocate(total_bytes)?;
        let columns = schema
            .attributes()
            .iter()
            .map(|a| Column::with_capacity(a, capacity))
            .collect();
        Ok(Block {
            schema,
            columns,
            arena: StringArena::new(),
            row_count: 0,
        })
    }

    pub fn schema(&self) -> &TupleSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Appends one logical row for testing. `values` must have one
    /// entry per schema attribute, in order.
    pub fn append_row(&mut self, values: &[ScalarValue]) -> FailureOr<()> {
        if values.len() != self.schema.attribute_count() {
            return Err(Exception::new(
                ErrorCode::AttributeCountMismatch,
                format!(
                    "append_row expected {} values, got {}",
                    self.schema.attribute_count(),
                    values.len()
                ),
            ));
        }
        for (i, value) in values.iter().enumerate() {
            let attribute = self.schema.attribute(i).clone();
            self.push_scalar(i, &attribute, value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    fn push_scalar(&mut self, idx: usize, attribute: &Attribute, value: &ScalarValue) -> FailureOr<()> {
        if matches!(value, ScalarValue::Null) {
            if !attribute.nullability.is_nullable() {
                return Err(Exception::type_mismatch(format!(
                    "attribute `{}` is NOT_NULLABLE but got a null value",
                    attribute.name
                )));
            }
            self.push_default(idx);
            self.columns[idx].set_null(true);
            return Ok(());
        }
        let col = &mut self.columns[idx].values;
        let mismatch = || {
            Exception::type_mismatch(format!(
                "value for attribute `{}` does not match type {}",
                attribute.name, attribute.data_type
            ))
        };
        match (col, value) {
            (ColumnValues::Int32(v), ScalarValue::Int32(x)) => v.push(*x),
            (ColumnValues::Int64(v), ScalarValue::Int64(x)) => v.push(*x),
            (ColumnValues::UInt32(v), ScalarValue::UInt32(x)) => v.push(*x),
            (ColumnValues::UInt64(v), ScalarValue::UInt64(x)) => v.push(*x),
            (ColumnValues::Float32(v), ScalarValue::Float32(x)) => v.push(*x),
            (ColumnValues::Float64(v), ScalarValue::Float64(x)) => v.push(*x),
            (ColumnValues::Bool(v), ScalarValue::Bool(x)) => v.push(*x),
            (ColumnValues::Date(v), ScalarValue::Date(x)) => v.push(*x),
            (ColumnValues::DateTime(v), ScalarValue::DateTime(x)) => v.push(*x),
            (ColumnValues::Enum(v), ScalarValue::Enum(x)) => v.push(*x),
            (ColumnValues::DataType(v), ScalarValue::DataType(x)) => v.push(*x),
            (ColumnValues::String(v), ScalarValue::String(s)) => {
                v.push(self.arena.append(s.as_bytes()));
            }
            (ColumnValues::Binary(v), ScalarValue::Binary(b)) => {
                v.push(self.arena.append(b));
            }
            _ => return Err(mismatch()),
        }
        self.columns[idx].set_null(false);
        Ok(())
    }

    fn push_default(&mut self, idx: usize) {
        match &mut self.columns[idx].values {
            ColumnValues::Int32(v) => v.push(0),
            ColumnValues::Int64(v) => v.push(0),
            ColumnValues::UInt32(v) => v.push(0),
            ColumnValues::UInt64(v) => v.push(0),
            ColumnValues::Float32(v) => v.push(0.0),
            ColumnValues::Float64(v) => v.push(0.0),
            ColumnValues::Bool(v) => v.push(false),
            ColumnValues::Date(v) => v.push(0),
            ColumnValues::DateTime(v) => v.push(0),
            ColumnValues::String(v) => v.push((0, 0)),
            ColumnValues::Binary(v) => v.push((0, 0)),
            ColumnValues::Enum(v) => v.push(0),
            ColumnValues::DataType(v) => v.push(DataType::NullType),
            ColumnValues::Null(n) => *n += 1,
        }
    }

    /// Clears every column and the arena, keeping allocated capacity —
    /// used to reuse a `Block` as an evaluation arena across calls.
    pub fn clear_rows(&mut self) {
        for col in &mut self.columns {
            col.clear();
        }
        self.arena.clear();
        self.row_count = 0;
    }

    /// Appends `count` rows to this (assumed freshly cleared) block by
    /// copying, for each destination column `i`, row range
    /// `[0, count)` of `sources[i].0`'s column `sources[i].1`.
    ///
    /// This is the single routing primitive behind attribute references,
    /// compound expressions and projections alike: they differ only in how
    /// `sources` is built.
    pub fn extend_from_views(&mut self, sources: &[(&View<'_>, usize)], count: usize) -> FailureOr<()> {
        debug_assert_eq!(sources.len(), self.schema.attribute_count());
        for (dst_idx, (view, src_idx)) in sources.iter().enumerate() {
            self.copy_column_from_view(dst_idx, view, *src_idx, count)?;
        }
        self.row_count = count;
        Ok(())
    }

    fn copy_column_from_view(
        &mut self,
        dst_idx: usize,
        view: &View<'_>,
        src_idx: usize,
        count: usize,
    ) -> FailureOr<()> {
        let window = &view.columns[src_idx];
        let nullable = self.schema.attribute(dst_idx).nullability.is_nullable();
        if nullable {
            for r in 0..count {
                let is_null = window.nulls.map(|n| n.get(r)).unwrap_or(false);
                self.columns[dst_idx].set_null(is_null);
            }
        }
        macro_rules! copy_fixed {
            ($dst:ident, $src:ident) => {
                if let (ColumnValues::$dst(dst), ColumnView::$src(src)) =
                    (&mut self.columns[dst_idx].values, &window.values)
                {
                    dst.extend_from_slice(&src[..count]);
                    return Ok(());
                }
            };
        }
        copy_fixed!(Int32, Int32);
        copy_fixed!(Int64, Int64);
        copy_fixed!(UInt32, UInt32);
        copy_fixed!(UInt64, UInt64);
        copy_fixed!(Float32, Float32);
        copy_fixed!(Float64, Float64);
        copy_fixed!(Bool, Bool);
        copy_fixed!(Date, Date);
        copy_fixed!(DateTime, DateTime);
        copy_fixed!(Enum, Enum);
        copy_fixed!(DataType, DataType);
        match (&mut self.columns[dst_idx].values, &window.values) {
            (ColumnValues::String(dst), ColumnView::String(offsets)) => {
                for &(off, len) in &offsets[..count] {
                    let bytes = &view.arena[off as usize..(off + len) as usize];
                    dst.push(self.arena.append(bytes));
                }
                Ok(())
            }
            (ColumnValues::Binary(dst), ColumnView::Binary(offsets)) => {
                for &(off, len) in &offsets[..count] {
                    let bytes = &view.arena[off as usize..(off + len) as usize];
                    dst.push(self.arena.append(bytes));
                }
                Ok(())
            }
            (ColumnValues::Null(n), ColumnView::Null) => {
                *n += count;
                Ok(())
            }
            _ => Err(Exception::type_mismatch(
                "column source type does not match destination column type",
            )),
        }
    }

    /// Clears any null bits set at rows the caller marked "skip" in a
    /// selection bitmap — values at those rows remain whatever was written,
    /// but must not be reported as null.
    pub fn clear_nulls_at_skipped_rows(&mut self, skip: BitmapView<'_>) {
        for col in &mut self.columns {
            if let Some(nulls) = &mut col.nulls {
                for r in 0..skip.len().min(nulls.len()) {
                    if skip.get(r) {
                        nulls.set(r, false);
                    }
                }
            }
        }
    }

    pub fn view(&self) -> View<'_> {
        let columns = self
            .columns
            .iter()
            .map(|c| ColumnWindow {
                values: ColumnView::from_values(&c.values),
                nulls: c.nulls.as_ref().map(|b| b.view()),
            })
            .collect();
        View {
            schema: &self.schema,
            columns,
            arena: self.arena.as_slice(),
            row_count: self.row_count,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ColumnView<'a> {
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
    Bool(&'a [bool]),
    Date(&'a [i32]),
    DateTime(&'a [i64]),
    String(&'a [(u32, u32)]),
    Binary(&'a [(u32, u32)]),
    Enum(&'a [i32]),
    DataType(&'a [DataType]),
    Null,
}

impl<'a> ColumnView<'a> {
    fn from_values(values: &'a ColumnValues) -> Self {
        match values {
            ColumnValues::Int32(v) => ColumnView::Int32(v),
            ColumnValues::Int64(v) => ColumnView::Int64(v),
            ColumnValues::UInt32(v) => ColumnView::UInt32(v),
            ColumnValues::UInt64(v) => ColumnView::UInt64(v),
            ColumnValues::Float32(v) => ColumnView::Float32(v),
            ColumnValues::Float64(v) => ColumnView::Float64(v),
            ColumnValues::Bool(v) => ColumnView::Bool(v),
            ColumnValues::Date(v) => ColumnView::Date(v),
            ColumnValues::DateTime(v) => ColumnView::DateTime(v),
            ColumnValues::String(v) => ColumnView::String(v),
            ColumnValues::Binary(v) => ColumnView::Binary(v),
            ColumnValues::Enum(v) => ColumnView::Enum(v),
            ColumnValues::DataType(v) => ColumnView::DataType(v),
            ColumnValues::Null(_) => ColumnView::Null,
        }
    }

    fn subrange(&self, offset: usize, count: usize) -> Self {
        match self {
            ColumnView::Int32(v) => ColumnView::Int32(&v[offset..offset + count]),
            ColumnView::Int64(v) => ColumnView::Int64(&v[offset..offset + count]),
            ColumnView::UInt32(v) => ColumnView::UInt32(&v[offset..offset + count]),
            ColumnView::UInt64(v) => ColumnView::UInt64(&v[offset..offset + count]),
            ColumnView::Float32(v) => ColumnView::Float32(&v[offset..offset + count]),
            ColumnView::Float64(v) => ColumnView::Float64(&v[offset..offset + count]),
            ColumnView::Bool(v) => ColumnView::Bool(&v[offset..offset + count]),
            ColumnView::Date(v) => ColumnView::Date(&v[offset..offset + count]),
            ColumnView::DateTime(v) => ColumnView::DateTime(&v[offset..offset + count]),
            ColumnView::String(v) => ColumnView::String(&v[offset..offset + count]),
            ColumnView::Binary(v) => ColumnView::Binary(&v[offset..offset + count]),
            ColumnView::Enum(v) => ColumnView::Enum(&v[offset..offset + count]),
            ColumnView::DataType(v) => ColumnView::DataType(&v[offset..offset + count]),
            ColumnView::Null => ColumnView::Null,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnWindow<'a> {
    values: ColumnView<'a>,
    nulls: Option<BitmapView<'a>>,
}

/// A non-owning window over a row range of a `Block`.
///
/// Column pointers, null pointers, an offset and a row count, realized as
/// Rust slices rather than raw pointers, with the borrow's lifetime
/// standing in for the offset.
#[derive(Debug, Clone)]
pub struct View<'a> {
    schema: &'a TupleSchema,
    columns: Vec<ColumnWindow<'a>>,
    arena: &'a [u8],
    row_count: usize,
}

impl<'a> View<'a> {
    pub fn schema(&self) -> &'a TupleSchema {
        self.schema
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Narrows this view to `[offset, offset + count)`, aliasing the same
    /// backing columns.
    pub fn subrange(&self, offset: usize, count: usize) -> View<'a> {
        assert!(offset + count <= self.row_count, "subrange out of bounds");
        let columns = self
            .columns
            .iter()
            .map(|w| ColumnWindow {
                values: w.values.subrange(offset, count),
                nulls: w.nulls.map(|n| n.subrange(offset, count)),
            })
            .collect();
        View {
            schema: self.schema,
            columns,
            arena: self.arena,
            row_count: count,
        }
    }

    pub fn is_null(&self, column: usize, row: usize) -> bool {
        self.columns[column]
            .nulls
            .map(|n| n.get(row))
            .unwrap_or(false)
    }

    /// Renders one logical row as owned scalars, for assertions in tests.
    pub fn row(&self, row: usize) -> Vec<ScalarValue> {
        (0..self.columns.len())
            .map(|c| self.scalar_at(c, row))
            .collect()
    }

    fn scalar_at(&self, column: usize, row: usize) -> ScalarValue {
        if self.is_null(column, row) {
            return ScalarValue::Null;
        }
        match &self.columns[column].values {
            ColumnView::Int32(v) => ScalarValue::Int32(v[row]),
            ColumnView::Int64(v) => ScalarValue::Int64(v[row]),
            ColumnView::UInt32(v) => ScalarValue::UInt32(v[row]),
            ColumnView::UInt64(v) => ScalarValue::UInt64(v[row]),
            ColumnView::Float32(v) => ScalarValue::Float32(v[row]),
            ColumnView::Float64(v) => ScalarValue::Float64(v[row]),
            ColumnView::Bool(v) => ScalarValue::Bool(v[row]),
            ColumnView::Date(v) => ScalarValue::Date(v[row]),
            ColumnView::DateTime(v) => ScalarValue::DateTime(v[row]),
            ColumnView::Enum(v) => ScalarValue::Enum(v[row]),
            ColumnView::DataType(v) => ScalarValue::DataType(v[row]),
            ColumnView::String(offsets) => {
                let (off, len) = offsets[row];
                let bytes = &self.arena[off as usize..(off + len) as usize];
                ScalarValue::String(String::from_utf8_lossy(bytes).into_owned())
            }
            ColumnView::Binary(offsets) => {
                let (off, len) = offsets[row];
                ScalarValue::Binary(self.arena[off as usize..(off + len) as usize].to_vec())
            }
            ColumnView::Null => ScalarValue::Null,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::UInt32(v) => write!(f, "{v}"),
            ScalarValue::UInt64(v) => write!(f, "{v}"),
            ScalarValue::Float32(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Date(v) => write!(f, "date({v})"),
            ScalarValue::DateTime(v) => write!(f, "datetime({v})"),
            ScalarValue::String(v) => write!(f, "{v:?}"),
            ScalarValue::Binary(v) => write!(f, "{v:?}"),
            ScalarValue::Enum(v) => write!(f, "enum({v})"),
            ScalarValue::DataType(v) => write!(f, "{v}"),
            ScalarValue::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::HeapAllocator;
    use supersonic_types::{Attribute, Nullability, TupleSchema};

    fn sample_schema() -> TupleSchema {
        let mut s = TupleSchema::new();
        s.add_attribute(Attribute::new("a", DataType::Int32, Nullability::NotNullable));
        s.add_attribute(Attribute::new("b", DataType::String, Nullability::Nullable));
        s
    }

    #[test]
    fn append_row_and_view_round_trip() {
        let schema = sample_schema();
        let allocator = HeapAllocator::new();
        let mut block = Block::with_capacity(&allocator, schema, 4).unwrap();
        block
            .append_row(&[ScalarValue::Int32(1), ScalarValue::String("x".into())])
            .unwrap();
        block
            .append_row(&[ScalarValue::Int32(2), ScalarValue::Null])
            .unwrap();
        let view = block.view();
        assert_eq!(view.row_count(), 2);
        assert_eq!(view.row(0), vec![ScalarValue::Int32(1), ScalarValue::String("x".into())]);
        assert_eq!(view.row(1), vec![ScalarValue::Int32(2), ScalarValue::Null]);
    }

    #[test]
    fn not_nullable_rejects_null() {
        let schema = sample_schema();
        let allocator = HeapAllocator::new();
        let mut block = Block::with_capacity(&allocator, schema, 4).unwrap();
        let err = block
            .append_row(&[ScalarValue::Null, ScalarValue::Null])
            .unwrap_err();
        assert_eq!(err.code, supersonic_types::ErrorCode::TypeMismatch);
    }

    #[test]
    fn subrange_aliases_parent() {
        let schema = sample_schema();
        let allocator = HeapAllocator::new();
        let mut block = Block::with_capacity(&allocator, schema, 4).unwrap();
        for i in 0..4 {
            block
                .append_row(&[ScalarValue::Int32(i), ScalarValue::String(i.to_string())])
                .unwrap();
        }
        let view = block.view();
        let sub = view.subrange(1, 2);
        assert_eq!(sub.row_count(), 2);
        assert_eq!(sub.row(0), vec![ScalarValue::Int32(1), ScalarValue::String("1".into())]);
        assert_eq!(sub.row(1), vec![ScalarValue::Int32(2), ScalarValue::String("2".into())]);
    }

    #[test]
    fn zero_row_view_is_legal() {
        let schema = sample_schema();
        let allocator = HeapAllocator::new();
        let block = Block::with_capacity(&allocator, schema, 4).unwrap();
        let view = block.view();
        assert_eq!(view.row_count(), 0);
    }
}

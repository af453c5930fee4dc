//! Multi-source projector: bound mapping from several input schemas to one
//! result schema, with a reverse index back from source attributes to the
//! result positions they ended up at.

use std::fmt;

use multimap::MultiMap;
use supersonic_types::{Attribute, Exception, FailureOr, TupleSchema};
use tracing::debug;

use super::single::{BoundSingleSourceProjector, SingleSourceProjectorSpec};

/// Identifies one input column of a multi-source projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceAttribute {
    pub source_index: usize,
    pub position: usize,
}

/// The unbound form: an ordered list of `(source_index, child)` pairs.
#[derive(Debug, Clone, Default)]
pub struct MultiSourceProjectorSpec {
    pub entries: Vec<(usize, SingleSourceProjectorSpec)>,
}

impl MultiSourceProjectorSpec {
    pub fn new(entries: Vec<(usize, SingleSourceProjectorSpec)>) -> Self {
        Self { entries }
    }

    /// Binds pairs in order, resolving each child against its designated
    /// source schema and appending its produced attributes to the result
    /// schema. Unlike the single-source `Compound` projector, a name can
    /// appear more than once here: projecting the same source attribute
    /// several times (with or without distinct aliases) is a normal case,
    /// not a conflict.
    pub fn bind(&self, sources: &[TupleSchema]) -> FailureOr<BoundMultiSourceProjector> {
        let mut result = BoundMultiSourceProjector {
            source_schemas: sources.to_vec(),
            result_schema: TupleSchema::new(),
            proj: Vec::new(),
            reverse: MultiMap::new(),
        };
        for (source_index, child) in &self.entries {
            let source_schema = sources.get(*source_index).ok_or_else(|| {
                Exception::attribute_count_mismatch(format!(
                    "source index {source_index} out of range for {} source schemas",
                    sources.len()
                ))
            })?;
            let bound_child = child.bind(source_schema)?;
            for i in 0..bound_child.result_schema().attribute_count() {
                let attribute = bound_child.result_schema().attribute(i).clone();
                let source_position = bound_child.proj()[i];
                result.push(*source_index, source_position, attribute);
            }
        }
        debug!(spec = %self, result_schema = %result.result_schema(), "bound multi-source projector");
        Ok(result)
    }
}

impl fmt::Display for MultiSourceProjectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiSourceProjector(")?;
        for (i, (src, child)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{src}:{child}")?;
        }
        write!(f, ")")
    }
}

/// The bound form. `proj[i]` gives the `SourceAttribute` that output
/// position `i` was routed from; `reverse` is the equal-range index used by
/// operators to answer "where did this source attribute end up".
#[derive(Debug, Clone)]
pub struct BoundMultiSourceProjector {
    source_schemas: Vec<TupleSchema>,
    result_schema: TupleSchema,
    proj: Vec<SourceAttribute>,
    reverse: MultiMap<(usize, usize), usize>,
}

impl BoundMultiSourceProjector {
    pub fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    pub fn source_count(&self) -> usize {
        self.source_schemas.len()
    }

    pub fn source_schema(&self, source_index: usize) -> &TupleSchema {
        &self.source_schemas[source_index]
    }

    pub fn proj(&self) -> &[SourceAttribute] {
        &self.proj
    }

    pub fn source_index(&self, result_pos: usize) -> usize {
        self.proj[result_pos].source_index
    }

    pub fn source_attribute_position(&self, result_pos: usize) -> usize {
        self.proj[result_pos].position
    }

    /// Appends one output attribute under `alias`, returning `false` on a
    /// duplicate alias without mutating `self`. This is the incremental
    /// builder join operators use to assemble a projector attribute by
    /// attribute, where a repeated alias really is a programming mistake
    /// rather than a deliberate re-projection.
    pub fn add_as(&mut self, source_index: usize, position: usize, alias: impl Into<String>) -> bool {
        let attribute = self
            .source_schemas[source_index]
            .attribute(position)
            .renamed(alias.into());
        if !self.result_schema.add_attribute(attribute) {
            return false;
        }
        let result_pos = self.result_schema.attribute_count() - 1;
        self.proj.push(SourceAttribute { source_index, position });
        self.reverse.insert((source_index, position), result_pos);
        true
    }

    /// Appends one output attribute produced while binding `entries` in
    /// order. Duplicate result names are expected here — the same source
    /// attribute can be projected any number of times — so this never
    /// fails; only `add_as` treats a repeated name as a mistake.
    fn push(&mut self, source_index: usize, position: usize, attribute: Attribute) {
        self.result_schema.append_attribute(attribute);
        let result_pos = self.result_schema.attribute_count() - 1;
        self.proj.push(SourceAttribute { source_index, position });
        self.reverse.insert((source_index, position), result_pos);
    }

    /// Result positions this `(source_index, position)` attribute was
    /// projected to, in insertion order; empty if never projected.
    pub fn projected_attribute_positions(&self, source_index: usize, position: usize) -> &[usize] {
        self.reverse
            .get_vec(&(source_index, position))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_attribute_projected(&self, source_index: usize, position: usize) -> bool {
        self.number_of_projections_for_attribute(source_index, position) > 0
    }

    pub fn number_of_projections_for_attribute(&self, source_index: usize, position: usize) -> usize {
        self.projected_attribute_positions(source_index, position).len()
    }

    /// The slice of this projector's outputs that came from `source_index`,
    /// preserving result names and order.
    pub fn get_single_source_projector(&self, source_index: usize) -> BoundSingleSourceProjector {
        let mut result_schema = TupleSchema::new();
        let mut proj = Vec::new();
        for (result_pos, sa) in self.proj.iter().enumerate() {
            if sa.source_index == source_index {
                let attribute = self.result_schema.attribute(result_pos).clone();
                result_schema.append_attribute(attribute);
                proj.push(sa.position);
            }
        }
        BoundSingleSourceProjector::from_parts(self.source_schemas[source_index].clone(), result_schema, proj)
    }

    /// Factors this projector into an inner single-source projector `Q`
    /// over `source_index` and an outer multi-source projector whose
    /// entries for `source_index` have been rewritten to index into `Q`'s
    /// result schema. Two entries that projected the same
    /// `(source_index, position)` collapse into one `Q` output shared by
    /// both; entries for other sources pass through unchanged.
    pub fn decompose_nth(&self, source_index: usize) -> (BoundMultiSourceProjector, BoundSingleSourceProjector) {
        let source_schema = self.source_schemas[source_index].clone();
        let mut q_schema = TupleSchema::new();
        let mut q_proj = Vec::new();
        let mut position_to_q_index: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();

        let mut outer_proj = Vec::with_capacity(self.proj.len());
        for sa in &self.proj {
            if sa.source_index != source_index {
                outer_proj.push(*sa);
                continue;
            }
            let q_index = *position_to_q_index.entry(sa.position).or_insert_with(|| {
                let attribute = source_schema.attribute(sa.position).clone();
                q_schema.add_attribute(attribute);
                q_proj.push(sa.position);
                q_schema.attribute_count() - 1
            });
            outer_proj.push(SourceAttribute {
                source_index,
                position: q_index,
            });
        }

        let q = BoundSingleSourceProjector::from_parts(source_schema, q_schema.clone(), q_proj);

        let mut outer_sources = self.source_schemas.clone();
        outer_sources[source_index] = q_schema;
        let mut reverse = MultiMap::new();
        for (result_pos, sa) in outer_proj.iter().enumerate() {
            reverse.insert((sa.source_index, sa.position), result_pos);
        }
        let outer = BoundMultiSourceProjector {
            source_schemas: outer_sources,
            result_schema: self.result_schema.clone(),
            proj: outer_proj,
            reverse,
        };
        (outer, q)
    }
}

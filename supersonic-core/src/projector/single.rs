//! Single-source projector: logical spec → bound mapping from one input
//! schema to a result schema.

use std::collections::HashSet;
use std::fmt;

use supersonic_types::{Attribute, Exception, FailureOr, TupleSchema};
use tracing::debug;

/// The unbound projector spec. A closed, enumerable sum type — new kinds
/// are an extension the core does not need to anticipate.
#[derive(Debug, Clone, PartialEq)]
pub enum SingleSourceProjectorSpec {
    /// Resolves by name; fails with `ATTRIBUTE_MISSING` if absent.
    NamedAttribute(String),
    /// Resolves by index; fails with `ATTRIBUTE_COUNT_MISMATCH` if out of range.
    PositionedAttribute(usize),
    /// Adds every input attribute, optionally name-prefixed.
    AllAttributes(Option<String>),
    /// Concatenates children's results in order; fails with
    /// `ATTRIBUTE_EXISTS` on a duplicate result name.
    Compound(Vec<SingleSourceProjectorSpec>),
    /// Binds `child`, then replaces its result names with `aliases`.
    /// Aliases must be internally unique: a precondition, violating it is a
    /// programming error rather than a runtime failure.
    Renaming(Vec<String>, Box<SingleSourceProjectorSpec>),
}

impl fmt::Display for SingleSourceProjectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingleSourceProjectorSpec::NamedAttribute(n) => write!(f, "NamedAttribute({n})"),
            SingleSourceProjectorSpec::PositionedAttribute(i) => {
                write!(f, "PositionedAttribute({i})")
            }
            SingleSourceProjectorSpec::AllAttributes(prefix) => match prefix {
                Some(p) => write!(f, "AllAttributes(prefix={p})"),
                None => write!(f, "AllAttributes()"),
            },
            SingleSourceProjectorSpec::Compound(children) => {
                write!(f, "Compound(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            SingleSourceProjectorSpec::Renaming(aliases, child) => {
                write!(f, "Renaming({aliases:?}, {child})")
            }
        }
    }
}

/// The bound result: source schema, result schema and a `proj[i] =
/// source_position` map. Invariant: every `proj[i]` is a valid index
/// into the source schema and `source[proj[i]]` and `result[i]` agree on
/// type and nullability.
#[derive(Debug, Clone)]
pub struct BoundSingleSourceProjector {
    source_schema: TupleSchema,
    result_schema: TupleSchema,
    proj: Vec<usize>,
}

impl BoundSingleSourceProjector {
    /// Assembles a bound projector directly from its parts, bypassing
    /// `bind`. Used by the multi-source projector to slice out the portion
    /// of its mapping that belongs to a single source.
    pub fn from_parts(source_schema: TupleSchema, result_schema: TupleSchema, proj: Vec<usize>) -> Self {
        Self {
            source_schema,
            result_schema,
            proj,
        }
    }

    pub fn source_schema(&self) -> &TupleSchema {
        &self.source_schema
    }

    pub fn result_schema(&self) -> &TupleSchema {
        &self.result_schema
    }

    pub fn proj(&self) -> &[usize] {
        &self.proj
    }
}

impl SingleSourceProjectorSpec {
    /// Deterministic, side-effect-free binding against `source`.
    pub fn bind(&self, source: &TupleSchema) -> FailureOr<BoundSingleSourceProjector> {
        let mut result_schema = TupleSchema::new();
        let mut proj = Vec::new();
        if let Err(e) = self.bind_into(source, &mut result_schema, &mut proj) {
            debug!(spec = %self, error = %e, "single-source projector bind failed");
            return Err(e);
        }
        Ok(BoundSingleSourceProjector {
            source_schema: source.clone(),
            result_schema,
            proj,
        })
    }

    fn bind_into(
        &self,
        source: &TupleSchema,
        result_schema: &mut TupleSchema,
        proj: &mut Vec<usize>,
    ) -> FailureOr<()> {
        match self {
            SingleSourceProjectorSpec::NamedAttribute(name) => {
                let pos = source.lookup_position(name).ok_or_else(|| {
                    Exception::attribute_missing(format!(
                        "{self}: attribute `{name}` not found in source schema {}",
                        source.describe()
                    ))
                })?;
                push_attribute(result_schema, source.attribute(pos).clone(), self)?;
                proj.push(pos);
                Ok(())
            }
            SingleSourceProjectorSpec::PositionedAttribute(pos) => {
                if *pos >= source.attribute_count() {
                    return Err(Exception::attribute_count_mismatch(format!(
                        "{self}: position {pos} out of range for a {}-attribute source schema",
                        source.attribute_count()
                    )));
                }
                push_attribute(result_schema, source.attribute(*pos).clone(), self)?;
                proj.push(*pos);
                Ok(())
            }
            SingleSourceProjectorSpec::AllAttributes(prefix) => {
                for pos in 0..source.attribute_count() {
                    let attribute = source.attribute(pos).clone();
                    let attribute = match prefix {
                        Some(p) => attribute.renamed(format!("{p}{}", attribute.name)),
                        None => attribute,
                    };
                    push_attribute(result_schema, attribute, self)?;
                    proj.push(pos);
                }
                Ok(())
            }
            SingleSourceProjectorSpec::Compound(children) => {
                for child in children {
                    child.bind_into(source, result_schema, proj)?;
                }
                Ok(())
            }
            SingleSourceProjectorSpec::Renaming(aliases, child) => {
                debug_assert!(
                    aliases.iter().collect::<HashSet<_>>().len() == aliases.len(),
                    "Renaming aliases must be internally unique: {aliases:?}"
                );
                let mut child_schema = TupleSchema::new();
                let mut child_proj = Vec::new();
                child.bind_into(source, &mut child_schema, &mut child_proj)?;
                if aliases.len() != child_schema.attribute_count() {
                    return Err(Exception::attribute_count_mismatch(format!(
                        "{self}: {} aliases given for {} attributes produced by the child",
                        aliases.len(),
                        child_schema.attribute_count()
                    )));
                }
                for (alias, source_pos) in aliases.iter().zip(child_proj.iter()) {
                    let attribute = source.attribute(*source_pos).renamed(alias.clone());
                    push_attribute(result_schema, attribute, self)?;
                    proj.push(*source_pos);
                }
                Ok(())
            }
        }
    }
}

fn push_attribute(
    result_schema: &mut TupleSchema,
    attribute: Attribute,
    spec: &SingleSourceProjectorSpec,
) -> FailureOr<()> {
    let name = attribute.name.clone();
    if !result_schema.add_attribute(attribute) {
        return Err(Exception::attribute_exists(format!(
            "{spec}: result attribute `{name}` already exists"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use supersonic_types::{DataType, ErrorCode, Nullability};

    fn schema(names: &[&str]) -> TupleSchema {
        let mut s = TupleSchema::new();
        for n in names {
            s.add_attribute(Attribute::new(*n, DataType::Int32, Nullability::NotNullable));
        }
        s
    }

    #[test]
    fn named_attribute_binds_by_name() {
        let s = schema(&["a", "b"]);
        let bound = SingleSourceProjectorSpec::NamedAttribute("b".into())
            .bind(&s)
            .unwrap();
        assert_eq!(bound.proj(), &[1]);
        assert_eq!(bound.result_schema().attribute(0).name, "b");
    }

    #[test]
    fn named_attribute_missing_fails() {
        let s = schema(&["a"]);
        let err = SingleSourceProjectorSpec::NamedAttribute("zzz".into())
            .bind(&s)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AttributeMissing);
    }

    #[test]
    fn positioned_attribute_boundary() {
        let s = schema(&["a", "b"]);
        assert!(SingleSourceProjectorSpec::PositionedAttribute(1).bind(&s).is_ok());
        let err = SingleSourceProjectorSpec::PositionedAttribute(2)
            .bind(&s)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AttributeCountMismatch);
    }

    #[test]
    fn all_attributes_with_no_prefix_is_identity() {
        let s = schema(&["a", "b", "c"]);
        let bound = SingleSourceProjectorSpec::AllAttributes(None).bind(&s).unwrap();
        assert_eq!(bound.result_schema(), &s);
        assert_eq!(bound.proj(), &[0, 1, 2]);
    }

    #[test]
    fn all_attributes_with_prefix_renames() {
        let s = schema(&["a"]);
        let bound = SingleSourceProjectorSpec::AllAttributes(Some("t.".into()))
            .bind(&s)
            .unwrap();
        assert_eq!(bound.result_schema().attribute(0).name, "t.a");
    }

    #[test]
    fn compound_duplicate_name_fails() {
        let s = schema(&["a", "b"]);
        let spec = SingleSourceProjectorSpec::Compound(vec![
            SingleSourceProjectorSpec::NamedAttribute("a".into()),
            SingleSourceProjectorSpec::NamedAttribute("a".into()),
        ]);
        let err = spec.bind(&s).unwrap_err();
        assert_eq!(err.code, ErrorCode::AttributeExists);
    }

    #[test]
    fn renaming_replaces_names() {
        let s = schema(&["a", "b"]);
        let spec = SingleSourceProjectorSpec::Renaming(
            vec!["x".into(), "y".into()],
            Box::new(SingleSourceProjectorSpec::AllAttributes(None)),
        );
        let bound = spec.bind(&s).unwrap();
        let names: Vec<_> = bound
            .result_schema()
            .attributes()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn renaming_count_mismatch_fails() {
        let s = schema(&["a", "b"]);
        let spec = SingleSourceProjectorSpec::Renaming(
            vec!["x".into()],
            Box::new(SingleSourceProjectorSpec::AllAttributes(None)),
        );
        let err = spec.bind(&s).unwrap_err();
        assert_eq!(err.code, ErrorCode::AttributeCountMismatch);
    }

    #[test]
    fn rebinding_is_idempotent() {
        let s = schema(&["a", "b"]);
        let spec = SingleSourceProjectorSpec::AllAttributes(None);
        let first = spec.bind(&s).unwrap();
        let second = spec.bind(&s).unwrap();
        assert_eq!(first.result_schema(), second.result_schema());
        assert_eq!(first.proj(), second.proj());
    }
}

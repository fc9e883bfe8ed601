//! Resolved structure layouts.
//!
//! A [`StructLayout`] is the immutable, validated form of a [`LayoutSpec`]:
//! every field has a concrete size, dependencies are indices, and the
//! processing order and pointer region sizes are computed once up front.

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{PointerWidth, ValueType};
use crate::error::{Error, Result};
use crate::memory::AccessorConfig;
use crate::schema::{FieldKind, FieldSpec, LayoutSpec};

/// Index of a field inside its layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// A field with its size and dependency resolved
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub offset: usize,
    pub size: usize,
    pub kind: FieldKind,
    pub dependency: Option<FieldId>,
    /// Layout of an embedded structure (nested instances and sequence headers)
    pub(crate) embedded: Option<Arc<StructLayout>>,
}

impl FieldDef {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn embedded(&self) -> Option<&Arc<StructLayout>> {
        self.embedded.as_ref()
    }
}

#[derive(Debug)]
pub struct StructLayout {
    name: String,
    fields: Vec<FieldDef>,
    order: Vec<FieldId>,
    region_sizes: Vec<usize>,
    total_size: usize,
    config: AccessorConfig,
}

/// Byte size of the data pointer / count / capacity header
pub fn sequence_header_size(pointer_width: PointerWidth) -> usize {
    pointer_width.size() + 8
}

impl StructLayout {
    /// Resolve a spec. `embedded` looks up layouts of nested instances and
    /// sequence headers, which must already be resolved.
    pub(crate) fn resolve<F>(spec: &LayoutSpec, config: AccessorConfig, embedded: F) -> Result<Self>
    where
        F: Fn(&FieldSpec) -> Result<Option<Arc<StructLayout>>>,
    {
        let mut specs: Vec<&FieldSpec> = spec.fields.iter().collect();
        specs.sort_by_key(|f| f.offset);

        let mut ids = HashMap::with_capacity(specs.len());
        for (i, field) in specs.iter().enumerate() {
            if ids.insert(field.name.as_str(), FieldId(i)).is_some() {
                return Err(Error::DuplicateField {
                    layout: spec.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let pointer_size = config.pointer_size();
        let mut fields = Vec::with_capacity(specs.len());
        for field in &specs {
            let embedded = embedded(field)?;
            let size = match &field.kind {
                FieldKind::Scalar { value_type } => value_type.size(config.pointer_width),
                FieldKind::Pointer | FieldKind::String { .. } | FieldKind::NestedPointer { .. } => {
                    pointer_size
                }
                FieldKind::InlineString { len, .. } => *len,
                FieldKind::NestedInstance { layout } => embedded
                    .as_ref()
                    .map(|l| l.total_size())
                    .ok_or_else(|| Error::UnknownLayout(layout.clone()))?,
                FieldKind::Sequence { .. } => sequence_header_size(config.pointer_width),
            };

            let dependency = match &field.depends_on {
                None => None,
                Some(dep) => {
                    let id = *ids
                        .get(dep.as_str())
                        .ok_or_else(|| Error::UnknownField(format!("{}.{}", spec.name, dep)))?;
                    if !specs[id.0].kind.is_pointer() {
                        return Err(Error::InvalidDependency {
                            field: field.name.clone(),
                            dependency: dep.clone(),
                        });
                    }
                    Some(id)
                }
            };

            fields.push(FieldDef {
                name: field.name.clone(),
                offset: field.offset,
                size,
                kind: field.kind.clone(),
                dependency,
                embedded,
            });
        }

        let order = dependency_order(&fields)?;
        let region_sizes = (0..fields.len())
            .map(|i| region_size(&fields, FieldId(i), config.max_string_len))
            .collect();

        Ok(Self {
            name: spec.name.clone(),
            total_size: total_size(&fields),
            fields,
            order,
            region_sizes,
            config,
        })
    }

    /// The data pointer / count / capacity header expanded by sequences
    pub(crate) fn sequence_header(name: &str, config: AccessorConfig) -> Self {
        let pointer_size = config.pointer_size();
        let field = |name: &str, offset: usize, size: usize, kind: FieldKind| FieldDef {
            name: name.to_string(),
            offset,
            size,
            kind,
            dependency: None,
            embedded: None,
        };
        let int = FieldKind::Scalar {
            value_type: ValueType::I32,
        };
        let fields = vec![
            field("data", 0, pointer_size, FieldKind::Pointer),
            field("count", pointer_size, 4, int.clone()),
            field("capacity", pointer_size + 4, 4, int),
        ];

        Self {
            name: name.to_string(),
            order: (0..fields.len()).map(FieldId).collect(),
            region_sizes: vec![0; fields.len()],
            total_size: sequence_header_size(config.pointer_width),
            fields,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> &FieldDef {
        &self.fields[id.0]
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields.iter().position(|f| f.name == name).map(FieldId)
    }

    /// Fields in processing order: every field comes after its dependency
    pub fn order(&self) -> &[FieldId] {
        &self.order
    }

    /// Bytes spanned by the fields sourced from the structure's own buffer
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Size of the region fetched through pointer field `id`; 0 when nothing
    /// depends on it
    pub fn region_size(&self, id: FieldId) -> usize {
        self.region_sizes.get(id.0).copied().unwrap_or(0)
    }

    pub fn dependents(&self, id: FieldId) -> impl Iterator<Item = &FieldDef> + '_ {
        self.fields
            .iter()
            .filter(move |f| f.dependency == Some(id))
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }
}

/// Max end offset over the fields without a dependency
pub(crate) fn total_size(fields: &[FieldDef]) -> usize {
    fields
        .iter()
        .filter(|f| f.dependency.is_none())
        .map(FieldDef::end)
        .max()
        .unwrap_or(0)
}

/// Size of the region a pointer must fetch for its dependents.
///
/// The dependent with the largest offset decides; at equal offsets the larger
/// field wins so unions are covered. A pointed string's length is unknown
/// until its terminator is found, so it counts as `max_string_len` bytes,
/// also when breaking ties.
pub(crate) fn region_size(fields: &[FieldDef], pointer: FieldId, max_string_len: usize) -> usize {
    let value_size = |f: &FieldDef| match f.kind {
        FieldKind::String { .. } => max_string_len,
        _ => f.size,
    };

    fields
        .iter()
        .filter(|f| f.dependency == Some(pointer))
        .map(|f| (f.offset, value_size(f)))
        .max()
        .map_or(0, |(offset, size)| offset + size)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first topological sort over dependencies, stable by offset
pub(crate) fn dependency_order(fields: &[FieldDef]) -> Result<Vec<FieldId>> {
    fn visit(
        id: FieldId,
        fields: &[FieldDef],
        marks: &mut [Mark],
        sorted: &mut Vec<FieldId>,
    ) -> Result<()> {
        match marks[id.0] {
            Mark::Done => Ok(()),
            Mark::InProgress => Err(Error::CyclicDependency(fields[id.0].name.clone())),
            Mark::Unvisited => {
                marks[id.0] = Mark::InProgress;
                if let Some(dep) = fields[id.0].dependency {
                    visit(dep, fields, marks, sorted)?;
                }
                marks[id.0] = Mark::Done;
                sorted.push(id);
                Ok(())
            }
        }
    }

    let mut marks = vec![Mark::Unvisited; fields.len()];
    let mut sorted = Vec::with_capacity(fields.len());
    for i in 0..fields.len() {
        visit(FieldId(i), fields, &mut marks, &mut sorted)?;
    }
    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{StringEncoding, ValueType};

    fn resolve(spec: &LayoutSpec) -> Result<StructLayout> {
        StructLayout::resolve(spec, AccessorConfig::default(), |_| Ok(None))
    }

    #[test]
    fn test_total_size_is_max_end() {
        let spec = LayoutSpec::new("Pair")
            .field(FieldSpec::scalar("b", 4, ValueType::I32))
            .field(FieldSpec::scalar("a", 0, ValueType::I32))
            .field(FieldSpec::scalar("flag", 2, ValueType::U8));
        let layout = resolve(&spec).unwrap();
        assert_eq!(layout.total_size(), 8);
        assert_eq!(layout.fields()[0].name, "a");
    }

    #[test]
    fn test_empty_layout_has_zero_size() {
        let layout = resolve(&LayoutSpec::new("Empty")).unwrap();
        assert_eq!(layout.total_size(), 0);
        assert!(layout.order().is_empty());
    }

    #[test]
    fn test_dependents_do_not_count_toward_total_size() {
        let spec = LayoutSpec::new("Boxed")
            .field(FieldSpec::pointer("ptr", 0))
            .field(FieldSpec::scalar("far", 0x100, ValueType::U64).depends_on("ptr"));
        let layout = resolve(&spec).unwrap();
        assert_eq!(layout.total_size(), 8);
    }

    #[test]
    fn test_region_size_union_tie_break() {
        let spec = LayoutSpec::new("Union")
            .field(FieldSpec::pointer("ptr", 0))
            .field(FieldSpec::scalar("head", 0, ValueType::U8).depends_on("ptr"))
            .field(FieldSpec::scalar("as_u16", 0x10, ValueType::U16).depends_on("ptr"))
            .field(FieldSpec::scalar("as_u64", 0x10, ValueType::U64).depends_on("ptr"))
            .field(FieldSpec::scalar("as_u32", 0x10, ValueType::U32).depends_on("ptr"));
        let layout = resolve(&spec).unwrap();
        let ptr = layout.field_id("ptr").unwrap();
        assert_eq!(layout.region_size(ptr), 0x18);
        assert_eq!(layout.dependents(ptr).count(), 4);
    }

    #[test]
    fn test_region_size_string_uses_max_len() {
        let spec = LayoutSpec::new("PString")
            .field(FieldSpec::pointer("ptr", 0))
            .field(FieldSpec::string("text", 4, StringEncoding::Narrow).depends_on("ptr"));
        let layout = resolve(&spec).unwrap();
        let ptr = layout.field_id("ptr").unwrap();
        assert_eq!(layout.region_size(ptr), 4 + layout.config().max_string_len);
    }

    #[test]
    fn test_region_size_string_wins_tie_with_scalar() {
        // Declared after the string, the pointer-sized view must not shrink the region
        let spec = LayoutSpec::new("Tagged")
            .field(FieldSpec::pointer("ptr", 0))
            .field(FieldSpec::string("text", 8, StringEncoding::Narrow).depends_on("ptr"))
            .field(FieldSpec::scalar("raw", 8, ValueType::U64).depends_on("ptr"));
        let layout = resolve(&spec).unwrap();
        let ptr = layout.field_id("ptr").unwrap();
        assert_eq!(layout.region_size(ptr), 8 + layout.config().max_string_len);
    }

    #[test]
    fn test_region_size_zero_without_dependents() {
        let spec = LayoutSpec::new("Raw").field(FieldSpec::pointer("data", 0));
        let layout = resolve(&spec).unwrap();
        assert_eq!(layout.region_size(FieldId(0)), 0);
    }

    #[test]
    fn test_order_places_dependencies_first() {
        // inner is declared at a lower offset than the pointer it depends on
        let spec = LayoutSpec::new("Chain")
            .field(FieldSpec::scalar("inner", 0, ValueType::I32).depends_on("second"))
            .field(FieldSpec::pointer("first", 0x10))
            .field(FieldSpec::pointer("second", 0x08).depends_on("first"));
        let layout = resolve(&spec).unwrap();

        let names: Vec<&str> = layout
            .order()
            .iter()
            .map(|id| layout.field(*id).name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "inner"]);
        assert_eq!(layout.total_size(), 0x18);
    }

    #[test]
    fn test_dependency_must_be_pointer() {
        let spec = LayoutSpec::new("Bad")
            .field(FieldSpec::scalar("count", 0, ValueType::I32))
            .field(FieldSpec::scalar("value", 0, ValueType::I32).depends_on("count"));
        let err = resolve(&spec).unwrap_err();
        assert!(matches!(err, Error::InvalidDependency { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_dependency() {
        let spec = LayoutSpec::new("Bad")
            .field(FieldSpec::scalar("value", 0, ValueType::I32).depends_on("missing"));
        assert!(matches!(
            resolve(&spec),
            Err(Error::UnknownField(name)) if name == "Bad.missing"
        ));
    }

    #[test]
    fn test_cyclic_dependency() {
        let spec = LayoutSpec::new("Loop")
            .field(FieldSpec::pointer("a", 0).depends_on("b"))
            .field(FieldSpec::pointer("b", 8).depends_on("a"));
        assert!(matches!(resolve(&spec), Err(Error::CyclicDependency(_))));

        let self_ref = LayoutSpec::new("SelfLoop").field(FieldSpec::pointer("a", 0).depends_on("a"));
        assert!(matches!(resolve(&self_ref), Err(Error::CyclicDependency(_))));
    }

    #[test]
    fn test_duplicate_field() {
        let spec = LayoutSpec::new("Dup")
            .field(FieldSpec::scalar("x", 0, ValueType::I32))
            .field(FieldSpec::scalar("x", 4, ValueType::I32));
        assert!(matches!(resolve(&spec), Err(Error::DuplicateField { .. })));
    }

    #[test]
    fn test_pointer_sized_kinds_follow_width() {
        let spec = LayoutSpec::new("Ptrs")
            .field(FieldSpec::pointer("p", 0))
            .field(FieldSpec::string("s", 4, StringEncoding::Narrow))
            .field(FieldSpec::nested_pointer("n", 8, "Other"));
        let config = AccessorConfig::new(false);
        let layout = StructLayout::resolve(&spec, config, |_| Ok(None)).unwrap();
        assert!(layout.fields().iter().all(|f| f.size == 4));
        assert_eq!(layout.total_size(), 12);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{FieldKind, LayoutSpec, StructLayout};
use crate::error::{Error, Result};
use crate::memory::AccessorConfig;
use crate::structure::StructDescriptor;

/// Name of the built-in data pointer / count / capacity header
pub const SEQUENCE_HEADER: &str = "DynamicSequence";

/// A structure type that declares its own layout
pub trait DeclaredLayout {
    const NAME: &'static str;

    fn layout_spec() -> LayoutSpec;
}

/// Resolved layouts keyed by name.
///
/// Populated once at start-up, then only read. Nested instances must be
/// registered before the layouts that embed them; nested pointers and
/// sequence elements are looked up by name at read time, so layouts may
/// refer to themselves through them.
#[derive(Debug)]
pub struct SchemaRegistry {
    config: AccessorConfig,
    layouts: HashMap<String, Arc<StructLayout>>,
    sequence_header: Arc<StructLayout>,
}

impl SchemaRegistry {
    pub fn new(config: AccessorConfig) -> Self {
        let sequence_header = Arc::new(StructLayout::sequence_header(SEQUENCE_HEADER, config));

        Self {
            config,
            layouts: HashMap::new(),
            sequence_header,
        }
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    pub fn register(&mut self, spec: &LayoutSpec) -> Result<Arc<StructLayout>> {
        if self.layouts.contains_key(&spec.name) {
            return Err(Error::DuplicateLayout(spec.name.clone()));
        }

        let layout = StructLayout::resolve(spec, self.config, |field| match &field.kind {
            FieldKind::NestedInstance { layout } => self.layout(layout).map(Some),
            FieldKind::Sequence { .. } => Ok(Some(self.sequence_header.clone())),
            _ => Ok(None),
        })?;
        let layout = Arc::new(layout);

        debug!(
            "Registered layout {} ({} fields, 0x{:X} bytes)",
            layout.name(),
            layout.fields().len(),
            layout.total_size()
        );
        self.layouts.insert(spec.name.clone(), layout.clone());
        Ok(layout)
    }

    /// Register specs in order
    pub fn register_all<'a, I>(&mut self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a LayoutSpec>,
    {
        for spec in specs {
            self.register(spec)?;
        }
        Ok(())
    }

    pub fn register_type<T: DeclaredLayout>(&mut self) -> Result<Arc<StructLayout>> {
        self.register(&T::layout_spec())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StructLayout>> {
        self.layouts.get(name)
    }

    pub fn layout(&self, name: &str) -> Result<Arc<StructLayout>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownLayout(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    /// Registered layout names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.layouts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn sequence_header(&self) -> &Arc<StructLayout> {
        &self.sequence_header
    }

    /// New instance of a registered layout, with default values
    pub fn instantiate(&self, name: &str) -> Result<StructDescriptor> {
        self.layout(name).map(StructDescriptor::new)
    }

    pub fn instantiate_typed<T>(&self) -> Result<T>
    where
        T: DeclaredLayout + From<StructDescriptor>,
    {
        self.instantiate(T::NAME).map(T::from)
    }
}

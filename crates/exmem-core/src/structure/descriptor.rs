use std::sync::Arc;

use crate::codec::{FromValue, Value};
use crate::engine::DynamicSequence;
use crate::schema::{FieldId, StructLayout};
use crate::structure::{Child, FieldDescriptor};

/// A live instance of a remote structure.
///
/// Owns its field states and any embedded or pointed child structures. The
/// address can be rebound at any time; values are replaced wholesale on the
/// next read.
#[derive(Debug)]
pub struct StructDescriptor {
    layout: Arc<StructLayout>,
    address: u64,
    fields: Vec<FieldDescriptor>,
    last_buffer: Option<Vec<u8>>,
}

impl StructDescriptor {
    pub fn new(layout: Arc<StructLayout>) -> Self {
        let fields = layout
            .fields()
            .iter()
            .enumerate()
            .map(|(i, def)| FieldDescriptor::new(FieldId(i), def.clone()))
            .collect();

        Self {
            layout,
            address: 0,
            fields,
            last_buffer: None,
        }
    }

    pub fn at(layout: Arc<StructLayout>, address: u64) -> Self {
        let mut desc = Self::new(layout);
        desc.bind(address);
        desc
    }

    pub fn layout(&self) -> &Arc<StructLayout> {
        &self.layout
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn bind(&mut self, address: u64) {
        self.address = address;
    }

    pub fn total_size(&self) -> usize {
        self.layout.total_size()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldDescriptor] {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_by_id(&self, id: FieldId) -> &FieldDescriptor {
        &self.fields[id.0]
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> &mut FieldDescriptor {
        &mut self.fields[id.0]
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.field(name).map(FieldDescriptor::value)
    }

    /// Typed value of a field; `None` if the field is missing or holds
    /// another type
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_value)
    }

    /// Nested structure of an instance or pointer field
    pub fn child(&self, name: &str) -> Option<&StructDescriptor> {
        match self.field(name)?.child() {
            Child::Instance(child) | Child::Pointer(Some(child)) => Some(&**child),
            _ => None,
        }
    }

    pub fn sequence(&self, name: &str) -> Option<&DynamicSequence> {
        match self.field(name)?.child() {
            Child::Sequence(Some(seq)) => Some(&**seq),
            _ => None,
        }
    }

    /// Base buffer of the last successful read
    pub fn last_buffer(&self) -> Option<&[u8]> {
        self.last_buffer.as_deref()
    }

    pub(crate) fn set_last_buffer(&mut self, bytes: &[u8]) {
        self.last_buffer = Some(bytes.to_vec());
    }

    /// Reset every field (and child) to its default value
    pub fn clear(&mut self) {
        self.last_buffer = None;
        for field in &mut self.fields {
            field.clear();
        }
    }
}

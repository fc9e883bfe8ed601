use crate::codec::Value;
use crate::engine::DynamicSequence;
use crate::schema::{FieldDef, FieldId, FieldKind};
use crate::structure::StructDescriptor;

/// Structure owned by a field
#[derive(Debug, Default)]
pub enum Child {
    #[default]
    None,
    /// Embedded structure, always present
    Instance(Box<StructDescriptor>),
    /// Pointed structure, created the first time the pointer is non-zero
    Pointer(Option<Box<StructDescriptor>>),
    /// Embedded sequence, created on its first read
    Sequence(Option<Box<DynamicSequence>>),
}

impl Child {
    fn clear(&mut self) {
        match self {
            Child::Instance(child) | Child::Pointer(Some(child)) => child.clear(),
            Child::Sequence(Some(seq)) => seq.clear(),
            _ => {}
        }
    }
}

/// One mapped field of a live structure: its declaration plus the state
/// left by the last read
#[derive(Debug)]
pub struct FieldDescriptor {
    id: FieldId,
    def: FieldDef,
    pub(crate) value: Value,
    /// Bytes fetched through this pointer for dependent fields
    pub(crate) target: Option<Vec<u8>>,
    pub(crate) remote_address: u64,
    pub(crate) child: Child,
}

impl FieldDescriptor {
    pub(crate) fn new(id: FieldId, def: FieldDef) -> Self {
        let child = match &def.kind {
            FieldKind::NestedInstance { .. } => def
                .embedded()
                .map(|layout| Child::Instance(Box::new(StructDescriptor::new(layout.clone()))))
                .unwrap_or_default(),
            FieldKind::NestedPointer { .. } => Child::Pointer(None),
            FieldKind::Sequence { .. } => Child::Sequence(None),
            _ => Child::None,
        };

        Self {
            id,
            value: default_value(&def.kind),
            def,
            target: None,
            remote_address: 0,
            child,
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn def(&self) -> &FieldDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn offset(&self) -> usize {
        self.def.offset
    }

    pub fn size(&self) -> usize {
        self.def.size
    }

    pub fn kind(&self) -> &FieldKind {
        &self.def.kind
    }

    pub fn dependency(&self) -> Option<FieldId> {
        self.def.dependency
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Region fetched through this pointer, if the last read got it
    pub fn target_buffer(&self) -> Option<&[u8]> {
        self.target.as_deref()
    }

    pub fn data_assigned(&self) -> bool {
        self.target.is_some()
    }

    /// Remote address the value was read from; 0 before the first read or
    /// when the field was skipped
    pub fn remote_address(&self) -> u64 {
        self.remote_address
    }

    pub fn child(&self) -> &Child {
        &self.child
    }

    pub(crate) fn clear(&mut self) {
        self.value = default_value(&self.def.kind);
        self.target = None;
        self.remote_address = 0;
        self.child.clear();
    }
}

fn default_value(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Scalar { value_type } => Value::zero(*value_type),
        FieldKind::Pointer | FieldKind::NestedPointer { .. } => Value::Pointer(0),
        FieldKind::String { .. } | FieldKind::InlineString { .. } => Value::String(String::new()),
        FieldKind::NestedInstance { .. } | FieldKind::Sequence { .. } => Value::None,
    }
}

//! Recursive structure reads.
//!
//! A read fetches the structure's own bytes in one call, then walks its
//! fields in dependency order. Pointer fields fetch one region each for all
//! fields that depend on them; nested pointers and sequences recurse.
//!
//! Failures of the remote target (unreadable or unmapped memory) surface as
//! `Ok(false)`. `Err` is reserved for mistakes in the layouts or the call.

use std::collections::HashSet;
use std::thread;

use tracing::{debug, trace, warn};

use super::{DynamicSequence, ElementMode};
use crate::codec::{self, Value, ValueType, decode_string};
use crate::error::{Error, Result};
use crate::memory::{Accessor, ReadMemory};
use crate::schema::{FieldId, FieldKind, SchemaRegistry};
use crate::structure::{Child, RemoteStruct, StructDescriptor};

/// Addresses of the structures currently being read down the recursion
type Active = HashSet<u64>;

pub struct ReadEngine<'a, M> {
    accessor: &'a Accessor<M>,
    registry: &'a SchemaRegistry,
}

impl<'a, M: ReadMemory> ReadEngine<'a, M> {
    /// Both sides must agree on pointer width and string limits, since the
    /// layouts were sized against the registry's settings.
    pub fn new(accessor: &'a Accessor<M>, registry: &'a SchemaRegistry) -> Result<Self> {
        if accessor.config() != registry.config() {
            return Err(Error::ConfigMismatch {
                layouts: format!("{:?}", registry.config()),
                accessor: format!("{:?}", accessor.config()),
            });
        }
        Ok(Self { accessor, registry })
    }

    pub fn accessor(&self) -> &'a Accessor<M> {
        self.accessor
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    /// Read `target` at its bound address
    pub fn update<T: RemoteStruct>(&self, target: &mut T) -> Result<bool> {
        self.update_struct(target, &mut Active::new())
    }

    pub fn update_at<T: RemoteStruct>(&self, target: &mut T, address: u64) -> Result<bool> {
        target.bind(address);
        self.update(target)
    }

    /// Decode `target` from bytes already fetched from its bound address.
    ///
    /// No base read is issued; pointer regions and nested pointers are
    /// still fetched remotely.
    pub fn update_from_bytes<T: RemoteStruct>(&self, target: &mut T, bytes: &[u8]) -> Result<bool> {
        let address = target.address();
        if address == 0 {
            return Ok(false);
        }

        let mut active = Active::from([address]);
        let updated = self.populate(target.descriptor_mut(), bytes, &mut active)?;
        Ok(target.after_update(updated))
    }

    /// Read a sequence header at its bound address and refresh its elements
    pub fn update_sequence<T>(&self, seq: &mut DynamicSequence<T>) -> Result<bool>
    where
        T: RemoteStruct + From<StructDescriptor>,
    {
        let mut active = Active::new();
        if !self.read_struct(&mut seq.header, &mut active)? {
            return Ok(false);
        }
        self.expand(seq, &mut active)
    }

    pub fn update_sequence_at<T>(&self, seq: &mut DynamicSequence<T>, address: u64) -> Result<bool>
    where
        T: RemoteStruct + From<StructDescriptor>,
    {
        seq.bind(address);
        self.update_sequence(seq)
    }

    /// Write a scalar or pointer field back to the address it was last read
    /// from. The local value only changes when the write succeeds.
    pub fn write_field<T: RemoteStruct>(&self, target: &mut T, name: &str, value: Value) -> Result<bool> {
        let desc = target.descriptor_mut();
        let id = desc
            .layout()
            .field_id(name)
            .ok_or_else(|| Error::UnknownField(format!("{}.{}", desc.name(), name)))?;

        let field = desc.field_by_id(id);
        let value_type = match field.kind() {
            FieldKind::Scalar { value_type } => *value_type,
            FieldKind::Pointer | FieldKind::NestedPointer { .. } => ValueType::Pointer,
            _ => return Err(Error::UnsupportedWrite(format!("{}.{}", desc.name(), name))),
        };
        let bytes = codec::encode(value_type, &value, self.accessor.pointer_width())?;

        let address = field.remote_address();
        if address == 0 {
            debug!("{}.{} has no remote address yet, not writing", desc.name(), name);
            return Ok(false);
        }

        match self.accessor.write_bytes(address, &bytes) {
            Ok(()) => {
                desc.field_mut(id).value = value;
                Ok(true)
            }
            Err(e) if e.is_transport() => {
                debug!("Write of {}.{} failed: {}", desc.name(), name, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Read a typed structure. The post-read hook only runs once the base
    /// bytes are in hand.
    fn update_struct<T: RemoteStruct>(&self, target: &mut T, active: &mut Active) -> Result<bool> {
        let Some(bytes) = self.fetch_base(target.descriptor_mut())? else {
            return Ok(false);
        };
        let updated = self.populate_at(target.descriptor_mut(), &bytes, active)?;
        Ok(target.after_update(updated))
    }

    fn read_struct(&self, desc: &mut StructDescriptor, active: &mut Active) -> Result<bool> {
        let Some(bytes) = self.fetch_base(desc)? else {
            return Ok(false);
        };
        self.populate_at(desc, &bytes, active)
    }

    /// Fetch the structure's own bytes, clearing it when they can't be read
    fn fetch_base(&self, desc: &mut StructDescriptor) -> Result<Option<Vec<u8>>> {
        let address = desc.address();
        if address == 0 {
            return Ok(None);
        }

        let bytes = self.fetch(address, desc.total_size())?;
        if bytes.is_none() {
            desc.clear();
        }
        Ok(bytes)
    }

    /// Populate with the structure's address marked active
    fn populate_at(&self, desc: &mut StructDescriptor, bytes: &[u8], active: &mut Active) -> Result<bool> {
        let address = desc.address();
        active.insert(address);
        let result = self.populate(desc, bytes, active);
        active.remove(&address);
        result
    }

    /// Decode every field from `bytes`, the structure's own memory.
    ///
    /// A read that fails part way leaves the structure cleared rather than
    /// half refreshed.
    fn populate(&self, desc: &mut StructDescriptor, bytes: &[u8], active: &mut Active) -> Result<bool> {
        let total_size = desc.total_size();
        if bytes.len() < total_size {
            warn!(
                "Buffer for {} at 0x{:X} holds 0x{:X} bytes, need 0x{:X}",
                desc.name(),
                desc.address(),
                bytes.len(),
                total_size
            );
            return Ok(false);
        }

        desc.set_last_buffer(&bytes[..total_size]);
        for field in desc.fields_mut() {
            field.target = None;
        }

        let updated = self.populate_fields(desc, bytes, active)?;
        if !updated {
            desc.clear();
        }
        Ok(updated)
    }

    fn populate_fields(&self, desc: &mut StructDescriptor, bytes: &[u8], active: &mut Active) -> Result<bool> {
        let layout = desc.layout().clone();
        let base = desc.address();
        for &id in layout.order() {
            let updated = match layout.field(id).dependency {
                None => self.read_field(desc, id, bytes, base, active),
                Some(dep) => {
                    let Some(region) = desc.field_mut(dep).target.take() else {
                        // Nothing to write back to until the region is read again
                        desc.field_mut(id).remote_address = 0;
                        trace!(
                            "Skipping {}.{}: pointer region not available",
                            layout.name(),
                            layout.field(id).name
                        );
                        continue;
                    };
                    let region_base = desc.field_by_id(dep).value().as_pointer();
                    let result = self.read_field(desc, id, &region, region_base, active);
                    desc.field_mut(dep).target = Some(region);
                    result
                }
            }?;

            if !updated {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Decode field `id` from `source`, which starts at remote `base`
    fn read_field(
        &self,
        desc: &mut StructDescriptor,
        id: FieldId,
        source: &[u8],
        base: u64,
        active: &mut Active,
    ) -> Result<bool> {
        let layout = desc.layout().clone();
        let def = layout.field(id);
        let width = layout.config().pointer_width;
        let max_string_len = layout.config().max_string_len;
        let address = base.wrapping_add(def.offset as u64);

        // Strings inside a pointer region are read in place, up to the limit
        let in_region = matches!(def.kind, FieldKind::String { .. }) && def.dependency.is_some();
        let span = if in_region {
            max_string_len.min(source.len().saturating_sub(def.offset))
        } else {
            def.size
        };
        let Some(raw) = window(source, def.offset, span) else {
            warn!(
                "{}.{} at +0x{:X} lies outside its 0x{:X}-byte source",
                layout.name(),
                def.name,
                def.offset,
                source.len()
            );
            return Ok(false);
        };

        let field = desc.field_mut(id);
        field.remote_address = address;

        match &def.kind {
            FieldKind::Scalar { value_type } => {
                field.value = codec::decode(*value_type, raw, width)?;
            }
            FieldKind::Pointer => {
                let pointer = codec::decode(ValueType::Pointer, raw, width)?.as_pointer();
                field.value = Value::Pointer(pointer);

                let region_size = layout.region_size(id);
                if region_size > 0 && pointer != 0 {
                    field.target = self.fetch(pointer, region_size)?;
                }
            }
            FieldKind::String { encoding } if in_region => {
                field.value = Value::String(decode_string(raw, *encoding));
            }
            FieldKind::String { encoding } => {
                let pointer = codec::decode(ValueType::Pointer, raw, width)?.as_pointer();
                let text = match pointer {
                    0 => String::new(),
                    _ => self
                        .fetch(pointer, max_string_len)?
                        .map(|chars| decode_string(&chars, *encoding))
                        .unwrap_or_default(),
                };
                field.value = Value::String(text);
            }
            FieldKind::InlineString { encoding, .. } => {
                field.value = Value::String(decode_string(raw, *encoding));
            }
            FieldKind::NestedInstance { .. } => {
                if let Child::Instance(child) = &mut field.child {
                    child.bind(address);
                    return self.populate(child, raw, active);
                }
            }
            FieldKind::NestedPointer { layout: target } => {
                let pointer = codec::decode(ValueType::Pointer, raw, width)?.as_pointer();
                field.value = Value::Pointer(pointer);

                let Child::Pointer(slot) = &mut field.child else {
                    return Ok(true);
                };
                if pointer == 0 {
                    if let Some(child) = slot.as_deref_mut() {
                        child.clear();
                        child.bind(0);
                    }
                    return Ok(true);
                }
                if active.contains(&pointer) {
                    debug!(
                        "{}.{} points back to 0x{:X}, already being read",
                        layout.name(),
                        def.name,
                        pointer
                    );
                    return Ok(true);
                }

                if slot.is_none() {
                    *slot = Some(Box::new(self.registry.instantiate(target)?));
                }
                let Some(child) = slot.as_deref_mut() else {
                    return Ok(true);
                };
                child.bind(pointer);
                if !self.read_struct(child, active)? {
                    debug!(
                        "{}.{} -> {} at 0x{:X} could not be read",
                        layout.name(),
                        def.name,
                        target,
                        pointer
                    );
                    return Ok(false);
                }
            }
            FieldKind::Sequence { element, options } => {
                let Child::Sequence(slot) = &mut field.child else {
                    return Ok(true);
                };
                if slot.is_none() {
                    let header = match def.embedded() {
                        Some(header) => header.clone(),
                        None => self.registry.sequence_header().clone(),
                    };
                    let element_layout = self.registry.layout(element)?;
                    *slot = Some(Box::new(DynamicSequence::with_layouts(
                        header,
                        element_layout,
                        options.clone(),
                    )));
                }
                let Some(seq) = slot.as_deref_mut() else {
                    return Ok(true);
                };

                seq.bind(address);
                // A sequence that can't be expanded leaves its owner intact
                if !(self.populate(&mut seq.header, raw, active)? && self.expand(seq, active)?) {
                    debug!(
                        "{}.{} at 0x{:X} was not expanded",
                        layout.name(),
                        def.name,
                        address
                    );
                }
            }
        }
        Ok(true)
    }

    /// Validate the header count and refresh the elements behind it
    fn expand<T>(&self, seq: &mut DynamicSequence<T>, active: &mut Active) -> Result<bool>
    where
        T: RemoteStruct + From<StructDescriptor>,
    {
        let raw_count = seq.raw_count();
        let max_capacity = seq.options().max_capacity;
        if raw_count < 0 || raw_count as u64 > max_capacity as u64 {
            debug!(
                "Sequence at 0x{:X} reports {} elements (max {}), dropping items",
                seq.address(),
                raw_count,
                max_capacity
            );
            seq.items.clear();
            return Ok(false);
        }

        let count = raw_count as usize;
        if count == 0 {
            seq.items.clear();
            return Ok(true);
        }

        let width = self.accessor.pointer_width();
        let stride = seq.element_stride(width);
        let data = seq.data();
        let Some(block) = self.fetch(data, count * stride)? else {
            return Ok(false);
        };

        seq.resize(count);

        let mode = seq.options().mode;
        let throttle = seq.options().throttle;
        let element_size = seq.element_layout().total_size();
        let seq_address = seq.address();

        for (i, item) in seq.items.iter_mut().enumerate() {
            let Some(slot) = block.get(i * stride..(i + 1) * stride) else {
                break;
            };

            let updated = match mode {
                ElementMode::Pointer => {
                    let address = codec::decode(ValueType::Pointer, slot, width)?.as_pointer();
                    item.bind(address);
                    if active.contains(&address) {
                        debug!("Element {} points back to 0x{:X}, skipping", i, address);
                        true
                    } else {
                        self.update_struct(item, active)?
                    }
                }
                ElementMode::Inline => {
                    item.bind(data + (i * stride) as u64);
                    let updated = self.populate(item.descriptor_mut(), &slot[..element_size], active)?;
                    item.after_update(updated)
                }
            };

            if !updated {
                trace!("Element {} of sequence at 0x{:X} was not updated", i, seq_address);
            }
            if throttle.should_pause(i + 1, count) {
                thread::sleep(throttle.delay());
            }
        }
        Ok(true)
    }

    /// Read remote bytes, mapping transport failures to `None`
    fn fetch(&self, address: u64, size: usize) -> Result<Option<Vec<u8>>> {
        match self.accessor.read_bytes(address, size) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_transport() => {
                debug!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn window(bytes: &[u8], offset: usize, size: usize) -> Option<&[u8]> {
    bytes.get(offset..offset.checked_add(size)?)
}

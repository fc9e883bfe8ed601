//! Live instances of remote structures.

mod descriptor;
mod field;

pub use descriptor::StructDescriptor;
pub use field::{Child, FieldDescriptor};

/// Capability every structure type exposes to the engine.
///
/// Typed wrappers hold a [`StructDescriptor`] and add accessors on top;
/// the engine only ever talks to the descriptor.
pub trait RemoteStruct {
    fn descriptor(&self) -> &StructDescriptor;

    fn descriptor_mut(&mut self) -> &mut StructDescriptor;

    fn total_size(&self) -> usize {
        self.descriptor().total_size()
    }

    fn address(&self) -> u64 {
        self.descriptor().address()
    }

    fn bind(&mut self, address: u64) {
        self.descriptor_mut().bind(address);
    }

    /// Called after every update. The returned value replaces the update
    /// status, so a type can reject data that decoded fine but is garbage.
    fn after_update(&mut self, updated: bool) -> bool {
        updated
    }
}

impl RemoteStruct for StructDescriptor {
    fn descriptor(&self) -> &StructDescriptor {
        self
    }

    fn descriptor_mut(&mut self) -> &mut StructDescriptor {
        self
    }
}

//! # exmem-core
//!
//! Maps structures living in another process's memory onto a declared
//! offset graph and reads them recursively.
//!
//! This crate provides:
//! - Byte transport over caller-supplied read/write callbacks (`Accessor`)
//! - Little-endian value decoding and encoding (`codec`)
//! - Layout declarations, validation and a name registry (`schema`)
//! - Live structure instances (`StructDescriptor`, `RemoteStruct`)
//! - The recursive read engine and dynamic sequences (`ReadEngine`, `DynamicSequence`)
//! - A small catalog of ready-made layouts (`layouts`)
//!
//! ## Feature Flags
//!
//! - `debug-tools`: Enables a serializable dump of structure trees.
//!   This feature is intended for CLI tools and development, not production use.
//!
//! ## Example
//!
//! ```ignore
//! use exmem_core::{Accessor, EngineConfig, ReadEngine, SchemaRegistry, load_schema};
//!
//! let config = EngineConfig::default();
//! let accessor = Accessor::from_callbacks(read, write, true);
//! let mut registry = SchemaRegistry::new(config.accessor);
//! load_schema("layouts.json")?.register_into(&mut registry)?;
//!
//! let engine = ReadEngine::new(&accessor, &registry)?;
//! let mut player = registry.instantiate("Player")?;
//! if engine.update_at(&mut player, 0x7FF6_1234_0000)? {
//!     println!("{:?}", player.value("hp"));
//! }
//! ```

pub mod codec;
pub mod config;
#[cfg(feature = "debug-tools")]
pub mod debug;
pub mod engine;
pub mod error;
pub mod layouts;
pub mod memory;
pub mod schema;
pub mod structure;

pub use codec::{FromValue, PointerWidth, StringEncoding, Value, ValueType};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::{DynamicSequence, ElementMode, ReadEngine, SequenceOptions, Throttle};
pub use error::{Error, Result};
pub use memory::{
    Accessor, AccessorConfig, CallbackMemory, MemorySnapshot, ReadMemory, SnapshotRegion,
    load_snapshot,
};
pub use schema::{
    DeclaredLayout, FieldDef, FieldId, FieldKind, FieldSpec, LayoutSpec, SchemaFile,
    SchemaRegistry, StructLayout, load_schema, save_schema,
};
pub use structure::{Child, FieldDescriptor, RemoteStruct, StructDescriptor};

// Debug utilities (requires debug-tools feature)
#[cfg(feature = "debug-tools")]
pub use debug::{FieldDump, StructDump, StructNode};

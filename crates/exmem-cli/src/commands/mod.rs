//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod hex_utils;
pub mod hexdump;
pub mod inspect;
pub mod layout;
pub mod peek;

use anyhow::{Context, Result};
use exmem_core::{EngineConfig, SchemaRegistry, layouts, load_schema};
use std::path::Path;

/// Registry with the built-in layouts plus those declared in `schema`
pub fn load_registry(schema: &Path, config: &EngineConfig) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new(config.accessor);
    layouts::register_builtin(&mut registry)?;

    let file = load_schema(schema).with_context(|| format!("Failed to load schema {:?}", schema))?;
    file.register_into(&mut registry)?;
    Ok(registry)
}

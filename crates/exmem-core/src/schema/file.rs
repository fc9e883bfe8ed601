use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{LayoutSpec, SchemaRegistry};
use crate::error::Result;

/// A set of layout declarations, in registration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub layouts: Vec<LayoutSpec>,
}

impl SchemaFile {
    pub fn register_into(&self, registry: &mut SchemaRegistry) -> Result<()> {
        registry.register_all(&self.layouts)
    }
}

pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<SchemaFile> {
    let content = fs::read_to_string(&path)?;
    let schema = serde_json::from_str(&content)?;
    Ok(schema)
}

pub fn save_schema<P: AsRef<Path>>(path: P, schema: &SchemaFile) -> Result<()> {
    let content = serde_json::to_string_pretty(schema)?;
    fs::write(path, content)?;
    Ok(())
}

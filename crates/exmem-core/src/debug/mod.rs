//! Debug utilities for inspecting structure trees
//!
//! `StructDump` snapshots a read structure, with its nested children and
//! sequence items, into a serializable tree.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::codec::Value;
use crate::structure::{Child, FieldDescriptor, StructDescriptor};

/// Captured structure tree
#[derive(Debug, Clone, Serialize)]
pub struct StructDump {
    pub captured_at: DateTime<Utc>,
    pub root: StructNode,
}

/// One structure instance
#[derive(Debug, Clone, Serialize)]
pub struct StructNode {
    pub layout: String,
    pub address: String,
    pub size: usize,
    /// Base buffer of the last read, as hex bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
    pub fields: Vec<FieldDump>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDump {
    pub name: String,
    pub offset: String,
    pub size: usize,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub value: Value,
    pub remote_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<StructNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<StructNode>,
}

impl StructDump {
    pub fn capture(desc: &StructDescriptor) -> Self {
        Self {
            captured_at: Utc::now(),
            root: StructNode::from_descriptor(desc),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save dump to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl StructNode {
    pub fn from_descriptor(desc: &StructDescriptor) -> Self {
        Self {
            layout: desc.name().to_string(),
            address: format!("0x{:X}", desc.address()),
            size: desc.total_size(),
            bytes: desc.last_buffer().map(hex_bytes),
            fields: desc
                .fields()
                .iter()
                .map(|field| FieldDump::from_field(desc, field))
                .collect(),
        }
    }
}

impl FieldDump {
    fn from_field(owner: &StructDescriptor, field: &FieldDescriptor) -> Self {
        let (child, items) = match field.child() {
            Child::Instance(child) | Child::Pointer(Some(child)) => {
                (Some(Box::new(StructNode::from_descriptor(child))), Vec::new())
            }
            Child::Sequence(Some(seq)) => (
                None,
                seq.iter().map(StructNode::from_descriptor).collect(),
            ),
            _ => (None, Vec::new()),
        };

        Self {
            name: field.name().to_string(),
            offset: format!("0x{:X}", field.offset()),
            size: field.size(),
            kind: field.kind().label(),
            depends_on: field
                .dependency()
                .map(|id| owner.field_by_id(id).name().to_string()),
            value: field.value().clone(),
            remote_address: format!("0x{:X}", field.remote_address()),
            child,
            items,
        }
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

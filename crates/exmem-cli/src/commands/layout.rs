//! Layout command implementation.
//!
//! Prints what the registry resolved for each layout: total size, fields in
//! processing order, and how much each pointer fetches for its dependents.

use anyhow::Result;
use exmem_core::{EngineConfig, StructLayout};
use owo_colors::OwoColorize;
use std::path::Path;

use super::load_registry;

/// Run the layout command
pub fn run(schema: &Path, name: Option<&str>, config: &EngineConfig) -> Result<()> {
    let registry = load_registry(schema, config)?;

    let names: Vec<&str> = match name {
        Some(name) => vec![name],
        None => registry.names(),
    };

    for name in names {
        let layout = registry.layout(name)?;
        for line in describe(&layout) {
            println!("{}", line);
        }
        println!();
    }

    Ok(())
}

fn describe(layout: &StructLayout) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (0x{:X} bytes)",
        layout.name().bold(),
        layout.total_size()
    )];

    for &id in layout.order() {
        let field = layout.field(id);
        let mut line = format!(
            "  +0x{:03X} {:<20} {:<16} 0x{:X}",
            field.offset,
            field.name,
            field.kind.label(),
            field.size
        );
        if let Some(dep) = field.dependency {
            line.push_str(&format!("  <- {}", layout.field(dep).name));
        }
        let region = layout.region_size(id);
        if region > 0 {
            line.push_str(&format!("  (fetches 0x{:X})", region));
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use exmem_core::{AccessorConfig, FieldSpec, LayoutSpec, SchemaRegistry, ValueType};

    #[test]
    fn test_describe_lists_processing_order() {
        let mut registry = SchemaRegistry::new(AccessorConfig::default());
        let layout = registry
            .register(
                &LayoutSpec::new("Player")
                    .field(FieldSpec::scalar("hp", 4, ValueType::I32).depends_on("info"))
                    .field(FieldSpec::pointer("info", 0)),
            )
            .unwrap();

        let lines = describe(&layout);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("0x8 bytes"));
        assert!(lines[1].contains("info"));
        assert!(lines[1].contains("fetches 0x8"));
        assert!(lines[2].contains("<- info"));
    }
}

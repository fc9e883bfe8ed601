//! Inspect command implementation.
//!
//! Reads a structure (or a sequence of them) out of a memory snapshot and
//! prints the resulting field tree.

use anyhow::Result;
use exmem_core::{
    Accessor, Child, DynamicSequence, EngineConfig, ReadEngine, StructDescriptor, StructDump,
    Value, load_snapshot,
};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::warn;

use super::hex_utils::{format_hex_address, parse_hex_address};
use super::load_registry;

pub struct InspectArgs<'a> {
    pub schema: &'a Path,
    pub snapshot: &'a Path,
    pub layout: &'a str,
    pub address: &'a str,
    pub sequence: bool,
    pub json: bool,
}

/// Run the inspect command
pub fn run(args: &InspectArgs<'_>, config: &EngineConfig) -> Result<()> {
    let address = parse_hex_address(args.address)?;
    let registry = load_registry(args.schema, config)?;
    let accessor = Accessor::new(load_snapshot(args.snapshot)?, config.accessor);
    let engine = ReadEngine::new(&accessor, &registry)?;

    if args.sequence {
        let mut seq: DynamicSequence =
            DynamicSequence::at(&registry, args.layout, config.sequence.clone(), address)?;
        if !engine.update_sequence(&mut seq)? {
            warn!("Sequence of {} at 0x{:X} could not be read", args.layout, address);
        }

        println!(
            "[{}] @ {}: {} items (count {}, capacity {})",
            args.layout.bold(),
            format_hex_address(address),
            seq.len(),
            seq.count(),
            seq.capacity()
        );
        for (i, item) in seq.iter().enumerate() {
            if args.json {
                println!("{}", StructDump::capture(item).to_json()?);
            } else {
                println!("[{}]", i);
                print_lines(&tree_lines(item, 1));
            }
        }
        return Ok(());
    }

    let mut desc = registry.instantiate(args.layout)?;
    if !engine.update_at(&mut desc, address)? {
        warn!("Read of {} at 0x{:X} was incomplete", args.layout, address);
    }

    if args.json {
        println!("{}", StructDump::capture(&desc).to_json()?);
    } else {
        print_lines(&tree_lines(&desc, 0));
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Field tree of `desc`, children indented below their field
fn tree_lines(desc: &StructDescriptor, depth: usize) -> Vec<String> {
    let indent = "  ".repeat(depth);
    let mut lines = vec![format!(
        "{}{} @ {} (0x{:X} bytes)",
        indent,
        desc.name().bold(),
        format_hex_address(desc.address()),
        desc.total_size()
    )];

    for field in desc.fields() {
        let value = match field.value() {
            Value::None => String::new(),
            value @ Value::Pointer(_) => format!("= {}", value.yellow()),
            value => format!("= {}", value.green()),
        };
        lines.push(format!(
            "{}  +0x{:03X} {:<20} {}",
            indent,
            field.offset(),
            field.name(),
            value
        ));

        match field.child() {
            Child::Instance(child) | Child::Pointer(Some(child)) => {
                lines.extend(tree_lines(child, depth + 2));
            }
            Child::Sequence(Some(seq)) => {
                for item in seq.iter() {
                    lines.extend(tree_lines(item, depth + 2));
                }
            }
            _ => {}
        }
    }
    lines
}

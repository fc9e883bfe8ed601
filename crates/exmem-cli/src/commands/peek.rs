//! Peek command implementation.

use anyhow::Result;
use exmem_core::{Accessor, EngineConfig, ValueType, load_snapshot};
use std::path::Path;

use super::hex_utils::parse_hex_address;

/// Run the peek command
pub fn run(snapshot: &Path, address: &str, value_type: &str, config: &EngineConfig) -> Result<()> {
    let address = parse_hex_address(address)?;
    let value_type = ValueType::parse(value_type)?;

    let accessor = Accessor::new(load_snapshot(snapshot)?, config.accessor);
    let value = accessor.read_value(address, value_type)?;

    println!("0x{:X} ({}): {}", address, value_type, value);
    Ok(())
}

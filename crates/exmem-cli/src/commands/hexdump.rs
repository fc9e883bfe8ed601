//! Hexdump command implementation.
//!
//! Displays snapshot bytes in traditional hexdump format, useful for
//! checking a layout's offsets against real data.
//!
//! # Output Format
//!
//! ```text
//! 0x000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use anyhow::Result;
use exmem_core::{ReadMemory, load_snapshot};
use std::path::Path;

use super::hex_utils::parse_hex_address;

/// Run the hexdump command
pub fn run(snapshot: &Path, address: &str, size: usize, ascii: bool) -> Result<()> {
    let address = parse_hex_address(address)?;
    let snapshot = load_snapshot(snapshot)?;
    let bytes = snapshot.read_bytes(address, size)?;

    println!("Hexdump at 0x{:X} ({} bytes):", address, size);
    println!();
    for line in format_lines(&bytes, ascii) {
        println!("{}", line);
    }

    Ok(())
}

/// One line per 16 bytes, offsets relative to the first byte
pub fn format_lines(bytes: &[u8], ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:03X}: ", i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                line.push_str(" |");
                for byte in chunk {
                    line.push(if (0x20..0x7F).contains(byte) { *byte as char } else { '.' });
                }
                line.push_str(&" ".repeat(16 - chunk.len()));
                line.push('|');
            }

            line
        })
        .collect()
}

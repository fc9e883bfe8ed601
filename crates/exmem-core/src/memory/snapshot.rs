//! Read-only memory captured to a file.
//!
//! A snapshot is a JSON document listing regions of a remote address space:
//!
//! ```json
//! { "regions": [ { "address": "0x1000", "bytes": "10 00 00 00 01 00 00 00" } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReadMemory;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRegion {
    address: String,
    bytes: String,
}

/// A contiguous run of captured bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion", into = "RawRegion")]
pub struct SnapshotRegion {
    pub address: u64,
    pub bytes: Vec<u8>,
}

impl SnapshotRegion {
    pub fn end(&self) -> u64 {
        self.address + self.bytes.len() as u64
    }

    fn slice(&self, address: u64, size: usize) -> Option<&[u8]> {
        let start = address.checked_sub(self.address)? as usize;
        let end = start.checked_add(size)?;
        self.bytes.get(start..end)
    }
}

impl TryFrom<RawRegion> for SnapshotRegion {
    type Error = Error;

    fn try_from(raw: RawRegion) -> Result<Self> {
        let digits = raw
            .address
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        let address = u64::from_str_radix(digits, 16)
            .map_err(|e| Error::InvalidHex(format!("address '{}': {}", raw.address, e)))?;

        Ok(Self {
            address,
            bytes: parse_hex_bytes(&raw.bytes)?,
        })
    }
}

impl From<SnapshotRegion> for RawRegion {
    fn from(region: SnapshotRegion) -> Self {
        Self {
            address: format!("0x{:X}", region.address),
            bytes: format_hex_bytes(&region.bytes),
        }
    }
}

/// Captured memory regions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub regions: Vec<SnapshotRegion>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, address: u64, bytes: Vec<u8>) -> Self {
        self.regions.push(SnapshotRegion { address, bytes });
        self
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl ReadMemory for MemorySnapshot {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.regions
            .iter()
            .find_map(|region| region.slice(address, size))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                debug!("Snapshot has no region covering 0x{:X}+{}", address, size);
                Error::MemoryReadFailed { address, size }
            })
    }
}

/// Load a snapshot from a JSON file
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<MemorySnapshot> {
    let content = fs::read_to_string(&path)?;
    let snapshot = serde_json::from_str(&content)?;
    Ok(snapshot)
}

/// Parse whitespace separated hex bytes ("10 00 FF")
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    text.split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 16)
                .map_err(|e| Error::InvalidHex(format!("byte token '{}': {}", token, e)))
        })
        .collect()
}

fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

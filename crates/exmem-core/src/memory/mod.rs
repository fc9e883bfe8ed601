//! Memory sources and the accessor the engine reads through.

mod accessor;
mod reader;
mod snapshot;

#[cfg(test)]
pub mod mock;

pub use accessor::{Accessor, AccessorConfig, CallbackMemory, DEFAULT_MAX_STRING_LEN};
pub use reader::ReadMemory;
pub use snapshot::{MemorySnapshot, SnapshotRegion, load_snapshot, parse_hex_bytes};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};

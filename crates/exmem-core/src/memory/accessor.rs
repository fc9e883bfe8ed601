use serde::{Deserialize, Serialize};
use tracing::trace;

use super::ReadMemory;
use crate::codec::{self, PointerWidth, Value, ValueType};
use crate::error::{Error, Result};

/// Default upper bound for a single remote string fetch (bytes)
pub const DEFAULT_MAX_STRING_LEN: usize = 64;

/// Accessor settings, fixed for the lifetime of every layout built against them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    pub pointer_width: PointerWidth,
    /// Maximum number of bytes fetched for a pointed-to string
    pub max_string_len: usize,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            pointer_width: PointerWidth::Bits64,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl AccessorConfig {
    pub fn new(is_64bit: bool) -> Self {
        Self {
            pointer_width: PointerWidth::from_is_64bit(is_64bit),
            ..Default::default()
        }
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_width.size()
    }
}

/// Memory source built from a read callback and a write callback.
///
/// The read callback returns `None` when the transport fails.
pub struct CallbackMemory<R, W> {
    read: R,
    write: W,
}

impl<R, W> CallbackMemory<R, W>
where
    R: Fn(u64, usize) -> Option<Vec<u8>>,
    W: Fn(u64, &[u8]) -> bool,
{
    pub fn new(read: R, write: W) -> Self {
        Self { read, write }
    }
}

impl<R, W> ReadMemory for CallbackMemory<R, W>
where
    R: Fn(u64, usize) -> Option<Vec<u8>>,
    W: Fn(u64, &[u8]) -> bool,
{
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (self.read)(address, size).ok_or(Error::MemoryReadFailed { address, size })
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        if (self.write)(address, bytes) {
            Ok(())
        } else {
            Err(Error::MemoryWriteFailed {
                address,
                size: bytes.len(),
            })
        }
    }
}

/// The read/write channel every structure read goes through.
///
/// Stateless apart from its configuration. Reads at address 0 and short
/// reads fail here, before or after the transport is asked; there are no
/// retries at this layer.
pub struct Accessor<M> {
    memory: M,
    config: AccessorConfig,
}

impl<R, W> Accessor<CallbackMemory<R, W>>
where
    R: Fn(u64, usize) -> Option<Vec<u8>>,
    W: Fn(u64, &[u8]) -> bool,
{
    /// Build an accessor from the two transport callbacks
    pub fn from_callbacks(read: R, write: W, is_64bit: bool) -> Self {
        Self::new(CallbackMemory::new(read, write), AccessorConfig::new(is_64bit))
    }
}

impl<M: ReadMemory> Accessor<M> {
    pub fn new(memory: M, config: AccessorConfig) -> Self {
        Self { memory, config }
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.config.pointer_width
    }

    pub fn max_string_len(&self) -> usize {
        self.config.max_string_len
    }

    /// Underlying memory source
    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address == 0 {
            return Err(Error::NullAddress);
        }
        if size == 0 {
            return Ok(Vec::new());
        }

        let bytes = self.memory.read_bytes(address, size)?;
        if bytes.len() < size {
            trace!(
                "Short read at 0x{:X}: wanted {} bytes, got {}",
                address,
                size,
                bytes.len()
            );
            return Err(Error::MemoryReadFailed { address, size });
        }
        Ok(bytes)
    }

    pub fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        if address == 0 {
            return Err(Error::NullAddress);
        }
        self.memory.write_bytes(address, bytes)
    }

    pub fn read_pointer(&self, address: u64) -> Result<u64> {
        self.read_value(address, ValueType::Pointer)
            .map(|value| value.as_pointer())
    }

    pub fn read_value(&self, address: u64, value_type: ValueType) -> Result<Value> {
        let width = self.pointer_width();
        let bytes = self.read_bytes(address, value_type.size(width))?;
        codec::decode(value_type, &bytes, width)
    }

    pub fn write_value(&self, address: u64, value_type: ValueType, value: &Value) -> Result<()> {
        let bytes = codec::encode(value_type, value, self.pointer_width())?;
        self.write_bytes(address, &bytes)
    }
}

use crate::error::{Error, Result};

/// Raw byte access to a remote address space
pub trait ReadMemory {
    /// Read exactly `size` bytes at `address`
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Write `bytes` at `address`. Read-only sources keep the default.
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        Err(Error::MemoryWriteFailed {
            address,
            size: bytes.len(),
        })
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        exact::<4>(address, &bytes).map(i32::from_le_bytes)
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        exact::<8>(address, &bytes).map(u64::from_le_bytes)
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for Box<T> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(address, bytes)
    }
}

fn exact<const N: usize>(address: u64, bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or(Error::MemoryReadFailed { address, size: N })
}

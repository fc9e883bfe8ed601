//! In-memory stand-in for a remote process, for tests.
//!
//! Bytes are stored sparsely so regions can be laid out at arbitrary
//! addresses. Every read is logged so tests can assert on how many fetches
//! the engine issued.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::ReadMemory;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct MockMemoryReader {
    bytes: Mutex<BTreeMap<u64, u8>>,
    reads: Mutex<Vec<(u64, usize)>>,
    read_only: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockMemoryReader {
    /// Every `(address, size)` read issued so far
    pub fn read_log(&self) -> Vec<(u64, usize)> {
        lock(&self.reads).clone()
    }

    pub fn read_count(&self) -> usize {
        lock(&self.reads).len()
    }

    /// Number of reads that started at `address`
    pub fn reads_at(&self, address: u64) -> usize {
        lock(&self.reads)
            .iter()
            .filter(|(addr, _)| *addr == address)
            .count()
    }

    pub fn clear_log(&self) {
        lock(&self.reads).clear();
    }

    /// Overwrite bytes in place (simulates the target mutating)
    pub fn poke(&self, address: u64, data: &[u8]) {
        let mut bytes = lock(&self.bytes);
        for (i, b) in data.iter().enumerate() {
            bytes.insert(address + i as u64, *b);
        }
    }

    pub fn poke_i32(&self, address: u64, value: i32) {
        self.poke(address, &value.to_le_bytes());
    }

    /// Remove bytes so later reads covering them fail
    pub fn unmap(&self, address: u64, size: usize) {
        let mut bytes = lock(&self.bytes);
        for i in 0..size as u64 {
            bytes.remove(&(address + i));
        }
    }

    pub fn peek(&self, address: u64, size: usize) -> Option<Vec<u8>> {
        let bytes = lock(&self.bytes);
        (0..size as u64)
            .map(|i| bytes.get(&(address + i)).copied())
            .collect()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        lock(&self.reads).push((address, size));
        self.peek(address, size)
            .ok_or(Error::MemoryReadFailed { address, size })
    }

    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        if self.read_only || self.peek(address, data.len()).is_none() {
            return Err(Error::MemoryWriteFailed {
                address,
                size: data.len(),
            });
        }
        self.poke(address, data);
        Ok(())
    }
}

/// Builder for [`MockMemoryReader`]
#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    bytes: BTreeMap<u64, u8>,
    read_only: bool,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(mut self, address: u64, data: &[u8]) -> Self {
        for (i, b) in data.iter().enumerate() {
            self.bytes.insert(address + i as u64, *b);
        }
        self
    }

    pub fn zeroed(self, address: u64, size: usize) -> Self {
        self.bytes(address, &vec![0; size])
    }

    pub fn i32(self, address: u64, value: i32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u32(self, address: u64, value: u32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u64(self, address: u64, value: u64) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn f32(self, address: u64, value: f32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    /// C string including its terminator
    pub fn c_str(self, address: u64, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.bytes(address, &data)
    }

    /// UTF-16LE string including its terminator
    pub fn wide_str(self, address: u64, text: &str) -> Self {
        let data: Vec<u8> = text
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        self.bytes(address, &data)
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            bytes: Mutex::new(self.bytes),
            reads: Mutex::new(Vec::new()),
            read_only: self.read_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reads_and_logs() {
        let mock = MockMemoryBuilder::new().i32(0x1000, 16).i32(0x1004, 1).build();

        assert_eq!(mock.read_i32(0x1000).unwrap(), 16);
        assert_eq!(mock.read_bytes(0x1004, 4).unwrap(), vec![1, 0, 0, 0]);
        assert!(mock.read_bytes(0x1006, 4).is_err());

        assert_eq!(mock.read_count(), 3);
        assert_eq!(mock.reads_at(0x1000), 1);
        assert_eq!(mock.read_log()[2], (0x1006, 4));
    }

    #[test]
    fn test_mock_write_and_unmap() {
        let mock = MockMemoryBuilder::new().zeroed(0x2000, 8).build();

        mock.write_bytes(0x2000, &[7, 7]).unwrap();
        assert_eq!(mock.peek(0x2000, 2), Some(vec![7, 7]));
        assert!(mock.write_bytes(0x2007, &[1, 1]).is_err());

        mock.unmap(0x2000, 1);
        assert!(mock.read_bytes(0x2000, 2).is_err());
    }

    #[test]
    fn test_mock_read_only() {
        let mock = MockMemoryBuilder::new().zeroed(0x10, 4).read_only().build();
        assert!(mock.write_bytes(0x10, &[1]).is_err());
    }

    #[test]
    fn test_builder_strings() {
        let mock = MockMemoryBuilder::new()
            .c_str(0x100, "abc")
            .wide_str(0x200, "hi")
            .build();
        assert_eq!(mock.peek(0x100, 4), Some(b"abc\0".to_vec()));
        assert_eq!(mock.peek(0x200, 6), Some(vec![b'h', 0, b'i', 0, 0, 0]));
    }
}

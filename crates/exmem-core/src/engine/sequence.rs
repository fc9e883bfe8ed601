use std::ops::Index;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::PointerWidth;
use crate::error::Result;
use crate::schema::{DeclaredLayout, SchemaRegistry, StructLayout};
use crate::structure::{RemoteStruct, StructDescriptor};

/// Upper bound on element count accepted from a remote header
pub const DEFAULT_MAX_CAPACITY: usize = 0x20000;

/// How elements are laid out behind the data pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementMode {
    /// The data block is an array of pointers to elements
    #[default]
    Pointer,
    /// Elements sit back to back in the data block
    Inline,
}

/// Pause between batches of element reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Throttle {
    /// Elements read between pauses
    pub every: usize,
    pub delay_ms: u64,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            every: 1,
            delay_ms: 0,
        }
    }
}

impl Throttle {
    pub fn is_enabled(&self) -> bool {
        self.every > 0 && self.delay_ms > 0
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether to pause after `processed` elements, given `total` to read
    pub(crate) fn should_pause(&self, processed: usize, total: usize) -> bool {
        self.is_enabled() && processed < total && processed % self.every == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    pub mode: ElementMode,
    /// Take the element count from the capacity slot instead of the count slot
    pub use_capacity_as_count: bool,
    pub max_capacity: usize,
    /// Extra bytes between inline elements
    pub padding: usize,
    pub throttle: Throttle,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            mode: ElementMode::Pointer,
            use_capacity_as_count: false,
            max_capacity: DEFAULT_MAX_CAPACITY,
            padding: 0,
            throttle: Throttle::default(),
        }
    }
}

impl SequenceOptions {
    pub fn inline() -> Self {
        Self {
            mode: ElementMode::Inline,
            ..Default::default()
        }
    }

    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }
}

/// A remote `{ data, count, capacity }` header expanded into a list of
/// elements.
///
/// Elements are kept across reads: growing appends fresh elements, shrinking
/// truncates, and the survivors are refreshed in place.
#[derive(Debug)]
pub struct DynamicSequence<T = StructDescriptor> {
    pub(crate) header: StructDescriptor,
    element_layout: Arc<StructLayout>,
    pub(crate) items: Vec<T>,
    options: SequenceOptions,
}

impl<T> DynamicSequence<T>
where
    T: RemoteStruct + From<StructDescriptor>,
{
    /// Sequence of elements of the registered layout `element`
    pub fn new(registry: &SchemaRegistry, element: &str, options: SequenceOptions) -> Result<Self> {
        Ok(Self::with_layouts(
            registry.sequence_header().clone(),
            registry.layout(element)?,
            options,
        ))
    }

    pub fn at(
        registry: &SchemaRegistry,
        element: &str,
        options: SequenceOptions,
        address: u64,
    ) -> Result<Self> {
        let mut seq = Self::new(registry, element, options)?;
        seq.bind(address);
        Ok(seq)
    }

    pub fn with_layouts(
        header: Arc<StructLayout>,
        element_layout: Arc<StructLayout>,
        options: SequenceOptions,
    ) -> Self {
        Self {
            header: StructDescriptor::new(header),
            element_layout,
            items: Vec::new(),
            options,
        }
    }

    pub(crate) fn resize(&mut self, count: usize) {
        self.items.truncate(count);
        while self.items.len() < count {
            let element = StructDescriptor::new(self.element_layout.clone());
            self.items.push(T::from(element));
        }
    }
}

impl<T> DynamicSequence<T>
where
    T: RemoteStruct + From<StructDescriptor> + DeclaredLayout,
{
    pub fn typed(registry: &SchemaRegistry, options: SequenceOptions) -> Result<Self> {
        Self::new(registry, T::NAME, options)
    }
}

impl<T> DynamicSequence<T> {
    pub fn header(&self) -> &StructDescriptor {
        &self.header
    }

    pub fn address(&self) -> u64 {
        self.header.address()
    }

    pub fn bind(&mut self, address: u64) {
        self.header.bind(address);
    }

    pub fn element_layout(&self) -> &Arc<StructLayout> {
        &self.element_layout
    }

    pub fn options(&self) -> &SequenceOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SequenceOptions {
        &mut self.options
    }

    /// Remote address of the element block
    pub fn data(&self) -> u64 {
        self.header.get::<u64>("data").unwrap_or(0)
    }

    pub fn count(&self) -> i32 {
        self.header.get::<i32>("count").unwrap_or(0)
    }

    pub fn capacity(&self) -> i32 {
        self.header.get::<i32>("capacity").unwrap_or(0)
    }

    /// Element count as read from the header, before validation
    pub fn raw_count(&self) -> i64 {
        if self.options.use_capacity_as_count {
            self.capacity() as i64
        } else {
            self.count() as i64
        }
    }

    /// Distance between consecutive elements in the data block
    pub fn element_stride(&self, pointer_width: PointerWidth) -> usize {
        match self.options.mode {
            ElementMode::Pointer => pointer_width.size(),
            ElementMode::Inline => self.element_layout.total_size() + self.options.padding,
        }
    }

    /// Loose plausibility check on the last header read
    pub fn is_valid(&self) -> bool {
        self.raw_count() > 0 && self.capacity() > self.count() && self.address() != 0
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.header.clear();
        self.items.clear();
    }
}

impl<T> Index<usize> for DynamicSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a DynamicSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

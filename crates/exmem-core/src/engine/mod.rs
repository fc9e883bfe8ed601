//! The read engine and the dynamic sequence built on top of it.

mod reader;
mod sequence;

pub use reader::ReadEngine;
pub use sequence::{
    DEFAULT_MAX_CAPACITY, DynamicSequence, ElementMode, SequenceOptions, Throttle,
};

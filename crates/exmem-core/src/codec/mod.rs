//! Primitive value codec.
//!
//! Converts fixed-size little-endian byte slices to typed scalar values and
//! back. Strings are handled separately because their length is only known
//! once the terminator has been found.

mod string;
mod types;
mod value;

pub use string::{StringEncoding, decode_string};
pub use types::{PointerWidth, ValueType};
pub use value::{FromValue, Value, decode, encode};

//! Structure declarations.
//!
//! Layouts are registered explicitly, either from Rust ([`LayoutSpec`]
//! builders or [`DeclaredLayout`] types) or from a JSON schema file.

mod field;
mod file;
mod layout;
mod registry;

pub use field::{FieldKind, FieldSpec, LayoutSpec};
pub use file::{SchemaFile, load_schema, save_schema};
pub use layout::{FieldDef, FieldId, StructLayout, sequence_header_size};
pub use registry::{DeclaredLayout, SEQUENCE_HEADER, SchemaRegistry};

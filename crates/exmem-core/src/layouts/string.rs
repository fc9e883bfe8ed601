use crate::codec::StringEncoding;
use crate::layouts::remote_struct;
use crate::schema::{DeclaredLayout, FieldSpec, LayoutSpec};
use crate::structure::StructDescriptor;

fn pointed_string(name: &str, encoding: StringEncoding) -> LayoutSpec {
    LayoutSpec::new(name)
        .field(FieldSpec::pointer("data", 0))
        .field(FieldSpec::string("text", 0, encoding).depends_on("data"))
}

/// Pointer to a NUL-terminated narrow string
#[derive(Debug)]
pub struct PString(StructDescriptor);

remote_struct!(PString);

impl DeclaredLayout for PString {
    const NAME: &'static str = "PString";

    fn layout_spec() -> LayoutSpec {
        pointed_string(Self::NAME, StringEncoding::Narrow)
    }
}

impl PString {
    /// Text from the last read; empty if the pointer was null or unreadable
    pub fn text(&self) -> String {
        self.0.get::<String>("text").unwrap_or_default()
    }

    pub fn data(&self) -> u64 {
        self.0.get::<u64>("data").unwrap_or(0)
    }
}

/// Pointer to a NUL-terminated UTF-16 string
#[derive(Debug)]
pub struct FString(StructDescriptor);

remote_struct!(FString);

impl DeclaredLayout for FString {
    const NAME: &'static str = "FString";

    fn layout_spec() -> LayoutSpec {
        pointed_string(Self::NAME, StringEncoding::Wide)
    }
}

impl FString {
    pub fn text(&self) -> String {
        self.0.get::<String>("text").unwrap_or_default()
    }

    pub fn data(&self) -> u64 {
        self.0.get::<u64>("data").unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReadEngine;
    use crate::layouts::register_builtin;
    use crate::memory::{Accessor, AccessorConfig, MockMemoryBuilder};
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_pstring_and_fstring() {
        let accessor = Accessor::new(
            MockMemoryBuilder::new()
                .u64(0x1000, 0x5000)
                .u64(0x1100, 0x6000)
                .zeroed(0x5000, 64)
                .c_str(0x5000, "narrow")
                .zeroed(0x6000, 64)
                .wide_str(0x6000, "wide")
                .build(),
            AccessorConfig::default(),
        );
        let mut registry = SchemaRegistry::new(AccessorConfig::default());
        register_builtin(&mut registry).unwrap();
        let engine = ReadEngine::new(&accessor, &registry).unwrap();

        let mut narrow: PString = registry.instantiate_typed().unwrap();
        assert!(engine.update_at(&mut narrow, 0x1000).unwrap());
        assert_eq!(narrow.text(), "narrow");
        assert_eq!(narrow.data(), 0x5000);

        let mut wide: FString = registry.instantiate_typed().unwrap();
        assert!(engine.update_at(&mut wide, 0x1100).unwrap());
        assert_eq!(wide.text(), "wide");
    }

    #[test]
    fn test_null_pstring_is_empty() {
        let accessor = Accessor::new(
            MockMemoryBuilder::new().u64(0x1000, 0).build(),
            AccessorConfig::default(),
        );
        let mut registry = SchemaRegistry::new(AccessorConfig::default());
        registry.register_type::<PString>().unwrap();
        let engine = ReadEngine::new(&accessor, &registry).unwrap();

        let mut text: PString = registry.instantiate_typed().unwrap();
        assert!(engine.update_at(&mut text, 0x1000).unwrap());
        assert_eq!(text.text(), "");
        assert_eq!(accessor.memory().read_count(), 1);
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::{StringEncoding, ValueType};
use crate::engine::SequenceOptions;

/// How a field's bytes are interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar {
        #[serde(rename = "type")]
        value_type: ValueType,
    },
    /// Pointer other fields can take their bytes from
    Pointer,
    /// Pointer to a NUL terminated string, or the string itself when the
    /// field depends on a pointer
    String {
        #[serde(default)]
        encoding: StringEncoding,
    },
    /// Fixed-length character array stored in place
    InlineString {
        #[serde(default)]
        encoding: StringEncoding,
        len: usize,
    },
    /// Structure embedded in place
    NestedInstance { layout: String },
    /// Pointer to a structure
    NestedPointer { layout: String },
    /// Data pointer / count / capacity header expanded into elements
    Sequence {
        element: String,
        #[serde(default)]
        options: SequenceOptions,
    },
}

impl FieldKind {
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer)
    }

    /// Short label used in diagnostics
    pub fn label(&self) -> String {
        match self {
            Self::Scalar { value_type } => value_type.to_string(),
            Self::Pointer => "pointer".to_string(),
            Self::String { encoding } => format!("string<{:?}>", encoding).to_lowercase(),
            Self::InlineString { encoding, len } => {
                format!("string<{:?}>[{}]", encoding, len).to_lowercase()
            }
            Self::NestedInstance { layout } => layout.clone(),
            Self::NestedPointer { layout } => format!("*{}", layout),
            Self::Sequence { element, .. } => format!("[{}]", element),
        }
    }
}

/// Declaration of one field of a remote structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub offset: usize,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Pointer field whose target region holds this field's bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, offset: usize, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            offset,
            kind,
            depends_on: None,
        }
    }

    pub fn scalar(name: &str, offset: usize, value_type: ValueType) -> Self {
        Self::new(name, offset, FieldKind::Scalar { value_type })
    }

    pub fn pointer(name: &str, offset: usize) -> Self {
        Self::new(name, offset, FieldKind::Pointer)
    }

    pub fn string(name: &str, offset: usize, encoding: StringEncoding) -> Self {
        Self::new(name, offset, FieldKind::String { encoding })
    }

    pub fn inline_string(name: &str, offset: usize, len: usize, encoding: StringEncoding) -> Self {
        Self::new(name, offset, FieldKind::InlineString { encoding, len })
    }

    pub fn nested(name: &str, offset: usize, layout: &str) -> Self {
        Self::new(
            name,
            offset,
            FieldKind::NestedInstance {
                layout: layout.to_string(),
            },
        )
    }

    pub fn nested_pointer(name: &str, offset: usize, layout: &str) -> Self {
        Self::new(
            name,
            offset,
            FieldKind::NestedPointer {
                layout: layout.to_string(),
            },
        )
    }

    pub fn sequence(name: &str, offset: usize, element: &str, options: SequenceOptions) -> Self {
        Self::new(
            name,
            offset,
            FieldKind::Sequence {
                element: element.to_string(),
                options,
            },
        )
    }

    /// Source this field from the target region of pointer field `pointer`
    pub fn depends_on(mut self, pointer: &str) -> Self {
        self.depends_on = Some(pointer.to_string());
        self
    }
}

/// Declaration of a remote structure type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl LayoutSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ElementMode;

    #[test]
    fn test_field_spec_json() {
        let json = r#"[
            { "name": "hp", "offset": 0, "kind": "scalar", "type": "i32" },
            { "name": "name_ptr", "offset": 8, "kind": "pointer" },
            { "name": "name", "offset": 0, "kind": "string", "encoding": "wide", "depends_on": "name_ptr" },
            { "name": "next", "offset": 16, "kind": "nested_pointer", "layout": "Node" },
            { "name": "items", "offset": 24, "kind": "sequence", "element": "Item",
              "options": { "mode": "inline", "max_capacity": 16 } }
        ]"#;
        let fields: Vec<FieldSpec> = serde_json::from_str(json).unwrap();

        assert_eq!(fields[0], FieldSpec::scalar("hp", 0, ValueType::I32));
        assert_eq!(fields[1], FieldSpec::pointer("name_ptr", 8));
        assert_eq!(
            fields[2],
            FieldSpec::string("name", 0, StringEncoding::Wide).depends_on("name_ptr")
        );
        assert_eq!(fields[3], FieldSpec::nested_pointer("next", 16, "Node"));
        match &fields[4].kind {
            FieldKind::Sequence { element, options } => {
                assert_eq!(element, "Item");
                assert_eq!(options.mode, ElementMode::Inline);
                assert_eq!(options.max_capacity, 16);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_field_spec_unknown_type_rejected() {
        let json = r#"{ "name": "hp", "offset": 0, "kind": "scalar", "type": "i33" }"#;
        assert!(serde_json::from_str::<FieldSpec>(json).is_err());
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(
            FieldKind::Scalar {
                value_type: ValueType::F32
            }
            .label(),
            "f32"
        );
        assert_eq!(
            FieldKind::InlineString {
                encoding: StringEncoding::Narrow,
                len: 16
            }
            .label(),
            "string<narrow>[16]"
        );
        assert_eq!(
            FieldKind::NestedPointer {
                layout: "Node".to_string()
            }
            .label(),
            "*Node"
        );
    }
}
